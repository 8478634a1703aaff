//! Password hashing and server-side session management.
//!
//! Sessions live in the `auth_sessions` table and are referenced by an
//! opaque uuid token carried in an HttpOnly cookie. There is no signed
//! in-process session state and no process-wide secret.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::http::{HeaderMap, header};
use chrono::{Duration, Utc};
use model::entities::{auth_session, user};
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, ModelTrait, Set};
use uuid::Uuid;

use crate::error::ApiError;

pub mod middleware;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session";

/// How long a login stays valid without re-authenticating.
const SESSION_TTL_HOURS: i64 = 12;

/// Produce the salted, irreversible hash stored in place of the
/// plaintext password.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// Check a login attempt against a stored hash. An unparseable stored
/// hash counts as a failed verification, not an error.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Persist a fresh session row for the user and return the Set-Cookie
/// value carrying its token.
pub async fn open_session(db: &DatabaseConnection, user_id: i32) -> Result<String, ApiError> {
    let token = Uuid::new_v4().to_string();
    let ttl = Duration::hours(SESSION_TTL_HOURS);

    auth_session::ActiveModel {
        token: Set(token.clone()),
        user_id: Set(user_id),
        expires_at: Set(Utc::now() + ttl),
    }
    .insert(db)
    .await?;

    Ok(format!(
        "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        ttl.num_seconds()
    ))
}

/// Extract the session token from the request's Cookie header, if any.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|cookie| cookie.trim().strip_prefix(SESSION_COOKIE)?.strip_prefix('='))
}

/// Look up the account behind a session token. Expired sessions are
/// deleted on sight and reported as absent.
pub async fn resolve_session(
    db: &DatabaseConnection,
    token: &str,
) -> Result<Option<user::Model>, DbErr> {
    let Some(session) = auth_session::Entity::find_by_id(token.to_owned()).one(db).await? else {
        return Ok(None);
    };

    if session.expires_at <= Utc::now() {
        session.delete(db).await?;
        return Ok(None);
    }

    user::Entity::find_by_id(session.user_id).one(db).await
}

/// Cookie value that expires the session cookie on the client.
pub fn expired_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
}
