use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Json},
};
use model::entities::{
    auth_session,
    user::{self, Role},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

use crate::auth;
use crate::error::{self, ApiError};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Wire form of the role enumeration. Anything outside the two known
/// roles is rejected when the request body is deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoleName {
    Lecturer,
    Student,
}

impl From<RoleName> for Role {
    fn from(role: RoleName) -> Self {
        match role {
            RoleName::Lecturer => Role::Lecturer,
            RoleName::Student => Role::Student,
        }
    }
}

impl From<Role> for RoleName {
    fn from(role: Role) -> Self {
        match role {
            Role::Lecturer => RoleName::Lecturer,
            Role::Student => RoleName::Student,
        }
    }
}

/// Request body for registering an account
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    /// Username (must be unique)
    pub username: String,
    /// Plaintext password; only its salted hash is stored
    pub password: String,
    pub role: RoleName,
}

/// Request body for logging in
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Account summary returned after registration
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccountResponse {
    pub id: i32,
    pub username: String,
    pub role: RoleName,
    pub active: bool,
}

impl From<user::Model> for AccountResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            role: model.role.into(),
            active: model.active,
        }
    }
}

/// Login result, including where the client should navigate next for
/// the authenticated role.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub user_id: i32,
    pub username: String,
    pub role: RoleName,
    pub redirect_to: String,
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created successfully", body = ApiResponse<AccountResponse>),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 409, description = "Username already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AccountResponse>>), ApiError> {
    debug!("registering account for username: {}", request.username);

    let mut missing = Vec::new();
    if request.username.trim().is_empty() {
        missing.push("username".to_string());
    }
    if request.password.trim().is_empty() {
        missing.push("password".to_string());
    }
    if !missing.is_empty() {
        return Err(ApiError::Validation(missing));
    }
    if request.password.len() < 8 {
        return Err(ApiError::Validation(vec![
            "password must be at least 8 characters".to_string(),
        ]));
    }

    let existing = user::Entity::find()
        .filter(user::Column::Username.eq(request.username.as_str()))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        warn!("registration rejected, username '{}' is taken", request.username);
        return Err(ApiError::DuplicateUsername(request.username));
    }

    let password_hash = auth::hash_password(&request.password)?;
    let new_user = user::ActiveModel {
        username: Set(request.username.clone()),
        password_hash: Set(password_hash),
        role: Set(request.role.into()),
        active: Set(true),
        ..Default::default()
    };

    let created = match new_user.insert(&state.db).await {
        Ok(model) => model,
        // Two concurrent registrations can race past the pre-check;
        // the unique index decides
        Err(db_error) if error::is_unique_violation(&db_error) => {
            return Err(ApiError::DuplicateUsername(request.username));
        }
        Err(db_error) => return Err(db_error.into()),
    };

    info!(
        "account created with ID: {}, username: {}, role: {:?}",
        created.id, created.username, created.role
    );
    let response = ApiResponse {
        data: AccountResponse::from(created),
        message: "Registration successful! Please login.".to_string(),
        success: true,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// Log in and establish a session
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid username or password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = user::Entity::find()
        .filter(user::Column::Username.eq(request.username.as_str()))
        .one(&state.db)
        .await?;

    let Some(user) = user else {
        warn!("login failed: unknown username");
        return Err(ApiError::InvalidCredentials);
    };

    if !auth::verify_password(&request.password, &user.password_hash) {
        warn!("login failed: wrong password for '{}'", user.username);
        return Err(ApiError::InvalidCredentials);
    }

    if !user.active {
        warn!("login failed: account '{}' is deactivated", user.username);
        return Err(ApiError::InvalidCredentials);
    }

    let cookie = auth::open_session(&state.db, user.id).await?;

    let redirect_to = match user.role {
        Role::Lecturer => "/records",
        Role::Student => "/attendance",
    };

    info!("login successful for '{}' ({:?})", user.username, user.role);
    let response = ApiResponse {
        data: LoginResponse {
            user_id: user.id,
            username: user.username,
            role: user.role.into(),
            redirect_to: redirect_to.to_string(),
        },
        message: "Login successful".to_string(),
        success: true,
    };
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(response)))
}

/// Log out, clearing the session unconditionally
#[utoipa::path(
    get,
    path = "/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Session cleared", body = ApiResponse<String>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, headers))]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = auth::session_token(&headers) {
        auth_session::Entity::delete_by_id(token.to_owned())
            .exec(&state.db)
            .await?;
    }

    let response = ApiResponse {
        data: "Logged out".to_string(),
        message: "You have been logged out.".to_string(),
        success: true,
    };
    Ok(([(header::SET_COOKIE, auth::expired_cookie())], Json(response)))
}
