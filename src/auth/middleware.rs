//! Route guards. Every protected route declares the role it requires;
//! the guard authenticates the session and attaches the resolved
//! account to the request extensions for the handler.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use model::entities::user::Role;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::schemas::AppState;

/// The authenticated identity attached to a request by the guards.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
    pub role: Role,
}

async fn authenticate(state: &AppState, req: &mut Request) -> Result<CurrentUser, ApiError> {
    let token = super::session_token(req.headers()).ok_or(ApiError::Unauthenticated)?;

    let user = super::resolve_session(&state.db, token)
        .await?
        .ok_or(ApiError::Unauthenticated)?;

    let current = CurrentUser {
        id: user.id,
        username: user.username,
        role: user.role,
    };
    debug!("authenticated {} as {:?}", current.username, current.role);

    req.extensions_mut().insert(current.clone());
    Ok(current)
}

/// Guard for routes only students may call.
pub async fn require_student(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, &mut req).await?;
    if user.role != Role::Student {
        warn!("{} attempted a student-only action", user.username);
        return Err(ApiError::Forbidden("student"));
    }
    Ok(next.run(req).await)
}

/// Guard for routes only lecturers may call.
pub async fn require_lecturer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, &mut req).await?;
    if user.role != Role::Lecturer {
        warn!("{} attempted a lecturer-only action", user.username);
        return Err(ApiError::Forbidden("lecturer"));
    }
    Ok(next.run(req).await)
}
