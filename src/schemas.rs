use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::logout,
        crate::handlers::attendance::submit_attendance,
        crate::handlers::attendance::list_records,
        crate::handlers::attendance::toggle_status,
        crate::handlers::attendance::delete_record,
        crate::handlers::exports::download_all_csv,
        crate::handlers::exports::download_all_pdf,
    ),
    components(
        schemas(
            ApiResponse<crate::handlers::auth::AccountResponse>,
            ApiResponse<crate::handlers::auth::LoginResponse>,
            ApiResponse<crate::handlers::attendance::AttendanceRecordResponse>,
            ApiResponse<crate::handlers::attendance::RecordListResponse>,
            ApiResponse<crate::handlers::attendance::ToggleStatusResponse>,
            ApiResponse<String>,
            ErrorResponse,
            HealthResponse,
            crate::handlers::auth::RoleName,
            crate::handlers::auth::RegisterRequest,
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::AccountResponse,
            crate::handlers::auth::LoginResponse,
            crate::handlers::attendance::SubmitAttendanceRequest,
            crate::handlers::attendance::AttendanceRecordResponse,
            crate::handlers::attendance::RecordCounts,
            crate::handlers::attendance::RecordListResponse,
            crate::handlers::attendance::ToggleStatusRequest,
            crate::handlers::attendance::ToggleStatusResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration, login and logout"),
        (name = "attendance", description = "Attendance submission and record management"),
        (name = "exports", description = "CSV and PDF record exports"),
    ),
    info(
        title = "attendrs API",
        description = "Student attendance tracker with role-based record management",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;
