use axum::{
    Extension,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use model::entities::attendance_record;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::middleware::CurrentUser;
use crate::error::{self, ApiError};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request body for submitting attendance. The geolocation fields
/// arrive as strings because the capture form posts them verbatim;
/// they are parsed here and rejected when present but non-numeric.
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct SubmitAttendanceRequest {
    #[validate(length(min = 1))]
    pub name: String,
    /// Matriculation number (the natural key; one record per student)
    #[validate(length(min = 1))]
    pub matric_no: String,
    #[validate(length(min = 1))]
    pub course: String,
    /// Decimal degrees
    pub latitude: Option<String>,
    /// Decimal degrees
    pub longitude: Option<String>,
    /// Reported accuracy radius in metres
    pub accuracy: Option<String>,
    pub location_name: Option<String>,
}

/// Attendance record response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecordResponse {
    pub id: i32,
    pub name: String,
    pub matric_no: String,
    pub course: String,
    pub timestamp: DateTime<Utc>,
    pub active: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub accuracy: Option<f64>,
    pub location_name: Option<String>,
}

impl From<attendance_record::Model> for AttendanceRecordResponse {
    fn from(model: attendance_record::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            matric_no: model.matric_no,
            course: model.course,
            timestamp: model.timestamp,
            active: model.active,
            latitude: model.latitude,
            longitude: model.longitude,
            accuracy: model.accuracy,
            location_name: model.location_name,
        }
    }
}

/// Aggregate record counts shown alongside every listing and toggle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct RecordCounts {
    pub total: u64,
    pub active: u64,
    pub inactive: u64,
}

/// Query parameters for the record listing
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RecordsQuery {
    /// Only records for this course (exact match)
    pub course: Option<String>,
    /// Only records with this active status
    pub active: Option<bool>,
}

/// Record listing plus aggregate counts
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordListResponse {
    pub records: Vec<AttendanceRecordResponse>,
    pub counts: RecordCounts,
}

/// Request body for toggling a record's active status
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ToggleStatusRequest {
    pub active: bool,
}

/// Result of a status toggle
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ToggleStatusResponse {
    pub id: i32,
    pub new_status: bool,
    pub counts: RecordCounts,
}

/// Counts are always recomputed from the store; nothing is cached
/// between requests.
pub(crate) async fn record_counts(db: &DatabaseConnection) -> Result<RecordCounts, DbErr> {
    let active = attendance_record::Entity::find()
        .filter(attendance_record::Column::Active.eq(true))
        .count(db)
        .await?;
    let inactive = attendance_record::Entity::find()
        .filter(attendance_record::Column::Active.eq(false))
        .count(db)
        .await?;

    Ok(RecordCounts {
        total: active + inactive,
        active,
        inactive,
    })
}

/// Names of the fields that failed the non-empty requirement.
fn missing_fields(request: &SubmitAttendanceRequest) -> Vec<String> {
    match request.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => {
            let mut fields: Vec<String> = errors
                .field_errors()
                .keys()
                .map(|field| format!("{field} is required"))
                .collect();
            fields.sort();
            fields
        }
    }
}

/// Parse an optional numeric form field. An absent or blank field is
/// NULL; a present but non-numeric one is a validation failure, never
/// silently dropped.
fn parse_coordinate(
    field: &str,
    raw: Option<&str>,
    problems: &mut Vec<String>,
) -> Option<f64> {
    match raw.map(str::trim) {
        None | Some("") => None,
        Some(value) => match value.parse::<f64>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                problems.push(format!("{field} must be numeric"));
                None
            }
        },
    }
}

/// Submit an attendance record
#[utoipa::path(
    post,
    path = "/submit_attendance",
    tag = "attendance",
    request_body = SubmitAttendanceRequest,
    responses(
        (status = 201, description = "Attendance recorded", body = ApiResponse<AttendanceRecordResponse>),
        (status = 400, description = "Missing or malformed fields", body = ErrorResponse),
        (status = 409, description = "Matric number already has a record", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Not a student", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, submitter))]
pub async fn submit_attendance(
    State(state): State<AppState>,
    Extension(submitter): Extension<CurrentUser>,
    Json(request): Json<SubmitAttendanceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AttendanceRecordResponse>>), ApiError> {
    debug!(
        "attendance submission by '{}' for matric number: {}",
        submitter.username, request.matric_no
    );

    let mut problems = missing_fields(&request);
    let latitude = parse_coordinate("latitude", request.latitude.as_deref(), &mut problems);
    let longitude = parse_coordinate("longitude", request.longitude.as_deref(), &mut problems);
    let accuracy = parse_coordinate("accuracy", request.accuracy.as_deref(), &mut problems);
    if !problems.is_empty() {
        return Err(ApiError::Validation(problems));
    }

    // Best-effort pre-check; the unique index on matric_no is the
    // backstop for two submissions racing past it.
    let existing = attendance_record::Entity::find()
        .filter(attendance_record::Column::MatricNo.eq(request.matric_no.as_str()))
        .one(&state.db)
        .await?;
    if let Some(record) = existing {
        warn!("duplicate submission for matric number {}", record.matric_no);
        return Err(ApiError::DuplicateRecord {
            matric_no: record.matric_no,
            deactivated: !record.active,
        });
    }

    let new_record = attendance_record::ActiveModel {
        name: Set(request.name.clone()),
        matric_no: Set(request.matric_no.clone()),
        course: Set(request.course.clone()),
        timestamp: Set(Utc::now()),
        active: Set(true),
        latitude: Set(latitude),
        longitude: Set(longitude),
        accuracy: Set(accuracy),
        location_name: Set(request
            .location_name
            .clone()
            .filter(|name| !name.trim().is_empty())),
        ..Default::default()
    };

    let created = match new_record.insert(&state.db).await {
        Ok(model) => model,
        Err(db_error) if error::is_unique_violation(&db_error) => {
            return Err(ApiError::DuplicateRecord {
                matric_no: request.matric_no,
                deactivated: false,
            });
        }
        Err(db_error) => return Err(db_error.into()),
    };

    info!(
        "attendance recorded for {} ({}), record ID: {}",
        created.name, created.matric_no, created.id
    );
    let response = ApiResponse {
        data: AttendanceRecordResponse::from(created),
        message: "Attendance submitted successfully!".to_string(),
        success: true,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// List attendance records, newest first, with aggregate counts
#[utoipa::path(
    get,
    path = "/records",
    tag = "attendance",
    params(
        ("course" = Option<String>, Query, description = "Only records for this course"),
        ("active" = Option<bool>, Query, description = "Only records with this active status"),
    ),
    responses(
        (status = 200, description = "Records retrieved successfully", body = ApiResponse<RecordListResponse>),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Not a lecturer", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_records(
    Query(query): Query<RecordsQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<RecordListResponse>>, ApiError> {
    let mut finder = attendance_record::Entity::find()
        .order_by_desc(attendance_record::Column::Timestamp);
    if let Some(course) = &query.course {
        finder = finder.filter(attendance_record::Column::Course.eq(course.as_str()));
    }
    if let Some(active) = query.active {
        finder = finder.filter(attendance_record::Column::Active.eq(active));
    }

    let records = finder.all(&state.db).await?;
    // Counts stay global even when the listing is filtered
    let counts = record_counts(&state.db).await?;

    debug!(
        "retrieved {} records ({} active, {} inactive overall)",
        records.len(),
        counts.active,
        counts.inactive
    );
    let response = ApiResponse {
        data: RecordListResponse {
            records: records.into_iter().map(AttendanceRecordResponse::from).collect(),
            counts,
        },
        message: "Records retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Activate or deactivate a record
#[utoipa::path(
    post,
    path = "/toggle_status/{record_id}",
    tag = "attendance",
    params(
        ("record_id" = i32, Path, description = "Record ID"),
    ),
    request_body = ToggleStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<ToggleStatusResponse>),
        (status = 404, description = "Record not found", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Not a lecturer", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, lecturer))]
pub async fn toggle_status(
    Path(record_id): Path<i32>,
    State(state): State<AppState>,
    Extension(lecturer): Extension<CurrentUser>,
    Json(request): Json<ToggleStatusRequest>,
) -> Result<Json<ApiResponse<ToggleStatusResponse>>, ApiError> {
    let record = attendance_record::Entity::find_by_id(record_id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound(record_id))?;

    let name = record.name.clone();
    let mut active_model: attendance_record::ActiveModel = record.into();
    active_model.active = Set(request.active);
    let updated = active_model.update(&state.db).await?;

    let counts = record_counts(&state.db).await?;

    let message = if updated.active {
        format!("{name}'s record has been activated successfully!")
    } else {
        format!("{name}'s record has been deactivated successfully!")
    };
    info!(
        "record {} set to {} by '{}', counts now {}/{} active/inactive",
        updated.id,
        if updated.active { "active" } else { "inactive" },
        lecturer.username,
        counts.active,
        counts.inactive
    );

    let response = ApiResponse {
        data: ToggleStatusResponse {
            id: updated.id,
            new_status: updated.active,
            counts,
        },
        message,
        success: true,
    };
    Ok(Json(response))
}

/// Permanently delete a record
#[utoipa::path(
    post,
    path = "/delete_record/{record_id}",
    tag = "attendance",
    params(
        ("record_id" = i32, Path, description = "Record ID"),
    ),
    responses(
        (status = 200, description = "Record deleted", body = ApiResponse<String>),
        (status = 404, description = "Record not found", body = ErrorResponse),
        (status = 401, description = "Not logged in", body = ErrorResponse),
        (status = 403, description = "Not a lecturer", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, lecturer))]
pub async fn delete_record(
    Path(record_id): Path<i32>,
    State(state): State<AppState>,
    Extension(lecturer): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let result = attendance_record::Entity::delete_by_id(record_id)
        .exec(&state.db)
        .await?;

    if result.rows_affected == 0 {
        warn!("delete requested for unknown record {}", record_id);
        return Err(ApiError::NotFound(record_id));
    }

    info!("record {} deleted by '{}'", record_id, lecturer.username);
    let response = ApiResponse {
        data: format!("Record {record_id} deleted"),
        message: "Record deleted successfully!".to_string(),
        success: true,
    };
    Ok(Json(response))
}
