use axum::{
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use model::entities::attendance_record;
use sea_orm::{EntityTrait, QueryOrder};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::export;
use crate::schemas::AppState;

/// All records, newest first, exactly as the record listing orders them.
async fn fetch_records(state: &AppState) -> Result<Vec<attendance_record::Model>, ApiError> {
    Ok(attendance_record::Entity::find()
        .order_by_desc(attendance_record::Column::Timestamp)
        .all(&state.db)
        .await?)
}

/// Download all records as CSV
#[utoipa::path(
    get,
    path = "/download/all/csv",
    tag = "exports",
    responses(
        (status = 200, description = "CSV attachment with all records"),
        (status = 401, description = "Not logged in", body = crate::schemas::ErrorResponse),
        (status = 403, description = "Not a lecturer", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn download_all_csv(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let records = fetch_records(&state).await?;
    let body = export::records_to_csv(&records).map_err(|e| ApiError::Internal(e.to_string()))?;

    let filename = format!("attendance_records_{}.csv", Utc::now().format("%Y%m%d_%H%M%S"));
    info!("exporting {} records as {}", records.len(), filename);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        body,
    ))
}

/// Download all records as PDF
#[utoipa::path(
    get,
    path = "/download/all/pdf",
    tag = "exports",
    responses(
        (status = 200, description = "PDF attachment with all records"),
        (status = 401, description = "Not logged in", body = crate::schemas::ErrorResponse),
        (status = 403, description = "Not a lecturer", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn download_all_pdf(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let records = fetch_records(&state).await?;
    let generated_at = Utc::now();
    let body = export::records_to_pdf(&records, generated_at)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let filename = format!("attendance_records_{}.pdf", generated_at.format("%Y%m%d_%H%M%S"));
    info!("exporting {} records as {}", records.len(), filename);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={filename}"),
            ),
        ],
        body,
    ))
}
