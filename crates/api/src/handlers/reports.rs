//! Handlers for the `/reports` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use citypulse_client::ReportSubmitter;
use citypulse_core::report::{ReportDraft, ReportType};
use citypulse_core::types::{DocId, Position};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /reports`.
///
/// `center` is the map center at submission time; it becomes the report
/// position.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReportRequest {
    #[serde(rename = "type")]
    pub kind: ReportType,
    pub description: String,
    #[validate(custom(function = "validate_center"))]
    pub center: Position,
}

#[derive(Debug, Serialize)]
pub struct CreatedReport {
    pub id: DocId,
}

/// POST /api/v1/reports
///
/// Submit a citizen report. Public: citizens do not sign in.
pub async fn create_report(
    State(state): State<AppState>,
    Json(input): Json<CreateReportRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<CreatedReport>>)> {
    input
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let draft = ReportDraft::new(input.kind, input.description);
    let id = ReportSubmitter::new(state.store.clone())
        .submit(&draft, input.center)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreatedReport { id },
        }),
    ))
}

fn validate_center(center: &Position) -> Result<(), ValidationError> {
    let lat_ok = (-90.0..=90.0).contains(&center.lat());
    let lng_ok = (-180.0..=180.0).contains(&center.lng());
    if lat_ok && lng_ok {
        Ok(())
    } else {
        Err(ValidationError::new("center_out_of_range"))
    }
}
