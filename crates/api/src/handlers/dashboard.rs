//! Handler for the officials dashboard snapshot.

use std::time::Duration;

use axum::extract::{Query, State};
use axum::Json;
use citypulse_client::{DashboardViewModel, OfficialsDashboard};
use citypulse_core::filter::StatusFilter;
use citypulse_store::StoreError;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::OfficialUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// How long to wait for the first projects and reports snapshots.
const LOAD_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    /// `all` or one project/report status.
    pub filter: Option<String>,
}

/// GET /api/v1/dashboard?filter=
///
/// One-shot dashboard: mount, wait for both mirrors, render, release.
/// Live updates are served over `/ws?view=officials`.
pub async fn get_dashboard(
    State(state): State<AppState>,
    OfficialUser(user): OfficialUser,
    Query(params): Query<DashboardParams>,
) -> AppResult<Json<DataResponse<DashboardViewModel>>> {
    let filter = match params.filter.as_deref() {
        Some(raw) => StatusFilter::parse(raw)?,
        None => StatusFilter::All,
    };

    let mut dashboard = OfficialsDashboard::mount(state.store.clone()).await;
    let loaded = tokio::time::timeout(LOAD_TIMEOUT, dashboard.load()).await;
    let result = match loaded {
        Ok(true) => {
            dashboard.set_filter(filter);
            Ok(dashboard.view_model())
        }
        Ok(false) => Err(AppError::Store(StoreError::Unavailable(
            "Live queries ended before the first snapshot".into(),
        ))),
        Err(_) => Err(AppError::UpstreamTimeout(format!(
            "No snapshot within {}s",
            LOAD_TIMEOUT.as_secs()
        ))),
    };
    dashboard.unmount();

    let model = result?;
    tracing::debug!(uid = %user.uid, filter = filter.as_str(), "Dashboard rendered");
    Ok(Json(DataResponse { data: model }))
}
