use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use super::{NewReport, Report, ReportId, ReportService};
use crate::auth::resolve_actor;
use crate::error::AppError;
use crate::store::RecordStore;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreationOutcome {
    success: bool,
    report_id: ReportId,
}

pub fn reports_router<S: RecordStore + 'static>(service: Arc<ReportService<S>>) -> Router {
    Router::new()
        .route(
            "/api/v1/reports",
            get(list_handler::<S>).post(create_handler::<S>),
        )
        .with_state(service)
}

async fn list_handler<S: RecordStore>(
    State(service): State<Arc<ReportService<S>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Report>>, AppError> {
    let actor = resolve_actor(service.store(), &headers)?;
    Ok(Json(service.list(&actor)?))
}

async fn create_handler<S: RecordStore>(
    State(service): State<Arc<ReportService<S>>>,
    headers: HeaderMap,
    Json(input): Json<NewReport>,
) -> Result<Json<CreationOutcome>, AppError> {
    let actor = resolve_actor(service.store(), &headers)?;
    let report_id = service.create(&actor, input)?;
    Ok(Json(CreationOutcome {
        success: true,
        report_id,
    }))
}
