use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use super::export::{CsvExport, DocumentExport, ExportFilter};
use super::import::ImportOutcome;
use super::TransferService;
use crate::auth::resolve_actor;
use crate::error::AppError;
use crate::evaluation::FormId;
use crate::store::RecordStore;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportQuery {
    #[serde(default)]
    filter: ExportFilter,
    #[serde(default)]
    form_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportRequest {
    csv_content: String,
}

pub fn transfer_router<S: RecordStore + 'static>(service: Arc<TransferService<S>>) -> Router {
    Router::new()
        .route("/api/v1/export/csv", get(export_csv_handler::<S>))
        .route("/api/v1/export/pdf", get(export_pdf_handler::<S>))
        .route("/api/v1/import/csv", post(import_csv_handler::<S>))
        .with_state(service)
}

async fn export_csv_handler<S: RecordStore>(
    State(service): State<Arc<TransferService<S>>>,
    headers: HeaderMap,
    Query(query): Query<ExportQuery>,
) -> Result<Json<CsvExport>, AppError> {
    let actor = resolve_actor(service.store(), &headers)?;
    Ok(Json(service.export_csv(&actor, query.filter)?))
}

async fn export_pdf_handler<S: RecordStore>(
    State(service): State<Arc<TransferService<S>>>,
    headers: HeaderMap,
    Query(query): Query<ExportQuery>,
) -> Result<Json<DocumentExport>, AppError> {
    let actor = resolve_actor(service.store(), &headers)?;
    let form_id = query.form_id.map(FormId);
    Ok(Json(service.export_document(&actor, form_id, query.filter)?))
}

async fn import_csv_handler<S: RecordStore>(
    State(service): State<Arc<TransferService<S>>>,
    headers: HeaderMap,
    Json(request): Json<ImportRequest>,
) -> Result<Json<ImportOutcome>, AppError> {
    let actor = resolve_actor(service.store(), &headers)?;
    Ok(Json(service.import_csv(&actor, &request.csv_content)?))
}
