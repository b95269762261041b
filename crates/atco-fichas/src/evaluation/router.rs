use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use super::domain::{AuditEntry, EvaluationForm, FormId, FormPatch, LineItem};
use super::service::{FichaService, NewFicha, NewLineItemInput};
use crate::auth::resolve_actor;
use crate::error::AppError;
use crate::store::RecordStore;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MutationOutcome {
    success: bool,
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreationOutcome {
    success: bool,
    form_id: FormId,
    seeded_items: usize,
}

pub fn fichas_router<S: RecordStore + 'static>(service: Arc<FichaService<S>>) -> Router {
    Router::new()
        .route(
            "/api/v1/fichas",
            get(list_handler::<S>).post(create_handler::<S>),
        )
        .route(
            "/api/v1/fichas/:id",
            get(get_handler::<S>)
                .patch(update_handler::<S>)
                .delete(delete_handler::<S>),
        )
        .route(
            "/api/v1/fichas/:id/items",
            get(items_handler::<S>).post(save_item_handler::<S>),
        )
        .route("/api/v1/fichas/:id/audit", get(audit_handler::<S>))
        .with_state(service)
}

async fn list_handler<S: RecordStore>(
    State(service): State<Arc<FichaService<S>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<EvaluationForm>>, AppError> {
    let actor = resolve_actor(service.store(), &headers)?;
    Ok(Json(service.list(&actor)?))
}

async fn get_handler<S: RecordStore>(
    State(service): State<Arc<FichaService<S>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<EvaluationForm>, AppError> {
    let actor = resolve_actor(service.store(), &headers)?;
    Ok(Json(service.get(&actor, FormId(id))?))
}

async fn create_handler<S: RecordStore>(
    State(service): State<Arc<FichaService<S>>>,
    headers: HeaderMap,
    Json(input): Json<NewFicha>,
) -> Result<Json<CreationOutcome>, AppError> {
    let actor = resolve_actor(service.store(), &headers)?;
    let created = service.create(&actor, input)?;
    Ok(Json(CreationOutcome {
        success: true,
        form_id: created.form_id,
        seeded_items: created.seeded_items,
    }))
}

async fn update_handler<S: RecordStore>(
    State(service): State<Arc<FichaService<S>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(patch): Json<FormPatch>,
) -> Result<Json<MutationOutcome>, AppError> {
    let actor = resolve_actor(service.store(), &headers)?;
    service.update(&actor, FormId(id), patch)?;
    Ok(Json(MutationOutcome {
        success: true,
        message: "evaluation form updated".to_string(),
    }))
}

async fn delete_handler<S: RecordStore>(
    State(service): State<Arc<FichaService<S>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<MutationOutcome>, AppError> {
    let actor = resolve_actor(service.store(), &headers)?;
    service.delete(&actor, FormId(id))?;
    Ok(Json(MutationOutcome {
        success: true,
        message: "evaluation form deleted".to_string(),
    }))
}

async fn items_handler<S: RecordStore>(
    State(service): State<Arc<FichaService<S>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Vec<LineItem>>, AppError> {
    let actor = resolve_actor(service.store(), &headers)?;
    Ok(Json(service.line_items(&actor, FormId(id))?))
}

async fn save_item_handler<S: RecordStore>(
    State(service): State<Arc<FichaService<S>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<NewLineItemInput>,
) -> Result<Json<MutationOutcome>, AppError> {
    let actor = resolve_actor(service.store(), &headers)?;
    service.save_line_item(&actor, FormId(id), input)?;
    Ok(Json(MutationOutcome {
        success: true,
        message: "line item saved".to_string(),
    }))
}

async fn audit_handler<S: RecordStore>(
    State(service): State<Arc<FichaService<S>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    let actor = resolve_actor(service.store(), &headers)?;
    Ok(Json(service.audit(&actor, FormId(id))?))
}
