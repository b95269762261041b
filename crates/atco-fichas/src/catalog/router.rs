use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use super::{
    CatalogService, ItemTemplate, NewTemplateRecord, TemplateFilter, TemplateId, TemplatePatch,
};
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
struct BatchOutcome {
    success: bool,
    count: usize,
}

pub fn catalog_router<S: RecordStore + 'static>(service: Arc<CatalogService<S>>) -> Router {
    Router::new()
        .route(
            "/api/v1/catalog",
            get(list_handler::<S>).post(create_handler::<S>),
        )
        .route("/api/v1/catalog/categories", get(categories_handler::<S>))
        .route("/api/v1/catalog/import", post(import_handler::<S>))
        .route(
            "/api/v1/catalog/:id",
            get(get_handler::<S>)
                .patch(update_handler::<S>)
                .delete(delete_handler::<S>),
        )
        .with_state(service)
}

async fn list_handler<S: RecordStore>(
    State(service): State<Arc<CatalogService<S>>>,
    headers: HeaderMap,
    Query(filter): Query<TemplateFilter>,
) -> Result<Json<Vec<ItemTemplate>>, AppError> {
    let actor = resolve_actor(service.store(), &headers)?;
    Ok(Json(service.list(&actor, filter)?))
}

async fn categories_handler<S: RecordStore>(
    State(service): State<Arc<CatalogService<S>>>,
    headers: HeaderMap,
) -> Result<Json<Vec<String>>, AppError> {
    let actor = resolve_actor(service.store(), &headers)?;
    Ok(Json(service.categories(&actor)?))
}

async fn get_handler<S: RecordStore>(
    State(service): State<Arc<CatalogService<S>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<ItemTemplate>, AppError> {
    let actor = resolve_actor(service.store(), &headers)?;
    Ok(Json(service.get(&actor, TemplateId(id))?))
}

async fn create_handler<S: RecordStore>(
    State(service): State<Arc<CatalogService<S>>>,
    headers: HeaderMap,
    Json(input): Json<NewTemplateRecord>,
) -> Result<Json<MutationOutcome>, AppError> {
    let actor = resolve_actor(service.store(), &headers)?;
    service.create(&actor, input)?;
    Ok(Json(MutationOutcome {
        success: true,
        message: "catalog item created".to_string(),
    }))
}

async fn update_handler<S: RecordStore>(
    State(service): State<Arc<CatalogService<S>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(patch): Json<TemplatePatch>,
) -> Result<Json<MutationOutcome>, AppError> {
    let actor = resolve_actor(service.store(), &headers)?;
    service.update(&actor, TemplateId(id), patch)?;
    Ok(Json(MutationOutcome {
        success: true,
        message: "catalog item updated".to_string(),
    }))
}

async fn delete_handler<S: RecordStore>(
    State(service): State<Arc<CatalogService<S>>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<MutationOutcome>, AppError> {
    let actor = resolve_actor(service.store(), &headers)?;
    service.delete(&actor, TemplateId(id))?;
    Ok(Json(MutationOutcome {
        success: true,
        message: "catalog item deleted".to_string(),
    }))
}

async fn import_handler<S: RecordStore>(
    State(service): State<Arc<CatalogService<S>>>,
    headers: HeaderMap,
    Json(items): Json<Vec<NewTemplateRecord>>,
) -> Result<Json<BatchOutcome>, AppError> {
    let actor = resolve_actor(service.store(), &headers)?;
    let count = service.import_batch(&actor, items)?;
    Ok(Json(BatchOutcome {
        success: true,
        count,
    }))
}
