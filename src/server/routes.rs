use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::response::Redirect;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::Value;
use tower_http::trace::TraceLayer;

use crate::data::entry::{DatasetCollection, DatasetEntry};
use crate::server::api::{self, ApiError, MessageResponse};
use crate::server::docs;
use crate::server::AppState;

pub const DOCS_PATH: &str = "/docs";

type ApiResult<T> = Result<Json<MessageResponse<T>>, ApiError>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(redirect_to_docs).fallback(method_not_allowed))
        .route(DOCS_PATH, get(docs::docs_page).fallback(method_not_allowed))
        .route(
            "/openapi.json",
            get(docs::openapi_document).fallback(method_not_allowed),
        )
        .route("/health", get(health).fallback(method_not_allowed))
        .route("/dataset", get(list_datasets).fallback(method_not_allowed))
        .route(
            "/dataset/get/:name",
            get(get_dataset).fallback(method_not_allowed),
        )
        .route(
            "/dataset/add/:name",
            post(add_dataset).fallback(method_not_allowed),
        )
        .route(
            "/dataset/edit/:name",
            patch(edit_dataset).fallback(method_not_allowed),
        )
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn redirect_to_docs() -> Redirect {
    Redirect::temporary(DOCS_PATH)
}

async fn health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "dataset-registry",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn list_datasets(State(state): State<AppState>) -> ApiResult<DatasetCollection> {
    let outcome = state.with_registry(|registry| registry.list()).await?;
    Ok(Json(outcome.into()))
}

async fn get_dataset(
    State(state): State<AppState>,
    name: Result<Path<String>, PathRejection>,
) -> ApiResult<DatasetEntry> {
    let Path(name) = name?;
    let outcome = state
        .with_registry(move |registry| registry.get(&name))
        .await?;
    Ok(Json(outcome.into()))
}

async fn add_dataset(
    State(state): State<AppState>,
    name: Result<Path<String>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<DatasetEntry> {
    let Path(name) = name?;
    let Json(body) = body?;
    let dataset = api::parse_new_dataset(&body)?;
    let outcome = state
        .with_registry(move |registry| registry.add(&name, dataset))
        .await?;
    Ok(Json(outcome.into()))
}

async fn edit_dataset(
    State(state): State<AppState>,
    name: Result<Path<String>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<DatasetEntry> {
    let Path(name) = name?;
    let Json(body) = body?;
    let patch = api::parse_patch(body)?;
    let outcome = state
        .with_registry(move |registry| registry.update(&name, patch))
        .await?;
    Ok(Json(outcome.into()))
}

async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
