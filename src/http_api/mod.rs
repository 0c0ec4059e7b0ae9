use std::{collections::HashSet, net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    DailyStat, Item, Plan, PlanSummary, ScheduleError, Settings, SettingsInput, Workspace,
};

#[derive(Clone)]
pub struct AppState {
    workspace: Arc<RwLock<Workspace>>,
}

impl AppState {
    pub fn new(workspace: Workspace) -> Self {
        Self {
            workspace: Arc::new(RwLock::new(workspace)),
        }
    }

    fn workspace(&self) -> Arc<RwLock<Workspace>> {
        self.workspace.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Conflict(String),
    Invalid(String),
    Overrun(String),
    Internal(String),
}

#[derive(Debug, Deserialize)]
struct NewItemPayload {
    label: String,
    detail: String,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<ScheduleError> for ApiError {
    fn from(value: ScheduleError) -> Self {
        match value {
            ScheduleError::ScheduleOverrun(_) => ApiError::Overrun(value.to_string()),
            other => ApiError::Invalid(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, "conflict", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Overrun(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "schedule_overrun", message)
            }
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/settings", get(get_settings).put(update_settings))
        .route("/items", get(list_items).put(replace_items).post(create_item))
        .route("/items/:id", delete(delete_item))
        .route(
            "/plan",
            get(get_plan).post(generate_plan).delete(clear_plan),
        )
        .route("/plan/summary", get(plan_summary))
        .route("/plan/stats", get(plan_stats))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, workspace: Workspace) -> std::io::Result<()> {
    let state = AppState::new(workspace);
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn get_settings(State(state): State<AppState>) -> Json<SettingsInput> {
    let workspace = state.workspace();
    let guard = workspace.read();
    Json(SettingsInput::from(guard.settings()))
}

async fn update_settings(
    State(state): State<AppState>,
    Json(input): Json<SettingsInput>,
) -> Result<Json<SettingsInput>, ApiError> {
    let settings = Settings::try_from(input).map_err(|err| ApiError::invalid(err.to_string()))?;
    let workspace = state.workspace();
    let mut guard = workspace.write();
    guard
        .set_settings(settings)
        .map_err(|err| ApiError::invalid(err.to_string()))?;
    Ok(Json(SettingsInput::from(guard.settings())))
}

async fn list_items(State(state): State<AppState>) -> Json<Vec<Item>> {
    let workspace = state.workspace();
    let items = workspace.read().items().to_vec();
    Json(items)
}

async fn replace_items(
    State(state): State<AppState>,
    Json(items): Json<Vec<Item>>,
) -> Result<Json<Vec<Item>>, ApiError> {
    let mut labels = HashSet::with_capacity(items.len());
    if let Some(dup) = items.iter().find(|item| !labels.insert(item.label.trim())) {
        return Err(ApiError::Conflict(format!(
            "item '{}' appears more than once",
            dup.label.trim()
        )));
    }
    let workspace = state.workspace();
    let mut guard = workspace.write();
    guard
        .replace_items(items)
        .map_err(|err| ApiError::invalid(err.to_string()))?;
    Ok(Json(guard.items().to_vec()))
}

async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<NewItemPayload>,
) -> Result<(StatusCode, Json<Item>), ApiError> {
    let workspace = state.workspace();
    let mut guard = workspace.write();
    let label = payload.label.trim();
    if guard.items().iter().any(|item| item.label == label) {
        return Err(ApiError::Conflict(format!("item '{label}' already exists")));
    }
    let created = guard
        .add_item(label, payload.detail.trim())
        .map_err(|err| ApiError::invalid(err.to_string()))?
        .clone();
    Ok((StatusCode::CREATED, Json(created)))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let workspace = state.workspace();
    let removed = workspace.write().remove_item(&item_id);
    if !removed {
        return Err(ApiError::not_found(format!("item {item_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn generate_plan(State(state): State<AppState>) -> Result<Json<PlanSummary>, ApiError> {
    let workspace = state.workspace();
    let summary = tokio::task::spawn_blocking(move || workspace.write().generate_plan())
        .await
        .map_err(|err| ApiError::internal(err.to_string()))??;
    Ok(Json(summary))
}

async fn get_plan(State(state): State<AppState>) -> Result<Json<Plan>, ApiError> {
    let workspace = state.workspace();
    let plan = workspace.read().plan().cloned();
    plan.map(Json)
        .ok_or_else(|| ApiError::not_found("no plan generated"))
}

async fn clear_plan(State(state): State<AppState>) -> StatusCode {
    state.workspace().write().clear_plan();
    StatusCode::NO_CONTENT
}

async fn plan_summary(State(state): State<AppState>) -> Result<Json<PlanSummary>, ApiError> {
    let workspace = state.workspace();
    let summary = workspace.read().plan_summary();
    summary
        .map(Json)
        .ok_or_else(|| ApiError::not_found("no plan generated"))
}

async fn plan_stats(State(state): State<AppState>) -> Result<Json<Vec<DailyStat>>, ApiError> {
    let workspace = state.workspace();
    let stats = workspace.read().plan().map(Plan::daily_stats);
    stats
        .map(Json)
        .ok_or_else(|| ApiError::not_found("no plan generated"))
}
