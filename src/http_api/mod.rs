use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    AlertSummary, Clock, InputError, RecordStore, ServiceForecast, Tracker, TrackerError,
    validate_name,
};

pub type SharedTracker = Tracker<Box<dyn RecordStore + Send + Sync>, Box<dyn Clock + Send + Sync>>;

#[derive(Clone)]
pub struct AppState {
    tracker: Arc<RwLock<SharedTracker>>,
}

impl AppState {
    pub fn new(tracker: SharedTracker) -> Self {
        Self {
            tracker: Arc::new(RwLock::new(tracker)),
        }
    }

    pub fn with_shared(tracker: Arc<RwLock<SharedTracker>>) -> Self {
        Self { tracker }
    }

    fn tracker(&self) -> Arc<RwLock<SharedTracker>> {
        self.tracker.clone()
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
    Invalid(String),
    Internal(String),
}

impl From<InputError> for ApiError {
    fn from(value: InputError) -> Self {
        ApiError::Invalid(value.to_string())
    }
}

impl From<TrackerError> for ApiError {
    fn from(value: TrackerError) -> Self {
        match value {
            TrackerError::NotFound(id) => ApiError::NotFound(format!("record {id} not found")),
            TrackerError::Persistence(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                tracing::error!(%message, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateRecordPayload {
    pub name: String,
    pub last_service_date: NaiveDate,
    pub interval_days: i32,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateRecordPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last_service_date: Option<NaiveDate>,
    #[serde(default)]
    pub interval_days: Option<i32>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/records", get(list_records).post(create_record))
        .route(
            "/records/:id",
            get(get_record).put(update_record).delete(delete_record),
        )
        .route("/alerts", get(alerts))
        .route("/save", post(save))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, tracker: SharedTracker) -> std::io::Result<()> {
    let app = router(AppState::new(tracker));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_records(State(state): State<AppState>) -> Json<Vec<ServiceForecast>> {
    let tracker = state.tracker();
    let forecasts = tracker.read().forecasts();
    Json(forecasts)
}

async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ServiceForecast>, ApiError> {
    let tracker = state.tracker();
    let forecast = tracker.read().forecast(&id);
    forecast
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("record {id} not found")))
}

async fn create_record(
    State(state): State<AppState>,
    Json(payload): Json<CreateRecordPayload>,
) -> Result<(StatusCode, Json<ServiceForecast>), ApiError> {
    let name = validate_name(&payload.name)?.to_string();
    let tracker = state.tracker();
    let forecast = {
        let mut guard = tracker.write();
        let id = guard
            .add(name, payload.last_service_date, payload.interval_days)
            .id()
            .to_string();
        guard
            .forecast(&id)
            .ok_or_else(|| ApiError::Internal("record not found after creation".into()))?
    };
    Ok((StatusCode::CREATED, Json(forecast)))
}

async fn update_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRecordPayload>,
) -> Result<Json<ServiceForecast>, ApiError> {
    let name = payload
        .name
        .as_deref()
        .map(validate_name)
        .transpose()?
        .map(str::to_string);
    let tracker = state.tracker();
    let forecast = {
        let mut guard = tracker.write();
        if guard.get(&id).is_none() {
            return Err(ApiError::NotFound(format!("record {id} not found")));
        }
        if let Some(name) = name {
            guard.rename(&id, name)?;
        }
        if let Some(date) = payload.last_service_date {
            guard.record_service(&id, date)?;
        }
        if let Some(days) = payload.interval_days {
            guard.set_interval(&id, days)?;
        }
        guard
            .forecast(&id)
            .ok_or_else(|| ApiError::Internal("record not found after update".into()))?
    };
    Ok(Json(forecast))
}

async fn delete_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let tracker = state.tracker();
    tracker.write().remove(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn alerts(State(state): State<AppState>) -> Json<AlertSummary> {
    let tracker = state.tracker();
    let summary = tracker.read().alerts();
    Json(summary)
}

async fn save(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let tracker = state.tracker();
    let saved = {
        let guard = tracker.read();
        guard.save()?;
        guard.len()
    };
    Ok(Json(json!({ "saved": saved })))
}
