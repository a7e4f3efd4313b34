use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use lendtree_model::{ModelError, ModelStore, TrainedModel};
use lendtree_trainer::{train_from_csv, TrainerError, FEATURE_COLUMNS};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared per-process service state.
#[derive(Clone)]
pub struct AppState {
    /// CSV the train endpoint reads from.
    pub csv_path: PathBuf,
    /// Artifact directory handle.
    pub store: ModelStore,
    pub start_time: Instant,
    pub req_count: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(csv_path: PathBuf, store: ModelStore) -> Self {
        Self {
            csv_path,
            store,
            start_time: Instant::now(),
            req_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn record_request(&self) -> u64 {
        self.req_count.fetch_add(1, Ordering::Relaxed) as u64 + 1
    }

    fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

pub type SharedState = Arc<AppState>;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: u64,
    model_present: bool,
    req_total: u64,
}

#[derive(Debug, Serialize)]
struct TrainResponse {
    ok: bool,
    message: &'static str,
    features: Vec<String>,
    target: String,
    samples_used: usize,
    rows_skipped: usize,
}

#[derive(Debug, Default, Deserialize)]
struct PredictRequest {
    /// Applicant record keyed by column name.
    #[serde(default)]
    record: serde_json::Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct PredictResponse {
    ok: bool,
    features_used: Vec<String>,
    input_vector: Vec<f64>,
    prediction: String,
    label: u8,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new<S: Into<String>>(status: StatusCode, message: S) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn internal<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let payload = Json(ErrorResponse {
            ok: false,
            error: self.message,
        });
        (self.status, payload).into_response()
    }
}

impl From<TrainerError> for ApiError {
    fn from(err: TrainerError) -> Self {
        // The training CSV lives with the service, so schema and data
        // problems are server-side failures, not caller mistakes.
        Self::internal(err.to_string())
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::NotTrained(_) | ModelError::InvalidInput(_) => {
                Self::bad_request(err.to_string())
            }
            ModelError::Corrupt(_) | ModelError::Io(_) | ModelError::Json(_) => {
                Self::internal(err.to_string())
            }
        }
    }
}

pub async fn start_server(state: AppState, addr: &str) -> Result<()> {
    let shared = Arc::new(state);
    let app = build_router(shared);
    let listener = bind_listener(addr).await?;
    axum::serve(listener, app)
        .await
        .context("API server terminated unexpectedly")
}

async fn bind_listener(addr: &str) -> Result<tokio::net::TcpListener> {
    if let Ok(socket_addr) = addr.parse::<SocketAddr>() {
        tokio::net::TcpListener::bind(socket_addr)
            .await
            .with_context(|| format!("failed to bind API listener on {socket_addr}"))
    } else {
        tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind API listener on {addr}"))
    }
}

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/train", post(handle_train))
        .route("/predict", post(handle_predict))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_index() -> String {
    format!(
        "✅ Loan Decision Tree API (Features: {})",
        FEATURE_COLUMNS.join(", ")
    )
}

async fn handle_health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let req_total = state.record_request();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.uptime_seconds(),
        model_present: state.store.exists(),
        req_total,
    })
}

async fn handle_train(State(state): State<SharedState>) -> Result<Json<TrainResponse>, ApiError> {
    state.record_request();
    info!("training requested, reading {}", state.csv_path.display());

    let TrainedModel { tree, meta } = train_from_csv(&state.csv_path).map_err(|err| {
        warn!("training failed: {err}");
        ApiError::from(err)
    })?;
    state.store.save(&tree, &meta)?;

    info!(
        samples_used = meta.samples_used,
        rows_skipped = meta.rows_skipped,
        depth = tree.depth(),
        leaves = tree.leaf_count(),
        "model trained and saved"
    );

    Ok(Json(TrainResponse {
        ok: true,
        message: "Model trained & saved.",
        features: meta.feature_names,
        target: meta.target_name,
        samples_used: meta.samples_used,
        rows_skipped: meta.rows_skipped,
    }))
}

async fn handle_predict(
    State(state): State<SharedState>,
    request: Option<Json<PredictRequest>>,
) -> Result<Json<PredictResponse>, ApiError> {
    state.record_request();

    // A missing or unreadable body counts as an empty record; feature
    // extraction then rejects it with the full requirement list.
    let request = request.map(|Json(request)| request).unwrap_or_default();

    let model = state.store.load()?;
    let vector = model.meta.extract_vector(&request.record)?;
    let label = model.tree.predict(&vector);

    Ok(Json(PredictResponse {
        ok: true,
        features_used: model.meta.feature_names,
        input_vector: vector,
        prediction: prediction_text(label).to_string(),
        label,
    }))
}

/// Human-readable verdict for a binary label.
fn prediction_text(label: u8) -> &'static str {
    if label == 1 {
        "Approved ✅"
    } else {
        "Rejected ❌"
    }
}
