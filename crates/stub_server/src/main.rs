use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use shared::{
    domain::{style_by_key, MAX_PROMPT_CHARS},
    error::{ApiError, ApiException, ErrorCode},
    protocol::{CreateLogoRequest, CreateLogoResponse, LogoJobStatus, SurpriseMeResponse},
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;
use uuid::Uuid;

mod config;

use config::load_settings;

const SURPRISE_PROMPTS: &[&str] = &[
    "A blue lion logo reading 'HEXA' in bold letters",
    "A minimalist fox head made of three triangles",
    "A retro coffee cup with steam forming the letter 'B'",
    "A mountain range inside a circle, reading 'SUMMIT'",
    "A playful octopus holding paint brushes",
];

struct AppState {
    image_origin: Url,
    latency: Duration,
    surprise_cursor: AtomicUsize,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let addr = settings.socket_addr()?;
    let state = AppState {
        image_origin: settings.image_origin()?,
        latency: Duration::from_millis(settings.latency_ms),
        surprise_cursor: AtomicUsize::new(0),
    };
    let app = build_router(Arc::new(state));

    info!(%addr, latency_ms = settings.latency_ms, "stub generation service listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/logos", post(create_logo))
        .route("/api/logos/surprise-me", get(surprise_me))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn create_logo(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateLogoRequest>,
) -> ApiResult<CreateLogoResponse> {
    validate_create(&req).map_err(|e| (StatusCode::BAD_REQUEST, Json(ApiError::from(e))))?;

    if !state.latency.is_zero() {
        tokio::time::sleep(state.latency).await;
    }

    let id = Uuid::new_v4().to_string();
    let image_url = state
        .image_origin
        .join(&format!("images/{id}.png"))
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiError::new(ErrorCode::Internal, e.to_string())),
            )
        })?;
    info!(logo_id = %id, style = %req.style, "logo generated");

    Ok(Json(CreateLogoResponse {
        id,
        status: LogoJobStatus::Completed,
        image_url: Some(image_url.to_string()),
        error: None,
        created_at: Some(Utc::now()),
    }))
}

async fn surprise_me(State(state): State<Arc<AppState>>) -> Json<SurpriseMeResponse> {
    let idx = state.surprise_cursor.fetch_add(1, Ordering::Relaxed) % SURPRISE_PROMPTS.len();
    Json(SurpriseMeResponse {
        prompt: SURPRISE_PROMPTS[idx].to_string(),
    })
}

fn validate_create(req: &CreateLogoRequest) -> Result<(), ApiException> {
    if req.prompt.trim().is_empty() {
        return Err(ApiException::new(ErrorCode::Validation, "prompt is required"));
    }
    if req.prompt.chars().count() > MAX_PROMPT_CHARS {
        return Err(ApiException::new(
            ErrorCode::Validation,
            format!("prompt exceeds {MAX_PROMPT_CHARS} characters"),
        ));
    }
    if style_by_key(&req.style).is_none() {
        return Err(ApiException::new(
            ErrorCode::Validation,
            format!("unknown style '{}'", req.style),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
