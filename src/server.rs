use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderValue, Method, Request, StatusCode, header},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use tracing::{error, info, warn};

use crate::AppState;
use crate::auth::{MemoryDirectory, TokenService, UserDirectory};
use crate::config::AppConfig;
use crate::history::HistoryStore;
use crate::llm::{ChatCompletionsClient, CompletionService, CompletionSettings};
use crate::session;

/// Start the Axum server with the provided configuration.
pub async fn start_server(
    config: Arc<AppConfig>,
    settings: CompletionSettings,
) -> anyhow::Result<()> {
    info!(
        name: "completion.config.loaded",
        base_url = %settings.base_url,
        model = %settings.model,
        "Completion backend configured"
    );

    let users: Arc<dyn UserDirectory> = Arc::new(
        MemoryDirectory::new().with_user(
            config.auth.seed_user.clone(),
            config.auth.seed_password.clone(),
        ),
    );
    info!(
        name: "auth.seeded",
        username = %config.auth.seed_user,
        "Seeded development user"
    );

    let tokens = TokenService::new(&config.auth.secret, config.auth.token_ttl_minutes);
    let completions: Arc<dyn CompletionService> = Arc::new(ChatCompletionsClient::new(settings));
    let history = HistoryStore::new();

    let state = AppState {
        config: Arc::clone(&config),
        tokens,
        users,
        completions,
        history,
    };

    let app = build_router(state)?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Build the application router around shared state.
///
/// Kept separate from [`start_server`] so tests can drive the exact
/// production routes without binding a port.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let mut origins = Vec::new();
    for origin in &state.config.server.allowed_origins {
        let value: HeaderValue = origin
            .parse()
            .with_context(|| format!("invalid allowed origin: {origin}"))?;
        origins.push(value);
    }

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    Ok(Router::new()
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/ai/chat", get(session::chat_ws))
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            // Query strings can carry tokens; span only the path.
            tracing::debug_span!(
                "request",
                method = %request.method(),
                path = request.uri().path()
            )
        }))
        .with_state(state))
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for login.
#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

/// Response body for a successful login.
#[derive(Debug, Serialize)]
struct LoginResponse {
    status: String,
    token: String,
}

/// Error body for failed requests.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// POST /api/v1/auth/login - Trade credentials for a signed token.
///
/// The rejection is uniform: the response never says whether the username
/// or the password was wrong.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<ErrorResponse>)> {
    let identity = match state
        .users
        .verify_credentials(&req.username, &req.password)
        .await
    {
        Some(identity) => identity,
        None => {
            warn!(name: "auth.login_failed", username = %req.username, "Login rejected");
            return Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Invalid credentials".to_string(),
                }),
            ));
        }
    };

    let token = state.tokens.issue(&identity).map_err(|err| {
        error!(name: "auth.token_issue_failed", error = %err, "Failed to sign token");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Token issuance failed".to_string(),
            }),
        )
    })?;

    info!(name: "auth.login", identity = %identity, "Login succeeded");
    Ok(Json(LoginResponse {
        status: "success".to_string(),
        token,
    }))
}
