use crate::llm::ChatRequest;
use crate::session::{login_cookie, logout_cookie, SessionState};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Json, Redirect, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use chatgate_core::AppError;
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub const WRONG_PASSWORD: &str = "Wrong password";

pub fn router(state: Arc<AppState>) -> Router {
    let statics = ServeDir::new(&state.config.static_dir);
    Router::new()
        .route("/", get(index_handler))
        .route("/login", get(login_form_handler).post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/api/chat", post(chat_handler))
        .route("/healthz", get(health_handler))
        .nest_service("/static", statics)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ApiError {
    BadRequest(&'static str),
    Unauthorized,
    Upstream(AppError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ApiError::Upstream(err) => {
                tracing::error!(error = %err, "upstream chat request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Upstream request failed")
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

// ── Request types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LoginForm {
    #[serde(default)]
    password: String,
}

/// Pull a non-blank, trimmed `message` out of a JSON body.
fn chat_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let message = value.get("message")?.as_str()?.trim();
    (!message.is_empty()).then(|| message.to_string())
}

/// Exact equality, compared on digests so timing says nothing about the password.
fn password_matches(submitted: &str, expected: &str) -> bool {
    Sha256::digest(submitted.as_bytes()) == Sha256::digest(expected.as_bytes())
}

// ── Route handlers ──────────────────────────────────────────────────────────

async fn index_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    match state.signer.session_state(&headers) {
        SessionState::Authenticated => Html(state.config.chat_page.clone()).into_response(),
        SessionState::Unauthenticated => Redirect::to("/login").into_response(),
    }
}

async fn login_form_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.config.login_page_with(""))
}

async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> Response {
    if password_matches(&form.password, &state.config.gate_password) {
        tracing::info!("visitor authenticated");
        let token = state.signer.issue();
        ([login_cookie(&token, &headers)], Redirect::to("/")).into_response()
    } else {
        tracing::warn!("rejected login attempt");
        (
            StatusCode::FORBIDDEN,
            Html(state.config.login_page_with(WRONG_PASSWORD)),
        )
            .into_response()
    }
}

async fn logout_handler() -> Response {
    ([logout_cookie()], Redirect::to("/login")).into_response()
}

async fn chat_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    if state.config.require_auth_on_api
        && state.signer.session_state(&headers) != SessionState::Authenticated
    {
        return Err(ApiError::Unauthorized);
    }

    let message = chat_message(&body).ok_or(ApiError::BadRequest("Message is required"))?;
    let request = ChatRequest::new(&state.config.model, &state.config.system_prompt, &message);
    let reply = state
        .chat
        .complete(&request)
        .await
        .map_err(ApiError::Upstream)?;

    Ok(Json(json!({ "reply": reply.trim() })))
}

async fn health_handler() -> &'static str {
    "ok"
}
