use crate::capi_client::CapiClient;
use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::models::{ConversionEvent, EventsPayload, LeadRequest};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
///
/// Read-only after startup; concurrent requests share nothing mutable.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Conversions API client. `None` when no access token is configured;
    /// POST requests then fail fast with a descriptive 500.
    pub capi_client: Option<CapiClient>,
}

/// Builds the relay router.
///
/// `/` and `/api/lead` share one method router so both the bare root and the
/// path the capture form was written against work. Shared with the
/// integration tests, which mount it on an ephemeral port.
pub fn app(state: Arc<AppState>) -> Router {
    let lead_routes = get(lead_hint)
        .post(relay_lead)
        .fallback(method_not_allowed);

    Router::new()
        .route("/health", get(health))
        .route("/", lead_routes.clone())
        .route("/api/lead", lead_routes)
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "meta-lead-relay",
            "version": "0.1.0"
        })),
    )
}

/// GET / and GET /api/lead
///
/// Static health/hint payload for anyone poking the endpoint in a browser.
/// Never triggers an outbound call.
pub async fn lead_hint() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "ok": true, "hint": "POST /api/lead with JSON body" })),
    )
}

/// Fallback for methods other than GET/POST.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// POST / and POST /api/lead
///
/// Validates configuration, normalizes the lead into a Conversions API event
/// (hashing email and phone), submits it upstream, and relays the upstream
/// JSON back to the caller. Exactly one outbound call per request; nothing
/// is stored or retried.
pub async fn relay_lead(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    // Credential check comes first so a misconfigured deploy never burns an
    // upstream call on a request that cannot be authenticated.
    let client = state
        .capi_client
        .as_ref()
        .ok_or_else(|| AppError::MissingConfig("META_ACCESS_TOKEN is missing".to_string()))?;

    // A malformed body is coerced to the empty record, not rejected: the
    // capture page fires and forgets, and a half-filled event still matches
    // better than a dropped one.
    let lead: LeadRequest = serde_json::from_slice(&body).unwrap_or_default();
    tracing::info!(
        "Received lead (email: {}, phone: {})",
        lead.email.is_some(),
        lead.phone.is_some()
    );

    let event = ConversionEvent::from_lead(lead, state.config.test_event_code.clone());
    let event_id = event.event_id.clone();
    let payload = EventsPayload::single(event);

    let outcome = client
        .send_events(&payload)
        .await
        .context("relaying lead event")?;

    if !outcome.accepted {
        return Err(AppError::UpstreamRejected(outcome.meta));
    }

    tracing::info!("Lead event {} relayed successfully", event_id);
    Ok((
        StatusCode::OK,
        Json(json!({ "ok": true, "meta": outcome.meta })),
    ))
}
