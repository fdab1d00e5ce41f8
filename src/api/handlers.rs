//! HTTP request handlers

use super::twiml::message_response;
use super::types::{
    ErrorResponse, HealthResponse, ReceiptRequest, ReceiptResponse, WebhookForm,
};
use super::AppState;
use crate::dispatcher::{DispatchError, InboundMessage, Receipt};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Inbound customer messages from the messaging provider
        .route("/whatsapp", post(whatsapp_webhook))
        // Operator finished with a handed-off customer
        .route("/notifications", post(receipt_notification))
        .route("/health", get(health))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Messaging Webhook
// ============================================================

async fn whatsapp_webhook(
    State(state): State<AppState>,
    Form(form): Form<WebhookForm>,
) -> Result<Response, AppError> {
    let message = InboundMessage {
        from: form.from.unwrap_or_default(),
        body: form.body.trim().to_string(),
    };

    let turn = state.dispatcher.handle_message(&message).await?;
    let text = turn.reply.as_ref().map(|r| state.presenter.render(r));

    Ok((
        [(header::CONTENT_TYPE, "application/xml")],
        message_response(text.as_deref()),
    )
        .into_response())
}

// ============================================================
// Receipt Notification
// ============================================================

async fn receipt_notification(
    State(state): State<AppState>,
    Json(req): Json<ReceiptRequest>,
) -> Result<Json<ReceiptResponse>, AppError> {
    let receipt = Receipt {
        customer_id: req.customer_id,
        message_body: req.message_body,
    };
    let outcome = state.dispatcher.handle_receipt(&receipt).await?;

    Ok(Json(ReceiptResponse {
        customer_id: outcome.customer_id,
        reset: outcome.reset,
    }))
}

// ============================================================
// Service Info
// ============================================================

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        active_sessions: state.dispatcher.store().active_sessions().await,
    })
}

async fn get_version() -> &'static str {
    concat!("duka-chat ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
}

impl From<DispatchError> for AppError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::MissingField(_) => AppError::BadRequest(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        tracing::debug!(status = %status, error = %message, "Request rejected");
        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
