// src/handlers/stripe_webhook.rs
//
// Borda do webhook de pagamentos: corpo cru (a assinatura cobre os bytes
// exatos), verificação do header antes de qualquer parse e conversão imediata
// para o evento fechado. Tipo de evento desconhecido é reconhecido com 200,
// senão o provedor reentrega para sempre.

use axum::{body::Bytes, extract::State, http::HeaderMap, http::StatusCode};

use crate::{clients::stripe, common::error::AppError, config::AppState};

#[utoipa::path(
    post,
    path = "/api/stripe/webhook",
    tag = "Stripe",
    request_body(content = String, content_type = "application/json"),
    responses(
        (status = 200, description = "Evento aplicado (ou ignorado)"),
        (status = 400, description = "Assinatura inválida ou corpo malformado")
    )
)]
pub async fn handle_stripe_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let sig_header = headers
        .get("Stripe-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::InvalidWebhookSignature)?;

    stripe::verify_webhook_signature(&body, sig_header, &app_state.stripe_webhook_secret)?;

    let event: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|_| AppError::InvalidWebhookSignature)?;

    let event_type = event["type"].as_str().unwrap_or("");
    let object = &event["data"]["object"];

    app_state
        .subscriber_service
        .apply_subscription_event(event_type, object)
        .await?;

    Ok(StatusCode::OK)
}
