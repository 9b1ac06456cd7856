// src/handlers/subscribers.rs
//
// Painel de revenda SaaS (somente admin): assinantes, ledger de pagamentos,
// flag de manutenção e chaveamento de domínio com modo dry-run.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    models::subscriber::{BillingInterval, Payment, Subscriber},
    services::subscriber_service::{ProvisionOutcome, ToggleOutcome},
};

// Vira nome de repositório e de projeto: minúsculas, dígitos e hífens
fn validate_project_name(name: &str) -> Result<(), ValidationError> {
    let shape_ok = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if name.is_empty() || name.len() > 63 || !shape_ok || name.starts_with('-') {
        let mut err = ValidationError::new("project_name");
        err.message = Some("Use minúsculas, dígitos e hífens.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriberPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(email(message = "O e-mail é inválido."))]
    pub email: String,

    #[validate(custom(function = "validate_project_name"))]
    #[schema(example = "da-mario")]
    pub project_name: String,

    pub subscription_type: BillingInterval,
    pub stripe_customer_id: Option<String>,
    pub custom_domain: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ToggleQuery {
    // dry=1 relata as chamadas externas sem executar
    pub dry: Option<u8>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatusQuery {
    pub subscriber_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatusPayload {
    pub subscriber_id: Uuid,
    pub maintenance: bool,
}

#[utoipa::path(
    post,
    path = "/api/subscribers",
    tag = "Subscribers",
    request_body = CreateSubscriberPayload,
    responses(
        (status = 201, description = "Assinante criado; falhas de provisionamento voltam como warnings", body = ProvisionOutcome)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_subscriber(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateSubscriberPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let outcome = app_state
        .subscriber_service
        .create(
            &payload.name,
            &payload.email,
            &payload.project_name,
            payload.subscription_type,
            payload.stripe_customer_id.as_deref(),
            payload.custom_domain.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

#[utoipa::path(
    get,
    path = "/api/subscribers",
    tag = "Subscribers",
    responses(
        (status = 200, description = "Todos os assinantes", body = Vec<Subscriber>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_subscribers(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Subscriber>>, AppError> {
    let subscribers = app_state.subscriber_service.list().await?;
    Ok(Json(subscribers))
}

#[utoipa::path(
    get,
    path = "/api/subscribers/{id}",
    tag = "Subscribers",
    params(("id" = Uuid, Path, description = "ID do assinante")),
    responses(
        (status = 200, description = "Assinante", body = Subscriber),
        (status = 404, description = "Assinante não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_subscriber(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Subscriber>, AppError> {
    let subscriber = app_state.subscriber_service.get(id).await?;
    Ok(Json(subscriber))
}

#[utoipa::path(
    get,
    path = "/api/subscribers/{id}/payments",
    tag = "Subscribers",
    params(("id" = Uuid, Path, description = "ID do assinante")),
    responses(
        (status = 200, description = "Ledger de pagamentos do assinante", body = Vec<Payment>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_subscriber_payments(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Payment>>, AppError> {
    let payments = app_state.subscriber_service.payments(id).await?;
    Ok(Json(payments))
}

#[utoipa::path(
    delete,
    path = "/api/subscribers/{id}",
    tag = "Subscribers",
    params(("id" = Uuid, Path, description = "ID do assinante")),
    responses(
        (status = 200, description = "Assinante removido; falhas de desprovisionamento voltam como warnings"),
        (status = 404, description = "Assinante não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_subscriber(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let warnings = app_state.subscriber_service.delete(id).await?;
    Ok(Json(json!({ "deleted": true, "warnings": warnings })))
}

#[utoipa::path(
    put,
    path = "/api/subscribers/{id}/toggle",
    tag = "Subscribers",
    params(("id" = Uuid, Path, description = "ID do assinante"), ToggleQuery),
    responses(
        (status = 200, description = "Modo invertido (ou relatado, em dry-run)", body = ToggleOutcome),
        (status = 404, description = "Assinante sem domínio ou projeto provisionado")
    ),
    security(("api_jwt" = []))
)]
pub async fn toggle_subscriber_domain(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ToggleQuery>,
) -> Result<Json<ToggleOutcome>, AppError> {
    let dry = query.dry == Some(1);
    let outcome = app_state.subscriber_service.toggle_domain(id, dry).await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/project-status",
    tag = "Dashboard",
    params(ProjectStatusQuery),
    responses(
        (status = 200, description = "Flag de manutenção atual do projeto")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_project_status(
    State(app_state): State<AppState>,
    Query(query): Query<ProjectStatusQuery>,
) -> Result<impl IntoResponse, AppError> {
    let maintenance = app_state
        .subscriber_service
        .get_maintenance(query.subscriber_id)
        .await?;
    Ok(Json(json!({ "maintenance": maintenance })))
}

#[utoipa::path(
    put,
    path = "/api/dashboard/project-status",
    tag = "Dashboard",
    request_body = ProjectStatusPayload,
    responses(
        (status = 200, description = "Flag de manutenção gravada")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_project_status(
    State(app_state): State<AppState>,
    Json(payload): Json<ProjectStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .subscriber_service
        .set_maintenance(payload.subscriber_id, payload.maintenance)
        .await?;
    Ok(Json(json!({ "maintenance": payload.maintenance })))
}
