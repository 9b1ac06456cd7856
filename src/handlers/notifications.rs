// src/handlers/notifications.rs
//
// Notificações: admin manda para um destinatário ou broadcast; funcionário
// manda documentos para os admins via tópico "documenti". A listagem própria
// passa pela conexão RLS.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::get_rls_transaction, error::AppError},
    config::AppState,
    middleware::auth::AuthenticatedEmployee,
    models::notification::Notification,
    services::notification_service::OutgoingNotification,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationPayload {
    // None = broadcast (resolvido pelas regras de endereçamento)
    pub recipient_id: Option<Uuid>,

    #[validate(length(min = 1, max = 200, message = "O título é obrigatório."))]
    pub title: String,

    #[validate(length(min = 1, message = "A mensagem é obrigatória."))]
    pub message: String,

    #[validate(length(min = 1, max = 100, message = "O tópico é obrigatório."))]
    pub topic: String,

    #[validate(url(message = "O anexo deve ser uma URL válida."))]
    pub attachment_url: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/notifications",
    tag = "Notifications",
    request_body = CreateNotificationPayload,
    responses(
        (status = 201, description = "Uma linha por destinatário resolvido", body = Vec<Notification>)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_notification(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(sender): AuthenticatedEmployee,
    Json(payload): Json<CreateNotificationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let created = app_state
        .notification_service
        .dispatch(OutgoingNotification {
            sender_id: Some(sender.id),
            sender_role: sender.role,
            recipient_id: payload.recipient_id,
            title: payload.title,
            message: payload.message,
            topic: payload.topic,
            attachment_url: payload.attachment_url,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    responses(
        (status = 200, description = "Notificações do funcionário autenticado", body = Vec<Notification>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_my_notifications(
    State(app_state): State<AppState>,
    user: AuthenticatedEmployee,
) -> Result<Json<Vec<Notification>>, AppError> {
    let mut rls_tx = get_rls_transaction(&app_state, &user).await?;
    let rows = app_state
        .notification_service
        .list_for(&mut *rls_tx, user.0.id)
        .await?;
    Ok(Json(rows))
}

#[utoipa::path(
    put,
    path = "/api/notifications/{id}/read",
    tag = "Notifications",
    params(("id" = Uuid, Path, description = "ID da notificação")),
    responses(
        (status = 204, description = "Notificação marcada como lida"),
        (status = 404, description = "Notificação não encontrada para este destinatário")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_notification_read(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !app_state.notification_service.mark_read(id, employee.id).await? {
        return Err(AppError::ResourceNotFound("Notificação".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
