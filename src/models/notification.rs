// src/models/notification.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,

    // None = broadcast (a linha concreta sempre tem destinatário; o broadcast
    // é resolvido na criação, uma linha por destinatário)
    pub recipient_id: Option<Uuid>,

    #[schema(example = "Permesso aprovado")]
    pub title: String,
    pub message: String,

    #[schema(example = "permessi-approvazione")]
    pub topic: String,

    pub is_read: bool,
    pub created_by: Option<Uuid>,
    pub attachment_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Trilha de auditoria: gravada somente para envios originados por admin
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SentNotification {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub title: String,
    pub message: String,
    pub topic: String,
    pub recipients: i32,
    pub created_at: DateTime<Utc>,
}
