// src/db/notification_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::notification::{Notification, SentNotification},
};

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        recipient_id: Uuid,
        title: &str,
        message: &str,
        topic: &str,
        created_by: Option<Uuid>,
        attachment_url: Option<&str>,
    ) -> Result<Notification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (recipient_id, title, message, topic, created_by, attachment_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(recipient_id)
        .bind(title)
        .bind(message)
        .bind(topic)
        .bind(created_by)
        .bind(attachment_url)
        .fetch_one(executor)
        .await?;

        Ok(notification)
    }

    // Recebe o executor para rodar em cima da conexão RLS do chamador
    pub async fn list_for_recipient<'e, E>(
        &self,
        executor: E,
        recipient_id: Uuid,
    ) -> Result<Vec<Notification>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE recipient_id = $1 ORDER BY created_at DESC",
        )
        .bind(recipient_id)
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn mark_read(&self, id: Uuid, recipient_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND recipient_id = $2",
        )
        .bind(id)
        .bind(recipient_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // Trilha de auditoria, somente para remetentes admin
    pub async fn create_audit<'e, E>(
        &self,
        executor: E,
        sender_id: Uuid,
        title: &str,
        message: &str,
        topic: &str,
        recipients: i32,
    ) -> Result<SentNotification, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let audit = sqlx::query_as::<_, SentNotification>(
            r#"
            INSERT INTO sent_notifications (sender_id, title, message, topic, recipients)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(sender_id)
        .bind(title)
        .bind(message)
        .bind(topic)
        .bind(recipients)
        .fetch_one(executor)
        .await?;

        Ok(audit)
    }
}
