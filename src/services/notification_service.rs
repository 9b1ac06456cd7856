// src/services/notification_service.rs
//
// Despachante de notificações: resolve o conjunto de destinatários, grava uma
// linha por destinatário e dispara UMA chamada de e-mail com o mesmo payload.
// O e-mail é fire-and-forget: falha vira log, nunca desfaz as linhas.

use uuid::Uuid;

use crate::{
    clients::EmailClient,
    common::error::AppError,
    db::{EmployeeRepository, NotificationRepository},
    models::{employee::EmployeeRole, notification::Notification},
};

// Tópico que um funcionário usa para subir documentos para os admins
pub const TOPIC_DOCUMENTI: &str = "documenti";

/// Notificação lógica, antes da resolução de destinatários.
#[derive(Debug, Clone)]
pub struct OutgoingNotification {
    pub sender_id: Option<Uuid>,
    pub sender_role: EmployeeRole,
    /// None = broadcast (resolvido pelas regras de endereçamento)
    pub recipient_id: Option<Uuid>,
    pub title: String,
    pub message: String,
    pub topic: String,
    pub attachment_url: Option<String>,
}

/// Regras de endereçamento (função pura):
/// - destinatário explícito → só ele;
/// - sem destinatário + tópico "documenti" + remetente não-admin → todos os
///   admins ativos;
/// - sem destinatário + qualquer outro caso → todas as contas ativas.
pub fn resolve_recipients(
    sender_role: EmployeeRole,
    explicit: Option<Uuid>,
    topic: &str,
    active_admins: &[Uuid],
    active_all: &[Uuid],
) -> Vec<Uuid> {
    if let Some(recipient) = explicit {
        return vec![recipient];
    }
    if topic == TOPIC_DOCUMENTI && !sender_role.is_admin() {
        return active_admins.to_vec();
    }
    active_all.to_vec()
}

/// Trilha de auditoria somente para remetentes admin.
pub fn should_audit(sender_role: EmployeeRole) -> bool {
    sender_role.is_admin()
}

#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    employee_repo: EmployeeRepository,
    email_client: EmailClient,
    pool: sqlx::PgPool,
}

impl NotificationService {
    pub fn new(
        notification_repo: NotificationRepository,
        employee_repo: EmployeeRepository,
        email_client: EmailClient,
        pool: sqlx::PgPool,
    ) -> Self {
        Self {
            notification_repo,
            employee_repo,
            email_client,
            pool,
        }
    }

    pub async fn dispatch(
        &self,
        outgoing: OutgoingNotification,
    ) -> Result<Vec<Notification>, AppError> {
        let active_admins = self
            .employee_repo
            .list_active_ids(Some(EmployeeRole::Admin))
            .await?;
        let active_all = self.employee_repo.list_active_ids(None).await?;

        let recipients = resolve_recipients(
            outgoing.sender_role,
            outgoing.recipient_id,
            &outgoing.topic,
            &active_admins,
            &active_all,
        );

        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(recipients.len());
        for recipient in &recipients {
            let notification = self
                .notification_repo
                .create(
                    &mut *tx,
                    *recipient,
                    &outgoing.title,
                    &outgoing.message,
                    &outgoing.topic,
                    outgoing.sender_id,
                    outgoing.attachment_url.as_deref(),
                )
                .await?;
            created.push(notification);
        }

        if should_audit(outgoing.sender_role) {
            if let Some(sender_id) = outgoing.sender_id {
                self.notification_repo
                    .create_audit(
                        &mut *tx,
                        sender_id,
                        &outgoing.title,
                        &outgoing.message,
                        &outgoing.topic,
                        recipients.len() as i32,
                    )
                    .await?;
            }
        }
        tx.commit().await?;

        // Exatamente uma chamada de e-mail por notificação lógica, depois do
        // commit. Fire-and-forget.
        let emails = self.recipient_emails(&recipients).await?;
        if !emails.is_empty() {
            let client = self.email_client.clone();
            let subject = outgoing.title.clone();
            let body = outgoing.message.clone();
            let topic = outgoing.topic.clone();
            tokio::spawn(async move {
                if let Err(e) = client.send(&emails, &subject, &body, &topic).await {
                    tracing::warn!("Envio de e-mail da notificação falhou: {}", e);
                }
            });
        }

        Ok(created)
    }

    async fn recipient_emails(&self, recipients: &[Uuid]) -> Result<Vec<String>, AppError> {
        let mut emails = Vec::with_capacity(recipients.len());
        for id in recipients {
            if let Some(employee) = self.employee_repo.find_by_id(*id).await? {
                emails.push(employee.email);
            }
        }
        Ok(emails)
    }

    /// Listagem das próprias notificações. O executor vem do handler, que o
    /// adquire já com as variáveis RLS definidas.
    pub async fn list_for<'e, E>(
        &self,
        executor: E,
        recipient_id: Uuid,
    ) -> Result<Vec<Notification>, AppError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        self.notification_repo
            .list_for_recipient(executor, recipient_id)
            .await
    }

    pub async fn mark_read(&self, id: Uuid, recipient_id: Uuid) -> Result<bool, AppError> {
        self.notification_repo.mark_read(id, recipient_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn explicit_recipient_wins_over_everything() {
        let target = Uuid::new_v4();
        let admins = ids(2);
        let all = ids(5);
        let resolved = resolve_recipients(
            EmployeeRole::Employee,
            Some(target),
            TOPIC_DOCUMENTI,
            &admins,
            &all,
        );
        assert_eq!(resolved, vec![target]);
    }

    #[test]
    fn documenti_from_employee_goes_to_admins_only() {
        let admins = ids(2);
        let all = ids(5);
        let resolved =
            resolve_recipients(EmployeeRole::Employee, None, TOPIC_DOCUMENTI, &admins, &all);
        assert_eq!(resolved, admins);
    }

    #[test]
    fn documenti_from_admin_broadcasts_to_everyone() {
        let admins = ids(2);
        let all = ids(5);
        let resolved =
            resolve_recipients(EmployeeRole::Admin, None, TOPIC_DOCUMENTI, &admins, &all);
        assert_eq!(resolved, all);
    }

    #[test]
    fn other_topics_broadcast_to_everyone() {
        let admins = ids(2);
        let all = ids(5);
        let resolved =
            resolve_recipients(EmployeeRole::Employee, None, "avvisi", &admins, &all);
        assert_eq!(resolved, all);
    }

    #[test]
    fn audit_only_for_admin_senders() {
        assert!(should_audit(EmployeeRole::Admin));
        assert!(!should_audit(EmployeeRole::Employee));
    }
}
