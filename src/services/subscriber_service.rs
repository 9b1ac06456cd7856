// src/services/subscriber_service.rs
//
// Orquestra o ciclo de vida de um assinante SaaS: criação com provisionamento
// best-effort (repositório clonado do template + projeto de deploy), eventos
// de cobrança vindos do webhook e o chaveamento de manutenção do projeto.

use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    clients::{GithubClient, VercelClient},
    common::error::AppError,
    db::SubscriberRepository,
    models::subscriber::{BillingInterval, Payment, Subscriber},
    services::subscription::{self, BillingState, SubscriptionEvent},
};

/// Criação do assinante com o resultado do provisionamento. O registro já
/// está persistido quando os warnings são produzidos.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionOutcome {
    pub subscriber: Subscriber,
    pub warnings: Vec<String>,
}

/// Resultado do chaveamento de domínio. Em dry-run as ações são apenas
/// relatadas, nada é executado.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
    pub dry_run: bool,
    pub maintenance: bool,
    pub actions: Vec<String>,
}

#[derive(Clone)]
pub struct SubscriberService {
    subscriber_repo: SubscriberRepository,
    github: GithubClient,
    vercel: VercelClient,
    pool: sqlx::PgPool,
}

impl SubscriberService {
    pub fn new(
        subscriber_repo: SubscriberRepository,
        github: GithubClient,
        vercel: VercelClient,
        pool: sqlx::PgPool,
    ) -> Self {
        Self {
            subscriber_repo,
            github,
            vercel,
            pool,
        }
    }

    // =========================================================================
    //  CICLO DE VIDA
    // =========================================================================

    /// Persiste o assinante e provisiona repositório + projeto. Falhas de
    /// provisionamento nunca desfazem o registro: viram warnings na resposta.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        project_name: &str,
        subscription_type: BillingInterval,
        stripe_customer_id: Option<&str>,
        custom_domain: Option<&str>,
    ) -> Result<ProvisionOutcome, AppError> {
        let subscriber = self
            .subscriber_repo
            .create(
                name,
                email,
                project_name,
                subscription_type,
                stripe_customer_id,
                custom_domain,
            )
            .await?;

        let mut warnings = Vec::new();
        let mut github_repo: Option<String> = None;
        let mut vercel_project_id: Option<String> = None;
        let mut edge_config_id: Option<String> = None;

        match self.github.clone_template(name, project_name).await {
            Ok(full_name) => github_repo = Some(full_name),
            Err(e) => {
                tracing::warn!(subscriber = %subscriber.id, "Clone do template falhou: {}", e);
                warnings.push(format!("Repositório não foi criado: {}", e));
            }
        }

        if let Some(repo) = github_repo.as_deref() {
            match self.vercel.create_project(project_name, repo).await {
                Ok((project_id, edge_id)) => {
                    vercel_project_id = Some(project_id);
                    edge_config_id = Some(edge_id);
                }
                Err(e) => {
                    tracing::warn!(subscriber = %subscriber.id, "Criação do projeto falhou: {}", e);
                    warnings.push(format!("Projeto de deploy não foi criado: {}", e));
                }
            }
        } else {
            warnings.push("Projeto de deploy não foi criado: sem repositório.".to_string());
        }

        self.subscriber_repo
            .set_provisioning(
                subscriber.id,
                github_repo.as_deref(),
                vercel_project_id.as_deref(),
                edge_config_id.as_deref(),
            )
            .await?;

        let subscriber = self
            .subscriber_repo
            .find_by_id(subscriber.id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Assinante".to_string()))?;

        Ok(ProvisionOutcome {
            subscriber,
            warnings,
        })
    }

    pub async fn list(&self) -> Result<Vec<Subscriber>, AppError> {
        self.subscriber_repo.list_all().await
    }

    pub async fn get(&self, id: Uuid) -> Result<Subscriber, AppError> {
        self.subscriber_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Assinante".to_string()))
    }

    pub async fn payments(&self, id: Uuid) -> Result<Vec<Payment>, AppError> {
        // 404 antes de devolver um ledger vazio para um id inexistente
        let subscriber = self.get(id).await?;
        self.subscriber_repo.list_payments(subscriber.id).await
    }

    /// Apaga o assinante com desprovisionamento best-effort: repositório e
    /// projeto são removidos se existirem, falhas viram log.
    pub async fn delete(&self, id: Uuid) -> Result<Vec<String>, AppError> {
        let subscriber = self.get(id).await?;
        let mut warnings = Vec::new();

        if let Some(repo) = subscriber.github_repo.as_deref() {
            if let Err(e) = self.github.delete_repo(repo).await {
                tracing::warn!(subscriber = %id, "Remoção do repositório falhou: {}", e);
                warnings.push(format!("Repositório não foi removido: {}", e));
            }
        }
        if let Some(project_id) = subscriber.vercel_project_id.as_deref() {
            if let Err(e) = self.vercel.delete_project(project_id).await {
                tracing::warn!(subscriber = %id, "Remoção do projeto falhou: {}", e);
                warnings.push(format!("Projeto de deploy não foi removido: {}", e));
            }
        }

        self.subscriber_repo.delete(id).await?;
        Ok(warnings)
    }

    // =========================================================================
    //  MANUTENÇÃO E DOMÍNIO
    // =========================================================================

    pub async fn get_maintenance(&self, id: Uuid) -> Result<bool, AppError> {
        let subscriber = self.get(id).await?;
        let edge_config_id = subscriber
            .edge_config_id
            .as_deref()
            .ok_or_else(|| AppError::ResourceNotFound("Edge Config do assinante".to_string()))?;
        self.vercel.get_maintenance(edge_config_id).await
    }

    pub async fn set_maintenance(&self, id: Uuid, enabled: bool) -> Result<(), AppError> {
        let subscriber = self.get(id).await?;
        let edge_config_id = subscriber
            .edge_config_id
            .as_deref()
            .ok_or_else(|| AppError::ResourceNotFound("Edge Config do assinante".to_string()))?;
        self.vercel.set_maintenance(edge_config_id, enabled).await
    }

    /// Inverte o modo do projeto: flag no Edge Config + domínio custom
    /// apontado para o deployment de manutenção (ou de volta à produção).
    /// Com `dry` as chamadas externas são relatadas sem executar.
    pub async fn toggle_domain(&self, id: Uuid, dry: bool) -> Result<ToggleOutcome, AppError> {
        let subscriber = self.get(id).await?;
        let edge_config_id = subscriber
            .edge_config_id
            .as_deref()
            .ok_or_else(|| AppError::ResourceNotFound("Edge Config do assinante".to_string()))?;
        let project_id = subscriber
            .vercel_project_id
            .as_deref()
            .ok_or_else(|| AppError::ResourceNotFound("Projeto do assinante".to_string()))?;
        let domain = subscriber
            .custom_domain
            .as_deref()
            .ok_or_else(|| AppError::ResourceNotFound("Domínio custom do assinante".to_string()))?;

        let current = self.vercel.get_maintenance(edge_config_id).await?;
        let target = !current;

        let actions = vec![
            format!(
                "PATCH edge-config/{}: maintenance = {}",
                edge_config_id, target
            ),
            format!(
                "PATCH projects/{}/domains/{}: gitBranch = {}",
                project_id,
                domain,
                if target { "maintenance" } else { "main" }
            ),
        ];

        if !dry {
            self.vercel.set_maintenance(edge_config_id, target).await?;
            self.vercel
                .redirect_domain(project_id, domain, target)
                .await?;
        }

        Ok(ToggleOutcome {
            dry_run: dry,
            maintenance: target,
            actions,
        })
    }

    // =========================================================================
    //  WEBHOOK DE COBRANÇA
    // =========================================================================

    /// Aplica um evento já convertido pela borda do webhook. Eventos para
    /// assinantes desconhecidos são logados e reconhecidos mesmo assim: o
    /// provedor reentrega em caso de erro e não temos como resolver aqui.
    pub async fn apply_subscription_event(
        &self,
        event_type: &str,
        object: &serde_json::Value,
    ) -> Result<(), AppError> {
        let Some(event) = subscription::parse_event(event_type, object) else {
            tracing::debug!(event_type = event_type, "Evento de webhook ignorado");
            return Ok(());
        };

        let Some(subscriber) = self.locate_subscriber(event_type, object).await? else {
            tracing::warn!(
                event_type = event_type,
                "Webhook para assinante desconhecido"
            );
            return Ok(());
        };

        // O created amarra o id da assinatura ao registro criado pelo painel
        if let SubscriptionEvent::SubscriptionCreated { .. } = event {
            if let Some(subscription_id) = subscription::subscription_id_of(event_type, object) {
                self.subscriber_repo
                    .set_subscription_id(subscriber.id, &subscription_id)
                    .await?;
            }
        }

        let state = BillingState {
            status: subscriber.subscription_status,
            next_billing_date: subscriber.next_billing_date,
            last_payment_date: subscriber.last_payment_date,
            is_active: subscriber.is_active,
            interval: subscriber.subscription_type,
        };
        let patch = subscription::reduce(&state, &event, Utc::now());

        self.subscriber_repo
            .apply_billing_patch(
                subscriber.id,
                patch.status,
                patch.next_billing_date,
                patch.last_payment_date,
                patch.is_active,
            )
            .await?;

        self.append_ledger(subscriber.id, &event).await?;

        tracing::info!(
            subscriber = %subscriber.id,
            event_type = event_type,
            status = ?patch.status,
            "Evento de assinatura aplicado"
        );
        Ok(())
    }

    async fn locate_subscriber(
        &self,
        event_type: &str,
        object: &serde_json::Value,
    ) -> Result<Option<Subscriber>, AppError> {
        if let Some(subscription_id) = subscription::subscription_id_of(event_type, object) {
            if let Some(found) = self
                .subscriber_repo
                .find_by_subscription(&subscription_id)
                .await?
            {
                return Ok(Some(found));
            }
        }
        if let Some(customer_id) = object["customer"].as_str() {
            return self.subscriber_repo.find_by_customer(customer_id).await;
        }
        Ok(None)
    }

    /// Ledger aditivo: invoice paga/falhada vira uma linha imutável, chaveada
    /// pelo payment intent. Reentrega do mesmo evento não duplica.
    async fn append_ledger(
        &self,
        subscriber_id: Uuid,
        event: &SubscriptionEvent,
    ) -> Result<(), AppError> {
        let (payment, succeeded) = match event {
            SubscriptionEvent::InvoicePaymentSucceeded { payment, .. } => (payment, true),
            SubscriptionEvent::InvoicePaymentFailed { payment } => (payment, false),
            _ => return Ok(()),
        };
        let Some(info) = payment else {
            return Ok(());
        };

        let inserted = self
            .subscriber_repo
            .append_payment(
                &self.pool,
                subscriber_id,
                &info.payment_intent_id,
                info.amount,
                &info.currency,
                succeeded,
            )
            .await?;
        if !inserted {
            tracing::info!(
                payment_intent = %info.payment_intent_id,
                "Pagamento já registrado, reentrega ignorada"
            );
        }
        Ok(())
    }
}
