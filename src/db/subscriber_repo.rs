// src/db/subscriber_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::subscriber::{BillingInterval, Payment, Subscriber, SubscriptionStatus},
};

#[derive(Clone)]
pub struct SubscriberRepository {
    pool: PgPool,
}

impl SubscriberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        name: &str,
        email: &str,
        project_name: &str,
        subscription_type: BillingInterval,
        stripe_customer_id: Option<&str>,
        custom_domain: Option<&str>,
    ) -> Result<Subscriber, AppError> {
        let subscriber = sqlx::query_as::<_, Subscriber>(
            r#"
            INSERT INTO subscribers
                (name, email, project_name, subscription_type, stripe_customer_id, custom_domain)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(project_name)
        .bind(subscription_type)
        .bind(stripe_customer_id)
        .bind(custom_domain)
        .fetch_one(&self.pool)
        .await?;

        Ok(subscriber)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Subscriber>, AppError> {
        let maybe = sqlx::query_as::<_, Subscriber>("SELECT * FROM subscribers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    pub async fn find_by_subscription(
        &self,
        stripe_subscription_id: &str,
    ) -> Result<Option<Subscriber>, AppError> {
        let maybe = sqlx::query_as::<_, Subscriber>(
            "SELECT * FROM subscribers WHERE stripe_subscription_id = $1",
        )
        .bind(stripe_subscription_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe)
    }

    pub async fn find_by_customer(
        &self,
        stripe_customer_id: &str,
    ) -> Result<Option<Subscriber>, AppError> {
        let maybe = sqlx::query_as::<_, Subscriber>(
            "SELECT * FROM subscribers WHERE stripe_customer_id = $1",
        )
        .bind(stripe_customer_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe)
    }

    pub async fn list_all(&self) -> Result<Vec<Subscriber>, AppError> {
        let subscribers =
            sqlx::query_as::<_, Subscriber>("SELECT * FROM subscribers ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(subscribers)
    }

    /// Aplica o resultado do redutor de status. Reaplicar o mesmo patch com as
    /// mesmas entradas produz o mesmo estado (idempotência de webhook).
    pub async fn apply_billing_patch(
        &self,
        id: Uuid,
        status: SubscriptionStatus,
        next_billing_date: Option<DateTime<Utc>>,
        last_payment_date: Option<DateTime<Utc>>,
        is_active: bool,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE subscribers
            SET subscription_status = $2,
                next_billing_date = $3,
                last_payment_date = $4,
                is_active = $5,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(next_billing_date)
        .bind(last_payment_date)
        .bind(is_active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn set_subscription_id(
        &self,
        id: Uuid,
        stripe_subscription_id: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE subscribers SET stripe_subscription_id = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(stripe_subscription_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn set_provisioning(
        &self,
        id: Uuid,
        github_repo: Option<&str>,
        vercel_project_id: Option<&str>,
        edge_config_id: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE subscribers
            SET github_repo = COALESCE($2, github_repo),
                vercel_project_id = COALESCE($3, vercel_project_id),
                edge_config_id = COALESCE($4, edge_config_id),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(github_repo)
        .bind(vercel_project_id)
        .bind(edge_config_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM subscribers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  LEDGER DE PAGAMENTOS
    // =========================================================================

    /// Insere uma linha no ledger. Chaveada pelo payment intent do provedor
    /// com ON CONFLICT DO NOTHING: a reentrega do mesmo webhook não duplica.
    pub async fn append_payment<'e, E>(
        &self,
        executor: E,
        subscriber_id: Uuid,
        payment_intent_id: &str,
        amount: Decimal,
        currency: &str,
        succeeded: bool,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO payments (subscriber_id, stripe_payment_intent_id, amount, currency, succeeded)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (stripe_payment_intent_id) DO NOTHING
            "#,
        )
        .bind(subscriber_id)
        .bind(payment_intent_id)
        .bind(amount)
        .bind(currency)
        .bind(succeeded)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_payments(&self, subscriber_id: Uuid) -> Result<Vec<Payment>, AppError> {
        let rows = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE subscriber_id = $1 ORDER BY created_at DESC",
        )
        .bind(subscriber_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
