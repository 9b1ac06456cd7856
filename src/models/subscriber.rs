// src/models/subscriber.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "subscription_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    Pending,
    Active,
    PastDue,
    Canceled,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "billing_interval", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BillingInterval {
    Day,
    Month,
    Year,
}

// --- Structs ---

// Cliente SaaS: um deploy provisionado por assinante
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: Uuid,

    #[schema(example = "Pizzeria Da Mario")]
    pub name: String,
    pub email: String,

    #[schema(example = "da-mario")]
    pub project_name: String,

    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,

    pub subscription_status: SubscriptionStatus,
    pub subscription_type: BillingInterval,

    pub next_billing_date: Option<DateTime<Utc>>,
    pub last_payment_date: Option<DateTime<Utc>>,

    // Credenciais/identificadores opacos das plataformas
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub github_repo: Option<String>,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub vercel_project_id: Option<String>,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub edge_config_id: Option<String>,

    pub custom_domain: Option<String>,
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha imutável do ledger de pagamentos (chaveada pelo payment intent)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub subscriber_id: Uuid,
    pub stripe_payment_intent_id: String,

    #[schema(example = "49.90")]
    pub amount: Decimal,
    #[schema(example = "eur")]
    pub currency: String,

    pub succeeded: bool,
    pub created_at: DateTime<Utc>,
}
