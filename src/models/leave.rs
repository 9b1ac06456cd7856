// src/models/leave.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "leave_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LeaveKind {
    Ferie,    // férias de vários dias (intervalo de datas)
    Permesso, // ausência curta, janela de horário em um único dia
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "leave_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

// --- Structs ---

// Invariante: ferie preenche date_from/date_to; permesso preenche day (+ janela).
// O CHECK `leave_shape` na migration garante isso no banco.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub kind: LeaveKind,

    #[schema(value_type = Option<String>, format = Date, example = "2024-08-05")]
    pub date_from: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = Date, example = "2024-08-16")]
    pub date_to: Option<NaiveDate>,

    #[schema(value_type = Option<String>, format = Date, example = "2024-07-01")]
    pub day: Option<NaiveDate>,
    #[schema(value_type = Option<String>, example = "14:00")]
    pub time_from: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "16:00")]
    pub time_to: Option<NaiveTime>,

    pub status: LeaveStatus,
    pub note: Option<String>,
    pub admin_note: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeaveRequest {
    /// A requisição cobre a data? Ferie usa o intervalo; permesso, o dia exato.
    pub fn covers(&self, date: NaiveDate) -> bool {
        match self.kind {
            LeaveKind::Ferie => match (self.date_from, self.date_to) {
                (Some(from), Some(to)) => from <= date && date <= to,
                _ => false,
            },
            LeaveKind::Permesso => self.day == Some(date),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LeaveBalance {
    pub id: Uuid,
    pub employee_id: Uuid,

    #[schema(example = 2024)]
    pub year: i32,

    #[schema(example = 26)]
    pub vacation_days_total: i32,
    #[schema(example = 10)]
    pub vacation_days_used: i32,

    // Horas como decimal para preservar a precisão de minutos (ex.: 1.50 = 1h30)
    #[schema(example = "72.00")]
    pub permission_hours_total: Decimal,
    #[schema(example = "12.50")]
    pub permission_hours_used: Decimal,
}
