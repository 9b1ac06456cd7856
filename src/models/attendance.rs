// src/models/attendance.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Registro unificado de presença: manual, gerado por viagem ou por doença.
// No máximo uma linha por (funcionário, dia): UNIQUE no banco, escrita via upsert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: Uuid,
    pub employee_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2024-06-03")]
    pub date: NaiveDate,

    #[schema(value_type = String, example = "09:00")]
    pub check_in: NaiveTime,
    #[schema(value_type = Option<String>, example = "18:00")]
    pub check_out: Option<NaiveTime>,

    pub is_manual: bool,
    pub is_business_trip: bool,
    pub is_sick_leave: bool,

    pub is_late: bool,
    pub late_minutes: i32,

    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SickLeave {
    pub id: Uuid,
    pub employee_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2024-02-05")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2024-02-09")]
    pub end_date: NaiveDate,

    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SickLeave {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

// Sempre 'approved': não existe estado pendente para viagens de trabalho.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BusinessTrip {
    pub id: Uuid,
    pub employee_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2024-06-03")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2024-06-07")]
    pub end_date: NaiveDate,

    #[schema(example = "Milano")]
    pub destination: String,

    #[schema(example = "approved")]
    pub status: String,

    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BusinessTrip {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn is_approved(&self) -> bool {
        self.status == "approved"
    }
}

// Configuração da semana de trabalho (linha única em company_settings)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanySettings {
    pub id: i32,

    // 1 = segunda .. 7 = domingo (como chrono::Weekday::number_from_monday)
    #[schema(example = json!([1, 2, 3, 4, 5]))]
    pub work_days: Vec<i32>,

    #[schema(value_type = String, example = "09:00")]
    pub check_in_time: NaiveTime,
    #[schema(value_type = String, example = "18:00")]
    pub check_out_time: NaiveTime,

    #[schema(example = 10)]
    pub late_tolerance_minutes: i32,
}
