// src/db/settings_repo.rs

use sqlx::PgPool;

use crate::{common::error::AppError, models::attendance::CompanySettings};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Linha única (id = 1), criada pela migration
    pub async fn get(&self) -> Result<CompanySettings, AppError> {
        let settings = sqlx::query_as::<_, CompanySettings>(
            "SELECT * FROM company_settings WHERE id = 1",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(settings)
    }

    pub async fn update(
        &self,
        work_days: &[i32],
        check_in_time: chrono::NaiveTime,
        check_out_time: chrono::NaiveTime,
        late_tolerance_minutes: i32,
    ) -> Result<CompanySettings, AppError> {
        let settings = sqlx::query_as::<_, CompanySettings>(
            r#"
            UPDATE company_settings
            SET work_days = $1, check_in_time = $2, check_out_time = $3,
                late_tolerance_minutes = $4
            WHERE id = 1
            RETURNING *
            "#,
        )
        .bind(work_days)
        .bind(check_in_time)
        .bind(check_out_time)
        .bind(late_tolerance_minutes)
        .fetch_one(&self.pool)
        .await?;
        Ok(settings)
    }
}
