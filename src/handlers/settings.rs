// src/handlers/settings.rs
//
// Configuração da semana de trabalho (linha única). A leitura é pública para
// autenticados; a escrita é admin.

use axum::{Json, extract::State};
use chrono::NaiveTime;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError, config::AppState, models::attendance::CompanySettings,
};

fn validate_work_days(days: &Vec<i32>) -> Result<(), ValidationError> {
    if days.iter().any(|d| !(1..=7).contains(d)) {
        let mut err = ValidationError::new("range");
        err.message = Some("Os dias devem estar entre 1 (segunda) e 7 (domingo).".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsPayload {
    #[validate(length(min = 1, message = "Informe ao menos um dia útil."))]
    #[validate(custom(function = "validate_work_days"))]
    #[schema(example = json!([1, 2, 3, 4, 5]))]
    pub work_days: Vec<i32>,

    #[schema(value_type = String, example = "09:00")]
    pub check_in_time: NaiveTime,
    #[schema(value_type = String, example = "18:00")]
    pub check_out_time: NaiveTime,

    #[validate(range(min = 0, max = 120, message = "Tolerância fora do intervalo."))]
    pub late_tolerance_minutes: i32,
}

#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Settings",
    responses(
        (status = 200, description = "Configuração atual da empresa", body = CompanySettings)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
) -> Result<Json<CompanySettings>, AppError> {
    let settings = app_state.settings_repo.get().await?;
    Ok(Json(settings))
}

#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Settings",
    request_body = UpdateSettingsPayload,
    responses(
        (status = 200, description = "Configuração atualizada", body = CompanySettings)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    Json(payload): Json<UpdateSettingsPayload>,
) -> Result<Json<CompanySettings>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let settings = app_state
        .settings_repo
        .update(
            &payload.work_days,
            payload.check_in_time,
            payload.check_out_time,
            payload.late_tolerance_minutes,
        )
        .await?;

    Ok(Json(settings))
}
