// src/handlers/attendance.rs
//
// Ponto manual: entrada única, em lote e a pré-checagem de conflitos. O
// espelho de ponto do próprio funcionário é lido pela conexão RLS.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::get_rls_transaction, error::AppError},
    config::AppState,
    middleware::auth::AuthenticatedEmployee,
    models::attendance::Attendance,
    services::{attendance_service::BulkEntryOutcome, conflict::ConflictReport},
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualEntryPayload {
    // Admin registra para qualquer um; funcionário, só para si
    pub employee_id: Option<Uuid>,

    #[schema(value_type = String, format = Date, example = "2024-06-03")]
    pub date: NaiveDate,
    #[schema(value_type = String, example = "09:05")]
    pub check_in: NaiveTime,
    #[schema(value_type = Option<String>, example = "18:00")]
    pub check_out: Option<NaiveTime>,

    #[validate(length(max = 500, message = "A observação é longa demais."))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkEntryPayload {
    #[validate(length(min = 1, message = "Informe ao menos um funcionário."))]
    pub employee_ids: Vec<Uuid>,

    #[schema(value_type = String, format = Date, example = "2024-06-03")]
    pub date: NaiveDate,
    #[schema(value_type = String, example = "09:00")]
    pub check_in: NaiveTime,
    #[schema(value_type = Option<String>, example = "18:00")]
    pub check_out: Option<NaiveTime>,

    #[validate(length(max = 500, message = "A observação é longa demais."))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct CheckQuery {
    pub employee_id: Option<Uuid>,
    #[param(example = "2024-06-03")]
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub employee_id: Option<Uuid>,
    #[param(example = "2024-06-01")]
    pub from: NaiveDate,
    #[param(example = "2024-06-30")]
    pub to: NaiveDate,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualEntryResponse {
    pub attendance: Attendance,
    pub warnings: Vec<String>,
}

// Resolve o alvo da operação: admin escolhe, funcionário é sempre ele mesmo
fn resolve_target(
    caller: &crate::models::employee::Employee,
    requested: Option<Uuid>,
) -> Result<Uuid, AppError> {
    match requested {
        Some(id) if id != caller.id && !caller.role.is_admin() => Err(AppError::Forbidden),
        Some(id) => Ok(id),
        None => Ok(caller.id),
    }
}

// ---
// Handlers
// ---

#[utoipa::path(
    post,
    path = "/api/attendance",
    tag = "Attendance",
    request_body = ManualEntryPayload,
    responses(
        (status = 201, description = "Presença registrada (upsert por funcionário+data)", body = ManualEntryResponse),
        (status = 409, description = "Bloqueada por conflito de agenda")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_manual_entry(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(caller): AuthenticatedEmployee,
    Json(payload): Json<ManualEntryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;
    let target = resolve_target(&caller, payload.employee_id)?;

    let (attendance, report) = app_state
        .attendance_service
        .create_manual_entry(
            caller.role,
            target,
            payload.date,
            payload.check_in,
            payload.check_out,
            payload.notes,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ManualEntryResponse {
            attendance,
            warnings: report.warnings,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/attendance/bulk",
    tag = "Attendance",
    request_body = BulkEntryPayload,
    responses(
        (status = 200, description = "Resultado por funcionário; conflitos bloqueantes ficam de fora", body = Vec<BulkEntryOutcome>)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_bulk_entries(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(caller): AuthenticatedEmployee,
    Json(payload): Json<BulkEntryPayload>,
) -> Result<Json<Vec<BulkEntryOutcome>>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let outcomes = app_state
        .attendance_service
        .create_bulk_entries(
            caller.role,
            &payload.employee_ids,
            payload.date,
            payload.check_in,
            payload.check_out,
            payload.notes,
        )
        .await?;

    Ok(Json(outcomes))
}

// Pré-checagem: o front usa para avisar antes de submeter
#[utoipa::path(
    get,
    path = "/api/attendance/check",
    tag = "Attendance",
    params(CheckQuery),
    responses(
        (status = 200, description = "Classificação de conflitos para o dia", body = ConflictReport)
    ),
    security(("api_jwt" = []))
)]
pub async fn check_day(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(caller): AuthenticatedEmployee,
    Query(query): Query<CheckQuery>,
) -> Result<Json<ConflictReport>, AppError> {
    let target = resolve_target(&caller, query.employee_id)?;
    let report = app_state
        .attendance_service
        .check_day(caller.role, target, query.date)
        .await?;
    Ok(Json(report))
}

#[utoipa::path(
    get,
    path = "/api/attendance",
    tag = "Attendance",
    params(ListQuery),
    responses(
        (status = 200, description = "Espelho de ponto no período", body = Vec<Attendance>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_attendance(
    State(app_state): State<AppState>,
    user: AuthenticatedEmployee,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Attendance>>, AppError> {
    let target = resolve_target(&user.0, query.employee_id)?;

    let mut rls_tx = get_rls_transaction(&app_state, &user).await?;
    let rows = app_state
        .attendance_service
        .list_for_employee(&mut *rls_tx, target, query.from, query.to)
        .await?;

    Ok(Json(rows))
}
