// src/handlers/leaves.rs
//
// Requisições de ausência (ferie e permesso): o funcionário submete e lista as
// próprias; o admin lista todas e decide. A decisão debita o saldo e notifica
// o requerente.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{Datelike, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedEmployee,
    models::leave::{LeaveBalance, LeaveRequest},
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFeriePayload {
    #[schema(value_type = String, format = Date, example = "2024-08-05")]
    pub date_from: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2024-08-16")]
    pub date_to: NaiveDate,

    #[validate(length(max = 500, message = "A observação é longa demais."))]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPermessoPayload {
    #[schema(value_type = String, format = Date, example = "2024-07-01")]
    pub day: NaiveDate,
    #[schema(value_type = String, example = "14:00")]
    pub time_from: NaiveTime,
    #[schema(value_type = String, example = "16:00")]
    pub time_to: NaiveTime,

    #[validate(length(max = 500, message = "A observação é longa demais."))]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecisionPayload {
    pub approve: bool,

    #[validate(length(max = 500, message = "A observação é longa demais."))]
    pub admin_note: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct BalanceQuery {
    #[param(example = 2024)]
    pub year: Option<i32>,
}

// ---
// Handlers
// ---

#[utoipa::path(
    post,
    path = "/api/leaves/ferie",
    tag = "Leaves",
    request_body = SubmitFeriePayload,
    responses(
        (status = 201, description = "Requisição de férias criada", body = LeaveRequest),
        (status = 400, description = "Intervalo inválido ou saldo insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit_ferie(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Json(payload): Json<SubmitFeriePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let request = app_state
        .leave_service
        .submit_ferie(
            employee.id,
            payload.date_from,
            payload.date_to,
            payload.note.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

#[utoipa::path(
    post,
    path = "/api/leaves/permesso",
    tag = "Leaves",
    request_body = SubmitPermessoPayload,
    responses(
        (status = 201, description = "Requisição de permesso criada", body = LeaveRequest),
        (status = 400, description = "Janela inválida ou saldo insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit_permesso(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Json(payload): Json<SubmitPermessoPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let request = app_state
        .leave_service
        .submit_permesso(
            employee.id,
            payload.day,
            payload.time_from,
            payload.time_to,
            payload.note.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

#[utoipa::path(
    get,
    path = "/api/leaves",
    tag = "Leaves",
    responses(
        (status = 200, description = "Requisições do funcionário autenticado", body = Vec<LeaveRequest>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_my_leaves(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
) -> Result<Json<Vec<LeaveRequest>>, AppError> {
    let requests = app_state.leave_service.list_for_employee(employee.id).await?;
    Ok(Json(requests))
}

#[utoipa::path(
    get,
    path = "/api/leaves/all",
    tag = "Leaves",
    responses(
        (status = 200, description = "Todas as requisições (admin)", body = Vec<LeaveRequest>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_all_leaves(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<LeaveRequest>>, AppError> {
    let requests = app_state.leave_service.list_all().await?;
    Ok(Json(requests))
}

#[utoipa::path(
    put,
    path = "/api/leaves/{id}/decision",
    tag = "Leaves",
    params(("id" = Uuid, Path, description = "ID da requisição")),
    request_body = DecisionPayload,
    responses(
        (status = 200, description = "Requisição decidida, saldo debitado e requerente notificado", body = LeaveRequest),
        (status = 404, description = "Requisição não encontrada"),
        (status = 409, description = "Requisição já decidida")
    ),
    security(("api_jwt" = []))
)]
pub async fn decide_leave(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(admin): AuthenticatedEmployee,
    Path(id): Path<Uuid>,
    Json(payload): Json<DecisionPayload>,
) -> Result<Json<LeaveRequest>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let request = app_state
        .leave_service
        .decide(admin.id, id, payload.approve, payload.admin_note.as_deref())
        .await?;

    Ok(Json(request))
}

#[utoipa::path(
    get,
    path = "/api/leaves/balance",
    tag = "Leaves",
    params(BalanceQuery),
    responses(
        (status = 200, description = "Saldo do ano", body = LeaveBalance),
        (status = 404, description = "Sem saldo para o ano")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_my_balance(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Query(query): Query<BalanceQuery>,
) -> Result<Json<LeaveBalance>, AppError> {
    let year = query.year.unwrap_or_else(|| Utc::now().year());
    let balance = app_state
        .leave_service
        .balance_for(employee.id, year)
        .await?
        .ok_or_else(|| AppError::ResourceNotFound("Saldo".to_string()))?;
    Ok(Json(balance))
}
