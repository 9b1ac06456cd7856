// src/handlers/sick_leaves.rs
//
// Afastamentos por doença (somente admin): a criação valida o intervalo nas
// procedures do banco, roda o validador de conflitos e sintetiza as presenças
// dos dias úteis. A remoção apaga exatamente as linhas sintetizadas.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedEmployee,
    models::attendance::SickLeave,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSickLeavePayload {
    pub employee_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2024-06-03")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2024-06-07")]
    pub end_date: NaiveDate,

    #[validate(length(max = 500, message = "A observação é longa demais."))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SickLeaveQuery {
    pub employee_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SickLeaveResponse {
    pub sick_leave: SickLeave,
    pub warnings: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/api/sick-leaves",
    tag = "SickLeaves",
    request_body = CreateSickLeavePayload,
    responses(
        (status = 201, description = "Afastamento criado com as presenças sintetizadas", body = SickLeaveResponse),
        (status = 400, description = "Intervalo inválido"),
        (status = 409, description = "Bloqueado por conflito de agenda")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_sick_leave(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(admin): AuthenticatedEmployee,
    Json(payload): Json<CreateSickLeavePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let (sick_leave, report) = app_state
        .attendance_service
        .create_sick_leave(
            admin.role,
            payload.employee_id,
            payload.start_date,
            payload.end_date,
            payload.notes,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SickLeaveResponse {
            sick_leave,
            warnings: report.warnings,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/sick-leaves",
    tag = "SickLeaves",
    params(SickLeaveQuery),
    responses(
        (status = 200, description = "Afastamentos do funcionário", body = Vec<SickLeave>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_sick_leaves(
    State(app_state): State<AppState>,
    Query(query): Query<SickLeaveQuery>,
) -> Result<Json<Vec<SickLeave>>, AppError> {
    let rows = app_state
        .attendance_service
        .list_sick_leaves(query.employee_id)
        .await?;
    Ok(Json(rows))
}

#[utoipa::path(
    delete,
    path = "/api/sick-leaves/{id}",
    tag = "SickLeaves",
    params(("id" = Uuid, Path, description = "ID do afastamento")),
    responses(
        (status = 204, description = "Afastamento removido junto com suas presenças sintetizadas"),
        (status = 404, description = "Afastamento não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_sick_leave(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.attendance_service.delete_sick_leave(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
