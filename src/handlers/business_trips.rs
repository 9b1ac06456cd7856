// src/handlers/business_trips.rs
//
// Viagens de trabalho (somente admin): criadas já aprovadas, passam pelo
// validador de conflitos e sintetizam as presenças dos dias úteis com os
// horários configurados da empresa.

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
    models::attendance::BusinessTrip,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTripPayload {
    pub employee_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2024-06-03")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2024-06-07")]
    pub end_date: NaiveDate,

    #[validate(length(min = 1, message = "O destino é obrigatório."))]
    pub destination: String,

    #[validate(length(max = 500, message = "O motivo é longo demais."))]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct TripQuery {
    pub employee_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TripResponse {
    pub trip: BusinessTrip,
    pub warnings: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/api/business-trips",
    tag = "BusinessTrips",
    request_body = CreateTripPayload,
    responses(
        (status = 201, description = "Viagem criada com as presenças sintetizadas", body = TripResponse),
        (status = 400, description = "Intervalo inválido"),
        (status = 409, description = "Bloqueada por conflito de agenda")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_business_trip(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(admin): AuthenticatedEmployee,
    Json(payload): Json<CreateTripPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let (trip, report) = app_state
        .attendance_service
        .create_business_trip(
            admin.role,
            payload.employee_id,
            payload.start_date,
            payload.end_date,
            &payload.destination,
            payload.reason,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TripResponse {
            trip,
            warnings: report.warnings,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/business-trips",
    tag = "BusinessTrips",
    params(TripQuery),
    responses(
        (status = 200, description = "Viagens do funcionário", body = Vec<BusinessTrip>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_business_trips(
    State(app_state): State<AppState>,
    Query(query): Query<TripQuery>,
) -> Result<Json<Vec<BusinessTrip>>, AppError> {
    let rows = app_state.attendance_service.list_trips(query.employee_id).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    delete,
    path = "/api/business-trips/{id}",
    tag = "BusinessTrips",
    params(("id" = Uuid, Path, description = "ID da viagem")),
    responses(
        (status = 204, description = "Viagem removida junto com suas presenças sintetizadas"),
        (status = 404, description = "Viagem não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_business_trip(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.attendance_service.delete_business_trip(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
