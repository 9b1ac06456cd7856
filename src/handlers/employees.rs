// src/handlers/employees.rs
//
// Gestão de funcionários (somente admin, garantido pelo admin_middleware).

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::employee::{CreateEmployeePayload, Employee, EmployeeRole},
};

#[utoipa::path(
    post,
    path = "/api/employees",
    tag = "Employees",
    request_body = CreateEmployeePayload,
    responses(
        (status = 201, description = "Funcionário criado com saldo do ano corrente", body = Employee),
        (status = 409, description = "E-mail já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_employee(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateEmployeePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let employee = app_state
        .auth_service
        .create_employee(
            &payload.name,
            &payload.email,
            &payload.password,
            payload.role.unwrap_or(EmployeeRole::Employee),
            payload.hire_date,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(employee)))
}

#[utoipa::path(
    get,
    path = "/api/employees",
    tag = "Employees",
    responses(
        (status = 200, description = "Todos os funcionários", body = Vec<Employee>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_employees(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<Employee>>, AppError> {
    let employees = app_state.employee_repo.list_all().await?;
    Ok(Json(employees))
}

// Desativação (soft): a conta some das listas de destinatários e do login
#[utoipa::path(
    put,
    path = "/api/employees/{id}/deactivate",
    tag = "Employees",
    params(("id" = Uuid, Path, description = "ID do funcionário")),
    responses(
        (status = 204, description = "Funcionário desativado"),
        (status = 404, description = "Funcionário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn deactivate_employee(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !app_state.employee_repo.deactivate(id).await? {
        return Err(AppError::ResourceNotFound("Funcionário".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

// Remoção definitiva: o banco cascateia presenças, requisições e saldos
#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    tag = "Employees",
    params(("id" = Uuid, Path, description = "ID do funcionário")),
    responses(
        (status = 204, description = "Funcionário removido"),
        (status = 404, description = "Funcionário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_employee(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !app_state.employee_repo.delete(id).await? {
        return Err(AppError::ResourceNotFound("Funcionário".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
