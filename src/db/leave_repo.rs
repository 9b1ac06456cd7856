// src/db/leave_repo.rs

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::leave::{LeaveBalance, LeaveKind, LeaveRequest, LeaveStatus},
};

#[derive(Clone)]
pub struct LeaveRepository {
    pool: PgPool,
}

impl LeaveRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  REQUISIÇÕES (ferie / permessi)
    // =========================================================================

    pub async fn create_request<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        kind: LeaveKind,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
        day: Option<NaiveDate>,
        time_from: Option<chrono::NaiveTime>,
        time_to: Option<chrono::NaiveTime>,
        note: Option<&str>,
    ) -> Result<LeaveRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, LeaveRequest>(
            r#"
            INSERT INTO leave_requests
                (employee_id, kind, date_from, date_to, day, time_from, time_to, note)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(employee_id)
        .bind(kind)
        .bind(date_from)
        .bind(date_to)
        .bind(day)
        .bind(time_from)
        .bind(time_to)
        .bind(note)
        .fetch_one(executor)
        .await?;

        Ok(request)
    }

    pub async fn find_request_by_id(&self, id: Uuid) -> Result<Option<LeaveRequest>, AppError> {
        let maybe =
            sqlx::query_as::<_, LeaveRequest>("SELECT * FROM leave_requests WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(maybe)
    }

    pub async fn list_by_employee(
        &self,
        employee_id: Uuid,
    ) -> Result<Vec<LeaveRequest>, AppError> {
        let requests = sqlx::query_as::<_, LeaveRequest>(
            "SELECT * FROM leave_requests WHERE employee_id = $1 ORDER BY created_at DESC",
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    pub async fn list_all(&self) -> Result<Vec<LeaveRequest>, AppError> {
        let requests = sqlx::query_as::<_, LeaveRequest>(
            "SELECT * FROM leave_requests ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    /// Requisições do funcionário que tocam a data informada, em qualquer
    /// status. O validador de conflitos filtra por classe na memória.
    pub async fn list_touching_date(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<LeaveRequest>, AppError> {
        let requests = sqlx::query_as::<_, LeaveRequest>(
            r#"
            SELECT * FROM leave_requests
            WHERE employee_id = $1
              AND status <> 'rejected'
              AND (
                    (kind = 'ferie' AND date_from <= $2 AND date_to >= $2)
                 OR (kind = 'permesso' AND day = $2)
              )
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    /// Requisições que se sobrepõem ao intervalo [start, end] (teste de
    /// intervalos: from <= end AND to >= start; permesso é tratado como
    /// intervalo de um dia).
    pub async fn list_overlapping_range(
        &self,
        employee_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LeaveRequest>, AppError> {
        let requests = sqlx::query_as::<_, LeaveRequest>(
            r#"
            SELECT * FROM leave_requests
            WHERE employee_id = $1
              AND status <> 'rejected'
              AND (
                    (kind = 'ferie' AND date_from <= $3 AND date_to >= $2)
                 OR (kind = 'permesso' AND day BETWEEN $2 AND $3)
              )
            "#,
        )
        .bind(employee_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: LeaveStatus,
        admin_note: Option<&str>,
    ) -> Result<LeaveRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let request = sqlx::query_as::<_, LeaveRequest>(
            r#"
            UPDATE leave_requests
            SET status = $2, admin_note = COALESCE($3, admin_note), updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(admin_note)
        .fetch_one(executor)
        .await?;

        Ok(request)
    }

    // =========================================================================
    //  SALDOS
    // =========================================================================

    /// Busca (ou cria zerado) o saldo do funcionário para o ano.
    pub async fn get_or_create_balance<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        year: i32,
    ) -> Result<LeaveBalance, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balance = sqlx::query_as::<_, LeaveBalance>(
            r#"
            INSERT INTO leave_balances (employee_id, year)
            VALUES ($1, $2)
            ON CONFLICT (employee_id, year) DO UPDATE SET year = EXCLUDED.year
            RETURNING *
            "#,
        )
        .bind(employee_id)
        .bind(year)
        .fetch_one(executor)
        .await?;

        Ok(balance)
    }

    pub async fn get_balance(
        &self,
        employee_id: Uuid,
        year: i32,
    ) -> Result<Option<LeaveBalance>, AppError> {
        let maybe = sqlx::query_as::<_, LeaveBalance>(
            "SELECT * FROM leave_balances WHERE employee_id = $1 AND year = $2",
        )
        .bind(employee_id)
        .bind(year)
        .fetch_optional(&self.pool)
        .await?;
        Ok(maybe)
    }

    pub async fn add_vacation_days_used<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        year: i32,
        days: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE leave_balances
            SET vacation_days_used = vacation_days_used + $3
            WHERE employee_id = $1 AND year = $2
            "#,
        )
        .bind(employee_id)
        .bind(year)
        .bind(days)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn add_permission_hours_used<'e, E>(
        &self,
        executor: E,
        employee_id: Uuid,
        year: i32,
        hours: Decimal,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE leave_balances
            SET permission_hours_used = permission_hours_used + $3
            WHERE employee_id = $1 AND year = $2
            "#,
        )
        .bind(employee_id)
        .bind(year)
        .bind(hours)
        .execute(executor)
        .await?;
        Ok(())
    }
}

/// Ano de referência de uma requisição (o do início do período pedido).
pub fn request_year(request: &LeaveRequest) -> i32 {
    request
        .date_from
        .or(request.day)
        .map(|d| d.year())
        .unwrap_or_else(|| chrono::Utc::now().year())
}
