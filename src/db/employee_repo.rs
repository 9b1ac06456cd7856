// src/db/employee_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::employee::{Employee, EmployeeRole},
};

// O repositório de funcionários, responsável pela tabela 'employees'
#[derive(Clone)]
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um funcionário pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Employee>, AppError> {
        let maybe = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    // Busca um funcionário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Employee>, AppError> {
        let maybe = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe)
    }

    pub async fn list_all(&self) -> Result<Vec<Employee>, AppError> {
        let employees =
            sqlx::query_as::<_, Employee>("SELECT * FROM employees ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(employees)
    }

    /// IDs de todas as contas ativas, opcionalmente filtrando por papel.
    /// Usado pelo despachante de notificações para resolver broadcasts.
    pub async fn list_active_ids(
        &self,
        role: Option<EmployeeRole>,
    ) -> Result<Vec<Uuid>, AppError> {
        let rows: Vec<(Uuid,)> = match role {
            Some(r) => {
                sqlx::query_as("SELECT id FROM employees WHERE is_active AND role = $1")
                    .bind(r)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_as("SELECT id FROM employees WHERE is_active")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    // Cria um novo funcionário, com tratamento específico para e-mail duplicado
    pub async fn create<'e, E>(
        &self,
        executor: E,
        name: &str,
        email: &str,
        password_hash: &str,
        role: EmployeeRole,
        hire_date: chrono::NaiveDate,
    ) -> Result<Employee, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (name, email, password_hash, role, hire_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .bind(hire_date)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })
    }

    // Desativação (soft delete): a conta some dos broadcasts mas o histórico fica
    pub async fn deactivate(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE employees SET is_active = FALSE, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // Remoção definitiva: o ON DELETE CASCADE leva junto presenças, ausências,
    // requisições, saldos e notificações do funcionário
    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
