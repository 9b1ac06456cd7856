// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::{Datelike, NaiveDate, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{EmployeeRepository, LeaveRepository},
    models::employee::{Claims, Employee, EmployeeRole},
};

#[derive(Clone)]
pub struct AuthService {
    employee_repo: EmployeeRepository,
    leave_repo: LeaveRepository,
    jwt_secret: String,
    pool: sqlx::PgPool,
}

impl AuthService {
    pub fn new(
        employee_repo: EmployeeRepository,
        leave_repo: LeaveRepository,
        jwt_secret: String,
        pool: sqlx::PgPool,
    ) -> Self {
        Self {
            employee_repo,
            leave_repo,
            jwt_secret,
            pool,
        }
    }

    /// Cadastro de funcionário (ação de admin): cria a conta e o saldo zerado
    /// do ano corrente na mesma transação.
    pub async fn create_employee(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: EmployeeRole,
        hire_date: NaiveDate,
    ) -> Result<Employee, AppError> {
        // Hashing fora do runtime async (bcrypt é pesado de CPU)
        let password_clone = password.to_owned();
        let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let mut tx = self.pool.begin().await?;

        let employee = self
            .employee_repo
            .create(&mut *tx, name, email, &hashed, role, hire_date)
            .await?;

        // Saldo do ano corrente já nasce junto (zerado, o admin ajusta depois)
        self.leave_repo
            .get_or_create_balance(&mut *tx, employee.id, Utc::now().year())
            .await?;

        tx.commit().await?;

        Ok(employee)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let employee = self
            .employee_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !employee.is_active {
            return Err(AppError::InvalidCredentials);
        }

        let password_clone = password.to_owned();
        let hash_clone = employee.password_hash.clone();

        // Verificação em thread separada
        let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(employee.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<Employee, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.employee_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .filter(|e| e.is_active)
            .ok_or(AppError::InvalidToken)
    }

    fn create_token(&self, employee_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: employee_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
