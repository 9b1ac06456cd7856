// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

use crate::{
    clients::{EmailClient, GithubClient, VercelClient},
    db::{
        AttendanceRepository, EmployeeRepository, LeaveRepository, NotificationRepository,
        SettingsRepository, SubscriberRepository,
    },
    services::{
        AttendanceService, AuthService, LeaveService, NotificationService, SubscriberService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub stripe_webhook_secret: String,

    pub employee_repo: EmployeeRepository,
    pub settings_repo: SettingsRepository,

    pub auth_service: AuthService,
    pub attendance_service: AttendanceService,
    pub leave_service: LeaveService,
    pub notification_service: NotificationService,
    pub subscriber_service: SubscriberService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        let stripe_webhook_secret =
            env::var("STRIPE_WEBHOOK_SECRET").expect("STRIPE_WEBHOOK_SECRET deve ser definido");

        let email_api_key = env::var("EMAIL_API_KEY").expect("EMAIL_API_KEY deve ser definida");
        let email_from =
            env::var("EMAIL_FROM").unwrap_or_else(|_| "rh@example.com".to_string());

        let vercel_token = env::var("VERCEL_TOKEN").expect("VERCEL_TOKEN deve ser definido");
        let github_token = env::var("GITHUB_TOKEN").expect("GITHUB_TOKEN deve ser definido");
        let github_owner = env::var("GITHUB_OWNER").expect("GITHUB_OWNER deve ser definido");
        let github_template = env::var("GITHUB_TEMPLATE_REPO")
            .expect("GITHUB_TEMPLATE_REPO deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let employee_repo = EmployeeRepository::new(db_pool.clone());
        let leave_repo = LeaveRepository::new(db_pool.clone());
        let attendance_repo = AttendanceRepository::new(db_pool.clone());
        let notification_repo = NotificationRepository::new(db_pool.clone());
        let subscriber_repo = SubscriberRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());

        let email_client = EmailClient::new(email_api_key, email_from);
        let vercel_client = VercelClient::new(vercel_token);
        let github_client = GithubClient::new(github_token, github_owner, github_template);

        let auth_service = AuthService::new(
            employee_repo.clone(),
            leave_repo.clone(),
            jwt_secret,
            db_pool.clone(),
        );
        let notification_service = NotificationService::new(
            notification_repo,
            employee_repo.clone(),
            email_client,
            db_pool.clone(),
        );
        let attendance_service = AttendanceService::new(
            attendance_repo,
            leave_repo.clone(),
            settings_repo.clone(),
            db_pool.clone(),
        );
        let leave_service = LeaveService::new(
            leave_repo,
            notification_service.clone(),
            db_pool.clone(),
        );
        let subscriber_service = SubscriberService::new(
            subscriber_repo,
            github_client,
            vercel_client,
            db_pool.clone(),
        );

        Ok(Self {
            db_pool,
            stripe_webhook_secret,
            employee_repo,
            settings_repo,
            auth_service,
            attendance_service,
            leave_service,
            notification_service,
            subscriber_service,
        })
    }
}
