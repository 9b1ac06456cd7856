//src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod clients;
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::{admin_middleware, auth_middleware};

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas: login e o webhook de pagamentos (assinado, não autenticado)
    let auth_routes = Router::new().route("/login", post(handlers::auth::login));

    // Rotas de qualquer funcionário autenticado
    let me_routes = Router::new().route("/me", get(handlers::auth::get_me));

    let leave_admin_routes = Router::new()
        .route("/all", get(handlers::leaves::list_all_leaves))
        .route("/{id}/decision", put(handlers::leaves::decide_leave))
        .route_layer(axum_middleware::from_fn(admin_middleware));

    let leave_routes = Router::new()
        .route("/ferie", post(handlers::leaves::submit_ferie))
        .route("/permesso", post(handlers::leaves::submit_permesso))
        .route("/", get(handlers::leaves::list_my_leaves))
        .route("/balance", get(handlers::leaves::get_my_balance))
        .merge(leave_admin_routes);

    let attendance_bulk = Router::new()
        .route("/bulk", post(handlers::attendance::create_bulk_entries))
        .route_layer(axum_middleware::from_fn(admin_middleware));

    let attendance_routes = Router::new()
        .route(
            "/",
            post(handlers::attendance::create_manual_entry)
                .get(handlers::attendance::list_attendance),
        )
        .route("/check", get(handlers::attendance::check_day))
        .merge(attendance_bulk);

    let notification_routes = Router::new()
        .route(
            "/",
            post(handlers::notifications::create_notification)
                .get(handlers::notifications::list_my_notifications),
        )
        .route("/{id}/read", put(handlers::notifications::mark_notification_read));

    let settings_admin = Router::new()
        .route("/", put(handlers::settings::update_settings))
        .route_layer(axum_middleware::from_fn(admin_middleware));

    let settings_routes = Router::new()
        .route("/", get(handlers::settings::get_settings))
        .merge(settings_admin);

    // Rotas exclusivas de admin
    let employee_routes = Router::new()
        .route(
            "/",
            post(handlers::employees::create_employee).get(handlers::employees::list_employees),
        )
        .route("/{id}/deactivate", put(handlers::employees::deactivate_employee))
        .route("/{id}", delete(handlers::employees::delete_employee));

    let sick_leave_routes = Router::new()
        .route(
            "/",
            post(handlers::sick_leaves::create_sick_leave)
                .get(handlers::sick_leaves::list_sick_leaves),
        )
        .route("/{id}", delete(handlers::sick_leaves::delete_sick_leave));

    let trip_routes = Router::new()
        .route(
            "/",
            post(handlers::business_trips::create_business_trip)
                .get(handlers::business_trips::list_business_trips),
        )
        .route("/{id}", delete(handlers::business_trips::delete_business_trip));

    let subscriber_routes = Router::new()
        .route(
            "/",
            post(handlers::subscribers::create_subscriber)
                .get(handlers::subscribers::list_subscribers),
        )
        .route(
            "/{id}",
            get(handlers::subscribers::get_subscriber)
                .delete(handlers::subscribers::delete_subscriber),
        )
        .route("/{id}/payments", get(handlers::subscribers::list_subscriber_payments))
        .route("/{id}/toggle", put(handlers::subscribers::toggle_subscriber_domain));

    let dashboard_routes = Router::new().route(
        "/project-status",
        get(handlers::subscribers::get_project_status)
            .put(handlers::subscribers::set_project_status),
    );

    let admin_routes = Router::new()
        .nest("/employees", employee_routes)
        .nest("/sick-leaves", sick_leave_routes)
        .nest("/business-trips", trip_routes)
        .nest("/subscribers", subscriber_routes)
        .nest("/dashboard", dashboard_routes)
        .layer(axum_middleware::from_fn(admin_middleware));

    // Tudo que exige autenticação recebe o auth_middleware de uma vez
    let protected_routes = Router::new()
        .nest("/auth", me_routes)
        .nest("/leaves", leave_routes)
        .nest("/attendance", attendance_routes)
        .nest("/notifications", notification_routes)
        .nest("/settings", settings_routes)
        .merge(admin_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .route(
            "/api/stripe/webhook",
            post(handlers::stripe_webhook::handle_stripe_webhook),
        )
        .nest("/api", protected_routes)
        .merge(
            SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
