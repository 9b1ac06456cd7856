// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Employees ---
        handlers::employees::create_employee,
        handlers::employees::list_employees,
        handlers::employees::deactivate_employee,
        handlers::employees::delete_employee,

        // --- Leaves ---
        handlers::leaves::submit_ferie,
        handlers::leaves::submit_permesso,
        handlers::leaves::list_my_leaves,
        handlers::leaves::list_all_leaves,
        handlers::leaves::decide_leave,
        handlers::leaves::get_my_balance,

        // --- Attendance ---
        handlers::attendance::create_manual_entry,
        handlers::attendance::create_bulk_entries,
        handlers::attendance::check_day,
        handlers::attendance::list_attendance,

        // --- Sick leaves ---
        handlers::sick_leaves::create_sick_leave,
        handlers::sick_leaves::list_sick_leaves,
        handlers::sick_leaves::delete_sick_leave,

        // --- Business trips ---
        handlers::business_trips::create_business_trip,
        handlers::business_trips::list_business_trips,
        handlers::business_trips::delete_business_trip,

        // --- Notifications ---
        handlers::notifications::create_notification,
        handlers::notifications::list_my_notifications,
        handlers::notifications::mark_notification_read,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,

        // --- Subscribers ---
        handlers::subscribers::create_subscriber,
        handlers::subscribers::list_subscribers,
        handlers::subscribers::get_subscriber,
        handlers::subscribers::list_subscriber_payments,
        handlers::subscribers::delete_subscriber,
        handlers::subscribers::toggle_subscriber_domain,
        handlers::subscribers::get_project_status,
        handlers::subscribers::set_project_status,

        // --- Stripe ---
        handlers::stripe_webhook::handle_stripe_webhook,
    ),
    components(
        schemas(
            // --- Employees ---
            models::employee::EmployeeRole,
            models::employee::Employee,
            models::employee::CreateEmployeePayload,
            models::employee::LoginPayload,
            models::employee::AuthResponse,

            // --- Leaves ---
            models::leave::LeaveKind,
            models::leave::LeaveStatus,
            models::leave::LeaveRequest,
            models::leave::LeaveBalance,
            handlers::leaves::SubmitFeriePayload,
            handlers::leaves::SubmitPermessoPayload,
            handlers::leaves::DecisionPayload,

            // --- Attendance ---
            models::attendance::Attendance,
            models::attendance::SickLeave,
            models::attendance::BusinessTrip,
            models::attendance::CompanySettings,
            handlers::attendance::ManualEntryPayload,
            handlers::attendance::BulkEntryPayload,
            handlers::attendance::ManualEntryResponse,
            handlers::sick_leaves::CreateSickLeavePayload,
            handlers::sick_leaves::SickLeaveResponse,
            handlers::business_trips::CreateTripPayload,
            handlers::business_trips::TripResponse,
            handlers::settings::UpdateSettingsPayload,
            services::conflict::ConflictReport,
            services::attendance_service::BulkEntryOutcome,

            // --- Notifications ---
            models::notification::Notification,
            handlers::notifications::CreateNotificationPayload,

            // --- Subscribers ---
            models::subscriber::SubscriptionStatus,
            models::subscriber::BillingInterval,
            models::subscriber::Subscriber,
            models::subscriber::Payment,
            handlers::subscribers::CreateSubscriberPayload,
            handlers::subscribers::ProjectStatusPayload,
            services::subscriber_service::ProvisionOutcome,
            services::subscriber_service::ToggleOutcome,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação"),
        (name = "Employees", description = "Gestão de Funcionários"),
        (name = "Leaves", description = "Ferie e Permessi"),
        (name = "Attendance", description = "Ponto Manual e Conflitos de Agenda"),
        (name = "SickLeaves", description = "Afastamentos por Doença"),
        (name = "BusinessTrips", description = "Viagens de Trabalho"),
        (name = "Notifications", description = "Notificações e E-mails"),
        (name = "Settings", description = "Configuração da Semana de Trabalho"),
        (name = "Subscribers", description = "Painel de Revenda SaaS"),
        (name = "Dashboard", description = "Status do Projeto do Assinante"),
        (name = "Stripe", description = "Webhook de Pagamentos")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
