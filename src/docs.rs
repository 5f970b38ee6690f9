// src/docs.rs

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_me,

        // --- Dashboard ---
        handlers::dashboard::get_overview,

        // --- Properties ---
        handlers::properties::list_properties,
        handlers::properties::create_property,
        handlers::properties::update_property,

        // --- Leases ---
        handlers::leases::list_leases,
        handlers::leases::create_lease,
        handlers::leases::update_lease,
        handlers::managers::list_managers,

        // --- Payments ---
        handlers::payments::list_payments,
        handlers::payments::create_payment,
        handlers::payments::cancel_payment,

        // --- Flows ---
        handlers::flows::run_flow,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::LoginPayload,
            models::auth::AuthStatus,
            models::auth::SessionResponse,

            // --- Dashboard ---
            models::dashboard::OccupancySummary,
            models::dashboard::CollectionSummary,
            models::dashboard::ReconciliationReport,
            models::dashboard::OverdueLease,
            models::dashboard::ExpiringLease,
            models::dashboard::ReadjustmentDue,
            models::dashboard::GroupStatusCount,
            models::dashboard::GroupCollection,
            models::dashboard::MonthlyRevenue,
            models::dashboard::GroupRevenue,
            models::dashboard::DashboardCharts,
            models::dashboard::DashboardOverview,

            // --- Properties ---
            models::property::UnitKind,
            models::property::Property,
            models::property::PropertyListing,
            models::property::NewPropertyPayload,
            models::property::UpdatePropertyPayload,

            // --- Leases ---
            models::lease::Lease,
            models::lease::LeaseListing,
            models::lease::NewLeasePayload,
            models::lease::UpdateLeasePayload,
            models::manager::Manager,

            // --- Payments ---
            models::payment::PaymentMethod,
            models::payment::LedgerEntry,
            models::payment::NewPaymentPayload,
            models::payment::PaymentHistoryRow,
            models::payment::PaymentHistory,

            // --- Flows ---
            models::flow::FlowKind,
            models::flow::FlowInput,
            models::flow::FlowStep,
            models::flow::FlowTarget,
            models::flow::FlowRequest,
            models::flow::FlowView,
        )
    ),
    tags(
        (name = "Auth", description = "Login e sessão por cookie"),
        (name = "Dashboard", description = "Visão Geral: ocupação, recebimento, alertas e gráficos"),
        (name = "Properties", description = "Cadastro e edição de imóveis"),
        (name = "Leases", description = "Contratos e gestores"),
        (name = "Payments", description = "Lançamentos financeiros e histórico"),
        (name = "Flows", description = "Formulários de várias etapas")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        // O nome real do cookie vem de COOKIE_NAME
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("controle_alugueis"))),
        );
    }
}
