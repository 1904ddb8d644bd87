// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Dashboard ---
        handlers::dashboard::get_overview,
        handlers::dashboard::get_orders_and_requests,
        handlers::dashboard::get_usage_by_category,
        handlers::dashboard::get_stock_shares,
        handlers::dashboard::get_requesters,
        handlers::dashboard::get_product_monthly,

        // --- Reports ---
        handlers::reports::get_annual_report,
        handlers::reports::get_weekly_report,
        handlers::exports::get_orders_excel,

        // --- Inventory ---
        handlers::inventory::list_products,
        handlers::inventory::create_product,
        handlers::inventory::update_product,
        handlers::inventory::delete_product,
        handlers::inventory::list_categories,
        handlers::inventory::create_category,
        handlers::inventory::list_suppliers,
        handlers::inventory::create_supplier,
        handlers::inventory::delete_supplier,

        // --- Requests & Orders ---
        handlers::operations::list_pending_requests,
        handlers::operations::list_approved_requests,
        handlers::operations::create_request,
        handlers::operations::decide_request,
        handlers::operations::take_request,
        handlers::operations::list_exceptional_requests,
        handlers::operations::create_exceptional_request,
        handlers::operations::accept_exceptional_request,
        handlers::operations::reject_exceptional_request,
        handlers::operations::order_exceptional_request,
        handlers::operations::deliver_exceptional_request,
        handlers::operations::take_exceptional_request,
        handlers::operations::list_orders,
        handlers::operations::create_order,
        handlers::operations::update_order_status,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::update_user_status,
    ),
    components(
        schemas(
            // --- Dashboard ---
            models::dashboard::DashboardStats,
            models::dashboard::CategoryStock,
            models::dashboard::CategoryUsage,
            models::dashboard::MonthlyOrders,
            models::dashboard::MonthlyOrdersAndRequests,
            models::dashboard::SupplierOrders,
            models::dashboard::ProductOrderLine,
            models::dashboard::DashboardProduct,
            models::dashboard::ProductMonthStats,
            models::dashboard::CategoryUsageSummary,
            models::dashboard::StockShare,
            models::dashboard::RequesterTotal,
            models::dashboard::RequesterShape,
            models::dashboard::RequesterBreakdown,
            models::dashboard::ProductMonthlyView,
            models::dashboard::DashboardOverview,

            // --- Inventory ---
            models::inventory::ProductStatus,
            models::inventory::ProductCriterion,
            models::inventory::Category,
            models::inventory::CategoryPayload,
            models::inventory::Product,
            models::inventory::ProductPayload,
            models::inventory::SupplierCounts,
            models::inventory::Supplier,
            models::inventory::SupplierPayload,

            // --- Operations ---
            models::operations::OrderStatus,
            models::operations::RequestStatus,
            models::operations::ExceptionalStatus,
            models::operations::RequestDecision,
            models::operations::Order,
            models::operations::Request,
            models::operations::ExceptionalRequest,
            models::operations::DecisionPayload,
            models::operations::RejectionPayload,
            models::operations::OrderStatusPayload,
            models::operations::LinePayload,
            models::operations::ExceptionalLinePayload,
            models::operations::NewRequestPayload,
            models::operations::NewExceptionalPayload,
            models::operations::NewOrderPayload,

            // --- Users ---
            models::users::UserRole,
            models::users::UserStatus,
            models::users::RequesterKind,
            models::users::User,
            models::users::UpdateUserStatusPayload,

            // --- Avisos ---
            handlers::WarningBody,
        )
    ),
    tags(
        (name = "Dashboard", description = "Indicadores e gráficos de estoque e pedidos"),
        (name = "Reports", description = "Relatórios PDF anual e semanal"),
        (name = "Exports", description = "Exportações geradas pelo backend"),
        (name = "Inventory", description = "Produtos e categorias"),
        (name = "Suppliers", description = "Fornecedores"),
        (name = "Requests", description = "Demandas regulares e excepcionais"),
        (name = "Orders", description = "Pedidos a fornecedores"),
        (name = "Users", description = "Administração de usuários")
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

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_served_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/reports/annual"));
        assert!(doc.paths.paths.contains_key("/api/products/{id}"));
        assert!(doc.paths.paths.contains_key("/api/requests/exceptional/{id}/deliver"));
        assert!(doc.components.unwrap().security_schemes.contains_key("api_jwt"));
    }
}
