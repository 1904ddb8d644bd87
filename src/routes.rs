// src/routes.rs

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::{config::AppState, docs, handlers};

pub fn app(app_state: AppState) -> Router {
    let dashboard_routes = Router::new()
        .route("/overview", get(handlers::dashboard::get_overview))
        .route("/orders-requests", get(handlers::dashboard::get_orders_and_requests))
        .route("/usage-by-category", get(handlers::dashboard::get_usage_by_category))
        .route("/stock-shares", get(handlers::dashboard::get_stock_shares))
        .route("/requesters", get(handlers::dashboard::get_requesters))
        .route("/products/{id}/monthly", get(handlers::dashboard::get_product_monthly));

    let report_routes = Router::new()
        .route("/annual", get(handlers::reports::get_annual_report))
        .route("/weekly", get(handlers::reports::get_weekly_report));

    let inventory_routes = Router::new()
        .route(
            "/products",
            get(handlers::inventory::list_products).post(handlers::inventory::create_product),
        )
        .route(
            "/products/{id}",
            put(handlers::inventory::update_product).delete(handlers::inventory::delete_product),
        )
        .route(
            "/categories",
            get(handlers::inventory::list_categories).post(handlers::inventory::create_category),
        )
        .route(
            "/suppliers",
            get(handlers::inventory::list_suppliers).post(handlers::inventory::create_supplier),
        )
        .route(
            "/suppliers/{id}",
            axum::routing::delete(handlers::inventory::delete_supplier),
        );

    let request_routes = Router::new()
        .route("/", post(handlers::operations::create_request))
        .route("/pending", get(handlers::operations::list_pending_requests))
        .route("/approved", get(handlers::operations::list_approved_requests))
        .route("/{id}/decision", post(handlers::operations::decide_request))
        .route("/{id}/pickup", post(handlers::operations::take_request))
        .route(
            "/exceptional",
            get(handlers::operations::list_exceptional_requests)
                .post(handlers::operations::create_exceptional_request),
        )
        .route(
            "/exceptional/{id}/accept",
            post(handlers::operations::accept_exceptional_request),
        )
        .route(
            "/exceptional/{id}/reject",
            post(handlers::operations::reject_exceptional_request),
        )
        .route("/exceptional/{id}/order", post(handlers::operations::order_exceptional_request))
        .route(
            "/exceptional/{id}/deliver",
            post(handlers::operations::deliver_exceptional_request),
        )
        .route("/exceptional/{id}/pickup", post(handlers::operations::take_exceptional_request));

    let order_routes = Router::new()
        .route("/", get(handlers::operations::list_orders).post(handlers::operations::create_order))
        .route("/{id}/status", patch(handlers::operations::update_order_status));

    let user_routes = Router::new()
        .route("/", get(handlers::users::list_users))
        .route("/{id}", patch(handlers::users::update_user_status));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/exports/orders.xlsx", get(handlers::exports::get_orders_excel))
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/reports", report_routes)
        .nest("/api/requests", request_routes)
        .nest("/api/orders", order_routes)
        .nest("/api/users", user_routes)
        .nest("/api", inventory_routes)
        .merge(docs::swagger_ui())
        .with_state(app_state)
}
