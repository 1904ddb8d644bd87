// src/handlers/dashboard.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    handlers::RangeQuery,
    middleware::{auth::Caller, i18n::Locale},
    models::dashboard::{
        CategoryUsageSummary, DashboardOverview, MonthlyOrdersAndRequests, ProductMonthlyView,
        RequesterBreakdown, StockShare,
    },
};

// GET /api/dashboard/overview
#[utoipa::path(
    get,
    path = "/api/dashboard/overview",
    tag = "Dashboard",
    params(RangeQuery),
    responses(
        (status = 200, description = "Painel completo (falha se qualquer fonte falhar)", body = DashboardOverview),
        (status = 502, description = "Backend indisponível ou resposta inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_overview(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let overview = app_state
        .dashboard_service
        .overview(query.range(), caller.token())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(overview)))
}

// GET /api/dashboard/orders-requests
#[utoipa::path(
    get,
    path = "/api/dashboard/orders-requests",
    tag = "Dashboard",
    params(RangeQuery),
    responses(
        (status = 200, description = "Pedidos e demandas por mês", body = Vec<MonthlyOrdersAndRequests>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_orders_and_requests(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let series = app_state
        .dashboard_service
        .orders_and_requests(query.range(), caller.token())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(series)))
}

// GET /api/dashboard/usage-by-category
#[utoipa::path(
    get,
    path = "/api/dashboard/usage-by-category",
    tag = "Dashboard",
    params(RangeQuery),
    responses(
        (status = 200, description = "Uso por categoria em quatro status", body = CategoryUsageSummary)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_usage_by_category(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .dashboard_service
        .usage_by_category(query.range(), caller.token())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/dashboard/stock-shares
#[utoipa::path(
    get,
    path = "/api/dashboard/stock-shares",
    tag = "Dashboard",
    params(RangeQuery),
    responses(
        (status = 200, description = "Estoque por categoria com percentual", body = Vec<StockShare>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_stock_shares(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let shares = app_state
        .dashboard_service
        .stock_shares(query.range(), caller.token())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(shares)))
}

// GET /api/dashboard/requesters
#[utoipa::path(
    get,
    path = "/api/dashboard/requesters",
    tag = "Dashboard",
    params(RangeQuery),
    responses(
        (status = 200, description = "Total de demandas por demandante", body = RequesterBreakdown)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_requesters(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let breakdown = app_state
        .dashboard_service
        .requesters(query.range(), caller.token())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(breakdown)))
}

// GET /api/dashboard/products/{id}/monthly
#[utoipa::path(
    get,
    path = "/api/dashboard/products/{id}/monthly",
    tag = "Dashboard",
    params(
        ("id" = Uuid, Path, description = "ID do produto"),
        RangeQuery
    ),
    responses(
        (status = 200, description = "12 meses do produto + entradas/saídas", body = ProductMonthlyView)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_product_monthly(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(product_id): Path<Uuid>,
    Query(query): Query<RangeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let view = app_state
        .dashboard_service
        .product_monthly(product_id, query.range(), caller.token())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(view)))
}
