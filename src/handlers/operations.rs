// src/handlers/operations.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::MutationResponse,
    middleware::{auth::Caller, i18n::Locale},
    models::operations::{
        DecisionPayload, ExceptionalRequest, NewExceptionalPayload, NewOrderPayload,
        NewRequestPayload, Order, OrderStatusPayload, RejectionPayload, Request,
    },
};

// =============================================================================
//  1. DEMANDAS REGULARES
// =============================================================================

// GET /api/requests/pending
#[utoipa::path(
    get,
    path = "/api/requests/pending",
    tag = "Requests",
    responses((status = 200, description = "Demandas em espera", body = Vec<Request>)),
    security(("api_jwt" = []))
)]
pub async fn list_pending_requests(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    let requests = app_state
        .request_service
        .pending_requests(&caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(requests)))
}

// GET /api/requests/approved
#[utoipa::path(
    get,
    path = "/api/requests/approved",
    tag = "Requests",
    responses((status = 200, description = "Demandas aprovadas", body = Vec<Request>)),
    security(("api_jwt" = []))
)]
pub async fn list_approved_requests(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    let requests = app_state
        .request_service
        .approved_requests(&caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(requests)))
}

// POST /api/requests/{id}/decision
#[utoipa::path(
    post,
    path = "/api/requests/{id}/decision",
    tag = "Requests",
    request_body = DecisionPayload,
    params(("id" = Uuid, Path, description = "ID da demanda")),
    responses(
        (status = 200, description = "Demanda decidida ({ data, warnings })", body = Request),
        (status = 400, description = "Motivo ausente ou demanda já decidida"),
        (status = 404, description = "Demanda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn decide_request(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(payload): Json<DecisionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = app_state
        .request_service
        .decide(&caller, id, payload.decision, payload.raison_refus.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        Json(MutationResponse::from_outcome(outcome, &locale, &app_state.i18n_store)),
    ))
}

// POST /api/requests
#[utoipa::path(
    post,
    path = "/api/requests",
    tag = "Requests",
    request_body = NewRequestPayload,
    responses(
        (status = 201, description = "Demanda criada ({ data, warnings })", body = Request),
        (status = 400, description = "Linha inválida ou estoque insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_request(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Json(payload): Json<NewRequestPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let outcome = app_state
        .request_service
        .create_request(&caller, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::from_outcome(outcome, &locale, &app_state.i18n_store)),
    ))
}

// POST /api/requests/{id}/pickup
#[utoipa::path(
    post,
    path = "/api/requests/{id}/pickup",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "ID da demanda")),
    responses(
        (status = 200, description = "Demanda retirada ({ data, warnings })", body = Request),
        (status = 400, description = "Demanda não aprovada ou estoque insuficiente"),
        (status = 404, description = "Demanda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn take_request(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = app_state
        .request_service
        .take_request(&caller, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        Json(MutationResponse::from_outcome(outcome, &locale, &app_state.i18n_store)),
    ))
}

// =============================================================================
//  2. DEMANDAS EXCEPCIONAIS
// =============================================================================

// GET /api/requests/exceptional
#[utoipa::path(
    get,
    path = "/api/requests/exceptional",
    tag = "Requests",
    responses((status = 200, description = "Demandas excepcionais", body = Vec<ExceptionalRequest>)),
    security(("api_jwt" = []))
)]
pub async fn list_exceptional_requests(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    let requests = app_state
        .request_service
        .exceptional_requests(&caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(requests)))
}

// POST /api/requests/exceptional/{id}/accept
#[utoipa::path(
    post,
    path = "/api/requests/exceptional/{id}/accept",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "ID da demanda excepcional")),
    responses(
        (status = 200, description = "Demanda aceita ({ data, warnings })", body = ExceptionalRequest),
        (status = 400, description = "Demanda não está em espera")
    ),
    security(("api_jwt" = []))
)]
pub async fn accept_exceptional_request(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = app_state
        .request_service
        .accept_exceptional(&caller, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        Json(MutationResponse::from_outcome(outcome, &locale, &app_state.i18n_store)),
    ))
}

// POST /api/requests/exceptional/{id}/reject
#[utoipa::path(
    post,
    path = "/api/requests/exceptional/{id}/reject",
    tag = "Requests",
    request_body = RejectionPayload,
    params(("id" = Uuid, Path, description = "ID da demanda excepcional")),
    responses(
        (status = 200, description = "Demanda rejeitada ({ data, warnings })", body = ExceptionalRequest),
        (status = 400, description = "Motivo ausente ou demanda já decidida")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_exceptional_request(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = app_state
        .request_service
        .reject_exceptional(&caller, id, &payload.raison_refus)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        Json(MutationResponse::from_outcome(outcome, &locale, &app_state.i18n_store)),
    ))
}

// POST /api/requests/exceptional
#[utoipa::path(
    post,
    path = "/api/requests/exceptional",
    tag = "Requests",
    request_body = NewExceptionalPayload,
    responses(
        (status = 201, description = "Demanda excepcional criada ({ data, warnings })", body = ExceptionalRequest),
        (status = 400, description = "Linha inválida ou produto já no catálogo")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_exceptional_request(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Json(payload): Json<NewExceptionalPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let outcome = app_state
        .request_service
        .create_exceptional(&caller, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::from_outcome(outcome, &locale, &app_state.i18n_store)),
    ))
}

// POST /api/requests/exceptional/{id}/order
#[utoipa::path(
    post,
    path = "/api/requests/exceptional/{id}/order",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "ID da demanda excepcional")),
    responses(
        (status = 200, description = "Demanda encomendada ({ data, warnings })", body = ExceptionalRequest),
        (status = 400, description = "Demanda não está ACCEPTEE"),
        (status = 404, description = "Demanda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn order_exceptional_request(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = app_state
        .request_service
        .order_exceptional(&caller, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        Json(MutationResponse::from_outcome(outcome, &locale, &app_state.i18n_store)),
    ))
}

// POST /api/requests/exceptional/{id}/deliver
#[utoipa::path(
    post,
    path = "/api/requests/exceptional/{id}/deliver",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "ID da demanda excepcional")),
    responses(
        (status = 200, description = "Demanda entregue ({ data, warnings })", body = ExceptionalRequest),
        (status = 400, description = "Demanda não está COMMANDEE"),
        (status = 404, description = "Demanda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn deliver_exceptional_request(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = app_state
        .request_service
        .deliver_exceptional(&caller, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        Json(MutationResponse::from_outcome(outcome, &locale, &app_state.i18n_store)),
    ))
}

// POST /api/requests/exceptional/{id}/pickup
#[utoipa::path(
    post,
    path = "/api/requests/exceptional/{id}/pickup",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "ID da demanda excepcional")),
    responses(
        (status = 200, description = "Demanda retirada ({ data, warnings })", body = ExceptionalRequest),
        (status = 400, description = "Demanda não está LIVREE"),
        (status = 404, description = "Demanda não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn take_exceptional_request(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = app_state
        .request_service
        .take_exceptional(&caller, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        Json(MutationResponse::from_outcome(outcome, &locale, &app_state.i18n_store)),
    ))
}

// =============================================================================
//  3. PEDIDOS
// =============================================================================

// GET /api/orders
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    responses((status = 200, description = "Pedidos a fornecedores", body = Vec<Order>)),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    let orders = app_state
        .request_service
        .list_orders(&caller)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(orders)))
}

// POST /api/orders
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = NewOrderPayload,
    responses(
        (status = 201, description = "Pedido criado ({ data, warnings })", body = Order),
        (status = 400, description = "Fornecedor ou produto inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Json(payload): Json<NewOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let outcome = app_state
        .request_service
        .create_order(&caller, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::CREATED,
        Json(MutationResponse::from_outcome(outcome, &locale, &app_state.i18n_store)),
    ))
}

// PATCH /api/orders/{id}/status
#[utoipa::path(
    patch,
    path = "/api/orders/{id}/status",
    tag = "Orders",
    request_body = OrderStatusPayload,
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Status atualizado ({ data, warnings })", body = Order),
        (status = 400, description = "EN_RETOUR sem motivo")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_order_status(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    Path(id): Path<Uuid>,
    Json(payload): Json<OrderStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = app_state
        .request_service
        .update_order_status(&caller, id, payload.statut, payload.raison_retour.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        Json(MutationResponse::from_outcome(outcome, &locale, &app_state.i18n_store)),
    ))
}
