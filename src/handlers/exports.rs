// src/handlers/exports.rs

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::Caller, i18n::Locale},
};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// GET /api/exports/orders.xlsx
#[utoipa::path(
    get,
    path = "/api/exports/orders.xlsx",
    tag = "Exports",
    responses(
        (status = 200, description = "Planilha de pedidos gerada pelo backend", content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        (status = 502, description = "Backend indisponível")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_orders_excel(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
) -> Result<Response, ApiError> {
    let file = app_state
        .reporting_repo
        .orders_excel(caller.token())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Repassa os cabeçalhos do backend quando existem
    let content_type = file.content_type.unwrap_or_else(|| XLSX_CONTENT_TYPE.to_string());
    let disposition = file
        .content_disposition
        .unwrap_or_else(|| "attachment; filename=\"commandes.xlsx\"".to_string());

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}
