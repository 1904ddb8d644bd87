// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use utoipa::ToSchema;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Os três grandes grupos de falha: rede/HTTP, JSON inválido e validação.
// O resto são regras de negócio e o relatório.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Backend respondeu {status} em {endpoint}")]
    UpstreamStatus { endpoint: String, status: u16 },

    #[error("Falha de rede ao chamar o backend: {0}")]
    UpstreamUnavailable(#[from] reqwest::Error),

    #[error("Resposta inválida de {endpoint}: {source}")]
    UpstreamPayload {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Produto não encontrado")]
    ProductNotFound,

    #[error("Fornecedor não encontrado")]
    SupplierNotFound,

    #[error("Demanda não encontrada")]
    RequestNotFound,

    #[error("Produto duplicado (nome + marca)")]
    DuplicateProduct,

    #[error("Fornecedor possui {orders} pedidos e {exceptional_requests} demandas excepcionais")]
    SupplierHasDependencies { orders: u32, exceptional_requests: u32 },

    #[error("Produto ligado a pedidos ou demandas")]
    ProductHasDependencies,

    #[error("Motivo de rejeição obrigatório")]
    RejectionReasonRequired,

    #[error("Motivo de devolução obrigatório")]
    ReturnReasonRequired,

    #[error("A demanda não está pendente")]
    RequestNotPending,

    #[error("Demanda em {actual}, esperado {expected}")]
    UnexpectedStatus { expected: &'static str, actual: &'static str },

    #[error("Estoque insuficiente para {product}: {available} disponível, {requested} pedido")]
    InsufficientStock { product: String, available: u32, requested: u32 },

    #[error("Produto excepcional já existe no catálogo")]
    ProductAlreadyInCatalogue,

    #[error("Sem dados suficientes para gerar o relatório")]
    NoReportData,

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Falha ao renderizar o PDF: {0}")]
    PdfRender(String),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

// O erro já "traduzido" que vai para o cliente.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<Value>,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::DuplicateProduct
            | AppError::RejectionReasonRequired
            | AppError::ReturnReasonRequired
            | AppError::RequestNotPending
            | AppError::UnexpectedStatus { .. }
            | AppError::InsufficientStock { .. }
            | AppError::ProductAlreadyInCatalogue => StatusCode::BAD_REQUEST,
            AppError::ProductNotFound | AppError::SupplierNotFound | AppError::RequestNotFound => {
                StatusCode::NOT_FOUND
            }
            AppError::SupplierHasDependencies { .. } | AppError::ProductHasDependencies => {
                StatusCode::CONFLICT
            }
            AppError::NoReportData => StatusCode::UNPROCESSABLE_ENTITY,
            // A autorização é do backend: 401/403 chegam ao cliente como tal.
            AppError::UpstreamStatus { status, .. } => match *status {
                401 => StatusCode::UNAUTHORIZED,
                403 => StatusCode::FORBIDDEN,
                404 => StatusCode::NOT_FOUND,
                400 | 409 | 422 => StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                _ => StatusCode::BAD_GATEWAY,
            },
            AppError::UpstreamUnavailable(_) | AppError::UpstreamPayload { .. } => {
                StatusCode::BAD_GATEWAY
            }
            AppError::FontNotFound(_)
            | AppError::PdfRender(_)
            | AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Chave da mensagem no I18nStore.
    pub fn message_key(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_failed",
            AppError::UpstreamStatus { status: 401, .. } => "upstream_unauthorized",
            AppError::UpstreamStatus { status: 403, .. } => "upstream_forbidden",
            AppError::UpstreamStatus { .. } => "upstream_status",
            AppError::UpstreamUnavailable(_) => "upstream_unavailable",
            AppError::UpstreamPayload { .. } => "upstream_payload",
            AppError::ProductNotFound => "product_not_found",
            AppError::SupplierNotFound => "supplier_not_found",
            AppError::RequestNotFound => "request_not_found",
            AppError::DuplicateProduct => "duplicate_product",
            AppError::SupplierHasDependencies { .. } => "supplier_has_dependencies",
            AppError::ProductHasDependencies => "product_has_dependencies",
            AppError::RejectionReasonRequired => "rejection_reason_required",
            AppError::ReturnReasonRequired => "return_reason_required",
            AppError::RequestNotPending => "request_not_pending",
            AppError::UnexpectedStatus { .. } => "request_wrong_status",
            AppError::InsufficientStock { .. } => "insufficient_stock",
            AppError::ProductAlreadyInCatalogue => "product_in_catalogue",
            AppError::NoReportData => "no_report_data",
            AppError::FontNotFound(_) | AppError::PdfRender(_) => "report_generation_failed",
            AppError::InternalServerError(_) => "internal_error",
        }
    }

    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status_code();

        if status.is_server_error() || status == StatusCode::BAD_GATEWAY {
            tracing::error!("Erro Interno do Servidor: {}", self);
        } else {
            tracing::debug!("Erro de requisição: {}", self);
        }

        let details = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::BTreeMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                Some(json!(details))
            }
            AppError::SupplierHasDependencies { orders, exceptional_requests } => Some(json!({
                "commandes": orders,
                "demandesExceptionnelles": exceptional_requests,
            })),
            AppError::UnexpectedStatus { expected, actual } => Some(json!({
                "statutAttendu": expected,
                "statutActuel": actual,
            })),
            AppError::InsufficientStock { product, available, requested } => Some(json!({
                "produit": product,
                "disponible": available,
                "demande": requested,
            })),
            _ => None,
        };

        ApiError {
            status,
            message: store.translate(&locale.0, self.message_key()),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.message, "details": details }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

// Sem Locale disponível respondemos no idioma padrão.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), I18nStore::shared())
            .into_response()
    }
}

// ---
// Avisos: efeitos secundários que falharam sem invalidar a ação principal
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationWarning {
    ReportingEntryNotRecorded,
    StockAlertNotSent,
    RequesterDataUnavailable,
    ReportSectionDegraded,
}

impl OperationWarning {
    pub fn key(&self) -> &'static str {
        match self {
            OperationWarning::ReportingEntryNotRecorded => "reporting_entry_not_recorded",
            OperationWarning::StockAlertNotSent => "stock_alert_not_sent",
            OperationWarning::RequesterDataUnavailable => "requester_data_unavailable",
            OperationWarning::ReportSectionDegraded => "report_section_degraded",
        }
    }

    pub fn translate(&self, locale: &Locale, store: &I18nStore) -> String {
        store.translate(&locale.0, self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    fn fr() -> Locale {
        Locale("fr".to_string())
    }

    #[test]
    fn validation_error_lists_field_messages() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("range");
        err.message = Some("La quantité doit être un entier non négatif".into());
        errors.add("quantite", err);

        let api = AppError::ValidationError(errors).to_api_error(&fr(), &I18nStore::new());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.message, "Un ou plusieurs champs sont invalides.");
        let details = api.details.expect("detalhes da validação");
        assert_eq!(
            details["quantite"][0],
            "La quantité doit être un entier non négatif"
        );
    }

    #[test]
    fn dependency_guard_is_a_conflict_with_counts() {
        let api = AppError::SupplierHasDependencies { orders: 2, exceptional_requests: 1 }
            .to_api_error(&Locale("en".to_string()), &I18nStore::new());

        assert_eq!(api.status, StatusCode::CONFLICT);
        assert!(api.message.starts_with("Cannot delete"));
        assert_eq!(api.details.unwrap()["commandes"], 2);
    }

    #[test]
    fn upstream_failures_map_to_gateway_errors() {
        let err = AppError::UpstreamStatus { endpoint: "/api/dashboard/stats".into(), status: 500 };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);

        let err = AppError::UpstreamStatus { endpoint: "/api/admin/produit".into(), status: 404 };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let source = serde_json::from_str::<Value>("{").unwrap_err();
        let err = AppError::UpstreamPayload { endpoint: "/api/dashboard/stock".into(), source };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.message_key(), "upstream_payload");
    }

    #[test]
    fn upstream_auth_failures_pass_through() {
        let store = I18nStore::new();
        let err = AppError::UpstreamStatus { endpoint: "/api/admin/users".into(), status: 401 };
        let api = err.to_api_error(&fr(), &store);
        assert_eq!(api.status, StatusCode::UNAUTHORIZED);
        assert_eq!(api.message, "Session expirée ou non authentifiée.");

        let err = AppError::UpstreamStatus { endpoint: "/api/admin/users".into(), status: 403 };
        let api = err.to_api_error(&Locale("en".into()), &store);
        assert_eq!(api.status, StatusCode::FORBIDDEN);
        assert_eq!(api.message, "You are not allowed to perform this action.");
    }

    #[test]
    fn stock_shortage_reports_quantities() {
        let api = AppError::InsufficientStock { product: "Toner".into(), available: 2, requested: 5 }
            .to_api_error(&fr(), &I18nStore::new());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.unwrap();
        assert_eq!(details["disponible"], 2);
        assert_eq!(details["demande"], 5);
    }

    #[test]
    fn warnings_are_translated() {
        let store = I18nStore::new();
        let msg = OperationWarning::StockAlertNotSent.translate(&Locale("en".into()), &store);
        assert_eq!(msg, "Stock updated, but the stock alert could not be sent.");
    }
}
