// src/handlers/reports.rs

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::Caller, i18n::Locale},
    services::report_builder::ReportWindow,
};

// Chaves dos avisos, separadas por vírgula
pub const REPORT_WARNINGS_HEADER: &str = "x-report-warnings";

// Os nomes semanais levam o mês em francês ("février", "août").
fn ascii_fallback(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            'à' | 'â' | 'ä' => 'a',
            'ç' => 'c',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' => 'i',
            'ô' | 'ö' => 'o',
            'ù' | 'û' | 'ü' => 'u',
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect()
}

/// `filename` ASCII para clientes antigos e `filename*` em UTF-8 (RFC 6266).
pub(crate) fn attachment_disposition(filename: &str) -> String {
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii_fallback(filename),
        urlencoding::encode(filename)
    )
}

async fn render(
    app_state: AppState,
    locale: Locale,
    caller: Caller,
    window: ReportWindow,
) -> Result<Response, ApiError> {
    let today = chrono::Local::now().date_naive();

    let report = app_state
        .report_service
        .generate(window, today, caller.token(), caller.user_id.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let disposition = attachment_disposition(&report.filename);
    let mut response = (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        report.bytes,
    )
        .into_response();

    if !report.warnings.is_empty() {
        let keys: Vec<&str> = report.warnings.iter().map(|w| w.key()).collect();
        if let Ok(value) = HeaderValue::from_str(&keys.join(",")) {
            response
                .headers_mut()
                .insert(HeaderName::from_static(REPORT_WARNINGS_HEADER), value);
        }
    }

    Ok(response)
}

// GET /api/reports/annual
#[utoipa::path(
    get,
    path = "/api/reports/annual",
    tag = "Reports",
    responses(
        (status = 200, description = "Relatório anual em PDF", content_type = "application/pdf"),
        (status = 422, description = "Sem dados suficientes"),
        (status = 500, description = "Falha ao gerar o PDF")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_annual_report(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
) -> Result<Response, ApiError> {
    render(app_state, locale, caller, ReportWindow::Annual).await
}

// GET /api/reports/weekly
#[utoipa::path(
    get,
    path = "/api/reports/weekly",
    tag = "Reports",
    responses(
        (status = 200, description = "Relatório dos últimos 7 dias em PDF", content_type = "application/pdf"),
        (status = 422, description = "Sem dados suficientes"),
        (status = 500, description = "Falha ao gerar o PDF")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_weekly_report(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
) -> Result<Response, ApiError> {
    render(app_state, locale, caller, ReportWindow::Weekly).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekly_filename_keeps_accents_only_in_the_encoded_form() {
        let value = attachment_disposition("Rapport_Hebdomadaire_14_août_2025.pdf");
        assert_eq!(
            value,
            "attachment; filename=\"Rapport_Hebdomadaire_14_aout_2025.pdf\"; \
             filename*=UTF-8''Rapport_Hebdomadaire_14_ao%C3%BBt_2025.pdf"
        );
        assert!(value.is_ascii());
        assert!(HeaderValue::from_str(&value).is_ok());
    }

    #[test]
    fn annual_filename_is_unchanged() {
        assert_eq!(
            attachment_disposition("rapport-annuel-2025.pdf"),
            "attachment; filename=\"rapport-annuel-2025.pdf\"; filename*=UTF-8''rapport-annuel-2025.pdf"
        );
    }
}
