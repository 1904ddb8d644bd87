// src/config.rs

use std::{env, path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;

use crate::{
    common::i18n::I18nStore,
    remote::{
        DashboardRepository, InventoryRepository, OperationsRepository, ReportingRepository,
        ResponseCache, UpstreamClient, UserRepository,
    },
    services::{
        dashboard_service::DashboardService, document_service::DocumentService,
        inventory_service::InventoryService, report_service::ReportService,
        request_service::RequestService, user_service::UserService,
    },
};

#[derive(Debug, Clone)]
pub struct Settings {
    pub upstream_url: String,
    pub upstream_token: Option<String>,
    pub bind_addr: String,
    pub upstream_timeout: Duration,
    pub cache_ttl: Duration,
    pub report_concurrency: usize,
    pub fonts_dir: PathBuf,
    pub font_family: String,
    pub logo_path: Option<PathBuf>,
}

// Variável ausente usa o padrão; presente mas inválida é erro.
fn parsed_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} inválida: {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let upstream_url = env::var("UPSTREAM_API_URL").context("UPSTREAM_API_URL deve ser definida")?;

        Ok(Self {
            upstream_url,
            upstream_token: optional("UPSTREAM_API_TOKEN"),
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            upstream_timeout: Duration::from_secs(parsed_or("UPSTREAM_TIMEOUT_SECS", 10)?),
            cache_ttl: Duration::from_secs(parsed_or("CACHE_TTL_SECS", 30)?),
            report_concurrency: parsed_or("REPORT_CONCURRENCY", 8)?,
            fonts_dir: optional("FONTS_DIR").unwrap_or_else(|| "./fonts".to_string()).into(),
            font_family: optional("FONT_FAMILY").unwrap_or_else(|| "Roboto".to_string()),
            logo_path: optional("REPORT_LOGO_PATH").map(PathBuf::from),
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub i18n_store: Arc<I18nStore>,
    pub dashboard_service: DashboardService,
    pub report_service: ReportService,
    pub inventory_service: InventoryService,
    pub request_service: RequestService,
    pub user_service: UserService,
    pub reporting_repo: ReportingRepository,
}

impl AppState {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        // Um único cliente (e cache) para todos os repositórios
        let client = UpstreamClient::new(
            &settings.upstream_url,
            settings.upstream_token.clone(),
            settings.upstream_timeout,
            ResponseCache::new(settings.cache_ttl),
        )?;

        // --- Monta o gráfico de dependências ---
        let dashboard_repo = DashboardRepository::new(client.clone());
        let inventory_repo = InventoryRepository::new(client.clone());
        let operations_repo = OperationsRepository::new(client.clone());
        let reporting_repo = ReportingRepository::new(client.clone());
        let user_repo = UserRepository::new(client);

        let dashboard_service = DashboardService::new(dashboard_repo, settings.report_concurrency);
        let document_service = DocumentService::new(
            settings.fonts_dir.clone(),
            settings.font_family.clone(),
            settings.logo_path.clone(),
        );
        let report_service =
            ReportService::new(dashboard_service.clone(), reporting_repo.clone(), document_service);

        tracing::info!(
            "Backend em {} (cache {}s, {} chamadas simultâneas por relatório)",
            settings.upstream_url,
            settings.cache_ttl.as_secs(),
            settings.report_concurrency
        );

        Ok(Self {
            i18n_store: Arc::new(I18nStore::new()),
            dashboard_service,
            report_service,
            inventory_service: InventoryService::new(inventory_repo.clone(), reporting_repo.clone()),
            request_service: RequestService::new(operations_repo, inventory_repo, reporting_repo.clone()),
            user_service: UserService::new(user_repo),
            reporting_repo,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn settings_for(upstream_url: &str) -> Settings {
        Settings {
            upstream_url: upstream_url.to_string(),
            upstream_token: None,
            bind_addr: "127.0.0.1:0".into(),
            upstream_timeout: Duration::from_secs(5),
            cache_ttl: Duration::ZERO,
            report_concurrency: 2,
            fonts_dir: "/nonexistent/fonts".into(),
            font_family: "Roboto".into(),
            logo_path: None,
        }
    }

    #[test]
    fn state_builds_from_settings() {
        assert!(AppState::new(&settings_for("http://localhost:4000/")).is_ok());
    }
}
