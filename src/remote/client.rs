// src/remote/client.rs

use std::time::Duration;

use reqwest::{header, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::{common::error::AppError, remote::cache::ResponseCache};

// Arquivo binário repassado tal como veio (ex.: Excel)
#[derive(Debug, Clone)]
pub struct UpstreamFile {
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    service_token: Option<String>,
    cache: ResponseCache,
}

impl UpstreamClient {
    pub fn new(
        base_url: &str,
        service_token: Option<String>,
        timeout: Duration,
        cache: ResponseCache,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("stock-dashboard/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_token: service_token.filter(|t| !t.trim().is_empty()),
            cache,
        })
    }

    #[cfg(test)]
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn target(path: &str, query: &[(&str, String)]) -> String {
        if query.is_empty() {
            return path.to_string();
        }
        let params: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        format!("{}?{}", path, params.join("&"))
    }

    // Token do chamador primeiro, depois o token de serviço, senão nada.
    fn effective_token<'a>(&'a self, token: Option<&'a str>) -> Option<&'a str> {
        token.or(self.service_token.as_deref())
    }

    // Cada identidade tem o seu espaço no cache: o backend decide o que cada token vê.
    fn cache_key(&self, path: &str, query: &[(&str, String)], token: Option<&str>) -> String {
        let scope = match self.effective_token(token) {
            Some(token) => {
                let mut hasher = Sha256::new();
                hasher.update(token.as_bytes());
                format!("{:x}", hasher.finalize())
            }
            None => "anonymous".to_string(),
        };
        format!("{}|{}", scope, Self::target(path, query))
    }

    fn authorize(&self, builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match self.effective_token(token) {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn checked(response: reqwest::Response, path: &str) -> Result<reqwest::Response, AppError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        tracing::warn!("Backend respondeu {} em {}", status, path);
        Err(AppError::UpstreamStatus { endpoint: path.to_string(), status: status.as_u16() })
    }

    fn decode<T: DeserializeOwned>(value: Value, path: &str) -> Result<T, AppError> {
        serde_json::from_value(value)
            .map_err(|source| AppError::UpstreamPayload { endpoint: path.to_string(), source })
    }

    async fn read_value(response: reqwest::Response, path: &str) -> Result<Value, AppError> {
        let bytes = response.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes)
            .map_err(|source| AppError::UpstreamPayload { endpoint: path.to_string(), source })
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: Option<&str>,
    ) -> Result<T, AppError> {
        let key = self.cache_key(path, query, token);
        if let Some(value) = self.cache.get(&key) {
            tracing::debug!("Cache hit: {}", Self::target(path, query));
            return Self::decode(value, path);
        }

        self.fetch_and_cache(key, path, query, token).await
    }

    /// Ignora o que estiver em cache, mas guarda a resposta nova.
    pub async fn get_json_fresh<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: Option<&str>,
    ) -> Result<T, AppError> {
        let key = self.cache_key(path, query, token);
        self.fetch_and_cache(key, path, query, token).await
    }

    async fn fetch_and_cache<T: DeserializeOwned>(
        &self,
        key: String,
        path: &str,
        query: &[(&str, String)],
        token: Option<&str>,
    ) -> Result<T, AppError> {
        tracing::debug!("GET {}", Self::target(path, query));
        let request = self.authorize(self.http.get(self.url(path)).query(query), token);
        let response = Self::checked(request.send().await?, path)?;
        let value = Self::read_value(response, path).await?;

        let decoded = Self::decode(value.clone(), path)?;
        self.cache.insert(key, value);
        Ok(decoded)
    }

    pub async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<T, AppError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        tracing::debug!("{} {}", method, Self::target(path, query));
        let mut request = self.http.request(method, self.url(path)).query(query);
        if let Some(body) = body {
            request = request.json(body);
        }
        let request = self.authorize(request, token);
        let response = Self::checked(request.send().await?, path)?;

        // Mutação aceita: tudo o que estava em cache pode estar velho.
        self.cache.invalidate_all();

        let value = Self::read_value(response, path).await?;
        Self::decode(value, path)
    }

    pub async fn get_file(&self, path: &str, token: Option<&str>) -> Result<UpstreamFile, AppError> {
        tracing::debug!("GET (arquivo) {}", path);
        let request = self.authorize(self.http.get(self.url(path)), token);
        let response = Self::checked(request.send().await?, path)?;

        let header_value = |name: header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let content_type = header_value(header::CONTENT_TYPE);
        let content_disposition = header_value(header::CONTENT_DISPOSITION);
        let bytes = response.bytes().await?.to_vec();

        Ok(UpstreamFile { content_type, content_disposition, bytes })
    }
}
