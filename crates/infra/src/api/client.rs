//! JSON client for the payroll REST backend
//!
//! Adds the base URL and bearer token to every request, maps non-success
//! statuses to [`PayrollError::Server`] and decodes bodies. Reads may be
//! repeated by the transport; writes are repeated only when they never
//! reached the backend.

use std::sync::Arc;
use std::time::Duration;

use cranepay_domain::{ApiConfig, PayrollError, Result};
use reqwest::{Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::auth::AccessTokenProvider;
use super::dto::ErrorBody;
use crate::errors::InfraError;
use crate::http::{HttpClient, RequestKind};

/// Configuration for API client
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL without trailing slash
    pub base_url: String,
    /// Timeout for a single request
    pub timeout: Duration,
    /// Attempts for GET requests (initial try + retries)
    pub read_attempts: usize,
    pub user_agent: String,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self::from(&ApiConfig::default())
    }
}

impl From<&ApiConfig> for ApiClientConfig {
    fn from(config: &ApiConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
            read_attempts: config.read_attempts.max(1),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// Authenticated JSON client
#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
    auth: Arc<dyn AccessTokenProvider>,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Errors
    ///
    /// `InvalidUrl` when the base URL does not parse, or a transport error
    /// when the HTTP client cannot be built.
    pub fn new(config: ApiClientConfig, auth: Arc<dyn AccessTokenProvider>) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| PayrollError::InvalidUrl(format!("{}: {e}", config.base_url)))?;

        let http = HttpClient::builder()
            .timeout(config.timeout)
            .read_attempts(config.read_attempts)
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self { http, auth, base_url })
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// GET `path` with query parameters, retried on transient failures
    #[instrument(skip_all, fields(path = %path))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.url(path, query)?;
        let token = self.auth.access_token().await?;
        let request = self.http.request(Method::GET, url.clone()).bearer_auth(token);

        debug!(url = %url, "GET request");
        let response = self.http.execute(RequestKind::Read, request).await?;
        Self::decode(response, &url).await
    }

    /// POST a JSON body; sent once
    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        self.write(Method::POST, path, body).await
    }

    /// PUT a JSON body; sent once
    pub async fn put<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        self.write(Method::PUT, path, body).await
    }

    /// PATCH a JSON body; sent once
    pub async fn patch<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        self.write(Method::PATCH, path, body).await
    }

    #[instrument(skip_all, fields(%method, path = %path))]
    async fn write<B, R>(&self, method: Method, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = self.url(path, &[])?;
        let payload = serde_json::to_vec(body).map_err(|e| PayrollError::Internal(format!("Failed to serialize body: {e}")))?;
        let token = self.auth.access_token().await?;
        let request = self
            .http
            .request(method, url.clone())
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload);

        debug!(url = %url, "write request");
        let response = self.http.execute(RequestKind::Mutation, request).await?;
        Self::decode(response, &url).await
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url = Url::parse(&joined).map_err(|e| PayrollError::InvalidUrl(format!("{joined}: {e}")))?;

        if !query.is_empty() {
            let encoded: Vec<String> = query
                .iter()
                .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
                .collect();
            url.set_query(Some(&encoded.join("&")));
        }
        Ok(url)
    }

    async fn decode<T: DeserializeOwned>(response: Response, url: &Url) -> Result<T> {
        let status = response.status();
        let body = response.bytes().await.map_err(|e| PayrollError::from(InfraError::from(e)))?;

        if !status.is_success() {
            let error = Self::map_status_error(status, &body);
            warn!(url = %url, status = status.as_u16(), error = %error, "payroll API returned an error");
            return Err(error);
        }

        // 204/205 carry no body
        if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT || body.is_empty() {
            return serde_json::from_value(serde_json::Value::Null).map_err(|_| {
                PayrollError::InvalidResponse(format!(
                    "{url} returned no content ({}) but a body was expected",
                    status.as_u16()
                ))
            });
        }

        serde_json::from_slice(&body).map_err(|e| PayrollError::from(InfraError::from(e)))
    }

    fn map_status_error(status: StatusCode, body: &[u8]) -> PayrollError {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(ErrorBody::into_message)
            .or_else(|| {
                let text = String::from_utf8_lossy(body).trim().to_string();
                (!text.is_empty() && text.len() <= 200).then_some(text)
            })
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unexpected status").to_string());

        PayrollError::Server { code: status.as_u16(), message }
    }
}

/// Builder for API client
#[derive(Default)]
pub struct ApiClientBuilder {
    config: Option<ApiClientConfig>,
    auth: Option<Arc<dyn AccessTokenProvider>>,
}

impl ApiClientBuilder {
    /// Set the API configuration
    pub fn config(mut self, config: ApiClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the authentication provider
    pub fn auth(mut self, auth: Arc<dyn AccessTokenProvider>) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Build the API client
    ///
    /// # Errors
    ///
    /// Returns error if the auth provider is missing or client creation fails
    pub fn build(self) -> Result<ApiClient> {
        let config = self.config.unwrap_or_default();
        let auth = self.auth.ok_or_else(|| PayrollError::Config("Auth provider not set".to_string()))?;

        ApiClient::new(config, auth)
    }
}
