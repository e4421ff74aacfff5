//! Bearer token sources for the payroll API

use async_trait::async_trait;
use cranepay_domain::{PayrollError, Result};

/// Environment variable read by [`EnvTokenProvider`]
pub const API_TOKEN_ENV: &str = "CRANEPAY_API_TOKEN";

/// Trait for providing access tokens
///
/// The token is fetched for every request so implementations can refresh
/// transparently.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    /// Get a valid access token
    async fn access_token(&self) -> Result<String>;
}

/// Fixed token, e.g. issued to a service account
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Provider returning `token` unchanged
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into() }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

/// Reads [`API_TOKEN_ENV`] on every call so a rotated token is picked up
/// without a restart.
#[derive(Clone, Copy, Default)]
pub struct EnvTokenProvider;

#[async_trait]
impl AccessTokenProvider for EnvTokenProvider {
    async fn access_token(&self) -> Result<String> {
        match std::env::var(API_TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(PayrollError::Config(format!("{API_TOKEN_ENV} is not set"))),
        }
    }
}

impl std::fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenProvider").field("token", &"<redacted>").finish()
    }
}
