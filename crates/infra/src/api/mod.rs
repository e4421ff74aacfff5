//! Payroll REST backend client
//!
//! - `auth`: bearer token providers
//! - `client`: authenticated JSON client over [`crate::http::HttpClient`]
//! - `dto`: wire shapes and their conversion into domain types
//! - `payroll`: [`PayrollApi`], the adapter implementing every core port

pub mod auth;
pub mod client;
mod dto;
pub mod payroll;

pub use auth::{AccessTokenProvider, EnvTokenProvider, StaticTokenProvider, API_TOKEN_ENV};
pub use client::{ApiClient, ApiClientBuilder, ApiClientConfig};
pub use payroll::PayrollApi;
