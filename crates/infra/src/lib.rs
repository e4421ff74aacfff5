//! # Cranepay Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - HTTP transport with retry for read-only requests
//! - The REST adapter for the payroll backend and Zenegy sync
//! - Configuration loading (environment, JSON, TOML)
//! - Logging initialisation
//!
//! ## Architecture
//! - Implements traits defined in `cranepay-core`
//! - Depends on `cranepay-domain` and `cranepay-core`
//! - Contains all "impure" code (I/O, network)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod observability;

pub use api::{AccessTokenProvider, ApiClient, ApiClientConfig, EnvTokenProvider, PayrollApi, StaticTokenProvider};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder, RequestKind, RetryPolicy};
pub use observability::init_logging;
