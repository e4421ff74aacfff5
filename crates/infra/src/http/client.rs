use std::time::Duration;

use cranepay_domain::PayrollError;
use reqwest::header::RETRY_AFTER;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

use crate::errors::InfraError;

/// What a payroll request does to backend state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Batch, status and work-entry lookups. Safe to repeat.
    Read,
    /// Lifecycle changes, Zenegy syncs and review actions. Repeating one
    /// that reached the backend could approve or sync twice.
    Mutation,
}

impl RequestKind {
    /// Kind implied by an HTTP method
    pub fn for_method(method: &Method) -> Self {
        if matches!(*method, Method::GET | Method::HEAD) {
            Self::Read
        } else {
            Self::Mutation
        }
    }
}

/// When and how long to wait before repeating a request.
///
/// Reads are repeated on gateway errors, throttling and transport failures.
/// Mutations are repeated only when the connection was never established,
/// so the backend cannot have seen them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts for reads (initial try + retries)
    pub read_attempts: usize,
    /// Attempts for mutations whose connection failed
    pub connect_attempts: usize,
    /// Delay before the first retry
    pub base_backoff: Duration,
    /// Upper bound for backoff and `Retry-After`
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            read_attempts: 3,
            connect_attempts: 2,
            base_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Single attempt for every kind
    pub fn never() -> Self {
        Self { read_attempts: 1, connect_attempts: 1, ..Self::default() }
    }

    fn attempts(&self, kind: RequestKind) -> usize {
        match kind {
            RequestKind::Read => self.read_attempts,
            RequestKind::Mutation => self.connect_attempts,
        }
        .max(1)
    }

    fn retries_status(kind: RequestKind, status: StatusCode) -> bool {
        kind == RequestKind::Read
            && matches!(
                status,
                StatusCode::TOO_MANY_REQUESTS
                    | StatusCode::BAD_GATEWAY
                    | StatusCode::SERVICE_UNAVAILABLE
                    | StatusCode::GATEWAY_TIMEOUT
            )
    }

    fn retries_error(kind: RequestKind, err: &reqwest::Error) -> bool {
        match kind {
            RequestKind::Read => err.is_timeout() || err.is_connect() || err.is_request(),
            RequestKind::Mutation => err.is_connect(),
        }
    }

    /// Delay before retry number `retry` (1-based); a `Retry-After` in
    /// seconds takes precedence, capped at `max_backoff`.
    fn delay(&self, retry: usize, retry_after: Option<Duration>) -> Duration {
        let delay = retry_after.unwrap_or_else(|| {
            let shift = u32::try_from(retry.saturating_sub(1).min(8)).unwrap_or(8);
            self.base_backoff.saturating_mul(1u32 << shift)
        });
        delay.min(self.max_backoff)
    }
}

/// Transport for the payroll backend with a retry policy per request kind.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    policy: RetryPolicy,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, PayrollError> {
        Self::builder().build()
    }

    /// Retry policy in effect
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute `builder`, repeating it as the policy allows for `kind`.
    ///
    /// The last response is returned as-is, whatever its status.
    pub async fn execute(&self, kind: RequestKind, builder: RequestBuilder) -> Result<Response, PayrollError> {
        let attempts = self.policy.attempts(kind);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let request = builder
                .try_clone()
                .ok_or_else(|| PayrollError::Internal("request body is a stream and cannot be repeated".into()))?
                .build()
                .map_err(|err| PayrollError::from(InfraError::from(err)))?;

            let method = request.method().clone();
            let url = request.url().clone();
            debug!(attempt, ?kind, %method, %url, "sending payroll request");

            let retry_after = match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    if attempt >= attempts || !RetryPolicy::retries_status(kind, status) {
                        debug!(attempt, %method, %url, %status, "payroll response");
                        return Ok(response);
                    }
                    warn!(attempt, %method, %url, %status, "backend unavailable; retrying read");
                    retry_after(&response)
                }
                Err(err) => {
                    if attempt >= attempts || !RetryPolicy::retries_error(kind, &err) {
                        return Err(InfraError::from(err).into());
                    }
                    warn!(attempt, ?kind, %method, %url, error = %err, "request did not complete; retrying");
                    None
                }
            };

            let delay = self.policy.delay(attempt, retry_after);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}

fn retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    policy: RetryPolicy,
    user_agent: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), policy: RetryPolicy::default(), user_agent: None }
    }
}

impl HttpClientBuilder {
    /// Timeout for a single attempt
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the whole retry policy
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Attempts for reads (initial try + retries)
    pub fn read_attempts(mut self, attempts: usize) -> Self {
        self.policy.read_attempts = attempts.max(1);
        self
    }

    /// Delay before the first retry; doubles after each one
    pub fn base_backoff(mut self, backoff: Duration) -> Self {
        self.policy.base_backoff = backoff;
        self
    }

    /// `User-Agent` sent with every request
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client; fails when the TLS backend cannot start
    pub fn build(self) -> Result<HttpClient, PayrollError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();
        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }
        let client = builder.build().map_err(|err| PayrollError::from(InfraError::from(err)))?;

        Ok(HttpClient { client, policy: self.policy })
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client() -> HttpClient {
        HttpClient::builder().base_backoff(Duration::from_millis(5)).read_attempts(3).build().expect("http client")
    }

    fn failing_first(
        failures: usize,
        status: u16,
    ) -> impl Fn(&wiremock::Request) -> ResponseTemplate + Send + Sync + 'static {
        let attempts = Arc::new(AtomicUsize::new(0));
        move |_req: &wiremock::Request| {
            if attempts.fetch_add(1, Ordering::SeqCst) < failures {
                ResponseTemplate::new(status)
            } else {
                ResponseTemplate::new(200)
            }
        }
    }

    fn closed_port_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    #[test]
    fn kind_follows_method() {
        assert_eq!(RequestKind::for_method(&Method::GET), RequestKind::Read);
        assert_eq!(RequestKind::for_method(&Method::PATCH), RequestKind::Mutation);
        assert_eq!(RequestKind::for_method(&Method::POST), RequestKind::Mutation);
    }

    #[test]
    fn delay_doubles_and_honours_retry_after() {
        let policy = RetryPolicy {
            base_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay(1, None), Duration::from_millis(100));
        assert_eq!(policy.delay(3, None), Duration::from_millis(400));
        assert_eq!(policy.delay(9, None), Duration::from_secs(2));
        assert_eq!(policy.delay(1, Some(Duration::from_secs(1))), Duration::from_secs(1));
        assert_eq!(policy.delay(1, Some(Duration::from_secs(60))), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn reads_retry_gateway_errors_until_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(failing_first(2, 503)).expect(3).mount(&server).await;

        let client = client();
        let response =
            client.execute(RequestKind::Read, client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn reads_retry_throttling_with_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(200)).expect(1).mount(&server).await;

        let client = client();
        let response =
            client.execute(RequestKind::Read, client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn internal_server_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).respond_with(ResponseTemplate::new(500)).expect(1).mount(&server).await;

        let client = client();
        let response =
            client.execute(RequestKind::Read, client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn mutations_that_reached_the_backend_are_sent_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(failing_first(2, 503)).expect(1).mount(&server).await;

        let client = client();
        let response = client
            .execute(RequestKind::Mutation, client.request(Method::POST, server.uri()))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn refused_connection_is_a_network_error() {
        let url = closed_port_url();
        let client = HttpClient::builder().retry_policy(RetryPolicy::never()).build().expect("http client");
        assert_eq!(client.policy().read_attempts, 1);

        let read = client.execute(RequestKind::Read, client.request(Method::GET, &url)).await;
        assert!(matches!(read, Err(PayrollError::Network(_))), "{read:?}");

        let write = client.execute(RequestKind::Mutation, client.request(Method::PATCH, &url)).await;
        assert!(matches!(write, Err(PayrollError::Network(_))), "{write:?}");
    }
}
