use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    NetworkError,
    HttpError,
}

/// A single failed attempt, or the terminal failure once retries are spent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
    pub status_code: Option<u16>,
    /// Raw response body of an `HttpError`.
    pub body: Option<String>,
}

impl FetchError {
    pub fn timeout(after: Duration) -> Self {
        Self {
            kind: FailureKind::Timeout,
            message: format!("request timed out after {} ms", after.as_millis()),
            status_code: None,
            body: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::NetworkError,
            message: message.into(),
            status_code: None,
            body: None,
        }
    }

    pub fn http(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::HttpError,
            message: message.into(),
            status_code: Some(status_code),
            body: None,
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == FailureKind::Timeout
    }

    /// A 4xx answer: the server understood the request and refused it.
    pub fn is_client_error(&self) -> bool {
        self.kind == FailureKind::HttpError
            && matches!(self.status_code, Some(status) if (400..500).contains(&status))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self {
                kind: FailureKind::Timeout,
                message: err.to_string(),
                status_code: None,
                body: None,
            };
        }
        match err.status() {
            Some(status) => Self::http(status.as_u16(), err.to_string()),
            None => Self::network(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status_code: u16,
    pub body: String,
}

pub type FetchOutcome = Result<FetchResponse, FetchError>;

/// An immutable description of one HTTP call.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
    pub timeout: Duration,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::GET,
            headers: Vec::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            method: Method::POST,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attach a bearer token when the context carries one.
    pub fn with_bearer(self, token: Option<&str>) -> Self {
        match token {
            Some(token) => self.with_header("Authorization", format!("Bearer {token}")),
            None => self,
        }
    }

    /// Parse the header list, failing on names or values HTTP cannot carry.
    pub fn header_map(&self) -> Result<HeaderMap, String> {
        let mut headers = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let header_name: HeaderName = name
                .parse()
                .map_err(|_| format!("invalid header name: {name}"))?;
            let header_value: HeaderValue = value
                .parse()
                .map_err(|_| format!("invalid header value for {name}"))?;
            headers.insert(header_name, header_value);
        }
        Ok(headers)
    }
}

/// Anything that can turn a [`FetchRequest`] into a [`FetchOutcome`].
pub trait Fetch: Send + Sync {
    fn fetch(&self, request: &FetchRequest) -> impl Future<Output = FetchOutcome> + Send;
}

impl<F: Fetch> Fetch for &F {
    fn fetch(&self, request: &FetchRequest) -> impl Future<Output = FetchOutcome> + Send {
        (**self).fetch(request)
    }
}

/// reqwest-backed fetcher sharing one connection pool.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn send(&self, request: &FetchRequest) -> FetchOutcome {
        let headers = request.header_map().map_err(FetchError::network)?;

        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .headers(headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!("API response status: {}", status);

        let body = response.text().await?;
        debug!("API response: {}", body);

        if !status.is_success() {
            return Err(FetchError::http(
                status.as_u16(),
                format!("request failed with status {status}: {body}"),
            )
            .with_body(body));
        }

        Ok(FetchResponse {
            status_code: status.as_u16(),
            body,
        })
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, request: &FetchRequest) -> impl Future<Output = FetchOutcome> + Send {
        async move {
            debug!("API request: {} {}", request.method, request.url);
            // Dropping the in-flight future on expiry aborts the call.
            match tokio::time::timeout(request.timeout, self.send(request)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(FetchError::timeout(request.timeout)),
            }
        }
    }
}
