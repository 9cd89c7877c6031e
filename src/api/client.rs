use std::future::Future;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::types::{
    ComplimentRequest, ComplimentResult, EmailRequest, EmailResponse, ErrorBody, GenerateEnvelope,
    HealthStatus, ModelsStatus,
};
use crate::config::ApiConfig;
use crate::error::{ClientError, Result};

/// Backend used when no endpoint is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
/// Generation waits on an LLM, so it gets a longer bound.
pub const DEFAULT_GENERATE_TIMEOUT_SECS: u64 = 120;

pub const HEALTH_PATH: &str = "/health";
pub const MODELS_PATH: &str = "/api/models";
pub const GENERATE_PATH: &str = "/api/generate";
pub const SEND_EMAIL_PATH: &str = "/api/send-email";

/// Remote capabilities the controllers depend on.
pub trait ComplimentApi {
    fn check_health(&self) -> impl Future<Output = Result<HealthStatus>>;
    fn list_models(&self) -> impl Future<Output = Result<ModelsStatus>>;
    fn generate_compliment(
        &self,
        request: &ComplimentRequest,
    ) -> impl Future<Output = Result<ComplimentResult>>;
    fn send_email(&self, request: &EmailRequest) -> impl Future<Output = Result<EmailResponse>>;
}

/// Configured base URL if present and non-blank, otherwise the default.
pub fn resolve_base_url(configured: Option<&str>) -> String {
    configured
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .unwrap_or(DEFAULT_BASE_URL)
        .trim_end_matches('/')
        .to_string()
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

/// HTTP client for the compliment backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    generate_timeout: Duration,
}

impl ApiClient {
    /// Client with default timeouts against `base_url` (or the default endpoint).
    pub fn new(base_url: Option<&str>) -> Result<Self> {
        Self::with_timeouts(
            base_url,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Duration::from_secs(DEFAULT_GENERATE_TIMEOUT_SECS),
        )
    }

    pub fn with_timeouts(
        base_url: Option<&str>,
        timeout: Duration,
        generate_timeout: Duration,
    ) -> Result<Self> {
        let client = ClientBuilder::new()
            .default_headers(default_headers())
            .connect_timeout(timeout)
            .build()
            .map_err(|e| ClientError::ServiceUnavailable(format!("failed to build http client: {}", e)))?;

        let base_url = resolve_base_url(base_url);
        info!("API client targeting {}", base_url);

        Ok(Self {
            client,
            base_url,
            timeout,
            generate_timeout,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::with_timeouts(
            config.base_url.as_deref(),
            Duration::from_secs(config.timeout_secs),
            Duration::from_secs(config.generate_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!("GET {}", path);
        let response = self
            .client
            .get(self.url(path))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| transport_error(path, e))?;
        let (status, body) = read_body(path, response).await?;
        if !status.is_success() {
            return Err(unavailable(path, status, &body));
        }
        parse_body(path, &body)
    }
}

impl ComplimentApi for ApiClient {
    async fn check_health(&self) -> Result<HealthStatus> {
        self.get_json(HEALTH_PATH).await
    }

    async fn list_models(&self) -> Result<ModelsStatus> {
        self.get_json(MODELS_PATH).await
    }

    async fn generate_compliment(&self, request: &ComplimentRequest) -> Result<ComplimentResult> {
        info!(
            "Requesting compliment: relationship={}, tone={}, qualities={}, context={}",
            request.relationship,
            request.tone,
            request.qualities.len(),
            request.context.is_some()
        );
        let response = self
            .client
            .post(self.url(GENERATE_PATH))
            .timeout(self.generate_timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(GENERATE_PATH, e))?;
        let (status, body) = read_body(GENERATE_PATH, response).await?;

        if !status.is_success() {
            // A structured error body means the backend tried and failed.
            return match structured_message(&body) {
                Some(message) => {
                    warn!("Generation failed with {}: {}", status, message);
                    Err(ClientError::GenerationFailed(message))
                }
                None => Err(unavailable(GENERATE_PATH, status, &body)),
            };
        }

        let envelope: GenerateEnvelope = parse_body(GENERATE_PATH, &body)?;
        let result = envelope.into_result();
        match &result {
            Ok(r) => info!("Compliment received ({} chars)", r.compliment.len()),
            Err(e) => warn!("Generation reported failure: {}", e),
        }
        result
    }

    async fn send_email(&self, request: &EmailRequest) -> Result<EmailResponse> {
        info!("Sending compliment email for {}", request.recipient_name);
        let response = self
            .client
            .post(self.url(SEND_EMAIL_PATH))
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(SEND_EMAIL_PATH, e))?;
        let (status, body) = read_body(SEND_EMAIL_PATH, response).await?;
        if !status.is_success() {
            // The server validates the address; its explanation is worth showing.
            return match structured_message(&body) {
                Some(message) => {
                    warn!("Email rejected with {}: {}", status, message);
                    Err(ClientError::EmailRejected(message))
                }
                None => Err(unavailable(SEND_EMAIL_PATH, status, &body)),
            };
        }
        let response: EmailResponse = parse_body(SEND_EMAIL_PATH, &body)?;
        if !response.success {
            warn!("Email soft failure: {}", response.message);
        }
        Ok(response)
    }
}

async fn read_body(path: &str, response: Response) -> Result<(StatusCode, String)> {
    let status = response.status();
    let body = response.text().await.map_err(|e| transport_error(path, e))?;
    debug!("{} -> {} ({} bytes)", path, status, body.len());
    Ok((status, body))
}

fn parse_body<T: DeserializeOwned>(path: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        warn!("Malformed response from {}: {}", path, e);
        ClientError::UnexpectedResponse(format!("{}: {}", path, e))
    })
}

fn structured_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::message)
}

fn unavailable(path: &str, status: StatusCode, body: &str) -> ClientError {
    let reason = match structured_message(body) {
        Some(message) => format!("{} returned {}: {}", path, status, message),
        None => format!("{} returned {}", path, status),
    };
    warn!("{}", reason);
    ClientError::ServiceUnavailable(reason)
}

fn transport_error(path: &str, err: reqwest::Error) -> ClientError {
    warn!("Request to {} failed: {}", path, err);
    ClientError::from(err)
}
