//! Typed client for the compliment backend's HTTP contract.

mod client;
mod types;

pub use client::{
    resolve_base_url, ApiClient, ComplimentApi, DEFAULT_BASE_URL, DEFAULT_GENERATE_TIMEOUT_SECS,
    DEFAULT_TIMEOUT_SECS, GENERATE_PATH, HEALTH_PATH, MODELS_PATH, SEND_EMAIL_PATH,
};
pub use types::{
    ComplimentRequest, ComplimentResult, EmailRequest, EmailResponse, EmailServiceStatus,
    HealthStatus, LlmService, LlmStatus, ModelsStatus, CREDENTIAL_FIELDS,
};
