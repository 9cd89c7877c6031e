use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{ClientError, GENERATION_FAILED_MESSAGE};
use crate::form::{Relationship, Tone};

/// Credential keys that must never appear in the email service summary.
pub const CREDENTIAL_FIELDS: [&str; 2] = ["smtp_user", "smtp_password"];

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplimentRequest {
    pub recipient_name: String,
    pub relationship: Relationship,
    pub qualities: Vec<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub context: Option<String>,
    pub tone: Tone,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |s| s.trim().is_empty())
}

/// Generated compliment plus whatever metadata the backend attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplimentResult {
    pub compliment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
    /// Opaque pass-through fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ComplimentResult {
    pub fn new(compliment: impl Into<String>) -> Self {
        Self {
            compliment: compliment.into(),
            generated_at: None,
            extra: Map::new(),
        }
    }

    pub fn mentions(&self, name: &str) -> bool {
        self.compliment.contains(name)
    }
}

/// Envelope returned by `POST /api/generate`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GenerateEnvelope {
    pub success: bool,
    #[serde(default)]
    pub data: Option<ComplimentResult>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl GenerateEnvelope {
    pub fn into_result(self) -> Result<ComplimentResult, ClientError> {
        if !self.success {
            let message = self
                .message
                .or(self.error)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| GENERATION_FAILED_MESSAGE.to_string());
            return Err(ClientError::GenerationFailed(message));
        }
        self.data.ok_or_else(|| {
            ClientError::UnexpectedResponse("generate response has success=true but no data".into())
        })
    }
}

/// Error body shapes seen on non-2xx responses (`detail` is FastAPI's).
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Best human-readable message carried by the body, if any.
    pub fn message(self) -> Option<String> {
        let detail = self.detail.and_then(|d| match d {
            Value::String(s) => Some(s),
            Value::Array(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str).map(str::to_string))
                    .collect();
                (!parts.is_empty()).then(|| parts.join("; "))
            }
            _ => None,
        });
        detail
            .or(self.message)
            .or(self.error)
            .filter(|m| !m.trim().is_empty())
    }
}

/// Body of `POST /api/send-email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRequest {
    pub recipient_email: String,
    pub recipient_name: String,
    pub sender_name: String,
    pub compliment: String,
}

/// Response of `POST /api/send-email`; `success` may be false on HTTP 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailResponse {
    pub success: bool,
    pub message: String,
}

impl EmailResponse {
    /// Treats a soft failure as an error.
    pub fn into_delivery(self) -> Result<String, ClientError> {
        if self.success {
            Ok(self.message)
        } else {
            Err(ClientError::EmailSoftFailure(self.message))
        }
    }
}

/// Which LLM provider the backend is configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmService {
    Ollama,
    Gemini,
}

impl fmt::Display for LlmService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmService::Ollama => f.write_str("ollama"),
            LlmService::Gemini => f.write_str("gemini"),
        }
    }
}

/// `llm` section of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmStatus {
    pub service: LlmService,
    pub available: bool,
    #[serde(default)]
    pub installed_models: Vec<String>,
    #[serde(default)]
    pub required_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `email_service` section of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmailServiceStatus {
    pub enabled: bool,
    pub configured: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub from_email: String,
    // Captured only so leaks can be reported; never re-serialized.
    #[serde(flatten)]
    unrecognized: BTreeMap<String, Value>,
}

impl Serialize for EmailServiceStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("EmailServiceStatus", 5)?;
        state.serialize_field("enabled", &self.enabled)?;
        state.serialize_field("configured", &self.configured)?;
        state.serialize_field("smtp_host", &self.smtp_host)?;
        state.serialize_field("smtp_port", &self.smtp_port)?;
        state.serialize_field("from_email", &self.from_email)?;
        state.end()
    }
}

impl EmailServiceStatus {
    pub fn new(enabled: bool, configured: bool, smtp_host: &str, smtp_port: u16, from_email: &str) -> Self {
        Self {
            enabled,
            configured,
            smtp_host: smtp_host.to_string(),
            smtp_port,
            from_email: from_email.to_string(),
            unrecognized: BTreeMap::new(),
        }
    }

    /// Credential field names the backend exposed, if any.
    pub fn leaked_credentials(&self) -> Vec<&'static str> {
        CREDENTIAL_FIELDS
            .into_iter()
            .filter(|field| self.unrecognized.contains_key(*field))
            .collect()
    }

    pub fn ready(&self) -> bool {
        self.enabled && self.configured
    }
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub version: String,
    pub llm: LlmStatus,
    pub email_service: EmailServiceStatus,
}

/// Response of `GET /api/models`. A backend that cannot reach its LLM
/// answers with only `available: false` and an `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelsStatus {
    pub available: bool,
    #[serde(default)]
    pub installed_models: Vec<String>,
    #[serde(default)]
    pub required_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<LlmService>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
