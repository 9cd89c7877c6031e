use once_cell::sync::Lazy;
use regex::Regex;

use crate::api::{ComplimentResult, EmailRequest};
use crate::error::ClientError;

// Loose syntactic check; the backend does the real validation.
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

pub fn looks_like_email(address: &str) -> bool {
    EMAIL_PATTERN.is_match(address.trim())
}

/// Input for the secondary "send by email" form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailDraft {
    recipient_email: String,
    sender_name: String,
    default_sender: String,
}

impl EmailDraft {
    pub fn new(default_sender: impl Into<String>) -> Self {
        let default_sender = default_sender.into();
        Self {
            recipient_email: String::new(),
            sender_name: default_sender.clone(),
            default_sender,
        }
    }

    pub fn recipient_email(&self) -> &str {
        &self.recipient_email
    }

    pub fn sender_name(&self) -> &str {
        &self.sender_name
    }

    pub fn set_recipient_email(&mut self, address: impl Into<String>) {
        self.recipient_email = address.into();
    }

    pub fn set_sender_name(&mut self, name: impl Into<String>) {
        self.sender_name = name.into();
    }

    pub fn reset(&mut self) {
        self.recipient_email.clear();
        self.sender_name = self.default_sender.clone();
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !looks_like_email(&self.recipient_email) {
            missing.push("recipient email");
        }
        if self.sender_name.trim().is_empty() {
            missing.push("sender name");
        }
        missing
    }

    pub fn is_valid(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Pairs the draft with a generated compliment.
    pub fn to_request(
        &self,
        recipient_name: &str,
        result: &ComplimentResult,
    ) -> Result<EmailRequest, ClientError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(ClientError::ValidationBlocked { missing });
        }
        Ok(EmailRequest {
            recipient_email: self.recipient_email.trim().to_string(),
            recipient_name: recipient_name.to_string(),
            sender_name: self.sender_name.trim().to_string(),
            compliment: result.compliment.clone(),
        })
    }
}
