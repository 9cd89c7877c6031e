//! Live checks of the backend's HTTP contract.
//!
//! Each check issues real requests through a [`ComplimentApi`] and reports
//! pass, fail, or skipped. Nothing here panics on a misbehaving backend.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::api::{ComplimentApi, ComplimentRequest, EmailRequest};
use crate::form::{Relationship, Tone};

static SEMVER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("semver pattern is valid"));

/// Name the generation checks expect to see echoed back.
pub const PROBE_NAME: &str = "Alice";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Pass,
    Fail(String),
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCheck {
    pub name: &'static str,
    pub outcome: CheckOutcome,
}

impl ContractCheck {
    fn new(name: &'static str, outcome: CheckOutcome) -> Self {
        Self { name, outcome }
    }

    fn expect(name: &'static str, ok: bool, failure: impl FnOnce() -> String) -> Self {
        let outcome = if ok { CheckOutcome::Pass } else { CheckOutcome::Fail(failure()) };
        Self::new(name, outcome)
    }

    pub fn passed(&self) -> bool {
        self.outcome == CheckOutcome::Pass
    }

    pub fn failed(&self) -> bool {
        matches!(self.outcome, CheckOutcome::Fail(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContractOptions {
    pub skip_generate: bool,
    pub skip_email: bool,
    /// Recipient used by the email check.
    pub probe_email: Option<String>,
}

pub fn probe_request(with_context: bool) -> ComplimentRequest {
    if with_context {
        ComplimentRequest {
            recipient_name: PROBE_NAME.to_string(),
            relationship: Relationship::Friend,
            qualities: vec!["creative".to_string(), "persistent".to_string()],
            context: Some("finished a challenging project".to_string()),
            tone: Tone::Warm,
        }
    } else {
        ComplimentRequest {
            recipient_name: PROBE_NAME.to_string(),
            relationship: Relationship::Friend,
            qualities: vec!["kind".to_string(), "thoughtful".to_string()],
            context: None,
            tone: Tone::Warm,
        }
    }
}

pub async fn run<A: ComplimentApi>(api: &A, options: &ContractOptions) -> Vec<ContractCheck> {
    let mut checks = Vec::new();

    match api.check_health().await {
        Ok(health) => {
            checks.push(ContractCheck::new("health responds", CheckOutcome::Pass));
            checks.push(ContractCheck::expect("health version is semver", SEMVER.is_match(&health.version), || {
                format!("version '{}' is not MAJOR.MINOR.PATCH", health.version)
            }));
            // The schema only admits ollama or gemini, so parsing already proved it.
            checks.push(ContractCheck::new("llm service is ollama or gemini", CheckOutcome::Pass));
            checks.push(ContractCheck::expect(
                "llm has installed models",
                !health.llm.installed_models.is_empty(),
                || "installed_models is empty".to_string(),
            ));
            let leaked = health.email_service.leaked_credentials();
            checks.push(ContractCheck::expect("email service hides credentials", leaked.is_empty(), || {
                format!("exposes {}", leaked.join(", "))
            }));
        }
        Err(e) => {
            checks.push(ContractCheck::new("health responds", CheckOutcome::Fail(e.to_string())));
            for name in [
                "health version is semver",
                "llm service is ollama or gemini",
                "llm has installed models",
                "email service hides credentials",
            ] {
                checks.push(ContractCheck::new(name, CheckOutcome::Skipped("health unavailable".into())));
            }
        }
    }

    checks.push(match api.list_models().await {
        Ok(models) => ContractCheck::expect(
            "models lists installed models",
            !models.installed_models.is_empty(),
            || "installed_models is empty".to_string(),
        ),
        Err(e) => ContractCheck::new("models lists installed models", CheckOutcome::Fail(e.to_string())),
    });

    for (name, with_context) in [
        ("generate with context mentions recipient", true),
        ("generate without context mentions recipient", false),
    ] {
        if options.skip_generate {
            checks.push(ContractCheck::new(name, CheckOutcome::Skipped("disabled".into())));
            continue;
        }
        checks.push(match api.generate_compliment(&probe_request(with_context)).await {
            Ok(result) => ContractCheck::expect(name, result.mentions(PROBE_NAME), || {
                format!("compliment does not contain '{}'", PROBE_NAME)
            }),
            Err(e) => ContractCheck::new(name, CheckOutcome::Fail(e.to_string())),
        });
    }

    let email_check = "send-email answers success and message";
    if options.skip_email {
        checks.push(ContractCheck::new(email_check, CheckOutcome::Skipped("disabled".into())));
    } else {
        let request = EmailRequest {
            recipient_email: options
                .probe_email
                .clone()
                .unwrap_or_else(|| "test@example.com".to_string()),
            recipient_name: "Test".to_string(),
            sender_name: "Test".to_string(),
            compliment: "Test compliment".to_string(),
        };
        // A soft failure still satisfies the contract: the shape is what matters.
        checks.push(match api.send_email(&request).await {
            Ok(_) => ContractCheck::new(email_check, CheckOutcome::Pass),
            Err(e) => ContractCheck::new(email_check, CheckOutcome::Fail(e.to_string())),
        });
    }

    let failed = checks.iter().filter(|c| c.failed()).count();
    info!("Contract run finished: {} checks, {} failed", checks.len(), failed);
    checks
}
