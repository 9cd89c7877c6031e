use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::api::{ComplimentApi, HealthStatus, ModelsStatus};

/// Last known state of one read-only backend snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability<T> {
    /// Never checked.
    Unknown,
    /// The last check failed; carries the reason for logs and display.
    Unavailable(String),
    Known(T),
}

impl<T> Default for Availability<T> {
    fn default() -> Self {
        Availability::Unknown
    }
}

impl<T> Availability<T> {
    pub fn known(&self) -> Option<&T> {
        match self {
            Availability::Known(value) => Some(value),
            _ => None,
        }
    }

    fn from_result<E: std::fmt::Display>(what: &str, result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Availability::Known(value),
            Err(e) => {
                warn!("{} check failed: {}", what, e);
                Availability::Unavailable(e.to_string())
            }
        }
    }
}

/// Informational view of backend health; never gates the form.
#[derive(Debug, Default)]
pub struct CapabilityReporter {
    health: Availability<HealthStatus>,
    models: Availability<ModelsStatus>,
    checked_at: Option<DateTime<Utc>>,
}

impl CapabilityReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn health(&self) -> &Availability<HealthStatus> {
        &self.health
    }

    pub fn models(&self) -> &Availability<ModelsStatus> {
        &self.models
    }

    pub fn checked_at(&self) -> Option<DateTime<Utc>> {
        self.checked_at
    }

    /// Fetches `/health` and `/api/models` concurrently.
    pub async fn refresh<A: ComplimentApi>(&mut self, api: &A) {
        let (health, models) = tokio::join!(api.check_health(), api.list_models());
        self.health = Availability::from_result("Health", health);
        self.models = Availability::from_result("Models", models);
        self.checked_at = Some(Utc::now());
        info!(
            "Capabilities refreshed: llm_ready={:?}, email_ready={:?}",
            self.llm_ready(),
            self.email_ready()
        );
    }

    /// Refreshes every `interval`, calling `on_update` after each round.
    /// Stops after `rounds` refreshes, or runs until the caller drops the future.
    pub async fn watch<A, F>(&mut self, api: &A, interval: Duration, rounds: Option<usize>, mut on_update: F)
    where
        A: ComplimentApi,
        F: FnMut(&CapabilityReporter),
    {
        let mut ticker = tokio::time::interval(interval);
        let mut done = 0usize;
        loop {
            ticker.tick().await;
            self.refresh(api).await;
            on_update(self);
            done += 1;
            if rounds.is_some_and(|limit| done >= limit) {
                break;
            }
        }
    }

    /// `None` until checked; an unreachable backend counts as not ready.
    pub fn llm_ready(&self) -> Option<bool> {
        match (&self.health, &self.models) {
            (Availability::Known(health), _) => Some(health.llm.available),
            (_, Availability::Known(models)) => Some(models.available),
            (Availability::Unknown, Availability::Unknown) => None,
            _ => Some(false),
        }
    }

    pub fn email_ready(&self) -> Option<bool> {
        match &self.health {
            Availability::Known(health) => Some(health.email_service.ready()),
            Availability::Unavailable(_) => Some(false),
            Availability::Unknown => None,
        }
    }
}
