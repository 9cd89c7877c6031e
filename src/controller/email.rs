use tracing::{debug, info, warn};

use super::{Generated, InFlight, Ticket};
use crate::api::{ComplimentApi, EmailRequest, EmailResponse};
use crate::error::{ClientError, Result};
use crate::form::EmailDraft;

/// Why an email attempt did not go through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailFailure {
    /// The backend answered but declined: `success: false`, or a rejection
    /// carrying its own message.
    Soft(String),
    /// The request never produced a usable answer.
    Transport(String),
}

impl EmailFailure {
    pub fn message(&self) -> &str {
        match self {
            EmailFailure::Soft(message) | EmailFailure::Transport(message) => message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailState {
    Idle,
    Sending,
    /// Carries the backend's confirmation message.
    Sent(String),
    Failed(EmailFailure),
}

#[derive(Debug, Clone)]
pub struct PendingEmail {
    pub ticket: Ticket,
    pub request: EmailRequest,
}

/// Sends a previously generated compliment by email.
#[derive(Debug)]
pub struct EmailController {
    state: EmailState,
    in_flight: InFlight,
}

impl Default for EmailController {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailController {
    pub fn new() -> Self {
        Self {
            state: EmailState::Idle,
            in_flight: InFlight::default(),
        }
    }

    pub fn state(&self) -> &EmailState {
        &self.state
    }

    pub fn is_sending(&self) -> bool {
        self.in_flight.is_busy()
    }

    /// Actionable only once a compliment exists and the draft is complete.
    pub fn can_send(&self, generated: Option<&Generated>, draft: &EmailDraft) -> bool {
        generated.is_some() && draft.is_valid() && !self.is_sending()
    }

    pub fn begin(&mut self, generated: Option<&Generated>, draft: &EmailDraft) -> Result<PendingEmail> {
        if self.is_sending() {
            debug!("Email ignored: request already in flight");
            return Err(ClientError::Busy);
        }
        let generated = generated.ok_or_else(|| ClientError::ValidationBlocked {
            missing: vec!["a generated compliment"],
        })?;
        let request = draft.to_request(&generated.request.recipient_name, &generated.result)?;

        let ticket = self.in_flight.issue();
        info!("Email {} started", ticket.generation());
        self.state = EmailState::Sending;
        Ok(PendingEmail { ticket, request })
    }

    /// Applies the outcome; on success returns the backend message.
    pub fn complete(&mut self, ticket: Ticket, outcome: Result<EmailResponse>) -> Result<&str> {
        if !self.in_flight.settle(ticket) {
            debug!("Discarding stale email response {}", ticket.generation());
            return Err(ClientError::StaleResponse);
        }

        match outcome.and_then(EmailResponse::into_delivery) {
            Ok(message) => {
                info!("Email {} delivered", ticket.generation());
                self.state = EmailState::Sent(message);
                Ok(self.user_message().unwrap_or_default())
            }
            Err(err @ (ClientError::EmailSoftFailure(_) | ClientError::EmailRejected(_))) => {
                warn!("Email {} not delivered: {}", ticket.generation(), err);
                self.state = EmailState::Failed(EmailFailure::Soft(err.user_message()));
                Err(err)
            }
            Err(err) => {
                warn!("Email {} failed: {}", ticket.generation(), err);
                self.state = EmailState::Failed(EmailFailure::Transport(err.user_message()));
                Err(err)
            }
        }
    }

    /// Message to show for the last finished attempt, whatever its outcome.
    pub fn user_message(&self) -> Option<&str> {
        match &self.state {
            EmailState::Sent(message) => Some(message),
            EmailState::Failed(failure) => Some(failure.message()),
            EmailState::Idle | EmailState::Sending => None,
        }
    }

    /// Back to `Idle`, orphaning any in-flight request.
    pub fn invalidate(&mut self) {
        self.in_flight.invalidate();
        self.state = EmailState::Idle;
    }

    pub async fn send<A: ComplimentApi>(
        &mut self,
        api: &A,
        generated: Option<&Generated>,
        draft: &EmailDraft,
    ) -> Result<&str> {
        let pending = self.begin(generated, draft)?;
        let outcome = api.send_email(&pending.request).await;
        self.complete(pending.ticket, outcome)
    }
}
