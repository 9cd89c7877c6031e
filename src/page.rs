//! One compliment page: form, generation, email and capability state together.

use tracing::{debug, info};

use crate::api::{ComplimentApi, ComplimentResult, EmailResponse};
use crate::controller::{
    CapabilityReporter, EmailController, Generated, PendingEmail, PendingSubmission,
    SubmissionController, Ticket,
};
use crate::error::{ClientError, Result};
use crate::form::{EmailDraft, FormChange, FormEvent, FormState};

/// Owns all state for a page, from mount until [`ComposerPage::leave`].
#[derive(Debug)]
pub struct ComposerPage {
    form: FormState,
    submission: SubmissionController,
    email_draft: EmailDraft,
    email: EmailController,
    capabilities: CapabilityReporter,
}

impl ComposerPage {
    pub fn new(default_sender: &str) -> Self {
        Self {
            form: FormState::new(),
            submission: SubmissionController::new(),
            email_draft: EmailDraft::new(default_sender),
            email: EmailController::new(),
            capabilities: CapabilityReporter::new(),
        }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn submission(&self) -> &SubmissionController {
        &self.submission
    }

    pub fn email_draft(&self) -> &EmailDraft {
        &self.email_draft
    }

    pub fn email_draft_mut(&mut self) -> &mut EmailDraft {
        &mut self.email_draft
    }

    pub fn email(&self) -> &EmailController {
        &self.email
    }

    pub fn capabilities(&self) -> &CapabilityReporter {
        &self.capabilities
    }

    pub fn generated(&self) -> Option<&Generated> {
        self.submission.generated()
    }

    pub fn can_submit(&self) -> bool {
        self.submission.can_submit(&self.form)
    }

    pub fn can_send_email(&self) -> bool {
        self.email.can_send(self.submission.generated(), &self.email_draft)
    }

    /// Applies a user edit; a real change returns a finished submission to idle.
    pub fn apply(&mut self, event: FormEvent) -> FormChange {
        let change = self.form.apply(event);
        if change.changed() {
            self.submission.on_form_edited();
        }
        change
    }

    pub fn begin_submission(&mut self) -> Result<PendingSubmission> {
        let pending = self.submission.begin(&self.form)?;
        // The previous compliment is gone, so is anything emailing it.
        self.email.invalidate();
        Ok(pending)
    }

    /// Success clears the form for the next compliment; failure leaves it for correction.
    pub fn complete_submission(
        &mut self,
        ticket: Ticket,
        outcome: Result<ComplimentResult>,
    ) -> Result<&Generated> {
        if let Err(err) = self.submission.complete(ticket, outcome) {
            return Err(err);
        }
        self.form.reset();
        debug!("Form reset after successful submission");
        self.submission.generated().ok_or(ClientError::StaleResponse)
    }

    pub async fn submit<A: ComplimentApi>(&mut self, api: &A) -> Result<&Generated> {
        let pending = self.begin_submission()?;
        let outcome = api.generate_compliment(&pending.request).await;
        self.complete_submission(pending.ticket, outcome)
    }

    pub fn begin_email(&mut self) -> Result<PendingEmail> {
        self.email.begin(self.submission.generated(), &self.email_draft)
    }

    pub fn complete_email(&mut self, ticket: Ticket, outcome: Result<EmailResponse>) -> Result<&str> {
        self.email.complete(ticket, outcome)
    }

    pub async fn send_email<A: ComplimentApi>(&mut self, api: &A) -> Result<&str> {
        let pending = self.begin_email()?;
        let outcome = api.send_email(&pending.request).await;
        self.complete_email(pending.ticket, outcome)
    }

    pub async fn refresh_capabilities<A: ComplimentApi>(&mut self, api: &A) {
        self.capabilities.refresh(api).await;
    }

    /// Navigation away: in-flight responses become stale and all input is dropped.
    pub fn leave(&mut self) {
        info!("Leaving compliment page");
        self.submission.invalidate();
        self.email.invalidate();
        self.form.reset();
        self.email_draft.reset();
    }
}
