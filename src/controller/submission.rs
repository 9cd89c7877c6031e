use tracing::{debug, info, warn};

use super::{InFlight, Ticket};
use crate::api::{ComplimentApi, ComplimentRequest, ComplimentResult};
use crate::error::{ClientError, Result};
use crate::form::FormState;

/// Where the generation workflow currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Succeeded,
    /// Carries the message shown to the user.
    Failed(String),
}

/// A compliment together with the request that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub request: ComplimentRequest,
    pub result: ComplimentResult,
}

/// A submission that has been started and awaits its response.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    pub ticket: Ticket,
    pub request: ComplimentRequest,
}

#[derive(Debug)]
pub struct SubmissionController {
    state: SubmissionState,
    in_flight: InFlight,
    request: Option<ComplimentRequest>,
    generated: Option<Generated>,
    last_error: Option<ClientError>,
}

impl Default for SubmissionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionController {
    pub fn new() -> Self {
        Self {
            state: SubmissionState::Idle,
            in_flight: InFlight::default(),
            request: None,
            generated: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_busy()
    }

    /// Whether the submit affordance should be enabled.
    pub fn can_submit(&self, form: &FormState) -> bool {
        form.is_valid() && !self.is_submitting()
    }

    /// Most recent compliment, kept until a new submission starts.
    pub fn generated(&self) -> Option<&Generated> {
        self.generated.as_ref()
    }

    pub fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }

    /// Moves to `Submitting` if the form is valid and nothing is in flight.
    pub fn begin(&mut self, form: &FormState) -> Result<PendingSubmission> {
        if self.is_submitting() {
            debug!("Submission ignored: request already in flight");
            return Err(ClientError::Busy);
        }
        let request = form.to_request()?;

        let ticket = self.in_flight.issue();
        info!("Submission {} started", ticket.generation());
        self.state = SubmissionState::Submitting;
        self.request = Some(request.clone());
        self.generated = None;
        self.last_error = None;
        Ok(PendingSubmission { ticket, request })
    }

    /// Applies the outcome of the request identified by `ticket`.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: Result<ComplimentResult>,
    ) -> Result<&Generated> {
        if !self.in_flight.settle(ticket) {
            debug!("Discarding stale generation response {}", ticket.generation());
            return Err(ClientError::StaleResponse);
        }
        let request = self.request.take();

        match (outcome, request) {
            (Ok(result), Some(request)) => {
                info!("Submission {} succeeded", ticket.generation());
                self.state = SubmissionState::Succeeded;
                Ok(self.generated.insert(Generated { request, result }))
            }
            (Ok(_), None) => {
                // Unreachable while `begin` is the only issuer of tickets.
                let err = ClientError::UnexpectedResponse("response without a pending request".into());
                self.fail(ticket, err.clone());
                Err(err)
            }
            (Err(err), _) => {
                self.fail(ticket, err.clone());
                Err(err)
            }
        }
    }

    fn fail(&mut self, ticket: Ticket, err: ClientError) {
        warn!("Submission {} failed: {}", ticket.generation(), err);
        self.state = SubmissionState::Failed(err.user_message());
        self.last_error = Some(err);
    }

    /// Any edit after a finished attempt returns the controller to `Idle`.
    pub fn on_form_edited(&mut self) {
        if matches!(self.state, SubmissionState::Succeeded | SubmissionState::Failed(_)) {
            self.state = SubmissionState::Idle;
            self.last_error = None;
        }
    }

    /// Forgets everything, including any in-flight request.
    pub fn invalidate(&mut self) {
        if self.in_flight.is_busy() {
            debug!("Orphaning in-flight submission");
        }
        self.in_flight.invalidate();
        self.state = SubmissionState::Idle;
        self.request = None;
        self.generated = None;
        self.last_error = None;
    }

    /// Runs a whole submission: begin, await the backend, complete.
    pub async fn submit<A: ComplimentApi>(&mut self, api: &A, form: &FormState) -> Result<&Generated> {
        let pending = self.begin(form)?;
        let outcome = api.generate_compliment(&pending.request).await;
        self.complete(pending.ticket, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::fake::FakeApi;
    use crate::form::Relationship;

    fn valid_form() -> FormState {
        let mut form = FormState::new();
        form.set_recipient_name("Alice");
        form.set_relationship(Some(Relationship::Friend));
        form.add_quality("creative");
        form.add_quality("persistent");
        form.set_context("finished a challenging project");
        form
    }

    #[test]
    fn invalid_form_never_leaves_idle() {
        let mut controller = SubmissionController::new();
        let form = FormState::new();
        assert!(!controller.can_submit(&form));
        let err = controller.begin(&form).unwrap_err();
        assert!(matches!(err, ClientError::ValidationBlocked { .. }));
        assert_eq!(controller.state(), &SubmissionState::Idle);
    }

    #[test]
    fn second_trigger_while_submitting_is_ignored() {
        let mut controller = SubmissionController::new();
        let form = valid_form();
        let pending = controller.begin(&form).unwrap();
        assert!(!controller.can_submit(&form));
        assert_eq!(controller.begin(&form).unwrap_err(), ClientError::Busy);
        assert_eq!(controller.state(), &SubmissionState::Submitting);

        controller
            .complete(pending.ticket, Ok(ComplimentResult::new("Alice, well done.")))
            .unwrap();
        assert!(controller.can_submit(&form));
    }

    #[test]
    fn success_stores_the_result() {
        let mut controller = SubmissionController::new();
        let pending = controller.begin(&valid_form()).unwrap();
        let generated = controller
            .complete(pending.ticket, Ok(ComplimentResult::new("Alice, your persistence inspires.")))
            .unwrap();
        assert_eq!(generated.request.recipient_name, "Alice");
        assert_eq!(controller.state(), &SubmissionState::Succeeded);
        assert!(controller.generated().unwrap().result.mentions("Alice"));
    }

    #[test]
    fn failure_keeps_a_user_message() {
        let mut controller = SubmissionController::new();
        let pending = controller.begin(&valid_form()).unwrap();
        let err = controller
            .complete(pending.ticket, Err(ClientError::GenerationFailed("model not loaded".into())))
            .unwrap_err();
        assert_eq!(err, ClientError::GenerationFailed("model not loaded".into()));
        assert_eq!(controller.state(), &SubmissionState::Failed("model not loaded".into()));
        assert!(controller.generated().is_none());
        assert!(!controller.is_submitting());
    }

    #[test]
    fn stale_response_after_invalidate_is_discarded() {
        let mut controller = SubmissionController::new();
        let form = valid_form();
        let stale = controller.begin(&form).unwrap();
        controller.invalidate();

        let err = controller
            .complete(stale.ticket, Ok(ComplimentResult::new("Alice, old news.")))
            .unwrap_err();
        assert_eq!(err, ClientError::StaleResponse);
        assert_eq!(controller.state(), &SubmissionState::Idle);
        assert!(controller.generated().is_none());
    }

    #[test]
    fn stale_response_does_not_clobber_a_newer_request() {
        let mut controller = SubmissionController::new();
        let form = valid_form();
        let old = controller.begin(&form).unwrap();
        controller.invalidate();
        let current = controller.begin(&form).unwrap();

        assert_eq!(
            controller.complete(old.ticket, Ok(ComplimentResult::new("stale"))).unwrap_err(),
            ClientError::StaleResponse
        );
        assert_eq!(controller.state(), &SubmissionState::Submitting);

        let generated = controller
            .complete(current.ticket, Ok(ComplimentResult::new("Alice, fresh.")))
            .unwrap();
        assert_eq!(generated.result.compliment, "Alice, fresh.");
    }

    #[test]
    fn edits_after_completion_return_to_idle() {
        let mut controller = SubmissionController::new();
        let pending = controller.begin(&valid_form()).unwrap();
        controller
            .complete(pending.ticket, Err(ClientError::ServiceUnavailable("down".into())))
            .unwrap_err();
        controller.on_form_edited();
        assert_eq!(controller.state(), &SubmissionState::Idle);

        let pending = controller.begin(&valid_form()).unwrap();
        controller.on_form_edited();
        assert_eq!(controller.state(), &SubmissionState::Submitting);
        controller
            .complete(pending.ticket, Ok(ComplimentResult::new("Alice!")))
            .unwrap();
        controller.on_form_edited();
        assert_eq!(controller.state(), &SubmissionState::Idle);
        assert!(controller.generated().is_some());
    }

    #[tokio::test]
    async fn repeated_submissions_are_independent() {
        let api = FakeApi::default();
        api.queue_generate(Ok(ComplimentResult::new("Alice, first take.")));
        api.queue_generate(Ok(ComplimentResult::new("Alice, second take.")));

        let mut controller = SubmissionController::new();
        let form = valid_form();
        let first = controller.submit(&api, &form).await.unwrap().result.clone();
        let second = controller.submit(&api, &form).await.unwrap().result.clone();

        assert_eq!(api.generate_calls.get(), 2);
        assert_ne!(first, second);
        assert_eq!(controller.generated().unwrap().result, second);
    }

    #[tokio::test]
    async fn submit_with_invalid_form_makes_no_call() {
        let api = FakeApi::default();
        let mut controller = SubmissionController::new();
        let err = controller.submit(&api, &FormState::new()).await.unwrap_err();
        assert!(matches!(err, ClientError::ValidationBlocked { .. }));
        assert_eq!(api.generate_calls.get(), 0);
    }
}
