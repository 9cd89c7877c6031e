//! State machines that drive the generation and email workflows.
//!
//! Each controller allows one request in flight. Requests are two-phase:
//! `begin` hands out a [`Ticket`], and `complete` only applies an outcome whose
//! ticket is still the active one. Anything else is a stale response and is
//! dropped.

mod capability;
mod email;
mod submission;

pub use capability::{Availability, CapabilityReporter};
pub use email::{EmailController, EmailFailure, EmailState, PendingEmail};
pub use submission::{Generated, PendingSubmission, SubmissionController, SubmissionState};

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Generation counter plus the ticket currently awaiting a response.
#[derive(Debug, Default)]
pub(crate) struct InFlight {
    generation: u64,
    active: Option<u64>,
}

impl InFlight {
    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    pub fn issue(&mut self) -> Ticket {
        self.generation += 1;
        self.active = Some(self.generation);
        Ticket(self.generation)
    }

    /// Clears the active ticket if `ticket` is it.
    pub fn settle(&mut self, ticket: Ticket) -> bool {
        if self.active == Some(ticket.0) {
            self.active = None;
            true
        } else {
            false
        }
    }

    /// Orphans whatever is in flight.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.active = None;
    }
}
