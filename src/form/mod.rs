//! Local form state: the compliment input, its quality tags, and the email draft.

mod choices;
mod email;
mod qualities;
mod state;

pub use choices::{Relationship, Tone, UnknownChoice};
pub use email::{looks_like_email, EmailDraft};
pub use qualities::{QualityChange, QualityList};
pub use state::{FormChange, FormEvent, FormState};
