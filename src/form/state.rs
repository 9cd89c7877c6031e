use tracing::debug;

use super::choices::{Relationship, Tone};
use super::qualities::{QualityChange, QualityList};
use crate::api::ComplimentRequest;
use crate::error::ClientError;

/// A single user edit to the compliment form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    RecipientNameChanged(String),
    RelationshipSelected(Option<Relationship>),
    ContextChanged(String),
    ToneSelected(Option<Tone>),
    QualityAdded(String),
    QualityRemoved(String),
    Reset,
}

/// Result of applying a [`FormEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormChange {
    /// A field took a new value.
    Updated,
    /// The event left every field as it was.
    Unchanged,
    /// A quality add/remove that was rejected or had nothing to remove.
    Quality(QualityChange),
}

impl FormChange {
    pub fn changed(&self) -> bool {
        match self {
            FormChange::Updated => true,
            FormChange::Unchanged => false,
            FormChange::Quality(change) => change.changed(),
        }
    }
}

/// In-progress input for one compliment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    recipient_name: String,
    relationship: Option<Relationship>,
    qualities: QualityList,
    context: String,
    tone: Option<Tone>,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl FormState {
    /// Empty form with the default tone preselected.
    pub fn new() -> Self {
        Self {
            recipient_name: String::new(),
            relationship: None,
            qualities: QualityList::new(),
            context: String::new(),
            tone: Some(Tone::default()),
        }
    }

    pub fn recipient_name(&self) -> &str {
        &self.recipient_name
    }

    pub fn relationship(&self) -> Option<Relationship> {
        self.relationship
    }

    pub fn qualities(&self) -> &QualityList {
        &self.qualities
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn tone(&self) -> Option<Tone> {
        self.tone
    }

    pub fn set_recipient_name(&mut self, name: impl Into<String>) -> FormChange {
        replace(&mut self.recipient_name, name.into())
    }

    pub fn set_relationship(&mut self, relationship: Option<Relationship>) -> FormChange {
        replace(&mut self.relationship, relationship)
    }

    pub fn set_context(&mut self, context: impl Into<String>) -> FormChange {
        replace(&mut self.context, context.into())
    }

    pub fn set_tone(&mut self, tone: Option<Tone>) -> FormChange {
        replace(&mut self.tone, tone)
    }

    pub fn add_quality(&mut self, text: &str) -> FormChange {
        let change = self.qualities.add(text);
        debug!(?change, "add quality");
        if change.changed() {
            FormChange::Updated
        } else {
            FormChange::Quality(change)
        }
    }

    pub fn remove_quality(&mut self, text: &str) -> FormChange {
        let change = self.qualities.remove(text);
        debug!(?change, "remove quality");
        if change.changed() {
            FormChange::Updated
        } else {
            FormChange::Quality(change)
        }
    }

    /// Restores the freshly mounted state.
    pub fn reset(&mut self) -> FormChange {
        let fresh = FormState::new();
        if *self == fresh {
            return FormChange::Unchanged;
        }
        *self = fresh;
        FormChange::Updated
    }

    pub fn apply(&mut self, event: FormEvent) -> FormChange {
        match event {
            FormEvent::RecipientNameChanged(name) => self.set_recipient_name(name),
            FormEvent::RelationshipSelected(relationship) => self.set_relationship(relationship),
            FormEvent::ContextChanged(context) => self.set_context(context),
            FormEvent::ToneSelected(tone) => self.set_tone(tone),
            FormEvent::QualityAdded(text) => self.add_quality(&text),
            FormEvent::QualityRemoved(text) => self.remove_quality(&text),
            FormEvent::Reset => self.reset(),
        }
    }

    /// Requirements that are not yet met, in form order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.recipient_name.trim().is_empty() {
            missing.push("recipient name");
        }
        if self.relationship.is_none() {
            missing.push("relationship");
        }
        if self.qualities.is_empty() {
            missing.push("at least one quality");
        }
        if self.tone.is_none() {
            missing.push("tone");
        }
        missing
    }

    pub fn is_valid(&self) -> bool {
        !self.recipient_name.trim().is_empty()
            && self.relationship.is_some()
            && self.tone.is_some()
            && !self.qualities.is_empty()
    }

    /// Builds the wire request, or reports what is still missing.
    pub fn to_request(&self) -> Result<ComplimentRequest, ClientError> {
        match (self.relationship, self.tone) {
            (Some(relationship), Some(tone)) if self.is_valid() => {
                let context = self.context.trim();
                Ok(ComplimentRequest {
                    recipient_name: self.recipient_name.trim().to_string(),
                    relationship,
                    qualities: self.qualities.as_slice().to_vec(),
                    context: (!context.is_empty()).then(|| context.to_string()),
                    tone,
                })
            }
            _ => Err(ClientError::ValidationBlocked {
                missing: self.missing_fields(),
            }),
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> FormChange {
    if *slot == value {
        FormChange::Unchanged
    } else {
        *slot = value;
        FormChange::Updated
    }
}
