use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Who the compliment is for, relative to the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    Friend,
    Family,
    Partner,
    Child,
    Student,
    Colleague,
    Mentor,
    Neighbor,
}

impl Relationship {
    pub const ALL: [Relationship; 8] = [
        Relationship::Friend,
        Relationship::Family,
        Relationship::Partner,
        Relationship::Child,
        Relationship::Student,
        Relationship::Colleague,
        Relationship::Mentor,
        Relationship::Neighbor,
    ];

    /// Value sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::Friend => "friend",
            Relationship::Family => "family",
            Relationship::Partner => "partner",
            Relationship::Child => "child",
            Relationship::Student => "student",
            Relationship::Colleague => "colleague",
            Relationship::Mentor => "mentor",
            Relationship::Neighbor => "neighbor",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Relationship {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Relationship::ALL
            .into_iter()
            .find(|r| r.as_str() == wanted)
            .ok_or_else(|| UnknownChoice::new("relationship", s, Relationship::ALL.iter().map(|r| r.as_str())))
    }
}

/// Voice the generated compliment should use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Warm,
    Encouraging,
    Celebratory,
    Playful,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Tone::Warm, Tone::Encouraging, Tone::Celebratory, Tone::Playful];

    /// Value sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Warm => "warm",
            Tone::Encouraging => "encouraging",
            Tone::Celebratory => "celebratory",
            Tone::Playful => "playful",
        }
    }

    /// Label shown in selectors.
    pub fn label(&self) -> &'static str {
        match self {
            Tone::Warm => "Warm",
            Tone::Encouraging => "Encouraging",
            Tone::Celebratory => "Celebratory",
            Tone::Playful => "Playful",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Tone::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| UnknownChoice::new("tone", s, Tone::ALL.iter().map(|t| t.as_str())))
    }
}

/// A selector value outside the closed list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {field} '{given}', expected one of: {expected}")]
pub struct UnknownChoice {
    pub field: &'static str,
    pub given: String,
    pub expected: String,
}

impl UnknownChoice {
    fn new<'a>(field: &'static str, given: &str, options: impl Iterator<Item = &'a str>) -> Self {
        Self {
            field,
            given: given.to_string(),
            expected: options.collect::<Vec<_>>().join(", "),
        }
    }
}
