/// What happened to the quality list after an add or remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityChange {
    Added,
    Removed,
    /// The text was blank after trimming.
    RejectedEmpty,
    /// The trimmed text is already in the list.
    RejectedDuplicate,
    /// Remove was asked for a quality that is not in the list.
    NotPresent,
}

impl QualityChange {
    /// Whether the list was modified.
    pub fn changed(&self) -> bool {
        matches!(self, QualityChange::Added | QualityChange::Removed)
    }
}

/// Ordered, deduplicated list of free-text quality tags.
///
/// Entries are trimmed on insert and compared case-sensitively, so
/// "Kind" and "kind" are distinct tags while " kind " and "kind" are not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualityList {
    items: Vec<String>,
}

impl QualityList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, text: &str) -> QualityChange {
        let quality = text.trim();
        if quality.is_empty() {
            return QualityChange::RejectedEmpty;
        }
        if self.contains(quality) {
            return QualityChange::RejectedDuplicate;
        }
        self.items.push(quality.to_string());
        QualityChange::Added
    }

    pub fn remove(&mut self, text: &str) -> QualityChange {
        let quality = text.trim();
        match self.items.iter().position(|q| q == quality) {
            Some(index) => {
                self.items.remove(index);
                QualityChange::Removed
            }
            None => QualityChange::NotPresent,
        }
    }

    pub fn contains(&self, quality: &str) -> bool {
        self.items.iter().any(|q| q == quality)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }
}
