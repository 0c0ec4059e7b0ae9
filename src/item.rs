use serde::{Deserialize, Serialize};

/// A vocabulary entry. The scheduler only ever references items, it never
/// changes them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    /// The word or term being learned.
    pub label: String,
    /// Meaning, translation or any other text shown alongside the label.
    pub detail: String,
}

impl Item {
    pub fn new(id: impl Into<String>, label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            detail: detail.into(),
        }
    }

    /// `label(detail)`, the form used in exported summaries.
    pub fn display_with_detail(&self) -> String {
        format!("{}({})", self.label, self.detail)
    }
}
