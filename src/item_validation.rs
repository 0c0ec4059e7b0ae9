use crate::item::Item;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone)]
pub struct ItemValidationError {
    message: String,
}

impl ItemValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ItemValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ItemValidationError {}

pub fn validate_item(item: &Item) -> Result<(), ItemValidationError> {
    if item.id.trim().is_empty() {
        return Err(ItemValidationError::new(format!(
            "item '{}' requires a non-empty id",
            item.label
        )));
    }
    if item.label.trim().is_empty() {
        return Err(ItemValidationError::new(format!(
            "item {} requires a non-empty label",
            item.id
        )));
    }
    Ok(())
}

pub fn validate_item_collection(items: &[Item]) -> Result<(), ItemValidationError> {
    let mut seen_ids = HashSet::with_capacity(items.len());
    for item in items {
        if !seen_ids.insert(item.id.as_str()) {
            return Err(ItemValidationError::new(format!(
                "duplicate item id {}",
                item.id
            )));
        }
        validate_item(item)?;
    }
    Ok(())
}
