use crate::item_validation;
use crate::{Item, Plan};
use serde_json::Error as SerdeJsonError;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(SerdeJsonError),
    Io(io::Error),
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    Csv(csv::Error),
    InvalidData(String),
    TooManyItems { limit: usize },
    NotFound,
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            #[cfg(feature = "sqlite")]
            PersistenceError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            PersistenceError::TooManyItems { limit } => {
                write!(f, "too many items, keep the list within {limit} entries")
            }
            PersistenceError::NotFound => write!(f, "no plan stored"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub trait PlanStore {
    fn save_plan(&self, plan: &Plan) -> PersistenceResult<()>;
    fn load_plan(&self) -> PersistenceResult<Option<Plan>>;

    fn require_plan(&self) -> PersistenceResult<Plan> {
        self.load_plan()?.ok_or(PersistenceError::NotFound)
    }
}

pub fn validate_items(items: &[Item]) -> PersistenceResult<()> {
    item_validation::validate_item_collection(items)
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

/// Structural checks on a plan read back from storage.
pub fn validate_plan(plan: &Plan) -> PersistenceResult<()> {
    validate_items(&plan.source_items)?;
    plan.settings
        .validate()
        .map_err(|err| PersistenceError::InvalidData(err.to_string()))?;

    let new_cap = plan.settings.daily_new_cap as usize;
    let review_cap = plan.settings.daily_review_cap as usize;
    for pair in plan.tasks.windows(2) {
        if pair[0].date >= pair[1].date {
            return Err(PersistenceError::InvalidData(format!(
                "task dates out of order: {} then {}",
                pair[0].date, pair[1].date
            )));
        }
    }
    for task in &plan.tasks {
        if task.is_empty() {
            return Err(PersistenceError::InvalidData(format!(
                "task on {} has no items",
                task.date
            )));
        }
        if task.new_items.len() > new_cap || task.review_items.len() > review_cap {
            return Err(PersistenceError::InvalidData(format!(
                "task on {} exceeds the daily caps",
                task.date
            )));
        }
    }
    Ok(())
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    MAX_IMPORT_ITEMS, export_items_to_csv, export_plan_overview_to_csv, export_plan_to_csv,
    export_task_details_to_csv, import_items_from_csv,
    import_items_from_reader, load_plan_from_json, load_settings_from_json, save_plan_to_json,
    save_settings_to_json,
};
