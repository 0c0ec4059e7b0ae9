pub mod calendar;
pub mod engine;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod item;
pub mod item_validation;
pub mod ledger;
pub mod observer;
pub mod persistence;
pub mod plan;
pub mod settings;
pub mod workspace;

pub use calendar::{CalendarError, StudyCalendar};
pub use engine::{
    MAX_CALENDAR_DAYS, REVIEW_OFFSETS, ScheduleError, ScheduleOverrun, SchedulerEngine, schedule,
    schedule_with_observer,
};
pub use item::Item;
pub use item_validation::ItemValidationError;
pub use ledger::{ReviewLedger, ReviewObligation};
pub use observer::{DayReport, LogObserver, NoopObserver, ScheduleObserver};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqlitePlanStore;
pub use persistence::{
    PersistenceError, PlanStore, export_items_to_csv, export_plan_overview_to_csv,
    export_plan_to_csv, export_task_details_to_csv,
    import_items_from_csv, load_plan_from_json, load_settings_from_json, save_plan_to_json,
    save_settings_to_json, validate_plan,
};
pub use plan::{DailyStat, DailyTask, Plan, PlanAssembler, PlanSummary, PlanWarning};
pub use settings::{Settings, SettingsError, SettingsInput};
pub use workspace::Workspace;
