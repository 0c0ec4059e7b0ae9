use crate::engine::{ScheduleError, schedule_with_observer};
use crate::item::Item;
use crate::item_validation::{self, ItemValidationError};
use crate::observer::LogObserver;
use crate::plan::{Plan, PlanSummary};
use crate::settings::{Settings, SettingsError};
use chrono::NaiveDate;
use log::{info, warn};

/// A learner's vocabulary, their settings and the last plan generated from
/// them.
///
/// Any change to items or settings drops the current plan, since a plan
/// embeds the inputs it was built from.
#[derive(Debug, Clone)]
pub struct Workspace {
    items: Vec<Item>,
    settings: Settings,
    plan: Option<Plan>,
}

impl Workspace {
    pub fn new(settings: Settings) -> Self {
        Self {
            items: Vec::new(),
            settings,
            plan: None,
        }
    }

    pub fn starting_on(start_date: NaiveDate) -> Self {
        Self::new(Settings::new(start_date))
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    pub fn plan_summary(&self) -> Option<PlanSummary> {
        self.plan.as_ref().map(Plan::summary)
    }

    pub fn find_item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn next_item_id(&self) -> String {
        let next = self
            .items
            .iter()
            .filter_map(|item| item.id.strip_prefix("item-"))
            .filter_map(|n| n.parse::<usize>().ok())
            .max()
            .map(|m| m + 1)
            .unwrap_or(1);
        format!("item-{next}")
    }

    pub fn add_item(
        &mut self,
        label: impl Into<String>,
        detail: impl Into<String>,
    ) -> Result<&Item, ItemValidationError> {
        let item = Item::new(self.next_item_id(), label, detail);
        self.insert_item(item)
    }

    pub fn insert_item(&mut self, item: Item) -> Result<&Item, ItemValidationError> {
        item_validation::validate_item(&item)?;
        if self.find_item(&item.id).is_some() {
            return Err(ItemValidationError::new(format!(
                "item {} already exists",
                item.id
            )));
        }
        self.items.push(item);
        self.invalidate_plan();
        let last = self.items.len() - 1;
        Ok(&self.items[last])
    }

    pub fn remove_item(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        let removed = self.items.len() != before;
        if removed {
            self.invalidate_plan();
        }
        removed
    }

    pub fn replace_items(&mut self, items: Vec<Item>) -> Result<(), ItemValidationError> {
        item_validation::validate_item_collection(&items)?;
        self.items = items;
        self.invalidate_plan();
        Ok(())
    }

    pub fn set_settings(&mut self, settings: Settings) -> Result<(), SettingsError> {
        settings.validate()?;
        self.settings = settings;
        self.invalidate_plan();
        Ok(())
    }

    pub fn set_settings_field(&mut self, field: &str, value: &str) -> Result<(), SettingsError> {
        let mut settings = self.settings.clone();
        settings.set_field(field, value)?;
        self.set_settings(settings)
    }

    /// Install a plan produced elsewhere, e.g. loaded from disk. The
    /// workspace adopts the plan's items and settings.
    pub fn restore_plan(&mut self, plan: Plan) {
        self.items = plan.source_items.clone();
        self.settings = plan.settings.clone();
        self.plan = Some(plan);
    }

    /// Run the scheduler over the current items and settings.
    ///
    /// On an overrun the partial plan is kept so it can still be inspected
    /// or exported, and the error is returned.
    pub fn generate_plan(&mut self) -> Result<PlanSummary, ScheduleError> {
        let mut observer = LogObserver;
        let result = schedule_with_observer(&self.items, &self.settings, &mut observer);
        match result {
            Ok(plan) => {
                let summary = plan.summary();
                for warning in &summary.warnings {
                    warn!("event=plan_warning message=\"{warning}\"");
                }
                self.plan = Some(plan);
                Ok(summary)
            }
            Err(ScheduleError::ScheduleOverrun(overrun)) => {
                self.plan = Some(overrun.plan.clone());
                Err(ScheduleError::ScheduleOverrun(overrun))
            }
            Err(err) => Err(err),
        }
    }

    pub fn clear_plan(&mut self) {
        self.plan = None;
    }

    pub fn clear_all(&mut self) {
        self.items.clear();
        self.plan = None;
        self.settings = Settings::new(self.settings.start_date);
    }

    fn invalidate_plan(&mut self) {
        if self.plan.take().is_some() {
            info!("event=plan_invalidated items={}", self.items.len());
        }
    }
}
