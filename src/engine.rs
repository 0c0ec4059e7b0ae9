//! Day-by-day assignment of new items and admission of due reviews.

use crate::calendar::StudyCalendar;
use crate::item::Item;
use crate::ledger::{ReviewLedger, ReviewObligation};
use crate::observer::{DayReport, NoopObserver, ScheduleObserver};
use crate::plan::{DailyTask, Plan, PlanAssembler};
use crate::settings::{Settings, SettingsError};
use chrono::NaiveDate;
use std::fmt;

/// Days after first exposure at which an item is reviewed.
pub const REVIEW_OFFSETS: [i64; 5] = [1, 2, 4, 7, 15];

/// Hard ceiling on calendar days processed in one run, rest days included.
pub const MAX_CALENDAR_DAYS: u32 = 730;

/// Scheduling stopped at the safety bound. The plan built so far is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleOverrun {
    pub plan: Plan,
    pub days_processed: u32,
    pub unresolved_reviews: usize,
    pub unassigned_items: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleError {
    InvalidDate(SettingsError),
    InvalidSettings(SettingsError),
    ScheduleOverrun(Box<ScheduleOverrun>),
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::InvalidDate(err) => write!(f, "invalid start date: {err}"),
            ScheduleError::InvalidSettings(err) => write!(f, "invalid settings: {err}"),
            ScheduleError::ScheduleOverrun(overrun) => write!(
                f,
                "schedule did not finish within {} calendar days ({} reviews unresolved, {} items unassigned)",
                overrun.days_processed, overrun.unresolved_reviews, overrun.unassigned_items
            ),
        }
    }
}

impl std::error::Error for ScheduleError {}

impl From<SettingsError> for ScheduleError {
    fn from(value: SettingsError) -> Self {
        if value.is_date_error() {
            Self::InvalidDate(value)
        } else {
            Self::InvalidSettings(value)
        }
    }
}

impl ScheduleError {
    pub fn partial_plan(&self) -> Option<&Plan> {
        match self {
            ScheduleError::ScheduleOverrun(overrun) => Some(&overrun.plan),
            _ => None,
        }
    }

    pub fn into_partial_plan(self) -> Option<Plan> {
        match self {
            ScheduleError::ScheduleOverrun(overrun) => Some(overrun.plan),
            _ => None,
        }
    }
}

/// Build a study plan for `items` under `settings`.
pub fn schedule(items: &[Item], settings: &Settings) -> Result<Plan, ScheduleError> {
    SchedulerEngine::new(items, settings).execute(&mut NoopObserver)
}

pub fn schedule_with_observer(
    items: &[Item],
    settings: &Settings,
    observer: &mut dyn ScheduleObserver,
) -> Result<Plan, ScheduleError> {
    SchedulerEngine::new(items, settings).execute(observer)
}

pub struct SchedulerEngine<'a> {
    items: &'a [Item],
    settings: &'a Settings,
    calendar: StudyCalendar,
}

impl<'a> SchedulerEngine<'a> {
    pub fn new(items: &'a [Item], settings: &'a Settings) -> Self {
        Self {
            items,
            settings,
            calendar: settings.calendar(),
        }
    }

    pub fn execute(&self, observer: &mut dyn ScheduleObserver) -> Result<Plan, ScheduleError> {
        self.settings.validate()?;

        let assembler = PlanAssembler::new(self.settings, self.items);
        let review_cap = self.settings.daily_review_cap as usize;

        let mut item_cursor = 0usize;
        let mut ledger = ReviewLedger::new();
        let mut calendar_day = self.settings.start_date;
        let mut tasks: Vec<DailyTask> = Vec::new();
        let mut learning_days = 0u32;
        let mut days_processed = 0u32;

        loop {
            if days_processed == MAX_CALENDAR_DAYS {
                let overrun = ScheduleOverrun {
                    plan: assembler.assemble(tasks),
                    days_processed,
                    unresolved_reviews: ledger.len(),
                    unassigned_items: self.items.len() - item_cursor,
                };
                observer.on_overrun(&overrun);
                return Err(ScheduleError::ScheduleOverrun(Box::new(overrun)));
            }
            days_processed += 1;

            if !self.calendar.is_eligible(calendar_day) {
                observer.on_excluded_day(calendar_day);
                calendar_day = StudyCalendar::add_days(calendar_day, 1);
                continue;
            }

            let new_items = self.assign_new_items(&mut item_cursor, calendar_day, &mut ledger);

            let due = ledger.due_on(calendar_day);
            let (admitted, overflow) = due.split_at(due.len().min(review_cap));
            ledger.remove(admitted);

            let deferred_to = if overflow.is_empty() {
                None
            } else {
                let next = self.calendar.next_eligible(calendar_day);
                ledger.defer(overflow, next);
                Some(next)
            };

            let review_items: Vec<Item> = admitted
                .iter()
                .map(|obligation| self.items[obligation.item].clone())
                .collect();

            let produced = !new_items.is_empty() || !review_items.is_empty();
            if produced {
                learning_days += 1;
            }

            observer.on_day(&DayReport {
                date: calendar_day,
                learning_day: produced.then_some(learning_days),
                calendar_days_processed: days_processed,
                new_items: new_items.len(),
                reviews_admitted: review_items.len(),
                reviews_deferred: overflow.len(),
                deferred_to,
                pending_reviews: ledger.len(),
                next_review_due: ledger.earliest_due_date(),
                items_remaining: self.items.len() - item_cursor,
            });

            if produced {
                tasks.push(DailyTask {
                    date: calendar_day,
                    new_items,
                    review_items,
                });
            }

            if item_cursor == self.items.len() && ledger.is_empty() {
                break;
            }
            calendar_day = StudyCalendar::add_days(calendar_day, 1);
        }

        let plan = assembler.assemble(tasks);
        observer.on_complete(&plan, days_processed);
        Ok(plan)
    }

    /// Take the next batch of items and book their five reviews.
    fn assign_new_items(
        &self,
        item_cursor: &mut usize,
        day: NaiveDate,
        ledger: &mut ReviewLedger,
    ) -> Vec<Item> {
        let remaining = self.items.len() - *item_cursor;
        let start = *item_cursor;
        let end = start + (self.settings.daily_new_cap as usize).min(remaining);

        for position in start..end {
            for (offset_position, offset) in REVIEW_OFFSETS.iter().enumerate() {
                let due_date = self.calendar.due_date(day, *offset);
                ledger.enqueue(ReviewObligation::new(
                    position,
                    due_date,
                    (offset_position + 1) as u8,
                ));
            }
        }

        *item_cursor = end;
        self.items[start..end].to_vec()
    }
}
