use crate::engine::ScheduleOverrun;
use crate::plan::Plan;
use chrono::NaiveDate;
use log::{debug, info, trace, warn};

/// What happened on one processed (non-excluded) calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayReport {
    pub date: NaiveDate,
    /// 1-based count of days that produced a task, `None` for an empty day.
    pub learning_day: Option<u32>,
    pub calendar_days_processed: u32,
    pub new_items: usize,
    pub reviews_admitted: usize,
    pub reviews_deferred: usize,
    pub deferred_to: Option<NaiveDate>,
    pub pending_reviews: usize,
    pub next_review_due: Option<NaiveDate>,
    pub items_remaining: usize,
}

/// Receives progress from the scheduler. Every method defaults to doing
/// nothing.
pub trait ScheduleObserver {
    fn on_day(&mut self, _report: &DayReport) {}

    fn on_excluded_day(&mut self, _date: NaiveDate) {}

    fn on_complete(&mut self, _plan: &Plan, _days_processed: u32) {}

    fn on_overrun(&mut self, _overrun: &ScheduleOverrun) {}
}

pub struct NoopObserver;

impl ScheduleObserver for NoopObserver {}

/// Forwards scheduler progress to the `log` facade.
#[derive(Debug, Default)]
pub struct LogObserver;

impl ScheduleObserver for LogObserver {
    fn on_day(&mut self, report: &DayReport) {
        if report.learning_day.is_none() {
            trace!("event=day_empty date={}", report.date);
            return;
        }
        debug!(
            "event=day date={} new={} reviews={} deferred={} pending={} remaining_items={}",
            report.date,
            report.new_items,
            report.reviews_admitted,
            report.reviews_deferred,
            report.pending_reviews,
            report.items_remaining
        );
    }

    fn on_excluded_day(&mut self, date: NaiveDate) {
        trace!("event=day_excluded date={date}");
    }

    fn on_complete(&mut self, plan: &Plan, days_processed: u32) {
        let summary = plan.summary();
        info!(
            "event=plan_complete calendar_days={} {}",
            days_processed,
            summary.to_cli_summary()
        );
    }

    fn on_overrun(&mut self, overrun: &ScheduleOverrun) {
        warn!(
            "event=plan_overrun calendar_days={} unresolved_reviews={} unassigned_items={}",
            overrun.days_processed, overrun.unresolved_reviews, overrun.unassigned_items
        );
    }
}
