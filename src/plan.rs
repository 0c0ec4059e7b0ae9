use crate::calendar::StudyCalendar;
use crate::engine::REVIEW_OFFSETS;
use crate::item::Item;
use crate::settings::Settings;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Work for one study day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTask {
    pub date: NaiveDate,
    pub new_items: Vec<Item>,
    pub review_items: Vec<Item>,
}

impl DailyTask {
    pub fn total(&self) -> usize {
        self.new_items.len() + self.review_items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// The result of one scheduling run. Never modified after it is returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub settings: Settings,
    pub tasks: Vec<DailyTask>,
    pub source_items: Vec<Item>,
}

pub struct PlanAssembler<'a> {
    settings: &'a Settings,
    source_items: &'a [Item],
}

impl<'a> PlanAssembler<'a> {
    pub fn new(settings: &'a Settings, source_items: &'a [Item]) -> Self {
        Self {
            settings,
            source_items,
        }
    }

    pub fn assemble(&self, tasks: Vec<DailyTask>) -> Plan {
        Plan {
            settings: self.settings.clone(),
            tasks,
            source_items: self.source_items.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub new_count: usize,
    pub review_count: usize,
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanWarning {
    /// Fewer (or more) review events than five per item. Only an aborted run
    /// leaves reviews behind.
    ReviewCountMismatch { expected: usize, actual: usize },
    /// The plan runs past the intended study period.
    ExceedsPeriod { period: u32, span_days: i64 },
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanWarning::ReviewCountMismatch { expected, actual } => write!(
                f,
                "expected {expected} review events but {actual} were scheduled"
            ),
            PlanWarning::ExceedsPeriod { period, span_days } => write!(
                f,
                "plan spans {span_days} days, longer than the {period}-day study period"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub total_days: usize,
    pub total_new_items: usize,
    pub total_review_events: usize,
    pub total_study_events: usize,
    pub average_daily_load: f64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    /// Calendar days from the first to the last task, both included.
    pub span_days: i64,
    /// Days inside the span the calendar allows study on. Equal to
    /// `span_days` unless rest days are skipped.
    pub study_days_in_span: i64,
    pub warnings: Vec<PlanWarning>,
}

impl PlanSummary {
    pub fn is_consistent(&self) -> bool {
        !self
            .warnings
            .iter()
            .any(|w| matches!(w, PlanWarning::ReviewCountMismatch { .. }))
    }

    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("days={}", self.total_days));
        parts.push(format!("new={}", self.total_new_items));
        parts.push(format!("reviews={}", self.total_review_events));
        parts.push(format!("avg_load={:.1}", self.average_daily_load));
        if let (Some(first), Some(last)) = (self.first_date, self.last_date) {
            parts.push(format!("span={first}..{last}"));
        }
        if !self.warnings.is_empty() {
            parts.push(format!("warnings={}", self.warnings.len()));
        }
        parts.join(", ")
    }
}

impl Plan {
    pub fn total_review_events(&self) -> usize {
        self.tasks.iter().map(|task| task.review_items.len()).sum()
    }

    pub fn total_new_assignments(&self) -> usize {
        self.tasks.iter().map(|task| task.new_items.len()).sum()
    }

    pub fn task_on(&self, date: NaiveDate) -> Option<&DailyTask> {
        self.tasks
            .binary_search_by_key(&date, |task| task.date)
            .ok()
            .map(|idx| &self.tasks[idx])
    }

    pub fn summary(&self) -> PlanSummary {
        let total_days = self.tasks.len();
        let total_new_items = self.source_items.len();
        let total_review_events = self.total_review_events();
        let total_study_events: usize = self.tasks.iter().map(DailyTask::total).sum();

        let average_daily_load = if total_days == 0 {
            0.0
        } else {
            (total_study_events as f64 / total_days as f64 * 10.0).round() / 10.0
        };

        let first_date = self.tasks.first().map(|task| task.date);
        let last_date = self.tasks.last().map(|task| task.date);
        let (span_days, study_days_in_span) = match (first_date, last_date) {
            (Some(first), Some(last)) => (
                StudyCalendar::day_count(first, last) + 1,
                self.settings.calendar().eligible_days_between(first, last),
            ),
            _ => (0, 0),
        };

        let mut warnings = Vec::new();
        let expected = total_new_items * REVIEW_OFFSETS.len();
        if total_review_events != expected {
            warnings.push(PlanWarning::ReviewCountMismatch {
                expected,
                actual: total_review_events,
            });
        }
        if span_days > i64::from(self.settings.period) {
            warnings.push(PlanWarning::ExceedsPeriod {
                period: self.settings.period,
                span_days,
            });
        }

        PlanSummary {
            total_days,
            total_new_items,
            total_review_events,
            total_study_events,
            average_daily_load,
            first_date,
            last_date,
            span_days,
            study_days_in_span,
            warnings,
        }
    }

    pub fn daily_stats(&self) -> Vec<DailyStat> {
        self.tasks
            .iter()
            .map(|task| DailyStat {
                date: task.date,
                new_count: task.new_items.len(),
                review_count: task.review_items.len(),
                total_count: task.total(),
            })
            .collect()
    }

    /// One row per study day, for tabular display.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let dates: Vec<i32> = self.tasks.iter().map(|t| date_to_i32(t.date)).collect();
        let new_counts: Vec<u32> = self.tasks.iter().map(|t| t.new_items.len() as u32).collect();
        let review_counts: Vec<u32> = self
            .tasks
            .iter()
            .map(|t| t.review_items.len() as u32)
            .collect();
        let new_labels: Vec<String> = self
            .tasks
            .iter()
            .map(|t| join_labels(&t.new_items))
            .collect();
        let review_labels: Vec<String> = self
            .tasks
            .iter()
            .map(|t| join_labels(&t.review_items))
            .collect();

        let columns = vec![
            Series::new(PlSmallStr::from_static("date"), dates)
                .cast(&DataType::Date)?
                .into_column(),
            Series::new(PlSmallStr::from_static("new_count"), new_counts).into_column(),
            Series::new(PlSmallStr::from_static("review_count"), review_counts).into_column(),
            Series::new(PlSmallStr::from_static("new_items"), new_labels).into_column(),
            Series::new(PlSmallStr::from_static("review_items"), review_labels).into_column(),
        ];
        DataFrame::new(columns)
    }
}

fn join_labels(items: &[Item]) -> String {
    items
        .iter()
        .map(|item| item.label.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

fn date_to_i32(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    (date - epoch).num_days() as i32
}
