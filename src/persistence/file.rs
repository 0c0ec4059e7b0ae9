use super::{PersistenceError, PersistenceResult};
use crate::calendar::DATE_FORMAT;
use crate::settings::{Settings, SettingsInput};
use crate::{Item, Plan};
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::Path;

pub const MAX_IMPORT_ITEMS: usize = 1000;

const SNAPSHOT_VERSION: u32 = 1;
const EMPTY_CELL: &str = "-";

const LABEL_HEADERS: [&str; 5] = ["word", "vocabulary", "english", "term", "label"];
const DETAIL_HEADERS: [&str; 5] = ["meaning", "definition", "translation", "detail", "chinese"];

#[derive(Serialize, Deserialize)]
struct PlanSnapshot {
    version: u32,
    plan: Plan,
}

pub fn save_plan_to_json<P: AsRef<Path>>(plan: &Plan, path: P) -> PersistenceResult<()> {
    super::validate_plan(plan)?;
    let snapshot = PlanSnapshot {
        version: SNAPSHOT_VERSION,
        plan: plan.clone(),
    };
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_plan_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Plan> {
    let file = File::open(path)?;
    let snapshot: PlanSnapshot = serde_json::from_reader(file)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(PersistenceError::InvalidData(format!(
            "unsupported plan snapshot version {}",
            snapshot.version
        )));
    }
    super::validate_plan(&snapshot.plan)?;
    Ok(snapshot.plan)
}

pub fn save_settings_to_json<P: AsRef<Path>>(settings: &Settings, path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &SettingsInput::from(settings))?;
    Ok(())
}

pub fn load_settings_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Settings> {
    let file = File::open(path)?;
    let input: SettingsInput = serde_json::from_reader(file)?;
    Settings::try_from(input).map_err(|err| PersistenceError::InvalidData(err.to_string()))
}

pub fn import_items_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<Item>> {
    let file = File::open(path)?;
    import_items_from_reader(file)
}

/// Read a vocabulary list from CSV with a header row.
///
/// The label and detail columns are picked by header name, falling back to
/// the first two columns. Rows missing either value are skipped.
pub fn import_items_from_reader<R: io::Read>(reader: R) -> PersistenceResult<Vec<Item>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.len() < 2 {
        return Err(PersistenceError::InvalidData(
            "expected a header row with a word column and a meaning column".into(),
        ));
    }
    let (label_col, detail_col) = detect_columns(&headers);

    let mut items = Vec::new();
    for (row_idx, record) in rdr.records().enumerate() {
        let record = record?;
        let label = record.get(label_col).unwrap_or_default();
        let detail = record.get(detail_col).unwrap_or_default();
        if label.is_empty() || detail.is_empty() {
            warn!("event=import_row_skipped row={} reason=missing_value", row_idx + 2);
            continue;
        }
        if items.len() == MAX_IMPORT_ITEMS {
            return Err(PersistenceError::TooManyItems {
                limit: MAX_IMPORT_ITEMS,
            });
        }
        items.push(Item::new(format!("item-{}", row_idx + 1), label, detail));
    }

    if items.is_empty() {
        return Err(PersistenceError::InvalidData(
            "no valid items found".into(),
        ));
    }
    super::validate_items(&items)?;
    Ok(items)
}

fn detect_columns(headers: &csv::StringRecord) -> (usize, usize) {
    let normalized: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();
    let find = |keywords: &[&str], skip: Option<usize>| {
        normalized.iter().enumerate().position(|(idx, header)| {
            Some(idx) != skip && keywords.iter().any(|k| header.contains(k))
        })
    };

    let label_col = find(&LABEL_HEADERS, None).unwrap_or(0);
    let detail_col = find(&DETAIL_HEADERS, Some(label_col))
        .unwrap_or(if label_col == 1 { 0 } else { 1 });
    (label_col, detail_col)
}

#[derive(Serialize)]
struct DailySummaryRecord {
    date: String,
    new_items: String,
    review_items: String,
}

#[derive(Serialize)]
struct TaskDetailRecord<'a> {
    date: String,
    kind: &'static str,
    item_id: &'a str,
    label: &'a str,
    detail: &'a str,
}

fn render_items(items: &[Item]) -> String {
    if items.is_empty() {
        return EMPTY_CELL.to_string();
    }
    items
        .iter()
        .map(Item::display_with_detail)
        .collect::<Vec<_>>()
        .join(", ")
}

/// One row per study day: date, new items, review items.
pub fn export_plan_to_csv<P: AsRef<Path>>(plan: &Plan, path: P) -> PersistenceResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for task in &plan.tasks {
        writer.serialize(DailySummaryRecord {
            date: task.date.format(DATE_FORMAT).to_string(),
            new_items: render_items(&task.new_items),
            review_items: render_items(&task.review_items),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// One row per scheduled item occurrence.
pub fn export_task_details_to_csv<P: AsRef<Path>>(plan: &Plan, path: P) -> PersistenceResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for task in &plan.tasks {
        let date = task.date.format(DATE_FORMAT).to_string();
        let rows = task
            .new_items
            .iter()
            .map(|item| ("new", item))
            .chain(task.review_items.iter().map(|item| ("review", item)));
        for (kind, item) in rows {
            writer.serialize(TaskDetailRecord {
                date: date.clone(),
                kind,
                item_id: &item.id,
                label: &item.label,
                detail: &item.detail,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct OverviewRecord {
    field: &'static str,
    value: String,
}

/// Settings and headline totals, one `field,value` row each.
pub fn export_plan_overview_to_csv<P: AsRef<Path>>(plan: &Plan, path: P) -> PersistenceResult<()> {
    let settings = &plan.settings;
    let summary = plan.summary();
    let date_or_empty = |date: Option<chrono::NaiveDate>| {
        date.map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default()
    };

    let rows = [
        ("period", settings.period.to_string()),
        ("daily_new_cap", settings.daily_new_cap.to_string()),
        ("daily_review_cap", settings.daily_review_cap.to_string()),
        ("start_date", settings.start_date.format(DATE_FORMAT).to_string()),
        ("skip_excluded_days", settings.skip_excluded_days.to_string()),
        ("total_items", summary.total_new_items.to_string()),
        ("plan_days", summary.total_days.to_string()),
        ("total_review_events", summary.total_review_events.to_string()),
        ("average_daily_load", format!("{:.1}", summary.average_daily_load)),
        ("first_date", date_or_empty(summary.first_date)),
        ("last_date", date_or_empty(summary.last_date)),
    ];

    let mut writer = csv::Writer::from_path(path)?;
    for (field, value) in rows {
        writer.serialize(OverviewRecord { field, value })?;
    }
    writer.flush()?;
    Ok(())
}

/// The word list as `id,label,detail` rows, readable by the importer.
pub fn export_items_to_csv<P: AsRef<Path>>(items: &[Item], path: P) -> PersistenceResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for item in items {
        writer.serialize(item)?;
    }
    writer.flush()?;
    Ok(())
}
