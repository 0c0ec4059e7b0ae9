use chrono::NaiveDate;
use review_schedule::persistence::{MAX_IMPORT_ITEMS, import_items_from_reader};
use review_schedule::{
    Item, PersistenceError, Plan, Settings, export_items_to_csv, export_plan_overview_to_csv,
    export_plan_to_csv, export_task_details_to_csv,
    import_items_from_csv, load_plan_from_json, load_settings_from_json, save_plan_to_json,
    save_settings_to_json, schedule,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn build_sample_plan() -> Plan {
    let items = vec![
        Item::new("item-1", "apple", "fruit"),
        Item::new("item-2", "banana", "yellow fruit"),
        Item::new("item-3", "cherry", "small red fruit"),
    ];
    let settings = Settings::new(d(2024, 1, 1)).with_caps(2, 10);
    schedule(&items, &settings).unwrap()
}

fn read_rows(path: &std::path::Path) -> Vec<csv::StringRecord> {
    let mut rdr = csv::Reader::from_path(path).unwrap();
    rdr.records().map(|r| r.unwrap()).collect()
}

#[test]
fn import_detects_columns_by_header() {
    let data = "Meaning,Word\nfruit,apple\nyellow fruit,banana\n";
    let items = import_items_from_reader(data.as_bytes()).unwrap();

    assert_eq!(
        items,
        vec![
            Item::new("item-1", "apple", "fruit"),
            Item::new("item-2", "banana", "yellow fruit"),
        ]
    );
}

#[test]
fn import_falls_back_to_the_first_two_columns() {
    let data = "front,back,notes\nhund,dog,animal\n";
    let items = import_items_from_reader(data.as_bytes()).unwrap();
    assert_eq!(items, vec![Item::new("item-1", "hund", "dog")]);
}

#[test]
fn import_skips_incomplete_rows() {
    let data = "word,definition\napple,fruit\n,orphan meaning\nbanana,\ncherry,red\n";
    let items = import_items_from_reader(data.as_bytes()).unwrap();

    let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["item-1", "item-4"]);
    assert_eq!(items[1].label, "cherry");
}

#[test]
fn import_without_valid_rows_fails() {
    let data = "word,meaning\n,\n";
    let err = import_items_from_reader(data.as_bytes()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)));

    let err = import_items_from_reader("word\napple\n".as_bytes()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)));
}

#[test]
fn import_enforces_the_item_limit() {
    let mut data = String::from("word,meaning\n");
    for i in 0..=MAX_IMPORT_ITEMS {
        data.push_str(&format!("w{i},m{i}\n"));
    }
    let err = import_items_from_reader(data.as_bytes()).unwrap_err();
    assert!(matches!(
        err,
        PersistenceError::TooManyItems {
            limit: MAX_IMPORT_ITEMS
        }
    ));
}

#[test]
fn import_reads_from_disk() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "English,Translation").unwrap();
    writeln!(file, "cat,Katze").unwrap();
    file.flush().unwrap();

    let items = import_items_from_csv(file.path()).unwrap();
    assert_eq!(items, vec![Item::new("item-1", "cat", "Katze")]);
}

#[test]
fn summary_export_has_one_row_per_day() {
    let plan = build_sample_plan();
    let file = NamedTempFile::new().unwrap();
    export_plan_to_csv(&plan, file.path()).unwrap();

    let mut rdr = csv::Reader::from_path(file.path()).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["date", "new_items", "review_items"]
    );

    let rows = read_rows(file.path());
    assert_eq!(rows.len(), plan.tasks.len());
    assert_eq!(&rows[0][0], "2024-01-01");
    assert_eq!(&rows[0][1], "apple(fruit), banana(yellow fruit)");
    assert_eq!(&rows[0][2], "-");
    assert_eq!(&rows[1][2], "apple(fruit), banana(yellow fruit)");
}

#[test]
fn detail_export_lists_every_occurrence() {
    let plan = build_sample_plan();
    let file = NamedTempFile::new().unwrap();
    export_task_details_to_csv(&plan, file.path()).unwrap();

    let rows = read_rows(file.path());
    assert_eq!(rows.len(), 3 + 15);
    assert_eq!(
        rows[0].iter().collect::<Vec<_>>(),
        vec!["2024-01-01", "new", "item-1", "apple", "fruit"]
    );
    let reviews = rows.iter().filter(|r| &r[1] == "review").count();
    assert_eq!(reviews, 15);
}

#[test]
fn plan_json_round_trip() {
    let plan = build_sample_plan();
    let file = NamedTempFile::new().unwrap();
    save_plan_to_json(&plan, file.path()).unwrap();

    let loaded = load_plan_from_json(file.path()).unwrap();
    assert_eq!(loaded, plan);
    assert_eq!(loaded.summary(), plan.summary());
}

#[test]
fn tampered_plan_json_is_rejected() {
    let mut plan = build_sample_plan();
    plan.tasks.swap(0, 1);
    let file = NamedTempFile::new().unwrap();
    let snapshot = serde_json::json!({ "version": 1, "plan": plan });
    std::fs::write(file.path(), serde_json::to_vec(&snapshot).unwrap()).unwrap();

    let err = load_plan_from_json(file.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)));
}

#[test]
fn settings_json_round_trip() {
    let settings = Settings::new(d(2024, 9, 2))
        .with_caps(4, 12)
        .skipping_excluded_days(true);
    let file = NamedTempFile::new().unwrap();
    save_settings_to_json(&settings, file.path()).unwrap();

    assert_eq!(load_settings_from_json(file.path()).unwrap(), settings);
}

#[test]
fn invalid_settings_json_is_rejected() {
    let file = NamedTempFile::new().unwrap();
    std::fs::write(
        file.path(),
        r#"{"period":30,"daily_new_cap":-4,"daily_review_cap":10,"start_date":"2024-01-01"}"#,
    )
    .unwrap();
    let err = load_settings_from_json(file.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::InvalidData(_)));

    std::fs::write(file.path(), "not json").unwrap();
    let err = load_settings_from_json(file.path()).unwrap_err();
    assert!(matches!(err, PersistenceError::Serialization(_)));
}

#[test]
fn overview_export_lists_settings_and_totals() {
    let plan = build_sample_plan();
    let file = NamedTempFile::new().unwrap();
    export_plan_overview_to_csv(&plan, file.path()).unwrap();

    let mut rdr = csv::Reader::from_path(file.path()).unwrap();
    assert_eq!(
        rdr.headers().unwrap().iter().collect::<Vec<_>>(),
        vec!["field", "value"]
    );
    let overview: std::collections::HashMap<String, String> = read_rows(file.path())
        .iter()
        .map(|row| (row[0].to_string(), row[1].to_string()))
        .collect();

    assert_eq!(overview["period"], "30");
    assert_eq!(overview["daily_new_cap"], "2");
    assert_eq!(overview["daily_review_cap"], "10");
    assert_eq!(overview["start_date"], "2024-01-01");
    assert_eq!(overview["skip_excluded_days"], "false");
    assert_eq!(overview["total_items"], "3");
    assert_eq!(overview["plan_days"], "10");
    assert_eq!(overview["total_review_events"], "15");
    assert_eq!(overview["average_daily_load"], "1.8");
    assert_eq!(overview["last_date"], "2024-01-17");
}

#[test]
fn exported_word_list_imports_back() {
    let plan = build_sample_plan();
    let file = NamedTempFile::new().unwrap();
    export_items_to_csv(&plan.source_items, file.path()).unwrap();

    let contents = std::fs::read_to_string(file.path()).unwrap();
    assert!(contents.starts_with("id,label,detail"));

    let imported = import_items_from_csv(file.path()).unwrap();
    assert_eq!(imported, plan.source_items);
}
