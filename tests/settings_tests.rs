use chrono::NaiveDate;
use review_schedule::{ScheduleError, Settings, SettingsError, SettingsInput, schedule};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn input(new_cap: i64, review_cap: i64, start: &str) -> SettingsInput {
    SettingsInput {
        period: 30,
        daily_new_cap: new_cap,
        daily_review_cap: review_cap,
        start_date: start.to_string(),
        skip_excluded_days: false,
    }
}

#[test]
fn defaults_match_a_typical_learner() {
    let settings = Settings::new(d(2024, 1, 1));
    assert_eq!(settings.period, 30);
    assert_eq!(settings.daily_new_cap, 5);
    assert_eq!(settings.daily_review_cap, 10);
    assert!(!settings.skip_excluded_days);
}

#[test]
fn converts_valid_input() {
    let settings = Settings::try_from(input(3, 8, "2024-02-29")).unwrap();
    assert_eq!(settings.daily_new_cap, 3);
    assert_eq!(settings.daily_review_cap, 8);
    assert_eq!(settings.start_date, d(2024, 2, 29));
    assert_eq!(SettingsInput::from(&settings), input(3, 8, "2024-02-29"));
}

#[test]
fn negative_caps_are_rejected() {
    let err = Settings::try_from(input(-1, 8, "2024-01-01")).unwrap_err();
    assert_eq!(
        err,
        SettingsError::Negative {
            field: "daily_new_cap",
            value: -1
        }
    );
    assert!(!err.is_date_error());
    assert!(matches!(
        ScheduleError::from(err),
        ScheduleError::InvalidSettings(_)
    ));
}

#[test]
fn oversized_caps_are_rejected() {
    let err = Settings::try_from(input(3, i64::MAX, "2024-01-01")).unwrap_err();
    assert!(matches!(
        err,
        SettingsError::OutOfRange {
            field: "daily_review_cap",
            ..
        }
    ));
}

#[test]
fn bad_start_dates_become_date_errors() {
    let err = Settings::try_from(input(3, 8, "2024-02-30")).unwrap_err();
    assert!(err.is_date_error());
    assert!(matches!(ScheduleError::from(err), ScheduleError::InvalidDate(_)));
}

#[test]
fn settings_json_uses_snake_case_and_defaults_skip() {
    let json = r#"{"period":14,"daily_new_cap":2,"daily_review_cap":6,"start_date":"2024-01-01"}"#;
    let settings: Settings = serde_json::from_str(json).unwrap();
    assert_eq!(settings.period, 14);
    assert!(!settings.skip_excluded_days);

    let out = serde_json::to_value(&settings).unwrap();
    assert_eq!(out["daily_review_cap"], 6);
    assert_eq!(out["start_date"], "2024-01-01");
}

#[test]
fn set_field_updates_one_value() {
    let mut settings = Settings::new(d(2024, 1, 1));
    settings.set_field("new", "7").unwrap();
    settings.set_field("review", "12").unwrap();
    settings.set_field("start", "2024-03-01").unwrap();
    settings.set_field("skip", "on").unwrap();
    settings.set_field("period", "45").unwrap();

    assert_eq!(settings.daily_new_cap, 7);
    assert_eq!(settings.daily_review_cap, 12);
    assert_eq!(settings.start_date, d(2024, 3, 1));
    assert!(settings.skip_excluded_days);
    assert_eq!(settings.period, 45);
}

#[test]
fn set_field_leaves_settings_untouched_on_error() {
    let mut settings = Settings::new(d(2024, 1, 1));
    let before = settings.clone();

    assert!(matches!(
        settings.set_field("review", "-3"),
        Err(SettingsError::Negative { .. })
    ));
    assert!(matches!(
        settings.set_field("new", "lots"),
        Err(SettingsError::Unparseable { .. })
    ));
    assert!(matches!(
        settings.set_field("start", "someday"),
        Err(SettingsError::InvalidDate(_))
    ));
    assert_eq!(
        settings.set_field("colour", "blue"),
        Err(SettingsError::UnknownField("colour".into()))
    );
    assert_eq!(settings, before);
}

#[test]
fn period_does_not_cut_the_schedule_short() {
    let mut settings = Settings::new(d(2024, 1, 1));
    settings.period = 1;
    let items = vec![review_schedule::Item::new("item-1", "a", "alpha")];
    let plan = schedule(&items, &settings).unwrap();
    assert_eq!(plan.total_review_events(), 5);
}
