use chrono::NaiveDate;
use review_schedule::{Item, ScheduleError, Settings, Workspace};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn workspace_with(labels: &[&str]) -> Workspace {
    let mut workspace = Workspace::starting_on(d(2024, 1, 1));
    for label in labels {
        workspace.add_item(*label, format!("{label}-detail")).unwrap();
    }
    workspace
}

#[test]
fn added_items_get_sequential_ids() {
    let mut workspace = workspace_with(&["apple", "banana"]);
    let ids: Vec<&str> = workspace.items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["item-1", "item-2"]);

    assert!(workspace.remove_item("item-1"));
    let added = workspace.add_item("cherry", "red").unwrap();
    assert_eq!(added.id, "item-3");
}

#[test]
fn invalid_items_are_refused() {
    let mut workspace = workspace_with(&["apple"]);
    assert!(workspace.add_item("", "nothing").is_err());
    assert!(
        workspace
            .insert_item(Item::new("item-1", "again", "dup"))
            .is_err()
    );
    assert_eq!(workspace.items().len(), 1);
}

#[test]
fn replace_items_rejects_duplicate_ids() {
    let mut workspace = workspace_with(&["apple"]);
    let result = workspace.replace_items(vec![
        Item::new("x", "a", "1"),
        Item::new("x", "b", "2"),
    ]);
    assert!(result.is_err());
    assert_eq!(workspace.items()[0].label, "apple");
}

#[test]
fn generate_plan_stores_the_result() {
    let mut workspace = workspace_with(&["apple", "banana"]);
    let summary = workspace.generate_plan().unwrap();

    assert_eq!(summary.total_new_items, 2);
    assert_eq!(summary.total_review_events, 10);
    assert_eq!(workspace.plan_summary(), Some(summary));
    assert_eq!(workspace.plan().unwrap().source_items, workspace.items());
}

#[test]
fn edits_invalidate_the_plan() {
    let mut workspace = workspace_with(&["apple"]);
    workspace.generate_plan().unwrap();
    workspace.add_item("banana", "yellow").unwrap();
    assert!(workspace.plan().is_none());

    workspace.generate_plan().unwrap();
    workspace.set_settings_field("review", "3").unwrap();
    assert!(workspace.plan().is_none());
    assert_eq!(workspace.settings().daily_review_cap, 3);
}

#[test]
fn failed_settings_update_keeps_the_plan() {
    let mut workspace = workspace_with(&["apple"]);
    workspace.generate_plan().unwrap();
    assert!(workspace.set_settings_field("new", "-2").is_err());
    assert!(workspace.plan().is_some());
}

#[test]
fn overrun_keeps_the_partial_plan() {
    let mut workspace = workspace_with(&["apple", "banana"]);
    workspace
        .set_settings(Settings::new(d(2024, 1, 1)).with_caps(2, 0))
        .unwrap();

    let err = workspace.generate_plan().unwrap_err();
    assert!(matches!(err, ScheduleError::ScheduleOverrun(_)));
    let partial = workspace.plan().unwrap();
    assert_eq!(partial.tasks.len(), 1);
    assert_eq!(partial.total_review_events(), 0);
}

#[test]
fn restore_plan_adopts_its_inputs() {
    let mut source = workspace_with(&["apple", "banana"]);
    source.set_settings_field("new", "1").unwrap();
    source.generate_plan().unwrap();
    let plan = source.plan().unwrap().clone();

    let mut target = Workspace::starting_on(d(2025, 6, 1));
    target.restore_plan(plan.clone());
    assert_eq!(target.items(), plan.source_items.as_slice());
    assert_eq!(target.settings().daily_new_cap, 1);
    assert_eq!(target.plan(), Some(&plan));
}

#[test]
fn clear_all_resets_everything_but_the_start_date() {
    let mut workspace = workspace_with(&["apple"]);
    workspace.set_settings_field("start", "2024-05-06").unwrap();
    workspace.set_settings_field("review", "2").unwrap();
    workspace.generate_plan().unwrap();

    workspace.clear_all();
    assert!(workspace.items().is_empty());
    assert!(workspace.plan().is_none());
    assert_eq!(workspace.settings(), &Settings::new(d(2024, 5, 6)));
}
