use flexi_logger::Logger;
use polars::prelude::{AnyValue, DataFrame};
use review_schedule::{
    Plan, PlanSummary, Settings, Workspace, export_items_to_csv, export_plan_overview_to_csv,
    export_plan_to_csv, export_task_details_to_csv, import_items_from_csv, load_plan_from_json,
    load_settings_from_json, save_plan_to_json, save_settings_to_json,
};
use std::io::{self, Write};

fn cell_text(av: &AnyValue) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        _ => av.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let cells: Vec<Vec<String>> = (0..df.height())
        .map(|row_idx| {
            columns
                .iter()
                .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.chars().count()).collect();
    for row in &cells {
        for (ci, s) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(s.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |values: &[String]| {
        let mut line = String::from("|");
        for (ci, s) in values.iter().enumerate() {
            let pad = widths[ci].saturating_sub(s.chars().count());
            line.push(' ');
            line.push_str(s);
            line.push_str(&" ".repeat(pad));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&col_names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  items                              List vocabulary items\n  add <label> <detail...>            Add an item (detail is the rest of the line)\n  remove <id>                        Remove an item\n  import <csv_path>                  Replace items with a CSV word list\n  settings show                      Show scheduling settings\n  settings set <field> <value>       Set period|new|review|start|skip\n  settings load <json_path>          Load settings from JSON\n  settings save <json_path>          Save settings to JSON\n  generate                           Build the study plan\n  show                               Show the current plan\n  summary                            Show plan totals and warnings\n  export <summary|details> <csv>     Export the plan to CSV\n  export overview <csv>              Export settings and plan totals\n  export items <csv>                 Export the word list\n  save <json_path>                   Save the plan to JSON\n  load <json_path>                   Load a plan from JSON\n  clear <plan|all>                   Drop the plan, or everything\n  quit|exit                          Exit"
    );
}

fn print_items(workspace: &Workspace) {
    if workspace.items().is_empty() {
        println!("No items.");
        return;
    }
    for item in workspace.items() {
        println!("  {:<10} {}", item.id, item.display_with_detail());
    }
    println!("{} item(s)", workspace.items().len());
}

fn print_settings(settings: &Settings) {
    println!("Study period       : {} days", settings.period);
    println!("New items per day  : {}", settings.daily_new_cap);
    println!("Reviews per day    : {}", settings.daily_review_cap);
    println!("Start date         : {}", settings.start_date);
    println!("Skip weekends      : {}", settings.skip_excluded_days);
}

fn print_summary(summary: &PlanSummary) {
    println!("Study days         : {}", summary.total_days);
    println!("New items          : {}", summary.total_new_items);
    println!("Review events      : {}", summary.total_review_events);
    println!("Average daily load : {:.1}", summary.average_daily_load);
    if let (Some(first), Some(last)) = (summary.first_date, summary.last_date) {
        println!("Date range         : {first} .. {last} ({} days)", summary.span_days);
        println!("Open study days    : {}", summary.study_days_in_span);
    }
    for warning in &summary.warnings {
        println!("Warning            : {warning}");
    }
}

fn print_plan(plan: &Plan) {
    match plan.to_dataframe() {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Error rendering plan: {}", e),
    }
}

fn run_settings_command<'a>(workspace: &mut Workspace, mut parts: impl Iterator<Item = &'a str>) {
    match parts.next() {
        Some("show") | None => print_settings(workspace.settings()),
        Some("set") => match (parts.next(), parts.next()) {
            (Some(field), Some(value)) => match workspace.set_settings_field(field, value) {
                Ok(()) => print_settings(workspace.settings()),
                Err(e) => println!("Error: {}", e),
            },
            _ => println!("Usage: settings set <field> <value>"),
        },
        Some("load") => match parts.next() {
            Some(path) => {
                let result = load_settings_from_json(path)
                    .map_err(|e| e.to_string())
                    .and_then(|settings| {
                        workspace.set_settings(settings).map_err(|e| e.to_string())
                    });
                match result {
                    Ok(()) => print_settings(workspace.settings()),
                    Err(e) => println!("Load error: {}", e),
                }
            }
            None => println!("Usage: settings load <json_path>"),
        },
        Some("save") => match parts.next() {
            Some(path) => match save_settings_to_json(workspace.settings(), path) {
                Ok(()) => println!("Settings saved to {path}"),
                Err(e) => println!("Save error: {}", e),
            },
            None => println!("Usage: settings save <json_path>"),
        },
        Some(other) => println!("Unknown settings command: {other}"),
    }
}

fn main() {
    let _logger = match Logger::try_with_env_or_str("info").and_then(|l| l.log_to_stderr().start()) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("logging disabled: {e}");
            None
        }
    };

    let mut workspace = Workspace::starting_on(chrono::Local::now().date_naive());

    println!("Review Schedule (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "items" => print_items(&workspace),
            "add" => {
                let label = parts.next();
                let detail = parts.collect::<Vec<_>>().join(" ");
                match label {
                    Some(label) if !detail.is_empty() => match workspace.add_item(label, detail) {
                        Ok(item) => println!("Added {} {}", item.id, item.display_with_detail()),
                        Err(e) => println!("Error: {}", e),
                    },
                    _ => println!("Usage: add <label> <detail...>"),
                }
            }
            "remove" => match parts.next() {
                Some(id) => {
                    if workspace.remove_item(id) {
                        println!("Removed {id}.");
                    } else {
                        println!("Item {id} not found.");
                    }
                }
                None => println!("Usage: remove <id>"),
            },
            "import" => match parts.next() {
                Some(path) => {
                    let result = import_items_from_csv(path)
                        .map_err(|e| e.to_string())
                        .and_then(|items| workspace.replace_items(items).map_err(|e| e.to_string()));
                    match result {
                        Ok(()) => println!("Imported {} item(s).", workspace.items().len()),
                        Err(e) => println!("Import error: {}", e),
                    }
                }
                None => println!("Usage: import <csv_path>"),
            },
            "settings" => run_settings_command(&mut workspace, parts),
            "generate" => match workspace.generate_plan() {
                Ok(summary) => println!("Generated ({})", summary.to_cli_summary()),
                Err(e) => {
                    println!("Schedule error: {}", e);
                    if let Some(plan) = e.partial_plan() {
                        println!("Partial plan kept ({})", plan.summary().to_cli_summary());
                    }
                }
            },
            "show" => match workspace.plan() {
                Some(plan) => print_plan(plan),
                None => println!("No plan. Run 'generate' first."),
            },
            "summary" => match workspace.plan_summary() {
                Some(summary) => print_summary(&summary),
                None => println!("No plan. Run 'generate' first."),
            },
            "export" => {
                let kind = parts.next();
                let path = parts.next();
                let result = match (kind, path, workspace.plan()) {
                    (Some("items"), Some(path), _) => {
                        Some(export_items_to_csv(workspace.items(), path))
                    }
                    (Some("summary" | "details" | "overview"), Some(_), None) => {
                        println!("No plan. Run 'generate' first.");
                        None
                    }
                    (Some("summary"), Some(path), Some(plan)) => {
                        Some(export_plan_to_csv(plan, path))
                    }
                    (Some("details"), Some(path), Some(plan)) => {
                        Some(export_task_details_to_csv(plan, path))
                    }
                    (Some("overview"), Some(path), Some(plan)) => {
                        Some(export_plan_overview_to_csv(plan, path))
                    }
                    _ => {
                        println!("Usage: export <summary|details|overview|items> <csv_path>");
                        None
                    }
                };
                if let (Some(result), Some(kind), Some(path)) = (result, kind, path) {
                    match result {
                        Ok(()) => println!("Exported {kind} to {path}"),
                        Err(e) => println!("Export error: {}", e),
                    }
                }
            }
            "save" => match (parts.next(), workspace.plan()) {
                (Some(_), None) => println!("No plan. Run 'generate' first."),
                (Some(path), Some(plan)) => match save_plan_to_json(plan, path) {
                    Ok(()) => println!("Plan saved to {path}"),
                    Err(e) => println!("Save error: {}", e),
                },
                (None, _) => println!("Usage: save <json_path>"),
            },
            "load" => match parts.next() {
                Some(path) => match load_plan_from_json(path) {
                    Ok(plan) => {
                        workspace.restore_plan(plan);
                        println!("Plan loaded from {path}");
                    }
                    Err(e) => println!("Load error: {}", e),
                },
                None => println!("Usage: load <json_path>"),
            },
            "clear" => match parts.next() {
                Some("plan") => {
                    workspace.clear_plan();
                    println!("Plan cleared.");
                }
                Some("all") => {
                    workspace.clear_all();
                    println!("Items, settings and plan cleared.");
                }
                _ => println!("Usage: clear <plan|all>"),
            },
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
