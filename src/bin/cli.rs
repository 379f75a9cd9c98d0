use chrono::{Datelike, Local, NaiveDate};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;
use work_calendar::calendar::short_weekday_name;
use work_calendar::{
    CalendarCatalog, CalendarException, CatalogConfig, ConflictDetector, DateNormalizer, DayReport,
    Project, TemplateType, WorkCalendar, calendar_day_report, load_project_from_json,
    save_day_report_to_csv, summarize_days,
};

fn render_row<'s>(cells: impl Iterator<Item = &'s str>, widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (cell, width) in cells.zip(widths) {
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(width.saturating_sub(cell.chars().count())));
        line.push_str(" |");
    }
    line
}

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(ci) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(headers.iter().copied(), &widths));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(row.iter().map(String::as_str), &widths));
        out.push('\n');
    }
    out.push_str(&sep);
    out
}

fn render_report(rows: &[DayReport]) -> String {
    let table_rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.date.to_string(),
                row.weekday.clone(),
                if row.is_working { "yes" } else { "no" }.to_string(),
                format!("{}", row.hours),
                if row.is_exception { "*" } else { "" }.to_string(),
            ]
        })
        .collect();
    render_text_table(&["date", "day", "working", "hours", "exc"], &table_rows)
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  templates                          List calendar templates\n  new <template> [name...]           Create a calendar from a template\n  custom [name...]                   Create a custom 5/2 calendar\n  show                               Show the current calendar\n  day <YYYY-MM-DD>                   Working status and hours of a day\n  except <date> <working|non-working> [HH:mm HH:mm]\n                                     Add or replace an exception\n  unexcept <date>                    Remove the exception on a date\n  anchor <date>                      Pin a rotating calendar to its first on-day\n  report <start> <end> [csv_path]    Day-by-day report (optionally saved as CSV)\n  load <json_path>                   Load calendars, resources and tasks\n  use <calendar_id>                  Select a loaded calendar\n  conflicts                          Check loaded tasks against resource calendars\n  quit|exit                          Exit"
    );
}

fn print_templates(catalog: &CalendarCatalog) {
    println!("Available templates:");
    for template in catalog.all_templates() {
        println!(
            "  {:<20} {:<24} {}",
            template.template_type.as_str(),
            template.name,
            template.short_description
        );
    }
}

fn print_calendar(catalog: &CalendarCatalog, calendar: &WorkCalendar) {
    println!("Id                 : {}", calendar.id);
    println!("Name               : {}", calendar.name);
    println!("Template           : {}", calendar.template_type);
    println!("Summary            : {}", catalog.short_description(calendar));
    let exceptions = calendar
        .exceptions
        .iter()
        .map(|exc| {
            let kind = if exc.is_working() { "working" } else { "non-working" };
            format!("{} {}", exc.date, kind)
        })
        .collect::<Vec<_>>()
        .join(", ");
    println!("Exceptions         : {}", exceptions);
}

fn parse_day(normalizer: &DateNormalizer<Local>, raw: Option<&str>) -> Option<NaiveDate> {
    normalizer.calendar_day(raw?).ok()
}

fn load_config() -> CatalogConfig {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            if let Some(path) = args.next() {
                match CatalogConfig::from_json_file(&path) {
                    Ok(config) => return config,
                    Err(e) => eprintln!("Could not read config {}: {}", path, e),
                }
            }
        }
    }
    CatalogConfig::default()
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let catalog = CalendarCatalog::with_config(load_config());
    let normalizer = DateNormalizer::local();
    let mut current: Option<WorkCalendar> = catalog.base_calendar();
    let mut project = Project::default();

    println!("Work Calendar (CLI) - type 'help' for commands\n");
    if let Some(calendar) = &current {
        print_calendar(&catalog, calendar);
    }

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
            "templates" => print_templates(&catalog),
            "new" => {
                let Some(type_s) = parts.next() else {
                    println!("Usage: new <template> [name...]");
                    continue;
                };
                let template_type = match type_s.parse::<TemplateType>() {
                    Ok(ty) => ty,
                    Err(e) => {
                        println!("Error: {}", e);
                        continue;
                    }
                };
                let name = parts.collect::<Vec<_>>().join(" ");
                let name = (!name.is_empty()).then_some(name.as_str());
                match catalog.create_from_template_type(template_type, name) {
                    Some(calendar) => {
                        println!("Created calendar {}", calendar.id);
                        print_calendar(&catalog, &calendar);
                        current = Some(calendar);
                    }
                    None => println!("Template '{}' not found.", template_type),
                }
            }
            "custom" => {
                let name = parts.collect::<Vec<_>>().join(" ");
                let calendar = catalog.create_custom_calendar(&name);
                println!("Created calendar {}", calendar.id);
                print_calendar(&catalog, &calendar);
                current = Some(calendar);
            }
            "show" => match &current {
                Some(calendar) => print_calendar(&catalog, calendar),
                None => println!("No calendar selected."),
            },
            "day" => {
                let Some(calendar) = &current else {
                    println!("No calendar selected.");
                    continue;
                };
                match parse_day(&normalizer, parts.next()) {
                    Some(date) => {
                        let working = catalog.is_working_day(calendar, date);
                        println!(
                            "{} {}: {}, {}h",
                            date,
                            short_weekday_name(date.weekday()),
                            if working { "working" } else { "non-working" },
                            catalog.working_hours(calendar, date)
                        );
                    }
                    None => println!("Usage: day <YYYY-MM-DD>"),
                }
            }
            "except" => {
                let Some(calendar) = &current else {
                    println!("No calendar selected.");
                    continue;
                };
                let date = parse_day(&normalizer, parts.next());
                let kind = parts.next();
                let (start, end) = (parts.next(), parts.next());
                let exception = match (date, kind) {
                    (Some(date), Some("working")) => CalendarException::working(date),
                    (Some(date), Some("non-working")) => CalendarException::non_working(date),
                    _ => {
                        println!("Usage: except <date> <working|non-working> [HH:mm HH:mm]");
                        continue;
                    }
                };
                let exception = match (start, end) {
                    (Some(start), Some(end)) => exception.with_hours(start, end),
                    _ => exception,
                };
                let date = exception.date;
                let next = calendar.with_exception(exception);
                println!("Exception set on {}.", date);
                current = Some(next);
            }
            "unexcept" => {
                let Some(calendar) = &current else {
                    println!("No calendar selected.");
                    continue;
                };
                match parse_day(&normalizer, parts.next()) {
                    Some(date) => {
                        current = Some(calendar.without_exception(date));
                        println!("Exception removed on {}.", date);
                    }
                    None => println!("Usage: unexcept <date>"),
                }
            }
            "anchor" => {
                let Some(calendar) = &current else {
                    println!("No calendar selected.");
                    continue;
                };
                match parse_day(&normalizer, parts.next()) {
                    Some(date) => match catalog.anchor_rotation(calendar, date) {
                        Ok(next) => {
                            println!("Rotation anchored on {}.", date);
                            current = Some(next);
                        }
                        Err(e) => println!("Error: {}", e),
                    },
                    None => println!("Usage: anchor <date>"),
                }
            }
            "report" => {
                let Some(calendar) = &current else {
                    println!("No calendar selected.");
                    continue;
                };
                let start = parse_day(&normalizer, parts.next());
                let end = parse_day(&normalizer, parts.next());
                let (Some(start), Some(end)) = (start, end) else {
                    println!("Usage: report <start> <end> [csv_path]");
                    continue;
                };
                let rows = calendar_day_report(calendar, start, end);
                let summary = summarize_days(&rows);
                println!("{}", render_report(&rows));
                println!(
                    "days={}, working={}, hours={}",
                    summary.calendar_days, summary.working_days, summary.working_hours
                );
                if let Some(path) = parts.next() {
                    match save_day_report_to_csv(path, &rows) {
                        Ok(()) => println!("Report saved to {}", path),
                        Err(e) => println!("Error saving report: {}", e),
                    }
                }
            }
            "load" => match parts.next() {
                Some(path) => match load_project_from_json(path, &normalizer) {
                    Ok(loaded) => {
                        println!(
                            "Project loaded from {} ({} calendars, {} resources, {} tasks)",
                            path,
                            loaded.calendars.len(),
                            loaded.resources.len(),
                            loaded.tasks.len()
                        );
                        project = loaded;
                    }
                    Err(e) => println!("Error loading project: {}", e),
                },
                None => println!("Usage: load <json_path>"),
            },
            "use" => match parts.next().and_then(|id| project.calendar(id)) {
                Some(calendar) => {
                    current = Some(calendar.clone());
                    print_calendar(&catalog, calendar);
                }
                None => println!("Calendar not found."),
            },
            "conflicts" => {
                let detector = ConflictDetector::new(&catalog);
                let results =
                    detector.check_tasks(&project.tasks, &project.resources, &project.calendars);
                let mut any = false;
                for (task_id, result) in results.iter().filter(|(_, r)| r.has_conflict) {
                    any = true;
                    for res in &result.conflicting_resources {
                        println!(
                            "Task {}: {} ({}) - {}",
                            task_id, res.resource_name, res.calendar_name, res.reason
                        );
                    }
                }
                if !any {
                    println!("No conflicts.");
                }
            }
            other => println!("Unknown command '{}'. Type 'help'.", other),
        }
    }
}
