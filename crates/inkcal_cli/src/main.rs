//! Command-line driver for the panel layout engine.
//!
//! # Responsibility
//! - Load configuration, read dumped hub payloads and print the render plan.
//! - Record the display status file after a successful run.

use chrono::{NaiveDate, Utc};
use inkcal_core::config::Config;
use inkcal_core::layout::MonospaceMeasure;
use inkcal_core::source::{fetch_all, CalendarSource, JsonFileSource};
use inkcal_core::view::{build_plan, DayContent, RenderPlan, ViewKind};
use inkcal_core::{parse_all_events, save_state, CalendarColors, WeatherInfo};
use log::info;
use std::error::Error;
use std::path::{Path, PathBuf};

const CHAR_WIDTH_PX: u32 = 8;

#[derive(Debug, Default)]
struct CliOptions {
    config: Option<PathBuf>,
    events: Option<PathBuf>,
    weather: Option<PathBuf>,
    view: Option<ViewKind>,
    selector: Option<String>,
    today: Option<NaiveDate>,
    json: bool,
    no_state: bool,
}

fn print_usage(program: &str) {
    eprintln!(
        "usage: {program} --events <events.json> [--config <config.json>] [--weather <weather.json>]\n\
         \x20      [--view two_week|week|four_day|month|agenda] [--selector <state>]\n\
         \x20      [--today YYYY-MM-DD] [--json] [--no-state]"
    );
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                if options.config.is_some() {
                    return Err(());
                }
                options.config = Some(args.next().ok_or(())?.into());
            }
            "--events" => {
                if options.events.is_some() {
                    return Err(());
                }
                options.events = Some(args.next().ok_or(())?.into());
            }
            "--weather" => {
                if options.weather.is_some() {
                    return Err(());
                }
                options.weather = Some(args.next().ok_or(())?.into());
            }
            "--view" => {
                if options.view.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                options.view = Some(ViewKind::parse_lenient(&raw).ok_or(())?);
            }
            "--selector" => {
                if options.selector.is_some() {
                    return Err(());
                }
                options.selector = Some(args.next().ok_or(())?);
            }
            "--today" => {
                if options.today.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                options.today = Some(NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| ())?);
            }
            "--json" => options.json = true,
            "--no-state" => options.no_state = true,
            _ => return Err(()),
        }
    }

    if options.events.is_none() {
        return Err(());
    }
    Ok(options)
}

/// `--view` wins; otherwise the selector state goes through normal selection.
fn resolve_view(options: &CliOptions, config: &Config) -> ViewKind {
    options
        .view
        .unwrap_or_else(|| ViewKind::select(config, options.selector.as_deref()))
}

/// Calendar ids from config, or every key of the dump when none are configured.
fn calendar_ids(config: &Config, events_path: &Path) -> Result<Vec<String>, Box<dyn Error>> {
    if !config.calendars.is_empty() {
        return Ok(config
            .calendars
            .iter()
            .map(|calendar| calendar.entity_id.clone())
            .collect());
    }
    let raw = std::fs::read_to_string(events_path)?;
    let payload: serde_json::Value = serde_json::from_str(&raw)?;
    Ok(payload
        .as_object()
        .map(|by_entity| by_entity.keys().cloned().collect())
        .unwrap_or_default())
}

fn print_summary(plan: &RenderPlan) {
    println!("view={} today={}", plan.view, plan.today);
    if let Some(header) = &plan.header_text {
        println!("header: {header}");
    }
    for row in &plan.rows {
        if let (Some(first), Some(last)) = (row.dates.first(), row.dates.last()) {
            println!("row {first}..{last}");
        }
        for (index, lane) in row.lanes.lanes.iter().enumerate() {
            for span in lane.spans() {
                println!(
                    "  lane {index} [{}..{}] {}",
                    span.start, span.end, span.event.title
                );
            }
        }
        if row.lanes.overflow_count > 0 {
            println!("  lanes +{} more", row.lanes.overflow_count);
        }
        for day in &row.days {
            let marker = if day.is_today { "*" } else { " " };
            let (labels, overflow): (Vec<String>, usize) = match &day.content {
                DayContent::Cell(cell) => (
                    cell.blocks.iter().map(|block| block.lines.join(" ")).collect(),
                    cell.overflow_count,
                ),
                DayContent::Column(column) => (
                    column
                        .blocks
                        .iter()
                        .map(|block| format!("@{} {}", block.top, block.lines.join(" ")))
                        .collect(),
                    column.overflow_count,
                ),
            };
            println!(" {marker}{} {}", day.date, labels.join(" | "));
            if overflow > 0 {
                println!("    +{overflow} more");
            }
        }
    }
    for section in &plan.agenda {
        println!("{}", section.heading);
        for entry in &section.entries {
            println!("  {}", entry.text);
        }
    }
    if plan.agenda_hidden > 0 {
        println!("{} more events not shown", plan.agenda_hidden);
    }
    if !plan.legend.is_empty() {
        let items: Vec<String> = plan
            .legend
            .iter()
            .map(|item| format!("[{}] {}", item.style.color.name(), item.style.display_name))
            .collect();
        println!("legend: {}", items.join("  "));
    }
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "inkcal".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        let config = match &options.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Err(err) = inkcal_core::init_from_config(&config.logging) {
            eprintln!("logging disabled: {err}");
        }

        let offset = config.utc_offset();
        let now = Utc::now().with_timezone(&offset);
        let today = options.today.unwrap_or_else(|| now.date_naive());
        let view = resolve_view(&options, &config);

        let events_path = options.events.clone().ok_or("missing --events")?;
        let sources: Vec<Box<dyn CalendarSource>> = calendar_ids(&config, &events_path)?
            .into_iter()
            .map(|id| Box::new(JsonFileSource::new(id, events_path.clone())) as Box<dyn CalendarSource>)
            .collect();

        let raw = fetch_all(&sources, view.fetch_range(today, &config), &config.fetch);
        let colors = CalendarColors::assign(&config.calendars);
        let events = parse_all_events(&raw, &colors, offset);

        let weather = match &options.weather {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                WeatherInfo::from_state(&serde_json::from_str(&raw)?)
            }
            None => None,
        };

        let plan = build_plan(
            view,
            today,
            &events,
            weather.as_ref(),
            &config,
            &MonospaceMeasure::new(CHAR_WIDTH_PX),
        );

        if options.json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            print_summary(&plan);
        }

        if !options.no_state {
            save_state(&config.state_file, now, None, Some(view))?;
        }
        info!(
            "event=cli_run module=cli status=ok view={} events={} overflow={}",
            view,
            events.len(),
            plan.total_overflow()
        );
        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("inkcal: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_options, resolve_view};
    use inkcal_core::config::Config;
    use inkcal_core::view::ViewKind;

    fn args(raw: &[&str]) -> impl Iterator<Item = String> {
        raw.iter()
            .map(|arg| arg.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn parses_full_option_set() {
        let options = parse_options(args(&[
            "--events", "events.json", "--view", "4-day", "--today", "2026-10-15", "--json",
        ]))
        .unwrap();
        assert_eq!(options.view, Some(ViewKind::FourDay));
        assert_eq!(options.today.unwrap().to_string(), "2026-10-15");
        assert!(options.json);
    }

    #[test]
    fn rejects_missing_events_and_duplicates() {
        assert!(parse_options(args(&["--json"])).is_err());
        assert!(parse_options(args(&["--events", "a", "--events", "b"])).is_err());
        assert!(parse_options(args(&["--events", "a", "--view", "year"])).is_err());
    }

    #[test]
    fn selector_state_picks_the_view_unless_overridden() {
        let config = Config::default();
        let options = parse_options(args(&["--events", "a", "--selector", "Agenda"])).unwrap();
        assert_eq!(options.selector.as_deref(), Some("Agenda"));
        assert_eq!(resolve_view(&options, &config), ViewKind::Agenda);

        let options = parse_options(args(&[
            "--events", "a", "--selector", "Agenda", "--view", "month",
        ]))
        .unwrap();
        assert_eq!(resolve_view(&options, &config), ViewKind::Month);

        let options = parse_options(args(&["--events", "a", "--selector", "Nonsense"])).unwrap();
        assert_eq!(resolve_view(&options, &config), config.view_selector.default_view);

        assert!(parse_options(args(&["--events", "a", "--selector", "x", "--selector", "y"])).is_err());
    }
}
