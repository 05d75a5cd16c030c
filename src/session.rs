//! Line-oriented interactive mode. Each command maps to exactly one controller
//! operation and the page is redrawn right after it; nothing is batched.

use std::io::Write;

use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::catalog::{CourseCode, CourseRecord};
use crate::controller::{CatalogController, PageRequest, ReloadOutcome, ReloadTicket};
use crate::engine::query::{SortDirection, SortKey, SortSpec};
use crate::engine::tier::CategoryTier;
use crate::output::{format_money, render_text, MoneyFormat};
use crate::source::{Fetcher, SourceError};

pub const HELP: &str = "\
commands:
  search [text]          filter by name or code (blank clears)
  cat <tier> on|off      show or hide economy / standard / premium
  cats <list>            replace the tier selection (e.g. economy,premium)
  min <amount|->         lowest cost, '-' clears
  max <amount|->         highest cost, '-' clears
  sort <key> [asc|desc]  name, cost or duration
  next | prev            move one page
  page <n>               jump to a page
  size <n>               rows per page
  reload                 fetch the catalog again
  find <code>            look a course up by code
  above <amount>         count courses costing more than an amount
  help | quit";

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Search(String),
    Category(CategoryTier, bool),
    Categories(Vec<CategoryTier>),
    MinCost(Option<f64>),
    MaxCost(Option<f64>),
    Sort(SortSpec),
    Next,
    Prev,
    Page(i64),
    PageSize(usize),
    Reload,
    Find(CourseCode),
    Above(f64),
    Redraw,
    Help,
    Quit,
}

fn parse_switch(value: &str) -> Result<bool, String> {
    match value.trim().to_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Ok(true),
        "off" | "no" | "false" | "0" => Ok(false),
        other => Err(format!("expected on or off, got '{other}'")),
    }
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((v, r)) => (v, r.trim()),
        None => (line, ""),
    };
    let command = match verb.to_lowercase().as_str() {
        "" | "stats" | "show" => Command::Redraw,
        "search" | "s" => Command::Search(rest.to_string()),
        "cat" => {
            let (tier_raw, switch_raw) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "usage: cat <tier> on|off".to_string())?;
            let tier = CategoryTier::parse(tier_raw)
                .ok_or_else(|| format!("unknown tier '{tier_raw}'"))?;
            Command::Category(tier, parse_switch(switch_raw)?)
        }
        "cats" => Command::Categories(crate::utils::parse_tier_csv(rest)?.into_iter().collect()),
        "min" => Command::MinCost(crate::utils::parse_optional_cost(rest)?),
        "max" => Command::MaxCost(crate::utils::parse_optional_cost(rest)?),
        "sort" => {
            let mut parts = rest.split_whitespace();
            let key_raw = parts.next().unwrap_or_default();
            let key =
                SortKey::parse(key_raw).ok_or_else(|| format!("unknown sort key '{key_raw}'"))?;
            let direction = match parts.next() {
                Some(d) => {
                    SortDirection::parse(d).ok_or_else(|| format!("unknown direction '{d}'"))?
                }
                None => SortDirection::Ascending,
            };
            Command::Sort(SortSpec::new(key, direction))
        }
        "next" | "n" => Command::Next,
        "prev" | "p" => Command::Prev,
        "page" => Command::Page(
            rest.parse()
                .map_err(|_| format!("invalid page '{rest}'"))?,
        ),
        "size" => Command::PageSize(
            rest.parse()
                .map_err(|_| format!("invalid page size '{rest}'"))?,
        ),
        "reload" | "r" => Command::Reload,
        "find" => {
            if rest.is_empty() {
                return Err("usage: find <code>".to_string());
            }
            Command::Find(CourseCode::parse(rest))
        }
        "above" => Command::Above(
            crate::utils::parse_optional_cost(rest)?
                .ok_or_else(|| "usage: above <amount>".to_string())?,
        ),
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(command)
}

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Redraw,
    Message(String),
    StartReload,
    Quit,
}

fn describe(record: &CourseRecord, position: usize, money: &MoneyFormat, tier: CategoryTier) -> String {
    format!(
        "found at position #{position}: {} | {} h | {} ({tier})",
        record.label(),
        crate::output::format_hours(record.duration_hours),
        format_money(record.cost, money)
    )
}

/// Applies one command to the controller.
pub fn execute(controller: &mut CatalogController, command: Command, money: &MoneyFormat) -> Effect {
    match command {
        Command::Search(text) => controller.set_search_text(&text),
        Command::Category(tier, on) => controller.set_category(tier, on),
        Command::Categories(tiers) => controller.set_category_selection(tiers),
        Command::MinCost(v) => controller.set_min_cost(v),
        Command::MaxCost(v) => controller.set_max_cost(v),
        Command::Sort(spec) => controller.set_sort(spec),
        Command::Next => controller.go_to_page(PageRequest::Delta(1)),
        Command::Prev => controller.go_to_page(PageRequest::Delta(-1)),
        Command::Page(n) => controller.go_to_page(PageRequest::Absolute(n)),
        Command::PageSize(n) => controller.set_page_size(n),
        Command::Reload => return Effect::StartReload,
        Command::Find(code) => {
            return Effect::Message(match controller.find_by_code(&code) {
                Some((pos, record)) => describe(record, pos, money, controller.tier_of(record)),
                None => format!("no course with code {code}"),
            })
        }
        Command::Above(cost) => {
            return Effect::Message(format!(
                "{} course(s) cost more than {}",
                controller.count_above(cost),
                format_money(cost, money)
            ))
        }
        Command::Redraw => {}
        Command::Help => return Effect::Message(HELP.to_string()),
        Command::Quit => return Effect::Quit,
    }
    Effect::Redraw
}

fn prompt() {
    print!("{} ", ">".bold().green());
    let _ = std::io::stdout().flush();
}

fn draw(controller: &CatalogController, money: &MoneyFormat) {
    println!("{}", render_text(controller, money));
}

fn spawn_reload(
    controller: &mut CatalogController,
    fetcher: &Fetcher,
    tx: &mpsc::Sender<(ReloadTicket, Result<Vec<CourseRecord>, SourceError>)>,
) {
    let ticket = controller.begin_reload();
    debug!(ticket = ticket.sequence(), "reload started");
    let fetcher = fetcher.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = fetcher.fetch().await;
        let _ = tx.send((ticket, result)).await;
    });
}

/// Runs until `quit` or end of input. Retrievals run in the background; their
/// results are applied in between commands.
pub async fn run(mut controller: CatalogController, fetcher: Fetcher, money: MoneyFormat) {
    let (tx, mut rx) = mpsc::channel(8);
    spawn_reload(&mut controller, &fetcher, &tx);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", "type 'help' for commands".dimmed());
    prompt();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) | Err(_) => break,
                };
                match parse_command(&line) {
                    Ok(command) => match execute(&mut controller, command, &money) {
                        Effect::Redraw => draw(&controller, &money),
                        Effect::Message(message) => println!("{message}"),
                        Effect::StartReload => {
                            spawn_reload(&mut controller, &fetcher, &tx);
                            println!("{}", "reloading...".dimmed());
                        }
                        Effect::Quit => break,
                    },
                    Err(e) => println!("{} {e}", "[ERR]".bold().red()),
                }
                prompt();
            }
            Some((ticket, result)) = rx.recv() => {
                let outcome = controller.complete_reload(ticket, result);
                info!(ticket = ticket.sequence(), ?outcome, "reload finished");
                if outcome != ReloadOutcome::Stale {
                    println!();
                    draw(&controller, &money);
                    prompt();
                }
            }
        }
    }
    debug!("session ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> CatalogController {
        let mut c = CatalogController::default();
        c.load_dataset(
            (1..=25i64)
                .map(|i| CourseRecord::new(i, &format!("Course {i}"), 10.0, (i * 3000) as f64))
                .collect(),
        );
        c
    }

    #[test]
    fn parses_every_command() {
        assert_eq!(
            parse_command("search  rust  basics ").unwrap(),
            Command::Search("rust  basics".to_string())
        );
        assert_eq!(parse_command("search").unwrap(), Command::Search(String::new()));
        assert_eq!(
            parse_command("cat premium off").unwrap(),
            Command::Category(CategoryTier::Premium, false)
        );
        assert_eq!(
            parse_command("cats econ,std").unwrap(),
            Command::Categories(vec![CategoryTier::Economy, CategoryTier::Standard])
        );
        assert_eq!(parse_command("min 100").unwrap(), Command::MinCost(Some(100.0)));
        assert_eq!(parse_command("max -").unwrap(), Command::MaxCost(None));
        assert_eq!(
            parse_command("sort cost desc").unwrap(),
            Command::Sort(SortSpec::new(SortKey::Cost, SortDirection::Descending))
        );
        assert_eq!(parse_command("NEXT").unwrap(), Command::Next);
        assert_eq!(parse_command("prev").unwrap(), Command::Prev);
        assert_eq!(parse_command("page -2").unwrap(), Command::Page(-2));
        assert_eq!(parse_command("size 5").unwrap(), Command::PageSize(5));
        assert_eq!(parse_command("reload").unwrap(), Command::Reload);
        assert_eq!(parse_command("find 12").unwrap(), Command::Find(CourseCode::Int(12)));
        assert_eq!(parse_command("above 5000").unwrap(), Command::Above(5000.0));
        assert_eq!(parse_command("").unwrap(), Command::Redraw);
        assert_eq!(parse_command("quit").unwrap(), Command::Quit);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_command("cat gold on").is_err());
        assert!(parse_command("cat premium").is_err());
        assert!(parse_command("sort price").is_err());
        assert!(parse_command("page x").is_err());
        assert!(parse_command("above").is_err());
        assert!(parse_command("find").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn navigation_commands_move_and_clamp() {
        let money = MoneyFormat::default();
        let mut c = controller();
        assert_eq!(execute(&mut c, Command::Next, &money), Effect::Redraw);
        assert_eq!(c.state().current_page, 2);
        execute(&mut c, Command::Page(99), &money);
        assert_eq!(c.state().current_page, 3);
        execute(&mut c, Command::Search("Course 2".to_string()), &money);
        assert_eq!(c.state().current_page, 1);
        execute(&mut c, Command::Prev, &money);
        assert_eq!(c.state().current_page, 1);
    }

    #[test]
    fn lookups_report_messages() {
        let money = MoneyFormat::default();
        let mut c = controller();
        match execute(&mut c, Command::Find(CourseCode::Int(7)), &money) {
            Effect::Message(m) => {
                assert!(m.contains("position #6"));
                assert!(m.contains("[7] Course 7"));
                assert!(m.contains("Standard"));
            }
            other => panic!("unexpected effect {other:?}"),
        }
        match execute(&mut c, Command::Above(60000.0), &money) {
            Effect::Message(m) => assert!(m.starts_with("5 course(s)")),
            other => panic!("unexpected effect {other:?}"),
        }
        assert_eq!(
            execute(&mut c, Command::Reload, &money),
            Effect::StartReload
        );
        assert_eq!(execute(&mut c, Command::Quit, &money), Effect::Quit);
    }
}
