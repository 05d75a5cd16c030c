pub mod report;

use std::fmt::Write as _;

use colored::Colorize;
use itertools::Itertools;
use serde::Serialize;

use crate::catalog::CourseRecord;
use crate::controller::{CatalogController, RenderRow};
use crate::engine::stats::{CostExtreme, Stats};
use crate::engine::tier::CategoryTier;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

/// Receives the engine's results. Implementations decide how they are drawn.
pub trait CatalogRenderer {
    fn render_rows(&mut self, rows: &[RenderRow<'_>]);
    fn render_empty_state(&mut self);
    fn render_page_info(&mut self, page: usize, page_count: usize, total: usize);
    fn render_kpis(&mut self, stats: &Stats);
    fn render_load_error(&mut self, message: &str);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoneyFormat {
    pub symbol: String,
    pub thousands: char,
    pub decimal: char,
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self {
            symbol: "$".to_string(),
            thousands: '.',
            decimal: ',',
        }
    }
}

/// Formats an amount with two decimals and grouped thousands (`$ 1.234,56`).
pub fn format_money(value: f64, format: &MoneyFormat) -> String {
    if !value.is_finite() {
        return format!("{} {value}", format.symbol);
    }
    let cents = (value.abs() * 100.0).round() as u128;
    let whole = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(format.thousands);
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{sign}{} {grouped}{}{frac:02}",
        format.symbol, format.decimal
    )
}

pub fn format_hours(hours: f64) -> String {
    if hours.fract() == 0.0 {
        format!("{hours:.0}")
    } else {
        format!("{hours:.2}")
    }
}

fn extreme_line(extreme: Option<&CostExtreme>, money: &MoneyFormat) -> String {
    match extreme {
        Some(e) => format!("{} ({})", format_money(e.cost, money), e.names.iter().join("; ")),
        None => "-".to_string(),
    }
}

/// Draws the catalog as a colored terminal table into an in-memory buffer.
#[derive(Debug)]
pub struct TerminalRenderer {
    money: MoneyFormat,
    out: String,
}

impl TerminalRenderer {
    pub fn new(money: MoneyFormat) -> Self {
        Self {
            money,
            out: String::new(),
        }
    }

    pub fn finish(self) -> String {
        self.out
    }
}

fn badge(tier: CategoryTier) -> String {
    let label = format!("{:<8}", tier.label());
    match tier {
        CategoryTier::Economy => label.green().to_string(),
        CategoryTier::Standard => label.yellow().to_string(),
        CategoryTier::Premium => label.magenta().bold().to_string(),
    }
}

impl CatalogRenderer for TerminalRenderer {
    fn render_rows(&mut self, rows: &[RenderRow<'_>]) {
        let _ = writeln!(
            self.out,
            "{}",
            format!(
                "{:<8} {:<40} {:>7} {:>16} {}",
                "Code", "Name", "Hours", "Cost", "Tier"
            )
            .bold()
        );
        for row in rows {
            let r = row.record;
            let _ = writeln!(
                self.out,
                "{:<8} {:<40} {:>7} {:>16} {}",
                r.code.to_string(),
                r.name,
                format_hours(r.duration_hours),
                format_money(r.cost, &self.money),
                badge(row.tier)
            );
        }
    }

    fn render_empty_state(&mut self) {
        let _ = writeln!(self.out, "{}", "No courses to show.".dimmed());
    }

    fn render_page_info(&mut self, page: usize, page_count: usize, total: usize) {
        let _ = writeln!(
            self.out,
            "\n:: {}",
            crate::engine::paginate::page_info(page, page_count, total).bold()
        );
    }

    fn render_kpis(&mut self, stats: &Stats) {
        let lines = [
            ("Courses", stats.count.to_string()),
            ("Avg hours", format!("{:.2}", stats.average_duration)),
            (
                "Most exp.",
                extreme_line(stats.max_cost.as_ref(), &self.money),
            ),
            (
                "Cheapest",
                extreme_line(stats.min_cost.as_ref(), &self.money),
            ),
            (
                "Tiers",
                format!(
                    "economy {} / standard {} / premium {}",
                    stats.tiers.economy, stats.tiers.standard, stats.tiers.premium
                ),
            ),
        ];
        for (label, value) in lines {
            let _ = writeln!(self.out, ":: {:<10}: {}", label, value.cyan());
        }
        self.out.push('\n');
    }

    fn render_load_error(&mut self, message: &str) {
        let _ = writeln!(
            self.out,
            "{} could not load the catalog: {message}",
            "[ERR]".bold().red()
        );
    }
}

pub fn render_text(controller: &CatalogController, money: &MoneyFormat) -> String {
    let mut renderer = TerminalRenderer::new(money.clone());
    controller.render(&mut renderer);
    renderer.finish()
}

#[derive(Clone, Debug, Serialize)]
pub struct SnapshotRow<'a> {
    pub code: String,
    pub name: &'a str,
    pub duration_hours: f64,
    pub cost: f64,
    pub cost_display: String,
    pub tier: CategoryTier,
}

impl<'a> SnapshotRow<'a> {
    fn new(record: &'a CourseRecord, tier: CategoryTier, money: &MoneyFormat) -> Self {
        Self {
            code: record.code.to_string(),
            name: &record.name,
            duration_hours: record.duration_hours,
            cost: record.cost,
            cost_display: format_money(record.cost, money),
            tier,
        }
    }
}

/// Page and statistics of a loaded catalog.
#[derive(Clone, Debug, Serialize)]
pub struct SnapshotView<'a> {
    pub page: usize,
    pub page_count: usize,
    pub total_filtered: usize,
    pub rows: Vec<SnapshotRow<'a>>,
    pub stats: &'a Stats,
}

/// Serializable picture of the current page, used by the JSON and HTML outputs.
/// A failed load carries only the query and the error, like the terminal page.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot<'a> {
    pub query: &'a crate::engine::query::QueryState,
    #[serde(flatten)]
    pub view: Option<SnapshotView<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
}

impl<'a> Snapshot<'a> {
    pub fn capture(controller: &'a CatalogController, money: &MoneyFormat) -> Self {
        if let crate::controller::LoadState::Failed(message) = controller.load_state() {
            return Self {
                query: controller.state(),
                view: None,
                error: Some(message.as_str()),
            };
        }
        let page = controller.page();
        Self {
            query: controller.state(),
            view: Some(SnapshotView {
                page: page.page,
                page_count: page.page_count,
                total_filtered: page.total_filtered,
                rows: page
                    .rows
                    .iter()
                    .map(|row| SnapshotRow::new(row.record, row.tier, money))
                    .collect(),
                stats: controller.stats(),
            }),
            error: None,
        }
    }
}

pub fn render_json(snapshot: &Snapshot<'_>) -> Vec<u8> {
    serde_json::to_vec_pretty(snapshot).unwrap_or_else(|_| b"{}\n".to_vec())
}

pub fn render_html(snapshot: &Snapshot<'_>, theme: report::Theme, money: &MoneyFormat) -> Vec<u8> {
    report::render_html(snapshot, theme, money)
}
