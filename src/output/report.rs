use super::{format_hours, format_money, MoneyFormat, Snapshot};
use crate::engine::stats::CostExtreme;
use crate::engine::tier::CategoryTier;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn badge_class(tier: CategoryTier) -> &'static str {
    match tier {
        CategoryTier::Economy => "badge econ",
        CategoryTier::Standard => "badge est",
        CategoryTier::Premium => "badge prem",
    }
}

fn extreme_html(extreme: Option<&CostExtreme>, money: &MoneyFormat) -> String {
    match extreme {
        Some(e) => format!(
            "{} <small>{}</small>",
            escape_html(&format_money(e.cost, money)),
            escape_html(&e.names.join("; "))
        ),
        None => "-".to_string(),
    }
}

fn render_body_rows(snapshot: &Snapshot<'_>) -> String {
    let view = match (&snapshot.view, snapshot.error) {
        (Some(view), _) => view,
        (None, message) => {
            return format!(
                "<tr><td colspan=\"5\">Could not load the catalog: {}</td></tr>",
                escape_html(message.unwrap_or_default())
            );
        }
    };
    if view.rows.is_empty() {
        return "<tr><td colspan=\"5\">No courses to show.</td></tr>".to_string();
    }
    let mut out = String::new();
    for row in &view.rows {
        out.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td><span class=\"{}\">{}</span></td></tr>\n",
            escape_html(&row.code),
            escape_html(row.name),
            format_hours(row.duration_hours),
            escape_html(&row.cost_display),
            badge_class(row.tier),
            row.tier.label()
        ));
    }
    out
}

/// Static page with the KPIs, the current page of courses and its page info.
pub fn render_html(snapshot: &Snapshot<'_>, theme: Theme, money: &MoneyFormat) -> Vec<u8> {
    let (count, avg, max, min, page_info) = match &snapshot.view {
        Some(view) => (
            view.stats.count.to_string(),
            format!("{:.2}", view.stats.average_duration),
            extreme_html(view.stats.max_cost.as_ref(), money),
            extreme_html(view.stats.min_cost.as_ref(), money),
            crate::engine::paginate::page_info(view.page, view.page_count, view.total_filtered),
        ),
        None => (
            "-".to_string(),
            "-".to_string(),
            "-".to_string(),
            "-".to_string(),
            String::new(),
        ),
    };

    let html = format!(
        r####"<!DOCTYPE html>
<html lang="en" data-theme="{theme}">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>Course Catalog</title>
  <style>
    :root {{ --bg: #0f172a; --fg: #e2e8f0; --card: #1e293b; --line: #334155; }}
    [data-theme="light"] {{ --bg: #f8fafc; --fg: #0f172a; --card: #ffffff; --line: #e2e8f0; }}
    body {{ background: var(--bg); color: var(--fg); font-family: Inter, sans-serif; margin: 0; padding: 2rem; }}
    .kpis {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 1rem; margin-bottom: 2rem; }}
    .kpi {{ background: var(--card); border: 1px solid var(--line); border-radius: 0.75rem; padding: 1rem; }}
    .kpi h3 {{ margin: 0 0 0.5rem; font-size: 0.75rem; text-transform: uppercase; letter-spacing: 0.1em; }}
    table {{ width: 100%; border-collapse: collapse; background: var(--card); }}
    th, td {{ padding: 0.75rem 1rem; border-bottom: 1px solid var(--line); text-align: left; }}
    .badge {{ border-radius: 9999px; padding: 0.15rem 0.6rem; font-size: 0.75rem; font-weight: 700; }}
    .econ {{ background: #16a34a33; color: #16a34a; }}
    .est {{ background: #ca8a0433; color: #ca8a04; }}
    .prem {{ background: #c026d333; color: #c026d3; }}
    #pageInfo {{ margin-top: 1rem; font-weight: 600; }}
  </style>
</head>
<body>
  <h1>Course Catalog</h1>
  <section class="kpis">
    <div class="kpi"><h3>Courses</h3><div id="kpiTotal">{count}</div></div>
    <div class="kpi"><h3>Average hours</h3><div id="kpiProm">{avg}</div></div>
    <div class="kpi"><h3>Most expensive</h3><div id="kpiMax">{max}</div></div>
    <div class="kpi"><h3>Cheapest</h3><div id="kpiMin">{min}</div></div>
  </section>
  <table>
    <thead><tr><th>Code</th><th>Name</th><th>Hours</th><th>Cost</th><th>Tier</th></tr></thead>
    <tbody id="tbody">
{rows}    </tbody>
  </table>
  <p id="pageInfo">{page_info}</p>
</body>
</html>
"####,
        theme = theme.as_str(),
        rows = render_body_rows(snapshot),
        page_info = escape_html(&page_info),
    );
    html.into_bytes()
}
