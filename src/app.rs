use std::collections::HashMap;
use std::time::Duration;

use clap::{error::ErrorKind, CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::catalog::binary;
use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::controller::{CatalogController, LoadState, PageRequest, ReloadOutcome};
use crate::engine::query::{SortSpec, DEFAULT_PAGE_SIZE};
use crate::engine::tier::{CategoryTier, Thresholds, DEFAULT_THRESHOLDS};
use crate::output::report::Theme;
use crate::output::{self, MoneyFormat, OutputFormat, Snapshot};
use crate::source::{DatasetSource, Fetcher, DEFAULT_SOURCE};

fn render_custom_help() -> String {
    let cmd = CliArgs::command();
    let mut out = String::new();

    out.push_str(cmd.get_name());
    if let Some(version) = cmd.get_version() {
        out.push(' ');
        out.push_str(version);
    }
    out.push('\n');
    if let Some(long_about) = cmd.get_long_about().or(cmd.get_about()) {
        out.push_str(&long_about.to_string());
        out.push('\n');
    }
    out.push_str("\nUsage: ");
    out.push_str(cmd.get_name());
    out.push_str(" [OPTIONS]\n\n");

    let mut sections: Vec<(String, Vec<&clap::Arg>)> = Vec::new();
    let mut section_idx: HashMap<String, usize> = HashMap::new();
    for arg in cmd.get_arguments() {
        if arg.is_hide_set() {
            continue;
        }
        let heading = arg.get_help_heading().unwrap_or("Options").to_string();
        let idx = *section_idx.entry(heading.clone()).or_insert_with(|| {
            sections.push((heading, Vec::new()));
            sections.len() - 1
        });
        sections[idx].1.push(arg);
    }

    for (heading, args) in sections {
        out.push_str(&heading);
        out.push_str(":\n");
        for arg in args {
            let mut parts: Vec<String> = Vec::new();
            if let Some(short) = arg.get_short() {
                parts.push(format!("-{short}"));
            }
            if let Some(long) = arg.get_long() {
                parts.push(format!("--{long}"));
            }
            let mut flags = parts.join(", ");
            if arg.get_action().takes_values() {
                let value_name = arg
                    .get_value_names()
                    .and_then(|names| names.first())
                    .map(|name| name.as_str())
                    .unwrap_or("VALUE");
                flags.push_str(&format!(" <{value_name}>"));
            }
            out.push_str(&format!("  {:<32}", flags));
            if let Some(help) = arg.get_help() {
                out.push_str(help.to_string().trim());
            }
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

#[derive(Clone, Debug)]
struct RunConfig {
    source: DatasetSource,
    timeout: u64,
    thresholds: Thresholds,
    search: Option<String>,
    categories: Option<Vec<CategoryTier>>,
    min_cost: Option<f64>,
    max_cost: Option<f64>,
    sort: SortSpec,
    page: Option<i64>,
    page_size: usize,
    output: Option<String>,
    output_format: OutputFormat,
    theme: Theme,
    money: MoneyFormat,
    export_dat: Option<String>,
    interactive: bool,
    no_color: bool,
    verbose: u8,
    quiet: bool,
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let source_raw = args
        .source
        .or(cfg.source)
        .unwrap_or_else(|| DEFAULT_SOURCE.to_string());
    if source_raw.trim().is_empty() {
        return Err("invalid source, expected a file path or URL".to_string());
    }
    let source = DatasetSource::parse(&source_raw);
    let timeout = args.timeout.or(cfg.timeout).unwrap_or(10);

    let econ = args
        .econ_threshold
        .or(cfg.econ_threshold)
        .unwrap_or(DEFAULT_THRESHOLDS.economy);
    let prem = args
        .prem_threshold
        .or(cfg.prem_threshold)
        .unwrap_or(DEFAULT_THRESHOLDS.premium);
    let thresholds =
        Thresholds::new(econ, prem).map_err(|e| format!("invalid tier thresholds: {e}"))?;

    let categories = match args.categories.or(cfg.categories) {
        Some(raw) => Some(
            crate::utils::parse_tier_csv(&raw)
                .map_err(|e| format!("invalid categories '{raw}': {e}"))?
                .into_iter()
                .collect(),
        ),
        None => None,
    };

    let sort_raw = args
        .sort
        .or(cfg.sort)
        .unwrap_or_else(|| "name-asc".to_string());
    let sort = SortSpec::parse(&sort_raw).map_err(|e| format!("invalid sort '{sort_raw}': {e}"))?;

    let page_size = args.page_size.or(cfg.page_size).unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        return Err("invalid page_size, expected positive integer".to_string());
    }

    let output = args.output.or(cfg.output);
    let output_format = match args.output_format.or(cfg.output_format) {
        Some(raw) => OutputFormat::parse(&raw)
            .ok_or_else(|| format!("invalid output format '{raw}', expected text, json or html"))?,
        None => output
            .as_deref()
            .and_then(output::infer_format_from_path)
            .unwrap_or(OutputFormat::Text),
    };

    let theme = match args.theme.or(cfg.theme) {
        Some(raw) => Theme::parse(&raw)
            .ok_or_else(|| format!("invalid theme '{raw}', expected light or dark"))?,
        None => Theme::default(),
    };

    let mut money = MoneyFormat::default();
    if let Some(symbol) = args.currency_symbol.or(cfg.currency_symbol) {
        money.symbol = symbol;
    }

    let no_color = args.no_color || cfg.no_color.unwrap_or(false);

    Ok(RunConfig {
        source,
        timeout,
        thresholds,
        search: args.search,
        categories,
        min_cost: args.min_cost,
        max_cost: args.max_cost,
        sort,
        page: args.page,
        page_size,
        output,
        output_format,
        theme,
        money,
        export_dat: args.export_dat,
        interactive: args.interactive,
        no_color,
        verbose: args.verbose,
        quiet: args.quiet,
    })
}

/// Controller with the query flags applied, before any data arrives.
fn prepare_controller(run: &RunConfig) -> CatalogController {
    let mut controller = CatalogController::new(run.thresholds);
    controller.set_page_size(run.page_size);
    if let Some(text) = run.search.as_deref() {
        controller.set_search_text(text);
    }
    if let Some(tiers) = run.categories.clone() {
        controller.set_category_selection(tiers);
    }
    controller.set_min_cost(run.min_cost);
    controller.set_max_cost(run.max_cost);
    controller.set_sort(run.sort);
    controller
}

fn render(controller: &CatalogController, run: &RunConfig) -> Vec<u8> {
    match run.output_format {
        OutputFormat::Text => output::render_text(controller, &run.money).into_bytes(),
        OutputFormat::Json => output::render_json(&Snapshot::capture(controller, &run.money)),
        OutputFormat::Html => output::render_html(
            &Snapshot::capture(controller, &run.money),
            run.theme,
            &run.money,
        ),
    }
}

async fn write_file(path: &str, bytes: &[u8]) -> Result<(), String> {
    let path = config::expand_tilde(path);
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
        .await
        .map_err(|e| format!("failed to open output file '{}': {e}", path.display()))?;
    file.write_all(bytes)
        .await
        .map_err(|e| format!("failed to write output file '{}': {e}", path.display()))
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    let fetcher = Fetcher::new(run.source.clone(), run.timeout).map_err(|e| e.to_string())?;
    let mut controller = prepare_controller(&run);

    if run.interactive {
        crate::session::run(controller, fetcher, run.money.clone()).await;
        return Ok(());
    }

    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.blue} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(format!("loading {}", run.source.describe()));

    let ticket = controller.begin_reload();
    let result = fetcher.fetch().await;
    pb.finish_and_clear();
    let outcome = controller.complete_reload(ticket, result);
    debug!(?outcome, "initial load");

    // navigating would dismiss a load error before it is rendered
    if let Some(page) = run.page.filter(|_| outcome != ReloadOutcome::Failed) {
        controller.go_to_page(PageRequest::Absolute(page));
    }

    if let (Some(path), ReloadOutcome::Applied { count }) = (run.export_dat.as_deref(), outcome) {
        let bytes = binary::encode_records(controller.dataset())
            .map_err(|e| format!("failed to export '{path}': {e}"))?;
        write_file(path, &bytes).await?;
        info!(path, count, "catalog exported");
    }

    let rendered = render(&controller, &run);
    match run.output.as_deref() {
        Some(path) => {
            write_file(path, &rendered).await?;
            println!(":: Wrote {path}");
        }
        None => print!("{}", String::from_utf8_lossy(&rendered)),
    }

    match controller.load_state() {
        LoadState::Failed(message) => Err(format!(
            "failed to load catalog '{}': {message}",
            run.source.describe()
        )),
        _ => Ok(()),
    }
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp => {
                print!("{}", render_custom_help());
                return Ok(());
            }
            ErrorKind::DisplayVersion => {
                let cmd = CliArgs::command();
                print!("{}", cmd.render_version());
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    let user_config_path = args.config.clone().map(|p| config::expand_tilde(&p));

    if args.init_config {
        let path = user_config_path
            .or_else(config::default_config_path)
            .ok_or_else(|| "could not determine config path".to_string())?;
        if config::ensure_default_config_file(&path)? {
            println!(":: Wrote {}", path.display());
        } else {
            println!(":: Config already exists at {}", path.display());
        }
        return Ok(());
    }

    let cfg = match user_config_path.as_ref() {
        Some(path) => config::load_config(path, false)?,
        None => match config::default_config_path() {
            Some(path) => config::load_config(&path, true)?,
            None => ConfigFile::default(),
        },
    };

    let run = build_run_config(args, cfg)?;

    crate::logging::init(run.verbose, run.quiet, run.no_color);
    if run.no_color {
        colored::control::set_override(false);
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
