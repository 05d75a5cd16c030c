use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "coursedeck",
    version,
    about = "browse a course catalog: search, tier filters, cost ranges, sorting and paging",
    long_about = "coursedeck loads a course catalog (JSON file, cursos.dat record file or URL) and shows one page of it with dataset-wide statistics.\n\nExamples:\n  coursedeck --source cursos.json\n  coursedeck --source cursos.json -s rust --sort cost-desc --page-size 5\n  coursedeck --source https://example.com/cursos.json --categories economy,standard\n  coursedeck --source cursos.dat -I\n\nTip: Use --config to persist thresholds and defaults."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'q',
        long = "quiet",
        help_heading = "Output",
        help = "Only log errors."
    )]
    pub quiet: bool,

    #[arg(
        long = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the rendered page to a file instead of stdout."
    )]
    pub output: Option<String>,

    #[arg(
        long = "format",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format: text, json or html (inferred from --output when omitted)."
    )]
    pub output_format: Option<String>,

    #[arg(
        long = "theme",
        value_name = "THEME",
        help_heading = "Output",
        help = "HTML theme: light or dark."
    )]
    pub theme: Option<String>,

    #[arg(
        long = "currency",
        value_name = "SYMBOL",
        help_heading = "Output",
        help = "Currency symbol used when formatting costs."
    )]
    pub currency_symbol: Option<String>,

    #[arg(
        long = "export-dat",
        value_name = "FILE",
        help_heading = "Output",
        help = "Also write the loaded catalog as a cursos.dat record file."
    )]
    pub export_dat: Option<String>,

    #[arg(
        long = "source",
        visible_alias = "src",
        value_name = "PATH|URL",
        help_heading = "Input",
        help = "Catalog to load (defaults to cursos.json)."
    )]
    pub source: Option<String>,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.coursedeck/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write a default config file and exit."
    )]
    pub init_config: bool,

    #[arg(
        long = "timeout",
        value_name = "SECONDS",
        help_heading = "Input",
        help = "Timeout for catalog retrieval over HTTP."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 's',
        long = "search",
        value_name = "TEXT",
        help_heading = "Query",
        help = "Case-insensitive substring matched against names and codes."
    )]
    pub search: Option<String>,

    #[arg(
        long = "categories",
        visible_alias = "tiers",
        value_name = "LIST",
        help_heading = "Query",
        help = "Tiers to show, comma-separated (economy,standard,premium)."
    )]
    pub categories: Option<String>,

    #[arg(
        long = "min-cost",
        value_name = "AMOUNT",
        help_heading = "Query",
        help = "Lowest cost to include (inclusive)."
    )]
    pub min_cost: Option<f64>,

    #[arg(
        long = "max-cost",
        value_name = "AMOUNT",
        help_heading = "Query",
        help = "Highest cost to include (inclusive)."
    )]
    pub max_cost: Option<f64>,

    #[arg(
        long = "sort",
        value_name = "KEY-DIR",
        help_heading = "Query",
        help = "Sort order: name, cost or duration with -asc or -desc (e.g. cost-desc)."
    )]
    pub sort: Option<String>,

    #[arg(
        short = 'p',
        long = "page",
        value_name = "N",
        allow_negative_numbers = true,
        help_heading = "Query",
        help = "Page to show (out-of-range values are clamped)."
    )]
    pub page: Option<i64>,

    #[arg(
        short = 'n',
        long = "page-size",
        value_name = "N",
        help_heading = "Query",
        help = "Rows per page."
    )]
    pub page_size: Option<usize>,

    #[arg(
        long = "econ-threshold",
        value_name = "AMOUNT",
        help_heading = "Tiers",
        help = "Costs below this are Economy."
    )]
    pub econ_threshold: Option<f64>,

    #[arg(
        long = "prem-threshold",
        value_name = "AMOUNT",
        help_heading = "Tiers",
        help = "Costs from this up are Premium."
    )]
    pub prem_threshold: Option<f64>,

    #[arg(
        short = 'I',
        long = "interactive",
        help_heading = "Mode",
        help = "Read commands from stdin and redraw after each one."
    )]
    pub interactive: bool,
}
