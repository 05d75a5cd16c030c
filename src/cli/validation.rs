use crate::cli::args::CliArgs;

fn check_amount(flag: &str, value: Option<f64>) -> Result<(), String> {
    if let Some(v) = value {
        if !v.is_finite() || v < 0.0 {
            return Err(format!(
                "invalid {flag} '{v}', expected a non-negative number"
            ));
        }
    }
    Ok(())
}

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if args.interactive {
        for (flag, set) in [
            ("--page", args.page.is_some()),
            ("--output", args.output.is_some()),
            ("--export-dat", args.export_dat.is_some()),
        ] {
            if set {
                return Err(format!("{flag} cannot be combined with --interactive"));
            }
        }
    }
    check_amount("--min-cost", args.min_cost)?;
    check_amount("--max-cost", args.max_cost)?;
    check_amount("--econ-threshold", args.econ_threshold)?;
    check_amount("--prem-threshold", args.prem_threshold)?;
    if let Some(size) = args.page_size {
        if size == 0 {
            return Err("invalid page-size, expected positive integer".to_string());
        }
    }
    if let Some(raw) = args.sort.as_deref() {
        crate::engine::SortSpec::parse(raw).map_err(|e| format!("invalid --sort '{raw}': {e}"))?;
    }
    if let Some(raw) = args.categories.as_deref() {
        crate::utils::parse_tier_csv(raw)
            .map_err(|e| format!("invalid --categories '{raw}': {e}"))?;
    }
    if let Some(raw) = args.output_format.as_deref() {
        if crate::output::OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --format '{raw}', expected text, json or html"
            ));
        }
    }
    if let Some(raw) = args.theme.as_deref() {
        if crate::output::report::Theme::parse(raw).is_none() {
            return Err(format!("invalid --theme '{raw}', expected light or dark"));
        }
    }
    Ok(())
}
