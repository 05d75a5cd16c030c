use std::collections::BTreeSet;

use crate::engine::tier::CategoryTier;

/// Parses a comma-separated tier list. `all` selects every tier; an empty list
/// selects none.
pub fn parse_tier_csv(value: &str) -> Result<BTreeSet<CategoryTier>, String> {
    let mut out = BTreeSet::new();
    for part in value.split(',') {
        let item = part.trim();
        if item.is_empty() {
            continue;
        }
        if item.eq_ignore_ascii_case("all") {
            out.extend(CategoryTier::ALL);
            continue;
        }
        let tier = CategoryTier::parse(item).ok_or_else(|| format!("unknown tier '{item}'"))?;
        out.insert(tier);
    }
    Ok(out)
}

/// Parses an optional cost bound as typed into a box: blank or `-` clears it.
pub fn parse_optional_cost(value: &str) -> Result<Option<f64>, String> {
    let raw = value.trim();
    if raw.is_empty() || raw == "-" {
        return Ok(None);
    }
    let v: f64 = raw
        .parse()
        .map_err(|_| format!("invalid amount '{raw}'"))?;
    if !v.is_finite() || v < 0.0 {
        return Err(format!("amount must be a non-negative number, got '{raw}'"));
    }
    Ok(Some(v))
}
