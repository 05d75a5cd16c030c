use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use super::tier::{classify, CategoryTier, Thresholds};
use crate::catalog::CourseRecord;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Name,
    Cost,
    Duration,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortKey {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "name" | "nombre" => Some(Self::Name),
            "cost" | "costo" => Some(Self::Cost),
            "duration" | "hours" | "horas" => Some(Self::Duration),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Cost => "cost",
            SortKey::Duration => "duration",
        }
    }
}

impl SortDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Ascending),
            "desc" | "descending" => Some(Self::Descending),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Parses `key-direction` (`cost-desc`); a bare key sorts ascending.
    pub fn parse(value: &str) -> Result<Self, String> {
        let trimmed = value.trim();
        let (key_raw, dir_raw) = match trimmed.split_once('-') {
            Some((k, d)) => (k, Some(d)),
            None => (trimmed, None),
        };
        let key = SortKey::parse(key_raw).ok_or_else(|| format!("unknown sort key '{key_raw}'"))?;
        let direction = match dir_raw {
            Some(d) => {
                SortDirection::parse(d).ok_or_else(|| format!("unknown sort direction '{d}'"))?
            }
            None => SortDirection::Ascending,
        };
        Ok(Self { key, direction })
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.key.as_str(), self.direction.as_str())
    }
}

/// Search, filter, sort and page parameters driving the current view.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QueryState {
    pub search_text: String,
    pub selected_categories: BTreeSet<CategoryTier>,
    pub min_cost: Option<f64>,
    pub max_cost: Option<f64>,
    pub sort: SortSpec,
    pub current_page: usize,
    pub page_size: usize,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            selected_categories: CategoryTier::ALL.into_iter().collect(),
            min_cost: None,
            max_cost: None,
            sort: SortSpec::default(),
            current_page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QueryState {
    fn matches(&self, record: &CourseRecord, needle: &str, thresholds: &Thresholds) -> bool {
        if !needle.is_empty()
            && !record.name.to_lowercase().contains(needle)
            && !record.code.to_string().contains(needle)
        {
            return false;
        }
        if !self
            .selected_categories
            .contains(&classify(record.cost, thresholds))
        {
            return false;
        }
        if let Some(min) = self.min_cost {
            if record.cost < min {
                return false;
            }
        }
        if let Some(max) = self.max_cost {
            if record.cost > max {
                return false;
            }
        }
        true
    }
}

fn compare(a: &CourseRecord, b: &CourseRecord, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Cost => a.cost.partial_cmp(&b.cost).unwrap_or(Ordering::Equal),
        SortKey::Duration => a
            .duration_hours
            .partial_cmp(&b.duration_hours)
            .unwrap_or(Ordering::Equal),
    }
}

/// Dataset positions of the records passing every active predicate, ordered by the
/// sort spec. The sort is stable in both directions: equal keys keep dataset order.
pub fn filter_and_sort(
    records: &[CourseRecord],
    state: &QueryState,
    thresholds: &Thresholds,
) -> Vec<usize> {
    let needle = state.search_text.trim().to_lowercase();
    let mut view: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| state.matches(r, &needle, thresholds))
        .map(|(i, _)| i)
        .collect();

    let key = state.sort.key;
    match state.sort.direction {
        SortDirection::Ascending => view.sort_by(|a, b| compare(&records[*a], &records[*b], key)),
        SortDirection::Descending => {
            view.sort_by(|a, b| compare(&records[*a], &records[*b], key).reverse())
        }
    }
    view
}

/// Filtered and sorted view over `records`.
pub fn apply_query<'a>(
    records: &'a [CourseRecord],
    state: &QueryState,
    thresholds: &Thresholds,
) -> Vec<&'a CourseRecord> {
    filter_and_sort(records, state, thresholds)
        .into_iter()
        .map(|i| &records[i])
        .collect()
}
