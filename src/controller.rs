//! Owns the dataset and the query state, and recomputes the view on every change.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::{CourseCode, CourseRecord};
use crate::engine::paginate::{clamp_page, page_count, paginate};
use crate::engine::query::{filter_and_sort, QueryState, SortSpec};
use crate::engine::stats::{count_above, summarize, Stats};
use crate::engine::tier::{classify, CategoryTier, Thresholds};
use crate::output::CatalogRenderer;
use crate::source::SourceError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loaded,
    Failed(String),
}

/// Kinds of state change, each mapped to a recompute policy by [`page_policy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Change {
    Dataset,
    Search,
    Categories,
    CostRange,
    Sort,
    PageSize,
    Navigate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PagePolicy {
    pub requery: bool,
    pub reset_page: bool,
}

/// Which changes re-run filtering and sorting, and which send the user back to
/// page one. Every change re-clamps the current page afterwards.
pub fn page_policy(change: Change) -> PagePolicy {
    match change {
        Change::Dataset | Change::Search | Change::Categories | Change::CostRange | Change::Sort => {
            PagePolicy {
                requery: true,
                reset_page: true,
            }
        }
        Change::PageSize => PagePolicy {
            requery: false,
            reset_page: true,
        },
        Change::Navigate => PagePolicy {
            requery: false,
            reset_page: false,
        },
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageRequest {
    Absolute(i64),
    Delta(i64),
}

/// Sequence number handed out when a retrieval starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReloadTicket(u64);

impl ReloadTicket {
    pub fn sequence(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReloadOutcome {
    Applied { count: usize },
    Failed,
    Stale,
}

/// A record paired with its tier, ready to draw.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RenderRow<'a> {
    pub record: &'a CourseRecord,
    pub tier: CategoryTier,
}

/// The visible page of the current view.
#[derive(Clone, Debug, PartialEq)]
pub struct PageView<'a> {
    pub page: usize,
    pub page_count: usize,
    pub total_filtered: usize,
    pub rows: Vec<RenderRow<'a>>,
}

#[derive(Debug)]
pub struct CatalogController {
    dataset: Vec<CourseRecord>,
    thresholds: Thresholds,
    state: QueryState,
    view: Vec<usize>,
    stats: Stats,
    load_state: LoadState,
    has_dataset: bool,
    issued: u64,
    applied: u64,
}

impl Default for CatalogController {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}

impl CatalogController {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            dataset: Vec::new(),
            thresholds,
            state: QueryState::default(),
            view: Vec::new(),
            stats: Stats::default(),
            load_state: LoadState::NotLoaded,
            has_dataset: false,
            issued: 0,
            applied: 0,
        }
    }

    pub fn load_dataset(&mut self, records: Vec<CourseRecord>) {
        info!(count = records.len(), "dataset replaced");
        self.dataset = records;
        self.stats = summarize(&self.dataset, &self.thresholds);
        self.load_state = LoadState::Loaded;
        self.has_dataset = true;
        self.apply(Change::Dataset);
    }

    /// Records a failed retrieval. Dataset and query state are kept as they were; the
    /// error is shown until the next query or navigation change.
    pub fn record_load_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(error = %message, "dataset load failed");
        self.load_state = LoadState::Failed(message);
    }

    pub fn begin_reload(&mut self) -> ReloadTicket {
        self.issued += 1;
        ReloadTicket(self.issued)
    }

    /// Applies a retrieval result unless a newer retrieval already landed.
    pub fn complete_reload(
        &mut self,
        ticket: ReloadTicket,
        result: Result<Vec<CourseRecord>, SourceError>,
    ) -> ReloadOutcome {
        if ticket.0 <= self.applied {
            debug!(
                ticket = ticket.0,
                applied = self.applied,
                "discarding stale reload"
            );
            return ReloadOutcome::Stale;
        }
        self.applied = ticket.0;
        match result {
            Ok(records) => {
                let count = records.len();
                self.load_dataset(records);
                ReloadOutcome::Applied { count }
            }
            Err(e) => {
                self.record_load_error(e.to_string());
                ReloadOutcome::Failed
            }
        }
    }

    pub fn set_search_text(&mut self, text: &str) {
        self.state.search_text = text.to_string();
        self.apply(Change::Search);
    }

    pub fn set_category_selection(&mut self, tiers: impl IntoIterator<Item = CategoryTier>) {
        self.state.selected_categories = tiers.into_iter().collect();
        self.apply(Change::Categories);
    }

    /// Checkbox-style toggle of a single tier.
    pub fn set_category(&mut self, tier: CategoryTier, selected: bool) {
        let mut tiers = self.state.selected_categories.clone();
        if selected {
            tiers.insert(tier);
        } else {
            tiers.remove(&tier);
        }
        self.set_category_selection(tiers);
    }

    pub fn set_min_cost(&mut self, min: Option<f64>) {
        self.state.min_cost = min;
        self.apply(Change::CostRange);
    }

    pub fn set_max_cost(&mut self, max: Option<f64>) {
        self.state.max_cost = max;
        self.apply(Change::CostRange);
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.state.sort = sort;
        self.apply(Change::Sort);
    }

    /// Zero is treated as one.
    pub fn set_page_size(&mut self, size: usize) {
        self.state.page_size = size.max(1);
        self.apply(Change::PageSize);
    }

    pub fn go_to_page(&mut self, request: PageRequest) {
        let current = i64::try_from(self.state.current_page).unwrap_or(i64::MAX);
        let target = match request {
            PageRequest::Absolute(n) => n,
            PageRequest::Delta(d) => current.saturating_add(d),
        };
        self.state.current_page = clamp_page(target, self.page_count());
        self.apply(Change::Navigate);
    }

    fn apply(&mut self, change: Change) {
        if matches!(self.load_state, LoadState::Failed(_)) && change != Change::Dataset {
            debug!(?change, "load error dismissed");
            self.load_state = if self.has_dataset {
                LoadState::Loaded
            } else {
                LoadState::NotLoaded
            };
        }
        let policy = page_policy(change);
        if policy.requery {
            self.view = filter_and_sort(&self.dataset, &self.state, &self.thresholds);
            debug!(?change, matched = self.view.len(), "view recomputed");
        }
        if policy.reset_page {
            self.state.current_page = 1;
        }
        let requested = self.state.current_page;
        let clamped = clamp_page(
            i64::try_from(requested).unwrap_or(i64::MAX),
            self.page_count(),
        );
        if clamped != requested {
            debug!(requested, clamped, "page clamped");
        }
        self.state.current_page = clamped;
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn dataset(&self) -> &[CourseRecord] {
        &self.dataset
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load_state
    }

    pub fn tier_of(&self, record: &CourseRecord) -> CategoryTier {
        classify(record.cost, &self.thresholds)
    }

    pub fn page_count(&self) -> usize {
        page_count(self.view.len(), self.state.page_size)
    }

    /// Filtered and sorted records, all pages.
    pub fn view(&self) -> Vec<&CourseRecord> {
        self.view.iter().map(|i| &self.dataset[*i]).collect()
    }

    pub fn page(&self) -> PageView<'_> {
        let page = paginate(
            &self.view,
            i64::try_from(self.state.current_page).unwrap_or(i64::MAX),
            self.state.page_size,
        );
        PageView {
            page: page.clamped_page,
            page_count: page.page_count,
            total_filtered: self.view.len(),
            rows: page
                .slice
                .iter()
                .map(|i| {
                    let record = &self.dataset[*i];
                    RenderRow {
                        record,
                        tier: self.tier_of(record),
                    }
                })
                .collect(),
        }
    }

    /// First record carrying `code`, with its dataset position.
    pub fn find_by_code(&self, code: &CourseCode) -> Option<(usize, &CourseRecord)> {
        self.dataset
            .iter()
            .enumerate()
            .find(|(_, r)| &r.code == code)
    }

    pub fn count_above(&self, cost: f64) -> usize {
        count_above(&self.dataset, cost)
    }

    /// Hands the current state to a renderer. A failed load shows only the error.
    pub fn render(&self, renderer: &mut dyn CatalogRenderer) {
        if let LoadState::Failed(message) = &self.load_state {
            renderer.render_load_error(message);
            return;
        }
        renderer.render_kpis(&self.stats);
        let page = self.page();
        if page.rows.is_empty() {
            renderer.render_empty_state();
        } else {
            renderer.render_rows(&page.rows);
        }
        renderer.render_page_info(page.page, page.page_count, page.total_filtered);
    }
}
