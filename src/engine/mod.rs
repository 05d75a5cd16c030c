//! Query and aggregation pipeline: tiering, filtering, sorting, paging and
//! dataset statistics. Everything here is pure and synchronous.

pub mod paginate;
pub mod query;
pub mod stats;
pub mod tier;

pub use paginate::{paginate, Page};
pub use query::{apply_query, filter_and_sort, QueryState, SortDirection, SortKey, SortSpec};
pub use stats::{summarize, CostExtreme, Stats, TierCounts};
pub use tier::{classify, CategoryTier, Thresholds, DEFAULT_THRESHOLDS};
