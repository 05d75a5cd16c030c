use std::cmp::Ordering;
use std::collections::BTreeSet;

use proptest::prelude::*;

use crate::catalog::CourseRecord;
use crate::controller::{CatalogController, PageRequest};
use crate::engine::paginate::paginate;
use crate::engine::{
    classify, filter_and_sort, CategoryTier, QueryState, SortDirection, SortKey, SortSpec,
    Thresholds,
};

fn catalog_of_25() -> Vec<CourseRecord> {
    (1..=25i64)
        .map(|i| {
            let name = if [3, 8, 13, 21].contains(&i) {
                format!("Rust {i:02}")
            } else {
                format!("Course {i:02}")
            };
            CourseRecord::new(i, &name, (i % 7 + 1) as f64, i as f64 * 3000.0)
        })
        .collect()
}

/// Small catalog with repeated names, costs and durations.
fn catalog_with_ties() -> Vec<CourseRecord> {
    vec![
        CourseRecord::new(1, "Redes", 30.0, 20000.0),
        CourseRecord::new(2, "algebra", 10.0, 5000.0),
        CourseRecord::new(3, "Redes", 10.0, 65000.0),
        CourseRecord::new(4, "Algebra", 30.0, 20000.0),
        CourseRecord::new(5, "SQL", 10.0, 5000.0),
        CourseRecord::new(6, "redes", 30.0, 65000.0),
        CourseRecord::new(7, "Go", 20.0, 20000.0),
    ]
}

// Costs land on round tens of thousands often enough to hit the tier
// thresholds exactly and to produce ties.
fn arb_cost() -> impl Strategy<Value = f64> {
    prop_oneof![
        (0u32..10).prop_map(|step| f64::from(step) * 10_000.0),
        0.0f64..100_000.0,
    ]
}

fn arb_record() -> impl Strategy<Value = CourseRecord> {
    (
        0i64..30,
        prop::sample::select(vec![
            "Rust",
            "rust avanzado",
            "Go",
            "Redes",
            "SQL",
            "Bases de Datos",
            "Course 10",
        ]),
        0u32..5,
        arb_cost(),
    )
        .prop_map(|(code, name, hours, cost)| {
            CourseRecord::new(code, name, f64::from(hours) * 10.0, cost)
        })
}

fn arb_records() -> impl Strategy<Value = Vec<CourseRecord>> {
    prop::collection::vec(arb_record(), 0..40)
}

fn arb_sort() -> impl Strategy<Value = SortSpec> {
    (
        prop::sample::select(vec![SortKey::Name, SortKey::Cost, SortKey::Duration]),
        prop::sample::select(vec![SortDirection::Ascending, SortDirection::Descending]),
    )
        .prop_map(|(key, direction)| SortSpec::new(key, direction))
}

fn arb_query() -> impl Strategy<Value = QueryState> {
    (
        prop::sample::select(vec!["", "rust", "  RUST ", "re", "1", "zz"]),
        (any::<bool>(), any::<bool>(), any::<bool>()),
        prop::option::of(0u32..10),
        prop::option::of(0u32..10),
        arb_sort(),
    )
        .prop_map(|(search, (econ, standard, prem), min, max, sort)| {
            let selected_categories = [econ, standard, prem]
                .into_iter()
                .zip(CategoryTier::ALL)
                .filter(|(on, _)| *on)
                .map(|(_, tier)| tier)
                .collect();
            QueryState {
                search_text: search.to_string(),
                selected_categories,
                min_cost: min.map(|v| f64::from(v) * 10_000.0),
                max_cost: max.map(|v| f64::from(v) * 10_000.0),
                sort,
                ..QueryState::default()
            }
        })
}

fn arb_thresholds() -> impl Strategy<Value = Thresholds> {
    (0u32..8, 1u32..8).prop_map(|(econ, gap)| {
        Thresholds::new(f64::from(econ) * 10_000.0, f64::from(econ + gap) * 10_000.0).unwrap()
    })
}

fn matches_all(record: &CourseRecord, state: &QueryState, thresholds: &Thresholds) -> bool {
    let needle = state.search_text.trim().to_lowercase();
    let text = needle.is_empty()
        || record.name.to_lowercase().contains(&needle)
        || record.code.to_string().contains(&needle);
    let tier = state
        .selected_categories
        .contains(&classify(record.cost, thresholds));
    let low = state.min_cost.map_or(true, |min| record.cost >= min);
    let high = state.max_cost.map_or(true, |max| record.cost <= max);
    text && tier && low && high
}

fn key_order(a: &CourseRecord, b: &CourseRecord, spec: SortSpec) -> Ordering {
    let ord = match spec.key {
        SortKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortKey::Cost => a.cost.total_cmp(&b.cost),
        SortKey::Duration => a.duration_hours.total_cmp(&b.duration_hours),
    };
    match spec.direction {
        SortDirection::Ascending => ord,
        SortDirection::Descending => ord.reverse(),
    }
}

#[derive(Clone, Debug)]
enum Op {
    Delta(i64),
    Absolute(i64),
    Size(usize),
    Search(&'static str),
    MaxCost(Option<f64>),
    Sort(SortSpec),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-5i64..5).prop_map(Op::Delta),
        any::<i64>().prop_map(Op::Absolute),
        (0usize..15).prop_map(Op::Size),
        prop::sample::select(vec!["", "rust", "course 1", "zzz"]).prop_map(Op::Search),
        prop::option::of(0u32..80).prop_map(|m| Op::MaxCost(m.map(|v| f64::from(v) * 1000.0))),
        arb_sort().prop_map(Op::Sort),
    ]
}

#[test]
fn search_after_navigation_lands_on_first_page() {
    let mut c = CatalogController::default();
    c.load_dataset(catalog_of_25());
    assert_eq!(c.page_count(), 3);

    c.go_to_page(PageRequest::Absolute(3));
    assert_eq!(c.state().current_page, 3);
    assert_eq!(c.page().rows.len(), 5);

    c.set_search_text("rust");
    let page = c.page();
    assert_eq!(page.total_filtered, 4);
    assert_eq!(page.page_count, 1);
    assert_eq!(page.page, 1);
    assert_eq!(c.state().current_page, 1);
}

#[test]
fn cost_bounds_are_inclusive() {
    let records = catalog_of_25();
    let state = QueryState {
        min_cost: Some(51000.0),
        max_cost: Some(51000.0),
        ..QueryState::default()
    };
    let view = filter_and_sort(&records, &state, &Thresholds::default());
    assert_eq!(view.len(), 1);
    assert_eq!(records[view[0]].name, "Course 17");
}

#[test]
fn descending_name_sort_keeps_ties_in_dataset_order() {
    let records = catalog_with_ties();
    let state = QueryState {
        sort: SortSpec::new(SortKey::Name, SortDirection::Descending),
        ..QueryState::default()
    };
    let codes: Vec<String> = filter_and_sort(&records, &state, &Thresholds::default())
        .into_iter()
        .map(|i| records[i].code.to_string())
        .collect();
    assert_eq!(codes, vec!["5", "1", "3", "6", "7", "2", "4"]);
}

#[test]
fn clearing_the_query_restores_the_initial_view() {
    let mut c = CatalogController::default();
    c.load_dataset(catalog_of_25());
    let initial: Vec<String> = c.view().iter().map(|r| r.label()).collect();

    c.set_search_text("rust");
    c.set_category_selection([CategoryTier::Economy]);
    c.set_min_cost(Some(1000.0));
    c.set_max_cost(Some(9000.0));
    assert!(c.view().len() < initial.len());

    c.set_search_text("");
    c.set_category_selection(CategoryTier::ALL);
    c.set_min_cost(None);
    c.set_max_cost(None);
    let restored: Vec<String> = c.view().iter().map(|r| r.label()).collect();
    assert_eq!(restored, initial);
}

#[test]
fn stats_ignore_the_active_filter() {
    let mut c = CatalogController::default();
    c.load_dataset(catalog_of_25());
    let before = c.stats().clone();
    c.set_search_text("rust");
    c.set_min_cost(Some(30000.0));
    assert_eq!(c.stats(), &before);
    assert_eq!(before.count, 25);
    assert_eq!(before.max_cost.as_ref().unwrap().names, vec!["[25] Course 25"]);
    assert_eq!(before.min_cost.as_ref().unwrap().cost, 3000.0);
}

proptest! {
    #[test]
    fn filtered_view_is_exactly_the_matching_records(
        records in arb_records(),
        state in arb_query(),
        thresholds in arb_thresholds()
    ) {
        let view = filter_and_sort(&records, &state, &thresholds);
        let expected: BTreeSet<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| matches_all(r, &state, &thresholds))
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(view.len(), expected.len());
        prop_assert_eq!(view.iter().copied().collect::<BTreeSet<_>>(), expected);
    }

    #[test]
    fn sorting_is_ordered_and_stable(records in arb_records(), state in arb_query()) {
        let view = filter_and_sort(&records, &state, &Thresholds::default());
        for pair in view.windows(2) {
            let ord = key_order(&records[pair[0]], &records[pair[1]], state.sort);
            prop_assert_ne!(ord, Ordering::Greater, "{} out of order", state.sort);
            if ord == Ordering::Equal {
                prop_assert!(pair[0] < pair[1], "tie order broken for {}", state.sort);
            }
        }
    }

    #[test]
    fn permissive_query_keeps_every_record(records in arb_records(), sort in arb_sort()) {
        let state = QueryState { sort, ..QueryState::default() };
        let view = filter_and_sort(&records, &state, &Thresholds::default());
        let mut sorted: Vec<usize> = (0..records.len()).collect();
        sorted.sort_by(|a, b| key_order(&records[*a], &records[*b], sort));
        prop_assert_eq!(view, sorted);
    }

    #[test]
    fn paging_clamps_and_covers_the_view_once(
        total in 0usize..200,
        size in 0usize..25,
        page in any::<i64>()
    ) {
        let view: Vec<usize> = (0..total).collect();
        let step = size.max(1);
        let p = paginate(&view, page, size);
        prop_assert_eq!(p.page_count, std::cmp::max(1, total.div_ceil(step)));
        prop_assert!(p.clamped_page >= 1 && p.clamped_page <= p.page_count);
        if page >= 1 && page <= p.page_count as i64 {
            prop_assert_eq!(p.clamped_page as i64, page);
        }
        prop_assert_eq!(p.start_index, (p.clamped_page - 1) * step);
        prop_assert!(p.slice.len() <= step);

        let mut seen = Vec::new();
        for n in 1..=p.page_count {
            seen.extend_from_slice(paginate(&view, n as i64, size).slice);
        }
        prop_assert_eq!(seen, view);
    }

    #[test]
    fn rendered_tier_matches_filter_tier(
        records in arb_records(),
        thresholds in arb_thresholds()
    ) {
        for tier in CategoryTier::ALL {
            let mut c = CatalogController::new(thresholds);
            c.set_page_size(100);
            c.load_dataset(records.clone());
            c.set_category_selection([tier]);
            let page = c.page();
            prop_assert_eq!(page.total_filtered, c.stats().tiers.get(tier));
            for row in page.rows {
                prop_assert_eq!(row.tier, tier);
                prop_assert_eq!(classify(row.record.cost, &thresholds), tier);
            }
        }
    }

    #[test]
    fn any_operation_sequence_keeps_the_page_valid(
        records in arb_records(),
        ops in prop::collection::vec(arb_op(), 0..60)
    ) {
        let mut c = CatalogController::default();
        c.load_dataset(records);
        for op in ops {
            match op {
                Op::Delta(d) => c.go_to_page(PageRequest::Delta(d)),
                Op::Absolute(n) => c.go_to_page(PageRequest::Absolute(n)),
                Op::Size(n) => c.set_page_size(n),
                Op::Search(text) => c.set_search_text(text),
                Op::MaxCost(max) => c.set_max_cost(max),
                Op::Sort(spec) => c.set_sort(spec),
            }
            let page = c.page();
            prop_assert!(page.page >= 1 && page.page <= page.page_count);
            prop_assert_eq!(page.page, c.state().current_page);
            prop_assert!(c.state().page_size >= 1);
            prop_assert!(page.rows.len() <= c.state().page_size);
            prop_assert_eq!(page.total_filtered, c.view().len());
        }
    }
}
