//! Report aggregation engine
//!
//! One builder per report, all sharing the same pipeline shape:
//!
//! ```text
//! raw collections (RecordSource)
//!     -> tolerant parse (records)
//!     -> date filter (inclusive, day granularity; unparsable dates dropped)
//!     -> status filter (qualifying set for revenue/ranking reports,
//!        cancelled/expired exclusion for dashboard counters)
//!     -> order-id membership join for order lines
//!     -> group / aggregate (sums, distinct-order sets, guarded averages)
//!     -> name join (drop vs. placeholder per report)
//!     -> stable sort by primary metric, truncate to limit
//! ```
//!
//! Builders are pure functions over parsed collections; the `ReportEngine`
//! methods own the fetching side and nothing else. No state survives a
//! single report computation.

pub mod categories;
pub mod clients;
pub mod dashboard;
pub mod deliveries;
pub mod financial;
pub mod inventory;
pub mod products;
pub mod sales;
pub mod sellers;
pub mod types;

use crate::fetch::RecordSource;
use crate::records::OrderRecord;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Statuses that count as recognized revenue for ranking reports.
const QUALIFYING_STATUSES: [&str; 2] = ["completed", "delivered"];

/// Statuses excluded from dashboard counters. Everything else - including
/// pending and in-flight states - is counted there. This asymmetry with the
/// qualifying set is deliberate.
const DISCARDED_STATUSES: [&str; 2] = ["cancelled", "expired"];

pub struct ReportEngine {
    source: Arc<dyn RecordSource>,
}

impl ReportEngine {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self { source }
    }

    pub(crate) fn source(&self) -> &dyn RecordSource {
        self.source.as_ref()
    }
}

/// Why a record was left out of an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    MissingField(&'static str),
    BadDate,
    UnknownReference(&'static str),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingField(field) => write!(f, "missing field '{}'", field),
            SkipReason::BadDate => write!(f, "unparsable date"),
            SkipReason::UnknownReference(target) => write!(f, "unresolved {} reference", target),
        }
    }
}

/// Per-report tally of skipped records, keyed by collection and reason.
///
/// Skips never abort a report; they are collected here so a report run can
/// say what it silently left out.
#[derive(Debug, Default)]
pub struct SkipLog {
    counts: HashMap<(&'static str, SkipReason), usize>,
}

impl SkipLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, collection: &'static str, reason: SkipReason) {
        *self.counts.entry((collection, reason)).or_insert(0) += 1;
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn count(&self, collection: &'static str, reason: SkipReason) -> usize {
        self.counts.get(&(collection, reason)).copied().unwrap_or(0)
    }

    /// Log the non-empty tallies for one report run.
    pub fn emit(&self, report: &str) {
        for ((collection, reason), count) in &self.counts {
            log::debug!("{}: skipped {} {} record(s): {}", report, count, collection, reason);
        }
    }
}

/// Grouping map that preserves first-insertion order, so that ties in the
/// final ranking stay in upstream encounter order.
#[derive(Debug)]
pub(crate) struct GroupMap<K, V> {
    index: HashMap<K, usize>,
    entries: Vec<(K, V)>,
}

impl<K: std::hash::Hash + Eq + Clone, V: Default> GroupMap<K, V> {
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    pub fn entry(&mut self, key: K) -> &mut V {
        let entries = &mut self.entries;
        let idx = *self.index.entry(key.clone()).or_insert_with(|| {
            entries.push((key, V::default()));
            entries.len() - 1
        });
        &mut self.entries[idx].1
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn into_entries(self) -> Vec<(K, V)> {
        self.entries
    }
}

/// Which order statuses a report admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusFilter {
    /// Only completed/delivered orders (revenue recognition).
    Qualifying,
    /// Everything except cancelled/expired (dashboard counters).
    Countable,
}

pub(crate) fn status_passes(status: Option<&str>, filter: StatusFilter) -> bool {
    match filter {
        StatusFilter::Qualifying => status
            .map(|s| QUALIFYING_STATUSES.contains(&s.to_lowercase().as_str()))
            .unwrap_or(false),
        StatusFilter::Countable => status
            .map(|s| !DISCARDED_STATUSES.contains(&s.to_lowercase().as_str()))
            .unwrap_or(true),
    }
}

/// Inclusive day-granularity date filter plus the report's status filter.
/// Orders whose date fails coercion are dropped, not defaulted.
pub(crate) fn filter_orders<'a>(
    orders: &'a [OrderRecord],
    start: NaiveDate,
    end: NaiveDate,
    filter: StatusFilter,
    skips: &mut SkipLog,
) -> Vec<&'a OrderRecord> {
    orders
        .iter()
        .filter(|order| {
            let date = match order.order_date {
                Some(dt) => dt.date(),
                None => {
                    skips.record("orders", SkipReason::BadDate);
                    return false;
                }
            };
            date >= start && date <= end && status_passes(order.status.as_deref(), filter)
        })
        .collect()
}

/// Identifiers of the surviving orders, used to gate order-line joins.
pub(crate) fn order_id_set(orders: &[&OrderRecord], skips: &mut SkipLog) -> HashSet<i64> {
    let mut ids = HashSet::new();
    for order in orders {
        match order.id {
            Some(id) => {
                ids.insert(id);
            }
            None => skips.record("orders", SkipReason::MissingField("id_order")),
        }
    }
    ids
}

/// Index a parsed collection by its primary key, dropping keyless records.
pub(crate) fn index_by_id<'a, T>(
    items: &'a [T],
    id_of: fn(&T) -> Option<i64>,
    collection: &'static str,
    skips: &mut SkipLog,
) -> HashMap<i64, &'a T> {
    let mut map = HashMap::new();
    for item in items {
        match id_of(item) {
            Some(id) => {
                map.insert(id, item);
            }
            None => skips.record(collection, SkipReason::MissingField("id")),
        }
    }
    map
}

/// Descending stable sort by an f64 metric; ties keep encounter order.
pub(crate) fn sort_desc_by<T>(items: &mut [T], metric: fn(&T) -> f64) {
    items.sort_by(|a, b| {
        metric(b)
            .partial_cmp(&metric(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Sum / count with the division-by-zero guard every average shares.
pub(crate) fn guarded_average(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn order(id: i64, date: &str, status: &str, amount: f64) -> crate::records::OrderRecord {
        crate::records::OrderRecord::from_value(&json!({
            "id_order": id,
            "order_date": date,
            "status": status,
            "total_amount": amount,
        }))
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_qualifying_statuses_case_insensitive() {
        assert!(status_passes(Some("Completed"), StatusFilter::Qualifying));
        assert!(status_passes(Some("delivered"), StatusFilter::Qualifying));
        assert!(!status_passes(Some("pending"), StatusFilter::Qualifying));
        assert!(!status_passes(None, StatusFilter::Qualifying));
    }

    #[test]
    fn test_countable_excludes_only_cancelled_expired() {
        assert!(status_passes(Some("pending"), StatusFilter::Countable));
        assert!(status_passes(Some("completed"), StatusFilter::Countable));
        assert!(status_passes(None, StatusFilter::Countable));
        assert!(!status_passes(Some("Cancelled"), StatusFilter::Countable));
        assert!(!status_passes(Some("expired"), StatusFilter::Countable));
    }

    #[test]
    fn test_date_bounds_inclusive() {
        let orders = vec![
            order(1, "2025-01-01", "completed", 10.0),
            order(2, "2025-01-05", "completed", 10.0),
            order(3, "2025-01-06", "completed", 10.0),
        ];
        let mut skips = SkipLog::new();
        let kept = filter_orders(
            &orders,
            day(2025, 1, 1),
            day(2025, 1, 5),
            StatusFilter::Qualifying,
            &mut skips,
        );
        let ids: Vec<_> = kept.iter().map(|o| o.id.unwrap()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_bad_date_dropped_and_logged() {
        let orders = vec![
            order(1, "2025-01-02", "completed", 10.0),
            order(2, "not-a-date", "completed", 10.0),
        ];
        let mut skips = SkipLog::new();
        let kept = filter_orders(
            &orders,
            day(2025, 1, 1),
            day(2025, 1, 31),
            StatusFilter::Qualifying,
            &mut skips,
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(skips.count("orders", SkipReason::BadDate), 1);
    }

    #[test]
    fn test_group_map_keeps_insertion_order() {
        let mut groups: GroupMap<i64, usize> = GroupMap::new();
        *groups.entry(30) += 1;
        *groups.entry(10) += 1;
        *groups.entry(30) += 1;
        let keys: Vec<_> = groups.into_entries().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![30, 10]);
    }

    #[test]
    fn test_guarded_average() {
        assert_eq!(guarded_average(10.0, 0), 0.0);
        assert_eq!(guarded_average(10.0, 4), 2.5);
    }
}
