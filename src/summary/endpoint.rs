// Endpoint summarization for app-tier logs

use crate::record::EventRecord;
use crate::summary::percentile::percentile_sorted;
use serde::Serialize;
use std::collections::BTreeMap;

/// Latency and cache statistics for one endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointSummary {
    /// Median latency (ms); `None` when no record carried a latency
    pub p50: Option<f64>,

    /// 95th percentile latency (ms); `None` when no record carried a latency
    pub p95: Option<f64>,

    /// Cache hits over all records, error records included
    pub hit_ratio: f64,

    /// Records seen for this endpoint
    pub count: u64,

    /// Records without a numeric `latency_ms`
    pub errors: u64,
}

/// Summaries keyed by endpoint name, in name order
pub type EndpointSummaries = BTreeMap<String, EndpointSummary>;

#[derive(Debug, Default)]
struct EndpointAccumulator {
    latencies: Vec<f64>,
    hits: u64,
    total: u64,
    errors: u64,
}

impl EndpointAccumulator {
    fn record(&mut self, record: &EventRecord) {
        match record.latency_ms() {
            Some(latency) => self.latencies.push(latency),
            None => self.errors += 1,
        }
        if record.cache_hit() {
            self.hits += 1;
        }
        self.total += 1;
    }

    fn finish(mut self) -> EndpointSummary {
        self.latencies.sort_by(f64::total_cmp);
        let hit_ratio = if self.total == 0 {
            0.0
        } else {
            self.hits as f64 / self.total as f64
        };
        EndpointSummary {
            p50: percentile_sorted(&self.latencies, 50.0),
            p95: percentile_sorted(&self.latencies, 95.0),
            hit_ratio,
            count: self.total,
            errors: self.errors,
        }
    }
}

/// Aggregate app-tier records by endpoint
///
/// Every endpoint that appears in at least one record gets an entry, even if
/// all of its records are errors; such entries have `p50`/`p95` of `None`.
///
/// # Example
/// ```
/// use policyproof::record::extract_record;
/// use policyproof::summary::summarize_endpoints;
///
/// let records: Vec<_> = [
///     r#"{"endpoint":"auth","latency_ms":100,"cache_hit":true}"#,
///     r#"{"endpoint":"auth","latency_ms":200,"cache_hit":false}"#,
///     r#"{"endpoint":"auth"}"#,
/// ]
/// .iter()
/// .filter_map(|line| extract_record(line))
/// .collect();
///
/// let summary = &summarize_endpoints(&records)["auth"];
/// assert_eq!(summary.count, 3);
/// assert_eq!(summary.errors, 1);
/// assert_eq!(summary.p50, Some(150.0));
/// ```
pub fn summarize_endpoints(records: &[EventRecord]) -> EndpointSummaries {
    let mut by_endpoint: BTreeMap<String, EndpointAccumulator> = BTreeMap::new();

    for record in records {
        by_endpoint
            .entry(record.endpoint().to_string())
            .or_default()
            .record(record);
    }

    by_endpoint
        .into_iter()
        .map(|(endpoint, acc)| (endpoint, acc.finish()))
        .collect()
}
