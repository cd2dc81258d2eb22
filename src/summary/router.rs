// Router summarization: diversion per endpoint, load dispersion per shard

use crate::record::EventRecord;
use serde::Serialize;
use std::collections::BTreeMap;

/// Diverted/total counters for one endpoint (or for the whole log)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiversionCounts {
    pub diverted: u64,
    pub total: u64,
}

impl DiversionCounts {
    /// Diverted fraction; `0.0` when nothing was routed
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.diverted as f64 / self.total as f64
        }
    }

    fn add(&mut self, diverted: bool) {
        self.total += 1;
        if diverted {
            self.diverted += 1;
        }
    }
}

/// Summary of the policy router log
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouterSummary {
    /// Diversion counters per endpoint
    pub diversion: BTreeMap<String, DiversionCounts>,

    /// Population standard deviation of `L` per shard
    pub shard_stddev: BTreeMap<String, f64>,

    /// Number of `L` samples behind each shard's dispersion
    pub shard_samples: BTreeMap<String, usize>,
}

impl RouterSummary {
    /// Diversion rate per endpoint
    pub fn diversion_rates(&self) -> BTreeMap<String, f64> {
        self.diversion
            .iter()
            .map(|(endpoint, counts)| (endpoint.clone(), counts.rate()))
            .collect()
    }

    pub fn diversion_rate(&self, endpoint: &str) -> Option<f64> {
        self.diversion.get(endpoint).map(DiversionCounts::rate)
    }

    /// Counters summed over every endpoint, i.e. over every router record
    pub fn overall(&self) -> DiversionCounts {
        self.diversion
            .values()
            .fold(DiversionCounts::default(), |acc, c| DiversionCounts {
                diverted: acc.diverted + c.diverted,
                total: acc.total + c.total,
            })
    }

    /// Overall diversion rate; `0.0` for an empty router log
    pub fn overall_diversion_rate(&self) -> f64 {
        self.overall().rate()
    }
}

/// Population standard deviation; `0.0` for fewer than two samples
pub fn population_stddev(samples: &[f64]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Aggregate router-tier records
///
/// A record contributes an `L` sample only if it names a non-empty shard and
/// carries a numeric load proxy; other records still count toward diversion.
pub fn summarize_router(records: &[EventRecord]) -> RouterSummary {
    let mut diversion: BTreeMap<String, DiversionCounts> = BTreeMap::new();
    let mut load_by_shard: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for record in records {
        diversion
            .entry(record.endpoint().to_string())
            .or_default()
            .add(record.diverted());

        if let (Some(shard), Some(load)) = (record.selected_shard(), record.load_proxy()) {
            load_by_shard.entry(shard.to_string()).or_default().push(load);
        }
    }

    let shard_samples = load_by_shard
        .iter()
        .map(|(shard, loads)| (shard.clone(), loads.len()))
        .collect();
    let shard_stddev = load_by_shard
        .iter()
        .map(|(shard, loads)| (shard.clone(), population_stddev(loads)))
        .collect();

    RouterSummary {
        diversion,
        shard_stddev,
        shard_samples,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(values: Vec<serde_json::Value>) -> Vec<EventRecord> {
        values
            .into_iter()
            .filter_map(EventRecord::from_value)
            .collect()
    }

    #[test]
    fn test_stddev_single_sample_is_zero() {
        assert_eq!(population_stddev(&[4.2]), 0.0);
        assert_eq!(population_stddev(&[]), 0.0);
    }

    #[test]
    fn test_stddev_two_samples() {
        assert_eq!(population_stddev(&[1.0, 3.0]), 1.0);
    }

    #[test]
    fn test_stddev_is_population_not_sample() {
        // mean 5, squared deviations 20, n = 4
        let sd = population_stddev(&[2.0, 4.0, 6.0, 8.0]);
        assert!((sd - 5.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_diversion_rate_per_endpoint() {
        let summary = summarize_router(&records(vec![
            json!({"endpoint": "auth", "diverted": true}),
            json!({"endpoint": "auth", "diverted": false}),
            json!({"endpoint": "auth"}),
            json!({"endpoint": "auth", "diverted": true}),
        ]));
        assert_eq!(summary.diversion_rate("auth"), Some(0.5));
        assert_eq!(summary.diversion_rate("features"), None);
    }

    #[test]
    fn test_shard_dispersion() {
        let summary = summarize_router(&records(vec![
            json!({"endpoint": "a", "selected_shard": "s1", "L": 1.0}),
            json!({"endpoint": "a", "selected_shard": "s1", "L": "3.0"}),
            json!({"endpoint": "a", "selected_shard": "s2", "L": 9.0}),
            json!({"endpoint": "a", "selected_shard": "s2", "L": "busy"}),
            json!({"endpoint": "a", "selected_shard": "", "L": 100.0}),
            json!({"endpoint": "a", "L": 100.0}),
        ]));
        assert_eq!(summary.shard_stddev["s1"], 1.0);
        assert_eq!(summary.shard_stddev["s2"], 0.0);
        assert_eq!(summary.shard_samples["s2"], 1);
        assert_eq!(summary.shard_stddev.len(), 2);
        assert_eq!(summary.overall().total, 6);
    }

    #[test]
    fn test_overall_rate_uses_same_counters() {
        let summary = summarize_router(&records(vec![
            json!({"endpoint": "a", "diverted": true}),
            json!({"endpoint": "b", "diverted": false}),
            json!({"endpoint": "b", "diverted": false}),
            json!({"diverted": true}),
        ]));
        assert_eq!(
            summary.overall(),
            DiversionCounts {
                diverted: 2,
                total: 4
            }
        );
        assert_eq!(summary.overall_diversion_rate(), 0.5);
        assert_eq!(summary.diversion_rate("unknown"), Some(1.0));
    }

    #[test]
    fn test_empty_router_log() {
        let summary = summarize_router(&[]);
        assert_eq!(summary.overall_diversion_rate(), 0.0);
        assert!(summary.diversion_rates().is_empty());
        assert!(summary.shard_stddev.is_empty());
    }
}
