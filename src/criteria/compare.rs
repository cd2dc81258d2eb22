// Baseline vs. policy comparison rows for the headline table

use crate::summary::{EndpointSummaries, RouterSummary};
use serde::Serialize;
use std::collections::BTreeSet;

/// One headline row; `None` fields render as a dash
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub endpoint: String,
    pub base_p95: Option<f64>,
    pub policy_p95: Option<f64>,
    /// `(policy - base) / base * 100`; negative means the policy is faster
    pub p95_delta_pct: Option<f64>,
    pub base_hit_ratio: f64,
    pub policy_hit_ratio: f64,
    pub hit_multiplier: Option<f64>,
    pub diversion_rate: f64,
}

/// Relative change from `base` to `policy` in percent
///
/// `None` if either side is missing or the base is exactly zero.
pub fn relative_change_pct(base: Option<f64>, policy: Option<f64>) -> Option<f64> {
    match (base, policy) {
        (Some(base), Some(policy)) if base != 0.0 => Some((policy - base) / base * 100.0),
        _ => None,
    }
}

/// Policy hit ratio over baseline hit ratio; `None` for a zero baseline
pub fn hit_multiplier(base_hit_ratio: f64, policy_hit_ratio: f64) -> Option<f64> {
    if base_hit_ratio == 0.0 {
        None
    } else {
        Some(policy_hit_ratio / base_hit_ratio)
    }
}

/// Build headline rows over every endpoint seen in either app log
///
/// Rows are sorted by endpoint name. An endpoint missing from one side has
/// no p95 and a hit ratio of 0.0 on that side; an endpoint the router never
/// saw has a diversion rate of 0.0.
pub fn compare_endpoints(
    baseline: &EndpointSummaries,
    policy: &EndpointSummaries,
    router: &RouterSummary,
) -> Vec<ComparisonRow> {
    let endpoints: BTreeSet<&String> = baseline.keys().chain(policy.keys()).collect();

    endpoints
        .into_iter()
        .map(|endpoint| {
            let base = baseline.get(endpoint);
            let pol = policy.get(endpoint);

            let base_p95 = base.and_then(|s| s.p95);
            let policy_p95 = pol.and_then(|s| s.p95);
            let base_hit_ratio = base.map_or(0.0, |s| s.hit_ratio);
            let policy_hit_ratio = pol.map_or(0.0, |s| s.hit_ratio);

            ComparisonRow {
                endpoint: endpoint.clone(),
                base_p95,
                policy_p95,
                p95_delta_pct: relative_change_pct(base_p95, policy_p95),
                base_hit_ratio,
                policy_hit_ratio,
                hit_multiplier: hit_multiplier(base_hit_ratio, policy_hit_ratio),
                diversion_rate: router.diversion_rate(endpoint).unwrap_or(0.0),
            }
        })
        .collect()
}
