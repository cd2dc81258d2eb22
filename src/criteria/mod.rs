// Promotion criteria: baseline vs. policy comparison and pass/fail verdict
//
// Thresholds are data, not constants. A `CriteriaConfig` lists the target
// endpoints with their required p95 improvement and hit-ratio multiplier,
// plus the ceiling on the router's overall diversion rate. The built-in
// default reproduces the experiment's promotion table; `--criteria` loads
// another one from TOML.
//
// Missing data is a verdict of its own. A target endpoint without usable
// latency on either side reports "insufficient data" and fails the run.

mod compare;
mod config;
mod verdict;

pub use compare::{compare_endpoints, hit_multiplier, relative_change_pct, ComparisonRow};
pub use config::{CriteriaConfig, EndpointTarget};
pub use verdict::{
    evaluate_criteria, Assessment, CriterionOutcome, CriterionResult, DiversionCheck, Verdict,
};
