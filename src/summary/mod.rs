// Per-endpoint and per-shard summaries of experiment logs
//
// App-tier logs (baseline and policy) reduce to latency percentiles, cache
// hit ratios and error counts per endpoint. The router log reduces to
// diversion counters per endpoint and load dispersion per shard.
//
// Percentiles use linear interpolation between closest ranks. Criteria
// thresholds downstream compare these numbers directly, so the estimator is
// a pure function with no sampling or approximation.

mod endpoint;
mod percentile;
mod router;

pub use endpoint::{summarize_endpoints, EndpointSummary, EndpointSummaries};
pub use percentile::{percentile, percentile_sorted};
pub use router::{population_stddev, summarize_router, DiversionCounts, RouterSummary};
