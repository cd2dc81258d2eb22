//! policyproof - offline A/B validation of routing and caching policies
//!
//! This library ingests the JSON-lines logs of a baseline run and a policy
//! run (app tier plus router tier), computes per-endpoint latency
//! percentiles and cache hit ratios, per-shard load dispersion and
//! diversion rates, and renders a pass/fail verdict against a criteria
//! table.

pub mod cli;
pub mod criteria;
pub mod decode;
pub mod error;
pub mod experiment;
pub mod loader;
pub mod record;
pub mod report;
pub mod summary;
