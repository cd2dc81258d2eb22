//! End-to-end analysis of one experiment
//!
//! Loads the three logs of an A/B run, summarizes them, and evaluates the
//! criteria table. The result is an [`AnalysisReport`] that the CLI renders
//! as text or JSON.

use crate::criteria::{evaluate_criteria, Assessment, CriteriaConfig};
use crate::decode::TextEncoding;
use crate::loader::{load_records, LoadedLog};
use crate::summary::{summarize_endpoints, summarize_router, EndpointSummaries, RouterSummary};
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

/// Paths of the three logs an experiment produces
#[derive(Debug, Clone)]
pub struct ExperimentLogs {
    pub baseline_app: PathBuf,
    pub policy_app: PathBuf,
    pub policy_router: PathBuf,
}

/// Which log a file is in the experiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogRole {
    BaselineApp,
    PolicyApp,
    PolicyRouter,
}

impl LogRole {
    pub fn label(self) -> &'static str {
        match self {
            LogRole::BaselineApp => "baseline app",
            LogRole::PolicyApp => "policy app",
            LogRole::PolicyRouter => "router",
        }
    }
}

/// Load statistics for one input file
#[derive(Debug, Clone, Serialize)]
pub struct InputStats {
    pub role: LogRole,
    pub path: PathBuf,
    pub encoding: TextEncoding,
    pub records: usize,
    pub skipped_lines: usize,
}

impl InputStats {
    fn new(role: LogRole, log: &LoadedLog) -> Self {
        Self {
            role,
            path: log.path.clone(),
            encoding: log.encoding,
            records: log.len(),
            skipped_lines: log.skipped_lines,
        }
    }
}

/// Complete analysis output
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub inputs: Vec<InputStats>,
    pub baseline: EndpointSummaries,
    pub policy: EndpointSummaries,
    pub router: RouterSummary,
    pub assessment: Assessment,
}

/// Run the whole analysis
///
/// Fails only if a log cannot be read or decoded, or if `config` is invalid.
pub fn run_experiment(logs: &ExperimentLogs, config: &CriteriaConfig) -> Result<AnalysisReport> {
    let baseline_log = load_records(&logs.baseline_app)?;
    let policy_log = load_records(&logs.policy_app)?;
    let router_log = load_records(&logs.policy_router)?;

    let inputs = vec![
        InputStats::new(LogRole::BaselineApp, &baseline_log),
        InputStats::new(LogRole::PolicyApp, &policy_log),
        InputStats::new(LogRole::PolicyRouter, &router_log),
    ];

    let baseline = summarize_endpoints(&baseline_log.records);
    let policy = summarize_endpoints(&policy_log.records);
    let router = summarize_router(&router_log.records);
    tracing::debug!(
        baseline_endpoints = baseline.len(),
        policy_endpoints = policy.len(),
        shards = router.shard_stddev.len(),
        "summaries computed"
    );

    let assessment = evaluate_criteria(&baseline, &policy, &router, config)?;
    tracing::info!("verdict: {:?}", assessment.verdict);

    Ok(AnalysisReport {
        inputs,
        baseline,
        policy,
        router,
        assessment,
    })
}
