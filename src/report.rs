//! Report rendering
//!
//! Text output is the operator-facing report: load counts, headline table,
//! shard balance, criteria, diversion and the final verdict. JSON output is
//! the same [`AnalysisReport`] serialized for dashboards and CI.

use crate::criteria::{CriterionOutcome, CriterionResult, Verdict};
use crate::experiment::AnalysisReport;
use anyhow::{Context, Result};

const MISSING: &str = "-";

fn dash_or(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => MISSING.to_string(),
    }
}

fn ok_or_fail(ok: bool) -> &'static str {
    if ok {
        "OK"
    } else {
        "FAIL"
    }
}

/// One criteria line, e.g. `auth: P95_impr=45.0% (>= 40%) -> OK, xHit=2.50 (>= 2) -> OK`
pub fn format_criterion(result: &CriterionResult) -> String {
    let target = &result.target;
    match &result.outcome {
        CriterionOutcome::Evaluated {
            p95_improvement_pct,
            hit_multiplier,
            p95_ok,
            hit_ok,
        } => format!(
            "{}: P95_impr={:.1}% (>= {}%) -> {}, xHit={} (>= {}) -> {}",
            target.endpoint,
            p95_improvement_pct,
            target.min_p95_improvement_pct,
            ok_or_fail(*p95_ok),
            dash_or(*hit_multiplier, 2),
            target.min_hit_multiplier,
            ok_or_fail(*hit_ok),
        ),
        CriterionOutcome::InsufficientData { reason } => {
            format!("{}: insufficient data ({})", target.endpoint, reason)
        }
    }
}

/// Render the human-readable report
pub fn render_text(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let assessment = &report.assessment;

    out.push_str("Counts:\n");
    for input in &report.inputs {
        out.push_str(&format!(
            " {} rows: {} ({}, {} skipped line(s))\n",
            input.role.label(),
            input.records,
            input.encoding,
            input.skipped_lines
        ));
    }

    out.push_str("\n=== HEADLINE METRICS ===\n");
    out.push_str(&format!(
        "{:<10} {:>10} {:>12} {:>7} {:>10} {:>11} {:>6} {:>8}\n",
        "Endpoint", "Base_P95", "Policy_P95", "Δ%", "Base_Hit", "Policy_Hit", "xHit", "DivRate"
    ));
    for row in &assessment.comparisons {
        out.push_str(&format!(
            "{:<10} {:>10} {:>12} {:>7} {:>10.3} {:>11.3} {:>6} {:>8.3}\n",
            row.endpoint,
            dash_or(row.base_p95, 1),
            dash_or(row.policy_p95, 1),
            dash_or(row.p95_delta_pct, 1),
            row.base_hit_ratio,
            row.policy_hit_ratio,
            dash_or(row.hit_multiplier, 2),
            row.diversion_rate,
        ));
    }

    out.push_str("\nShard balance (stddev of load proxy L, lower is better):\n");
    if report.router.shard_stddev.is_empty() {
        out.push_str(&format!("  {}\n", MISSING));
    }
    for (shard, stddev) in &report.router.shard_stddev {
        let samples = report.router.shard_samples.get(shard).copied().unwrap_or(0);
        out.push_str(&format!("  {}: {:.4} ({} samples)\n", shard, stddev, samples));
    }

    out.push_str("\n=== CRITERIA ===\n");
    if assessment.criteria.is_empty() {
        out.push_str("(no target endpoints configured)\n");
    }
    for result in &assessment.criteria {
        out.push_str(&format_criterion(result));
        out.push('\n');
    }

    let diversion = &assessment.diversion;
    out.push_str(&format!(
        "\nDiversion rate (overall proxy): {:.3} (target < {}) -> {}\n",
        diversion.rate,
        diversion.ceiling,
        ok_or_fail(diversion.passed)
    ));

    match assessment.verdict {
        Verdict::Pass => out.push_str(
            "\nRESULT: ✅ Success criteria met (check shard stddev & any hot pod durations separately).\n",
        ),
        Verdict::Fail => out.push_str(
            "\nRESULT: ❌ One or more criteria not met. Inspect per-endpoint stats & router tuning.\n",
        ),
    }

    out
}

/// Render the report as pretty-printed JSON
pub fn render_json(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize analysis report")
}
