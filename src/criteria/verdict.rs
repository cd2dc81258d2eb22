// Criteria evaluation and the aggregate promotion verdict

use crate::criteria::compare::{compare_endpoints, hit_multiplier, ComparisonRow};
use crate::criteria::config::{CriteriaConfig, EndpointTarget};
use crate::summary::{EndpointSummaries, RouterSummary};
use anyhow::Result;
use serde::Serialize;

/// Outcome of one target endpoint's check
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CriterionOutcome {
    /// Both sides had a usable p95; thresholds were compared
    Evaluated {
        /// `(base - policy) / base * 100`; positive means faster
        p95_improvement_pct: f64,
        hit_multiplier: Option<f64>,
        p95_ok: bool,
        hit_ok: bool,
    },

    /// No usable summary on one side, or a zero baseline p95
    InsufficientData { reason: String },
}

/// A target together with its outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionResult {
    pub target: EndpointTarget,
    pub outcome: CriterionOutcome,
}

impl CriterionResult {
    pub fn passed(&self) -> bool {
        matches!(
            self.outcome,
            CriterionOutcome::Evaluated {
                p95_ok: true,
                hit_ok: true,
                ..
            }
        )
    }
}

/// Router-wide diversion check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiversionCheck {
    pub diverted: u64,
    pub total: u64,
    pub rate: f64,
    pub ceiling: f64,
    pub passed: bool,
}

/// Final pass/fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn is_pass(self) -> bool {
        self == Verdict::Pass
    }
}

/// Everything the comparison produced
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    /// Headline rows, one per endpoint seen in either app log
    pub comparisons: Vec<ComparisonRow>,

    /// One result per configured target, in configuration order
    pub criteria: Vec<CriterionResult>,

    pub diversion: DiversionCheck,

    pub verdict: Verdict,
}

impl Assessment {
    /// Targets that did not pass, including insufficient-data ones
    pub fn failed_targets(&self) -> Vec<&str> {
        self.criteria
            .iter()
            .filter(|c| !c.passed())
            .map(|c| c.target.endpoint.as_str())
            .collect()
    }
}

fn evaluate_target(
    target: &EndpointTarget,
    baseline: &EndpointSummaries,
    policy: &EndpointSummaries,
) -> CriterionOutcome {
    let insufficient = |reason: &str| CriterionOutcome::InsufficientData {
        reason: reason.to_string(),
    };

    let Some(base) = baseline.get(&target.endpoint) else {
        return insufficient("no baseline records");
    };
    let Some(pol) = policy.get(&target.endpoint) else {
        return insufficient("no policy records");
    };
    let Some(base_p95) = base.p95 else {
        return insufficient("no baseline latency samples");
    };
    let Some(policy_p95) = pol.p95 else {
        return insufficient("no policy latency samples");
    };
    if base_p95 == 0.0 {
        return insufficient("baseline p95 is zero");
    }

    let p95_improvement_pct = (base_p95 - policy_p95) / base_p95 * 100.0;
    let multiplier = hit_multiplier(base.hit_ratio, pol.hit_ratio);

    CriterionOutcome::Evaluated {
        p95_improvement_pct,
        hit_multiplier: multiplier,
        p95_ok: p95_improvement_pct >= target.min_p95_improvement_pct,
        hit_ok: multiplier.is_some_and(|m| m >= target.min_hit_multiplier),
    }
}

/// Compare baseline and policy summaries against a criteria table
///
/// The verdict passes only if every configured target passes and the
/// router's overall diversion rate is strictly below the ceiling. A target
/// with insufficient data fails the verdict.
///
/// # Example
/// ```
/// use policyproof::criteria::{evaluate_criteria, CriteriaConfig, EndpointTarget, Verdict};
/// use policyproof::summary::{EndpointSummaries, EndpointSummary, RouterSummary};
///
/// let summary = |p95, hit_ratio| EndpointSummary {
///     p50: Some(p95),
///     p95: Some(p95),
///     hit_ratio,
///     count: 100,
///     errors: 0,
/// };
/// let mut baseline = EndpointSummaries::new();
/// baseline.insert("auth".into(), summary(100.0, 0.25));
/// let mut policy = EndpointSummaries::new();
/// policy.insert("auth".into(), summary(55.0, 0.5));
///
/// let config = CriteriaConfig {
///     max_diversion_rate: 0.10,
///     targets: vec![EndpointTarget::new("auth", 40.0, 2.0)],
/// };
/// let assessment =
///     evaluate_criteria(&baseline, &policy, &RouterSummary::default(), &config).unwrap();
/// assert_eq!(assessment.verdict, Verdict::Pass);
/// ```
pub fn evaluate_criteria(
    baseline: &EndpointSummaries,
    policy: &EndpointSummaries,
    router: &RouterSummary,
    config: &CriteriaConfig,
) -> Result<Assessment> {
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let comparisons = compare_endpoints(baseline, policy, router);

    let criteria: Vec<CriterionResult> = config
        .targets
        .iter()
        .map(|target| {
            let outcome = evaluate_target(target, baseline, policy);
            if let CriterionOutcome::InsufficientData { reason } = &outcome {
                tracing::warn!("{}: insufficient data ({})", target.endpoint, reason);
            }
            CriterionResult {
                target: target.clone(),
                outcome,
            }
        })
        .collect();

    let overall = router.overall();
    let rate = overall.rate();
    let diversion = DiversionCheck {
        diverted: overall.diverted,
        total: overall.total,
        rate,
        ceiling: config.max_diversion_rate,
        passed: rate < config.max_diversion_rate,
    };

    let verdict = if criteria.iter().all(CriterionResult::passed) && diversion.passed {
        Verdict::Pass
    } else {
        Verdict::Fail
    };

    Ok(Assessment {
        comparisons,
        criteria,
        diversion,
        verdict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::EndpointSummary;

    fn summary(p95: Option<f64>, hit_ratio: f64) -> EndpointSummary {
        EndpointSummary {
            p50: p95,
            p95,
            hit_ratio,
            count: 20,
            errors: 0,
        }
    }

    fn single(
        base: EndpointSummary,
        pol: EndpointSummary,
    ) -> (EndpointSummaries, EndpointSummaries) {
        let mut baseline = EndpointSummaries::new();
        baseline.insert("auth".into(), base);
        let mut policy = EndpointSummaries::new();
        policy.insert("auth".into(), pol);
        (baseline, policy)
    }

    fn auth_only() -> CriteriaConfig {
        CriteriaConfig {
            max_diversion_rate: 0.10,
            targets: vec![EndpointTarget::new("auth", 40.0, 2.0)],
        }
    }

    #[test]
    fn test_improvement_meets_target() {
        let (b, p) = single(summary(Some(100.0), 0.2), summary(Some(55.0), 0.5));
        let a = evaluate_criteria(&b, &p, &RouterSummary::default(), &auth_only()).unwrap();
        match &a.criteria[0].outcome {
            CriterionOutcome::Evaluated {
                p95_improvement_pct,
                p95_ok,
                ..
            } => {
                assert_eq!(*p95_improvement_pct, 45.0);
                assert!(*p95_ok);
            }
            other => panic!("expected Evaluated, got {other:?}"),
        }
        assert_eq!(a.verdict, Verdict::Pass);
    }

    #[test]
    fn test_improvement_below_target() {
        let (b, p) = single(summary(Some(100.0), 0.2), summary(Some(70.0), 0.5));
        let a = evaluate_criteria(&b, &p, &RouterSummary::default(), &auth_only()).unwrap();
        match &a.criteria[0].outcome {
            CriterionOutcome::Evaluated {
                p95_improvement_pct,
                p95_ok,
                hit_ok,
                ..
            } => {
                assert_eq!(*p95_improvement_pct, 30.0);
                assert!(!*p95_ok);
                assert!(*hit_ok);
            }
            other => panic!("expected Evaluated, got {other:?}"),
        }
        assert_eq!(a.verdict, Verdict::Fail);
        assert_eq!(a.failed_targets(), vec!["auth"]);
    }

    #[test]
    fn test_zero_baseline_hit_ratio_fails_hit_check() {
        let (b, p) = single(summary(Some(100.0), 0.0), summary(Some(10.0), 0.9));
        let a = evaluate_criteria(&b, &p, &RouterSummary::default(), &auth_only()).unwrap();
        assert!(matches!(
            a.criteria[0].outcome,
            CriterionOutcome::Evaluated {
                hit_multiplier: None,
                hit_ok: false,
                p95_ok: true,
                ..
            }
        ));
        assert_eq!(a.verdict, Verdict::Fail);
    }

    #[test]
    fn test_zero_baseline_p95_is_insufficient() {
        let (b, p) = single(summary(Some(0.0), 0.2), summary(Some(0.0), 0.5));
        let a = evaluate_criteria(&b, &p, &RouterSummary::default(), &auth_only()).unwrap();
        assert!(matches!(
            a.criteria[0].outcome,
            CriterionOutcome::InsufficientData { .. }
        ));
        assert_eq!(a.verdict, Verdict::Fail);
    }

    #[test]
    fn test_missing_policy_latency_is_insufficient() {
        let (b, p) = single(summary(Some(100.0), 0.2), summary(None, 0.5));
        let a = evaluate_criteria(&b, &p, &RouterSummary::default(), &auth_only()).unwrap();
        assert_eq!(
            a.criteria[0].outcome,
            CriterionOutcome::InsufficientData {
                reason: "no policy latency samples".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let (b, p) = single(summary(Some(100.0), 0.2), summary(Some(50.0), 0.5));
        let config = auth_only().with_max_diversion_rate(2.0);
        assert!(evaluate_criteria(&b, &p, &RouterSummary::default(), &config).is_err());
    }

    #[test]
    fn test_no_targets_depends_only_on_diversion() {
        let config = CriteriaConfig {
            max_diversion_rate: 0.10,
            targets: vec![],
        };
        let a = evaluate_criteria(
            &EndpointSummaries::new(),
            &EndpointSummaries::new(),
            &RouterSummary::default(),
            &config,
        )
        .unwrap();
        assert!(a.diversion.passed);
        assert_eq!(a.verdict, Verdict::Pass);
    }
}
