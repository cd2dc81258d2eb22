// Criteria table configuration
//
// Loaded from TOML (`--criteria FILE`) or taken from the built-in default,
// which mirrors criteria-default.toml at the repository root.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Required improvement for one endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointTarget {
    /// Endpoint name as logged in the `endpoint` field
    pub endpoint: String,

    /// Minimum p95 latency reduction, in percent of the baseline p95
    ///
    /// 40.0 means the policy p95 must be at most 60% of the baseline p95.
    pub min_p95_improvement_pct: f64,

    /// Minimum ratio of policy hit ratio to baseline hit ratio
    pub min_hit_multiplier: f64,
}

impl EndpointTarget {
    pub fn new(
        endpoint: impl Into<String>,
        min_p95_improvement_pct: f64,
        min_hit_multiplier: f64,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            min_p95_improvement_pct,
            min_hit_multiplier,
        }
    }
}

/// Pass/fail thresholds for an experiment
///
/// # Example
/// ```
/// use policyproof::criteria::CriteriaConfig;
///
/// let config = CriteriaConfig::default();
/// assert_eq!(config.max_diversion_rate, 0.10);
/// assert_eq!(config.targets.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriteriaConfig {
    /// The router's overall diversion rate must be strictly below this
    #[serde(default = "default_max_diversion_rate")]
    pub max_diversion_rate: f64,

    /// Target endpoints, evaluated and reported in this order
    #[serde(default, rename = "target")]
    pub targets: Vec<EndpointTarget>,
}

fn default_max_diversion_rate() -> f64 {
    0.10
}

impl Default for CriteriaConfig {
    fn default() -> Self {
        Self {
            max_diversion_rate: default_max_diversion_rate(),
            targets: vec![
                EndpointTarget::new("auth", 40.0, 2.0),
                EndpointTarget::new("features", 50.0, 2.5),
                EndpointTarget::new("document", 35.0, 2.0),
            ],
        }
    }
}

impl CriteriaConfig {
    /// Load a criteria table from a TOML file
    ///
    /// # Example TOML
    /// ```toml
    /// max_diversion_rate = 0.05
    ///
    /// [[target]]
    /// endpoint = "auth"
    /// min_p95_improvement_pct = 40.0
    /// min_hit_multiplier = 2.0
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read criteria file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid criteria file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: CriteriaConfig =
            toml::from_str(content).context("Failed to parse TOML criteria table")?;
        config.validate().map_err(|e| anyhow::anyhow!(e))?;
        Ok(config)
    }

    /// Override the diversion ceiling
    pub fn with_max_diversion_rate(mut self, rate: f64) -> Self {
        self.max_diversion_rate = rate;
        self
    }

    pub fn target(&self, endpoint: &str) -> Option<&EndpointTarget> {
        self.targets.iter().find(|t| t.endpoint == endpoint)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.max_diversion_rate) {
            return Err(format!(
                "max_diversion_rate must be in [0, 1], got {}",
                self.max_diversion_rate
            ));
        }

        let mut seen = HashSet::new();
        for target in &self.targets {
            if target.endpoint.is_empty() {
                return Err("target endpoint name must not be empty".to_string());
            }
            if !seen.insert(target.endpoint.as_str()) {
                return Err(format!("duplicate target endpoint '{}'", target.endpoint));
            }
            if !target.min_p95_improvement_pct.is_finite() || target.min_p95_improvement_pct < 0.0 {
                return Err(format!(
                    "min_p95_improvement_pct for '{}' must be a non-negative number, got {}",
                    target.endpoint, target.min_p95_improvement_pct
                ));
            }
            if !target.min_hit_multiplier.is_finite() || target.min_hit_multiplier < 0.0 {
                return Err(format!(
                    "min_hit_multiplier for '{}' must be a non-negative number, got {}",
                    target.endpoint, target.min_hit_multiplier
                ));
            }
        }

        Ok(())
    }
}
