mod config;
mod policy;

pub use config::RuleThresholds;

use super::domain::NormalizedSample;
use serde::{Deserialize, Serialize};

/// Which rule produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityRule {
    Bradycardia,
    Tachycardia,
    Fall,
    None,
}

impl SeverityRule {
    pub fn label(&self) -> &'static str {
        match self {
            SeverityRule::Bradycardia => "bradycardia",
            SeverityRule::Tachycardia => "tachycardia",
            SeverityRule::Fall => "fall",
            SeverityRule::None => "none",
        }
    }
}

/// Result of evaluating one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyOutcome {
    pub triggered: bool,
    pub reason: Option<String>,
    pub rule: SeverityRule,
}

impl EmergencyOutcome {
    pub fn clear() -> Self {
        Self {
            triggered: false,
            reason: None,
            rule: SeverityRule::None,
        }
    }

    fn matched(rule: SeverityRule, reason: String) -> Self {
        Self {
            triggered: true,
            reason: Some(reason),
            rule,
        }
    }
}

/// Stateless evaluator applying the ordered rule set; the first matching rule wins.
#[derive(Debug, Clone, Default)]
pub struct RuleEngine {
    thresholds: RuleThresholds,
}

impl RuleEngine {
    pub fn new(thresholds: RuleThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &RuleThresholds {
        &self.thresholds
    }

    pub fn evaluate(&self, sample: &NormalizedSample) -> EmergencyOutcome {
        policy::RULE_ORDER
            .iter()
            .find_map(|rule| {
                policy::check(*rule, sample, &self.thresholds)
                    .map(|reason| EmergencyOutcome::matched(*rule, reason))
            })
            .unwrap_or_else(EmergencyOutcome::clear)
    }
}
