//! Source weights and alert thresholds

use serde::{Deserialize, Serialize};

use super::risk::RiskLevel;

/// Weight per origin tag. Unlisted sources use `unknown`.
pub const SOURCE_WEIGHTS: [(&str, f64); 6] = [
    ("news", 1.0),
    ("youtube", 0.85),
    ("reddit", 0.7),
    ("twitter", 0.6),
    ("web", 0.5),
    ("unknown", 0.4),
];

/// Minimum risk for an alert.
pub const MIN_ALERT_RISK: RiskLevel = RiskLevel::Medium;

/// Minimum mention count for an alert.
pub const MIN_ALERT_MENTIONS: i64 = 3;

/// Weight for `source`, case-insensitive.
pub fn source_weight(source: &str) -> f64 {
    let source = source.trim().to_ascii_lowercase();
    SOURCE_WEIGHTS
        .iter()
        .find(|(name, _)| *name == source)
        .or_else(|| SOURCE_WEIGHTS.iter().find(|(name, _)| *name == "unknown"))
        .map(|(_, w)| *w)
        .unwrap_or(0.4)
}

/// Thresholds used to decide alerting and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertPolicy {
    pub min_risk: RiskLevel,
    pub min_mentions: i64,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            min_risk: MIN_ALERT_RISK,
            min_mentions: MIN_ALERT_MENTIONS,
        }
    }
}

impl AlertPolicy {
    /// True iff `risk >= min_risk` and `mentions >= min_mentions`.
    pub fn should_alert(&self, risk: RiskLevel, mentions: i64) -> bool {
        risk >= self.min_risk && mentions >= self.min_mentions
    }

    /// True iff the mention count alone warrants monitoring.
    pub fn should_monitor(&self, mentions: i64) -> bool {
        mentions >= self.min_mentions
    }
}

/// `should_alert` with the default thresholds.
pub fn should_alert(risk: RiskLevel, mentions: i64) -> bool {
    AlertPolicy::default().should_alert(risk, mentions)
}
