//! Risk buckets

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Risk bucket, totally ordered `low < medium < high`.
///
/// The ordering is relied on for escalation checks ("did risk increase"),
/// so variants must stay in ascending order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

/// All buckets in ascending order.
pub const RISK_ORDER: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    /// True if moving from `self` to `to` raises risk.
    pub fn is_escalation_to(&self, to: RiskLevel) -> bool {
        to > *self
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(format!("unknown risk level: '{}'", other)),
        }
    }
}
