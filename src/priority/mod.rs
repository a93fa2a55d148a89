//! Priority and risk scoring
//!
//! - `RiskLevel` and its published order `RISK_ORDER`
//! - Source weights and alert thresholds
//! - `score_priority`, the total scoring entry point

mod post;
mod risk;
mod scorer;
mod weights;

pub use post::{Engagement, Post};
pub use risk::{RiskLevel, RISK_ORDER};
pub use scorer::{
    classify_mentions, compute_risk, score_priority, PostPipeline, ScoreInput, HIGH_MENTIONS,
    MEDIUM_MENTIONS,
};
pub use weights::{
    should_alert, source_weight, AlertPolicy, MIN_ALERT_MENTIONS, MIN_ALERT_RISK,
    SOURCE_WEIGHTS,
};
