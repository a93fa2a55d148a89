//! Risk scoring entry point
//!
//! `score_priority` is total: every input shape, including unrecognised
//! ones and failing pipelines, yields a bucket. Scoring must never block an
//! upstream collector, so failures degrade to `low` instead of propagating.

use super::post::{Engagement, Post};
use super::risk::RiskLevel;
use crate::observability::Event;
use crate::tracker::TrackerError;

/// Mentions at or above this are `high`.
pub const HIGH_MENTIONS: i64 = 20;

/// Mentions at or above this (and below `HIGH_MENTIONS`) are `medium`.
pub const MEDIUM_MENTIONS: i64 = 5;

/// Bucket a mention count.
pub fn classify_mentions(mentions: i64) -> RiskLevel {
    if mentions >= HIGH_MENTIONS {
        RiskLevel::High
    } else if mentions >= MEDIUM_MENTIONS {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Pure risk computation from engagement signals.
pub fn compute_risk(engagement: &Engagement) -> RiskLevel {
    classify_mentions(engagement.mentions())
}

/// Applies a post to the incident it belongs to and reports the incident's
/// stored risk level.
pub trait PostPipeline {
    fn apply_post(&self, post: &Post) -> Result<RiskLevel, TrackerError>;

    /// Called when `score_priority` had to fall back to `low`.
    fn note_fallback(&self) {}
}

/// The call shapes accepted by `score_priority`.
pub enum ScoreInput<'a> {
    /// likes, comments, text.
    ///
    /// The text sits where the four-value shape carries shares; a non-empty
    /// text counts as one mention.
    Engagement {
        likes: Option<i64>,
        comments: Option<i64>,
        text: Option<&'a str>,
    },
    /// likes, comments, shares, text. The text is not scored.
    EngagementWithShares {
        likes: Option<i64>,
        comments: Option<i64>,
        shares: Option<i64>,
        text: Option<&'a str>,
    },
    /// Look up or create the post's incident and return its stored level.
    Pipeline {
        pipeline: &'a dyn PostPipeline,
        post: &'a Post,
    },
    /// Anything else.
    Unrecognized,
}

/// Score one input. Never fails.
pub fn score_priority(input: ScoreInput<'_>) -> RiskLevel {
    match input {
        ScoreInput::Engagement {
            likes,
            comments,
            text,
        } => {
            let text_mention = match text {
                Some(t) if !t.is_empty() => 1,
                _ => 0,
            };
            compute_risk(&Engagement::new(likes, comments, Some(text_mention)))
        }
        ScoreInput::EngagementWithShares {
            likes,
            comments,
            shares,
            ..
        } => compute_risk(&Engagement::new(likes, comments, shares)),
        ScoreInput::Pipeline { pipeline, post } => match pipeline.apply_post(post) {
            Ok(level) => level,
            Err(e) => {
                tracing::warn!(
                    event = %Event::ScoreFallback,
                    error = %e,
                    "full scoring pipeline failed; using low"
                );
                pipeline.note_fallback();
                RiskLevel::Low
            }
        },
        ScoreInput::Unrecognized => {
            tracing::debug!(event = %Event::ScoreFallback, "unrecognised score input");
            RiskLevel::Low
        }
    }
}
