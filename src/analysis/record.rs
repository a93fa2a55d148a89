//! Claim-check analysis record

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::responder::JsonReply;

pub const DEFAULT_CLAIM: &str = "No Claim Extracted";
pub const MAX_CONFIDENCE: u8 = 100;

/// Verdict on the extracted claim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    True,
    Misleading,
    False,
    #[default]
    Unclear,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::True => "True",
            Verdict::Misleading => "Misleading",
            Verdict::False => "False",
            Verdict::Unclear => "Unclear",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = String;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(Verdict::True),
            "misleading" => Ok(Verdict::Misleading),
            "false" => Ok(Verdict::False),
            "unclear" => Ok(Verdict::Unclear),
            other => Err(format!("unknown verdict: '{}'", other)),
        }
    }
}

/// Structured result of checking a post's claim.
///
/// Built leniently from whatever the model returned: missing or malformed
/// fields take their defaults instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub claim: String,
    pub verdict: Verdict,
    /// 0..=100
    pub confidence: u8,
    pub explanation: String,
    pub sources: Vec<String>,
    pub pr_response: String,
}

impl Default for AnalysisRecord {
    fn default() -> Self {
        Self {
            claim: DEFAULT_CLAIM.to_string(),
            verdict: Verdict::Unclear,
            confidence: 0,
            explanation: String::new(),
            sources: Vec::new(),
            pr_response: String::new(),
        }
    }
}

impl AnalysisRecord {
    pub fn from_reply(reply: &JsonReply) -> Self {
        reply.as_value().map(Self::from_value).unwrap_or_default()
    }

    pub fn from_value(value: &Value) -> Self {
        let mut record = Self::default();
        let Some(fields) = value.as_object() else {
            return record;
        };

        if let Some(claim) = fields.get("claim").and_then(text) {
            record.claim = claim;
        }
        if let Some(verdict) = fields
            .get("verdict")
            .and_then(Value::as_str)
            .and_then(|v| v.parse().ok())
        {
            record.verdict = verdict;
        }
        if let Some(confidence) = fields.get("confidence").and_then(confidence) {
            record.confidence = confidence;
        }
        if let Some(explanation) = fields.get("explanation").and_then(text) {
            record.explanation = explanation;
        }
        if let Some(pr_response) = fields.get("pr_response").and_then(text) {
            record.pr_response = pr_response;
        }
        record.sources = match fields.get("sources") {
            Some(Value::Array(items)) => items.iter().filter_map(text).collect(),
            Some(Value::String(single)) if !single.is_empty() => vec![single.clone()],
            _ => Vec::new(),
        };

        record
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn confidence(value: &Value) -> Option<u8> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok()?,
        _ => return None,
    };
    if raw.is_nan() {
        return None;
    }
    Some(raw.round().clamp(0.0, MAX_CONFIDENCE as f64) as u8)
}
