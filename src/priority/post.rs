//! Detected posts and their engagement signals

use serde::{Deserialize, Serialize};

/// Engagement counts for one mention. Missing counts are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
}

impl Engagement {
    pub fn new(likes: Option<i64>, comments: Option<i64>, shares: Option<i64>) -> Self {
        Self {
            likes: likes.unwrap_or(0),
            comments: comments.unwrap_or(0),
            shares: shares.unwrap_or(0),
        }
    }

    /// `likes + comments + shares`, saturating.
    pub fn mentions(&self) -> i64 {
        self.likes
            .saturating_add(self.comments)
            .saturating_add(self.shares)
    }
}

/// A post record handed over by the content store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub id: Option<u64>,
    /// news, reddit, youtube, web, manual
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub likes: Option<i64>,
    #[serde(default)]
    pub comments: Option<i64>,
    #[serde(default)]
    pub shares: Option<i64>,
    /// Priority tag assigned upstream (Low, Medium, High)
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub analysed: bool,
}

impl Post {
    pub fn engagement(&self) -> Engagement {
        Engagement::new(self.likes, self.comments, self.shares)
    }

    /// Base score from the priority tag: high 0.9, medium 0.6, otherwise 0.3.
    pub fn base_score(&self) -> f64 {
        let tag = self
            .priority
            .as_deref()
            .map(|p| p.trim().to_ascii_lowercase())
            .unwrap_or_default();
        match tag.as_str() {
            "high" => 0.9,
            "medium" => 0.6,
            _ => 0.3,
        }
    }
}
