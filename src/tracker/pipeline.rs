//! Full scoring pipeline
//!
//! A post is folded into the incident keyed by its truncated text and
//! platform. The incident is created at `low` if it does not exist yet,
//! takes the post's weighted score as its `risk_score`, and enters
//! monitoring once the post's mentions reach the policy threshold. The
//! stored `risk_level` is what gets reported back, not anything computed
//! from this post. A closed incident is reported but left untouched.

use super::errors::TrackerResult;
use super::lifecycle::IncidentTracker;
use super::locks::LockKey;
use crate::incident::{truncate_title, Incident, NewIncident};
use crate::priority::{score_priority, source_weight, Post, PostPipeline, RiskLevel, ScoreInput};
use crate::store::Store;

impl<S: Store> IncidentTracker<S> {
    /// Score a post through the full pipeline. Never fails: any error is
    /// logged and scored `low`.
    pub fn score_post(&self, post: &Post) -> RiskLevel {
        score_priority(ScoreInput::Pipeline {
            pipeline: self,
            post,
        })
    }

    /// Look up the incident for `(title, source)`, creating it at `low` if
    /// there is none.
    pub fn find_or_open(&self, title: &str, source: &str) -> TrackerResult<Incident> {
        let key = LockKey::Identity {
            title: truncate_title(title),
            source: source.to_string(),
        };
        self.locks.with(key, || match self.store.find_incident(title, source)? {
            Some(existing) => Ok(existing),
            None => self.open(NewIncident::new(
                title,
                source,
                RiskLevel::Low,
                self.clock.now(),
            )),
        })
    }
}

impl<S: Store> PostPipeline for IncidentTracker<S> {
    fn apply_post(&self, post: &Post) -> TrackerResult<RiskLevel> {
        let incident = self.find_or_open(&post.text, &post.platform)?;
        let risk_score = post.base_score() * source_weight(&post.platform);
        let mentions = post.engagement().mentions();

        self.mutate(incident.id, |incident| {
            if incident.status.is_terminal() {
                return Ok(incident.risk_level);
            }
            if incident.risk_score != Some(risk_score) {
                incident.risk_score = Some(risk_score);
                self.store.update_incident(incident)?;
            }
            if self.policy.should_monitor(mentions) {
                self.apply_monitoring(incident)?;
            }
            Ok(incident.risk_level)
        })
    }

    fn note_fallback(&self) {
        self.metrics.increment_score_fallbacks();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incident::{IncidentStatus, TITLE_MAX_CHARS};
    use crate::ledger::EventType;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn post(text: &str, platform: &str, likes: i64) -> Post {
        Post {
            platform: platform.to_string(),
            text: text.to_string(),
            likes: Some(likes),
            priority: Some("High".to_string()),
            ..Post::default()
        }
    }

    fn tracker() -> IncidentTracker<MemoryStore> {
        IncidentTracker::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_creates_incident_at_low() {
        let tracker = tracker();
        let level = tracker.score_post(&post("Brand leaks data", "news", 1));

        assert_eq!(level, RiskLevel::Low);
        let incidents = tracker.list_incidents().unwrap();
        assert_eq!(incidents.len(), 1);
        assert_eq!(incidents[0].status, IncidentStatus::Open);
        assert_eq!(incidents[0].risk_score, Some(0.9));
    }

    #[test]
    fn test_reuses_incident_and_returns_stored_level() {
        let tracker = tracker();
        tracker.score_post(&post("same", "reddit", 0));
        let id = tracker.list_incidents().unwrap()[0].id;
        tracker.escalate(id, RiskLevel::High).unwrap();

        assert_eq!(tracker.score_post(&post("same", "reddit", 0)), RiskLevel::High);
        assert_eq!(tracker.list_incidents().unwrap().len(), 1);
    }

    #[test]
    fn test_same_text_other_source_is_separate() {
        let tracker = tracker();
        tracker.score_post(&post("same", "reddit", 0));
        tracker.score_post(&post("same", "youtube", 0));
        assert_eq!(tracker.list_incidents().unwrap().len(), 2);
    }

    #[test]
    fn test_mentions_threshold_enters_monitoring() {
        let tracker = tracker();
        tracker.score_post(&post("quiet", "web", 2));
        tracker.score_post(&post("loud", "web", 3));

        let incidents = tracker.list_incidents().unwrap();
        assert_eq!(incidents[0].status, IncidentStatus::Open);
        assert_eq!(incidents[1].status, IncidentStatus::Monitoring);

        let types: Vec<EventType> = tracker
            .get_timeline(incidents[1].id)
            .unwrap()
            .into_iter()
            .map(|e| e.event_type)
            .collect();
        assert_eq!(types, vec![EventType::Detected, EventType::StatusChanged]);
    }

    #[test]
    fn test_long_text_truncated_key() {
        let tracker = tracker();
        let long = "x".repeat(TITLE_MAX_CHARS + 50);
        let longer = "x".repeat(TITLE_MAX_CHARS + 80);
        tracker.score_post(&post(&long, "news", 0));
        tracker.score_post(&post(&longer, "news", 0));

        let incidents = tracker.list_incidents().unwrap();
        assert_eq!(incidents.len(), 1);
        assert_eq!(incidents[0].title.chars().count(), TITLE_MAX_CHARS);
    }

    #[test]
    fn test_closed_incident_still_scores() {
        let tracker = tracker();
        tracker.score_post(&post("done", "news", 0));
        let id = tracker.list_incidents().unwrap()[0].id;
        tracker.close(id).unwrap();

        assert_eq!(tracker.score_post(&post("done", "news", 50)), RiskLevel::Low);
        assert_eq!(
            tracker.get_incident(id).unwrap().status,
            IncidentStatus::Closed
        );
        assert_eq!(tracker.metrics().score_fallbacks, 0);
    }
}
