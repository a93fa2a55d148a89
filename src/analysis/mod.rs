//! Claim-check analysis
//!
//! An `AnalysisRecord` is the content-bearing artifact the hash chain
//! protects. It is built from a parsed model reply and sealed with
//! `IncidentTracker::seal_analysis`.

mod record;

pub use record::{AnalysisRecord, Verdict, DEFAULT_CLAIM, MAX_CONFIDENCE};
