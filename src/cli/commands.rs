//! CLI command implementations
//!
//! Every command loads the configuration, installs logging, opens the
//! durable store and performs exactly one operation. Requests come in on
//! stdin, results go out on stdout as one JSON object, and failures are
//! returned to `main`.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::chain::ChainVerification;
use crate::config::Config;
use crate::incident::IncidentId;
use crate::observability::init_logging;
use crate::priority::{score_priority, Post, RiskLevel, ScoreInput};
use crate::responder::{FixedReply, ResponseDrafter};
use crate::store::{FileStore, STORE_FILE_NAME};
use crate::tracker::IncidentTracker;

use super::args::{Command, ConfigArg, IncidentArg};
use super::errors::{CliError, CliResult};
use super::io::{read_request, read_text, write_response};

type Tracker = IncidentTracker<FileStore>;

/// Request body of `detect`
#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    pub title: String,
    pub source: String,
    #[serde(default)]
    pub risk_level: RiskLevel,
}

/// Request body of `respond`
#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub draft: String,
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Init(arg) => init(&arg.config),
        Command::Detect(arg) => detect(&arg),
        Command::Score(arg) => score(&arg),
        Command::Alert { target, mentions } => alert(&target, mentions),
        Command::Escalate { target, to } => escalate(&target, to),
        Command::Respond(target) => respond(&target),
        Command::Close(target) => close(&target),
        Command::Timeline(target) => timeline(&target),
        Command::Seal(target) => seal(&target),
        Command::Verify(arg) => verify(&arg),
    }
}

/// Create the data directory and an empty store.
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    install_logging(&config)?;
    let data_dir = config.data_path();

    if is_initialized(data_dir) {
        return Err(CliError::already_initialized());
    }

    fs::create_dir_all(data_dir).map_err(|e| {
        CliError::config_error(format!("Failed to create directory {:?}: {}", data_dir, e))
    })?;
    let store = FileStore::open(data_dir)?;

    write_response(json!({
        "initialized": true,
        "store": store.path().display().to_string()
    }))
}

pub fn detect(arg: &ConfigArg) -> CliResult<()> {
    let tracker = boot(&arg.config)?;
    let request: DetectRequest = read_request()?;
    write_response(detect_incident(&tracker, request)?)
}

pub fn score(arg: &ConfigArg) -> CliResult<()> {
    let tracker = boot(&arg.config)?;
    let request: Value = read_request()?;
    let level = score_request(&tracker, &request);
    write_response(json!({ "risk_level": level }))
}

pub fn alert(target: &IncidentArg, mentions: Option<i64>) -> CliResult<()> {
    let tracker = boot(&target.config.config)?;
    let id = IncidentId(target.id);
    let alerted = match mentions {
        Some(mentions) => tracker.evaluate_alert(id, mentions)?,
        None => tracker.alert(id)?,
    };
    write_response(json!({
        "alerted": alerted,
        "incident": tracker.get_incident(id)?
    }))
}

pub fn escalate(target: &IncidentArg, to: RiskLevel) -> CliResult<()> {
    let tracker = boot(&target.config.config)?;
    let id = IncidentId(target.id);
    let escalated = tracker.escalate(id, to)?;
    write_response(json!({
        "escalated": escalated,
        "incident": tracker.get_incident(id)?
    }))
}

/// The draft comes from an external generator; the CLI stores it as-is
/// after trimming.
pub fn respond(target: &IncidentArg) -> CliResult<()> {
    let tracker = Arc::new(boot(&target.config.config)?);
    let request: RespondRequest = read_request()?;
    write_response(respond_with(tracker, IncidentId(target.id), request)?)
}

pub fn close(target: &IncidentArg) -> CliResult<()> {
    let tracker = boot(&target.config.config)?;
    let incident = tracker.close(IncidentId(target.id))?;
    write_response(json!({ "incident": incident }))
}

pub fn timeline(target: &IncidentArg) -> CliResult<()> {
    let tracker = boot(&target.config.config)?;
    let events = tracker.get_timeline(IncidentId(target.id))?;
    write_response(json!({ "events": events }))
}

/// Seal a model reply. The reply is parsed leniently; text that is not
/// JSON is sealed as a default analysis.
pub fn seal(target: &IncidentArg) -> CliResult<()> {
    let tracker = Arc::new(boot(&target.config.config)?);
    let reply = read_text()?;
    write_response(seal_with(tracker, IncidentId(target.id), reply)?)
}

/// Verify the hash chain. Tampering is reported on stdout and then
/// returned as an error so the exit code is non-zero.
pub fn verify(arg: &ConfigArg) -> CliResult<()> {
    let tracker = boot(&arg.config)?;
    let (report, result) = verify_report(&tracker)?;
    write_response(report)?;

    match result.first_tampered {
        None => Ok(()),
        Some(ref tampered) => Err(CliError::chain_tampered(format!(
            "chain tampered at index {} (sequence {}); {} of {} entries untrusted",
            tampered.index,
            tampered.sequence,
            result.untrusted(),
            result.total
        ))),
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn is_initialized(data_dir: &Path) -> bool {
    data_dir.join(STORE_FILE_NAME).exists()
}

fn install_logging(config: &Config) -> CliResult<()> {
    init_logging(&config.log_filter, config.log_json)?;
    Ok(())
}

/// Load config, install logging and open the tracker on the durable store.
fn boot(config_path: &Path) -> CliResult<Tracker> {
    let config = Config::load(config_path)?;
    install_logging(&config)?;
    open_tracker(&config)
}

pub fn open_tracker(config: &Config) -> CliResult<Tracker> {
    let data_dir = config.data_path();
    if !is_initialized(data_dir) {
        return Err(CliError::not_initialized());
    }
    let store = FileStore::open(data_dir)?;
    Ok(IncidentTracker::new(Arc::new(store)).with_policy(config.alert_policy()))
}

pub fn detect_incident(tracker: &Tracker, request: DetectRequest) -> CliResult<Value> {
    if request.title.trim().is_empty() {
        return Err(CliError::invalid_request("title must not be empty"));
    }
    let incident = tracker.open_incident(&request.title, &request.source, request.risk_level)?;
    Ok(json!({ "incident": incident }))
}

/// Map a score request onto a call shape. Never fails.
///
/// - `{"post": {...}}`: full pipeline
/// - an object with `shares`: likes, comments, shares, text
/// - an object with any of `likes`, `comments`, `text`: likes, comments, text
/// - anything else: unrecognised
pub fn score_request(tracker: &Tracker, request: &Value) -> RiskLevel {
    let Some(fields) = request.as_object() else {
        return score_priority(ScoreInput::Unrecognized);
    };
    let count = |key: &str| fields.get(key).and_then(Value::as_i64);
    let text = fields.get("text").and_then(Value::as_str);

    if let Some(post) = fields.get("post") {
        return match Post::deserialize(post) {
            Ok(post) => tracker.score_post(&post),
            Err(_) => score_priority(ScoreInput::Unrecognized),
        };
    }
    if fields.contains_key("shares") {
        return score_priority(ScoreInput::EngagementWithShares {
            likes: count("likes"),
            comments: count("comments"),
            shares: count("shares"),
            text,
        });
    }
    if ["likes", "comments", "text"]
        .iter()
        .any(|key| fields.contains_key(*key))
    {
        return score_priority(ScoreInput::Engagement {
            likes: count("likes"),
            comments: count("comments"),
            text,
        });
    }
    score_priority(ScoreInput::Unrecognized)
}

/// Verification result plus the counters of this invocation.
pub fn verify_report(tracker: &Tracker) -> CliResult<(Value, ChainVerification)> {
    let result = tracker.verify_chain()?;
    let report = json!({
        "intact": result.is_intact(),
        "verification": result,
        "metrics": tracker.metrics()
    });
    Ok((report, result))
}

pub fn respond_with(
    tracker: Arc<Tracker>,
    id: IncidentId,
    request: RespondRequest,
) -> CliResult<Value> {
    let drafter = ResponseDrafter::new(tracker, Arc::new(FixedReply(request.draft)));
    let incident = drafter.draft(id, "")?;
    Ok(json!({ "incident": incident }))
}

pub fn seal_with(tracker: Arc<Tracker>, id: IncidentId, reply: String) -> CliResult<Value> {
    let drafter = ResponseDrafter::new(tracker, Arc::new(FixedReply(reply)));
    let (analysis, entry) = drafter.analyse(id, "")?;
    Ok(json!({ "analysis": analysis, "entry": entry }))
}
