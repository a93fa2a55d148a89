//! CLI argument definitions using clap
//!
//! Commands:
//! - neurochain init --config <path>
//! - neurochain detect --config <path>          (JSON request on stdin)
//! - neurochain score --config <path>           (JSON request on stdin)
//! - neurochain alert --id <n> [--mentions <m>]
//! - neurochain escalate --id <n> --to <risk>
//! - neurochain respond --id <n>                (JSON {"draft": ...} on stdin)
//! - neurochain close --id <n>
//! - neurochain timeline --id <n>
//! - neurochain seal --id <n>                   (model reply on stdin)
//! - neurochain verify

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_PATH;
use crate::priority::RiskLevel;

/// NeuroChain - incident tracking with a tamper-evident audit ledger
#[derive(Parser, Debug)]
#[command(name = "neurochain")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every command
#[derive(Args, Debug, Clone)]
pub struct ConfigArg {
    /// Path to configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}

/// Options for commands acting on one incident
#[derive(Args, Debug, Clone)]
pub struct IncidentArg {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Incident id
    #[arg(long)]
    pub id: u64,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the data directory and an empty store
    Init(ConfigArg),

    /// Open an incident from {"title", "source", "risk_level"?}
    Detect(ConfigArg),

    /// Score engagement counts or a full post record
    Score(ConfigArg),

    /// Mark an incident alerted, or check the alert policy with --mentions
    Alert {
        #[command(flatten)]
        target: IncidentArg,

        /// Mention count to check against the alert policy
        #[arg(long)]
        mentions: Option<i64>,
    },

    /// Raise an incident's risk level
    Escalate {
        #[command(flatten)]
        target: IncidentArg,

        /// Target risk level: low, medium or high
        #[arg(long, value_parser = parse_risk)]
        to: RiskLevel,
    },

    /// Store a generated response draft read from stdin
    Respond(IncidentArg),

    /// Close an incident
    Close(IncidentArg),

    /// Print an incident's lifecycle events
    Timeline(IncidentArg),

    /// Seal a claim analysis (model reply on stdin) into the hash chain
    Seal(IncidentArg),

    /// Verify the hash chain from genesis
    Verify(ConfigArg),
}

fn parse_risk(s: &str) -> Result<RiskLevel, String> {
    s.parse()
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
