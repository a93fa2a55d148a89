//! CLI module for neurochain
//!
//! One process per operation: load config, open the store, run one
//! command, print one JSON result.

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, ConfigArg, IncidentArg};
pub use commands::{
    detect_incident, open_tracker, respond_with, run, run_command, score_request, seal_with,
    verify_report, DetectRequest, RespondRequest,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, read_text, write_response};
