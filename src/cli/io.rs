//! JSON I/O handling for CLI
//!
//! - Input: one JSON object on stdin, or raw text for commands that take
//!   generated text
//! - Output: one JSON object on stdout, `{"status": "ok", "data": ...}`
//! - UTF-8 only

use std::io::{self, BufRead, Read, Write};

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Read a single-line JSON request from stdin
pub fn read_request<T: DeserializeOwned>() -> CliResult<T> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    parse_request(&line)
}

pub fn parse_request<T: DeserializeOwned>(line: &str) -> CliResult<T> {
    if line.trim().is_empty() {
        return Err(CliError::invalid_request("Empty input"));
    }
    Ok(serde_json::from_str(line)?)
}

/// Read all of stdin as text
pub fn read_text() -> CliResult<String> {
    let mut text = String::new();
    io::stdin().lock().read_to_string(&mut text)?;
    if text.trim().is_empty() {
        return Err(CliError::invalid_request("Empty input"));
    }
    Ok(text)
}

/// Wrap `data` in the success envelope
pub fn success_envelope(data: Value) -> Value {
    serde_json::json!({
        "status": "ok",
        "data": data
    })
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, &success_envelope(data))?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}
