//! Scenario files: a line oriented description of an ocean and its traffic.
//!
//! ```text
//! # hidden terminal demo
//! mode ack
//! range 1200
//! node west  0    0 -200
//! node relay 1000 0 -200
//! node east  2000 0 -250
//! send 0.0 west relay 64
//! send 6.5 east relay 64
//! run 30
//! ```
//!
//! Distances are meters, times are seconds, payload sizes are bytes. Blank
//! lines and `#` comments are ignored.

pub mod builder;
pub mod parser;

pub use builder::{Scenario, SCENARIO_PROTOCOL};
pub use parser::{parse_scenario, ScenarioSpec};

use std::{fs, path::Path};

use thiserror::Error;

/// Everything that can go wrong between a scenario file and a running ocean.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("could not read the scenario: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: could not parse '{text}'")]
    Parse { line: usize, text: String },
    #[error("line {line}: {what} was already set")]
    Duplicate { line: usize, what: &'static str },
    #[error("a node named '{name}' already exists")]
    DuplicateNode { name: String },
    #[error("no node named '{name}'")]
    UnknownNode { name: String },
    #[error("the scenario never says how long to run")]
    MissingRun,
    #[error("the scenario defines no nodes")]
    NoNodes,
}

/// Reads a scenario file from disk and builds it into a runnable scenario.
pub fn load(path: impl AsRef<Path>) -> Result<Scenario, ScenarioError> {
    let text = fs::read_to_string(path)?;
    let spec = parse_scenario(&text)?;
    Scenario::build(&spec)
}
