//! Parses the scenario file format.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{space1, u32 as integer_u32, u64 as integer_u64},
    combinator::{all_consuming, value},
    error::{context, VerboseError},
    number::complete::double,
    sequence::{preceded, tuple},
    IResult,
};
use siren_core::{AckMode, Position};

use super::ScenarioError;

pub type Res<T, U> = IResult<T, U, VerboseError<T>>;

/// A node declaration: a name and where the node is moored.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub name: String,
    pub position: Position,
}

/// One payload handoff: `bytes` of traffic queued at `from` for `to`.
#[derive(Debug, Clone, PartialEq)]
pub struct SendSpec {
    pub at: f64,
    pub from: String,
    pub to: String,
    pub bytes: u32,
}

/// A whole scenario file in parsed form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioSpec {
    pub mode: Option<AckMode>,
    pub range: Option<f64>,
    pub seed: Option<u64>,
    pub nodes: Vec<NodeSpec>,
    pub traffic: Vec<SendSpec>,
    pub horizon: Option<f64>,
}

/// One parsed line.
#[derive(Debug, Clone, PartialEq)]
enum Directive {
    Mode(AckMode),
    Range(f64),
    Seed(u64),
    Node(NodeSpec),
    Send(SendSpec),
    Run(f64),
}

/// Parses the text of a scenario file into its directives.
pub fn parse_scenario(text: &str) -> Result<ScenarioSpec, ScenarioError> {
    let mut spec = ScenarioSpec::default();
    for (index, raw) in text.lines().enumerate() {
        let line = match raw.find('#') {
            Some(pos) => &raw[..pos],
            None => raw,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match all_consuming(directive)(line) {
            Ok((_, parsed)) => apply(&mut spec, parsed, index + 1)?,
            Err(_) => {
                return Err(ScenarioError::Parse {
                    line: index + 1,
                    text: line.to_string(),
                })
            }
        }
    }
    Ok(spec)
}

fn apply(spec: &mut ScenarioSpec, directive: Directive, line: usize) -> Result<(), ScenarioError> {
    match directive {
        Directive::Mode(mode) => {
            if spec.mode.replace(mode).is_some() {
                return Err(ScenarioError::Duplicate { line, what: "mode" });
            }
        }
        Directive::Range(meters) => {
            if spec.range.replace(meters).is_some() {
                return Err(ScenarioError::Duplicate {
                    line,
                    what: "range",
                });
            }
        }
        Directive::Seed(seed) => {
            if spec.seed.replace(seed).is_some() {
                return Err(ScenarioError::Duplicate { line, what: "seed" });
            }
        }
        Directive::Run(horizon) => {
            if spec.horizon.replace(horizon).is_some() {
                return Err(ScenarioError::Duplicate { line, what: "run" });
            }
        }
        Directive::Node(node) => {
            if spec.nodes.iter().any(|other| other.name == node.name) {
                return Err(ScenarioError::DuplicateNode { name: node.name });
            }
            spec.nodes.push(node);
        }
        Directive::Send(send) => spec.traffic.push(send),
    }
    Ok(())
}

fn directive(input: &str) -> Res<&str, Directive> {
    context("directive", alt((node, send, mode, range, seed, run)))(input)
}

/// Node and scenario names: letters, digits, `_`, and `-`.
fn identifier(input: &str) -> Res<&str, &str> {
    context(
        "identifier",
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
    )(input)
}

fn mode(input: &str) -> Res<&str, Directive> {
    context(
        "mode",
        preceded(
            tuple((tag("mode"), space1)),
            alt((
                value(AckMode::NoAck, tag("no-ack")),
                value(AckMode::Ack, tag("ack")),
            )),
        ),
    )(input)
    .map(|(rest, mode)| (rest, Directive::Mode(mode)))
}

fn range(input: &str) -> Res<&str, Directive> {
    context("range", preceded(tuple((tag("range"), space1)), double))(input)
        .map(|(rest, meters)| (rest, Directive::Range(meters)))
}

fn seed(input: &str) -> Res<&str, Directive> {
    context("seed", preceded(tuple((tag("seed"), space1)), integer_u64))(input)
        .map(|(rest, seed)| (rest, Directive::Seed(seed)))
}

fn node(input: &str) -> Res<&str, Directive> {
    context(
        "node",
        tuple((
            preceded(tuple((tag("node"), space1)), identifier),
            preceded(space1, double),
            preceded(space1, double),
            preceded(space1, double),
        )),
    )(input)
    .map(|(rest, (name, x, y, z))| {
        (
            rest,
            Directive::Node(NodeSpec {
                name: name.to_string(),
                position: Position::new(x, y, z),
            }),
        )
    })
}

fn send(input: &str) -> Res<&str, Directive> {
    context(
        "send",
        tuple((
            preceded(tuple((tag("send"), space1)), double),
            preceded(space1, identifier),
            preceded(space1, identifier),
            preceded(space1, integer_u32),
        )),
    )(input)
    .map(|(rest, (at, from, to, bytes))| {
        (
            rest,
            Directive::Send(SendSpec {
                at,
                from: from.to_string(),
                to: to.to_string(),
                bytes,
            }),
        )
    })
}

fn run(input: &str) -> Res<&str, Directive> {
    context("run", preceded(tuple((tag("run"), space1)), double))(input)
        .map(|(rest, horizon)| (rest, Directive::Run(horizon)))
}
