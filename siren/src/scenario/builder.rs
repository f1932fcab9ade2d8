//! Turns a parsed scenario into a ready to run ocean.

use rustc_hash::FxHashMap;
use siren_core::{AckMode, DacapConfig, MacAddr, Message, Ocean, ProtocolId};
use tracing::info;

use super::{parser::ScenarioSpec, ScenarioError};

/// The protocol tag scenario traffic travels under.
pub const SCENARIO_PROTOCOL: ProtocolId = ProtocolId::new(0x0cea);

/// Seed used when the scenario does not pick one.
const DEFAULT_SEED: u64 = 0xb0a7;

/// A scenario bound to an ocean, ready to run.
pub struct Scenario {
    ocean: Ocean,
    names: Vec<(String, MacAddr)>,
    horizon: f64,
}

impl Scenario {
    /// Builds the ocean a parsed scenario describes.
    pub fn build(spec: &ScenarioSpec) -> Result<Self, ScenarioError> {
        if spec.nodes.is_empty() {
            return Err(ScenarioError::NoNodes);
        }
        let horizon = spec.horizon.ok_or(ScenarioError::MissingRun)?;

        let mut ocean = Ocean::new();
        if let Some(range) = spec.range {
            ocean = ocean.with_transmission_range(range);
        }
        let config = DacapConfig {
            ack_mode: spec.mode.unwrap_or(AckMode::Ack),
            ..DacapConfig::default()
        };
        let seed = spec.seed.unwrap_or(DEFAULT_SEED);

        let mut by_name: FxHashMap<&str, MacAddr> = FxHashMap::default();
        let mut names = Vec::with_capacity(spec.nodes.len());
        for (index, node) in spec.nodes.iter().enumerate() {
            let addr = ocean.add_node(
                node.position,
                config.clone(),
                seed.wrapping_add(index as u64),
            );
            by_name.insert(node.name.as_str(), addr);
            names.push((node.name.clone(), addr));
        }

        for send in &spec.traffic {
            let from = resolve(&by_name, &send.from)?;
            let to = resolve(&by_name, &send.to)?;
            ocean.send_at(send.at, from, to, SCENARIO_PROTOCOL, payload(send.bytes));
        }

        Ok(Self {
            ocean,
            names,
            horizon,
        })
    }

    /// Runs the ocean out to the scenario's horizon.
    pub fn run(&mut self) {
        info!(
            nodes = self.names.len(),
            horizon = self.horizon,
            "scenario started"
        );
        self.ocean.run_until(self.horizon);
    }

    pub fn ocean(&self) -> &Ocean {
        &self.ocean
    }

    /// Node names and addresses in declaration order.
    pub fn names(&self) -> &[(String, MacAddr)] {
        &self.names
    }

    pub fn horizon(&self) -> f64 {
        self.horizon
    }
}

fn resolve(by_name: &FxHashMap<&str, MacAddr>, name: &str) -> Result<MacAddr, ScenarioError> {
    by_name.get(name).copied().ok_or_else(|| {
        ScenarioError::UnknownNode {
            name: name.to_string(),
        }
    })
}

fn payload(bytes: u32) -> Message {
    Message::new(vec![0x5a; bytes as usize])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::parse_scenario;

    #[test]
    fn builds_and_runs_a_pair() {
        let text = "node a 0 0 -100\nnode b 1500 0 -100\nsend 0 a b 16\nrun 10\n";
        let spec = parse_scenario(text).unwrap();
        let mut scenario = Scenario::build(&spec).unwrap();
        scenario.run();

        let addr = scenario.names()[1].1;
        let delivered = scenario.ocean().node(addr).unwrap().delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].payload.len(), 16);
        assert_eq!(delivered[0].protocol, SCENARIO_PROTOCOL);
    }

    #[test]
    fn unknown_traffic_endpoint_is_an_error() {
        let spec = parse_scenario("node a 0 0 0\nsend 0 a ghost 8\nrun 5\n").unwrap();
        assert!(matches!(
            Scenario::build(&spec),
            Err(ScenarioError::UnknownNode { .. })
        ));
    }

    #[test]
    fn missing_run_is_an_error() {
        let spec = parse_scenario("node a 0 0 0\n").unwrap();
        assert!(matches!(
            Scenario::build(&spec),
            Err(ScenarioError::MissingRun)
        ));
    }
}
