//! A simulated node: a handshake engine moored at a point in the water.

use crate::{
    config::DacapConfig,
    dacap::Dacap,
    id::{MacAddr, ProtocolId},
    message::Message,
};

/// A point in the water column, in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Straight-line distance to another position, in meters.
    pub fn distance(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// A payload the engine handed to the upper layer.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Virtual time the payload came up, in seconds.
    pub at: f64,
    /// Address of the node that sent it.
    pub src: MacAddr,
    /// The protocol tag the sender's upper layer used.
    pub protocol: ProtocolId,
    pub payload: Message,
}

/// A node in the ocean.
///
/// Holds the engine and the node's fixed position, along with everything the
/// engine has delivered upward so far. Movement is out of scope; positions
/// are set once when the node is added.
pub struct Node {
    mac: Dacap,
    position: Position,
    delivered: Vec<Delivery>,
}

impl Node {
    pub fn new(addr: MacAddr, position: Position, config: DacapConfig, seed: u64) -> Self {
        Self {
            mac: Dacap::new(addr, config, seed),
            position,
            delivered: Vec::new(),
        }
    }

    pub fn addr(&self) -> MacAddr {
        self.mac.addr()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn mac(&self) -> &Dacap {
        &self.mac
    }

    pub fn mac_mut(&mut self) -> &mut Dacap {
        &mut self.mac
    }

    /// Payloads delivered to this node's upper layer, oldest first.
    pub fn delivered(&self) -> &[Delivery] {
        &self.delivered
    }

    pub(crate) fn record_delivery(&mut self, delivery: Delivery) {
        self.delivered.push(delivery);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 12.0);
        assert_eq!(a.distance(&b), 13.0);
        assert_eq!(b.distance(&a), 13.0);
    }

    #[test]
    fn node_starts_with_nothing_delivered() {
        let node = Node::new(
            MacAddr::new(1),
            Position::new(0.0, 0.0, -50.0),
            DacapConfig::default(),
            7,
        );
        assert_eq!(node.addr(), MacAddr::new(1));
        assert!(node.delivered().is_empty());
    }
}
