//! Frames exchanged on the acoustic channel.

use std::fmt::Display;

use crate::{
    id::{MacAddr, ProtocolId},
    message::Message,
};

/// The role a frame plays in the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Rts,
    Cts,
    Warning,
    Data,
    Ack,
}

impl FrameKind {
    /// Whether the kind is one of the fixed-size control frames.
    pub fn is_control(self) -> bool {
        !matches!(self, FrameKind::Data)
    }
}

impl Display for FrameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FrameKind::Rts => "RTS",
            FrameKind::Cts => "CTS",
            FrameKind::Warning => "WRN",
            FrameKind::Data => "DATA",
            FrameKind::Ack => "ACK",
        };
        write!(f, "{name}")
    }
}

/// Handshake fields common to every frame.
///
/// Control frames echo the sequence id of the data unit under negotiation.
/// Data frames additionally carry the tag of the upper-layer protocol that
/// produced the payload, restored before delivery, and the attempt count at
/// the time of transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub kind: FrameKind,
    /// Per-node frame counter, advances on every frame built.
    pub frame_seq: u64,
    /// Sequence id of the data unit this frame negotiates.
    pub data_seq: u64,
    /// Transmission attempts made for that data unit so far.
    pub tries: u32,
    /// Tag of the protocol the payload belongs to. [`ProtocolId::HANDSHAKE`]
    /// for control frames.
    pub orig_protocol: ProtocolId,
}

/// A single frame.
///
/// Packets are single-owner values: handing one to the channel moves it, and
/// anything kept for retransmission is cloned explicitly beforehand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Tag of the protocol the frame itself belongs to. Receivers drop frames
    /// whose tag they do not speak.
    pub protocol: ProtocolId,
    pub src: MacAddr,
    pub dst: MacAddr,
    pub header: FrameHeader,
    /// Declared on-wire size in bytes; drives channel occupancy.
    pub size: u32,
    /// Payload bytes, empty for control frames.
    pub payload: Message,
}

/// Channel-side metadata attached to a completed reception.
///
/// `tx_begin` is the instant the sender started transmitting, stamped by the
/// channel under the simulator's shared clock; together with `rx_begin` it
/// yields the one-way propagation delay and thus the distance estimate. A
/// real deployment would need clock sync or round-trip ranging instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RxInfo {
    /// When the first bit left the sender.
    pub tx_begin: f64,
    /// When the first bit arrived here.
    pub rx_begin: f64,
    /// Set when the reception overlapped another one at this node.
    pub corrupt: bool,
}

impl RxInfo {
    /// One-way propagation delay of this reception in seconds.
    pub fn propagation_delay(&self) -> f64 {
        self.rx_begin - self.tx_begin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_kinds() {
        assert!(FrameKind::Rts.is_control());
        assert!(FrameKind::Ack.is_control());
        assert!(!FrameKind::Data.is_control());
    }

    #[test]
    fn kind_names() {
        assert_eq!(FrameKind::Warning.to_string(), "WRN");
        assert_eq!(FrameKind::Data.to_string(), "DATA");
    }

    #[test]
    fn propagation_delay() {
        let rx = RxInfo {
            tx_begin: 10.0,
            rx_begin: 10.25,
            corrupt: false,
        };
        assert!((rx.propagation_delay() - 0.25).abs() < 1e-12);
    }
}
