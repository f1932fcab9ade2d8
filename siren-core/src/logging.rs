use tracing::{event, Level};

use crate::{
    dacap::state::{Reason, State},
    id::{MacAddr, ProtocolId},
    packet::FrameKind,
};

/// Logging holds wrapper functions for protocol events.
/// Each function corresponds to one kind of event (transitions, frame
/// handling, deliveries) and is meant to be called from inside siren core.

/// State transition handler.
/// Captures the machine, both states and the reason for the move.
pub fn transition_event(mac: MacAddr, from: State, to: State, reason: Reason) {
    event!(target: "TRANSITION", Level::DEBUG, mac = mac.into_inner(), from = %from, to = %to, reason = %reason);
}

/// Frame transmission handler.
/// Logged when a frame is handed to the channel.
pub fn frame_tx_event(mac: MacAddr, kind: FrameKind, dst: MacAddr, size: u32) {
    event!(target: "FRAME_TX", Level::DEBUG, mac = mac.into_inner(), kind = %kind, dst = %dst, size = size);
}

/// Frame drop handler.
/// Logged when a reception is discarded instead of being processed.
pub fn frame_drop_event(mac: MacAddr, kind: FrameKind, reason: &str) {
    event!(target: "FRAME_DROP", Level::DEBUG, mac = mac.into_inner(), kind = %kind, reason = reason);
}

/// Data delivery handler.
/// Logged when a payload is handed up to the receiving node's upper layer.
pub fn delivery_event(mac: MacAddr, src: MacAddr, protocol: ProtocolId, len: usize) {
    event!(target: "DELIVERY", Level::INFO, mac = mac.into_inner(), src = %src, protocol = %protocol, len = len);
}
