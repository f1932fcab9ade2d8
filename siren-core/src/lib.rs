//! A discrete event simulator for underwater acoustic networks built around a
//! distance-aware collision avoidance MAC.
//!
//! Sound crawls through water at 1500 m/s, so a handshake across a kilometer
//! long link spends most of its life in flight. The engine simulated here
//! negotiates the channel with an RTS/CTS exchange and measures the distance
//! to its peer from propagation delay, holding data back just long enough to
//! dodge collisions it can see coming. Short warning frames let a receiver
//! abort a handshake that overheard traffic is about to ruin.
//!
//! # Uses
//!
//! - Evaluate handshake tunables against a deployment's geometry before
//!   committing hardware to sea trials.
//! - Reproduce protocol pathologies such as hidden terminals or interrupted
//!   backoffs in a controlled, deterministic setting.
//!
//! # Organization
//!
//! - [`Message`] and the frame types in [`packet`] move bytes around
//! - [`Dacap`](dacap::Dacap) is the per-node handshake engine, driven entirely
//!   through explicit inputs and drained [`Action`](dacap::Action)s
//! - [`Ocean`] provides the actual simulation: the event loop plus
//!   propagation delays and overlap corruption

mod logging;

pub mod message;
pub use message::Message;

pub mod packet;
pub use packet::{FrameHeader, FrameKind, Packet, RxInfo};

pub mod config;
pub use config::{AckMode, DacapConfig, SOUND_SPEED};

pub mod dacap;
pub use dacap::Dacap;

pub mod event;

pub mod node;
pub use node::{Delivery, Node, Position};

pub mod ocean;
pub use ocean::Ocean;

pub mod id;
pub use id::{MacAddr, ProtocolId};
