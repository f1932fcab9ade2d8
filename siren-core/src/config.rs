//! Protocol configuration.

use std::fmt::Display;

/// Speed of sound underwater, meters per second.
///
/// The protocol's whole reason to exist: at 1500 m/s a kilometer of range
/// costs two thirds of a second per handshake leg.
pub const SOUND_SPEED: f64 = 1500.0;

/// Whether data transmissions are acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckMode {
    /// Every data frame is answered with an ACK; senders retry on silence.
    Ack,
    /// Fire and forget; the queue advances as soon as the data frame leaves.
    NoAck,
}

impl Display for AckMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AckMode::Ack => write!(f, "ack"),
            AckMode::NoAck => write!(f, "no-ack"),
        }
    }
}

/// Tunables of the handshake engine.
///
/// Durations are seconds, sizes are bytes, `delta_d` is meters. Each `Option`
/// field lifts its limit when `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct DacapConfig {
    pub ack_mode: AckMode,
    /// Minimum duration of a full handshake.
    pub t_min: f64,
    /// Minimum warning-window duration (ACK mode).
    pub t_w_min: f64,
    /// Propagation margin distance, meters.
    pub delta_d: f64,
    /// Allowance for payload-length variation, seconds.
    pub delta_data: f64,
    /// One-way propagation delay at maximum range, seconds.
    pub max_prop_delay: f64,
    /// Scales every backoff draw.
    pub backoff_tuner: f64,
    /// Fixed slack added to the handshake timeouts.
    pub wait_constant: f64,
    /// Modem throughput, bits per second. Transmission durations for both
    /// ends of a link derive from it.
    pub bit_rate: f64,
    pub rts_size: u32,
    pub cts_size: u32,
    pub warning_size: u32,
    pub ack_size: u32,
    /// Overhead added to every data frame and stripped before delivery.
    pub header_size: u32,
    /// Assumed payload size when the queue is empty and a data duration is
    /// still needed for a timeout formula.
    pub max_payload: u32,
    /// Attempts before a payload is dropped. `None` retries forever.
    pub max_tx_tries: Option<u32>,
    /// Queue capacity. `None` is unbounded.
    pub buffer_capacity: Option<usize>,
    /// Cap on the backoff exponent. `None` leaves it uncapped.
    pub max_backoff_counter: Option<u32>,
    /// Whether a node with more queued traffic recontends right after its own
    /// exchange instead of falling back to idle.
    pub multihop: bool,
    /// Whether an interrupted backoff is frozen and resumed rather than
    /// abandoned to its own timer.
    pub backoff_freeze: bool,
}

impl DacapConfig {
    /// Maximum sender-receiver distance implied by `max_prop_delay`.
    pub fn max_range(&self) -> f64 {
        self.max_prop_delay * SOUND_SPEED
    }
}

impl Default for DacapConfig {
    fn default() -> Self {
        Self {
            ack_mode: AckMode::Ack,
            t_min: 2.0,
            t_w_min: 1.5,
            delta_d: 100.0,
            delta_data: 0.0,
            max_prop_delay: 1.0,
            backoff_tuner: 1.0,
            wait_constant: 0.1,
            bit_rate: 4800.0,
            rts_size: 24,
            cts_size: 24,
            warning_size: 24,
            ack_size: 24,
            header_size: 24,
            max_payload: 512,
            max_tx_tries: Some(10),
            buffer_capacity: Some(50),
            max_backoff_counter: Some(4),
            multihop: false,
            backoff_freeze: false,
        }
    }
}
