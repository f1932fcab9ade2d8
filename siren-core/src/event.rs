//! Event types and priority queue for the acoustic simulation.

use std::cmp::Ordering;

use crate::{
    dacap::timer::TimerKind,
    id::{MacAddr, ProtocolId},
    message::Message,
};

/// Unique sequence number for deterministic event ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SequenceNumber(u64);

impl SequenceNumber {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Events in the discrete event simulation.
///
/// Frames in flight are referenced by the id the ocean assigned them when
/// the transmission was scheduled, so events stay small.
#[derive(Debug, Clone)]
pub enum Event {
    /// The leading edge of a frame reaches a node.
    StartReception { to: MacAddr, rx_id: u64 },
    /// The trailing edge arrives and the frame is handed to the engine.
    EndReception { to: MacAddr, rx_id: u64 },
    /// The sender's transducer goes quiet.
    EndTransmission { node: MacAddr },
    /// A wakeup the engine asked for.
    TimerFire {
        node: MacAddr,
        kind: TimerKind,
        generation: u64,
    },
    /// Traffic source hands a payload to a node's engine.
    Inject {
        node: MacAddr,
        dst: MacAddr,
        protocol: ProtocolId,
        payload: Message,
    },
}

/// A scheduled event with timestamp and sequence number for ordering.
#[derive(Debug, Clone)]
pub struct ScheduledEvent {
    /// When the event should occur, in seconds of virtual time.
    pub time: f64,
    /// Sequence number for deterministic ordering of same-time events.
    pub seq: SequenceNumber,
    /// The event to process.
    pub event: Event,
}

impl ScheduledEvent {
    pub fn new(time: f64, seq: SequenceNumber, event: Event) -> Self {
        Self { time, seq, event }
    }
}

// Implement ordering for min-heap (BinaryHeap is max-heap, so we reverse).
impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.time.total_cmp(&other.time).is_eq() && self.seq == other.seq
    }
}

impl Eq for ScheduledEvent {}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap).
        // First compare by time, then by sequence number.
        match other.time.total_cmp(&self.time) {
            Ordering::Equal => other.seq.cmp(&self.seq),
            ord => ord,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(node: u64) -> Event {
        Event::EndTransmission {
            node: MacAddr::new(node),
        }
    }

    #[test]
    fn earlier_time_wins() {
        let late = ScheduledEvent::new(10.0, SequenceNumber::new(1), tick(1));
        let early = ScheduledEvent::new(5.0, SequenceNumber::new(2), tick(1));

        // Earlier time must be "greater" in min-heap terms.
        assert!(early > late);
    }

    #[test]
    fn same_time_falls_back_to_sequence() {
        let first = ScheduledEvent::new(10.0, SequenceNumber::new(1), tick(1));
        let second = ScheduledEvent::new(10.0, SequenceNumber::new(2), tick(1));

        assert!(first > second);
    }

    #[test]
    fn heap_pops_in_time_order() {
        let mut heap = std::collections::BinaryHeap::new();
        heap.push(ScheduledEvent::new(3.0, SequenceNumber::new(0), tick(1)));
        heap.push(ScheduledEvent::new(1.0, SequenceNumber::new(1), tick(2)));
        heap.push(ScheduledEvent::new(2.0, SequenceNumber::new(2), tick(3)));

        let order: Vec<f64> = std::iter::from_fn(|| heap.pop().map(|e| e.time)).collect();
        assert_eq!(order, vec![1.0, 2.0, 3.0]);
    }
}
