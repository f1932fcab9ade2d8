//! Outbound data queue.

use std::collections::VecDeque;

use thiserror::Error as ThisError;

use crate::{id::MacAddr, id::ProtocolId, message::Message};

/// Rejection returned by [`Dacap::enqueue`](crate::dacap::Dacap::enqueue).
#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum EnqueueError {
    #[error("transmission queue full ({capacity} frames)")]
    QueueFull { capacity: usize },
}

/// A payload waiting its turn, tagged with the sequence number it was
/// assigned on arrival. `tries` counts handshake attempts for this unit.
#[derive(Debug, Clone)]
pub struct QueuedData {
    pub data_seq: u64,
    pub dst: MacAddr,
    pub protocol: ProtocolId,
    pub payload: Message,
    pub tries: u32,
    pub enqueued_at: f64,
}

/// FIFO of data units awaiting a handshake, bounded when a capacity is
/// configured.
#[derive(Debug, Default)]
pub struct TxQueue {
    frames: VecDeque<QueuedData>,
    capacity: Option<usize>,
    next_seq: u64,
}

impl TxQueue {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            frames: VecDeque::new(),
            capacity,
            next_seq: 0,
        }
    }

    /// Appends a payload and returns its sequence number.
    pub fn push(
        &mut self,
        now: f64,
        dst: MacAddr,
        protocol: ProtocolId,
        payload: Message,
    ) -> Result<u64, EnqueueError> {
        if let Some(capacity) = self.capacity {
            if self.frames.len() >= capacity {
                return Err(EnqueueError::QueueFull { capacity });
            }
        }
        let data_seq = self.next_seq;
        self.next_seq += 1;
        self.frames.push_back(QueuedData {
            data_seq,
            dst,
            protocol,
            payload,
            tries: 0,
            enqueued_at: now,
        });
        Ok(data_seq)
    }

    pub fn front(&self) -> Option<&QueuedData> {
        self.frames.front()
    }

    pub fn front_mut(&mut self) -> Option<&mut QueuedData> {
        self.frames.front_mut()
    }

    pub fn pop(&mut self) -> Option<QueuedData> {
        self.frames.pop_front()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_are_monotonic() {
        let mut queue = TxQueue::new(None);
        let dst = MacAddr::new(2);
        let protocol = ProtocolId::HANDSHAKE;
        let first = queue.push(0.0, dst, protocol, Message::new(b"a")).unwrap();
        let second = queue.push(1.0, dst, protocol, Message::new(b"b")).unwrap();
        assert_eq!(first, 0);
        assert_eq!(second, 1);
        assert_eq!(queue.pop().unwrap().data_seq, 0);
    }

    #[test]
    fn capacity_is_enforced() {
        let mut queue = TxQueue::new(Some(1));
        let dst = MacAddr::new(2);
        let protocol = ProtocolId::HANDSHAKE;
        queue.push(0.0, dst, protocol, Message::new(b"a")).unwrap();
        let rejected = queue.push(0.0, dst, protocol, Message::new(b"b"));
        assert_eq!(rejected, Err(EnqueueError::QueueFull { capacity: 1 }));
        queue.pop();
        assert!(queue.push(1.0, dst, protocol, Message::new(b"b")).is_ok());
    }

    #[test]
    fn sequence_survives_drained_queue() {
        let mut queue = TxQueue::new(None);
        let dst = MacAddr::new(2);
        let protocol = ProtocolId::HANDSHAKE;
        queue.push(0.0, dst, protocol, Message::new(b"a")).unwrap();
        queue.pop();
        let next = queue.push(2.0, dst, protocol, Message::new(b"b")).unwrap();
        assert_eq!(next, 1);
    }
}
