//! Byte collections for payloads moving through the simulation.

use std::{fmt::Display, ops::Range, sync::Arc};

/// An immutable, cheaply cloneable byte sequence.
///
/// Payloads are handed from the upper layer to the engine and may be cloned
/// for retransmission before the far side sees them. Cloning shares the
/// underlying buffer; [`slice`](Message::slice) narrows the visible window
/// without copying.
///
/// # Examples
///
/// ```
/// # use siren_core::message::Message;
/// let message = Message::new(b"sonar ping");
/// assert_eq!(message.len(), 10);
/// assert_eq!(message.slice(0..5), Message::new(b"sonar"));
/// ```
#[derive(Debug, Clone, Eq)]
pub struct Message {
    bytes: Arc<[u8]>,
    start: usize,
    end: usize,
}

impl Message {
    /// Creates a new message with the given body. The `From` impls below make
    /// this polymorphic over the usual byte sources.
    pub fn new(body: impl Into<Message>) -> Self {
        body.into()
    }

    /// The number of visible bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the message has no visible bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns a message narrowed to the given range of this one.
    ///
    /// # Panics
    ///
    /// Panics if the range extends past the end of the message.
    pub fn slice(&self, range: Range<usize>) -> Self {
        assert!(range.start <= range.end && self.start + range.end <= self.end);
        Self {
            bytes: self.bytes.clone(),
            start: self.start + range.start,
            end: self.start + range.end,
        }
    }

    /// The visible bytes as a slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[self.start..self.end]
    }

    /// An iterator over the visible bytes.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.as_slice().iter().cloned()
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::from(Vec::new())
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl From<Arc<[u8]>> for Message {
    fn from(bytes: Arc<[u8]>) -> Self {
        let end = bytes.len();
        Self {
            bytes,
            start: 0,
            end,
        }
    }
}

impl From<Vec<u8>> for Message {
    fn from(body: Vec<u8>) -> Self {
        Arc::<[u8]>::from(body).into()
    }
}

impl From<&[u8]> for Message {
    fn from(body: &[u8]) -> Self {
        Arc::<[u8]>::from(body).into()
    }
}

impl<const N: usize> From<&[u8; N]> for Message {
    fn from(body: &[u8; N]) -> Self {
        body.as_slice().into()
    }
}

impl<const N: usize> From<[u8; N]> for Message {
    fn from(body: [u8; N]) -> Self {
        body.as_slice().into()
    }
}

impl From<&str> for Message {
    fn from(body: &str) -> Self {
        body.as_bytes().into()
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in self.iter() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_and_len() {
        let message = Message::new(b"hello");
        assert_eq!(message.len(), 5);
        assert!(!message.is_empty());
        assert!(Message::default().is_empty());
    }

    #[test]
    fn slicing_shares_bytes() {
        let message = Message::new(b"handshake");
        let head = message.slice(0..4);
        assert_eq!(head, Message::new(b"hand"));
        let inner = head.slice(1..3);
        assert_eq!(inner.as_slice(), b"an");
    }

    #[test]
    fn equality_ignores_window() {
        let long = Message::new(b"xxpayloadxx").slice(2..9);
        assert_eq!(long, Message::new(b"payload"));
    }

    #[test]
    fn display_is_hex() {
        assert_eq!(Message::new([0xab, 0x01]).to_string(), "ab01");
    }

    #[test]
    #[should_panic]
    fn slice_past_end_panics() {
        Message::new(b"abc").slice(0..4);
    }
}
