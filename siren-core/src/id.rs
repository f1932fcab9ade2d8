use std::fmt::Display;

/// The link-layer address of a simulated acoustic modem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MacAddr(u64);

impl MacAddr {
    /// The all-stations address. Handshake frames are never sent to it, but
    /// upper layers may use it when queueing payloads for flooding protocols.
    pub const BROADCAST: MacAddr = MacAddr(u64::MAX);

    /// Creates an address with the given number.
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    /// Gets the underlying address number.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl From<u64> for MacAddr {
    fn from(n: u64) -> Self {
        Self(n)
    }
}

impl From<MacAddr> for u64 {
    fn from(addr: MacAddr) -> Self {
        addr.0
    }
}

impl Display for MacAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if *self == Self::BROADCAST {
            write!(f, "broadcast")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// A tag identifying the protocol a frame or payload belongs to.
///
/// Frames on the channel all carry [`ProtocolId::HANDSHAKE`]; the tag the
/// upper layer handed down with its payload travels inside the data frame
/// header and is restored before delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProtocolId(u64);

impl ProtocolId {
    /// The tag stamped on every frame produced by the handshake engine.
    pub const HANDSHAKE: ProtocolId = ProtocolId(0xdaca);

    /// Creates a protocol tag with the given number.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Gets the underlying tag number.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl From<u64> for ProtocolId {
    fn from(n: u64) -> Self {
        Self(n)
    }
}

impl From<ProtocolId> for u64 {
    fn from(id: ProtocolId) -> Self {
        id.0
    }
}

impl Display for ProtocolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addr_round_trip() {
        let addr = MacAddr::new(7);
        assert_eq!(u64::from(addr), 7);
        assert_eq!(MacAddr::from(7u64), addr);
        assert_eq!(addr.to_string(), "7");
    }

    #[test]
    fn broadcast_display() {
        assert_eq!(MacAddr::BROADCAST.to_string(), "broadcast");
    }

    #[test]
    fn protocol_tags_differ() {
        assert_ne!(ProtocolId::HANDSHAKE, ProtocolId::new(17));
        assert_eq!(ProtocolId::new(17).into_inner(), 17);
    }
}
