//! Tracking of one overheard exchange.

use crate::id::MacAddr;

/// The pair of nodes whose exchange this node is currently yielding to.
///
/// Only one slot: the first overheard pair is kept until the exchange ends
/// or its guard window runs out, and later overhearings do not replace it.
#[derive(Debug, Default)]
pub struct ForeignSession {
    pair: Option<(MacAddr, MacAddr)>,
}

impl ForeignSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remembers the pair behind an overheard frame. First come, first kept.
    pub fn track(&mut self, src: MacAddr, dst: MacAddr) {
        if self.pair.is_none() {
            self.pair = Some((src, dst));
        }
    }

    /// Whether `addr` is one of the tracked endpoints.
    pub fn involves(&self, addr: MacAddr) -> bool {
        match self.pair {
            Some((a, b)) => addr == a || addr == b,
            None => false,
        }
    }

    pub fn is_tracking(&self) -> bool {
        self.pair.is_some()
    }

    pub fn clear(&mut self) {
        self.pair = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_pair_is_kept() {
        let mut session = ForeignSession::new();
        session.track(MacAddr::new(1), MacAddr::new(2));
        session.track(MacAddr::new(3), MacAddr::new(4));
        assert!(session.involves(MacAddr::new(1)));
        assert!(session.involves(MacAddr::new(2)));
        assert!(!session.involves(MacAddr::new(3)));
    }

    #[test]
    fn clear_empties_the_slot() {
        let mut session = ForeignSession::new();
        session.track(MacAddr::new(1), MacAddr::new(2));
        session.clear();
        assert!(!session.is_tracking());
        session.track(MacAddr::new(3), MacAddr::new(4));
        assert!(session.involves(MacAddr::new(4)));
    }
}
