use siren_core::{dacap::state::State, DacapConfig, Message, Ocean, Position, ProtocolId};

/// Runs a hidden terminal simulation.
///
/// In this simulation, two senders sit on opposite sides of one receiver and
/// out of range of each other. Both fire a request at the same instant, so
/// the first frames overlap at the receiver and corrupt each other. Neither
/// sender can hear the collision; each discovers it through a reply timeout
/// and backs off by its own random amount, after which they take turns.
pub fn hidden_terminal() {
    let mut ocean = Ocean::new().with_transmission_range(1200.0);
    let left = ocean.add_node(Position::new(0.0, 0.0, -150.0), DacapConfig::default(), 7);
    let middle = ocean.add_node(Position::new(1000.0, 0.0, -150.0), DacapConfig::default(), 8);
    let right = ocean.add_node(Position::new(2000.0, 0.0, -150.0), DacapConfig::default(), 9);

    ocean.send_at(0.0, left, middle, ProtocolId::new(0xbeef), Message::new(b"west"));
    ocean.send_at(0.0, right, middle, ProtocolId::new(0xbeef), Message::new(b"east"));
    ocean.run_until(240.0);

    let receiver = ocean.node(middle).unwrap();
    assert!(receiver.mac().stats().corrupt_rx >= 2);

    let mut sources: Vec<_> = receiver.delivered().iter().map(|d| d.src).collect();
    sources.sort();
    assert_eq!(sources, vec![left, right]);

    assert_eq!(ocean.node(left).unwrap().mac().state(), State::Idle);
    assert_eq!(ocean.node(right).unwrap().mac().state(), State::Idle);
}

#[cfg(test)]
mod tests {
    #[test]
    fn hidden_terminal() {
        super::hidden_terminal()
    }
}
