use siren_core::{dacap::state::State, DacapConfig, Message, Ocean, Position, ProtocolId};

/// Runs a relay burst simulation.
///
/// In this simulation, a relay node configured for multihop operation holds
/// payloads for two different neighbors at once. After the first exchange is
/// acknowledged the relay does not fall back to idle; it recontends within a
/// short random window and starts the second handshake immediately.
pub fn multihop_burst() {
    let config = DacapConfig {
        multihop: true,
        ..Default::default()
    };
    let mut ocean = Ocean::new();
    let relay = ocean.add_node(Position::new(0.0, 0.0, -80.0), config.clone(), 20);
    let north = ocean.add_node(Position::new(0.0, 750.0, -80.0), config.clone(), 21);
    let south = ocean.add_node(Position::new(0.0, -750.0, -80.0), config, 22);

    ocean.send_at(0.0, relay, north, ProtocolId::new(0xbeef), Message::new(b"northbound"));
    ocean.send_at(0.0, relay, south, ProtocolId::new(0xbeef), Message::new(b"southbound"));
    ocean.run_until(30.0);

    assert_eq!(ocean.node(north).unwrap().delivered().len(), 1);
    assert_eq!(ocean.node(south).unwrap().delivered().len(), 1);

    let sender = ocean.node(relay).unwrap();
    assert_eq!(sender.mac().stats().data_tx, 2);
    // An empty channel means no lost contentions anywhere in the burst.
    assert_eq!(sender.mac().stats().backoff_entries, 0);
    assert_eq!(sender.mac().queue_len(), 0);
    assert_eq!(sender.mac().state(), State::Idle);
}

#[cfg(test)]
mod tests {
    #[test]
    fn multihop_burst() {
        super::multihop_burst()
    }
}
