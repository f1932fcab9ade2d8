use siren_core::{dacap::state::State, DacapConfig, Message, Ocean, Position, ProtocolId};

/// Runs a retry exhaustion simulation.
///
/// In this simulation, a sender keeps requesting the channel from a peer that
/// is moored beyond acoustic range and can never answer. Every attempt times
/// out into a longer backoff until the attempt limit is reached and the
/// payload is dropped, leaving the sender idle with an empty queue.
pub fn retry_exhaustion() {
    let config = DacapConfig {
        max_tx_tries: Some(3),
        ..Default::default()
    };
    let mut ocean = Ocean::new().with_transmission_range(1000.0);
    let sender = ocean.add_node(Position::new(0.0, 0.0, -60.0), config.clone(), 30);
    let unreachable = ocean.add_node(Position::new(1500.0, 0.0, -60.0), config, 31);

    ocean.send_at(0.0, sender, unreachable, ProtocolId::new(0xbeef), Message::new(b"lost"));
    ocean.run_until(40.0);

    let stats = ocean.node(sender).unwrap().mac().stats();
    assert_eq!(stats.accepted, 1);
    assert_eq!(stats.control_tx, 3);
    assert_eq!(stats.data_tx, 0);
    assert_eq!(stats.dropped, 1);
    assert_eq!(stats.backoff_entries, 3);
    assert_eq!(ocean.node(sender).unwrap().mac().queue_len(), 0);
    assert_eq!(ocean.node(sender).unwrap().mac().state(), State::Idle);

    let peer = ocean.node(unreachable).unwrap();
    assert!(peer.delivered().is_empty());
    assert_eq!(peer.mac().stats().control_rx, 0);
}

#[cfg(test)]
mod tests {
    #[test]
    #[tracing_test::traced_test]
    fn retry_exhaustion() {
        super::retry_exhaustion()
    }
}
