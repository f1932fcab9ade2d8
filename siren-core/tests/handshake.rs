use siren_core::{
    dacap::state::State, AckMode, DacapConfig, MacAddr, Message, Ocean, Position, ProtocolId,
};

const NEWS: ProtocolId = ProtocolId::new(42);

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn moor(ocean: &mut Ocean, x: f64, config: DacapConfig) -> MacAddr {
    let seed = ocean.addrs().len() as u64 + 1;
    ocean.add_node(Position::new(x, 0.0, -200.0), config, seed)
}

#[test]
fn unacknowledged_exchange_skips_the_ack() {
    let config = DacapConfig {
        ack_mode: AckMode::NoAck,
        ..DacapConfig::default()
    };
    let mut ocean = Ocean::new();
    let a = moor(&mut ocean, 0.0, config.clone());
    let b = moor(&mut ocean, 1500.0, config);

    ocean.send_at(0.0, a, b, NEWS, Message::new(b"ping"));
    ocean.run_until(4.0);

    let receiver = ocean.node(b).unwrap();
    assert_eq!(receiver.delivered().len(), 1);
    assert_eq!(receiver.delivered()[0].payload, Message::new(b"ping"));
    // RTS at 0, CTS back at 2.08, a 0.14 s listening window with no warning
    // heard, then one second of flight plus the frame itself.
    assert!(close(receiver.delivered()[0].at, 2.22 + 1.0 + 28.0 * 8.0 / 4800.0));

    let sender = ocean.node(a).unwrap();
    assert_eq!(sender.mac().stats().data_tx, 1);
    assert_eq!(sender.mac().stats().control_rx, 1);
    // The receiver only ever answered with the CTS.
    assert_eq!(receiver.mac().stats().control_tx, 1);
    assert_eq!(sender.mac().state(), State::Idle);
    assert_eq!(receiver.mac().state(), State::Idle);
}

#[test]
fn hidden_nodes_share_the_receiver_without_collisions() {
    // The outer nodes cannot hear each other, only the shared receiver in
    // the middle. The late sender overhears the receiver's CTS and parks
    // until the ACK concludes the first exchange before contending itself.
    let mut ocean = Ocean::new().with_transmission_range(1200.0);
    let a = moor(&mut ocean, 0.0, DacapConfig::default());
    let b = moor(&mut ocean, 1000.0, DacapConfig::default());
    let c = moor(&mut ocean, 2000.0, DacapConfig::default());

    ocean.send_at(0.0, a, b, NEWS, Message::new(b"from the west"));
    ocean.send_at(6.5, c, b, NEWS, Message::new(b"from the east"));
    ocean.run_until(15.0);

    let receiver = ocean.node(b).unwrap();
    let delivered = receiver.delivered();
    assert_eq!(delivered.len(), 2);
    assert_eq!(delivered[0].src, a);
    assert_eq!(delivered[0].payload, Message::new(b"from the west"));
    assert_eq!(delivered[1].src, c);
    assert_eq!(delivered[1].payload, Message::new(b"from the east"));

    // The bystander heard exactly the receiver's CTS and ACK of the first
    // exchange, and nothing collided anywhere.
    assert_eq!(ocean.node(c).unwrap().mac().stats().foreign_rx, 2);
    for node in ocean.nodes() {
        assert_eq!(node.mac().stats().corrupt_rx, 0);
        assert_eq!(node.mac().state(), State::Idle);
    }
}

#[test]
fn undeliverable_traffic_is_dropped_after_the_retry_limit() {
    let impatient = DacapConfig {
        max_tx_tries: Some(2),
        ..DacapConfig::default()
    };
    let mut ocean = Ocean::new().with_transmission_range(1000.0);
    let a = moor(&mut ocean, 0.0, impatient);
    let b = moor(&mut ocean, 1500.0, DacapConfig::default());

    ocean.send_at(0.0, a, b, NEWS, Message::new(b"into the void"));
    ocean.run_until(20.0);

    let sender = ocean.node(a).unwrap();
    assert_eq!(sender.mac().stats().accepted, 1);
    assert_eq!(sender.mac().stats().control_tx, 2);
    assert_eq!(sender.mac().stats().data_tx, 0);
    assert_eq!(sender.mac().stats().dropped, 1);
    assert_eq!(sender.mac().queue_len(), 0);
    assert_eq!(sender.mac().state(), State::Idle);
    assert!(ocean.node(b).unwrap().delivered().is_empty());
}
