use siren_core::{dacap::state::State, DacapConfig, Message, Ocean, Position, ProtocolId};

/// Runs a basic simulation.
///
/// In this simulation, a node negotiates the channel with a peer a kilometer
/// and a half away and sends it one payload. Most of the exchange is spent in
/// flight: the payload arrives about four and a half seconds in and the
/// acknowledgement closes the session a second later.
pub fn handshake_pair() {
    let mut ocean = Ocean::new();
    let sender = ocean.add_node(Position::new(0.0, 0.0, -100.0), DacapConfig::default(), 1);
    let receiver = ocean.add_node(Position::new(1500.0, 0.0, -100.0), DacapConfig::default(), 2);
    let message = Message::new(b"Hello!");

    ocean.send_at(0.0, sender, receiver, ProtocolId::new(0xbeef), message.clone());
    ocean.run_until(10.0);

    let delivered = ocean.node(receiver).unwrap().delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].payload, message);
    assert_eq!(ocean.node(sender).unwrap().mac().stats().data_tx, 1);
    assert_eq!(ocean.node(sender).unwrap().mac().state(), State::Idle);
    assert_eq!(ocean.node(receiver).unwrap().mac().state(), State::Idle);
}
