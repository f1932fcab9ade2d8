use rand::{rngs::SmallRng, Rng, SeedableRng};
use rand_distr::Exp;
use siren_core::{DacapConfig, Message, Ocean, Position, ProtocolId};

/// Runs a saturation simulation.
///
/// In this simulation, three sources offer Poisson traffic to a single sink
/// far faster than handshakes can drain it. Queues fill up and the overflow
/// is refused at admission, while the sources spend most of the run deferring
/// to each other's exchanges or backing off after losing a contention.
pub fn saturation() {
    let mut ocean = Ocean::new();
    let sink = ocean.add_node(Position::new(0.0, 0.0, -120.0), DacapConfig::default(), 40);
    let sources = [
        ocean.add_node(Position::new(700.0, 0.0, -120.0), DacapConfig::default(), 41),
        ocean.add_node(Position::new(0.0, 850.0, -120.0), DacapConfig::default(), 42),
        ocean.add_node(Position::new(-1000.0, 0.0, -120.0), DacapConfig::default(), 43),
    ];
    let payload = Message::new(vec![0x17; 64]);

    // Two arrivals per second per source on average, far past what a channel
    // that spends seconds per exchange can carry.
    let mut rng = SmallRng::seed_from_u64(99);
    let inter = Exp::new(2.0).unwrap();
    let mut offered = [0_u64; 3];
    for (index, &source) in sources.iter().enumerate() {
        let mut at = 0.0;
        loop {
            at += rng.sample(inter);
            if at >= 120.0 {
                break;
            }
            ocean.send_at(at, source, sink, ProtocolId::new(0x5ea), payload.clone());
            offered[index] += 1;
        }
    }

    ocean.run_until(200.0);

    for (index, &source) in sources.iter().enumerate() {
        let stats = ocean.node(source).unwrap().mac().stats();
        assert_eq!(stats.accepted + stats.rejected, offered[index]);
        assert!(stats.rejected > 0);
    }
    assert!(ocean.node(sink).unwrap().mac().stats().delivered_up >= 5);
    let backoffs: u64 = sources
        .iter()
        .map(|&source| ocean.node(source).unwrap().mac().stats().backoff_entries)
        .sum();
    assert!(backoffs > 0);
}

#[cfg(test)]
mod tests {
    #[test]
    fn saturation() {
        super::saturation()
    }
}
