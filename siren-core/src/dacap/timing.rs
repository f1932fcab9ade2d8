//! Wait-time arithmetic.
//!
//! Every duration in the protocol is derived here from [`DacapConfig`]:
//! serialization times, the distance-dependent handshake wait, the guard
//! windows used while yielding to a foreign exchange, and the randomized
//! backoff and recontend draws.

use rand::{rngs::SmallRng, Rng};

use crate::{
    config::{AckMode, DacapConfig, SOUND_SPEED},
    dacap::state::State,
};

/// Time to push `size` bytes through the modem at the configured bit rate.
pub fn tx_duration(config: &DacapConfig, size: u32) -> f64 {
    f64::from(size) * 8.0 / config.bit_rate
}

/// Serialization time of a maximum-length data frame.
pub fn data_tx_duration(config: &DacapConfig) -> f64 {
    tx_duration(config, config.header_size + config.max_payload)
}

/// How long a sender holds its data after the CTS came back, as a function
/// of the measured `distance` to the peer and the serialization time of the
/// `data_size` byte frame in play.
///
/// Close peers wait out most of `t_min` so that faraway overhearers have
/// time to object; distant peers wait only for the residual warning window.
/// The result is never below the floor that keeps a warning from a node
/// `delta_d` further out catchable.
pub fn handshake_wait_time(
    config: &DacapConfig,
    mode: AckMode,
    distance: f64,
    data_size: u32,
) -> f64 {
    let t_min = config.t_min;
    let delta = config.delta_d / SOUND_SPEED;
    let travel = distance / SOUND_SPEED;
    let round_trip = 2.0 * (distance + config.delta_d) / SOUND_SPEED;

    let t_data = tx_duration(config, data_size);
    let t_1 = (t_min - delta.min(t_data.min(2.0 * config.max_prop_delay - t_min))) / 2.0;
    let t_2 = (t_min - config.delta_data) / 2.0;
    let t_3 = t_1.min((t_min + config.t_w_min - 2.0 * delta) / 4.0);

    match mode {
        AckMode::NoAck => {
            let wait = if travel < t_1 {
                t_min - 2.0 * travel
            } else {
                round_trip - t_min
            };
            wait.max(2.0 * delta)
        }
        AckMode::Ack => {
            let wait = if travel < t_2 && travel > t_1 {
                round_trip - t_min
            } else if travel > t_2.max(t_3) {
                round_trip - config.t_w_min
            } else {
                t_min - 2.0 * travel
            };
            wait.max((2.0 * delta).max(config.t_w_min))
        }
    }
}

/// The handshake wait a node assumes for an exchange it can only overhear.
/// Distance to the foreign pair is unknown, so the worst case is used.
fn worst_case_wait_time(config: &DacapConfig, data_size: u32) -> f64 {
    handshake_wait_time(
        config,
        config.ack_mode,
        2.0 * config.max_prop_delay * SOUND_SPEED,
        data_size,
    )
}

/// Threshold below the full round trip at which a reply is still pending.
/// In ACK mode the shorter warning bound applies.
pub fn warning_threshold(config: &DacapConfig) -> f64 {
    match config.ack_mode {
        AckMode::Ack => config.t_w_min,
        AckMode::NoAck => config.t_min,
    }
}

/// Deadline for the timer armed on entry to `state`, measured from now.
/// `data_size` is the full size of the data frame assumed for the exchange.
pub fn state_timeout(config: &DacapConfig, state: State, data_size: u32) -> f64 {
    let two_trips = 2.0 * config.max_prop_delay;
    let rts = tx_duration(config, config.rts_size);
    let cts = tx_duration(config, config.cts_size);
    let warning = tx_duration(config, config.warning_size);
    let ack = tx_duration(config, config.ack_size);
    match state {
        State::WaitCts => two_trips + cts + rts + config.wait_constant,
        State::WaitAck => {
            two_trips + ack + tx_duration(config, data_size) + config.wait_constant
        }
        State::WaitData => {
            two_trips
                + tx_duration(config, data_size)
                + worst_case_wait_time(config, data_size)
                + config.wait_constant
        }
        State::WaitWarning => {
            two_trips - warning_threshold(config) + warning + config.wait_constant
        }
        State::SendWarning => two_trips - warning_threshold(config) + config.wait_constant,
        State::WaitForeignCts => two_trips + cts,
        State::WaitForeignWarning => {
            3.0 * config.max_prop_delay - warning_threshold(config)
                + warning
                + rts
                + config.wait_constant
        }
        State::WaitForeignData => {
            two_trips + tx_duration(config, data_size) + worst_case_wait_time(config, data_size)
        }
        State::WaitForeignAck => two_trips + ack,
        _ => unreachable!("no timeout defined for state {state}"),
    }
}

fn nonzero_unit(rng: &mut SmallRng) -> f64 {
    loop {
        let u: f64 = rng.gen();
        if u > 0.0 {
            return u;
        }
    }
}

/// Randomized backoff for the given collision count, doubling per attempt.
/// The exponent is taken in floating point so an uncapped counter cannot
/// overflow.
pub fn backoff_duration(config: &DacapConfig, rng: &mut SmallRng, counter: u32) -> f64 {
    config.backoff_tuner
        * nonzero_unit(rng)
        * 2.0
        * config.max_prop_delay
        * f64::from(counter).exp2()
}

/// Randomized pause before contending again after a completed exchange.
pub fn recontend_duration(config: &DacapConfig, rng: &mut SmallRng) -> f64 {
    nonzero_unit(rng) * 2.0 * config.max_prop_delay + config.wait_constant
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn serialization_time() {
        let config = DacapConfig::default();
        assert_eq!(tx_duration(&config, 24), 24.0 * 8.0 / 4800.0);
        assert_eq!(data_tx_duration(&config), 536.0 * 8.0 / 4800.0);
    }

    #[test]
    fn ack_mode_wait_at_medium_range_hits_the_floor() {
        let config = DacapConfig::default();
        let wait = handshake_wait_time(&config, AckMode::Ack, 500.0, 536);
        assert_eq!(wait, 1.5);
    }

    #[test]
    fn no_ack_wait_shrinks_with_distance_until_the_floor() {
        let config = DacapConfig::default();
        let near = handshake_wait_time(&config, AckMode::NoAck, 100.0, 536);
        let far = handshake_wait_time(&config, AckMode::NoAck, 1200.0, 536);
        assert!(near > far);
        let floor = 2.0 * config.delta_d / SOUND_SPEED;
        assert!(far >= floor);
    }

    #[test]
    fn wait_time_never_below_floor_across_ranges() {
        let config = DacapConfig::default();
        let floor = config.t_w_min;
        for step in 0..30 {
            let distance = f64::from(step) * 50.0;
            assert!(handshake_wait_time(&config, AckMode::Ack, distance, 536) >= floor);
        }
    }

    #[test]
    fn control_timeouts_cover_the_round_trip() {
        let config = DacapConfig::default();
        let cts = state_timeout(&config, State::WaitCts, 0);
        let ack = state_timeout(&config, State::WaitAck, 536);
        assert!(cts > 2.0 * config.max_prop_delay);
        assert!(ack > 2.0 * config.max_prop_delay);
    }

    #[test]
    fn data_wait_window_tracks_the_frame_size() {
        let config = DacapConfig::default();
        let small = state_timeout(&config, State::WaitData, 25);
        let max = state_timeout(&config, State::WaitData, 536);
        assert!((max - small - (536.0 - 25.0) * 8.0 / 4800.0).abs() < 1e-9);
    }

    #[test]
    fn backoff_doubles_its_ceiling() {
        let config = DacapConfig::default();
        let mut rng = SmallRng::seed_from_u64(7);
        for counter in 0..5 {
            let ceiling = 2.0 * config.max_prop_delay * f64::from(counter).exp2();
            for _ in 0..50 {
                let draw = backoff_duration(&config, &mut rng, counter);
                assert!(draw > 0.0);
                assert!(draw <= ceiling);
            }
        }
    }

    #[test]
    fn backoff_stays_finite_for_large_counters() {
        let config = DacapConfig::default();
        let mut rng = SmallRng::seed_from_u64(3);
        for counter in [31, 32, 40, 64] {
            let draw = backoff_duration(&config, &mut rng, counter);
            assert!(draw > 0.0);
            assert!(draw.is_finite());
        }
    }

    #[test]
    fn recontend_sits_between_constant_and_constant_plus_round_trip() {
        let config = DacapConfig::default();
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..50 {
            let draw = recontend_duration(&config, &mut rng);
            assert!(draw > config.wait_constant);
            assert!(draw <= config.wait_constant + 2.0 * config.max_prop_delay);
        }
    }
}
