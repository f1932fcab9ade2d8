//! Distance-aware collision avoidance for half-duplex acoustic links.
//!
//! [`Dacap`] runs the RTS/CTS handshake as a reactive state machine. It never
//! blocks and never looks at a clock: the host feeds it receptions, end-of-
//! transmission notices and timer wakeups, each stamped with the current
//! virtual time, and drains the [`Action`]s the engine wants performed in
//! exchange. Sound is slow enough underwater that the handshake measures the
//! distance to the peer from control-frame flight times and sizes its wait
//! periods accordingly, instead of assuming the worst-case propagation delay
//! for every exchange.
//!
//! A node that overhears a handshake between two other nodes goes quiet and
//! follows the exchange from the outside until it concludes or its expected
//! schedule runs out. A receiver that overhears a competing handshake right
//! after granting one can send a warning frame, telling its own sender to
//! hold the data back for one extra wait period.

pub mod overhearing;
pub mod queue;
pub mod state;
pub mod stats;
pub mod timer;
pub mod timing;

use rand::{rngs::SmallRng, SeedableRng};

use crate::{
    config::{AckMode, DacapConfig, SOUND_SPEED},
    id::{MacAddr, ProtocolId},
    logging,
    message::Message,
    packet::{FrameHeader, FrameKind, Packet, RxInfo},
};

use self::{
    overhearing::ForeignSession,
    queue::{EnqueueError, TxQueue},
    state::{Reason, State},
    stats::DacapStats,
    timer::{Timer, TimerKind},
};

/// Something the engine needs its host to do.
///
/// Actions accumulate inside the engine and are drained with
/// [`Dacap::take_actions`] after every input.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Put a frame on the channel. The host must report the end of the
    /// transmission back through [`Dacap::on_end_tx`].
    Transmit(Packet),
    /// Hand a received payload to the upper layer it was addressed to.
    DeliverUp {
        src: MacAddr,
        protocol: ProtocolId,
        payload: Message,
    },
    /// Schedule a wakeup for `deadline` and deliver it back through
    /// [`Dacap::on_timer`] with this generation.
    Arm {
        kind: TimerKind,
        generation: u64,
        deadline: f64,
    },
}

/// The handshake engine for one node.
pub struct Dacap {
    addr: MacAddr,
    config: DacapConfig,
    rng: SmallRng,
    state: State,
    prev_state: State,
    queue: TxQueue,
    foreign: ForeignSession,
    peer: Option<MacAddr>,
    session_active: bool,
    session_distance: Option<f64>,
    last_seq_tx: Option<u64>,
    last_seq_rx: Option<u64>,
    defer_data: bool,
    warning_sent: bool,
    rx_active: bool,
    frame_seq: u64,
    protocol_timer: Timer,
    backoff_timer: Timer,
    backoff_pending: bool,
    backoff_counter: u32,
    stats: DacapStats,
    actions: Vec<Action>,
}

impl Dacap {
    pub fn new(addr: MacAddr, config: DacapConfig, seed: u64) -> Self {
        let queue = TxQueue::new(config.buffer_capacity);
        Self {
            addr,
            config,
            rng: SmallRng::seed_from_u64(seed),
            state: State::Idle,
            prev_state: State::Idle,
            queue,
            foreign: ForeignSession::new(),
            peer: None,
            session_active: false,
            session_distance: None,
            last_seq_tx: None,
            last_seq_rx: None,
            defer_data: false,
            warning_sent: false,
            rx_active: false,
            frame_seq: 0,
            protocol_timer: Timer::new(),
            backoff_timer: Timer::new(),
            backoff_pending: false,
            backoff_counter: 0,
            stats: DacapStats::default(),
            actions: Vec::new(),
        }
    }

    pub fn addr(&self) -> MacAddr {
        self.addr
    }

    pub fn config(&self) -> &DacapConfig {
        &self.config
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn stats(&self) -> DacapStats {
        self.stats
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Drains the actions produced since the last call.
    pub fn take_actions(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.actions)
    }

    /// Accepts a payload from the upper layer. Starts a handshake right away
    /// when the node has nothing else going on.
    pub fn enqueue(
        &mut self,
        now: f64,
        dst: MacAddr,
        protocol: ProtocolId,
        payload: Message,
    ) -> Result<u64, EnqueueError> {
        match self.queue.push(now, dst, protocol, payload) {
            Ok(data_seq) => {
                self.stats.accepted += 1;
                if self.state == State::Idle && !self.session_active && !self.rx_active {
                    self.enter_send_rts(now, Reason::DataPending);
                }
                Ok(data_seq)
            }
            Err(error) => {
                self.stats.rejected += 1;
                logging::frame_drop_event(self.addr, FrameKind::Data, "queue full");
                Err(error)
            }
        }
    }

    /// The channel reports that some transmission has started reaching this
    /// node. Blocks the idle fast path of [`Dacap::enqueue`] until the
    /// reception completes.
    pub fn on_start_rx(&mut self, _now: f64) {
        self.rx_active = true;
    }

    /// A reception has completed. Corrupted and non-handshake frames are
    /// dropped, everything else is interpreted under the current state.
    pub fn on_reception(&mut self, now: f64, packet: Packet, info: RxInfo) {
        self.rx_active = false;

        if packet.protocol != ProtocolId::HANDSHAKE {
            self.stats.unknown_rx += 1;
            logging::frame_drop_event(self.addr, packet.header.kind, "unknown protocol");
            return;
        }
        if info.corrupt {
            self.stats.corrupt_rx += 1;
            logging::frame_drop_event(self.addr, packet.header.kind, "corrupt");
            return;
        }

        let delay = info.propagation_delay();
        match self.state {
            State::Idle | State::RecontendWindow => self.rx_contending(now, &packet, delay),
            State::Backoff => self.rx_backoff(now, &packet, delay),
            State::WaitCts => self.rx_wait_cts(now, &packet, delay),
            State::WaitWarning => self.rx_wait_warning(now, &packet, delay),
            State::WaitAck => self.rx_wait_ack(now, &packet),
            State::WaitData => self.rx_wait_data(now, packet, delay),
            State::SendWarning => self.rx_send_warning(now, packet, delay),
            State::WaitForeignCts
            | State::WaitForeignWarning
            | State::WaitForeignData
            | State::WaitForeignAck => self.rx_wait_foreign(now, &packet),
            _ => {
                logging::frame_drop_event(self.addr, packet.header.kind, "busy");
            }
        }
    }

    /// The frame handed to the channel earlier has left the transducer.
    pub fn on_end_tx(&mut self, now: f64) {
        match self.state {
            State::SendRts => self.enter_wait_cts(now, Reason::RtsSent),
            State::SendCts => self.enter_send_warning(now, Reason::CtsSent),
            State::SendData => match self.config.ack_mode {
                AckMode::Ack => self.enter_wait_ack(now, Reason::DataSent),
                AckMode::NoAck => {
                    if self.config.multihop && !self.queue.is_empty() {
                        self.enter_recontend(now, Reason::DataSent);
                    } else {
                        self.enter_idle(now, Reason::DataSent);
                    }
                }
            },
            State::SendAck => {
                if self.backoff_pending {
                    self.enter_backoff(now, Reason::BackoffPending);
                } else {
                    self.enter_idle(now, Reason::AckSent);
                }
            }
            // A warning leaving the transducer, possibly after the window
            // already rolled over into WaitData.
            State::SendWarning | State::WaitData => {}
            _ => unreachable!("transmission finished in state {}", self.state),
        }
    }

    /// A timer wakeup. Stale generations are dropped without effect.
    pub fn on_timer(&mut self, now: f64, kind: TimerKind, generation: u64) {
        match kind {
            TimerKind::Protocol => {
                if !self.protocol_timer.fire(generation) {
                    return;
                }
                self.protocol_expired(now);
            }
            TimerKind::Backoff => {
                if !self.backoff_timer.fire(generation) {
                    return;
                }
                self.exit_backoff();
                if self.state == State::Backoff {
                    self.enter_idle(now, Reason::BackoffEnd);
                }
            }
        }
    }

    fn protocol_expired(&mut self, now: f64) {
        match self.state {
            State::RecontendWindow => self.enter_idle(now, Reason::RecontendEnd),
            State::WaitCts => self.enter_backoff(now, Reason::CtsTimeout),
            State::WaitWarning => {
                if self.defer_data {
                    self.enter_defer_data(now, Reason::WarningReceived);
                } else {
                    self.enter_send_data(now, Reason::NoWarning);
                }
            }
            State::DeferData => self.enter_send_data(now, Reason::DeferEnd),
            State::WaitAck => self.enter_backoff(now, Reason::AckTimeout),
            State::WaitData => self.enter_idle(now, Reason::DataTimeout),
            State::SendWarning => self.enter_wait_data(now, Reason::WarningWindowEnd),
            State::WaitForeignCts => {
                self.enter_wait_foreign(now, State::WaitForeignWarning, Reason::ForeignCtsWindowEnd)
            }
            State::WaitForeignWarning => {
                self.enter_wait_foreign(now, State::WaitForeignData, Reason::ForeignWarningWindowEnd)
            }
            State::WaitForeignData => match self.config.ack_mode {
                AckMode::Ack => {
                    self.enter_wait_foreign(now, State::WaitForeignAck, Reason::ForeignDataWindowEnd)
                }
                AckMode::NoAck => self.enter_idle(now, Reason::ForeignDataWindowEnd),
            },
            State::WaitForeignAck => self.enter_idle(now, Reason::ForeignAckWindowEnd),
            _ => unreachable!("no timeout armed in {}", self.state),
        }
    }

    // Receptions, one handler per waiting state.

    fn rx_contending(&mut self, now: f64, packet: &Packet, delay: f64) {
        if packet.dst == self.addr {
            if packet.header.kind == FrameKind::Rts {
                self.stats.control_rx += 1;
                self.peer = Some(packet.src);
                self.session_active = true;
                self.session_distance = Some(delay * SOUND_SPEED);
                self.last_seq_rx = Some(packet.header.data_seq);
                self.enter_send_cts(now, Reason::RtsReceived);
            }
        } else {
            match packet.header.kind {
                FrameKind::Rts => {
                    self.stats.foreign_rx += 1;
                    self.foreign.track(packet.src, packet.dst);
                    self.enter_wait_foreign(now, State::WaitForeignCts, Reason::ForeignRts);
                }
                FrameKind::Cts => {
                    self.stats.foreign_rx += 1;
                    self.foreign.track(packet.src, packet.dst);
                    self.enter_wait_foreign(now, State::WaitForeignWarning, Reason::ForeignCts);
                }
                FrameKind::Data => {
                    self.stats.foreign_rx += 1;
                    self.foreign.track(packet.src, packet.dst);
                    self.enter_wait_foreign(now, State::WaitForeignAck, Reason::ForeignData);
                }
                _ => {}
            }
        }
    }

    fn rx_backoff(&mut self, now: f64, packet: &Packet, delay: f64) {
        if packet.dst == self.addr {
            if packet.header.kind == FrameKind::Rts {
                self.stats.control_rx += 1;
                self.peer = Some(packet.src);
                self.session_active = true;
                self.session_distance = Some(delay * SOUND_SPEED);
                self.last_seq_rx = Some(packet.header.data_seq);
                if self.config.backoff_freeze {
                    self.freeze_backoff(now);
                } else {
                    self.exit_backoff();
                }
                self.enter_send_cts(now, Reason::RtsReceived);
            }
        } else {
            let foreign_state = match packet.header.kind {
                FrameKind::Rts => Some((State::WaitForeignCts, Reason::ForeignRts)),
                FrameKind::Cts => Some((State::WaitForeignWarning, Reason::ForeignCts)),
                FrameKind::Data => Some((State::WaitForeignAck, Reason::ForeignData)),
                _ => None,
            };
            if let Some((next, reason)) = foreign_state {
                self.stats.foreign_rx += 1;
                self.foreign.track(packet.src, packet.dst);
                // The countdown does not survive the detour when freezing is
                // on; without freezing it keeps running unobserved.
                if self.config.backoff_freeze {
                    self.backoff_timer.cancel();
                }
                self.enter_wait_foreign(now, next, reason);
            }
        }
    }

    fn rx_wait_cts(&mut self, now: f64, packet: &Packet, delay: f64) {
        if packet.dst != self.addr && packet.header.kind == FrameKind::Cts {
            self.stats.foreign_rx += 1;
            if self.reply_still_pending(delay) {
                self.defer_data = true;
            }
        } else if packet.dst != self.addr && packet.header.kind == FrameKind::Rts {
            self.stats.foreign_rx += 1;
            if self.config.ack_mode == AckMode::Ack && delay < self.config.max_prop_delay {
                self.defer_data = true;
            }
        } else if packet.dst == self.addr
            && Some(packet.src) == self.peer
            && packet.header.kind == FrameKind::Cts
        {
            self.stats.control_rx += 1;
            self.session_distance = Some(delay * SOUND_SPEED);
            self.enter_wait_warning(now, Reason::CtsReceived);
        }
    }

    fn rx_wait_warning(&mut self, _now: f64, packet: &Packet, delay: f64) {
        if packet.dst != self.addr && packet.header.kind == FrameKind::Cts {
            self.stats.foreign_rx += 1;
            if self.reply_still_pending(delay) {
                self.defer_data = true;
            }
        } else if packet.dst != self.addr && packet.header.kind == FrameKind::Rts {
            self.stats.foreign_rx += 1;
            if self.config.ack_mode == AckMode::Ack && delay < self.config.max_prop_delay {
                self.defer_data = true;
            }
        } else if packet.dst == self.addr
            && Some(packet.src) == self.peer
            && packet.header.kind == FrameKind::Warning
        {
            self.stats.warning_rx += 1;
            self.defer_data = true;
        }
    }

    fn rx_wait_ack(&mut self, now: f64, packet: &Packet) {
        if packet.dst == self.addr
            && Some(packet.src) == self.peer
            && packet.header.kind == FrameKind::Ack
        {
            self.stats.control_rx += 1;
            self.queue_pop(now);
            if self.backoff_pending {
                self.enter_backoff(now, Reason::BackoffPending);
            } else if self.config.multihop && !self.queue.is_empty() {
                self.enter_recontend(now, Reason::AckReceived);
            } else {
                self.enter_idle(now, Reason::AckReceived);
            }
        }
    }

    fn rx_wait_data(&mut self, now: f64, packet: Packet, delay: f64) {
        if packet.dst == self.addr && Some(packet.src) == self.peer {
            match packet.header.kind {
                FrameKind::Data => {
                    self.enter_data_received(now, packet);
                }
                FrameKind::Rts if self.last_seq_rx == Some(packet.header.data_seq) => {
                    self.stats.control_rx += 1;
                    self.session_active = true;
                    self.session_distance = Some(delay * SOUND_SPEED);
                    self.enter_send_cts(now, Reason::SameRtsReceived);
                }
                _ => {}
            }
        }
    }

    fn rx_send_warning(&mut self, now: f64, packet: Packet, delay: f64) {
        if packet.dst == self.addr && Some(packet.src) == self.peer {
            match packet.header.kind {
                FrameKind::Data => {
                    tracing::warn!(
                        mac = self.addr.into_inner(),
                        "data arrived before the warning window closed"
                    );
                    self.enter_data_received(now, packet);
                }
                FrameKind::Rts if self.last_seq_rx == Some(packet.header.data_seq) => {
                    self.stats.control_rx += 1;
                    self.session_active = true;
                    self.session_distance = Some(delay * SOUND_SPEED);
                    self.enter_send_cts(now, Reason::SameRtsReceived);
                }
                _ => {}
            }
            return;
        }
        match packet.header.kind {
            FrameKind::Rts => {
                if delay < 2.0 * self.config.max_prop_delay - self.config.t_min {
                    self.stats.foreign_rx += 1;
                    self.tx_warning();
                }
            }
            FrameKind::Cts => {
                if self.config.ack_mode == AckMode::Ack
                    && delay < 2.0 * self.config.max_prop_delay - self.config.t_w_min
                {
                    self.stats.foreign_rx += 1;
                    self.tx_warning();
                }
            }
            _ => {}
        }
    }

    fn rx_wait_foreign(&mut self, now: f64, packet: &Packet) {
        if packet.dst == self.addr || !self.foreign.involves(packet.src) {
            return;
        }
        let kind = packet.header.kind;
        let concluded = match self.config.ack_mode {
            AckMode::Ack => kind == FrameKind::Ack,
            AckMode::NoAck => kind == FrameKind::Data,
        };
        if concluded {
            self.stats.foreign_rx += 1;
            self.enter_idle(now, Reason::ForeignSessionEnded);
            return;
        }
        match self.state {
            State::WaitForeignCts => match kind {
                FrameKind::Cts => {
                    self.stats.foreign_rx += 1;
                    self.enter_wait_foreign(now, State::WaitForeignWarning, Reason::ForeignCts);
                }
                FrameKind::Data => {
                    self.stats.foreign_rx += 1;
                    self.enter_wait_foreign(now, State::WaitForeignAck, Reason::ForeignData);
                }
                _ => {}
            },
            State::WaitForeignWarning | State::WaitForeignData => {
                if kind == FrameKind::Data {
                    self.stats.foreign_rx += 1;
                    self.enter_wait_foreign(now, State::WaitForeignAck, Reason::ForeignData);
                }
            }
            _ => {}
        }
    }

    // State entries. Each cancels the running timeout before switching.

    fn enter_idle(&mut self, now: f64, reason: Reason) {
        self.protocol_timer.cancel();
        self.set_state(State::Idle, reason);
        self.warning_sent = false;
        self.session_active = false;
        self.defer_data = false;
        self.peer = None;
        self.foreign.clear();

        loop {
            let (data_seq, tries) = match self.queue.front() {
                Some(front) => (front.data_seq, front.tries),
                None => return,
            };
            if Some(data_seq) != self.last_seq_tx {
                self.session_distance = None;
                self.backoff_counter = 0;
                self.last_seq_tx = Some(data_seq);
            }
            let allowed = self.config.max_tx_tries.map_or(true, |limit| tries < limit);
            if allowed {
                if let Some(front) = self.queue.front_mut() {
                    front.tries += 1;
                }
                self.enter_send_rts(now, Reason::DataPending);
                return;
            }
            self.queue_pop(now);
            self.stats.dropped += 1;
            logging::frame_drop_event(self.addr, FrameKind::Data, "attempt limit reached");
        }
    }

    fn enter_send_rts(&mut self, _now: f64, reason: Reason) {
        self.protocol_timer.cancel();
        self.session_active = true;
        self.set_state(State::SendRts, reason);
        let Some(front) = self.queue.front() else {
            return;
        };
        let (dst, data_seq, tries) = (front.dst, front.data_seq, front.tries);
        self.peer = Some(dst);
        self.stats.control_tx += 1;
        self.transmit_control(FrameKind::Rts, dst, data_seq, tries);
    }

    fn enter_wait_cts(&mut self, now: f64, reason: Reason) {
        self.protocol_timer.cancel();
        self.set_state(State::WaitCts, reason);
        let delay = timing::state_timeout(&self.config, State::WaitCts, 0);
        self.arm_protocol(now, delay);
    }

    fn enter_send_cts(&mut self, _now: f64, reason: Reason) {
        self.protocol_timer.cancel();
        self.set_state(State::SendCts, reason);
        let Some(peer) = self.peer else {
            return;
        };
        let data_seq = self.last_seq_rx.unwrap_or(0);
        self.stats.control_tx += 1;
        self.transmit_control(FrameKind::Cts, peer, data_seq, 0);
    }

    fn enter_send_warning(&mut self, now: f64, reason: Reason) {
        self.protocol_timer.cancel();
        self.set_state(State::SendWarning, reason);
        self.warning_sent = false;
        let delay = timing::state_timeout(&self.config, State::SendWarning, 0);
        self.arm_protocol(now, delay);
    }

    fn enter_wait_warning(&mut self, now: f64, reason: Reason) {
        self.protocol_timer.cancel();
        self.set_state(State::WaitWarning, reason);
        let delay = timing::state_timeout(&self.config, State::WaitWarning, 0);
        self.arm_protocol(now, delay);
    }

    fn enter_defer_data(&mut self, now: f64, reason: Reason) {
        self.protocol_timer.cancel();
        self.set_state(State::DeferData, reason);
        let distance = self.session_distance.unwrap_or_default();
        let delay = timing::handshake_wait_time(
            &self.config,
            self.config.ack_mode,
            distance,
            self.pending_data_size(),
        );
        self.stats.defers += 1;
        self.stats.defer_time_total += delay;
        self.arm_protocol(now, delay);
    }

    fn enter_send_data(&mut self, now: f64, reason: Reason) {
        self.protocol_timer.cancel();
        self.set_state(State::SendData, reason);
        self.defer_data = false;
        let Some(front) = self.queue.front() else {
            return;
        };
        let packet = Packet {
            protocol: ProtocolId::HANDSHAKE,
            src: self.addr,
            dst: front.dst,
            header: FrameHeader {
                kind: FrameKind::Data,
                frame_seq: 0,
                data_seq: front.data_seq,
                tries: front.tries,
                orig_protocol: front.protocol,
            },
            size: self.config.header_size + front.payload.len() as u32,
            payload: front.payload.clone(),
        };
        if self.config.ack_mode == AckMode::NoAck {
            self.queue_pop(now);
        }
        self.stats.data_tx += 1;
        self.transmit(packet);
    }

    fn enter_wait_ack(&mut self, now: f64, reason: Reason) {
        self.protocol_timer.cancel();
        self.set_state(State::WaitAck, reason);
        let delay = timing::state_timeout(&self.config, State::WaitAck, self.pending_data_size());
        self.arm_protocol(now, delay);
    }

    fn enter_wait_data(&mut self, now: f64, reason: Reason) {
        self.protocol_timer.cancel();
        self.set_state(State::WaitData, reason);
        let delay = timing::state_timeout(&self.config, State::WaitData, self.pending_data_size());
        self.arm_protocol(now, delay);
    }

    fn enter_data_received(&mut self, now: f64, packet: Packet) {
        self.protocol_timer.cancel();
        self.set_state(State::DataReceived, Reason::DataReceived);
        self.stats.data_rx += 1;
        logging::delivery_event(
            self.addr,
            packet.src,
            packet.header.orig_protocol,
            packet.payload.len(),
        );
        self.actions.push(Action::DeliverUp {
            src: packet.src,
            protocol: packet.header.orig_protocol,
            payload: packet.payload,
        });
        match self.config.ack_mode {
            AckMode::Ack => self.enter_send_ack(now, Reason::DataReceived),
            AckMode::NoAck => self.enter_idle(now, Reason::DataReceived),
        }
    }

    fn enter_send_ack(&mut self, _now: f64, reason: Reason) {
        self.protocol_timer.cancel();
        self.set_state(State::SendAck, reason);
        let Some(peer) = self.peer else {
            return;
        };
        let data_seq = self.last_seq_rx.unwrap_or(0);
        self.stats.control_tx += 1;
        self.transmit_control(FrameKind::Ack, peer, data_seq, 0);
    }

    fn enter_backoff(&mut self, now: f64, reason: Reason) {
        self.protocol_timer.cancel();
        self.set_state(State::Backoff, reason);
        self.warning_sent = false;
        self.defer_data = false;

        if !self.backoff_pending {
            if let Some(limit) = self.config.max_backoff_counter {
                self.backoff_counter = self.backoff_counter.min(limit);
            }
            self.stats.backoff_entries += 1;
            let duration =
                timing::backoff_duration(&self.config, &mut self.rng, self.backoff_counter);
            if self.prev_state == State::WaitCts || self.prev_state == State::WaitAck {
                self.backoff_counter += 1;
            }
            let deadline = now + duration;
            let generation = self.backoff_timer.arm(deadline);
            self.actions.push(Action::Arm {
                kind: TimerKind::Backoff,
                generation,
                deadline,
            });
        } else if let Some((generation, deadline)) = self.backoff_timer.resume(now) {
            self.actions.push(Action::Arm {
                kind: TimerKind::Backoff,
                generation,
                deadline,
            });
        }
        // Pending without freeze support: the countdown is already running.
    }

    fn enter_recontend(&mut self, now: f64, reason: Reason) {
        self.protocol_timer.cancel();
        self.set_state(State::RecontendWindow, reason);
        let delay = timing::recontend_duration(&self.config, &mut self.rng);
        self.arm_protocol(now, delay);
    }

    fn enter_wait_foreign(&mut self, now: f64, which: State, reason: Reason) {
        self.protocol_timer.cancel();
        self.set_state(which, reason);
        let delay = timing::state_timeout(&self.config, which, self.pending_data_size());
        self.arm_protocol(now, delay);
    }

    // Plumbing.

    fn set_state(&mut self, next: State, reason: Reason) {
        self.prev_state = self.state;
        self.state = next;
        logging::transition_event(self.addr, self.prev_state, next, reason);
    }

    fn arm_protocol(&mut self, now: f64, delay: f64) {
        let deadline = now + delay;
        let generation = self.protocol_timer.arm(deadline);
        self.actions.push(Action::Arm {
            kind: TimerKind::Protocol,
            generation,
            deadline,
        });
    }

    fn freeze_backoff(&mut self, now: f64) {
        self.backoff_timer.freeze(now);
        self.backoff_pending = true;
    }

    fn exit_backoff(&mut self) {
        self.backoff_timer.cancel();
        self.backoff_pending = false;
    }

    /// Retires the front of the queue and books its sojourn time.
    fn queue_pop(&mut self, now: f64) {
        if let Some(unit) = self.queue.pop() {
            self.stats.queue_departures += 1;
            self.stats.queue_wait_total += now - unit.enqueued_at;
        }
    }

    /// Size the next outgoing data frame will have, for timeout sizing.
    fn pending_data_size(&self) -> u32 {
        match self.queue.front() {
            Some(front) => self.config.header_size + front.payload.len() as u32,
            None => self.config.header_size + self.config.max_payload,
        }
    }

    /// Whether an overheard frame this fresh means the exchange it belongs
    /// to still has a reply under way that could collide with our data.
    fn reply_still_pending(&self, delay: f64) -> bool {
        delay < timing::warning_threshold(&self.config)
    }

    /// At most one warning goes out per listening window.
    fn tx_warning(&mut self) {
        if self.warning_sent {
            return;
        }
        let Some(peer) = self.peer else {
            return;
        };
        self.warning_sent = true;
        self.stats.warning_tx += 1;
        let data_seq = self.last_seq_rx.unwrap_or(0);
        self.transmit_control(FrameKind::Warning, peer, data_seq, 0);
    }

    fn transmit_control(&mut self, kind: FrameKind, dst: MacAddr, data_seq: u64, tries: u32) {
        let size = match kind {
            FrameKind::Rts => self.config.rts_size,
            FrameKind::Cts => self.config.cts_size,
            FrameKind::Warning => self.config.warning_size,
            FrameKind::Ack => self.config.ack_size,
            FrameKind::Data => self.config.header_size,
        };
        let packet = Packet {
            protocol: ProtocolId::HANDSHAKE,
            src: self.addr,
            dst,
            header: FrameHeader {
                kind,
                frame_seq: 0,
                data_seq,
                tries,
                orig_protocol: ProtocolId::HANDSHAKE,
            },
            size,
            payload: Message::default(),
        };
        self.transmit(packet);
    }

    fn transmit(&mut self, mut packet: Packet) {
        packet.header.frame_seq = self.frame_seq;
        self.frame_seq += 1;
        logging::frame_tx_event(self.addr, packet.header.kind, packet.dst, packet.size);
        self.actions.push(Action::Transmit(packet));
    }
}
