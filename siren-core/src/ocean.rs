//! The shared acoustic channel and the event loop that drives it.

use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

use crate::{
    config::{DacapConfig, SOUND_SPEED},
    dacap::{timer::TimerKind, timing, Action},
    event::{Event, ScheduledEvent, SequenceNumber},
    id::{MacAddr, ProtocolId},
    message::Message,
    node::{Delivery, Node, Position},
    packet::{Packet, RxInfo},
};

/// A frame on its way to one receiver.
struct PendingRx {
    packet: Packet,
    tx_begin: f64,
    rx_begin: f64,
    corrupt: bool,
}

/// Discrete event simulator for a pool of acoustic nodes.
///
/// Every transmission reaches every other node in range, delayed by distance
/// at the speed of sound. Receptions that overlap in time at a node corrupt
/// each other; the frames still occupy the channel for their full duration
/// and are reported to the engine as corrupt when they end.
pub struct Ocean {
    /// All nodes, keyed by address.
    nodes: FxHashMap<MacAddr, Node>,
    /// Addresses in the order nodes were added.
    order: Vec<MacAddr>,
    /// Current simulation time, seconds.
    current_time: f64,
    /// Priority queue of scheduled events.
    event_queue: BinaryHeap<ScheduledEvent>,
    /// Next sequence number for event ordering.
    next_seq: u64,
    /// Next id for a frame-receiver pair in flight.
    next_rx_id: u64,
    /// Frames in flight, keyed by rx id.
    pending: FxHashMap<u64, PendingRx>,
    /// Rx ids currently arriving at each node, for overlap detection.
    arriving: FxHashMap<MacAddr, Vec<u64>>,
    /// Maximum distance a frame can be heard at. `None` reaches everyone.
    transmission_range: Option<f64>,
}

impl Ocean {
    pub fn new() -> Self {
        Self {
            nodes: FxHashMap::default(),
            order: Vec::new(),
            current_time: 0.0,
            event_queue: BinaryHeap::new(),
            next_seq: 0,
            next_rx_id: 0,
            pending: FxHashMap::default(),
            arriving: FxHashMap::default(),
            transmission_range: None,
        }
    }

    /// Limits how far a transmission carries.
    pub fn with_transmission_range(mut self, range: f64) -> Self {
        self.transmission_range = Some(range);
        self
    }

    /// Moors a node at the given position and returns its address.
    ///
    /// Addresses are handed out in order starting from zero.
    pub fn add_node(&mut self, position: Position, config: DacapConfig, seed: u64) -> MacAddr {
        let addr = MacAddr::new(self.order.len() as u64);
        self.nodes.insert(addr, Node::new(addr, position, config, seed));
        self.order.push(addr);
        addr
    }

    pub fn node(&self, addr: MacAddr) -> Option<&Node> {
        self.nodes.get(&addr)
    }

    pub fn node_mut(&mut self, addr: MacAddr) -> Option<&mut Node> {
        self.nodes.get_mut(&addr)
    }

    /// All nodes in the order they were added.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|addr| self.nodes.get(addr))
    }

    pub fn addrs(&self) -> &[MacAddr] {
        &self.order
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Queues a payload handoff to `from`'s engine at an absolute virtual
    /// time.
    pub fn send_at(
        &mut self,
        time: f64,
        from: MacAddr,
        dst: MacAddr,
        protocol: ProtocolId,
        payload: Message,
    ) {
        self.schedule(
            time,
            Event::Inject {
                node: from,
                dst,
                protocol,
                payload,
            },
        );
    }

    /// Runs the simulation until the given virtual time.
    ///
    /// Events stamped exactly at `end_time` are still processed, and the
    /// clock lands on `end_time` even when the queue drains early.
    pub fn run_until(&mut self, end_time: f64) {
        while let Some(scheduled) = self.pop_due(end_time) {
            self.advance_time(scheduled.time);
            self.process_event(scheduled.event);
        }
        self.advance_time(end_time);
    }

    /// Runs until no events remain.
    pub fn run(&mut self) {
        while let Some(scheduled) = self.event_queue.pop() {
            self.advance_time(scheduled.time);
            self.process_event(scheduled.event);
        }
    }

    fn pop_due(&mut self, end_time: f64) -> Option<ScheduledEvent> {
        if self.event_queue.peek()?.time > end_time {
            return None;
        }
        self.event_queue.pop()
    }

    fn schedule(&mut self, time: f64, event: Event) {
        let seq = SequenceNumber::new(self.next_seq);
        self.next_seq += 1;
        self.event_queue.push(ScheduledEvent::new(time, seq, event));
    }

    fn advance_time(&mut self, time: f64) {
        if time > self.current_time {
            self.current_time = time;
        }
    }

    fn process_event(&mut self, event: Event) {
        match event {
            Event::StartReception { to, rx_id } => self.start_reception(to, rx_id),
            Event::EndReception { to, rx_id } => self.end_reception(to, rx_id),
            Event::EndTransmission { node } => self.end_transmission(node),
            Event::TimerFire {
                node,
                kind,
                generation,
            } => self.timer_fire(node, kind, generation),
            Event::Inject {
                node,
                dst,
                protocol,
                payload,
            } => self.inject(node, dst, protocol, payload),
        }
    }

    fn inject(&mut self, addr: MacAddr, dst: MacAddr, protocol: ProtocolId, payload: Message) {
        let now = self.current_time;
        let Some(node) = self.nodes.get_mut(&addr) else {
            return;
        };
        // A full queue is routine under load; the engine has already counted
        // the rejection.
        let _ = node.mac_mut().enqueue(now, dst, protocol, payload);
        self.dispatch_actions(addr);
    }

    fn timer_fire(&mut self, addr: MacAddr, kind: TimerKind, generation: u64) {
        let now = self.current_time;
        let Some(node) = self.nodes.get_mut(&addr) else {
            return;
        };
        node.mac_mut().on_timer(now, kind, generation);
        self.dispatch_actions(addr);
    }

    fn end_transmission(&mut self, addr: MacAddr) {
        let now = self.current_time;
        let Some(node) = self.nodes.get_mut(&addr) else {
            return;
        };
        node.mac_mut().on_end_tx(now);
        self.dispatch_actions(addr);
    }

    fn start_reception(&mut self, to: MacAddr, rx_id: u64) {
        let now = self.current_time;

        let overlapping = self.arriving.entry(to).or_default();
        if !overlapping.is_empty() {
            // Concurrent arrivals corrupt every frame involved.
            for other in overlapping.iter() {
                if let Some(pending) = self.pending.get_mut(other) {
                    pending.corrupt = true;
                }
            }
            if let Some(pending) = self.pending.get_mut(&rx_id) {
                pending.corrupt = true;
            }
        }
        overlapping.push(rx_id);

        if let Some(node) = self.nodes.get_mut(&to) {
            node.mac_mut().on_start_rx(now);
        }
    }

    fn end_reception(&mut self, to: MacAddr, rx_id: u64) {
        let now = self.current_time;

        if let Some(overlapping) = self.arriving.get_mut(&to) {
            overlapping.retain(|&id| id != rx_id);
        }
        let Some(pending) = self.pending.remove(&rx_id) else {
            return;
        };
        let info = RxInfo {
            tx_begin: pending.tx_begin,
            rx_begin: pending.rx_begin,
            corrupt: pending.corrupt,
        };

        if let Some(node) = self.nodes.get_mut(&to) {
            node.mac_mut().on_reception(now, pending.packet, info);
        }
        self.dispatch_actions(to);
    }

    /// Drains the engine's actions and turns them into channel activity and
    /// future events.
    fn dispatch_actions(&mut self, addr: MacAddr) {
        // Collect the actions first so routing can borrow the node table.
        let actions = match self.nodes.get_mut(&addr) {
            Some(node) => node.mac_mut().take_actions(),
            None => return,
        };

        for action in actions {
            match action {
                Action::Transmit(packet) => self.transmit(addr, packet),
                Action::Arm {
                    kind,
                    generation,
                    deadline,
                } => {
                    self.schedule(
                        deadline,
                        Event::TimerFire {
                            node: addr,
                            kind,
                            generation,
                        },
                    );
                }
                Action::DeliverUp {
                    src,
                    protocol,
                    payload,
                } => {
                    let at = self.current_time;
                    if let Some(node) = self.nodes.get_mut(&addr) {
                        node.record_delivery(Delivery {
                            at,
                            src,
                            protocol,
                            payload,
                        });
                    }
                }
            }
        }
    }

    /// Puts a frame on the channel: occupies the sender for its duration and
    /// schedules its arrival at every node in range.
    fn transmit(&mut self, from: MacAddr, packet: Packet) {
        let now = self.current_time;
        let Some(sender) = self.nodes.get(&from) else {
            return;
        };
        let origin = sender.position();
        let duration = timing::tx_duration(sender.mac().config(), packet.size);

        // Collect the receivers first to avoid borrow conflicts while
        // scheduling.
        let receivers: Vec<(MacAddr, f64)> = self
            .order
            .iter()
            .filter(|&&addr| addr != from)
            .filter_map(|&addr| {
                let node = self.nodes.get(&addr)?;
                let distance = origin.distance(&node.position());
                match self.transmission_range {
                    Some(range) if distance > range => None,
                    _ => Some((addr, distance)),
                }
            })
            .collect();

        self.schedule(now + duration, Event::EndTransmission { node: from });

        for (to, distance) in receivers {
            let rx_id = self.next_rx_id;
            self.next_rx_id += 1;
            let rx_begin = now + distance / SOUND_SPEED;
            self.pending.insert(
                rx_id,
                PendingRx {
                    packet: packet.clone(),
                    tx_begin: now,
                    rx_begin,
                    corrupt: false,
                },
            );
            self.schedule(rx_begin, Event::StartReception { to, rx_id });
            self.schedule(rx_begin + duration, Event::EndReception { to, rx_id });
        }
    }
}

impl Default for Ocean {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dacap::state::State;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn moor(ocean: &mut Ocean, x: f64) -> MacAddr {
        let seed = ocean.addrs().len() as u64;
        ocean.add_node(Position::new(x, 0.0, -100.0), DacapConfig::default(), seed)
    }

    #[test]
    fn two_nodes_complete_an_acknowledged_exchange() {
        let mut ocean = Ocean::new();
        let a = moor(&mut ocean, 0.0);
        let b = moor(&mut ocean, 1500.0);

        ocean.send_at(0.0, a, b, ProtocolId::new(42), Message::new(b"ping"));
        ocean.run_until(6.0);

        let receiver = ocean.node(b).unwrap();
        let delivered = receiver.delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].src, a);
        assert_eq!(delivered[0].protocol, ProtocolId::new(42));
        assert_eq!(delivered[0].payload, Message::new(b"ping"));
        // RTS leaves at 0, the CTS is back at 2.08, the 0.64 s warning window
        // passes quietly, and the 28 byte frame lands 1.0467 s later.
        assert!(close(delivered[0].at, 2.72 + 1.0 + 28.0 * 8.0 / 4800.0));

        assert_eq!(ocean.node(a).unwrap().mac().stats().data_tx, 1);
        assert_eq!(receiver.mac().stats().delivered_up, 1);
        assert_eq!(ocean.node(a).unwrap().mac().state(), State::Idle);
        assert_eq!(receiver.mac().state(), State::Idle);
        assert!(close(ocean.current_time(), 6.0));
    }

    #[test]
    fn out_of_range_nodes_hear_nothing() {
        let mut ocean = Ocean::new().with_transmission_range(1000.0);
        let a = moor(&mut ocean, 0.0);
        let b = moor(&mut ocean, 1500.0);

        ocean.send_at(0.0, a, b, ProtocolId::new(42), Message::new(b"ping"));
        ocean.run_until(2.0);

        let receiver = ocean.node(b).unwrap();
        assert_eq!(receiver.mac().stats().control_rx, 0);
        assert_eq!(receiver.mac().stats().corrupt_rx, 0);
        assert!(receiver.delivered().is_empty());
        assert_eq!(ocean.node(a).unwrap().mac().state(), State::WaitCts);
    }

    #[test]
    fn overlapping_receptions_corrupt_both_frames() {
        let mut ocean = Ocean::new();
        let a = moor(&mut ocean, 0.0);
        let b = moor(&mut ocean, 750.0);
        let c = moor(&mut ocean, 1500.0);

        // Both outer nodes fire an RTS at the same instant; the two frames
        // overlap exactly at the middle node.
        ocean.send_at(0.0, a, b, ProtocolId::new(1), Message::new(b"left"));
        ocean.send_at(0.0, c, b, ProtocolId::new(1), Message::new(b"right"));
        ocean.run_until(2.0);

        let middle = ocean.node(b).unwrap();
        assert_eq!(middle.mac().stats().corrupt_rx, 2);
        assert_eq!(middle.mac().stats().control_rx, 0);
        assert!(middle.delivered().is_empty());
        assert_eq!(middle.mac().state(), State::Idle);
    }

    #[test]
    fn clock_reaches_the_horizon_without_events() {
        let mut ocean = Ocean::new();
        ocean.run_until(5.0);
        assert!(close(ocean.current_time(), 5.0));
    }
}
