//! Per-node protocol counters.

/// Counters the engine maintains as it runs. Snapshot them at the end of a
/// run for reporting; none of them feed back into protocol decisions.
#[derive(Debug, Default, Clone, Copy)]
pub struct DacapStats {
    /// Data frames put on the channel.
    pub data_tx: u64,
    /// Data frames received and addressed to this node.
    pub data_rx: u64,
    /// RTS, CTS and ACK frames put on the channel.
    pub control_tx: u64,
    /// RTS, CTS and ACK frames received, own or overheard.
    pub control_rx: u64,
    /// Warning frames put on the channel.
    pub warning_tx: u64,
    /// Warning frames received.
    pub warning_rx: u64,
    /// Frames overheard that belonged to other nodes' exchanges.
    pub foreign_rx: u64,
    /// Receptions discarded because the channel corrupted them.
    pub corrupt_rx: u64,
    /// Receptions discarded for carrying a protocol tag that is not ours.
    pub unknown_rx: u64,
    /// Payloads accepted from the upper layer.
    pub accepted: u64,
    /// Payloads refused because the queue was full.
    pub rejected: u64,
    /// Data units abandoned after exhausting their attempts.
    pub dropped: u64,
    /// Payloads handed up to the destination's upper layer.
    pub delivered_up: u64,
    /// Times a backoff countdown was started.
    pub backoff_entries: u64,
    /// Times a granted handshake held its data back for an extra wait.
    pub defers: u64,
    /// Total extra holding time across those defers.
    pub defer_time_total: f64,
    /// Completed data units, whether confirmed or abandoned.
    pub queue_departures: u64,
    /// Total time completed units spent queued, from enqueue to departure.
    pub queue_wait_total: f64,
}

impl DacapStats {
    /// Mean time a data unit spent in the queue before leaving it.
    pub fn mean_queue_wait(&self) -> f64 {
        if self.queue_departures == 0 {
            0.0
        } else {
            self.queue_wait_total / self.queue_departures as f64
        }
    }

    /// Frames of any kind put on the channel.
    pub fn frames_tx(&self) -> u64 {
        self.data_tx + self.control_tx + self.warning_tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_wait_handles_empty_counts() {
        let stats = DacapStats::default();
        assert_eq!(stats.mean_queue_wait(), 0.0);
    }

    #[test]
    fn mean_wait_averages_departures() {
        let stats = DacapStats {
            queue_departures: 4,
            queue_wait_total: 10.0,
            ..Default::default()
        };
        assert_eq!(stats.mean_queue_wait(), 2.5);
    }
}
