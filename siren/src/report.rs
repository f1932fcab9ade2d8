//! Per-node results of a finished run.

use std::io::Write;

use itertools::Itertools;
use serde::Serialize;
use siren_core::{MacAddr, Ocean};

/// One row of the results table.
#[derive(Debug, Clone, Serialize)]
pub struct NodeReport {
    pub node: String,
    pub addr: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub dropped: u64,
    pub data_sent: u64,
    pub delivered: u64,
    pub corrupt: u64,
    pub backoffs: u64,
    pub mean_queue_wait: f64,
}

/// Collects a report row for every named node.
pub fn gather(ocean: &Ocean, names: &[(String, MacAddr)]) -> Vec<NodeReport> {
    names
        .iter()
        .filter_map(|(name, addr)| {
            let node = ocean.node(*addr)?;
            let stats = node.mac().stats();
            Some(NodeReport {
                node: name.clone(),
                addr: (*addr).into(),
                accepted: stats.accepted,
                rejected: stats.rejected,
                dropped: stats.dropped,
                data_sent: stats.data_tx,
                delivered: stats.delivered_up,
                corrupt: stats.corrupt_rx,
                backoffs: stats.backoff_entries,
                mean_queue_wait: stats.mean_queue_wait(),
            })
        })
        .collect()
}

/// Writes the rows as CSV, header included.
pub fn write_csv<W: Write>(writer: W, rows: &[NodeReport]) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// One line per node for the console.
pub fn summary(rows: &[NodeReport]) -> String {
    rows.iter()
        .map(|row| {
            format!(
                "{}: accepted {} sent {} delivered {} dropped {} corrupt {}",
                row.node, row.accepted, row.data_sent, row.delivered, row.dropped, row.corrupt
            )
        })
        .join("\n")
}

#[cfg(test)]
mod tests {
    use siren_core::{DacapConfig, Message, Position, ProtocolId};

    use super::*;

    fn finished_pair() -> (Ocean, Vec<(String, MacAddr)>) {
        let mut ocean = Ocean::new();
        let a = ocean.add_node(Position::new(0.0, 0.0, -50.0), DacapConfig::default(), 1);
        let b = ocean.add_node(Position::new(750.0, 0.0, -50.0), DacapConfig::default(), 2);
        ocean.send_at(0.0, a, b, ProtocolId::new(9), Message::new(b"row"));
        ocean.run_until(10.0);
        (ocean, vec![("alpha".into(), a), ("bravo".into(), b)])
    }

    #[test]
    fn rows_carry_the_scenario_names() {
        let (ocean, names) = finished_pair();
        let rows = gather(&ocean, &names);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].node, "alpha");
        assert_eq!(rows[0].data_sent, 1);
        assert_eq!(rows[1].delivered, 1);
    }

    #[test]
    fn csv_has_a_header_and_a_row_per_node() -> anyhow::Result<()> {
        let (ocean, names) = finished_pair();
        let rows = gather(&ocean, &names);

        let mut out = Vec::new();
        write_csv(&mut out, &rows)?;
        let text = String::from_utf8(out)?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("node,addr,accepted"));
        assert!(lines[1].starts_with("alpha,0,1"));
        Ok(())
    }

    #[test]
    fn summary_is_one_line_per_node() {
        let (ocean, names) = finished_pair();
        let rows = gather(&ocean, &names);
        let summary = summary(&rows);
        assert_eq!(summary.lines().count(), 2);
        assert!(summary.contains("bravo: accepted 0"));
    }
}
