//! Protocol states and transition reasons.

use std::fmt::Display;

/// The handshake engine's state.
///
/// `Idle` is initial; there is no terminal state. The `Send*` states last for
/// the duration of the corresponding transmission, `DataReceived` only for
/// the instant between a data reception and the follow-up it triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Idle,
    SendRts,
    WaitCts,
    WaitWarning,
    DeferData,
    SendData,
    WaitAck,
    SendCts,
    SendWarning,
    WaitData,
    DataReceived,
    SendAck,
    Backoff,
    RecontendWindow,
    WaitForeignCts,
    WaitForeignWarning,
    WaitForeignData,
    WaitForeignAck,
}

impl Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            State::Idle => "idle",
            State::SendRts => "send-rts",
            State::WaitCts => "wait-cts",
            State::WaitWarning => "wait-warning",
            State::DeferData => "defer-data",
            State::SendData => "send-data",
            State::WaitAck => "wait-ack",
            State::SendCts => "send-cts",
            State::SendWarning => "warning-window",
            State::WaitData => "wait-data",
            State::DataReceived => "data-received",
            State::SendAck => "send-ack",
            State::Backoff => "backoff",
            State::RecontendWindow => "recontend-window",
            State::WaitForeignCts => "wait-foreign-cts",
            State::WaitForeignWarning => "wait-foreign-warning",
            State::WaitForeignData => "wait-foreign-data",
            State::WaitForeignAck => "wait-foreign-ack",
        };
        write!(f, "{name}")
    }
}

/// Why the last transition happened. Carried for logging and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    DataPending,
    RtsSent,
    RtsReceived,
    SameRtsReceived,
    CtsSent,
    CtsReceived,
    CtsTimeout,
    WarningReceived,
    NoWarning,
    WarningWindowEnd,
    DeferEnd,
    DataSent,
    DataReceived,
    DataTimeout,
    AckSent,
    AckReceived,
    AckTimeout,
    BackoffPending,
    BackoffEnd,
    RecontendEnd,
    MaxTriesExceeded,
    ForeignRts,
    ForeignCts,
    ForeignData,
    ForeignSessionEnded,
    ForeignCtsWindowEnd,
    ForeignWarningWindowEnd,
    ForeignDataWindowEnd,
    ForeignAckWindowEnd,
}

impl Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Reason::DataPending => "data pending",
            Reason::RtsSent => "RTS sent",
            Reason::RtsReceived => "RTS received",
            Reason::SameRtsReceived => "repeated RTS for the current data unit",
            Reason::CtsSent => "CTS sent",
            Reason::CtsReceived => "CTS received",
            Reason::CtsTimeout => "no CTS within timeout",
            Reason::WarningReceived => "warning received",
            Reason::NoWarning => "no warning heard",
            Reason::WarningWindowEnd => "warning window over",
            Reason::DeferEnd => "defer elapsed",
            Reason::DataSent => "data sent",
            Reason::DataReceived => "data received",
            Reason::DataTimeout => "no data within timeout",
            Reason::AckSent => "ACK sent",
            Reason::AckReceived => "ACK received",
            Reason::AckTimeout => "no ACK within timeout",
            Reason::BackoffPending => "pending backoff resumed",
            Reason::BackoffEnd => "backoff elapsed",
            Reason::RecontendEnd => "recontend window over",
            Reason::MaxTriesExceeded => "attempt limit reached",
            Reason::ForeignRts => "foreign RTS overheard",
            Reason::ForeignCts => "foreign CTS overheard",
            Reason::ForeignData => "foreign data overheard",
            Reason::ForeignSessionEnded => "foreign exchange concluded",
            Reason::ForeignCtsWindowEnd => "foreign CTS never came",
            Reason::ForeignWarningWindowEnd => "foreign warning window over",
            Reason::ForeignDataWindowEnd => "foreign data never came",
            Reason::ForeignAckWindowEnd => "foreign ACK never came",
        };
        write!(f, "{text}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_labels() {
        assert_eq!(State::Idle.to_string(), "idle");
        assert_eq!(State::WaitForeignCts.to_string(), "wait-foreign-cts");
    }

    #[test]
    fn reason_labels() {
        assert_eq!(Reason::CtsTimeout.to_string(), "no CTS within timeout");
        assert_eq!(Reason::ForeignRts.to_string(), "foreign RTS overheard");
    }
}
