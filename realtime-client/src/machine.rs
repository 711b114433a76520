use std::fmt;
use std::time::Duration;

use crate::backoff::Backoff;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// The last attempt failed; a retry is scheduled.
    Error,
    /// A retry is in flight.
    Reconnecting,
    Closed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Error => "error",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Everything that can move the machine. Transport outcomes come from the
/// connection itself; the rest are environment signals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Start,
    Opened,
    TransportFailed(String),
    RetryDue,
    Hidden,
    Visible,
    Offline,
    Online,
    Close,
}

/// What the driver has to do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineAction {
    Connect,
    RetryAfter(Duration),
    /// Drop the connection and any pending retry.
    Disconnect,
    Nothing,
}

/// Transport-independent reconnect logic. Pure: no I/O, no clock.
#[derive(Debug, Clone)]
pub struct ConnectionMachine {
    state: ConnectionState,
    backoff: Backoff,
    started: bool,
    hidden: bool,
    offline: bool,
}

impl ConnectionMachine {
    pub fn new(backoff: Backoff) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            backoff,
            started: false,
            hidden: false,
            offline: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    fn suspended(&self) -> bool {
        self.hidden || self.offline
    }

    pub fn handle(&mut self, signal: Signal) -> MachineAction {
        if self.state == ConnectionState::Closed {
            return MachineAction::Nothing;
        }
        match signal {
            Signal::Start => {
                self.started = true;
                self.resume()
            }
            Signal::Opened => match self.state {
                ConnectionState::Connecting | ConnectionState::Reconnecting => {
                    self.state = ConnectionState::Connected;
                    self.backoff.reset();
                    MachineAction::Nothing
                }
                _ => MachineAction::Nothing,
            },
            Signal::TransportFailed(_) => match self.state {
                ConnectionState::Connecting
                | ConnectionState::Connected
                | ConnectionState::Reconnecting => {
                    self.state = ConnectionState::Error;
                    MachineAction::RetryAfter(self.backoff.next_delay())
                }
                _ => MachineAction::Nothing,
            },
            Signal::RetryDue => {
                if self.state == ConnectionState::Error && !self.suspended() {
                    self.state = ConnectionState::Reconnecting;
                    MachineAction::Connect
                } else {
                    MachineAction::Nothing
                }
            }
            Signal::Hidden => {
                self.hidden = true;
                self.suspend()
            }
            Signal::Offline => {
                self.offline = true;
                self.suspend()
            }
            Signal::Visible => {
                self.hidden = false;
                self.resume()
            }
            Signal::Online => {
                self.offline = false;
                self.resume()
            }
            Signal::Close => {
                self.state = ConnectionState::Closed;
                MachineAction::Disconnect
            }
        }
    }

    fn suspend(&mut self) -> MachineAction {
        if self.state == ConnectionState::Disconnected {
            return MachineAction::Nothing;
        }
        self.state = ConnectionState::Disconnected;
        MachineAction::Disconnect
    }

    /// Reconnects immediately with a fresh backoff once nothing holds the connection down.
    fn resume(&mut self) -> MachineAction {
        if !self.started || self.suspended() || self.state != ConnectionState::Disconnected {
            return MachineAction::Nothing;
        }
        self.backoff.reset();
        self.state = ConnectionState::Connecting;
        MachineAction::Connect
    }
}

impl Default for ConnectionMachine {
    fn default() -> Self {
        Self::new(Backoff::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed() -> Signal {
        Signal::TransportFailed("connection refused".to_string())
    }

    #[test]
    fn start_connects_and_open_settles() {
        let mut machine = ConnectionMachine::default();
        assert_eq!(machine.state(), ConnectionState::Disconnected);
        assert_eq!(machine.handle(Signal::Start), MachineAction::Connect);
        assert_eq!(machine.state(), ConnectionState::Connecting);
        assert_eq!(machine.handle(Signal::Opened), MachineAction::Nothing);
        assert_eq!(machine.state(), ConnectionState::Connected);
    }

    #[test]
    fn failures_back_off_until_a_connect_succeeds() {
        let mut machine = ConnectionMachine::default();
        machine.handle(Signal::Start);
        let mut delays = Vec::new();
        for _ in 0..6 {
            match machine.handle(failed()) {
                MachineAction::RetryAfter(delay) => delays.push(delay.as_secs()),
                other => panic!("unexpected action {:?}", other),
            }
            assert_eq!(machine.state(), ConnectionState::Error);
            assert_eq!(machine.handle(Signal::RetryDue), MachineAction::Connect);
            assert_eq!(machine.state(), ConnectionState::Reconnecting);
        }
        assert_eq!(delays, vec![1, 2, 4, 8, 16, 30]);

        machine.handle(Signal::Opened);
        assert_eq!(machine.state(), ConnectionState::Connected);
        assert_eq!(
            machine.handle(failed()),
            MachineAction::RetryAfter(Duration::from_secs(1))
        );
    }

    #[test]
    fn hidden_tab_drops_the_connection_and_visible_reconnects_fresh() {
        let mut machine = ConnectionMachine::default();
        machine.handle(Signal::Start);
        machine.handle(failed());
        machine.handle(Signal::RetryDue);
        machine.handle(failed());

        assert_eq!(machine.handle(Signal::Hidden), MachineAction::Disconnect);
        assert_eq!(machine.state(), ConnectionState::Disconnected);
        assert_eq!(machine.handle(Signal::RetryDue), MachineAction::Nothing);

        assert_eq!(machine.handle(Signal::Visible), MachineAction::Connect);
        assert_eq!(machine.state(), ConnectionState::Connecting);
        assert_eq!(
            machine.handle(failed()),
            MachineAction::RetryAfter(Duration::from_secs(1))
        );
    }

    #[test]
    fn both_suspensions_must_lift_before_reconnecting() {
        let mut machine = ConnectionMachine::default();
        machine.handle(Signal::Start);
        machine.handle(Signal::Opened);
        assert_eq!(machine.handle(Signal::Offline), MachineAction::Disconnect);
        assert_eq!(machine.handle(Signal::Hidden), MachineAction::Nothing);
        assert_eq!(machine.handle(Signal::Online), MachineAction::Nothing);
        assert_eq!(machine.state(), ConnectionState::Disconnected);
        assert_eq!(machine.handle(Signal::Visible), MachineAction::Connect);
    }

    #[test]
    fn signals_before_start_do_not_connect() {
        let mut machine = ConnectionMachine::default();
        assert_eq!(machine.handle(Signal::Visible), MachineAction::Nothing);
        assert_eq!(machine.handle(Signal::Online), MachineAction::Nothing);
        machine.handle(Signal::Hidden);
        assert_eq!(machine.handle(Signal::Start), MachineAction::Nothing);
        assert_eq!(machine.handle(Signal::Visible), MachineAction::Connect);
    }

    #[test]
    fn closed_is_terminal() {
        let mut machine = ConnectionMachine::default();
        machine.handle(Signal::Start);
        assert_eq!(machine.handle(Signal::Close), MachineAction::Disconnect);
        for signal in [Signal::Start, Signal::Visible, Signal::Online, Signal::RetryDue, Signal::Opened] {
            assert_eq!(machine.handle(signal), MachineAction::Nothing);
            assert_eq!(machine.state(), ConnectionState::Closed);
        }
    }
}
