// Realtime subscription client
// One shared push connection per terminal, with reconnect and per-event listeners

pub mod backoff;
pub mod listeners;
pub mod machine;
pub mod manager;
pub mod transport;

pub use backoff::Backoff;
pub use listeners::{ListenerId, ListenerRegistry};
pub use machine::{ConnectionMachine, ConnectionState, MachineAction, Signal};
pub use manager::SubscriptionManager;
pub use transport::{Connection, Transport, TransportError, WsTransport};
