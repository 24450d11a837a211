//! Sans-IO connection core for the Impulse chat client.
//!
//! A pure [`Connection`] state machine drives the lifecycle (connect,
//! auth handshake, messaging, disconnect) without touching sockets or
//! clocks: the driver feeds in transport events and wall-clock
//! [`Stamp`]s and executes the returned [`ConnectionAction`]s. The
//! [`LogSink`] collects capped, stamped diagnostics on the side.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod connection;
mod error;
mod log;
mod session;
mod stamp;

pub use connection::{Connection, ConnectionAction, ConnectionState, NORMAL_CLOSE_CODE};
pub use error::ConnectionError;
pub use log::LogSink;
pub use session::SessionContext;
pub use stamp::Stamp;
