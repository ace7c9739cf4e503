//! Serial pulse configuration protocol
//!
//! A host configures a one-shot pulse train over UART with a short ASCII
//! exchange:
//!
//! ```text
//! host  → '9'                 start marker
//! rig   → "913"               announce, repeated until acknowledged
//! host  → '1'                 acknowledge
//! host  → d d                 duty percent, two ASCII digits, each echoed
//! host  → "523"               field terminator
//! host  → d d                 pulse count, two ASCII digits, each echoed
//! host  → "523"               field terminator
//! ```
//!
//! A field whose terminator does not match is discarded and re-sent by
//! the host. The session itself is a pure byte-fed state machine;
//! [`link`] runs it over a blocking UART with the pacing the host
//! expects.

#![no_std]
#![deny(unsafe_code)]

pub mod link;
pub mod session;

pub use link::{receive_settings, LinkError, PACING_MS};
pub use session::{ConfigSession, PulseSettings, Reply, SessionError};

/// Byte that opens a session
pub const START_MARKER: u8 = b'9';

/// Announcement sent until the host acknowledges
pub const ANNOUNCE: &[u8; 3] = b"913";

/// Host acknowledgement of the announcement
pub const ACK: u8 = b'1';

/// Terminator that commits a field
pub const TERMINATOR: &[u8; 3] = b"523";

/// Sent once the pulse train has run
pub const DONE: &[u8] = b"Done";
