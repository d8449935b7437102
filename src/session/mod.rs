//! Chat session management.
//!
//! A session is the live binding between one WebSocket connection, one
//! authenticated identity, and that identity's transcript. The lifecycle is
//! a small state machine: the upgrade completes, the presented token is
//! verified (rejecting with a policy-violation close on failure), and an
//! accepted connection then runs the message loop until the client leaves
//! or the transport fails.
//!
//! Each inbound message makes one strictly sequential round trip:
//! parse, append the user turn, snapshot the transcript, call the
//! completion backend, append the assistant turn, send the reply envelope.
//! Malformed messages are dropped without touching the transcript; backend
//! failures are answered with a fixed error reply and do not end the
//! session.
//!
//! # Architecture
//!
//! - [`chat_ws`]: Upgrade handler wired into the router
//! - [`InboundMessage`] / [`OutboundMessage`]: The wire envelopes

mod connection;
pub mod protocol;

pub use connection::{ChatQuery, chat_ws};
pub use protocol::{InboundMessage, OutboundMessage, RESPONSE_KIND, STATUS_COMPLETE};
