//! Per-identity conversation history.
//!
//! This module provides the process-wide transcript store. A transcript is
//! the ordered turn history for one identity; it outlives any single
//! connection, so a client that reconnects resumes with full memory.
//!
//! # Architecture
//!
//! - [`Turn`]: One user or assistant utterance
//! - [`Transcript`]: Shared handle to one identity's ordered turn list
//! - [`HistoryStore`]: Thread-safe identity-to-transcript mapping
//!
//! # Example
//!
//! ```rust
//! use chat_relay::history::HistoryStore;
//!
//! let store = HistoryStore::new();
//! let transcript = store.get_or_create("alice");
//! transcript.append_user("Hello!");
//!
//! assert_eq!(store.get_or_create("alice").len(), 1);
//! ```

mod store;

pub use store::{HistoryStore, Speaker, Transcript, Turn};
