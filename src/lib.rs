//! Authenticated real-time chat relay.
//!
//! Clients authenticate once over HTTP to obtain a signed token, then open
//! a persistent WebSocket channel to exchange messages with a remote
//! text-generation backend while per-user conversation history is retained
//! in memory for the lifetime of the process.
//!
//! # Architecture
//!
//! - **Login**: `POST /api/v1/auth/login` trades credentials for an HS256 token
//! - **Chat channel**: `GET /api/v1/ai/chat?token=...` upgrades to a WebSocket
//!   session bound to the caller's transcript
//! - **History**: process-wide append-only transcripts, one per identity
//! - **Completion**: `OpenAI`-compatible Chat Completions client behind a trait
//!
//! # Modules
//!
//! - [`auth`]: Credential checks and identity tokens
//! - [`history`]: Per-identity transcript store
//! - [`llm`]: Completion service trait and client
//! - [`session`]: WebSocket lifecycle and the message round trip
//! - [`server`]: Router assembly and the login endpoint

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod auth;
pub mod config;
pub mod history;
pub mod llm;
pub mod server;
pub mod session;
pub mod telemetry;

use std::sync::Arc;

use crate::auth::{TokenService, UserDirectory};
use crate::config::AppConfig;
use crate::history::HistoryStore;
use crate::llm::CompletionService;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Global configuration.
    pub config: Arc<AppConfig>,
    /// Token issue/verify service.
    pub tokens: TokenService,
    /// Credential directory.
    pub users: Arc<dyn UserDirectory>,
    /// Completion backend client.
    pub completions: Arc<dyn CompletionService>,
    /// Per-identity transcripts.
    pub history: HistoryStore,
}
