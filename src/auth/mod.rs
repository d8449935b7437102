//! Authentication: credential checks and identity tokens.
//!
//! Login trades a username/password pair for a signed token; every chat
//! connection then proves itself with that token alone. The two halves are
//! deliberately separate: the [`UserDirectory`] is an external collaborator
//! behind a trait, while the [`TokenService`] is pure computation over a
//! process-wide secret.
//!
//! # Architecture
//!
//! - [`TokenService`]: HS256 issue/verify with a fixed issuer and strict expiry
//! - [`UserDirectory`]: Credential-check seam, implemented in-memory by
//!   [`MemoryDirectory`]

mod directory;
mod token;

pub use directory::{MemoryDirectory, UserDirectory};
pub use token::{TokenClaims, TokenError, TokenService};
