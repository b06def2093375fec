//! tailgate core: the commit log with tail reads, the profile store, the authorization contract,
//! and the error surface shared by the server and tooling.
//!
//! This crate carries no transport dependencies. Only `tokio::sync` primitives are used (for the
//! tail notification and the store lock), so the core can be driven by any RPC front end.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Lock poisoning and other fallible paths surface as `TailgateError::Internal`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod authz;
pub mod error;
pub mod log;
pub mod store;

/// Shared result type.
pub use error::{ClientCode, Result, TailgateError};

pub use authz::{Action, Identity, PolicyDecisionPoint, OBJECT_WILDCARD};
pub use log::{CommitLog, Record, Tail};
pub use store::{MemoryProfileStore, ProfileRecord, ProfileStore};
