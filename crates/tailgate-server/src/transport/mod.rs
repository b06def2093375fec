//! Transport layer (mutual TLS).
//!
//! Holds the TLS material the listener is configured with and the per-call interceptor that
//! turns a verified handshake into a caller identity.

pub mod identity;
pub mod tls;

pub use identity::{authenticate, caller, subject_from_leaf, AuthInterceptor, PeerInfo};
pub use tls::TlsMaterial;
