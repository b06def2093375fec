//! Top-level facade crate for tailgate.
//!
//! Re-exports the core log/store/policy types and the server library so users can depend on a
//! single crate.

pub mod core {
    pub use tailgate_core::*;
}

pub mod server {
    pub use tailgate_server::*;
}
