//! tailgate server library entry.
//!
//! Wires mTLS identity, the ACL authorization gate, the commit log and the profile store into a
//! gRPC service, plus an ops HTTP listener. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod agent;
pub mod api;
pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod policy;
pub mod router;
pub mod rpc;
pub mod transport;
