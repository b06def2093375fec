//! Policy layer (ACL + authorization gate).
//!
//! Compiles the configured ACL into a `PolicyDecisionPoint` and wraps any PDP in the
//! `AuthorizationGate` the RPC handlers call before touching state.

pub mod acl;
pub mod gate;

pub use acl::AclPolicy;
pub use gate::{AuthorizationGate, RpcMethod};
