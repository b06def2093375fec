//! Authorization contract: caller identity, actions, and the policy decision point.
//!
//! The gate itself lives in the server crate; this module only defines the vocabulary both sides
//! agree on, so any rule representation (static ACL, RBAC, remote PDP) can sit behind the trait.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{Result, TailgateError};

/// Object name every RPC is checked against.
pub const OBJECT_WILDCARD: &str = "*";

/// Caller identity derived from a verified transport credential.
/// Immutable for the lifetime of one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    subject: Arc<str>,
}

impl Identity {
    pub fn new(subject: impl Into<Arc<str>>) -> Self {
        Self {
            subject: subject.into(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.subject)
    }
}

/// Operation class an authorization rule is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Produce,
    Consume,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Create,
        Action::Read,
        Action::Update,
        Action::Delete,
        Action::Produce,
        Action::Consume,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Produce => "produce",
            Action::Consume => "consume",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = TailgateError;

    fn from_str(s: &str) -> Result<Self> {
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| TailgateError::InvalidArgument(format!("unknown action: {s}")))
    }
}

/// Policy Decision Point: answers whether `subject` may perform `action` on `object`.
///
/// Implementations must be side-effect free. An `Err` means the decision could not be made
/// (malformed policy, unreachable backend); callers treat it as a deny.
pub trait PolicyDecisionPoint: Send + Sync {
    fn decide(&self, subject: &str, object: &str, action: &str) -> Result<bool>;
}

impl<P: PolicyDecisionPoint + ?Sized> PolicyDecisionPoint for Arc<P> {
    fn decide(&self, subject: &str, object: &str, action: &str) -> Result<bool> {
        (**self).decide(subject, object, action)
    }
}
