//! Static ACL compilation and matching.
//!
//! Rules are compiled once from config into flat lookup rows. Subject and object match literally;
//! an action entry of `*` matches any action.

use tailgate_core::error::{Result, TailgateError};
use tailgate_core::{Action, PolicyDecisionPoint};

use crate::config::AclRuleConfig;

/// Compiled ACL row.
#[derive(Debug, Clone)]
pub struct AclRule {
    pub subject: String,
    pub object: String,
    pub action: Option<Action>, // None => wildcard
}

pub fn compile_acl_rules(raw: &[AclRuleConfig]) -> Result<Vec<AclRule>> {
    let mut out = Vec::with_capacity(raw.len());
    for r in raw {
        if r.subject.is_empty() || r.object.is_empty() {
            return Err(TailgateError::BadConfig(format!(
                "invalid acl entry: subject and object are required (subject={:?}, object={:?})",
                r.subject, r.object
            )));
        }
        if r.actions.is_empty() {
            return Err(TailgateError::BadConfig(format!(
                "invalid acl entry for {}: actions must not be empty",
                r.subject
            )));
        }

        for a in &r.actions {
            let action = if a == "*" {
                None
            } else {
                Some(a.parse::<Action>().map_err(|_| {
                    TailgateError::BadConfig(format!("invalid acl action for {}: {a}", r.subject))
                })?)
            };
            out.push(AclRule {
                subject: r.subject.clone(),
                object: r.object.clone(),
                action,
            });
        }
    }
    Ok(out)
}

pub fn is_allowed(rules: &[AclRule], subject: &str, object: &str, action: &str) -> bool {
    rules.iter().any(|r| {
        if r.subject != subject || r.object != object {
            return false;
        }
        match r.action {
            None => true,
            Some(a) => a.as_str() == action,
        }
    })
}

/// Policy decision point backed by a compiled static rule table.
#[derive(Debug, Clone)]
pub struct AclPolicy {
    rules: Vec<AclRule>,
}

impl AclPolicy {
    pub fn new(raw: &[AclRuleConfig]) -> Result<Self> {
        Ok(Self {
            rules: compile_acl_rules(raw)?,
        })
    }

    pub fn rules(&self) -> &[AclRule] {
        &self.rules
    }
}

impl PolicyDecisionPoint for AclPolicy {
    fn decide(&self, subject: &str, object: &str, action: &str) -> Result<bool> {
        Ok(is_allowed(&self.rules, subject, object, action))
    }
}
