use std::sync::Arc;

use tailgate_core::error::{Result, TailgateError};
use tailgate_core::{Action, Identity, PolicyDecisionPoint, OBJECT_WILDCARD};

use crate::obs::metrics::GatewayMetrics;

/// Every RPC the service exposes. Each maps statically to an `(object, action)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcMethod {
    CreateProfile,
    ReadProfile,
    UpdateProfile,
    DeleteProfile,
    ListProfiles,
    Produce,
    Consume,
    ProduceStream,
    ConsumeStream,
}

impl RpcMethod {
    pub const ALL: [RpcMethod; 9] = [
        RpcMethod::CreateProfile,
        RpcMethod::ReadProfile,
        RpcMethod::UpdateProfile,
        RpcMethod::DeleteProfile,
        RpcMethod::ListProfiles,
        RpcMethod::Produce,
        RpcMethod::Consume,
        RpcMethod::ProduceStream,
        RpcMethod::ConsumeStream,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RpcMethod::CreateProfile => "CreateProfile",
            RpcMethod::ReadProfile => "ReadProfile",
            RpcMethod::UpdateProfile => "UpdateProfile",
            RpcMethod::DeleteProfile => "DeleteProfile",
            RpcMethod::ListProfiles => "ListProfiles",
            RpcMethod::Produce => "Produce",
            RpcMethod::Consume => "Consume",
            RpcMethod::ProduceStream => "ProduceStream",
            RpcMethod::ConsumeStream => "ConsumeStream",
        }
    }

    pub fn permission(self) -> (&'static str, Action) {
        let action = match self {
            RpcMethod::CreateProfile => Action::Create,
            RpcMethod::ReadProfile | RpcMethod::ListProfiles => Action::Read,
            RpcMethod::UpdateProfile => Action::Update,
            RpcMethod::DeleteProfile => Action::Delete,
            RpcMethod::Produce | RpcMethod::ProduceStream => Action::Produce,
            RpcMethod::Consume | RpcMethod::ConsumeStream => Action::Consume,
        };
        (OBJECT_WILDCARD, action)
    }
}

/// Stateless authorization gate in front of every handler.
///
/// A PDP error is a deny. A deny never says anything about the target resource.
#[derive(Clone)]
pub struct AuthorizationGate {
    pdp: Arc<dyn PolicyDecisionPoint>,
    metrics: Arc<GatewayMetrics>,
}

impl AuthorizationGate {
    pub fn new(pdp: Arc<dyn PolicyDecisionPoint>, metrics: Arc<GatewayMetrics>) -> Self {
        Self { pdp, metrics }
    }

    pub fn authorize(&self, identity: &Identity, method: RpcMethod) -> Result<()> {
        let (object, action) = method.permission();
        let subject = identity.subject();

        let allowed = match self.pdp.decide(subject, object, action.as_str()) {
            Ok(allowed) => allowed,
            Err(e) => {
                tracing::warn!(
                    %subject, %action, %object, error = %e,
                    "policy decision failed; denying"
                );
                false
            }
        };

        let decision = if allowed { "allow" } else { "deny" };
        self.metrics
            .authz_decisions
            .inc(&[("action", action.as_str()), ("decision", decision)]);

        if allowed {
            return Ok(());
        }

        tracing::info!(%subject, %action, %object, method = method.as_str(), "permission denied");
        Err(TailgateError::PermissionDenied {
            subject: subject.to_string(),
            action: action.as_str().to_string(),
            object: object.to_string(),
        })
    }
}
