//! Caller identity from the verified mTLS handshake.
//!
//! - `subject_from_leaf`: pure function over the leaf certificate DER (no TLS library types).
//! - `PeerInfo`: what tonic exposes about the connection, reduced to what authentication needs.
//! - `AuthInterceptor`: runs once per call (unary and streaming alike) and stores the
//!   [`Identity`] in the request extensions for handlers.

use std::net::SocketAddr;

use tonic::service::Interceptor;
use tonic::{Request, Status};
use x509_parser::prelude::{FromDer, X509Certificate};

use tailgate_core::error::{Result, TailgateError};
use tailgate_core::Identity;

use crate::rpc::status::to_status;

/// Derive the caller subject (common name) from a verified leaf certificate.
pub fn subject_from_leaf(der: &[u8]) -> Result<Identity> {
    let (_, cert) = X509Certificate::from_der(der).map_err(|e| {
        TailgateError::Unauthenticated(format!("peer certificate could not be parsed: {e}"))
    })?;

    let cn = cert
        .subject()
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .filter(|cn| !cn.is_empty())
        .ok_or_else(|| {
            TailgateError::Unauthenticated("peer certificate has no common name".into())
        })?;

    Ok(Identity::new(cn))
}

/// Connection facts available to the authentication step.
#[derive(Debug, Clone)]
pub enum PeerInfo {
    /// Not a network peer; nothing is known about the connection.
    Unavailable,
    /// A network peer. `leaf` is the DER of the verified client leaf, if TLS carried one.
    Connected {
        remote_addr: Option<SocketAddr>,
        leaf: Option<Vec<u8>>,
    },
}

impl PeerInfo {
    pub fn from_request<T>(request: &Request<T>) -> Self {
        let remote_addr = request.remote_addr();
        let leaf = request.peer_certs().and_then(|certs| {
            certs.first().map(|leaf| {
                let der: &[u8] = leaf.as_ref();
                der.to_vec()
            })
        });

        if remote_addr.is_none() && leaf.is_none() {
            return PeerInfo::Unavailable;
        }
        PeerInfo::Connected { remote_addr, leaf }
    }
}

/// Authenticate a peer: `Unknown` without peer info, `Unauthenticated` without a verified leaf.
pub fn authenticate(peer: &PeerInfo) -> Result<Identity> {
    match peer {
        PeerInfo::Unavailable => Err(TailgateError::Unknown("couldn't find peer info".into())),
        PeerInfo::Connected { leaf: None, .. } => Err(TailgateError::Unauthenticated(
            "no transport security being used".into(),
        )),
        PeerInfo::Connected { leaf: Some(der), .. } => subject_from_leaf(der),
    }
}

/// Per-call authentication hook, shared by every method of the service.
#[derive(Debug, Clone, Default)]
pub struct AuthInterceptor;

impl Interceptor for AuthInterceptor {
    fn call(&mut self, mut request: Request<()>) -> std::result::Result<Request<()>, Status> {
        let peer = PeerInfo::from_request(&request);
        match authenticate(&peer) {
            Ok(identity) => {
                request.extensions_mut().insert(identity);
                Ok(request)
            }
            Err(e) => {
                let remote = match &peer {
                    PeerInfo::Connected { remote_addr: Some(a), .. } => a.to_string(),
                    _ => "-".to_string(),
                };
                tracing::info!(%remote, error = %e, "rejected unauthenticated call");
                Err(to_status(&e))
            }
        }
    }
}

/// Identity stored by [`AuthInterceptor`].
///
/// Missing means the service was mounted without the interceptor; that is reported as
/// `Unauthenticated` rather than trusted.
pub fn caller<T>(request: &Request<T>) -> std::result::Result<Identity, Status> {
    request.extensions().get::<Identity>().cloned().ok_or_else(|| {
        to_status(&TailgateError::Unauthenticated(
            "no identity bound to this call".into(),
        ))
    })
}
