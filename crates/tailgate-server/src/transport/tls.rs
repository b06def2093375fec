//! Server TLS material (PEM) and the mutual-TLS config built from it.
//!
//! The core never touches key material; it only sees the verified identity the handshake
//! produces.

use std::fs;

use tonic::transport::{Certificate, Identity as TlsIdentity, ServerTlsConfig};

use tailgate_core::error::{Result, TailgateError};

use crate::config::TlsSection;

/// Server certificate chain, private key, and the CA client certificates must chain to.
#[derive(Clone)]
pub struct TlsMaterial {
    pub cert_pem: Vec<u8>,
    pub key_pem: Vec<u8>,
    pub ca_pem: Vec<u8>,
}

impl std::fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsMaterial")
            .field("cert_pem", &self.cert_pem.len())
            .field("key_pem", &"<redacted>")
            .field("ca_pem", &self.ca_pem.len())
            .finish()
    }
}

impl TlsMaterial {
    pub fn from_pem(
        cert_pem: impl Into<Vec<u8>>,
        key_pem: impl Into<Vec<u8>>,
        ca_pem: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            cert_pem: cert_pem.into(),
            key_pem: key_pem.into(),
            ca_pem: ca_pem.into(),
        }
    }

    pub fn from_files(tls: &TlsSection) -> Result<Self> {
        Ok(Self {
            cert_pem: read_pem("tls.cert_file", &tls.cert_file)?,
            key_pem: read_pem("tls.key_file", &tls.key_file)?,
            ca_pem: read_pem("tls.ca_file", &tls.ca_file)?,
        })
    }

    /// Server config that presents our certificate and requires a client certificate signed
    /// by the CA.
    pub fn server_config(&self) -> ServerTlsConfig {
        ServerTlsConfig::new()
            .identity(TlsIdentity::from_pem(&self.cert_pem, &self.key_pem))
            .client_ca_root(Certificate::from_pem(&self.ca_pem))
            .client_auth_optional(false)
    }
}

fn read_pem(field: &str, path: &str) -> Result<Vec<u8>> {
    let pem = fs::read(path)
        .map_err(|e| TailgateError::BadConfig(format!("{field}: read {path} failed: {e}")))?;
    if pem.is_empty() {
        return Err(TailgateError::BadConfig(format!("{field}: {path} is empty")));
    }
    Ok(pem)
}
