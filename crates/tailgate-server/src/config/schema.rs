use std::net::SocketAddr;

use serde::Deserialize;
use tailgate_core::error::{Result, TailgateError};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub ops: Option<OpsSection>,

    pub tls: TlsSection,

    #[serde(default)]
    pub acl: Vec<AclRuleConfig>,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(TailgateError::UnsupportedVersion);
        }
        if self.acl.is_empty() {
            return Err(TailgateError::BadConfig(
                "acl must not be empty (every call would be denied)".into(),
            ));
        }

        self.server.validate()?;
        if let Some(ops) = &self.ops {
            ops.listen_addr()?;
        }
        self.tls.validate()?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_shutdown_grace_ms")]
    pub shutdown_grace_ms: u64,

    #[serde(default = "default_stream_buffer")]
    pub stream_buffer: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            shutdown_grace_ms: default_shutdown_grace_ms(),
            stream_buffer: default_stream_buffer(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !(100..=600_000).contains(&self.shutdown_grace_ms) {
            return Err(TailgateError::BadConfig(
                "server.shutdown_grace_ms must be between 100 and 600000".into(),
            ));
        }
        if !(1..=4096).contains(&self.stream_buffer) {
            return Err(TailgateError::BadConfig(
                "server.stream_buffer must be between 1 and 4096".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        parse_addr("server.listen", &self.listen)
    }
}

fn default_listen() -> String {
    "0.0.0.0:8400".into()
}
fn default_shutdown_grace_ms() -> u64 {
    10_000
}
fn default_stream_buffer() -> usize {
    64
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpsSection {
    pub listen: String,
}

impl OpsSection {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        parse_addr("ops.listen", &self.listen)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TlsSection {
    pub cert_file: String,
    pub key_file: String,
    pub ca_file: String,
}

impl TlsSection {
    pub fn validate(&self) -> Result<()> {
        for (name, v) in [
            ("tls.cert_file", &self.cert_file),
            ("tls.key_file", &self.key_file),
            ("tls.ca_file", &self.ca_file),
        ] {
            if v.trim().is_empty() {
                return Err(TailgateError::BadConfig(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }
}

/// One ACL row: `subject` may perform `actions` on `object`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AclRuleConfig {
    pub subject: String,
    pub object: String,
    pub actions: Vec<String>,
}

fn parse_addr(field: &str, raw: &str) -> Result<SocketAddr> {
    raw.parse()
        .map_err(|e| TailgateError::BadConfig(format!("{field} must be a valid SocketAddr: {e}")))
}
