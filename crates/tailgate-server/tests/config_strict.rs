#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use tailgate_server::agent::AgentConfig;
use tailgate_server::config;

const TLS: &str = r#"
tls:
  cert_file: certs/server.pem
  key_file: certs/server-key.pem
  ca_file: certs/ca.pem
"#;

const ACL: &str = r#"
acl:
  - subject: root
    object: "*"
    actions: ["*"]
"#;

fn doc(body: &str) -> String {
    format!("version: 1\n{body}{TLS}{ACL}")
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str(&doc("")).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.listen, "0.0.0.0:8400");
    assert_eq!(cfg.server.shutdown_grace_ms, 10_000);
    assert_eq!(cfg.server.stream_buffer, 64);
    assert!(cfg.ops.is_none());
    assert_eq!(cfg.acl[0].subject, "root");
    assert_eq!(cfg.acl[0].actions, vec!["*".to_string()]);
}

#[test]
fn ok_full_config() {
    let cfg = config::load_from_str(&doc(
        r#"
server:
  listen: "127.0.0.1:9000"
  shutdown_grace_ms: 250
  stream_buffer: 8
ops:
  listen: "127.0.0.1:9001"
"#,
    ))
    .expect("must parse");
    assert_eq!(cfg.server.listen_addr().unwrap().port(), 9000);
    assert_eq!(cfg.ops.as_ref().unwrap().listen_addr().unwrap().port(), 9001);
    assert_eq!(cfg.server.stream_buffer, 8);
}

#[test]
fn deny_unknown_fields_nested() {
    let bad = doc(
        r#"
server:
  listne: "127.0.0.1:9000" # typo should fail
"#,
    );
    let err = config::load_from_str(&bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "FAILED_PRECONDITION");
}

#[test]
fn deny_unknown_top_level_field() {
    let bad = format!("{}\nextra: true\n", doc(""));
    config::load_from_str(&bad).expect_err("must fail");
}

#[test]
fn unsupported_version_rejected() {
    let bad = format!("version: 2\n{TLS}{ACL}");
    let err = config::load_from_str(&bad).expect_err("must fail");
    assert!(matches!(err, tailgate_core::TailgateError::UnsupportedVersion));
}

#[test]
fn empty_acl_rejected() {
    let bad = format!("version: 1\n{TLS}acl: []\n");
    let err = config::load_from_str(&bad).expect_err("must fail");
    assert!(err.to_string().contains("acl"));
}

#[test]
fn missing_tls_rejected() {
    let bad = format!("version: 1\n{ACL}");
    config::load_from_str(&bad).expect_err("must fail");
}

#[test]
fn bad_listen_addr_rejected() {
    let bad = doc("server:\n  listen: \"not-an-addr\"\n");
    config::load_from_str(&bad).expect_err("must fail");

    let bad = doc("ops:\n  listen: \"localhost\"\n");
    config::load_from_str(&bad).expect_err("must fail");
}

#[test]
fn numeric_ranges_enforced() {
    config::load_from_str(&doc("server:\n  shutdown_grace_ms: 10\n")).expect_err("must fail");
    config::load_from_str(&doc("server:\n  shutdown_grace_ms: 600001\n")).expect_err("must fail");
    config::load_from_str(&doc("server:\n  stream_buffer: 0\n")).expect_err("must fail");
    config::load_from_str(&doc("server:\n  stream_buffer: 4097\n")).expect_err("must fail");
    config::load_from_str(&doc("server:\n  stream_buffer: 4096\n")).expect("upper bound ok");
}

#[test]
fn invalid_acl_action_fails_at_agent_config() {
    let bad = format!(
        "version: 1\n{TLS}acl:\n  - subject: root\n    object: \"*\"\n    actions: [\"fly\"]\n"
    );
    let cfg = config::load_from_str(&bad).expect("schema accepts it");
    let err = AgentConfig::from_gateway_config(&cfg).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "FAILED_PRECONDITION");
}

#[test]
fn missing_config_file_is_bad_config() {
    let err = config::load_from_file("/nonexistent/tailgate.yaml").expect_err("must fail");
    assert!(err.to_string().contains("/nonexistent/tailgate.yaml"));
}
