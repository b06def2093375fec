#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use tonic::service::Interceptor;
use tonic::{Code, Request};

use tailgate_core::TailgateError;
use tailgate_server::transport::{
    authenticate, caller, subject_from_leaf, AuthInterceptor, PeerInfo,
};

use harness::Pki;

#[test]
fn common_name_becomes_subject() {
    let pki = Pki::new();
    let leaf = pki.client("root");
    let identity = subject_from_leaf(&leaf.der).expect("cn present");
    assert_eq!(identity.subject(), "root");
}

#[test]
fn garbage_der_is_unauthenticated() {
    let err = subject_from_leaf(b"definitely not a certificate").expect_err("must fail");
    assert!(matches!(err, TailgateError::Unauthenticated(_)));
}

#[test]
fn connected_peer_with_leaf_authenticates() {
    let pki = Pki::new();
    let peer = PeerInfo::Connected {
        remote_addr: Some("127.0.0.1:5555".parse().unwrap()),
        leaf: Some(pki.client("nobody").der),
    };
    assert_eq!(authenticate(&peer).unwrap().subject(), "nobody");
}

#[test]
fn connected_peer_without_tls_is_unauthenticated() {
    let peer = PeerInfo::Connected {
        remote_addr: Some("127.0.0.1:5555".parse().unwrap()),
        leaf: None,
    };
    let err = authenticate(&peer).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNAUTHENTICATED");
    assert!(err.to_string().contains("no transport security"));
}

#[test]
fn missing_peer_info_is_unknown() {
    let err = authenticate(&PeerInfo::Unavailable).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNKNOWN");
}

#[test]
fn interceptor_rejects_in_process_request() {
    // a bare request carries neither a remote address nor peer certificates
    let mut interceptor = AuthInterceptor;
    let status = interceptor.call(Request::new(())).expect_err("must fail");
    assert_eq!(status.code(), Code::Unknown);
}

#[test]
fn caller_without_interceptor_is_unauthenticated() {
    let status = caller(&Request::new(())).expect_err("must fail");
    assert_eq!(status.code(), Code::Unauthenticated);
}
