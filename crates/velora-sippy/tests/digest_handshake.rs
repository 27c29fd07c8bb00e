//! HTTP-level tests of the XML-RPC Digest handshake

use std::sync::Arc;
use velora_core::config::SippyConfig;
use velora_sippy::{DigestChallenge, FixedNonce, SippyClient, SippyError, Value};
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

const CHALLENGE: &str = r#"Digest realm="sippy", nonce="5f2c1e", qop="auth", opaque="0p4q""#;

/// Matches requests sent without credentials
struct Unauthenticated;

impl Match for Unauthenticated {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

fn list_methods_response() -> String {
    r#"<?xml version="1.0"?>
<methodResponse><params><param><value><array><data>
<value><string>system.listMethods</string></value>
<value><string>listAllCalls</string></value>
</data></array></value></param></params></methodResponse>"#
        .to_string()
}

fn client_for(server: &MockServer) -> SippyClient {
    let config = SippyConfig {
        rpc_url: format!("{}/xmlapi/xmlapi", server.uri()),
        username: "ssp-root".to_string(),
        password: "secret".to_string(),
        disable_tls_verify: false,
        timeout_secs: 5,
    };
    SippyClient::new(&config)
        .unwrap()
        .with_nonce_source(Arc::new(FixedNonce("0a4f113b".to_string())))
}

async fn mount_challenge(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/xmlapi/xmlapi"))
        .and(Unauthenticated)
        .respond_with(ResponseTemplate::new(401).insert_header("WWW-Authenticate", CHALLENGE))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_challenge_then_success() {
    let server = MockServer::start().await;
    mount_challenge(&server).await;

    Mock::given(method("POST"))
        .and(path("/xmlapi/xmlapi"))
        .and(header_exists("authorization"))
        .and(header("content-type", "text/xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(list_methods_response()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.list_methods().await.unwrap();

    assert_eq!(
        result,
        Value::Array(vec![
            Value::from("system.listMethods"),
            Value::from("listAllCalls"),
        ])
    );

    // The retry carries the expected Digest answer
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let authorization = requests[1]
        .headers
        .get("authorization")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let challenge = DigestChallenge::parse(CHALLENGE).unwrap().unwrap();
    let expected = challenge.authorization("ssp-root", "secret", "POST", "/xmlapi/xmlapi", "0a4f113b");
    assert_eq!(authorization, expected);
    assert!(authorization.contains(r#"opaque="0p4q""#));

    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(body.contains("<methodName>system.listMethods</methodName>"));
}

#[tokio::test]
async fn test_second_401_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/xmlapi/xmlapi"))
        .respond_with(
            ResponseTemplate::new(401)
                .insert_header("WWW-Authenticate", CHALLENGE)
                .set_body_string("denied"),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server);
    match client.list_methods().await {
        Err(SippyError::HttpStatus { status, body }) => {
            assert_eq!(status, 401);
            assert_eq!(body, "denied");
        }
        other => panic!("expected HTTP status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fault_response() {
    let server = MockServer::start().await;
    mount_challenge(&server).await;

    let fault = r#"<?xml version="1.0"?>
<methodResponse><fault><value><struct>
<member><name>faultCode</name><value><int>-1</int></value></member>
<member><name>faultString</name><value><string>No such method</string></value></member>
</struct></value></fault></methodResponse>"#;

    Mock::given(method("POST"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_string(fault))
        .mount(&server)
        .await;

    let client = client_for(&server);
    match client.call("noSuchMethod", &[]).await {
        Err(SippyError::Fault(detail)) => {
            assert_eq!(detail.as_struct().unwrap()["faultString"], Value::from("No such method"));
        }
        other => panic!("expected fault, got {other:?}"),
    }
}

#[tokio::test]
async fn test_list_all_calls_sends_struct_param() {
    let server = MockServer::start().await;
    mount_challenge(&server).await;

    let calls = r#"<?xml version="1.0"?>
<methodResponse><params><param><value><array><data>
<value><struct>
<member><name>CLI</name><value><string>902121234567</string></value></member>
<member><name>CLD</name><value><string>905321112233</string></value></member>
<member><name>DURATION</name><value><int>33</int></value></member>
</struct></value>
</data></array></value></param></params></methodResponse>"#;

    Mock::given(method("POST"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_string(calls))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let items = client
        .list_all_calls(&velora_sippy::ListCallsParams::default())
        .await
        .unwrap();
    let records = velora_sippy::normalize_calls(&items);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].caller, "902121234567");
    assert_eq!(records[0].duration, 33);

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8(requests[1].body.clone()).unwrap();
    assert!(body.contains("<methodName>listAllCalls</methodName>"));
    assert!(body.contains("<member><name>recursive</name><value><int>1</int></value></member>"));
}

#[tokio::test]
async fn test_server_error_body_truncated() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("x".repeat(1000)))
        .mount(&server)
        .await;

    let client = client_for(&server);
    match client.list_methods().await {
        Err(SippyError::HttpStatus { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body.len(), 200);
        }
        other => panic!("expected HTTP status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Reserve a port, then release it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = SippyClient::new(&SippyConfig {
        rpc_url: format!("http://127.0.0.1:{port}/xmlapi/xmlapi"),
        username: "ssp-root".to_string(),
        password: "secret".to_string(),
        disable_tls_verify: false,
        timeout_secs: 5,
    })
    .unwrap();

    let err = client.list_methods().await.unwrap_err();
    assert!(err.is_network());
}
