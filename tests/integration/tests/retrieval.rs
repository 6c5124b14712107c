//! Integration test: policy-gated retrieval for the supervisor, doctor and
//! performance roles, including upstream failures.

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use warrant_core::CredentialType;
use warrant_integration_tests::{to_json, TestNode, Wallet, UPSTREAM_TIMEOUT};

fn library_credential() -> serde_json::Value {
    json!({
        "id": "urn:uuid:library-card",
        "type": ["VerifiableCredential", "LibraryCredential"],
        "issuer": {"id": "did:key:z6MkLibrary"},
        "issuanceDate": "2026-01-01T00:00:00Z",
        "credentialSubject": {"id": "did:key:z6MkSupervisor", "member": "gold"}
    })
}

#[tokio::test]
async fn test_supervisor_last_write_wins() {
    let node = TestNode::start().await;
    node.policy_decides("supervisor", true).await;

    let mut second = library_credential();
    second["id"] = json!("urn:uuid:library-card-2");

    for vc in [library_credential(), second] {
        let (status, ack) = node
            .post("/supervisor/library-credential/set", &vc)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack["message"], "Credential stored successfully");
    }

    let (status, got) = node
        .post("/supervisor/library-credential/get", &json!({"type": ["AccessDelegationCredential"]}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(got["id"], "urn:uuid:library-card-2");
    assert_eq!(got["credentialSubject"]["member"], "gold");
}

#[tokio::test]
async fn test_supervisor_empty_slot() {
    let node = TestNode::start().await;
    node.policy_decides("supervisor", true).await;
    let (status, body) = node
        .post("/supervisor/library-credential/get", &json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_supervisor_denied_never_returns_resource() {
    let node = TestNode::start().await;
    node.policy_decides("supervisor", false).await;
    node.post("/supervisor/library-credential/set", &library_credential())
        .await;

    let (status, body) = node
        .post("/supervisor/library-credential/get", &json!({}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body.to_string().contains("library-card"));
}

#[tokio::test]
async fn test_set_rejects_non_credential() {
    let node = TestNode::start().await;
    let (status, _) = node
        .post("/supervisor/library-credential/set", &json!(["not", "a", "vc"]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(node.state.engine.store().is_empty());
}

#[tokio::test]
async fn test_doctor_found_missing_and_unavailable() {
    let node = TestNode::start().await;
    node.policy_decides("doctor", true).await;

    Mock::given(method("GET"))
        .and(path("/vc/credentials/rec-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "rec-1",
            "type": ["VerifiableCredential", "MedicalRecord"],
            "issuer": "did:key:z6MkHospital",
            "credentialSubject": {"bloodType": "O+"}
        })))
        .mount(&node.registry)
        .await;
    Mock::given(method("GET"))
        .and(path("/vc/credentials/rec-2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&node.registry)
        .await;
    Mock::given(method("GET"))
        .and(path("/vc/credentials/rec-3"))
        .respond_with(ResponseTemplate::new(200).set_delay(UPSTREAM_TIMEOUT + Duration::from_secs(1)))
        .mount(&node.registry)
        .await;

    let adc = |id: &str| json!({"credentialSubject": {"credentialId": id}});

    let (status, body) = node.post("/doctor/hospital-credential/get", &adc("rec-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["credentialSubject"]["bloodType"], "O+");

    let (status, _) = node.post("/doctor/hospital-credential/get", &adc("rec-2")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = node.post("/doctor/hospital-credential/get", &adc("rec-3")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["message"], "API request failed");
}

#[tokio::test]
async fn test_doctor_denied_skips_registry() {
    let node = TestNode::start().await;
    node.policy_decides("doctor", false).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&node.registry)
        .await;

    let (status, _) = node
        .post(
            "/doctor/hospital-credential/get",
            &json!({"credentialSubject": {"credentialId": "rec-1"}}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_performance_delegation_with_delegator() {
    let node = TestNode::start().await;
    node.policy_decides("performance", true).await;
    let wallet = Wallet::new();

    let (_, first) = node
        .post("/initialize-delegator", &json!({"keyType": "Ed25519"}))
        .await;
    let (status, second) = node
        .post("/initialize-delegator", &json!({"keyType": "Ed25519"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);

    node.post(
        "/performance-credential/set",
        &json!({
            "id": "urn:uuid:benchmark",
            "type": ["VerifiableCredential"],
            "issuer": "did:key:z6MkBench",
            "credentialSubject": {"payload": "x"}
        }),
    )
    .await;

    let tester = wallet.identifier("tester").await;
    let perf = wallet
        .self_issue(
            &tester,
            CredentialType::Performance,
            json!({"id": tester.did.uri(), "keyType": "Ed25519"}),
        )
        .await;
    let vp = wallet.present(&tester, vec![perf.clone()]).await;

    let (status, issued) = node
        .post("/performance-credential/get-adc", &to_json(&vp))
        .await;
    assert_eq!(status, StatusCode::OK);
    let adc = &issued["accessDelegationCredential"];
    assert_eq!(adc["issuer"]["id"], first["delegatorIdentifier"]);
    assert_eq!(adc["credentialSubject"]["credentialId"], json!(perf.id));
    assert_eq!(adc["credentialSubject"]["attributes"]["keyType"], "Ed25519");

    let carrier = wallet
        .present(&tester, vec![serde_json::from_value(adc.clone()).unwrap()])
        .await;
    let (status, got) = node
        .post("/performance-credential/get", &to_json(&carrier))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(got["delegatedCredential"]["id"], "urn:uuid:benchmark");
    assert!(got["verification"]["timeTaken"].as_f64().unwrap() >= 0.0);
    assert!(got["retrieval"]["timeTaken"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn test_policy_engine_down() {
    let node = TestNode::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("rego stack trace"))
        .mount(&node.opa)
        .await;
    node.post("/supervisor/library-credential/set", &library_credential())
        .await;

    let (status, body) = node
        .post("/supervisor/library-credential/get", &json!({}))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.to_string().contains("rego"));
}
