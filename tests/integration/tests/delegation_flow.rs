//! Integration test: the company delegation flow end to end over HTTP.
//!
//! Employee credential → ADC → packed request → company credential reply,
//! with policy decisions served by a mock policy engine.

use axum::http::StatusCode;
use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::method;
use wiremock::{Mock, ResponseTemplate};

use warrant_core::{CredentialType, Role};
use warrant_identity::{
    Identifier, IdentityService, Message, PackedMessage, PackingMode, VerifiableCredential,
};
use warrant_integration_tests::{from_json, to_json, TestNode, Wallet, SERVICE_BASE_URL};

/// Fetch the sample employee credential for `alias` (also seeds the company slot).
async fn onboard(node: &TestNode, wallet: &Wallet, alias: &str) -> (Identifier, VerifiableCredential) {
    let holder = wallet.identifier(alias).await;
    let (status, vc) = node.get(&format!("/credentials/{}", holder.did)).await;
    assert_eq!(status, StatusCode::OK);
    (holder, from_json(vc))
}

async fn obtain_adc(node: &TestNode, wallet: &Wallet, alias: &str) -> (Identifier, VerifiableCredential) {
    let (holder, employee) = onboard(node, wallet, alias).await;
    let vp = wallet.present(&holder, vec![employee]).await;
    let (status, adc) = node.post("/adc", &to_json(&vp)).await;
    assert_eq!(status, StatusCode::OK, "{}", adc);
    (holder, from_json(adc))
}

async fn packed_request(
    node: &TestNode,
    wallet: &Wallet,
    holder: &Identifier,
    adc: VerifiableCredential,
) -> PackedMessage {
    let carrier = wallet.present(holder, vec![adc]).await;
    let request = Message {
        id: "request-1".into(),
        message_type: "Company Credential Request".into(),
        from: holder.did.to_string(),
        to: vec![node.company_did()],
        body: to_json(&carrier),
        created_time: None,
    };
    wallet
        .identity
        .pack_message(&request, PackingMode::Jws)
        .await
        .unwrap()
}

// =========================================================================
// Issuance
// =========================================================================

#[tokio::test]
async fn test_adc_binds_holder_and_company_credential() {
    let node = TestNode::start().await;
    let wallet = Wallet::new();
    let (holder, adc) = obtain_adc(&node, &wallet, "alice").await;

    assert!(adc.has_type(CredentialType::AccessDelegation.as_str()));
    assert!(adc.is_signed());
    assert_eq!(adc.issuer.id(), node.company_did());

    let subject = &adc.credential_subject;
    assert_eq!(subject["id"], holder.did.to_string());
    assert_eq!(subject["attributes"]["employeeId"], "E20041674");
    assert_eq!(subject["attributes"]["position"], "Manager");
    assert!(subject["attributes"].get("name").is_none());
    assert_eq!(
        subject["service"]["serviceEndpoint"],
        format!("{}/company/company-credential/get", SERVICE_BASE_URL)
    );

    let company = node
        .state
        .engine
        .store()
        .get(warrant_core::CredentialSlot::Company)
        .unwrap();
    assert_eq!(subject["credentialId"], json!(company.id));
}

#[tokio::test]
async fn test_reissue_yields_distinct_ids_and_same_attributes() {
    let node = TestNode::start().await;
    let wallet = Wallet::new();
    let (holder, employee) = onboard(&node, &wallet, "alice").await;
    let vp = to_json(&wallet.present(&holder, vec![employee]).await);

    let (_, first) = node.post("/adc", &vp).await;
    let (_, second) = node.post("/adc", &vp).await;
    assert_ne!(first["id"], second["id"]);
    assert_eq!(
        first["credentialSubject"]["attributes"],
        second["credentialSubject"]["attributes"]
    );
}

#[tokio::test]
async fn test_seniority_boundary() {
    let node = TestNode::start().await;
    let wallet = Wallet::new();
    onboard(&node, &wallet, "seed").await;
    let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();

    let cases = [
        ("2021-10-18", true),
        ("2021-10-19", false),
        ("2021-10-20", false),
        ("2030-01-01", false),
        ("not a date", false),
    ];
    for (joined, expected) in cases {
        let holder = wallet.identifier(&format!("emp-{}", joined)).await;
        let employee = wallet
            .self_issue(
                &holder,
                CredentialType::Employee,
                json!({"id": holder.did.uri(), "employeeId": "E1", "position": "Clerk", "joinedDate": joined}),
            )
            .await;
        let vp = wallet.present(&holder, vec![employee]).await;
        let adc = node
            .state
            .engine
            .issue_at(Role::Company, &vp, now)
            .await
            .unwrap();
        assert_eq!(
            adc.credential_subject["attributes"]["isSeniorEmployee"],
            expected,
            "joinedDate {}",
            joined
        );
    }
}

#[tokio::test]
async fn test_invalid_presentation_never_reaches_policy() {
    let node = TestNode::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": {"allow": true}})))
        .expect(0)
        .mount(&node.opa)
        .await;

    let wallet = Wallet::new();
    let (holder, adc) = obtain_adc(&node, &wallet, "alice").await;

    // Holder swapped after signing.
    let mut carrier = wallet.present(&holder, vec![adc]).await;
    carrier.holder = wallet.identifier("mallory").await.did.to_string();
    let (status, body) = node.post("/adc", &to_json(&carrier)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_PRESENTATION");

    let request = Message {
        id: "r".into(),
        message_type: "Company Credential Request".into(),
        from: holder.did.to_string(),
        to: vec![node.company_did()],
        body: to_json(&carrier),
        created_time: None,
    };
    let packed = wallet
        .identity
        .pack_message(&request, PackingMode::Jws)
        .await
        .unwrap();
    let (status, body) = node
        .post("/company/company-credential/get", &to_json(&packed))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_PRESENTATION");
}

// =========================================================================
// Secure delivery
// =========================================================================

#[tokio::test]
async fn test_company_credential_round_trip() {
    let node = TestNode::start().await;
    node.policy_decides("company", true).await;
    let wallet = Wallet::new();
    let (holder, adc) = obtain_adc(&node, &wallet, "alice").await;
    let packed = packed_request(&node, &wallet, &holder, adc).await;

    let (status, reply) = node
        .post("/company/company-credential/get", &to_json(&packed))
        .await;
    assert_eq!(status, StatusCode::OK);

    let reply: PackedMessage = from_json(reply);
    let unpacked = wallet.identity.unpack_message(&reply).await.unwrap();
    assert_eq!(unpacked.metadata.packing, PackingMode::Jws);
    assert_eq!(unpacked.message.from, node.company_did());
    assert_eq!(unpacked.message.to, vec![holder.did.to_string()]);

    let company: VerifiableCredential = from_json(unpacked.message.body);
    assert!(company.has_type(CredentialType::Company.as_str()));
    assert_eq!(company.credential_subject["name"], "ABC Company");
}

#[tokio::test]
async fn test_denied_delivery_leaks_nothing() {
    let node = TestNode::start().await;
    node.policy_decides("company", false).await;
    let wallet = Wallet::new();
    let (holder, adc) = obtain_adc(&node, &wallet, "alice").await;
    let packed = packed_request(&node, &wallet, &holder, adc).await;

    let (status, body) = node
        .post("/company/company-credential/get", &to_json(&packed))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "AUTHORIZATION_DENIED");
    assert!(!body.to_string().contains("ABC Company"));
}

#[tokio::test]
async fn test_revocation_takes_effect_immediately() {
    let node = TestNode::start().await;
    let wallet = Wallet::new();
    let (holder, adc) = obtain_adc(&node, &wallet, "alice").await;
    let packed = to_json(&packed_request(&node, &wallet, &holder, adc).await);

    node.policy_decides("company", true).await;
    let (status, _) = node.post("/company/company-credential/get", &packed).await;
    assert_eq!(status, StatusCode::OK);

    node.opa.reset().await;
    node.policy_decides("company", false).await;
    let (status, _) = node.post("/company/company-credential/get", &packed).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unsigned_envelope_is_malformed() {
    let node = TestNode::start().await;
    let (status, body) = node
        .post(
            "/company/company-credential/get",
            &json!({"message": "eyJhbGciOiJFZERTQSJ9.e30.AAAA"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "MALFORMED_MESSAGE");
}
