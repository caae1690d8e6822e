//! HTTP contract of the `/document/*` routes.

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use cosign::drive::{DriveError, DriveOp};
use cosign::{CosignConfig, DocumentId, Party, Role};
use cosign_testkit::{email, TestFixture, PARTY_A, PARTY_B, STRANGER};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(fixture: &TestFixture) -> Router {
    cosign_server::router(fixture.cosigner.clone())
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn body_json(resp: Response) -> Value {
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn call(fixture: &TestFixture, uri: &str, body: Value) -> (StatusCode, Value) {
    let resp = app(fixture).oneshot(post(uri, body)).await.unwrap();
    let status = resp.status();
    (status, body_json(resp).await)
}

#[tokio::test]
async fn test_healthz() {
    let fixture = TestFixture::new();
    let resp = app(&fixture)
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), 1024).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn test_create_returns_flat_record() {
    let fixture = TestFixture::new();

    let (status, body) = call(
        &fixture,
        "/document/create",
        json!({ "email": PARTY_A, "doc_title": "Lease" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["error"], json!(""));
    let data = &body["data"];
    let id = data["document_id"].as_str().unwrap();
    assert_eq!(data["title"], json!("Lease"));
    assert_eq!(
        data["url"],
        json!(format!("https://docs.google.com/document/d/{id}/"))
    );
    assert_eq!(data["party_a_email"], json!(PARTY_A));
    assert_eq!(data["party_b_email"], json!(""));
    assert_eq!(data["signed_a"], json!(0));
    assert_eq!(data["signed_b"], json!(0));
}

#[tokio::test]
async fn test_create_from_template() {
    let fixture = TestFixture::new();
    fixture
        .drive()
        .add_file(&DocumentId::parse("tmpl").unwrap(), "Standard NDA");

    let (status, body) = call(
        &fixture,
        "/document/create",
        json!({ "email": PARTY_A, "template_id": "tmpl" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], json!("Standard NDA"));
}

#[tokio::test]
async fn test_create_without_title_or_template_is_400() {
    let fixture = TestFixture::new();
    let (status, body) = call(&fixture, "/document/create", json!({ "email": PARTY_A })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["data"], Value::Null);
}

#[tokio::test]
async fn test_perm_then_sign_flow() {
    let fixture = TestFixture::new();
    let record = fixture.one_party_document("Lease").await;
    let doc_id = record.document_id.as_str();

    let (status, body) = call(
        &fixture,
        "/document/perm",
        json!({ "email": PARTY_B, "doc_id": doc_id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["party_b_email"], json!(PARTY_B));

    fixture.steer(&record.document_id, Party::A, false);
    let (status, body) = call(
        &fixture,
        "/document/sign",
        json!({ "email": PARTY_A, "doc_id": doc_id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["signed_a"], json!(1));
    assert_eq!(body["data"]["signed_b"], json!(0));
    assert_eq!(
        fixture.drive().role_of(&record.document_id, &email(PARTY_A)),
        Some(Role::Reader)
    );
}

#[tokio::test]
async fn test_list_returns_both_roles() {
    let fixture = TestFixture::new();
    fixture.two_party_document().await;
    fixture.one_party_document("Private").await;

    let (status, body) = call(&fixture, "/document/list", json!({ "email": PARTY_B })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = call(&fixture, "/document/list", json!({ "email": PARTY_A })).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = call(&fixture, "/document/list", json!({ "email": STRANGER })).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_malformed_json_is_400_in_envelope() {
    let fixture = TestFixture::new();
    let req = Request::builder()
        .method("POST")
        .uri("/document/sign")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let resp = app(&fixture).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["success"], json!(false));
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_field_is_400() {
    let fixture = TestFixture::new();
    let (status, body) = call(&fixture, "/document/sign", json!({ "email": PARTY_A })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_invalid_email_is_400() {
    let fixture = TestFixture::new();
    let id = fixture.two_party_document().await;
    let (status, _) = call(
        &fixture,
        "/document/sign",
        json!({ "email": "nobody", "doc_id": id.as_str() }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_document_is_404() {
    let fixture = TestFixture::new();
    let (status, body) = call(
        &fixture,
        "/document/sign",
        json!({ "email": PARTY_A, "doc_id": "missing" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["data"], Value::Null);
}

#[tokio::test]
async fn test_stranger_sign_is_404_and_third_party_perm_is_400() {
    let fixture = TestFixture::new();
    let id = fixture.two_party_document().await;

    let (status, _) = call(
        &fixture,
        "/document/sign",
        json!({ "email": STRANGER, "doc_id": id.as_str() }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &fixture,
        "/document/perm",
        json!({ "email": STRANGER, "doc_id": id.as_str() }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upstream_failure_is_502_and_record_unchanged() {
    let fixture = TestFixture::new();
    let id = fixture.two_party_document().await;
    let before = fixture.record(&id).await.fingerprint();

    fixture.steer(&id, Party::A, false);
    fixture.drive().fail_next(
        DriveOp::UpdatePermission,
        DriveError::Upstream {
            status: 403,
            message: "insufficient permissions".into(),
        },
    );
    let (status, body) = call(
        &fixture,
        "/document/sign",
        json!({ "email": PARTY_A, "doc_id": id.as_str() }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("insufficient permissions"));
    assert_eq!(fixture.record(&id).await.fingerprint(), before);
}

#[tokio::test]
async fn test_timeout_is_504() {
    let fixture = TestFixture::with_config(CosignConfig {
        request_timeout: Duration::from_millis(50),
        ..CosignConfig::default()
    });
    let id = fixture.two_party_document().await;
    fixture.steer(&id, Party::A, false);
    fixture.drive().set_latency(Duration::from_secs(5));

    let (status, body) = call(
        &fixture,
        "/document/sign",
        json!({ "email": PARTY_A, "doc_id": id.as_str() }),
    )
    .await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["success"], json!(false));
}
