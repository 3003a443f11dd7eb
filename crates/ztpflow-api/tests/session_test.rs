// Integration tests for `ControllerSession` using wiremock.
//
// Covers the token lifecycle (lazy renewal, single re-authentication),
// retry/backoff behavior for idempotent requests, and the error taxonomy.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{basic_auth, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ztpflow_api::{ControllerSession, Credentials, Error, RetryPolicy, TransportConfig};

const TOKEN_PATH: &str = "/dna/system/api/v1/auth/token";
const PNP_PATH: &str = "/dna/intent/api/v1/onboarding/pnp-device";

// ── Helpers ─────────────────────────────────────────────────────────

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(4),
    }
}

async fn setup() -> (MockServer, ControllerSession) {
    let server = MockServer::start().await;
    let session = ControllerSession::new(
        server.uri().parse().unwrap(),
        Credentials {
            username: "admin".into(),
            password: "secret".to_owned().into(),
        },
        &TransportConfig::default(),
    )
    .unwrap()
    .with_retry_policy(fast_retry());
    (server, session)
}

fn token_mock(token: &str) -> Mock {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(basic_auth("admin", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Token": token })))
}

// ── Token lifecycle ─────────────────────────────────────────────────

#[tokio::test]
async fn authenticate_exchanges_credentials_for_token() {
    let (server, session) = setup().await;

    token_mock("abc123").expect(1).mount(&server).await;

    session.authenticate().await.unwrap();
}

#[tokio::test]
async fn requests_carry_the_cached_token() {
    let (server, session) = setup().await;

    token_mock("abc123").expect(1).mount(&server).await;

    Mock::given(method("GET"))
        .and(path(PNP_PATH))
        .and(header("X-Auth-Token", "abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    // Two requests, one token exchange: the cached token is reused.
    session.list_pnp_devices(None, None).await.unwrap();
    session.list_pnp_devices(None, None).await.unwrap();
}

#[tokio::test]
async fn expired_token_is_renewed_exactly_once_before_the_request() {
    let (server, session) = setup().await;
    // A 5s ttl is inside the 30s safety margin, so the cached token is
    // considered expired immediately after authenticate().
    let session = session.with_token_ttl(Duration::from_secs(5));

    token_mock("fresh").expect(2).mount(&server).await;

    Mock::given(method("GET"))
        .and(path(PNP_PATH))
        .and(header("X-Auth-Token", "fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    session.authenticate().await.unwrap();
    session.list_pnp_devices(None, None).await.unwrap();
}

#[tokio::test]
async fn server_side_401_triggers_one_reauthentication() {
    let (server, session) = setup().await;

    token_mock("renewed").expect(2).mount(&server).await;

    // First request attempt is rejected (token revoked controller-side),
    // the retry after re-authentication succeeds.
    Mock::given(method("GET"))
        .and(path(PNP_PATH))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PNP_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    session.authenticate().await.unwrap();
    session.list_pnp_devices(None, None).await.unwrap();
}

#[tokio::test]
async fn bad_credentials_fail_with_authentication_error() {
    let (server, session) = setup().await;

    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
        .expect(1)
        .mount(&server)
        .await;

    let result = session.authenticate().await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication, got: {result:?}"
    );
}

// ── Retry behavior ──────────────────────────────────────────────────

#[tokio::test]
async fn transient_5xx_on_get_is_retried_until_success() {
    let (server, session) = setup().await;

    token_mock("t").mount(&server).await;

    Mock::given(method("GET"))
        .and(path(PNP_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PNP_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let devices = session.list_pnp_devices(None, None).await.unwrap();
    assert!(devices.is_empty());
}

#[tokio::test]
async fn get_retries_exhaust_into_controller_unavailable() {
    let (server, session) = setup().await;

    token_mock("t").mount(&server).await;

    Mock::given(method("GET"))
        .and(path(PNP_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let result = session.list_pnp_devices(None, None).await;
    match result {
        Err(Error::ControllerUnavailable { attempts, .. }) => assert_eq!(attempts, 3),
        other => panic!("expected ControllerUnavailable, got: {other:?}"),
    }
}

#[tokio::test]
async fn post_is_never_retried_on_server_error() {
    let (server, session) = setup().await;

    token_mock("t").mount(&server).await;

    Mock::given(method("POST"))
        .and(path(format!("{PNP_PATH}/site-claim")))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let request = ztpflow_api::intent::models::SiteClaimRequest {
        device_id: "dev-1".into(),
        site_id: "site-1".into(),
        claim_type: "Default".into(),
        config_info: ztpflow_api::intent::models::ClaimConfigInfo {
            config_id: "tpl-1".into(),
            config_parameters: vec![],
        },
    };

    let result = session.site_claim(&request).await;
    match result {
        Err(Error::Api { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

// ── Error taxonomy ──────────────────────────────────────────────────

#[tokio::test]
async fn non_2xx_surfaces_as_api_error_with_body() {
    let (server, session) = setup().await;

    token_mock("t").mount(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{PNP_PATH}/missing-id")))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such device"))
        .mount(&server)
        .await;

    let result = session.get_pnp_device("missing-id").await;
    match result {
        Err(Error::Api { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "no such device");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_json_surfaces_as_deserialization_error() {
    let (server, session) = setup().await;

    token_mock("t").mount(&server).await;

    Mock::given(method("GET"))
        .and(path(PNP_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = session.list_pnp_devices(None, None).await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization, got: {result:?}"
    );
}
