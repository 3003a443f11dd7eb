// Integration tests for the intent endpoint bindings using wiremock.
#![allow(clippy::unwrap_used)]

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ztpflow_api::intent::models::{
    ClaimConfigInfo, ConfigParameter, SiteClaimRequest, TemplateDeviceType, TemplateWriteRequest,
};
use ztpflow_api::{ControllerSession, Credentials, RetryPolicy, TransportConfig};

async fn setup() -> (MockServer, ControllerSession) {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dna/system/api/v1/auth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Token": "t" })))
        .mount(&server)
        .await;

    let session = ControllerSession::new(
        server.uri().parse().unwrap(),
        Credentials {
            username: "admin".into(),
            password: "secret".to_owned().into(),
        },
        &TransportConfig::default(),
    )
    .unwrap()
    .with_retry_policy(RetryPolicy {
        max_attempts: 1,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(1),
    });

    (server, session)
}

#[tokio::test]
async fn list_pnp_devices_applies_filters() {
    let (server, session) = setup().await;

    let body = json!([
        {
            "id": "dev-1",
            "deviceInfo": {
                "serialNumber": "FOC12345",
                "state": "Unclaimed",
                "lastContact": 1_700_000_000,
                "pid": "C9300-24T"
            }
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/onboarding/pnp-device"))
        .and(query_param("state", "Unclaimed"))
        .and(query_param("serialNumber", "FOC12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let devices = session
        .list_pnp_devices(Some("Unclaimed"), Some("FOC12345"))
        .await
        .unwrap();

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].id, "dev-1");
    assert_eq!(devices[0].device_info.serial_number.as_deref(), Some("FOC12345"));
    assert_eq!(devices[0].device_info.state.as_deref(), Some("Unclaimed"));
}

#[tokio::test]
async fn pnp_models_tolerate_additive_fields() {
    let (server, session) = setup().await;

    // Fields this client has never heard of must not break parsing.
    let body = json!([
        {
            "id": "dev-2",
            "deviceInfo": {
                "serialNumber": "FOC99999",
                "state": "Planned",
                "onbState": "some-new-field",
                "capabilitiesSupported": ["SUDI"]
            },
            "runSummaryList": [{ "timestamp": 1 }],
            "version": 2
        }
    ]);

    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/onboarding/pnp-device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let devices = session.list_pnp_devices(None, None).await.unwrap();
    assert_eq!(devices[0].device_info.serial_number.as_deref(), Some("FOC99999"));
    assert!(devices[0].extra.contains_key("runSummaryList"));
    assert!(devices[0].device_info.extra.contains_key("onbState"));
}

#[tokio::test]
async fn site_claim_unwraps_task_reference() {
    let (server, session) = setup().await;

    Mock::given(method("POST"))
        .and(path("/dna/intent/api/v1/onboarding/pnp-device/site-claim"))
        .and(body_partial_json(json!({
            "deviceId": "dev-1",
            "siteId": "site-9",
            "type": "Default"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": { "taskId": "task-42", "url": "/dna/intent/api/v1/task/task-42" },
            "version": "1.0"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = SiteClaimRequest {
        device_id: "dev-1".into(),
        site_id: "site-9".into(),
        claim_type: "Default".into(),
        config_info: ClaimConfigInfo {
            config_id: "tpl-7".into(),
            config_parameters: vec![ConfigParameter {
                key: "hostname".into(),
                value: "sw-access-01".into(),
            }],
        },
    };

    let task = session.site_claim(&request).await.unwrap();
    assert_eq!(task.task_id, "task-42");
}

#[tokio::test]
async fn get_site_by_name_returns_none_when_absent() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/site"))
        .and(query_param("name", "Global/Nowhere"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let site = session.get_site_by_name("Global/Nowhere").await.unwrap();
    assert!(site.is_none());
}

#[tokio::test]
async fn get_site_by_name_returns_first_match() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/site"))
        .and(query_param("name", "Global/Campus"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": [
                { "id": "site-1", "name": "Campus", "siteNameHierarchy": "Global/Campus" }
            ]
        })))
        .mount(&server)
        .await;

    let site = session.get_site_by_name("Global/Campus").await.unwrap().unwrap();
    assert_eq!(site.id, "site-1");
    assert_eq!(site.site_name_hierarchy.as_deref(), Some("Global/Campus"));
}

#[tokio::test]
async fn task_detail_parses_terminal_states() {
    let (server, session) = setup().await;

    Mock::given(method("GET"))
        .and(path("/dna/intent/api/v1/task/task-ok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": {
                "id": "task-ok",
                "isError": false,
                "endTime": 1_700_000_100,
                "progress": "Device claimed",
                "data": "site-id-123"
            }
        })))
        .mount(&server)
        .await;

    let task = session.get_task("task-ok").await.unwrap();
    assert_eq!(task.id, "task-ok");
    assert_eq!(task.is_error, Some(false));
    assert!(task.end_time.is_some());
    assert_eq!(task.data.as_deref(), Some("site-id-123"));
}

#[tokio::test]
async fn template_lifecycle_create_and_commit() {
    let (server, session) = setup().await;

    Mock::given(method("POST"))
        .and(path(
            "/dna/intent/api/v1/template-programmer/project/proj-1/template",
        ))
        .and(body_partial_json(json!({
            "name": "access-switch",
            "softwareType": "IOS-XE",
            "language": "JINJA"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": { "taskId": "task-create" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/dna/intent/api/v1/template-programmer/template/version"))
        .and(body_partial_json(json!({ "templateId": "tpl-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": { "taskId": "task-commit" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = TemplateWriteRequest {
        id: None,
        name: "access-switch".into(),
        description: "ztpflow managed template".into(),
        device_types: vec![TemplateDeviceType {
            product_family: "Switches and Hubs".into(),
        }],
        software_type: "IOS-XE".into(),
        template_content: "hostname {{ hostname }}".into(),
        language: "JINJA".into(),
    };

    let create = session.create_template("proj-1", &request).await.unwrap();
    assert_eq!(create.task_id, "task-create");

    let commit = session.commit_template("tpl-1", "initial").await.unwrap();
    assert_eq!(commit.task_id, "task-commit");
}
