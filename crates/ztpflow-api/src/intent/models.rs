// Intent API response types.
//
// Models for the Catalyst Center intent API. Most endpoints wrap their
// payload in the `{"response": ...}` envelope. Fields use
// `#[serde(default)]` liberally and carry a flattened `extra` map
// because the API grows additive fields across controller releases --
// deserialization must tolerate anything it does not recognize.

use serde::{Deserialize, Serialize};

// ── Response envelope ────────────────────────────────────────────────

/// Standard intent API envelope: `{ "response": ..., "version": "1.0" }`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub response: T,
    #[serde(default)]
    pub version: Option<String>,
}

// ── PnP devices ──────────────────────────────────────────────────────

/// A device known to the PnP service, from `onboarding/pnp-device`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PnpDevice {
    pub id: String,
    #[serde(rename = "deviceInfo")]
    pub device_info: PnpDeviceInfo,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// The `deviceInfo` block nested inside a PnP device record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PnpDeviceInfo {
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pid: Option<String>,
    /// Onboarding state as reported by the controller
    /// (e.g. "Unclaimed", "Planned", "Onboarding", "Provisioned", "Error").
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub last_contact: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body for `onboarding/pnp-device/site-claim`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteClaimRequest {
    pub device_id: String,
    pub site_id: String,
    #[serde(rename = "type")]
    pub claim_type: String,
    pub config_info: ClaimConfigInfo,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimConfigInfo {
    pub config_id: String,
    pub config_parameters: Vec<ConfigParameter>,
}

/// One key/value template parameter passed at claim time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigParameter {
    pub key: String,
    pub value: String,
}

// ── Tasks ────────────────────────────────────────────────────────────

/// Reference to an asynchronous task, returned by mutating endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReference {
    pub task_id: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// Task status from `task/{id}`.
///
/// A task is terminal once `end_time` is set; `is_error` distinguishes
/// failure from success.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetail {
    pub id: String,
    #[serde(default)]
    pub is_error: Option<bool>,
    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub progress: Option<String>,
    #[serde(default)]
    pub end_time: Option<i64>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Sites ────────────────────────────────────────────────────────────

/// Site record from `GET /dna/intent/api/v1/site`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub site_name_hierarchy: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body for `POST /dna/intent/api/v1/site`.
///
/// The controller keys the payload by node kind: exactly one of
/// `area` / `building` / `floor` is present, mirrored by `type`.
#[derive(Debug, Clone, Serialize)]
pub struct SiteCreateRequest {
    #[serde(rename = "type")]
    pub site_type: String,
    pub site: SiteNodePayload,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteNodePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<AreaPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building: Option<BuildingPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<FloorPayload>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaPayload {
    pub name: String,
    pub parent_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingPayload {
    pub name: String,
    pub parent_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorPayload {
    pub name: String,
    pub parent_name: String,
}

// ── Template programmer ──────────────────────────────────────────────

/// Template project from `template-programmer/project`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateProject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub templates: Vec<TemplateSummary>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Lightweight template listing entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Full template detail from `template-programmer/template/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDetail {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub template_content: Option<String>,
    #[serde(default)]
    pub device_types: Vec<TemplateDeviceType>,
    #[serde(default)]
    pub software_type: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDeviceType {
    pub product_family: String,
}

/// Body for creating or updating a template.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateWriteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub device_types: Vec<TemplateDeviceType>,
    pub software_type: String,
    pub template_content: String,
    pub language: String,
}

/// Body for committing a template version.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCommitRequest {
    pub template_id: String,
    pub comments: String,
}

/// One committed version of a template.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVersion {
    pub id: String,
    #[serde(default)]
    pub version: Option<i64>,
    #[serde(default)]
    pub version_comment: Option<String>,
    #[serde(default)]
    pub version_time: Option<i64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
