// Declarative topology model.
//
// Parses the YAML topology description into an immutable object graph:
// controller endpoint, global settings, a site tree, and a
// declaration-ordered device mapping. Validation collects every
// violation in one pass so a single run reports every problem.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::info;

use crate::error::CoreError;

/// Controller endpoint block from the topology file. Credentials are
/// deliberately not part of the topology -- they come from the config
/// profile or environment.
#[derive(Debug, Clone, Deserialize)]
pub struct ControllerInfo {
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub verify_ssl: Option<bool>,
}

/// Site node kind, mirroring the controller's area/building/floor tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteType {
    Area,
    Building,
    Floor,
}

impl fmt::Display for SiteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Area => write!(f, "area"),
            Self::Building => write!(f, "building"),
            Self::Floor => write!(f, "floor"),
        }
    }
}

/// One declared site node. Sites form a tree via `parent`; only the
/// root has no parent. Latitude/longitude are an all-or-nothing pair.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub site_type: SiteType,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// One VLAN definition, exposed to templates and the summary document.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct VlanSpec {
    pub vlan_id: u16,
    pub name: String,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
}

/// One device entry. Created by parsing the topology description and
/// never mutated -- rendering and provisioning consume it read-only.
#[derive(Debug, Clone, Deserialize)]
pub struct Device {
    /// Filled from the mapping key after parsing.
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, rename = "mgmt_ip")]
    pub management_ip: Option<String>,
    /// The PnP identity key. Devices are matched on the controller by
    /// serial number only, never by name or IP.
    pub serial_number: String,
    #[serde(rename = "template")]
    pub template_name: String,
    #[serde(rename = "site")]
    pub site_path: String,
    /// Device-specific template variables, highest precedence.
    #[serde(default, rename = "vars")]
    pub extra_vars: IndexMap<String, serde_json::Value>,
}

/// The whole topology. Immutable after load; reloading replaces the
/// entire object.
#[derive(Debug, Clone, Deserialize)]
pub struct Topology {
    pub controller: ControllerInfo,
    #[serde(default)]
    pub global_settings: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    pub vlans: Vec<VlanSpec>,
    #[serde(default)]
    pub sites: Vec<SiteSpec>,
    #[serde(default)]
    pub devices: IndexMap<String, Device>,
}

impl Topology {
    /// Load and validate a topology file.
    ///
    /// `template_dir` is used for the structural template-exists check
    /// only; no rendering happens here.
    pub fn load(path: &Path, template_dir: &Path) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path)?;
        let topology = Self::from_str(&raw, template_dir)?;
        info!(
            devices = topology.devices.len(),
            sites = topology.sites.len(),
            "loaded topology from {}",
            path.display()
        );
        Ok(topology)
    }

    /// Parse and validate from YAML text.
    pub fn from_str(raw: &str, template_dir: &Path) -> Result<Self, CoreError> {
        let mut topology: Topology =
            serde_yaml::from_str(raw).map_err(|e| CoreError::Validation {
                message: format!("topology parse error: {e}"),
            })?;

        for (name, device) in &mut topology.devices {
            device.name.clone_from(name);
        }

        let violations = topology.validate(template_dir);
        if violations.is_empty() {
            Ok(topology)
        } else {
            Err(CoreError::TopologyValidation { violations })
        }
    }

    /// Run every structural check, returning all violations found.
    fn validate(&self, template_dir: &Path) -> Vec<String> {
        let mut violations = Vec::new();

        self.check_sites(&mut violations);
        self.check_serials(&mut violations);
        self.check_templates(template_dir, &mut violations);
        self.check_site_paths(&mut violations);

        violations
    }

    fn check_sites(&self, violations: &mut Vec<String>) {
        let mut seen: HashMap<&str, &SiteSpec> = HashMap::new();
        for site in &self.sites {
            if seen.insert(site.name.as_str(), site).is_some() {
                violations.push(format!("site '{}' declared more than once", site.name));
            }
            if site.latitude.is_some() != site.longitude.is_some() {
                violations.push(format!(
                    "site '{}': latitude and longitude must be supplied together",
                    site.name
                ));
            }
            if let Some(parent) = &site.parent {
                if !self.sites.iter().any(|s| &s.name == parent) {
                    violations.push(format!(
                        "site '{}' references undeclared parent '{parent}'",
                        site.name
                    ));
                }
            }
        }
    }

    fn check_serials(&self, violations: &mut Vec<String>) {
        let mut by_serial: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for device in self.devices.values() {
            if device.serial_number.is_empty() {
                violations.push(format!(
                    "device '{}': serial_number must not be empty",
                    device.name
                ));
            } else {
                by_serial
                    .entry(device.serial_number.as_str())
                    .or_default()
                    .push(device.name.as_str());
            }
        }
        for (serial, names) in by_serial {
            if names.len() > 1 {
                violations.push(format!(
                    "serial number '{serial}' shared by devices: {}",
                    names.join(", ")
                ));
            }
        }
    }

    fn check_templates(&self, template_dir: &Path, violations: &mut Vec<String>) {
        for device in self.devices.values() {
            if !template_dir.join(&device.template_name).is_file() {
                violations.push(format!(
                    "device '{}': template '{}' not found in {}",
                    device.name,
                    device.template_name,
                    template_dir.display()
                ));
            }
        }
    }

    fn check_site_paths(&self, violations: &mut Vec<String>) {
        for device in self.devices.values() {
            if let Err(message) = self.site_chain(&device.site_path) {
                violations.push(format!("device '{}': {message}", device.name));
            }
        }
    }

    /// Resolve a `site_path` ("Campus/Building-1/Floor-1") into the
    /// declared site chain, root first. Errors describe exactly which
    /// segment failed.
    pub fn site_chain(&self, site_path: &str) -> Result<Vec<&SiteSpec>, String> {
        let mut chain = Vec::new();
        let mut expected_parent: Option<&str> = None;

        for segment in site_path.split('/').filter(|s| !s.is_empty()) {
            let site = self
                .sites
                .iter()
                .find(|s| s.name == segment)
                .ok_or_else(|| format!("site path '{site_path}': '{segment}' is not declared"))?;

            if site.parent.as_deref() != expected_parent {
                return Err(format!(
                    "site path '{site_path}': '{segment}' is not a child of '{}'",
                    expected_parent.unwrap_or("<root>")
                ));
            }

            expected_parent = Some(segment);
            chain.push(site);
        }

        if chain.is_empty() {
            return Err(format!("site path '{site_path}' is empty"));
        }
        Ok(chain)
    }
}
