// Provisioning run report.
//
// One report per orchestrator run, with a per-device outcome in
// topology declaration order and a plain-text summary document
// suitable for writing next to the rendered configs.

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::topology::VlanSpec;

/// Final state of one device in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceOutcome {
    /// Claimed and the claim task completed.
    Provisioned { task_id: String },
    /// No PnP device with the declared serial has called home.
    DeviceNotFound,
    RenderFailed { reason: String },
    SiteFailed { reason: String },
    TemplateFailed { reason: String },
    ClaimFailed { reason: String },
    /// Claim submitted but the task did not finish within the wait
    /// budget. The claim may still complete on the controller.
    TimedOut { task_id: String },
}

impl DeviceOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Provisioned { .. })
    }
}

impl fmt::Display for DeviceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provisioned { task_id } => write!(f, "provisioned (task {task_id})"),
            Self::DeviceNotFound => write!(f, "not found on controller"),
            Self::RenderFailed { reason } => write!(f, "render failed: {reason}"),
            Self::SiteFailed { reason } => write!(f, "site setup failed: {reason}"),
            Self::TemplateFailed { reason } => write!(f, "template push failed: {reason}"),
            Self::ClaimFailed { reason } => write!(f, "claim failed: {reason}"),
            Self::TimedOut { task_id } => write!(f, "timed out waiting on task {task_id}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeviceReport {
    pub name: String,
    pub serial_number: String,
    pub site_path: String,
    pub template: String,
    pub outcome: DeviceOutcome,
}

/// Everything that happened in one provisioning run.
#[derive(Debug)]
pub struct ProvisioningReport {
    pub controller: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// VLANs declared in the topology, for the summary document.
    pub vlans: Vec<VlanSpec>,
    /// Keyed by device name, in topology declaration order.
    pub devices: IndexMap<String, DeviceReport>,
}

impl ProvisioningReport {
    pub fn provisioned(&self) -> usize {
        self.devices
            .values()
            .filter(|d| d.outcome.is_success())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.devices.len() - self.provisioned()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Render the deployment summary document.
    pub fn summary_text(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let rule = "=".repeat(60);
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, " ZTP Provisioning Summary");
        let _ = writeln!(out, "{rule}");
        let _ = writeln!(out, "Controller : {}", self.controller);
        let _ = writeln!(
            out,
            "Started    : {}",
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        let _ = writeln!(
            out,
            "Finished   : {}",
            self.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        let _ = writeln!(
            out,
            "Duration   : {}s",
            (self.finished_at - self.started_at).num_seconds()
        );
        if !self.vlans.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "VLANs:");
            for vlan in &self.vlans {
                let _ = writeln!(
                    out,
                    "  {:<6} {:<20} {}",
                    vlan.vlan_id,
                    vlan.name,
                    vlan.network.as_deref().unwrap_or("-")
                );
            }
        }
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Devices: {} total, {} provisioned, {} failed",
            self.devices.len(),
            self.provisioned(),
            self.failed()
        );
        let _ = writeln!(out, "{}", "-".repeat(60));
        for device in self.devices.values() {
            let _ = writeln!(
                out,
                "  {:<20} {:<16} {:<24} {:<16} {}",
                device.name, device.serial_number, device.site_path, device.template, device.outcome
            );
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn report() -> ProvisioningReport {
        let started_at = Utc::now();
        let mut devices = IndexMap::new();
        devices.insert(
            "sw-01".to_owned(),
            DeviceReport {
                name: "sw-01".into(),
                serial_number: "FOC111".into(),
                site_path: "Campus/Floor-1".into(),
                template: "access.j2".into(),
                outcome: DeviceOutcome::Provisioned {
                    task_id: "task-1".into(),
                },
            },
        );
        devices.insert(
            "sw-02".to_owned(),
            DeviceReport {
                name: "sw-02".into(),
                serial_number: "FOC222".into(),
                site_path: "Campus/Floor-1".into(),
                template: "access.j2".into(),
                outcome: DeviceOutcome::DeviceNotFound,
            },
        );
        ProvisioningReport {
            controller: "https://dnac.example.com/".into(),
            started_at,
            finished_at: started_at + chrono::Duration::seconds(12),
            vlans: vec![VlanSpec {
                vlan_id: 99,
                name: "MGMT".into(),
                network: Some("10.1.99.0/24".into()),
                gateway: Some("10.1.99.1".into()),
            }],
            devices,
        }
    }

    #[test]
    fn counts_reflect_outcomes() {
        let report = report();
        assert_eq!(report.provisioned(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());
    }

    #[test]
    fn summary_lists_devices_in_order() {
        let text = report().summary_text();
        assert!(text.contains("2 total, 1 provisioned, 1 failed"));
        let sw01 = text.find("sw-01").unwrap();
        let sw02 = text.find("sw-02").unwrap();
        assert!(sw01 < sw02);
        assert!(text.contains("not found on controller"));
        assert!(text.contains("Duration   : 12s"));
    }

    #[test]
    fn summary_carries_vlans_and_templates() {
        let text = report().summary_text();
        assert!(text.contains("VLANs:"));
        assert!(text.contains("MGMT"));
        assert!(text.contains("10.1.99.0/24"));
        assert!(text.contains("access.j2"));
    }
}
