// PnP claim orchestration.
//
// Drives the whole provisioning flow for a topology: render configs,
// reconcile sites, push templates, claim devices by serial number, and
// poll the claim tasks. Per-device failures are recorded in the run
// report and never abort the run.

use std::time::Duration;

use chrono::Utc;
use indexmap::IndexMap;
use tracing::{info, warn};
use ztpflow_api::ControllerSession;
use ztpflow_api::intent::models::{
    ClaimConfigInfo, ConfigParameter, PnpDevice, SiteClaimRequest,
};

use crate::error::CoreError;
use crate::poll::{self, TaskWait};
use crate::render::ConfigRenderer;
use crate::report::{DeviceOutcome, DeviceReport, ProvisioningReport};
use crate::site_manager::SiteManager;
use crate::template_manager::TemplateManager;
use crate::topology::{Device, Topology};

/// Onboarding state reported by the PnP service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceState {
    Unclaimed,
    Planned,
    Onboarding,
    Provisioned,
    Failed,
    Other(String),
}

impl DeviceState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Unclaimed" => Self::Unclaimed,
            "Planned" => Self::Planned,
            "Onboarding" => Self::Onboarding,
            "Provisioned" => Self::Provisioned,
            "Error" => Self::Failed,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Unclaimed => "Unclaimed",
            Self::Planned => "Planned",
            Self::Onboarding => "Onboarding",
            Self::Provisioned => "Provisioned",
            Self::Failed => "Error",
            Self::Other(s) => s,
        }
    }
}

/// A PnP device as shown by `devices`-style listings.
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    pub id: String,
    pub serial_number: String,
    pub name: Option<String>,
    pub pid: Option<String>,
    pub state: DeviceState,
    pub last_contact: Option<i64>,
}

impl From<PnpDevice> for DiscoveredDevice {
    fn from(device: PnpDevice) -> Self {
        Self {
            serial_number: device.device_info.serial_number.clone().unwrap_or_default(),
            name: device.device_info.name.clone(),
            pid: device.device_info.pid.clone(),
            state: device
                .device_info
                .state
                .as_deref()
                .map_or(DeviceState::Other(String::new()), DeviceState::parse),
            last_contact: device.device_info.last_contact,
            id: device.id,
        }
    }
}

/// Terminal (or timed-out) status of a claim task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Success,
    Failed { reason: String },
    /// The wait budget ran out; the task may still finish controller-side.
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct ProvisioningTask {
    pub task_id: String,
    pub status: TaskStatus,
}

/// How long to wait on claim tasks.
#[derive(Debug, Clone, Copy)]
pub struct WaitPolicy {
    pub max_wait: Duration,
    pub poll_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(300),
            poll_interval: Duration::from_secs(5),
        }
    }
}

pub struct DeviceOrchestrator<'a> {
    session: &'a ControllerSession,
    sites: SiteManager<'a>,
    templates: TemplateManager<'a>,
    wait: WaitPolicy,
}

impl<'a> DeviceOrchestrator<'a> {
    pub fn new(session: &'a ControllerSession) -> Self {
        Self {
            session,
            sites: SiteManager::new(session),
            templates: TemplateManager::new(session),
            wait: WaitPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_wait_policy(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    /// List devices known to the PnP service, optionally filtered by
    /// onboarding state.
    pub async fn list_devices(
        &self,
        state: Option<&DeviceState>,
    ) -> Result<Vec<DiscoveredDevice>, CoreError> {
        let devices = self
            .session
            .list_pnp_devices(state.map(DeviceState::as_str), None)
            .await?;
        Ok(devices.into_iter().map(Into::into).collect())
    }

    /// Find the PnP record for a serial number. Serial is the only
    /// identity used for matching.
    pub async fn find_by_serial(&self, serial: &str) -> Result<Option<PnpDevice>, CoreError> {
        let mut devices = self.session.list_pnp_devices(None, Some(serial)).await?;
        Ok(devices.pop())
    }

    /// Submit a site claim and return its task ID without waiting.
    pub async fn claim(
        &self,
        device_id: &str,
        site_id: &str,
        template_id: &str,
        parameters: Vec<ConfigParameter>,
    ) -> Result<String, CoreError> {
        let request = SiteClaimRequest {
            device_id: device_id.to_owned(),
            site_id: site_id.to_owned(),
            claim_type: "Default".to_owned(),
            config_info: ClaimConfigInfo {
                config_id: template_id.to_owned(),
                config_parameters: parameters,
            },
        };
        let task = self.session.site_claim(&request).await?;
        info!(device_id, site_id, task_id = %task.task_id, "claim submitted");
        Ok(task.task_id)
    }

    /// Wait for a task within the configured budget. Timeout is a
    /// status, not an error; only polling failures return `Err`.
    pub async fn wait_for_task(&self, task_id: &str) -> Result<ProvisioningTask, CoreError> {
        let status =
            match poll::await_task(self.session, task_id, self.wait.max_wait, self.wait.poll_interval)
                .await?
            {
                TaskWait::Completed(_) => TaskStatus::Success,
                TaskWait::Failed(detail) => TaskStatus::Failed {
                    reason: poll::failure_reason(&detail),
                },
                TaskWait::TimedOut => TaskStatus::TimedOut,
            };
        Ok(ProvisioningTask {
            task_id: task_id.to_owned(),
            status,
        })
    }

    /// Provision every device in the topology, in declaration order.
    ///
    /// Devices fail independently; the report carries one outcome per
    /// device and the run always completes.
    pub async fn provision_from_topology(
        &self,
        topology: &Topology,
        renderer: &ConfigRenderer,
    ) -> Result<ProvisioningReport, CoreError> {
        let started_at = Utc::now();
        let mut devices = IndexMap::new();

        for device in topology.devices.values() {
            let outcome = self.provision_device(topology, renderer, device).await;
            if !outcome.is_success() {
                warn!(device = %device.name, outcome = %outcome, "device not provisioned");
            }
            devices.insert(
                device.name.clone(),
                DeviceReport {
                    name: device.name.clone(),
                    serial_number: device.serial_number.clone(),
                    site_path: device.site_path.clone(),
                    template: device.template_name.clone(),
                    outcome,
                },
            );
        }

        let report = ProvisioningReport {
            controller: topology.controller.host.clone(),
            started_at,
            finished_at: Utc::now(),
            vlans: topology.vlans.clone(),
            devices,
        };
        info!(
            provisioned = report.provisioned(),
            failed = report.failed(),
            "provisioning run finished"
        );
        Ok(report)
    }

    async fn provision_device(
        &self,
        topology: &Topology,
        renderer: &ConfigRenderer,
        device: &Device,
    ) -> DeviceOutcome {
        let config = match renderer.render(topology, device) {
            Ok(config) => config,
            Err(e) => {
                return DeviceOutcome::RenderFailed {
                    reason: e.to_string(),
                };
            }
        };

        let site_id = match self.sites.ensure_site(topology, &device.site_path).await {
            Ok(id) => id,
            Err(e) => {
                return DeviceOutcome::SiteFailed {
                    reason: e.to_string(),
                };
            }
        };

        let template = match self
            .templates
            .publish(&format!("ztp-{}", device.name), &config, &device.device_type)
            .await
        {
            Ok(template) => template,
            Err(e) => {
                return DeviceOutcome::TemplateFailed {
                    reason: e.to_string(),
                };
            }
        };

        let pnp = match self.find_by_serial(&device.serial_number).await {
            Ok(Some(pnp)) => pnp,
            Ok(None) => return DeviceOutcome::DeviceNotFound,
            Err(e) => {
                return DeviceOutcome::ClaimFailed {
                    reason: e.to_string(),
                };
            }
        };

        let parameters = vec![ConfigParameter {
            key: "hostname".to_owned(),
            value: device.name.clone(),
        }];
        let task_id = match self.claim(&pnp.id, &site_id, &template.id, parameters).await {
            Ok(task_id) => task_id,
            Err(e) => {
                return DeviceOutcome::ClaimFailed {
                    reason: e.to_string(),
                };
            }
        };

        match self.wait_for_task(&task_id).await {
            Ok(task) => match task.status {
                TaskStatus::Success => DeviceOutcome::Provisioned { task_id },
                TaskStatus::Failed { reason } => DeviceOutcome::ClaimFailed { reason },
                TaskStatus::TimedOut => DeviceOutcome::TimedOut { task_id },
            },
            Err(e) => DeviceOutcome::ClaimFailed {
                reason: e.to_string(),
            },
        }
    }

    /// Check that the controller services a run depends on are up.
    ///
    /// Each entry maps a check name to pass/fail; errors during a check
    /// mean the check fails, they do not abort the others.
    pub async fn validate_prerequisites(
        &self,
        topology: &Topology,
        renderer: &ConfigRenderer,
    ) -> IndexMap<String, bool> {
        let mut checks = IndexMap::new();

        checks.insert(
            "authentication".to_owned(),
            self.session.authenticate().await.is_ok(),
        );
        checks.insert(
            "pnp service".to_owned(),
            self.session.list_pnp_devices(None, None).await.is_ok(),
        );
        checks.insert(
            "site api".to_owned(),
            self.session.get_site_by_name("Global").await.is_ok(),
        );
        checks.insert(
            "template programmer".to_owned(),
            self.session.list_templates(None).await.is_ok(),
        );
        // A lookup of a task that never existed still proves the task
        // endpoint answers; "not found" counts as reachable.
        checks.insert(
            "task service".to_owned(),
            match self
                .session
                .get_task("00000000-0000-0000-0000-000000000000")
                .await
            {
                Ok(_) => true,
                Err(e) => e.is_not_found(),
            },
        );
        checks.insert(
            "templates parse".to_owned(),
            topology
                .devices
                .values()
                .all(|d| renderer.validate_syntax(&d.template_name).is_ok()),
        );

        checks
    }
}
