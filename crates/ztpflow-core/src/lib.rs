//! Zero-touch provisioning orchestration.
//!
//! This crate holds everything between the wire client
//! ([`ztpflow_api`]) and the CLI: the declarative [`topology`] model,
//! offline configuration [`render`]ing, DHCP [`option43`] discovery
//! strings, and the controller-side reconciliation layers
//! ([`site_manager`], [`template_manager`], [`orchestrator`]).
//!
//! Nothing here prints or prompts; the CLI crate owns presentation.

pub mod error;
pub mod option43;
pub mod orchestrator;
mod poll;
pub mod render;
pub mod report;
pub mod site_manager;
pub mod template_manager;
pub mod topology;

pub use error::CoreError;
pub use option43::{DiscoveryProtocol, DiscoverySpec, Option43, Vocabulary};
pub use orchestrator::{
    DeviceOrchestrator, DeviceState, DiscoveredDevice, ProvisioningTask, TaskStatus, WaitPolicy,
};
pub use render::{ConfigRenderer, RenderOutcome};
pub use report::{DeviceOutcome, DeviceReport, ProvisioningReport};
pub use site_manager::SiteManager;
pub use template_manager::{PublishedTemplate, TemplateManager};
pub use topology::{Device, SiteSpec, SiteType, Topology};
