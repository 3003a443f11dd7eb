// Offline configuration rendering.
//
// Renders one Jinja template per device into a full device
// configuration. Rendering is entirely local; nothing here talks to a
// controller, which is what makes `render` and `validate` usable
// without credentials.

use std::path::{Path, PathBuf};

use chrono::Utc;
use indexmap::IndexMap;
use minijinja::{Environment, UndefinedBehavior};
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::topology::{Device, Topology};

/// Result of rendering a whole topology. Failures never abort the run;
/// each device either renders or contributes an error here.
#[derive(Debug, Default)]
pub struct RenderOutcome {
    /// Device name to rendered configuration, in declaration order.
    pub configs: IndexMap<String, String>,
    /// Device name to the error that stopped it.
    pub errors: IndexMap<String, CoreError>,
}

impl RenderOutcome {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Template environment bound to one template directory.
///
/// Undefined variables are hard errors. A typo in a template or a
/// missing variable must fail the render, not silently produce a
/// config with a blank in it.
pub struct ConfigRenderer {
    env: Environment<'static>,
    template_dir: PathBuf,
}

impl ConfigRenderer {
    pub fn new(template_dir: &Path) -> Self {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(template_dir));
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        Self {
            env,
            template_dir: template_dir.to_owned(),
        }
    }

    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    /// Render a single device's configuration.
    pub fn render(&self, topology: &Topology, device: &Device) -> Result<String, CoreError> {
        let context = build_context(topology, device);
        let result = self
            .env
            .get_template(&device.template_name)
            .and_then(|t| t.render(context));

        match result {
            Ok(config) => {
                debug!(device = %device.name, template = %device.template_name, "rendered configuration");
                Ok(config)
            }
            Err(cause) => Err(CoreError::TemplateRender {
                device_name: device.name.clone(),
                cause: Box::new(cause),
            }),
        }
    }

    /// Render every device in the topology. One bad template never
    /// blocks the others.
    pub fn render_all(&self, topology: &Topology) -> RenderOutcome {
        let mut outcome = RenderOutcome::default();
        for device in topology.devices.values() {
            match self.render(topology, device) {
                Ok(config) => {
                    outcome.configs.insert(device.name.clone(), config);
                }
                Err(err) => {
                    warn!(device = %device.name, error = %err, "render failed");
                    outcome.errors.insert(device.name.clone(), err);
                }
            }
        }
        outcome
    }

    /// Parse-check a template without rendering it. Catches syntax
    /// errors; undefined-variable errors only surface on render.
    pub fn validate_syntax(&self, template_name: &str) -> Result<(), CoreError> {
        self.env
            .get_template(template_name)
            .map(|_| ())
            .map_err(|cause| CoreError::TemplateRender {
                device_name: template_name.to_owned(),
                cause: Box::new(cause),
            })
    }

    /// Write rendered configs as `<device>.cfg` files under `out_dir`,
    /// creating the directory if needed. Returns the written paths in
    /// declaration order.
    pub fn write_all(
        &self,
        outcome: &RenderOutcome,
        out_dir: &Path,
    ) -> Result<Vec<PathBuf>, CoreError> {
        std::fs::create_dir_all(out_dir)?;
        let mut written = Vec::with_capacity(outcome.configs.len());
        for (name, config) in &outcome.configs {
            let path = out_dir.join(format!("{name}.cfg"));
            std::fs::write(&path, config)?;
            written.push(path);
        }
        Ok(written)
    }
}

/// Assemble the template context for one device.
///
/// Precedence, lowest to highest: built-in keys derived from the
/// topology, `global_settings`, the device's own fields, then `vars`.
/// A global can fill a field the device left unset but never replace
/// one the device declares.
fn build_context(topology: &Topology, device: &Device) -> Value {
    let mut ctx = Map::new();

    ctx.insert("vlans".into(), json!(topology.vlans));
    ctx.insert(
        "timestamp".into(),
        json!(Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()),
    );

    for (key, value) in &topology.global_settings {
        ctx.insert(key.clone(), value.clone());
    }

    ctx.insert("device_name".into(), json!(device.name));
    ctx.insert("serial_number".into(), json!(device.serial_number));
    ctx.insert("device_type".into(), json!(device.device_type));
    ctx.insert("site_path".into(), json!(device.site_path));
    if let Some(role) = &device.role {
        ctx.insert("role".into(), json!(role));
    }
    if let Some(ip) = &device.management_ip {
        ctx.insert("mgmt_ip".into(), json!(ip));
    }

    for (key, value) in &device.extra_vars {
        ctx.insert(key.clone(), value.clone());
    }

    Value::Object(ctx)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::Topology;

    const TOPOLOGY: &str = r"
controller:
  host: 10.10.20.85
global_settings:
  domain: lab.local
  ntp_server: 10.0.0.1
sites:
  - name: Campus
    type: area
  - name: Floor-1
    type: floor
    parent: Campus
devices:
  sw-01:
    type: Switches and Hubs
    mgmt_ip: 10.1.99.11
    serial_number: FOC11111111
    template: access.j2
    site: Campus/Floor-1
    vars:
      domain: override.local
  sw-02:
    type: Switches and Hubs
    serial_number: FOC22222222
    template: access.j2
    site: Campus/Floor-1
  sw-03:
    type: Switches and Hubs
    serial_number: FOC33333333
    template: broken.j2
    site: Campus/Floor-1
";

    fn setup() -> (tempfile::TempDir, Topology) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("access.j2"),
            "hostname {{ device_name }}\nip domain name {{ domain }}\nntp server {{ ntp_server }}\n",
        )
        .unwrap();
        // References a variable no device supplies.
        std::fs::write(dir.path().join("broken.j2"), "snmp contact {{ no_such_var }}\n").unwrap();
        let topology = Topology::from_str(TOPOLOGY, dir.path()).unwrap();
        (dir, topology)
    }

    #[test]
    fn device_vars_override_global_settings() {
        let (dir, topology) = setup();
        let renderer = ConfigRenderer::new(dir.path());

        let config = renderer.render(&topology, &topology.devices["sw-01"]).unwrap();
        assert!(config.contains("hostname sw-01"));
        assert!(config.contains("ip domain name override.local"));
        assert!(config.contains("ntp server 10.0.0.1"));

        let config = renderer.render(&topology, &topology.devices["sw-02"]).unwrap();
        assert!(config.contains("ip domain name lab.local"));
    }

    #[test]
    fn undefined_variable_is_a_render_error() {
        let (dir, topology) = setup();
        let renderer = ConfigRenderer::new(dir.path());

        let err = renderer
            .render(&topology, &topology.devices["sw-03"])
            .unwrap_err();
        match err {
            CoreError::TemplateRender { device_name, .. } => assert_eq!(device_name, "sw-03"),
            other => panic!("expected TemplateRender, got: {other:?}"),
        }
    }

    #[test]
    fn device_fields_beat_global_settings() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mgmt.j2"), "ip address {{ mgmt_ip }}\n").unwrap();
        let topology = Topology::from_str(
            r"
controller:
  host: 10.10.20.85
global_settings:
  mgmt_ip: 10.99.99.99
sites:
  - name: Campus
    type: area
devices:
  sw-01:
    type: Switches and Hubs
    mgmt_ip: 10.1.99.11
    serial_number: FOC11111111
    template: mgmt.j2
    site: Campus
  sw-02:
    type: Switches and Hubs
    serial_number: FOC22222222
    template: mgmt.j2
    site: Campus
",
            dir.path(),
        )
        .unwrap();
        let renderer = ConfigRenderer::new(dir.path());

        // The device's own address wins over the global of the same name.
        let config = renderer.render(&topology, &topology.devices["sw-01"]).unwrap();
        assert!(config.contains("ip address 10.1.99.11"), "got: {config}");

        // A device without the field falls back to the global.
        let config = renderer.render(&topology, &topology.devices["sw-02"]).unwrap();
        assert!(config.contains("ip address 10.99.99.99"), "got: {config}");
    }

    #[test]
    fn timestamp_is_available_to_templates() {
        let (dir, topology) = setup();
        std::fs::write(dir.path().join("stamp.j2"), "! generated {{ timestamp }}\n").unwrap();
        let mut device = topology.devices["sw-01"].clone();
        device.template_name = "stamp.j2".into();

        let renderer = ConfigRenderer::new(dir.path());
        let config = renderer.render(&topology, &device).unwrap();
        let year = Utc::now().format("%Y").to_string();
        assert!(config.contains(&format!("! generated {year}")), "got: {config}");
    }

    #[test]
    fn render_all_keeps_going_past_failures() {
        let (dir, topology) = setup();
        let renderer = ConfigRenderer::new(dir.path());

        let outcome = renderer.render_all(&topology);
        assert_eq!(outcome.configs.len(), 2);
        assert_eq!(outcome.errors.len(), 1);
        assert!(!outcome.is_complete());
        assert!(outcome.errors.contains_key("sw-03"));
        let names: Vec<&str> = outcome.configs.keys().map(String::as_str).collect();
        assert_eq!(names, ["sw-01", "sw-02"]);
    }

    #[test]
    fn write_all_emits_one_cfg_per_device() {
        let (dir, topology) = setup();
        let renderer = ConfigRenderer::new(dir.path());
        let out = tempfile::tempdir().unwrap();

        let outcome = renderer.render_all(&topology);
        let written = renderer.write_all(&outcome, out.path()).unwrap();

        assert_eq!(written.len(), 2);
        assert!(out.path().join("sw-01.cfg").is_file());
        let body = std::fs::read_to_string(out.path().join("sw-02.cfg")).unwrap();
        assert!(body.contains("hostname sw-02"));
    }

    #[test]
    fn validate_syntax_catches_parse_errors() {
        let (dir, _topology) = setup();
        std::fs::write(dir.path().join("bad.j2"), "{% if x %}unclosed\n").unwrap();
        let renderer = ConfigRenderer::new(dir.path());

        assert!(renderer.validate_syntax("access.j2").is_ok());
        assert!(renderer.validate_syntax("bad.j2").is_err());
        assert!(renderer.validate_syntax("missing.j2").is_err());
    }
}
