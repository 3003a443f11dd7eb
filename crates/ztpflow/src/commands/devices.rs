//! PnP device listing.

use chrono::{DateTime, Utc};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use ztpflow_core::orchestrator::{DeviceOrchestrator, DeviceState};

use crate::cli::{DevicesArgs, GlobalOpts};
use crate::error::CliError;
use crate::session::Context;

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "SERIAL")]
    serial: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "PID")]
    pid: String,
    #[tabled(rename = "STATE")]
    state: String,
    #[tabled(rename = "LAST CONTACT")]
    last_contact: String,
}

pub async fn handle(
    ctx: &Context,
    args: DevicesArgs,
    _global: &GlobalOpts,
) -> Result<(), CliError> {
    let orchestrator = DeviceOrchestrator::new(&ctx.session);
    let state = args.state.as_deref().map(DeviceState::parse);
    let mut devices = orchestrator.list_devices(state.as_ref()).await?;
    if let Some(serial) = &args.serial {
        devices.retain(|d| d.serial_number.eq_ignore_ascii_case(serial));
    }

    if args.json {
        let rows: Vec<serde_json::Value> = devices
            .iter()
            .map(|d| {
                serde_json::json!({
                    "id": d.id,
                    "serialNumber": d.serial_number,
                    "name": d.name,
                    "pid": d.pid,
                    "state": d.state.as_str(),
                    "lastContact": d.last_contact,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let rows: Vec<DeviceRow> = devices
        .into_iter()
        .map(|d| DeviceRow {
            serial: d.serial_number,
            name: d.name.unwrap_or_else(|| "-".into()),
            pid: d.pid.unwrap_or_else(|| "-".into()),
            state: d.state.as_str().to_owned(),
            last_contact: d.last_contact.map_or_else(
                || "-".into(),
                |millis| {
                    DateTime::<Utc>::from_timestamp_millis(millis)
                        .map_or_else(|| millis.to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
                },
            ),
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::sharp()));
    Ok(())
}
