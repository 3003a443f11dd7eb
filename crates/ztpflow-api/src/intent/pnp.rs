// PnP onboarding endpoints
//
// Device listing/filtering is read-only; claiming is the one mutating
// call and is deliberately not retried (see session.rs).

use tracing::debug;

use crate::error::Error;
use crate::intent::models::{PnpDevice, SiteClaimRequest, TaskReference};
use crate::session::ControllerSession;

const PNP_DEVICE_PATH: &str = "dna/intent/api/v1/onboarding/pnp-device";

impl ControllerSession {
    /// List PnP devices, optionally filtered by onboarding state and/or
    /// serial number. Never mutates controller state.
    ///
    /// `GET /dna/intent/api/v1/onboarding/pnp-device`
    pub async fn list_pnp_devices(
        &self,
        state: Option<&str>,
        serial_number: Option<&str>,
    ) -> Result<Vec<PnpDevice>, Error> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(state) = state {
            params.push(("state", state.to_owned()));
        }
        if let Some(serial) = serial_number {
            params.push(("serialNumber", serial.to_owned()));
        }

        debug!(?state, ?serial_number, "listing PnP devices");
        // This endpoint returns a bare array, not the response envelope.
        self.get_with_params(PNP_DEVICE_PATH, &params).await
    }

    /// Fetch a single PnP device record by controller id.
    ///
    /// `GET /dna/intent/api/v1/onboarding/pnp-device/{id}`
    pub async fn get_pnp_device(&self, device_id: &str) -> Result<PnpDevice, Error> {
        debug!(device_id, "fetching PnP device");
        self.get(&format!("{PNP_DEVICE_PATH}/{device_id}")).await
    }

    /// Claim a PnP device against a site and configuration template.
    ///
    /// `POST /dna/intent/api/v1/onboarding/pnp-device/site-claim`
    ///
    /// Returns a task reference; the claim proceeds asynchronously on
    /// the controller. Poll [`get_task`](Self::get_task) for the outcome.
    pub async fn site_claim(&self, request: &SiteClaimRequest) -> Result<TaskReference, Error> {
        debug!(device_id = %request.device_id, site_id = %request.site_id, "claiming PnP device");
        let envelope: crate::intent::models::Envelope<TaskReference> = self
            .post(&format!("{PNP_DEVICE_PATH}/site-claim"), request)
            .await?;
        Ok(envelope.response)
    }
}
