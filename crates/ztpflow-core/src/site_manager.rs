// Site hierarchy reconciliation.
//
// Declared site paths are reconciled against the controller root to
// leaf. Existing nodes are adopted as-is, missing nodes are created,
// and resolved IDs are cached so repeated provisioning of the same
// path costs one pass of lookups at most.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tracing::{debug, info};
use ztpflow_api::ControllerSession;
use ztpflow_api::intent::models::{
    AreaPayload, BuildingPayload, FloorPayload, SiteCreateRequest, SiteNodePayload,
};

use crate::error::CoreError;
use crate::poll;
use crate::topology::{SiteSpec, SiteType, Topology};

const CONTROLLER_ROOT: &str = "Global";
const CREATE_TIMEOUT: Duration = Duration::from_secs(60);
const CREATE_POLL_INTERVAL: Duration = Duration::from_millis(500);

pub struct SiteManager<'a> {
    session: &'a ControllerSession,
    /// Full controller path ("Global/Campus/Floor-1") to site ID.
    cache: Mutex<HashMap<String, String>>,
}

impl<'a> SiteManager<'a> {
    pub fn new(session: &'a ControllerSession) -> Self {
        Self {
            session,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Make the declared site path exist on the controller and return
    /// the leaf site's ID. Safe to call repeatedly with overlapping
    /// paths; already-resolved prefixes are served from the cache.
    pub async fn ensure_site(
        &self,
        topology: &Topology,
        site_path: &str,
    ) -> Result<String, CoreError> {
        let chain = topology
            .site_chain(site_path)
            .map_err(|message| CoreError::Validation { message })?;

        let mut parent_path = CONTROLLER_ROOT.to_owned();
        let mut leaf_id = String::new();

        for site in chain {
            let full_path = format!("{parent_path}/{}", site.name);
            leaf_id = self.ensure_node(site, &parent_path, &full_path).await?;
            parent_path = full_path;
        }

        Ok(leaf_id)
    }

    async fn ensure_node(
        &self,
        site: &SiteSpec,
        parent_path: &str,
        full_path: &str,
    ) -> Result<String, CoreError> {
        if let Some(id) = self.cached(full_path) {
            return Ok(id);
        }

        if let Some(existing) = self.session.get_site_by_name(full_path).await? {
            debug!(path = %full_path, id = %existing.id, "site already exists");
            self.remember(full_path, &existing.id);
            return Ok(existing.id);
        }

        if let Err(e) = self.create_node(site, parent_path).await {
            // A failed create can mean we lost a race with another run
            // and the node exists now; re-check before giving up.
            let recoverable = matches!(e, CoreError::Api { .. } | CoreError::TaskFailed { .. });
            if !recoverable || self.session.get_site_by_name(full_path).await?.is_none() {
                return Err(e);
            }
            debug!(path = %full_path, "site appeared concurrently");
        } else {
            info!(path = %full_path, kind = %site.site_type, "created site");
        }

        let created = self
            .session
            .get_site_by_name(full_path)
            .await?
            .ok_or_else(|| CoreError::SiteNotFound {
                path: full_path.to_owned(),
            })?;
        self.remember(full_path, &created.id);
        Ok(created.id)
    }

    async fn create_node(&self, site: &SiteSpec, parent_path: &str) -> Result<(), CoreError> {
        let request = build_request(site, parent_path);
        let task = match self.session.create_site(&request).await {
            Ok(task) => task,
            Err(e) if e.is_conflict() => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        self.await_creation(&task.task_id).await
    }

    /// Poll the creation task to completion. Site creation is quick;
    /// anything past the timeout is reported as a task failure.
    async fn await_creation(&self, task_id: &str) -> Result<(), CoreError> {
        match poll::await_task(self.session, task_id, CREATE_TIMEOUT, CREATE_POLL_INTERVAL).await? {
            poll::TaskWait::Completed(_) => Ok(()),
            poll::TaskWait::Failed(detail) => Err(CoreError::TaskFailed {
                task_id: task_id.to_owned(),
                reason: poll::failure_reason(&detail),
            }),
            poll::TaskWait::TimedOut => Err(CoreError::TaskFailed {
                task_id: task_id.to_owned(),
                reason: format!("site creation not finished after {CREATE_TIMEOUT:?}"),
            }),
        }
    }

    fn cached(&self, full_path: &str) -> Option<String> {
        self.cache
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(full_path)
            .cloned()
    }

    fn remember(&self, full_path: &str, id: &str) {
        self.cache
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(full_path.to_owned(), id.to_owned());
    }
}

fn build_request(site: &SiteSpec, parent_path: &str) -> SiteCreateRequest {
    let mut payload = SiteNodePayload::default();
    match site.site_type {
        SiteType::Area => {
            payload.area = Some(AreaPayload {
                name: site.name.clone(),
                parent_name: parent_path.to_owned(),
            });
        }
        SiteType::Building => {
            payload.building = Some(BuildingPayload {
                name: site.name.clone(),
                parent_name: parent_path.to_owned(),
                address: site.address.clone(),
                latitude: site.latitude,
                longitude: site.longitude,
            });
        }
        SiteType::Floor => {
            payload.floor = Some(FloorPayload {
                name: site.name.clone(),
                parent_name: parent_path.to_owned(),
            });
        }
    }
    SiteCreateRequest {
        site_type: site.site_type.to_string(),
        site: payload,
    }
}
