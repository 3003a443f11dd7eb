// Site hierarchy endpoints
//
// Lookup is by full hierarchy path ("Global/Campus/Building-1"); site
// creation is asynchronous and returns a task reference.

use tracing::debug;

use crate::error::Error;
use crate::intent::models::{Envelope, SiteCreateRequest, SiteRecord, TaskReference};
use crate::session::ControllerSession;

const SITE_PATH: &str = "dna/intent/api/v1/site";

impl ControllerSession {
    /// Look up a site by its full hierarchy name.
    ///
    /// `GET /dna/intent/api/v1/site?name={full_path}`
    ///
    /// Returns `None` when no site matches -- the controller reports
    /// that either as an empty result set or as HTTP 404 depending on
    /// release, and both are treated as absence here.
    pub async fn get_site_by_name(&self, full_path: &str) -> Result<Option<SiteRecord>, Error> {
        debug!(full_path, "looking up site");
        let result: Result<Envelope<Vec<SiteRecord>>, Error> = self
            .get_with_params(SITE_PATH, &[("name", full_path.to_owned())])
            .await;

        match result {
            Ok(envelope) => Ok(envelope.response.into_iter().next()),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Create one node of the site hierarchy (area, building, or floor).
    ///
    /// `POST /dna/intent/api/v1/site`
    ///
    /// Returns a task reference; completion (and conflict detection)
    /// happens via task polling on the caller's side.
    pub async fn create_site(&self, request: &SiteCreateRequest) -> Result<TaskReference, Error> {
        debug!(site_type = %request.site_type, "creating site");
        let envelope: Envelope<TaskReference> = self.post(SITE_PATH, request).await?;
        Ok(envelope.response)
    }
}
