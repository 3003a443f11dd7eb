// Asynchronous task status endpoint
//
// Every mutating intent call returns a task id; this is the single
// polling surface for observing completion.

use tracing::trace;

use crate::error::Error;
use crate::intent::models::{Envelope, TaskDetail};
use crate::session::ControllerSession;

impl ControllerSession {
    /// Fetch the current status of an asynchronous task.
    ///
    /// `GET /dna/intent/api/v1/task/{task_id}`
    pub async fn get_task(&self, task_id: &str) -> Result<TaskDetail, Error> {
        trace!(task_id, "polling task");
        let envelope: Envelope<TaskDetail> =
            self.get(&format!("dna/intent/api/v1/task/{task_id}")).await?;
        Ok(envelope.response)
    }
}
