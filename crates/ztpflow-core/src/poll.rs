// Controller task polling.
//
// Every mutating intent call returns a task reference; this is the one
// place that turns "poll task/{id} until end_time shows up" into a
// typed outcome.

use std::time::Duration;

use tracing::trace;
use ztpflow_api::ControllerSession;
use ztpflow_api::intent::models::TaskDetail;

use crate::error::CoreError;

/// Terminal outcome of waiting on a task.
#[derive(Debug)]
pub(crate) enum TaskWait {
    Completed(TaskDetail),
    Failed(TaskDetail),
    TimedOut,
}

/// Poll a task until it is terminal or `timeout` elapses. Only polling
/// transport errors surface as `Err`; task failure and timeout are
/// outcomes, not errors.
pub(crate) async fn await_task(
    session: &ControllerSession,
    task_id: &str,
    timeout: Duration,
    interval: Duration,
) -> Result<TaskWait, CoreError> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let detail = session.get_task(task_id).await?;
        trace!(task_id, progress = ?detail.progress, "polled task");

        if detail.end_time.is_some() {
            return Ok(if detail.is_error.unwrap_or(false) {
                TaskWait::Failed(detail)
            } else {
                TaskWait::Completed(detail)
            });
        }
        if tokio::time::Instant::now() >= deadline {
            return Ok(TaskWait::TimedOut);
        }
        tokio::time::sleep(interval).await;
    }
}

/// Describe why a task failed, preferring the controller's own reason.
pub(crate) fn failure_reason(detail: &TaskDetail) -> String {
    detail
        .failure_reason
        .clone()
        .or_else(|| detail.progress.clone())
        .unwrap_or_else(|| "unknown".to_owned())
}
