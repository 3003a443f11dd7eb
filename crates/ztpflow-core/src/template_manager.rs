// Onboarding template lifecycle.
//
// Rendered device configurations are pushed to the controller as
// versioned templates inside one project. Publishing is idempotent per
// run: create-or-update, then commit a version, with results cached by
// template name so a template shared by many devices is pushed once.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info};
use ztpflow_api::ControllerSession;
use ztpflow_api::intent::models::{TemplateDeviceType, TemplateVersion, TemplateWriteRequest};

use crate::error::CoreError;
use crate::poll::{self, TaskWait};

const DEFAULT_PROJECT: &str = "Onboarding Configuration";
const SOFTWARE_TYPE: &str = "IOS-XE";
const TEMPLATE_LANGUAGE: &str = "JINJA";
const TASK_TIMEOUT: Duration = Duration::from_secs(60);
const TASK_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// A template that has been pushed and committed this run.
#[derive(Debug, Clone)]
pub struct PublishedTemplate {
    pub id: String,
    pub product_family: String,
}

pub struct TemplateManager<'a> {
    session: &'a ControllerSession,
    project_name: String,
    project_id: Mutex<Option<String>>,
    published: Mutex<HashMap<String, PublishedTemplate>>,
}

impl<'a> TemplateManager<'a> {
    pub fn new(session: &'a ControllerSession) -> Self {
        Self::with_project(session, DEFAULT_PROJECT)
    }

    pub fn with_project(session: &'a ControllerSession, project_name: &str) -> Self {
        Self {
            session,
            project_name: project_name.to_owned(),
            project_id: Mutex::new(None),
            published: Mutex::new(HashMap::new()),
        }
    }

    /// Push `content` as template `name` and commit a version,
    /// creating the project and template as needed. Returns the
    /// committed template's ID.
    ///
    /// The device type bound at creation is immutable; publishing the
    /// same name for a different product family is a conflict, not an
    /// update.
    pub async fn publish(
        &self,
        name: &str,
        content: &str,
        product_family: &str,
    ) -> Result<PublishedTemplate, CoreError> {
        {
            let published = self.published.lock().await;
            if let Some(existing) = published.get(name) {
                if existing.product_family != product_family {
                    return Err(CoreError::TemplateConflict {
                        name: name.to_owned(),
                        existing: existing.product_family.clone(),
                        requested: product_family.to_owned(),
                    });
                }
                return Ok(existing.clone());
            }
        }

        let project_id = self.ensure_project().await?;
        let template_id = match self.find_template(&project_id, name).await? {
            Some(id) => {
                self.update_existing(&id, name, content, product_family)
                    .await?;
                id
            }
            None => {
                self.create_new(&project_id, name, content, product_family)
                    .await?
            }
        };

        self.commit(&template_id, "published by ztpflow").await?;
        info!(template = name, id = %template_id, "template published");

        let result = PublishedTemplate {
            id: template_id,
            product_family: product_family.to_owned(),
        };
        self.published
            .lock()
            .await
            .insert(name.to_owned(), result.clone());
        Ok(result)
    }

    /// Committed versions of a template, oldest first.
    pub async fn versions(&self, template_id: &str) -> Result<Vec<TemplateVersion>, CoreError> {
        Ok(self.session.list_template_versions(template_id).await?)
    }

    /// Re-commit the content of a historical version as the newest one.
    /// Nothing is deleted; rolling back is just another version.
    pub async fn rollback(&self, template_id: &str, version: i64) -> Result<(), CoreError> {
        let versions = self.session.list_template_versions(template_id).await?;
        let target = versions
            .iter()
            .find(|v| v.version == Some(version))
            .ok_or_else(|| CoreError::TemplateNotFound {
                name: format!("{template_id} version {version}"),
            })?;

        // Each committed version is addressable as its own template ID.
        let snapshot = self.session.get_template(&target.id).await?;
        let content = snapshot
            .template_content
            .ok_or_else(|| CoreError::Internal(format!(
                "version {version} of template {template_id} has no content"
            )))?;
        let product_family = snapshot
            .device_types
            .first()
            .map_or_else(String::new, |d| d.product_family.clone());

        self.update_existing(template_id, &snapshot.name, &content, &product_family)
            .await?;
        self.commit(template_id, &format!("rollback to version {version}"))
            .await?;
        info!(template_id, version, "template rolled back");
        Ok(())
    }

    async fn ensure_project(&self) -> Result<String, CoreError> {
        let mut project_id = self.project_id.lock().await;
        if let Some(id) = project_id.as_ref() {
            return Ok(id.clone());
        }

        if let Some(project) = self.session.get_project(&self.project_name).await? {
            debug!(project = %self.project_name, id = %project.id, "project exists");
            *project_id = Some(project.id.clone());
            return Ok(project.id);
        }

        let task = self.session.create_project(&self.project_name).await?;
        self.await_write(&task.task_id).await?;
        let project = self
            .session
            .get_project(&self.project_name)
            .await?
            .ok_or_else(|| {
                CoreError::Internal(format!(
                    "project '{}' missing after creation",
                    self.project_name
                ))
            })?;
        info!(project = %self.project_name, id = %project.id, "created template project");
        *project_id = Some(project.id.clone());
        Ok(project.id)
    }

    async fn find_template(
        &self,
        project_id: &str,
        name: &str,
    ) -> Result<Option<String>, CoreError> {
        let templates = self.session.list_templates(Some(project_id)).await?;
        Ok(templates.into_iter().find(|t| t.name == name).map(|t| t.id))
    }

    async fn update_existing(
        &self,
        template_id: &str,
        name: &str,
        content: &str,
        product_family: &str,
    ) -> Result<(), CoreError> {
        let detail = self.session.get_template(template_id).await?;
        if let Some(existing) = detail.device_types.first() {
            if existing.product_family != product_family {
                return Err(CoreError::TemplateConflict {
                    name: name.to_owned(),
                    existing: existing.product_family.clone(),
                    requested: product_family.to_owned(),
                });
            }
        }

        let request = write_request(Some(template_id), name, content, product_family);
        let task = self.session.update_template(&request).await?;
        self.await_write(&task.task_id).await?;
        Ok(())
    }

    async fn create_new(
        &self,
        project_id: &str,
        name: &str,
        content: &str,
        product_family: &str,
    ) -> Result<String, CoreError> {
        let request = write_request(None, name, content, product_family);
        let task = self.session.create_template(project_id, &request).await?;
        let detail = self.await_write(&task.task_id).await?;

        // The created template's ID travels in the task data.
        if let Some(id) = detail.and_then(|d| d.data) {
            return Ok(id);
        }
        self.find_template(project_id, name)
            .await?
            .ok_or_else(|| CoreError::Internal(format!("template '{name}' missing after creation")))
    }

    async fn commit(&self, template_id: &str, comments: &str) -> Result<(), CoreError> {
        let task = self.session.commit_template(template_id, comments).await?;
        self.await_write(&task.task_id).await?;
        Ok(())
    }

    async fn await_write(
        &self,
        task_id: &str,
    ) -> Result<Option<ztpflow_api::intent::models::TaskDetail>, CoreError> {
        match poll::await_task(self.session, task_id, TASK_TIMEOUT, TASK_POLL_INTERVAL).await? {
            TaskWait::Completed(detail) => Ok(Some(detail)),
            TaskWait::Failed(detail) => Err(CoreError::TaskFailed {
                task_id: task_id.to_owned(),
                reason: poll::failure_reason(&detail),
            }),
            TaskWait::TimedOut => Err(CoreError::TaskFailed {
                task_id: task_id.to_owned(),
                reason: format!("template write not finished after {TASK_TIMEOUT:?}"),
            }),
        }
    }
}

fn write_request(
    id: Option<&str>,
    name: &str,
    content: &str,
    product_family: &str,
) -> TemplateWriteRequest {
    TemplateWriteRequest {
        id: id.map(str::to_owned),
        name: name.to_owned(),
        description: "Managed by ztpflow".to_owned(),
        device_types: vec![TemplateDeviceType {
            product_family: product_family.to_owned(),
        }],
        software_type: SOFTWARE_TYPE.to_owned(),
        template_content: content.to_owned(),
        language: TEMPLATE_LANGUAGE.to_owned(),
    }
}
