// Template programmer endpoints
//
// Templates live inside projects and are versioned: writes go through
// create/update plus an explicit commit. The manager layer in
// ztpflow-core builds the create-or-version-bump semantics on top.

use tracing::debug;

use crate::error::Error;
use crate::intent::models::{
    Envelope, TaskReference, TemplateCommitRequest, TemplateDetail, TemplateProject,
    TemplateSummary, TemplateVersion, TemplateWriteRequest,
};
use crate::session::ControllerSession;

const TEMPLATE_PROGRAMMER: &str = "dna/intent/api/v1/template-programmer";

impl ControllerSession {
    /// Look up a template project by name.
    ///
    /// `GET /dna/intent/api/v1/template-programmer/project?name={name}`
    pub async fn get_project(&self, name: &str) -> Result<Option<TemplateProject>, Error> {
        debug!(name, "looking up template project");
        let projects: Vec<TemplateProject> = self
            .get_with_params(
                &format!("{TEMPLATE_PROGRAMMER}/project"),
                &[("name", name.to_owned())],
            )
            .await?;
        Ok(projects.into_iter().find(|p| p.name == name))
    }

    /// Create a template project.
    ///
    /// `POST /dna/intent/api/v1/template-programmer/project`
    pub async fn create_project(&self, name: &str) -> Result<TaskReference, Error> {
        debug!(name, "creating template project");
        #[derive(serde::Serialize)]
        struct Body<'a> {
            name: &'a str,
        }
        let envelope: Envelope<TaskReference> = self
            .post(&format!("{TEMPLATE_PROGRAMMER}/project"), &Body { name })
            .await?;
        Ok(envelope.response)
    }

    /// List templates, optionally scoped to a project.
    ///
    /// `GET /dna/intent/api/v1/template-programmer/template`
    pub async fn list_templates(
        &self,
        project_id: Option<&str>,
    ) -> Result<Vec<TemplateSummary>, Error> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(project_id) = project_id {
            params.push(("projectId", project_id.to_owned()));
        }
        debug!(?project_id, "listing templates");
        self.get_with_params(&format!("{TEMPLATE_PROGRAMMER}/template"), &params)
            .await
    }

    /// Fetch full template detail, including content and device types.
    ///
    /// `GET /dna/intent/api/v1/template-programmer/template/{id}`
    pub async fn get_template(&self, template_id: &str) -> Result<TemplateDetail, Error> {
        debug!(template_id, "fetching template");
        self.get(&format!("{TEMPLATE_PROGRAMMER}/template/{template_id}"))
            .await
    }

    /// Create a new template inside a project.
    ///
    /// `POST /dna/intent/api/v1/template-programmer/project/{project_id}/template`
    pub async fn create_template(
        &self,
        project_id: &str,
        request: &TemplateWriteRequest,
    ) -> Result<TaskReference, Error> {
        debug!(project_id, name = %request.name, "creating template");
        let envelope: Envelope<TaskReference> = self
            .post(
                &format!("{TEMPLATE_PROGRAMMER}/project/{project_id}/template"),
                request,
            )
            .await?;
        Ok(envelope.response)
    }

    /// Update an existing template (`request.id` must be set).
    ///
    /// `PUT /dna/intent/api/v1/template-programmer/template`
    pub async fn update_template(
        &self,
        request: &TemplateWriteRequest,
    ) -> Result<TaskReference, Error> {
        debug!(name = %request.name, "updating template");
        let envelope: Envelope<TaskReference> = self
            .put(&format!("{TEMPLATE_PROGRAMMER}/template"), request)
            .await?;
        Ok(envelope.response)
    }

    /// Commit a new version of a template.
    ///
    /// `POST /dna/intent/api/v1/template-programmer/template/version`
    pub async fn commit_template(
        &self,
        template_id: &str,
        comments: &str,
    ) -> Result<TaskReference, Error> {
        debug!(template_id, "committing template version");
        let body = TemplateCommitRequest {
            template_id: template_id.to_owned(),
            comments: comments.to_owned(),
        };
        let envelope: Envelope<TaskReference> = self
            .post(&format!("{TEMPLATE_PROGRAMMER}/template/version"), &body)
            .await?;
        Ok(envelope.response)
    }

    /// List the committed versions of a template, oldest first.
    ///
    /// `GET /dna/intent/api/v1/template-programmer/template/version/{id}`
    pub async fn list_template_versions(
        &self,
        template_id: &str,
    ) -> Result<Vec<TemplateVersion>, Error> {
        debug!(template_id, "listing template versions");
        self.get(&format!(
            "{TEMPLATE_PROGRAMMER}/template/version/{template_id}"
        ))
        .await
    }
}
