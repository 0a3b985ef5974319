use funnel_store::{EntityStore, FunnelStore, ProjectStore, StoreError};
use funnel_types::{Entity, Project, ProjectId};
use serde::Serialize;
use tracing::debug;

use crate::error::ExportResult;
use crate::format::ExportFormat;
use crate::markdown::render_markdown;

/// A project together with its resolved entities.
#[derive(Clone, Debug, Serialize)]
pub struct ProjectSnapshot {
    pub project: Project,
    pub entities: Vec<Entity>,
}

/// Reads a project through the stores and renders it.
#[derive(Clone, Debug)]
pub struct Exporter {
    projects: ProjectStore,
    entities: EntityStore,
}

impl Exporter {
    pub fn new(store: &FunnelStore) -> Self {
        Self {
            projects: store.projects().clone(),
            entities: store.entities().clone(),
        }
    }

    /// Load a project and its entities. Dangling references are dropped.
    pub async fn snapshot(&self, project_id: &ProjectId) -> ExportResult<ProjectSnapshot> {
        let project = self
            .projects
            .get(project_id)
            .await?
            .ok_or_else(|| StoreError::ProjectNotFound(project_id.to_string()))?;
        let entities = self.entities.list_by_project(project_id).await?;
        debug!(project = %project_id, entities = entities.len(), "snapshot loaded");
        Ok(ProjectSnapshot { project, entities })
    }

    pub async fn to_json(&self, project_id: &ProjectId) -> ExportResult<String> {
        let snapshot = self.snapshot(project_id).await?;
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    pub async fn to_markdown(&self, project_id: &ProjectId) -> ExportResult<String> {
        let snapshot = self.snapshot(project_id).await?;
        Ok(render_markdown(&snapshot.project, &snapshot.entities))
    }

    pub async fn export(&self, project_id: &ProjectId, format: ExportFormat) -> ExportResult<String> {
        match format {
            ExportFormat::Json => self.to_json(project_id).await,
            ExportFormat::Markdown => self.to_markdown(project_id).await,
        }
    }
}
