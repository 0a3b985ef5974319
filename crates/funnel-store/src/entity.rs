use funnel_types::{Entity, EntityId, EntityKind, NewEntity, ProjectId};
use futures::future::try_join_all;
use tracing::{debug, info};

use crate::changeset::ChangeSet;
use crate::codec::{Listing, RecordCodec};
use crate::error::{StoreError, StoreResult};
use crate::project::ProjectStore;

/// CRUD over entity records, keeping each owning project's reference list in
/// step.
///
/// Creation writes the entity file before the updated project file. A crash
/// between the two leaves an entity that exists on disk but is missing from
/// its project's references: it stays readable through [`get`](Self::get)
/// and is never returned by [`list_by_project`](Self::list_by_project).
#[derive(Clone, Debug)]
pub struct EntityStore {
    codec: RecordCodec,
    projects: ProjectStore,
}

impl EntityStore {
    pub fn new(projects: ProjectStore) -> Self {
        Self {
            codec: projects.codec().clone(),
            projects,
        }
    }

    /// Create an entity inside an existing project.
    ///
    /// Fails with [`StoreError::ProjectNotFound`] if the project is absent.
    pub async fn create(&self, project_id: &ProjectId, new: NewEntity) -> StoreResult<Entity> {
        let mut project = self
            .projects
            .get(project_id)
            .await?
            .ok_or_else(|| StoreError::ProjectNotFound(project_id.to_string()))?;

        let entity = Entity::from_new(project_id.clone(), new);
        project.add_entity_ref(entity.to_ref());
        project.touch();

        ChangeSet::new()
            .put_entity(entity.clone())
            .put_project(project)
            .apply(&self.codec)
            .await?;

        info!(
            id = %entity.id,
            project = %project_id,
            kind = %entity.kind(),
            "entity created"
        );
        Ok(entity)
    }

    /// Look up an entity. Absence is `Ok(None)`.
    pub async fn get(&self, id: &EntityId) -> StoreResult<Option<Entity>> {
        self.codec.read(id.as_str()).await
    }

    /// Refresh `updated_at` and overwrite the stored record.
    ///
    /// The caller supplies the full, already merged record.
    pub async fn update(&self, entity: &mut Entity) -> StoreResult<()> {
        entity.touch();
        self.codec.write(&*entity).await?;
        Ok(())
    }

    /// Delete an entity and drop its reference from the owning project.
    ///
    /// If the project is already gone the reference step is skipped. Returns
    /// `false` if the entity did not exist.
    pub async fn delete(&self, id: &EntityId) -> StoreResult<bool> {
        let Some(entity) = self.get(id).await? else {
            return Ok(false);
        };

        let mut changes = ChangeSet::new();
        match self.projects.get(&entity.project_id).await? {
            Some(mut project) => {
                if project.remove_entity_ref(id) {
                    project.touch();
                    changes = changes.put_project(project);
                }
            }
            None => debug!(%id, project = %entity.project_id, "owning project already gone"),
        }
        let outcomes = changes.delete_entity(id.clone()).apply(&self.codec).await?;

        info!(%id, project = %entity.project_id, "entity deleted");
        Ok(outcomes.last().copied().unwrap_or(false))
    }

    /// Resolve a project's references into full records, in reference order.
    ///
    /// References whose entity file is missing are dropped. A missing project
    /// yields an empty list.
    pub async fn list_by_project(&self, project_id: &ProjectId) -> StoreResult<Vec<Entity>> {
        let Some(project) = self.projects.get(project_id).await? else {
            return Ok(Vec::new());
        };

        let resolved = try_join_all(project.entity_ids().map(|id| self.get(id))).await?;
        let total = resolved.len();
        let entities: Vec<Entity> = resolved.into_iter().flatten().collect();
        if entities.len() != total {
            debug!(
                project = %project_id,
                dangling = total - entities.len(),
                "dropped references to missing entities"
            );
        }
        Ok(entities)
    }

    /// [`list_by_project`](Self::list_by_project) restricted to one kind.
    pub async fn list_by_type(
        &self,
        project_id: &ProjectId,
        kind: EntityKind,
    ) -> StoreResult<Vec<Entity>> {
        let mut entities = self.list_by_project(project_id).await?;
        entities.retain(|e| e.kind() == kind);
        Ok(entities)
    }

    /// Every decodable entity file, regardless of project references.
    pub async fn list_all(&self) -> StoreResult<Listing<Entity>> {
        self.codec.list_all().await
    }
}
