use funnel_types::{Entity, EntityId, Project, ProjectId};

use crate::codec::RecordCodec;
use crate::context::Collection;
use crate::error::StoreResult;

/// One idempotent record mutation.
#[derive(Clone, Debug)]
pub enum Change {
    PutProject(Project),
    PutEntity(Entity),
    DeleteProject(ProjectId),
    DeleteEntity(EntityId),
}

impl Change {
    fn describe(&self) -> (&'static str, &str) {
        match self {
            Self::PutProject(p) => ("put project", p.id.as_str()),
            Self::PutEntity(e) => ("put entity", e.id.as_str()),
            Self::DeleteProject(id) => ("delete project", id.as_str()),
            Self::DeleteEntity(id) => ("delete entity", id.as_str()),
        }
    }
}

/// An ordered batch of record mutations applied as one logical step.
///
/// Changes are applied one after another; an error stops the batch and
/// leaves earlier changes in place. Every change is idempotent, so
/// re-applying a partially applied set converges on the same end state.
#[derive(Clone, Debug, Default)]
pub struct ChangeSet {
    changes: Vec<Change>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_project(mut self, project: Project) -> Self {
        self.changes.push(Change::PutProject(project));
        self
    }

    pub fn put_entity(mut self, entity: Entity) -> Self {
        self.changes.push(Change::PutEntity(entity));
        self
    }

    pub fn delete_project(mut self, id: ProjectId) -> Self {
        self.changes.push(Change::DeleteProject(id));
        self
    }

    pub fn delete_entity(mut self, id: EntityId) -> Self {
        self.changes.push(Change::DeleteEntity(id));
        self
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Apply every change in order. Returns, per delete change, whether the
    /// record existed (puts always report `true`).
    pub async fn apply(&self, codec: &RecordCodec) -> StoreResult<Vec<bool>> {
        let mut outcomes = Vec::with_capacity(self.changes.len());
        for change in &self.changes {
            let (op, id) = change.describe();
            tracing::trace!(op, id, "applying change");
            let outcome = match change {
                Change::PutProject(p) => codec.write(p).await.map(|_| true)?,
                Change::PutEntity(e) => codec.write(e).await.map(|_| true)?,
                Change::DeleteProject(id) => codec.delete(Collection::Projects, id.as_str()).await?,
                Change::DeleteEntity(id) => codec.delete(Collection::Entities, id.as_str()).await?,
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}
