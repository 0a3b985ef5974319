use serde::{Deserialize, Serialize};

use crate::funnel::EntityKind;
use crate::id::{EntityId, ProjectId};
use crate::temporal::Timestamp;

/// Lightweight pointer a project keeps for each entity it owns.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: EntityKind,
}

impl EntityRef {
    pub fn new(id: EntityId, kind: EntityKind) -> Self {
        Self { id, kind }
    }
}

/// A named container of funnel entities.
///
/// `entities` is insertion-ordered and mirrors the set of entity records
/// whose `projectId` equals this project's id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub entities: Vec<EntityRef>,
}

impl Project {
    /// A fresh, empty project with a new id and both timestamps set to now.
    pub fn new(name: impl Into<String>, description: Option<String>, tags: Vec<String>) -> Self {
        let now = Timestamp::now();
        Self {
            id: ProjectId::new(),
            name: name.into(),
            description,
            tags,
            created_at: now,
            updated_at: now,
            entities: Vec::new(),
        }
    }

    /// Refresh `updated_at` to the current instant.
    pub fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }

    pub fn references(&self, id: &EntityId) -> bool {
        self.entities.iter().any(|r| &r.id == id)
    }

    /// Append a reference. Duplicate ids are ignored.
    pub fn add_entity_ref(&mut self, entity_ref: EntityRef) {
        if !self.references(&entity_ref.id) {
            self.entities.push(entity_ref);
        }
    }

    /// Drop every reference to `id`. Returns `true` if any was removed.
    pub fn remove_entity_ref(&mut self, id: &EntityId) -> bool {
        let before = self.entities.len();
        self.entities.retain(|r| &r.id != id);
        self.entities.len() != before
    }

    /// Entity ids in reference order.
    pub fn entity_ids(&self) -> impl Iterator<Item = &EntityId> {
        self.entities.iter().map(|r| &r.id)
    }
}
