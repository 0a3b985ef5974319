use serde::{Deserialize, Serialize};

use crate::funnel::{EntityBody, EntityKind};
use crate::id::{EntityId, ProjectId};
use crate::project::EntityRef;
use crate::research::ResearchMetadata;
use crate::temporal::Timestamp;

/// Envelope keys owned by the record; a payload never carries them into the
/// variant body.
const ASSIGNED_FIELDS: [&str; 5] = ["id", "projectId", "createdAt", "updatedAt", "type"];

/// One persisted funnel or journey document.
///
/// The envelope fields are shared by every kind; the variant payload is
/// flattened into the same JSON object and tagged by `type`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: EntityId,
    pub project_id: ProjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_metadata: Option<ResearchMetadata>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(flatten)]
    pub body: EntityBody,
}

impl Entity {
    /// Assign a fresh id and timestamps to a caller payload.
    pub fn from_new(project_id: ProjectId, new: NewEntity) -> Self {
        let now = Timestamp::now();
        let mut body = new.body;
        for key in ASSIGNED_FIELDS {
            body.extra_mut().remove(key);
        }
        Self {
            id: EntityId::new(),
            project_id,
            name: new.name,
            description: new.description,
            research_metadata: new.research_metadata,
            created_at: now,
            updated_at: now,
            body,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.body.kind()
    }

    /// The reference the owning project keeps for this entity.
    pub fn to_ref(&self) -> EntityRef {
        EntityRef::new(self.id.clone(), self.kind())
    }

    /// Refresh `updated_at` to the current instant.
    pub fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

/// Caller-supplied entity payload, before the store assigns id, owner, and
/// timestamps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub research_metadata: Option<ResearchMetadata>,
    #[serde(flatten)]
    pub body: EntityBody,
}

impl NewEntity {
    pub fn new(name: impl Into<String>, body: EntityBody) -> Self {
        Self {
            name: name.into(),
            description: None,
            research_metadata: None,
            body,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_research(mut self, research: ResearchMetadata) -> Self {
        self.research_metadata = Some(research);
        self
    }
}
