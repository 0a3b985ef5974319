//! File-backed storage for marketing funnel projects and entities.
//!
//! Every record is one pretty-printed JSON file:
//!
//! ```text
//! <root>/
//!   projects/<projectId>.json
//!   entities/<entityId>.json
//! ```
//!
//! # Stores
//!
//! - [`ProjectStore`] -- create/get/update/list projects; delete cascades to
//!   the project's entities
//! - [`EntityStore`] -- create/get/update/delete entities while keeping the
//!   owning project's reference list in step
//!
//! Both are reached through [`FunnelStore`], which owns the shared
//! [`StorageContext`] and [`RecordCodec`].
//!
//! # Design Rules
//!
//! 1. A missing file is a normal outcome (`None` / `false`), never an error.
//! 2. Collection scans skip undecodable files and report them in
//!    [`Listing::skipped`].
//! 3. No locking: concurrent writes to the same record race and the last
//!    write wins.
//! 4. Entity creation writes the entity before the project. The window in
//!    between can leave an orphan entity; nothing repairs it.

pub mod changeset;
pub mod codec;
pub mod config;
pub mod context;
pub mod entity;
pub mod error;
pub mod project;

use std::sync::Arc;

pub use changeset::{Change, ChangeSet};
pub use codec::{is_valid_record_id, Listing, Record, RecordCodec, SkippedRecord};
pub use config::{StoreConfig, DEFAULT_ROOT, ROOT_ENV_VAR};
pub use context::{Collection, StorageContext};
pub use entity::EntityStore;
pub use error::{CodecCause, StoreError, StoreErrorKind, StoreResult};
pub use project::ProjectStore;

/// Project and entity stores sharing one storage root.
///
/// Opening is cheap and touches no files; the collection directories are
/// created by the first operation that needs them.
#[derive(Clone, Debug)]
pub struct FunnelStore {
    codec: RecordCodec,
    projects: ProjectStore,
    entities: EntityStore,
}

impl FunnelStore {
    pub fn open(config: &StoreConfig) -> Self {
        let ctx = Arc::new(StorageContext::new(config));
        let codec = RecordCodec::new(ctx);
        let projects = ProjectStore::new(codec.clone());
        let entities = EntityStore::new(projects.clone());
        Self {
            codec,
            projects,
            entities,
        }
    }

    pub fn projects(&self) -> &ProjectStore {
        &self.projects
    }

    pub fn entities(&self) -> &EntityStore {
        &self.entities
    }

    pub fn codec(&self) -> &RecordCodec {
        &self.codec
    }

    pub fn context(&self) -> &StorageContext {
        self.codec.context()
    }

    /// Clear the "directories exist" flag, e.g. after the root was wiped.
    pub fn reset(&self) {
        self.context().reset();
    }
}
