use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};

/// The two record collections and their directory names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    Projects,
    Entities,
}

impl Collection {
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Entities => "entities",
        }
    }

    /// Singular noun for messages.
    pub fn record_name(&self) -> &'static str {
        match self {
            Self::Projects => "project",
            Self::Entities => "entity",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Resolved storage root plus the "directories exist" flag.
///
/// One context is shared by every store built from it. The flag is only a
/// shortcut: directory creation is idempotent, so two tasks racing through
/// [`ensure_ready`](Self::ensure_ready) both succeed.
#[derive(Debug)]
pub struct StorageContext {
    root: PathBuf,
    ready: AtomicBool,
}

impl StorageContext {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            root: config.root.clone(),
            ready: AtomicBool::new(false),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn collection_dir(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.dir_name())
    }

    /// Whether the directories have been created by this context.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Create `projects/` and `entities/` under the root on first use.
    pub async fn ensure_ready(&self) -> StoreResult<()> {
        if self.is_ready() {
            return Ok(());
        }
        for collection in [Collection::Projects, Collection::Entities] {
            let dir = self.collection_dir(collection);
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| StoreError::Setup {
                    path: dir.clone(),
                    reason: e.to_string(),
                })?;
        }
        self.ready.store(true, Ordering::Release);
        debug!(root = %self.root.display(), "storage directories ready");
        Ok(())
    }

    /// Forget that the directories were created; the next operation checks
    /// again.
    pub fn reset(&self) {
        self.ready.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_both_collections() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = StorageContext::new(&StoreConfig::new(dir.path().join("store")));
        assert!(!ctx.is_ready());
        ctx.ensure_ready().await.unwrap();
        assert!(ctx.is_ready());
        assert!(dir.path().join("store/projects").is_dir());
        assert!(dir.path().join("store/entities").is_dir());
    }

    #[tokio::test]
    async fn ensure_ready_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = StorageContext::new(&StoreConfig::new(dir.path()));
        ctx.ensure_ready().await.unwrap();
        ctx.ensure_ready().await.unwrap();
        ctx.reset();
        ctx.ensure_ready().await.unwrap();
        assert!(ctx.is_ready());
    }

    #[tokio::test]
    async fn reset_recreates_removed_directories() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = StorageContext::new(&StoreConfig::new(dir.path()));
        ctx.ensure_ready().await.unwrap();
        std::fs::remove_dir_all(dir.path().join("entities")).unwrap();

        // Cached: no re-check until reset.
        ctx.ensure_ready().await.unwrap();
        assert!(!dir.path().join("entities").exists());

        ctx.reset();
        ctx.ensure_ready().await.unwrap();
        assert!(dir.path().join("entities").is_dir());
    }

    #[tokio::test]
    async fn root_blocked_by_file_is_setup_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let ctx = StorageContext::new(&StoreConfig::new(&blocker));
        let err = ctx.ensure_ready().await.unwrap_err();
        assert!(matches!(err, StoreError::Setup { .. }));
        assert!(!ctx.is_ready());
    }
}
