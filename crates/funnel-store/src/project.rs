use funnel_types::{Project, ProjectId};
use futures::future::try_join_all;
use tracing::info;

use crate::codec::{Listing, RecordCodec};
use crate::context::Collection;
use crate::error::StoreResult;

/// CRUD over project records.
#[derive(Clone, Debug)]
pub struct ProjectStore {
    codec: RecordCodec,
}

impl ProjectStore {
    pub fn new(codec: RecordCodec) -> Self {
        Self { codec }
    }

    /// Create and persist an empty project.
    pub async fn create(
        &self,
        name: impl Into<String>,
        description: Option<String>,
        tags: Vec<String>,
    ) -> StoreResult<Project> {
        let project = Project::new(name, description, tags);
        self.codec.write(&project).await?;
        info!(id = %project.id, name = %project.name, "project created");
        Ok(project)
    }

    /// Look up a project. Absence is `Ok(None)`.
    pub async fn get(&self, id: &ProjectId) -> StoreResult<Option<Project>> {
        self.codec.read(id.as_str()).await
    }

    /// Refresh `updated_at` and overwrite the stored record.
    ///
    /// The caller supplies the full record; nothing is merged and no
    /// concurrent-update check is made.
    pub async fn update(&self, project: &mut Project) -> StoreResult<()> {
        project.touch();
        self.codec.write(&*project).await?;
        Ok(())
    }

    /// Delete a project and every entity it references.
    ///
    /// Entity files are removed concurrently before the project file. The
    /// first entity-delete failure aborts the operation and leaves the
    /// project record in place. Returns `false` if the project did not exist.
    pub async fn delete(&self, id: &ProjectId) -> StoreResult<bool> {
        let Some(project) = self.get(id).await? else {
            return Ok(false);
        };

        let removed = try_join_all(
            project
                .entity_ids()
                .map(|entity_id| self.codec.delete(Collection::Entities, entity_id.as_str())),
        )
        .await?;

        let deleted = self.codec.delete(Collection::Projects, id.as_str()).await?;
        info!(
            %id,
            entities = removed.iter().filter(|r| **r).count(),
            "project deleted"
        );
        Ok(deleted)
    }

    /// Every decodable project, most recently updated first.
    ///
    /// Projects with equal `updated_at` keep scan order.
    pub async fn list(&self) -> StoreResult<Listing<Project>> {
        let mut listing = self.codec.list_all::<Project>().await?;
        listing
            .records
            .sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(listing)
    }

    pub(crate) fn codec(&self) -> &RecordCodec {
        &self.codec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FunnelStore;
    use std::time::Duration;

    fn store(dir: &std::path::Path) -> ProjectStore {
        FunnelStore::open(&crate::StoreConfig::new(dir)).projects().clone()
    }

    #[tokio::test]
    async fn create_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let projects = store(dir.path());
        let created = projects
            .create("Demo", Some("first".into()), vec!["saas".into()])
            .await
            .unwrap();
        assert!(created.entities.is_empty());
        assert_eq!(created.created_at, created.updated_at);

        let fetched = projects.get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn get_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let projects = store(dir.path());
        let missing = projects.get(&ProjectId::from("missing-id")).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn update_refreshes_updated_at_only() {
        let dir = tempfile::tempdir().unwrap();
        let projects = store(dir.path());
        let mut project = projects.create("Demo", None, vec![]).await.unwrap();
        let original = project.clone();

        tokio::time::sleep(Duration::from_millis(5)).await;
        project.name = "Renamed".into();
        projects.update(&mut project).await.unwrap();

        let stored = projects.get(&original.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Renamed");
        assert_eq!(stored.id, original.id);
        assert_eq!(stored.created_at, original.created_at);
        assert!(stored.updated_at > original.updated_at);
    }

    #[tokio::test]
    async fn delete_missing_is_false() {
        let dir = tempfile::tempdir().unwrap();
        let projects = store(dir.path());
        assert!(!projects.delete(&ProjectId::from("nope")).await.unwrap());
    }

    #[tokio::test]
    async fn list_sorts_by_recency() {
        let dir = tempfile::tempdir().unwrap();
        let projects = store(dir.path());
        let mut first = projects.create("t1", None, vec![]).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        projects.create("t2", None, vec![]).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        projects.create("t3", None, vec![]).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        projects.update(&mut first).await.unwrap();

        let listing = projects.list().await.unwrap();
        let names: Vec<_> = listing.records.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["t1", "t3", "t2"]);
    }

    #[tokio::test]
    async fn list_reports_skipped_files() {
        let dir = tempfile::tempdir().unwrap();
        let projects = store(dir.path());
        projects.create("ok", None, vec![]).await.unwrap();
        std::fs::write(dir.path().join("projects/garbage.json"), b"garbage").unwrap();

        let listing = projects.list().await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing.skipped.len(), 1);
    }
}
