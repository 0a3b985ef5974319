use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use funnel_types::{Entity, Project};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::context::{Collection, StorageContext};
use crate::error::{CodecCause, StoreError, StoreResult};

/// A record kind that lives in one collection, one JSON file per record.
pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: Collection;

    /// The id used as the file stem.
    fn record_id(&self) -> &str;
}

impl Record for Project {
    const COLLECTION: Collection = Collection::Projects;

    fn record_id(&self) -> &str {
        self.id.as_str()
    }
}

impl Record for Entity {
    const COLLECTION: Collection = Collection::Entities;

    fn record_id(&self) -> &str {
        self.id.as_str()
    }
}

/// A file that a collection scan could not decode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedRecord {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of a best-effort collection scan.
#[derive(Clone, Debug)]
pub struct Listing<T> {
    pub records: Vec<T>,
    pub skipped: Vec<SkippedRecord>,
}

impl<T> Listing<T> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns `true` if every file in the collection decoded.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Returns `true` if `id` can name a file inside a collection directory.
///
/// Rejects empty ids and anything that could escape the directory or
/// produce a hidden or ambiguous file name.
pub fn is_valid_record_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.starts_with('.')
        && !id.contains(['/', '\\', '\0'])
}

/// Serializes records to `<root>/<collection>/<id>.json` and back.
///
/// Cloning is cheap; clones share the same [`StorageContext`].
#[derive(Clone, Debug)]
pub struct RecordCodec {
    ctx: Arc<StorageContext>,
}

impl RecordCodec {
    pub fn new(ctx: Arc<StorageContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &StorageContext {
        &self.ctx
    }

    /// Path of a record file, or `None` if the id cannot name a file.
    pub fn record_path(&self, collection: Collection, id: &str) -> Option<PathBuf> {
        is_valid_record_id(id).then(|| {
            self.ctx
                .collection_dir(collection)
                .join(format!("{id}.json"))
        })
    }

    /// Write a record as pretty-printed JSON, replacing any existing file.
    pub async fn write<R: Record>(&self, record: &R) -> StoreResult<PathBuf> {
        let id = record.record_id();
        let path = self.record_path(R::COLLECTION, id).ok_or_else(|| {
            StoreError::InvalidData(format!(
                "{} id {id:?} cannot be used as a file name",
                R::COLLECTION.record_name()
            ))
        })?;
        self.ctx.ensure_ready().await?;

        let json = serde_json::to_string_pretty(record).map_err(|e| StoreError::WriteFailed {
            path: path.clone(),
            source: CodecCause::Json(e),
        })?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| StoreError::WriteFailed {
                path: path.clone(),
                source: CodecCause::Io(e),
            })?;

        debug!(collection = %R::COLLECTION, id, "record written");
        Ok(path)
    }

    /// Read a record by id. A missing file is `Ok(None)`.
    pub async fn read<R: Record>(&self, id: &str) -> StoreResult<Option<R>> {
        let Some(path) = self.record_path(R::COLLECTION, id) else {
            debug!(collection = %R::COLLECTION, id, "unusable id; treating as absent");
            return Ok(None);
        };
        self.ctx.ensure_ready().await?;

        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(collection = %R::COLLECTION, id, "record not found");
                return Ok(None);
            }
            Err(e) => {
                return Err(StoreError::ReadFailed {
                    path,
                    source: CodecCause::Io(e),
                })
            }
        };
        decode(&path, &raw).map(Some)
    }

    /// Remove a record file. A missing file is `Ok(false)`.
    pub async fn delete(&self, collection: Collection, id: &str) -> StoreResult<bool> {
        let Some(path) = self.record_path(collection, id) else {
            return Ok(false);
        };
        self.ctx.ensure_ready().await?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(%collection, id, "record deleted");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::DeleteFailed { path, source: e }),
        }
    }

    /// Decode every `*.json` file in the collection.
    ///
    /// Files that fail to read or parse are logged and reported in
    /// [`Listing::skipped`] instead of failing the scan. Records come back in
    /// directory order.
    pub async fn list_all<R: Record>(&self) -> StoreResult<Listing<R>> {
        self.ctx.ensure_ready().await?;
        let dir = self.ctx.collection_dir(R::COLLECTION);

        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| StoreError::ReadFailed {
                path: dir.clone(),
                source: CodecCause::Io(e),
            })?;

        let mut listing = Listing::default();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    return Err(StoreError::ReadFailed {
                        path: dir.clone(),
                        source: CodecCause::Io(e),
                    })
                }
            };
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }

            let raw = match tokio::fs::read_to_string(&path).await {
                Ok(raw) => raw,
                // Deleted between the directory read and now.
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => {
                    skip(&mut listing, path, e.to_string());
                    continue;
                }
            };
            match serde_json::from_str::<R>(&raw) {
                Ok(record) => listing.records.push(record),
                Err(e) => skip(&mut listing, path, e.to_string()),
            }
        }
        Ok(listing)
    }
}

fn decode<R: Record>(path: &Path, raw: &str) -> StoreResult<R> {
    serde_json::from_str(raw).map_err(|e| StoreError::ReadFailed {
        path: path.to_path_buf(),
        source: CodecCause::Json(e),
    })
}

fn skip<R>(listing: &mut Listing<R>, path: PathBuf, reason: String) {
    warn!(path = %path.display(), %reason, "skipping unreadable record");
    listing.skipped.push(SkippedRecord { path, reason });
}
