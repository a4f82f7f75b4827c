//! Design store backed by a directory of JSON files, one per design.

use async_trait::async_trait;
use customfly_autosave::{DesignStore, SaveError, SaveRequest, SaveResponse, FIRST_MEMORY_ID};
use std::path::{Path, PathBuf};
use tokio::fs;

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    /// Next free numeric id, counting up from 1001
    async fn next_id(&self) -> Result<String, SaveError> {
        let mut next = FIRST_MEMORY_ID;
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                let taken = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .and_then(|s| s.parse::<u64>().ok());
                if let Some(taken) = taken {
                    next = next.max(taken + 1);
                }
            }
        }
        Ok(next.to_string())
    }
}

#[async_trait]
impl DesignStore for FileStore {
    async fn save(&self, request: SaveRequest) -> Result<SaveResponse, SaveError> {
        if let Some(id) = &request.id {
            if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
                return Err(SaveError::Rejected(format!("invalid design id: {:?}", id)));
            }
        }

        fs::create_dir_all(&self.dir).await?;

        let id = match &request.id {
            Some(id) => id.clone(),
            None => self.next_id().await?,
        };
        let stored = SaveRequest {
            id: Some(id.clone()),
            ..request
        };

        // Renamed into place; readers only ever see complete files
        let path = self.path_for(&id);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&stored)?).await?;
        fs::rename(&tmp, &path).await?;

        tracing::debug!(path = %path.display(), "design written");
        Ok(SaveResponse {
            id,
            name: Some(stored.name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use customfly_model::default_pages;
    use serde_json::Value;

    fn read(store: &FileStore, id: &str) -> SaveRequest {
        let content = std::fs::read_to_string(store.path_for(id)).unwrap();
        serde_json::from_str(&content).unwrap()
    }

    fn request(id: Option<&str>) -> SaveRequest {
        SaveRequest {
            id: id.map(String::from),
            name: "Mug".to_string(),
            design_json: default_pages(),
            config: Value::Null,
        }
    }

    #[tokio::test]
    async fn test_first_save_assigns_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("designs"));

        let first = store.save(request(None)).await.unwrap();
        let second = store.save(request(None)).await.unwrap();
        assert_eq!(first.id, "1001");
        assert_eq!(second.id, "1002");

        let loaded = read(&store, "1001");
        assert_eq!(loaded.id.as_deref(), Some("1001"));
        assert_eq!(loaded.design_json, default_pages());
    }

    #[tokio::test]
    async fn test_save_with_id_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let id = store.save(request(None)).await.unwrap().id;
        let mut update = request(Some(&id));
        update.name = "Renamed".to_string();
        store.save(update).await.unwrap();

        assert_eq!(read(&store, &id).name, "Renamed");
        let files = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 1);
    }

    #[tokio::test]
    async fn test_rejects_path_like_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let result = store.save(request(Some("../escape"))).await;
        assert!(matches!(result, Err(SaveError::Rejected(_))));
    }
}
