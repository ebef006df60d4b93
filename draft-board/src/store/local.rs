// Local JSON file store. Fallback for the remote store, or the only store
// when no GitHub token is configured.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::{decode_picks, encode_picks, PickStore, StoreError};
use crate::draft::pick::PickMap;

#[derive(Debug, Clone)]
pub struct LocalFileStore {
    path: PathBuf,
}

impl LocalFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("draft_picks.json");
        self.path
            .with_file_name(format!(".{}.tmp.{}", name, std::process::id()))
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl PickStore for LocalFileStore {
    fn label(&self) -> String {
        self.path.display().to_string()
    }

    async fn read_picks(&self) -> Result<PickMap, StoreError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StoreError::NotFound),
            Err(e) => return Err(self.io_error(e)),
        };
        decode_picks(&text)
    }

    async fn write_picks(&self, picks: &PickMap) -> Result<(), StoreError> {
        let document = encode_picks(picks)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.io_error(e))?;
            }
        }

        // Temp file, then rename: the real file is never half-written.
        let tmp = self.temp_path();
        {
            let mut file = tokio::fs::File::create(&tmp)
                .await
                .map_err(|e| self.io_error(e))?;
            file.write_all(document.as_bytes())
                .await
                .map_err(|e| self.io_error(e))?;
            file.sync_all().await.map_err(|e| self.io_error(e))?;
        }
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(self.io_error(e));
        }
        debug!("wrote {} picks to {}", picks.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::pick::PickKey;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("draft_board_local_{}_{}", name, std::process::id()))
            .join("draft_picks.json")
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let store = LocalFileStore::new(temp_path("missing"));
        assert!(matches!(store.read_picks().await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn write_creates_parent_and_reads_back() {
        let path = temp_path("roundtrip");
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
        let store = LocalFileStore::new(&path);

        let mut picks = PickMap::new();
        picks.insert(PickKey::new(1, 1), Some(42));
        picks.insert(PickKey::new(1, 2), None);
        store.write_picks(&picks).await.unwrap();

        assert!(path.exists());
        assert_eq!(store.read_picks().await.unwrap(), picks);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn rewrite_replaces_file_and_leaves_no_temp_file() {
        let path = temp_path("replace");
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
        let store = LocalFileStore::new(&path);

        let mut picks = PickMap::new();
        picks.insert(PickKey::new(1, 1), Some(42));
        store.write_picks(&picks).await.unwrap();
        picks.insert(PickKey::new(1, 2), Some(7));
        store.write_picks(&picks).await.unwrap();

        assert_eq!(store.read_picks().await.unwrap(), picks);
        let entries: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("draft_picks.json")]);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn empty_file_reads_as_empty_map() {
        let path = temp_path("empty");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "").unwrap();

        let store = LocalFileStore::new(&path);
        assert!(store.read_picks().await.unwrap().is_empty());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn corrupt_file_is_parse_error() {
        let path = temp_path("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        let store = LocalFileStore::new(&path);
        assert!(matches!(store.read_picks().await, Err(StoreError::Parse(_))));

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
