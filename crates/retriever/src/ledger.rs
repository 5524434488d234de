//! Record of images already saved into a download directory.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use tracing::{info, warn};

use crate::error::RetrieverError;

const SAVED_MARKER: &str = "s";

#[derive(Debug, Clone, Default)]
pub struct ExistingImages {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl ExistingImages {
    /// A missing or unreadable ledger starts empty.
    pub async fn load(directory: &Path, file_name: &str) -> Self {
        let path = directory.join(file_name);
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<BTreeMap<String, String>>(&bytes) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "existing images file is corrupt; starting empty");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read existing images file");
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.entries.contains_key(file_name)
    }

    pub fn record(&mut self, file_name: impl Into<String>) {
        self.entries.insert(file_name.into(), SAVED_MARKER.to_string());
    }

    pub async fn save(&self) -> Result<(), RetrieverError> {
        let bytes = serde_json::to_vec_pretty(&self.entries).map_err(|err| RetrieverError::Io {
            path: self.path.clone(),
            source: std::io::Error::other(err),
        })?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|source| RetrieverError::Io {
                path: self.path.clone(),
                source,
            })?;
        info!(path = %self.path.display(), entries = self.entries.len(), "saved existing images file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn temp_dir(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("backdrop-ledger-{label}-{nanos}"));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[tokio::test]
    async fn missing_file_loads_empty_and_saves_recorded_names() {
        let dir = temp_dir("roundtrip");
        let mut ledger = ExistingImages::load(&dir, "existing.json").await;
        assert!(ledger.is_empty());

        ledger.record("t3_a.jpg");
        ledger.save().await.expect("save");

        let reloaded = ExistingImages::load(&dir, "existing.json").await;
        assert!(reloaded.contains("t3_a.jpg"));
        assert!(!reloaded.contains("t3_b.jpg"));
        let raw = std::fs::read_to_string(dir.join("existing.json")).expect("read");
        assert!(raw.contains("\"t3_a.jpg\": \"s\""));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn corrupt_file_loads_empty() {
        let dir = temp_dir("corrupt");
        std::fs::write(dir.join("existing.json"), b"{not json").expect("write");
        let ledger = ExistingImages::load(&dir, "existing.json").await;
        assert_eq!(ledger.len(), 0);
        let _ = std::fs::remove_dir_all(dir);
    }
}
