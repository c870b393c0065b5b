//! Persisted last-opened document reference

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const RECENT_FILENAME: &str = "recent.json";
const APP_NAME: &str = "pdfpager";

/// The single document identifier persisted across restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentDocument {
    /// Opaque identifier the application can reopen the source from
    pub identifier: String,
    pub opened_at: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub page_count: usize,
}

/// Store for the last-opened document reference.
///
/// The render core neither reads nor writes this; the application
/// records a document here when it opens one and reopens the stored
/// identifier on the next start.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecentStore {
    last_opened: Option<RecentDocument>,
    #[serde(skip)]
    file_path: Option<String>,
}

impl RecentStore {
    pub fn ephemeral() -> Self {
        Self {
            last_opened: None,
            file_path: None,
        }
    }

    pub fn with_file(file_path: &str) -> Self {
        Self {
            last_opened: None,
            file_path: Some(file_path.to_string()),
        }
    }

    /// Default location under the platform data directory
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join(APP_NAME).join(RECENT_FILENAME))
    }

    pub fn load_or_ephemeral(file_path: Option<&str>) -> Self {
        match file_path {
            Some(path) => Self::load_from_file(path).unwrap_or_else(|e| {
                log::error!("Failed to load recent store from {}: {}", path, e);
                Self::with_file(path)
            }),
            None => Self::ephemeral(),
        }
    }

    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let path = Path::new(file_path);
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let mut store: Self = serde_json::from_str(&content)?;
            store.file_path = Some(file_path.to_string());
            Ok(store)
        } else {
            Ok(Self::with_file(file_path))
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        match &self.file_path {
            Some(path) => {
                if let Some(parent) = Path::new(path).parent() {
                    fs::create_dir_all(parent)?;
                }
                let content = serde_json::to_string_pretty(self)?;
                fs::write(path, content)?;
                Ok(())
            }
            None => {
                // Ephemeral stores don't save to disk
                Ok(())
            }
        }
    }

    #[must_use]
    pub fn last_opened(&self) -> Option<&RecentDocument> {
        self.last_opened.as_ref()
    }

    /// Record a newly opened document and save best-effort.
    pub fn record(&mut self, identifier: &str, page_count: usize) {
        self.last_opened = Some(RecentDocument {
            identifier: identifier.to_string(),
            opened_at: chrono::Utc::now(),
            page_count,
        });
        if self.file_path.is_some() {
            if let Err(e) = self.save() {
                log::error!("Failed to save recent store: {}", e);
            }
        }
    }
}
