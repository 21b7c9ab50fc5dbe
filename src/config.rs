use crate::persistence::{self, FileRecordStore, PersistenceResult, RecordStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Which [`RecordStore`] implementation backs a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// The `id,name,date,interval` text file.
    #[default]
    Lines,
    #[cfg(feature = "sqlite")]
    Sqlite,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Lines => "lines",
            #[cfg(feature = "sqlite")]
            StorageBackend::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lines" | "csv" => Ok(StorageBackend::Lines),
            #[cfg(feature = "sqlite")]
            "sqlite" => Ok(StorageBackend::Sqlite),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub data_file: PathBuf,
    #[serde(default)]
    pub backend: StorageBackend,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_file: persistence::default_data_path(),
            backend: StorageBackend::default(),
        }
    }
}

impl TrackerConfig {
    pub fn open_store(&self) -> PersistenceResult<Box<dyn RecordStore + Send + Sync>> {
        match self.backend {
            StorageBackend::Lines => Ok(Box::new(FileRecordStore::new(self.data_file.clone()))),
            #[cfg(feature = "sqlite")]
            StorageBackend::Sqlite => Ok(Box::new(persistence::sqlite::SqliteRecordStore::new(
                &self.data_file,
            )?)),
        }
    }
}
