//! Read-through result cache keyed by element symbol.

use crate::record::ElementRecord;
use crate::resolver::capitalize;
use crate::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Storage for finished element records.
///
/// Keys are normalized with [`capitalize`], so `fe`, `FE` and `Fe` share an
/// entry. `store` overwrites.
pub trait ResultCache: Send + Sync {
    fn lookup(&self, symbol: &str) -> Result<Option<ElementRecord>>;
    fn store(&self, symbol: &str, record: &ElementRecord) -> Result<()>;
}

/// One pretty-printed JSON file per symbol, `<dir>/<Symbol>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    dir: PathBuf,
}

impl JsonFileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the entry for a symbol.
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.json", capitalize(symbol)))
    }
}

impl ResultCache for JsonFileCache {
    fn lookup(&self, symbol: &str) -> Result<Option<ElementRecord>> {
        let path = self.path_for(symbol);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        debug!("Cache read {}", path.display());
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn store(&self, symbol: &str, record: &ElementRecord) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(symbol);
        let json = serde_json::to_string_pretty(record)?;

        // Rename over the target so readers never see a partial file.
        let tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        std::fs::write(tmp.path(), json)?;
        tmp.persist(&path).map_err(|e| e.error)?;
        debug!("Cache wrote {}", path.display());
        Ok(())
    }
}

/// Process-local cache, mostly for tests and the MCP server.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, ElementRecord>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultCache for MemoryCache {
    fn lookup(&self, symbol: &str) -> Result<Option<ElementRecord>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| crate::Error::Config("memory cache lock poisoned".into()))?;
        Ok(entries.get(&capitalize(symbol)).cloned())
    }

    fn store(&self, symbol: &str, record: &ElementRecord) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| crate::Error::Config("memory cache lock poisoned".into()))?;
        entries.insert(capitalize(symbol), record.clone());
        Ok(())
    }
}
