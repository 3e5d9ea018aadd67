use crate::error::{NavError, Result};
use crate::store::StoreData;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Where the store keeps its data between sessions
pub trait Backend {
    fn load(&mut self) -> Result<StoreData>;

    fn save(&mut self, data: &StoreData) -> Result<()>;
}

/// Backend kept in memory; clones share the same data
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    data: Rc<RefCell<StoreData>>,
    saves: Rc<RefCell<usize>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last saved data
    pub fn snapshot(&self) -> StoreData {
        self.data.borrow().clone()
    }

    /// Number of writes so far
    pub fn save_count(&self) -> usize {
        *self.saves.borrow()
    }
}

impl Backend for MemoryBackend {
    fn load(&mut self) -> Result<StoreData> {
        Ok(self.data.borrow().clone())
    }

    fn save(&mut self, data: &StoreData) -> Result<()> {
        *self.data.borrow_mut() = data.clone();
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}

/// Backend writing one pretty-printed JSON document
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Backend for JsonFileBackend {
    fn load(&mut self) -> Result<StoreData> {
        if !self.path.exists() {
            log::debug!("no store at {}, starting empty", self.path.display());
            return Ok(StoreData::default());
        }
        let json = std::fs::read_to_string(&self.path)?;
        serde_json::from_str(&json)
            .map_err(|e| NavError::Storage(format!("Failed to parse {}: {}", self.path.display(), e)))
    }

    fn save(&mut self, data: &StoreData) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(data)?;

        // Write next to the target and rename, so a crash never leaves half a file.
        let staging = self.path.with_extension("json.tmp");
        std::fs::write(&staging, json)?;
        std::fs::rename(&staging, &self.path)?;
        Ok(())
    }
}
