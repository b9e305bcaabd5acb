use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::recipe::Recipe;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on recipe file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Recipe data is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("In-memory backend lock poisoned")]
    Poisoned,
}

/// Where the recipe list lives between process runs.
pub trait RecipeBackend: Send + Sync {
    fn load(&self) -> Result<Vec<Recipe>, StoreError>;

    /// Replaces the whole persisted collection with `recipes`.
    fn persist(&self, recipes: &[Recipe]) -> Result<(), StoreError>;
}

impl<T: RecipeBackend + ?Sized> RecipeBackend for Arc<T> {
    fn load(&self) -> Result<Vec<Recipe>, StoreError> {
        (**self).load()
    }

    fn persist(&self, recipes: &[Recipe]) -> Result<(), StoreError> {
        (**self).persist(recipes)
    }
}

/// A pretty-printed JSON array on disk. Any array loads; elements are not inspected.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "recipes.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl RecipeBackend for JsonFileBackend {
    fn load(&self) -> Result<Vec<Recipe>, StoreError> {
        let content = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    fn persist(&self, recipes: &[Recipe]) -> Result<(), StoreError> {
        let body = serde_json::to_string_pretty(recipes)?;
        let tmp = self.temp_path();
        // Write next to the target, then swap it in, so a crash mid-write never truncates the store.
        fs::write(&tmp, body).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Keeps the "persisted" copy in memory. Used by tests and throwaway servers.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    recipes: Mutex<Vec<Recipe>>,
}

impl InMemoryBackend {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self {
            recipes: Mutex::new(recipes),
        }
    }

    /// What the last `persist` call wrote.
    pub fn snapshot(&self) -> Vec<Recipe> {
        self.recipes.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl RecipeBackend for InMemoryBackend {
    fn load(&self) -> Result<Vec<Recipe>, StoreError> {
        self.recipes
            .lock()
            .map(|r| r.clone())
            .map_err(|_| StoreError::Poisoned)
    }

    fn persist(&self, recipes: &[Recipe]) -> Result<(), StoreError> {
        let mut guard = self.recipes.lock().map_err(|_| StoreError::Poisoned)?;
        *guard = recipes.to_vec();
        Ok(())
    }
}
