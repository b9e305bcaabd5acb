pub mod data_loader;

pub use data_loader::{InMemoryBackend, JsonFileBackend, RecipeBackend, StoreError};

use std::sync::{Mutex, RwLock};

use crate::recipe::Recipe;

/// The authoritative recipe list, mirrored to a [`RecipeBackend`].
///
/// Readers take the `RwLock`; appends additionally hold `write_lock` while the
/// backend is written so two appends can never interleave their file writes.
pub struct RecipeStore {
    recipes: RwLock<Vec<Recipe>>,
    backend: Box<dyn RecipeBackend>,
    write_lock: Mutex<()>,
    default_limit: usize,
}

impl RecipeStore {
    /// Loads the initial list from `backend`. A load failure is logged and yields an
    /// empty store; the server starts either way.
    pub fn load(backend: Box<dyn RecipeBackend>, default_limit: usize) -> Self {
        let recipes = match backend.load() {
            Ok(recipes) => {
                tracing::info!(count = recipes.len(), "Loaded recipes");
                recipes
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not load recipes, starting with an empty store");
                Vec::new()
            }
        };

        Self {
            recipes: RwLock::new(recipes),
            backend,
            write_lock: Mutex::new(()),
            default_limit,
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Case-insensitive substring search over name, tags and ingredient names.
    ///
    /// An empty (or all-whitespace) query returns the first `default_limit` recipes.
    /// Results keep storage order; there is no ranking.
    pub fn search(&self, query: &str) -> Vec<Recipe> {
        let query = query.trim().to_lowercase();
        let recipes = self.read();

        if query.is_empty() {
            return recipes.iter().take(self.default_limit).cloned().collect();
        }

        recipes
            .iter()
            .filter(|r| r.search_haystack().contains(&query))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<Recipe> {
        self.read().iter().find(|r| r.id() == Some(id)).cloned()
    }

    /// Adds `recipe` to the end of the list and rewrites the backend with the full list.
    /// If the backend write fails the in-memory list is left as it was.
    pub fn append(&self, recipe: Recipe) -> Result<(), StoreError> {
        let _writer = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut next = self.read().clone();
        next.push(recipe);
        self.backend.persist(&next)?;

        let mut recipes = self.recipes.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *recipes = next;
        tracing::debug!(count = recipes.len(), "Recipe store persisted");
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<Recipe>> {
        self.recipes.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::fixtures::recipe;
    use std::sync::Arc;

    struct FailingBackend;

    impl RecipeBackend for FailingBackend {
        fn load(&self) -> Result<Vec<Recipe>, StoreError> {
            Err(StoreError::Poisoned)
        }

        fn persist(&self, _recipes: &[Recipe]) -> Result<(), StoreError> {
            Err(StoreError::Poisoned)
        }
    }

    fn store_with(recipes: Vec<Recipe>) -> RecipeStore {
        RecipeStore::load(Box::new(InMemoryBackend::new(recipes)), 10)
    }

    fn sample() -> Vec<Recipe> {
        vec![
            recipe("dal-tadka", "Dal Tadka", &["vegetarian", "lentils"], &["toor dal", "ghee", "cumin"]),
            recipe("butter-chicken", "Butter Chicken", &["punjabi"], &["chicken", "butter", "cream"]),
            recipe("chana-masala", "Chana Masala", &["vegetarian"], &["chickpeas", "onion", "cumin"]),
        ]
    }

    fn ids(recipes: &[Recipe]) -> Vec<&str> {
        recipes.iter().map(|r| r.id().unwrap_or_default()).collect()
    }

    #[test]
    fn test_search_matches_name_case_insensitively() {
        let store = store_with(sample());
        assert_eq!(ids(&store.search("  DAL ")), vec!["dal-tadka"]);
    }

    #[test]
    fn test_search_matches_tags_and_ingredients_in_storage_order() {
        let store = store_with(sample());
        assert_eq!(ids(&store.search("vegetarian")), vec!["dal-tadka", "chana-masala"]);
        assert_eq!(ids(&store.search("cumin")), vec!["dal-tadka", "chana-masala"]);
        assert_eq!(ids(&store.search("cream")), vec!["butter-chicken"]);
    }

    #[test]
    fn test_search_is_plain_substring_across_fields() {
        let store = store_with(sample());
        // "tadka vegetarian" spans the name and the first tag in the haystack
        assert_eq!(ids(&store.search("tadka vegetarian")), vec!["dal-tadka"]);
        assert!(store.search("pasta").is_empty());
    }

    #[test]
    fn test_empty_query_returns_first_ten() {
        let many: Vec<Recipe> = (0..15)
            .map(|i| recipe(&format!("r{i}"), &format!("Recipe {i}"), &[], &[]))
            .collect();
        let store = store_with(many);

        let results = store.search("   ");
        assert_eq!(results.len(), 10);
        assert_eq!(results[0].id(), Some("r0"));
        assert_eq!(results[9].id(), Some("r9"));
    }

    #[test]
    fn test_empty_query_on_small_store_returns_everything() {
        let store = store_with(sample());
        assert_eq!(store.search("").len(), 3);
    }

    #[test]
    fn test_empty_query_limit_is_configurable() {
        let store = RecipeStore::load(Box::new(InMemoryBackend::new(sample())), 2);
        assert_eq!(ids(&store.search("")), vec!["dal-tadka", "butter-chicken"]);
    }

    #[test]
    fn test_append_then_search_by_name() -> anyhow::Result<()> {
        let backend = Arc::new(InMemoryBackend::default());
        let store = RecipeStore::load(Box::new(backend.clone()), 10);
        assert!(store.is_empty());

        store.append(recipe("pasta-1", "Pasta", &[], &[]))?;

        assert_eq!(ids(&store.search("Pasta")), vec!["pasta-1"]);
        assert_eq!(backend.snapshot().len(), 1);
        Ok(())
    }

    #[test]
    fn test_failed_persist_leaves_store_untouched() {
        let store = RecipeStore {
            recipes: RwLock::new(sample()),
            backend: Box::new(FailingBackend),
            write_lock: Mutex::new(()),
            default_limit: 10,
        };
        assert!(store.append(recipe("x", "X", &[], &[])).is_err());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_load_failure_yields_empty_store() {
        let store = RecipeStore::load(Box::new(FailingBackend), 10);
        assert!(store.is_empty());
        assert!(store.search("").is_empty());
    }

    #[test]
    fn test_get_returns_first_match_for_duplicate_ids() {
        let mut recipes = sample();
        recipes.push(recipe("dal-tadka", "Second Dal", &[], &[]));
        let store = store_with(recipes);

        let first = store.get("dal-tadka").unwrap();
        assert_eq!(first.name(), Some("Dal Tadka"));
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn test_mixed_shape_seed_survives_an_append() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("recipes.json");
        std::fs::write(
            &path,
            r#"[{"id":"dal","name":"Dal","servings":2,"ingredients":[{"name":"toor dal"}],"steps":[]},
                {"id":"poha","name":"Poha","servings":"2-3","ingredients":[{"name":"salt","quantity":"to taste"}],"steps":[]}]"#,
        )?;

        let store = RecipeStore::load(Box::new(JsonFileBackend::new(&path)), 10);
        assert_eq!(store.len(), 2);
        assert_eq!(ids(&store.search("salt")), vec!["poha"]);

        store.append(recipe("pasta-1", "Pasta", &[], &[]))?;

        let on_disk: Vec<serde_json::Value> = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        let on_disk_ids: Vec<&str> = on_disk.iter().filter_map(|r| r["id"].as_str()).collect();
        assert_eq!(on_disk_ids, vec!["dal", "poha", "pasta-1"]);
        assert_eq!(on_disk[1]["ingredients"][0]["quantity"], "to taste");
        assert_eq!(on_disk[1]["servings"], "2-3");
        Ok(())
    }

    #[test]
    fn test_concurrent_appends_are_all_kept() {
        let backend = Arc::new(InMemoryBackend::default());
        let store = Arc::new(RecipeStore::load(Box::new(backend.clone()), 10));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || store.append(recipe(&format!("r{i}"), "R", &[], &[])))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert_eq!(store.len(), 8);
        assert_eq!(backend.snapshot().len(), 8);
    }
}
