//! Store adapter: the whole collection as one JSON array in one slot

use tracing::{debug, warn};

use crate::domain::{Recipe, StoredRecipe};
use crate::error::StoreError;
use crate::store::KeyValueStore;

/// Collection as read from the slot
#[derive(Debug, Default)]
pub(crate) struct Loaded {
    pub(crate) recipes: Vec<Recipe>,
    /// Records stored without an id that were given a fresh one
    pub(crate) generated_ids: usize,
}

/// Reads and writes the recipe collection under a single key
#[derive(Debug)]
pub struct Repository<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> Repository<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        let key = key.into();
        debug!(%key, "Repository::new: called");
        Self { store, key }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Load the collection; an absent slot is an empty collection
    pub fn load(&self) -> Result<Vec<Recipe>, StoreError> {
        self.read().map(|loaded| loaded.recipes)
    }

    /// Load the collection, counting records that had to be given an id
    pub(crate) fn read(&self) -> Result<Loaded, StoreError> {
        debug!(key = %self.key, "Repository::read: called");
        let Some(raw) = self.store.get(&self.key)? else {
            debug!("Repository::read: slot empty");
            return Ok(Loaded::default());
        };

        if raw.trim().is_empty() || raw.trim() == "null" {
            return Ok(Loaded::default());
        }

        let stored: Vec<StoredRecipe> = serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            key: self.key.clone(),
            reason: e.to_string(),
            raw,
        })?;
        let generated_ids = stored.iter().filter(|r| r.id.is_none()).count();
        Ok(Loaded {
            recipes: stored.into_iter().map(Recipe::from).collect(),
            generated_ids,
        })
    }

    /// Overwrite the slot with the full collection
    pub fn save(&mut self, recipes: &[Recipe]) -> Result<(), StoreError> {
        debug!(key = %self.key, count = recipes.len(), "Repository::save: called");
        let json = serde_json::to_string(recipes).map_err(|e| StoreError::Serialize(e.to_string()))?;
        self.store.set(&self.key, &json)
    }

    /// Move unreadable data aside under `<key>.corrupt-<unix-millis>` and
    /// clear the main slot; returns the quarantine key
    ///
    /// An existing quarantine slot is never overwritten; a `-<n>` suffix is
    /// added instead.
    pub fn quarantine(&mut self, raw: &str) -> Result<String, StoreError> {
        let base = format!("{}.corrupt-{}", self.key, chrono::Utc::now().timestamp_millis());
        let mut quarantine_key = base.clone();
        let mut suffix = 1;
        while self.store.get(&quarantine_key)?.is_some() {
            quarantine_key = format!("{}-{}", base, suffix);
            suffix += 1;
        }
        warn!(key = %self.key, %quarantine_key, "Repository::quarantine: moving corrupt data aside");
        self.store.set(&quarantine_key, raw)?;
        self.store.remove(&self.key)?;
        Ok(quarantine_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore};
    use crate::testutil::recipe;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_is_empty() {
        let repo = Repository::new(MemoryStore::new(), "recipes");
        assert!(repo.load().unwrap().is_empty());
    }

    #[test]
    fn test_roundtrip_is_field_for_field() {
        let temp = TempDir::new().unwrap();
        let mut repo = Repository::new(FileStore::open(temp.path()).unwrap(), "recipes");

        let mut favorite = recipe("Stew", 90);
        favorite.favorite = true;
        let mut no_image = recipe("Toast", 5);
        no_image.image = None;
        let recipes = vec![recipe("Salad", 15), favorite, no_image];

        repo.save(&recipes).unwrap();
        let reopened = Repository::new(FileStore::open(temp.path()).unwrap(), "recipes");
        assert_eq!(reopened.load().unwrap(), recipes);
    }

    #[test]
    fn test_save_writes_single_json_array() {
        let mut repo = Repository::new(MemoryStore::new(), "recipes");
        repo.save(&[recipe("Salad", 15)]).unwrap();

        let raw = repo.store().get("recipes").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value.as_array().map(|a| a.len()), Some(1));
        assert_eq!(value[0]["title"], "Salad");
        assert_eq!(value[0]["preparationTime"], 15);
    }

    #[test]
    fn test_corrupt_data_is_reported() {
        let mut store = MemoryStore::new();
        store.set("recipes", "{not json").unwrap();
        let repo = Repository::new(store, "recipes");

        match repo.load() {
            Err(StoreError::Corrupt { key, raw, .. }) => {
                assert_eq!(key, "recipes");
                assert_eq!(raw, "{not json");
            }
            other => panic!("expected corrupt error, got {:?}", other),
        }
    }

    #[test]
    fn test_quarantine_moves_data() {
        let mut store = MemoryStore::new();
        store.set("recipes", "{not json").unwrap();
        let mut repo = Repository::new(store, "recipes");

        let quarantine_key = repo.quarantine("{not json").unwrap();
        assert!(quarantine_key.starts_with("recipes.corrupt-"));
        assert_eq!(repo.store().get(&quarantine_key).unwrap().as_deref(), Some("{not json"));
        assert!(repo.load().unwrap().is_empty());
    }

    #[test]
    fn test_quarantine_never_overwrites() {
        let mut repo = Repository::new(MemoryStore::new(), "recipes");

        let first = repo.quarantine("{first").unwrap();
        let second = repo.quarantine("{second").unwrap();

        assert_ne!(first, second);
        assert_eq!(repo.store().get(&first).unwrap().as_deref(), Some("{first"));
        assert_eq!(repo.store().get(&second).unwrap().as_deref(), Some("{second"));
    }

    #[test]
    fn test_read_counts_records_without_id() {
        let mut store = MemoryStore::new();
        let stored = recipe("Stew", 90);
        let with_id = serde_json::to_string(&stored).unwrap();
        let legacy = r#"{"image":null,"title":"Soup","ingredients":"water","instructions":"boil","preparationTime":20}"#;
        store.set("recipes", &format!("[{},{}]", with_id, legacy)).unwrap();
        let repo = Repository::new(store, "recipes");

        let loaded = repo.read().unwrap();
        assert_eq!(loaded.generated_ids, 1);
        assert_eq!(loaded.recipes.len(), 2);
        assert_eq!(loaded.recipes[0].id, stored.id);
        assert!(!loaded.recipes[1].id.as_str().is_empty());
    }
}
