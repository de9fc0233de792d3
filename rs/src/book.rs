//! RecipeBook - the in-memory collection and its mutations
//!
//! The book is the single source of truth once opened. Every mutation is
//! applied to a copy, written through the repository, and only then swapped
//! in, so a failed write leaves both memory and storage at the old state.

use tracing::{debug, info, warn};

use crate::domain::{Recipe, RecipeDraft, RecipeId};
use crate::error::{BookError, StoreError};
use crate::pipeline::{self, PageView, Query};
use crate::repository::{Loaded, Repository};
use crate::store::KeyValueStore;

/// Something the user should hear about after opening the book
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenNotice {
    /// Stored data was unreadable; it was moved aside and the book started empty
    Recovered { quarantine_key: String, reason: String },
}

impl std::fmt::Display for OpenNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Recovered { quarantine_key, reason } => write!(
                f,
                "Stored recipes were unreadable ({}); saved a copy as '{}' and started empty",
                reason, quarantine_key
            ),
        }
    }
}

/// The recipe collection bound to its storage slot
#[derive(Debug)]
pub struct RecipeBook<S> {
    recipes: Vec<Recipe>,
    repo: Repository<S>,
}

impl<S: KeyValueStore> RecipeBook<S> {
    /// Load the collection from `key` in `store`
    ///
    /// Corrupt data is quarantined and reported through the returned notice;
    /// other storage errors are returned. Records stored without an id are
    /// given one and written back right away, so ids hold across opens.
    pub fn open(store: S, key: impl Into<String>) -> Result<(Self, Option<OpenNotice>), StoreError> {
        let mut repo = Repository::new(store, key);
        match repo.read() {
            Ok(Loaded { recipes, generated_ids }) => {
                info!(count = recipes.len(), key = %repo.key(), "RecipeBook::open: loaded recipes");
                if generated_ids > 0 {
                    info!(generated_ids, "RecipeBook::open: persisting ids for records stored without one");
                    repo.save(&recipes)?;
                }
                Ok((Self { recipes, repo }, None))
            }
            Err(StoreError::Corrupt { raw, reason, .. }) => {
                warn!(%reason, "RecipeBook::open: stored recipes unreadable, starting empty");
                let quarantine_key = repo.quarantine(&raw)?;
                let notice = OpenNotice::Recovered { quarantine_key, reason };
                Ok((
                    Self {
                        recipes: Vec::new(),
                        repo,
                    },
                    Some(notice),
                ))
            }
            Err(e) => Err(e),
        }
    }

    /// The base collection, in insertion order
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn get(&self, id: &RecipeId) -> Option<&Recipe> {
        self.recipes.iter().find(|r| &r.id == id)
    }

    pub fn repository(&self) -> &Repository<S> {
        &self.repo
    }

    /// Run the view pipeline over the collection
    pub fn query(&self, query: &Query) -> PageView {
        pipeline::run(&self.recipes, query)
    }

    fn position(&self, id: &RecipeId) -> Result<usize, BookError> {
        self.recipes
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| BookError::NotFound(id.clone()))
    }

    fn commit(&mut self, next: Vec<Recipe>) -> Result<(), BookError> {
        self.repo.save(&next)?;
        self.recipes = next;
        Ok(())
    }

    /// Validate and append a new recipe
    pub fn add(&mut self, draft: RecipeDraft) -> Result<RecipeId, BookError> {
        debug!(title = %draft.title, "RecipeBook::add: called");
        let recipe = Recipe::from_draft(draft)?;
        let id = recipe.id.clone();

        let mut next = self.recipes.clone();
        next.push(recipe);
        self.commit(next)?;

        info!(%id, count = self.recipes.len(), "RecipeBook::add: recipe saved");
        Ok(id)
    }

    /// Validate and replace the recipe with `id`, keeping its position
    pub fn update(&mut self, id: &RecipeId, draft: RecipeDraft) -> Result<(), BookError> {
        debug!(%id, "RecipeBook::update: called");
        let pos = self.position(id)?;
        let recipe = Recipe::with_id(id.clone(), draft)?;

        let mut next = self.recipes.clone();
        next[pos] = recipe;
        self.commit(next)?;

        info!(%id, "RecipeBook::update: recipe updated");
        Ok(())
    }

    /// Remove the recipe with `id`
    pub fn delete(&mut self, id: &RecipeId) -> Result<Recipe, BookError> {
        debug!(%id, "RecipeBook::delete: called");
        let pos = self.position(id)?;

        let mut next = self.recipes.clone();
        let removed = next.remove(pos);
        self.commit(next)?;

        info!(%id, count = self.recipes.len(), "RecipeBook::delete: recipe deleted");
        Ok(removed)
    }

    /// Flip the favorite flag; returns the new value
    pub fn toggle_favorite(&mut self, id: &RecipeId) -> Result<bool, BookError> {
        debug!(%id, "RecipeBook::toggle_favorite: called");
        let pos = self.position(id)?;

        let mut next = self.recipes.clone();
        next[pos].favorite = !next[pos].favorite;
        let favorite = next[pos].favorite;
        self.commit(next)?;

        info!(%id, favorite, "RecipeBook::toggle_favorite: toggled");
        Ok(favorite)
    }
}
