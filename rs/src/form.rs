//! Create/edit form model
//!
//! One form serves both creating and editing; which one is explicit in
//! [`Mode`] instead of a nullable edit index next to shared field state.

use std::fmt;

use tracing::debug;

use crate::book::RecipeBook;
use crate::domain::{RecipeDraft, RecipeId};
use crate::error::BookError;
use crate::store::KeyValueStore;

/// What a submit will do
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Creating,
    Editing(RecipeId),
}

/// Outcome of a successful submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Saved {
    Created(RecipeId),
    Updated(RecipeId),
}

impl Saved {
    pub fn id(&self) -> &RecipeId {
        match self {
            Self::Created(id) | Self::Updated(id) => id,
        }
    }
}

impl fmt::Display for Saved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created(_) => write!(f, "Recipe saved"),
            Self::Updated(_) => write!(f, "Recipe updated"),
        }
    }
}

/// Form state: the values being edited and what they will be saved as
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeForm {
    mode: Mode,
    draft: RecipeDraft,
}

impl RecipeForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, Mode::Editing(_))
    }

    pub fn draft(&self) -> &RecipeDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut RecipeDraft {
        &mut self.draft
    }

    /// Load a stored recipe into the form and switch to editing it
    pub fn begin_edit<S: KeyValueStore>(&mut self, book: &RecipeBook<S>, id: &RecipeId) -> Result<(), BookError> {
        debug!(%id, "RecipeForm::begin_edit: called");
        let recipe = book.get(id).ok_or_else(|| BookError::NotFound(id.clone()))?;
        self.draft = recipe.to_draft();
        self.mode = Mode::Editing(id.clone());
        Ok(())
    }

    /// Back to empty defaults in create mode
    pub fn reset(&mut self) {
        debug!("RecipeForm::reset: called");
        *self = Self::default();
    }

    /// Save the draft according to the mode
    ///
    /// On success the form resets. On any error the form keeps its values
    /// and mode so the user can fix them.
    pub fn submit<S: KeyValueStore>(&mut self, book: &mut RecipeBook<S>) -> Result<Saved, BookError> {
        debug!(mode = ?self.mode, "RecipeForm::submit: called");
        let saved = match &self.mode {
            Mode::Creating => Saved::Created(book.add(self.draft.clone())?),
            Mode::Editing(id) => {
                book.update(id, self.draft.clone())?;
                Saved::Updated(id.clone())
            }
        };
        self.reset();
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testutil::draft;

    fn book() -> RecipeBook<MemoryStore> {
        RecipeBook::open(MemoryStore::new(), "recipes").unwrap().0
    }

    #[test]
    fn test_create_then_reset() {
        let mut book = book();
        let mut form = RecipeForm::new();
        *form.draft_mut() = draft("Pancakes", "eggs", 20);

        let saved = form.submit(&mut book).unwrap();
        assert!(matches!(saved, Saved::Created(_)));
        assert_eq!(book.len(), 1);
        assert_eq!(form, RecipeForm::default());
    }

    #[test]
    fn test_invalid_submit_keeps_values() {
        let mut book = book();
        let mut form = RecipeForm::new();
        form.draft_mut().title = "Half done".to_string();

        assert!(matches!(form.submit(&mut book), Err(BookError::Validation(_))));
        assert_eq!(form.draft().title, "Half done");
        assert!(book.is_empty());
    }

    #[test]
    fn test_edit_flow_replaces_without_growing() {
        let mut book = book();
        let first = book.add(draft("Pancakes", "eggs", 20)).unwrap();
        book.add(draft("Soup", "water", 40)).unwrap();

        let mut form = RecipeForm::new();
        form.begin_edit(&book, &first).unwrap();
        assert_eq!(form.mode(), &Mode::Editing(first.clone()));
        assert_eq!(form.draft().title, "Pancakes");

        form.draft_mut().preparation_time = 25;
        let saved = form.submit(&mut book).unwrap();

        assert_eq!(saved, Saved::Updated(first.clone()));
        assert_eq!(book.len(), 2);
        assert_eq!(book.get(&first).unwrap().preparation_time, 25);
        assert!(!form.is_editing());
    }

    #[test]
    fn test_edit_keeps_favorite() {
        let mut book = book();
        let id = book.add(draft("Pancakes", "eggs", 20)).unwrap();
        book.toggle_favorite(&id).unwrap();

        let mut form = RecipeForm::new();
        form.begin_edit(&book, &id).unwrap();
        form.draft_mut().title = "Pancakes!".to_string();
        form.submit(&mut book).unwrap();

        assert!(book.get(&id).unwrap().favorite);
    }

    #[test]
    fn test_edit_of_deleted_recipe_fails() {
        let mut book = book();
        let id = book.add(draft("Pancakes", "eggs", 20)).unwrap();

        let mut form = RecipeForm::new();
        form.begin_edit(&book, &id).unwrap();
        book.delete(&id).unwrap();

        assert!(matches!(form.submit(&mut book), Err(BookError::NotFound(_))));
        assert!(form.is_editing());
        assert!(matches!(
            RecipeForm::new().begin_edit(&book, &id),
            Err(BookError::NotFound(_))
        ));
    }
}
