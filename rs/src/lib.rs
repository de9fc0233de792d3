//! RecipeStore - recipe collection model and persistence
//!
//! Holds the recipe collection as a single JSON array in one slot of a
//! key-value store, and derives the visible page from it with a pure
//! sort/filter/paginate pipeline.
//!
//! # Architecture
//!
//! ```text
//! RecipeForm ──save──▶ RecipeBook ──save──▶ Repository ──set──▶ KeyValueStore
//!                          │                                    (FileStore: <key>.json)
//!                          └──query──▶ pipeline::run ──▶ PageView
//! ```
//!
//! # Example
//!
//! ```ignore
//! use recipestore::{FileStore, Query, RecipeBook, RecipeForm};
//!
//! let (mut book, _notice) = RecipeBook::open(FileStore::open("~/.local/share/recipebox")?, "recipes")?;
//! let mut form = RecipeForm::new();
//! form.draft_mut().title = "Pancakes".to_string();
//! // ...fill the remaining fields...
//! form.submit(&mut book)?;
//! let page = book.query(&Query::default());
//! ```

mod book;
mod domain;
mod error;
mod form;
pub mod pipeline;
mod repository;
mod store;

pub use book::{OpenNotice, RecipeBook};
pub use domain::{Recipe, RecipeDraft, RecipeId};
pub use error::{BookError, Field, StoreError, ValidationError};
pub use form::{Mode, RecipeForm, Saved};
pub use pipeline::{PageView, Query, SortOrder, TimeBucket};
pub use repository::Repository;
pub use store::{FileStore, KeyValueStore, MemoryStore};

/// Default number of recipes shown per page
pub const DEFAULT_PAGE_SIZE: usize = 3;

/// Default slot the collection is stored under
pub const DEFAULT_STORAGE_KEY: &str = "recipes";
