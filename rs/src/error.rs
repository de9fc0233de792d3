//! Error types for recipe storage and mutations

use std::fmt;

use thiserror::Error;

use crate::domain::RecipeId;

/// A required recipe field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Image,
    Title,
    Ingredients,
    Instructions,
    PreparationTime,
}

impl Field {
    /// All fields, in form order
    pub const ALL: [Field; 5] = [
        Field::Image,
        Field::Title,
        Field::Ingredients,
        Field::Instructions,
        Field::PreparationTime,
    ];

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Self::Image => "Image",
            Self::Title => "Title",
            Self::Ingredients => "Ingredients",
            Self::Instructions => "Instructions",
            Self::PreparationTime => "Preparation Time",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Draft rejected on save; lists every offending field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Please fill all required fields: {}", join_fields(.missing))]
pub struct ValidationError {
    pub missing: Vec<Field>,
}

fn join_fields(fields: &[Field]) -> String {
    fields.iter().map(|f| f.label()).collect::<Vec<_>>().join(", ")
}

/// Errors from the key-value store and the repository on top of it
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored data under '{key}' is corrupt: {reason}")]
    Corrupt { key: String, raw: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Invalid storage key: '{0}'")]
    InvalidKey(String),
}

/// Errors from recipe book operations
#[derive(Debug, Error)]
pub enum BookError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Recipe not found: {0}")]
    NotFound(RecipeId),

    #[error(transparent)]
    Store(#[from] StoreError),
}
