//! Recipe records and drafts

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::{Field, ValidationError};

/// Stable recipe identifier (UUID v7, so ids sort by creation time)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(String);

impl RecipeId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::now_v7().to_string())
    }

    /// Wrap an existing identifier string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form for display: the last 8 chars
    ///
    /// A v7 id starts with its timestamp, so ids created close together share
    /// a prefix; the tail is random.
    pub fn short(&self) -> &str {
        let start = self.0.char_indices().rev().nth(7).map(|(i, _)| i).unwrap_or(0);
        &self.0[start..]
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored recipe
///
/// Field names on disk are camelCase (`preparationTime`). Entries without an
/// `id` get one on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredRecipe")]
pub struct Recipe {
    pub id: RecipeId,
    /// Image as a data URI
    pub image: Option<String>,
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    /// Minutes
    pub preparation_time: u32,
    pub favorite: bool,
}

/// On-disk shape of a recipe, where `id` may be missing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoredRecipe {
    #[serde(default)]
    pub(crate) id: Option<RecipeId>,
    image: Option<String>,
    title: String,
    ingredients: String,
    instructions: String,
    #[serde(default, deserialize_with = "lenient_minutes")]
    preparation_time: u32,
    #[serde(default)]
    favorite: bool,
}

impl From<StoredRecipe> for Recipe {
    fn from(stored: StoredRecipe) -> Self {
        Self {
            id: stored.id.unwrap_or_else(RecipeId::generate),
            image: stored.image,
            title: stored.title,
            ingredients: stored.ingredients,
            instructions: stored.instructions,
            preparation_time: stored.preparation_time,
            favorite: stored.favorite,
        }
    }
}

/// Accept any JSON number or null for minutes; null, negative and
/// fractional values are read as whole non-negative minutes
fn lenient_minutes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(|v| v.min(u32::MAX as f64) as u32)
        .unwrap_or(0))
}

impl Recipe {
    /// Build a recipe with a fresh id from a validated draft
    pub fn from_draft(draft: RecipeDraft) -> Result<Self, ValidationError> {
        Self::with_id(RecipeId::generate(), draft)
    }

    /// Build a recipe with the given id from a validated draft
    pub fn with_id(id: RecipeId, draft: RecipeDraft) -> Result<Self, ValidationError> {
        draft.validate()?;
        Ok(Self {
            id,
            image: draft.image,
            title: draft.title,
            ingredients: draft.ingredients,
            instructions: draft.instructions,
            preparation_time: draft.preparation_time,
            favorite: draft.favorite,
        })
    }

    /// Copy the editable fields back out into a draft
    pub fn to_draft(&self) -> RecipeDraft {
        RecipeDraft {
            image: self.image.clone(),
            title: self.title.clone(),
            ingredients: self.ingredients.clone(),
            instructions: self.instructions.clone(),
            preparation_time: self.preparation_time,
            favorite: self.favorite,
        }
    }

    /// Case-insensitive substring match on title or ingredients
    pub fn matches_search(&self, needle_lower: &str) -> bool {
        needle_lower.is_empty()
            || self.title.to_lowercase().contains(needle_lower)
            || self.ingredients.to_lowercase().contains(needle_lower)
    }
}

/// Form values for creating or updating a recipe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeDraft {
    pub image: Option<String>,
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub preparation_time: u32,
    pub favorite: bool,
}

impl RecipeDraft {
    /// Fields that would block a save, in form order
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| match field {
                Field::Image => self.image.as_deref().is_none_or(|i| i.trim().is_empty()),
                Field::Title => self.title.trim().is_empty(),
                Field::Ingredients => self.ingredients.trim().is_empty(),
                Field::Instructions => self.instructions.trim().is_empty(),
                Field::PreparationTime => self.preparation_time == 0,
            })
            .collect()
    }

    /// Check that the draft can be saved
    pub fn validate(&self) -> Result<(), ValidationError> {
        let missing = self.missing_fields();
        debug!(?missing, "RecipeDraft::validate: called");
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> RecipeDraft {
        RecipeDraft {
            image: Some("data:image/png;base64,AAAA".to_string()),
            title: "Omelette".to_string(),
            ingredients: "2 Eggs, butter".to_string(),
            instructions: "Whisk and fry".to_string(),
            preparation_time: 10,
            favorite: false,
        }
    }

    #[test]
    fn test_valid_draft_passes() {
        assert!(valid_draft().validate().is_ok());
    }

    #[test]
    fn test_blank_fields_are_reported() {
        let draft = RecipeDraft {
            title: "   ".to_string(),
            ..valid_draft()
        };
        let err = draft.validate().unwrap_err();
        assert_eq!(err.missing, vec![Field::Title]);

        let err = RecipeDraft::default().validate().unwrap_err();
        assert_eq!(err.missing, Field::ALL.to_vec());
    }

    #[test]
    fn test_zero_preparation_time_rejected() {
        let draft = RecipeDraft {
            preparation_time: 0,
            ..valid_draft()
        };
        assert_eq!(draft.missing_fields(), vec![Field::PreparationTime]);
    }

    #[test]
    fn test_legacy_record_without_id_gets_one() {
        let json = r#"{"image":null,"title":"Soup","ingredients":"water","instructions":"boil","preparationTime":20,"favorite":true}"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert!(!recipe.id.as_str().is_empty());
        assert_eq!(recipe.preparation_time, 20);
        assert!(recipe.favorite);
        assert_eq!(recipe.image, None);
    }

    #[test]
    fn test_null_or_fractional_minutes_tolerated() {
        let json = r#"{"title":"Tea","image":null,"ingredients":"leaves","instructions":"steep","preparationTime":null}"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.preparation_time, 0);
        assert!(!recipe.favorite);

        let json = r#"{"title":"Tea","image":null,"ingredients":"leaves","instructions":"steep","preparationTime":4.7}"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.preparation_time, 4);
    }

    #[test]
    fn test_serialized_field_names() {
        let recipe = Recipe::from_draft(valid_draft()).unwrap();
        let value = serde_json::to_value(&recipe).unwrap();
        assert_eq!(value["preparationTime"], 10);
        assert_eq!(value["favorite"], false);
        assert_eq!(value["id"], recipe.id.as_str());
    }

    #[test]
    fn test_matches_search() {
        let recipe = Recipe::from_draft(valid_draft()).unwrap();
        assert!(recipe.matches_search("egg"));
        assert!(recipe.matches_search("omel"));
        assert!(recipe.matches_search(""));
        assert!(!recipe.matches_search("fry"));
    }

    #[test]
    fn test_short_id() {
        let id = RecipeId::from_string("0192f3a4-aaaa-7bbb-8ccc-0123456789ab");
        assert_eq!(id.short(), "456789ab");
        assert_eq!(RecipeId::from_string("abc").short(), "abc");
    }
}
