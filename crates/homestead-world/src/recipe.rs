//! Recipe definitions and the pure ingredient matcher.
//!
//! A recipe names its result and the exact quantities it consumes. Matching
//! is "contains at least": surplus ingredient types in the candidate set are
//! irrelevant. When several recipes could match the same set, resolution is
//! first-match-wins over the declared priority order -- never enumeration
//! order of a map.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use homestead_types::Resource;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when constructing a recipe.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecipeError {
    /// A recipe must consume at least one ingredient.
    #[error("recipe '{name}' has no ingredients")]
    NoIngredients {
        /// The offending recipe name.
        name: String,
    },

    /// Every required amount must be strictly positive.
    #[error("recipe '{name}' requires zero of {resource:?}")]
    ZeroIngredientAmount {
        /// The offending recipe name.
        name: String,
        /// The ingredient with a zero amount.
        resource: Resource,
    },

    /// Each ingredient type may appear only once.
    #[error("recipe '{name}' lists {resource:?} more than once")]
    DuplicateIngredient {
        /// The offending recipe name.
        name: String,
        /// The repeated ingredient.
        resource: Resource,
    },

    /// A recipe may not consume its own result.
    #[error("recipe '{name}' uses its result {resource:?} as an ingredient")]
    ResultAsIngredient {
        /// The offending recipe name.
        name: String,
        /// The result resource.
        resource: Resource,
    },
}

// ---------------------------------------------------------------------------
// Recipe
// ---------------------------------------------------------------------------

/// A named conversion from required ingredient quantities to one result.
///
/// Immutable once constructed; [`Recipe::new`] validates the ingredient
/// list so no invalid recipe can exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipe {
    /// Display name ("Bread", "Apple Cake").
    name: String,
    /// The resource one successful craft yields, one unit at a time.
    result: Resource,
    /// Required ingredients in declaration order.
    ingredients: Vec<(Resource, u32)>,
}

impl Recipe {
    /// Build a validated recipe.
    ///
    /// # Errors
    ///
    /// Returns a [`RecipeError`] if the ingredient list is empty, contains a
    /// zero amount, repeats a type, or includes the result itself.
    pub fn new(
        name: impl Into<String>,
        result: Resource,
        ingredients: Vec<(Resource, u32)>,
    ) -> Result<Self, RecipeError> {
        let name = name.into();

        if ingredients.is_empty() {
            return Err(RecipeError::NoIngredients { name });
        }

        let mut seen = BTreeSet::new();
        for (resource, amount) in &ingredients {
            if *amount == 0 {
                return Err(RecipeError::ZeroIngredientAmount {
                    name,
                    resource: *resource,
                });
            }
            if *resource == result {
                return Err(RecipeError::ResultAsIngredient { name, resource: result });
            }
            if !seen.insert(*resource) {
                return Err(RecipeError::DuplicateIngredient {
                    name,
                    resource: *resource,
                });
            }
        }

        Ok(Self {
            name,
            result,
            ingredients,
        })
    }

    /// The recipe's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resource this recipe yields.
    pub const fn result(&self) -> Resource {
        self.result
    }

    /// The required ingredients, in declaration order.
    pub fn ingredients(&self) -> &[(Resource, u32)] {
        &self.ingredients
    }

    /// Whether `available` covers every required quantity.
    ///
    /// Pure: surplus types and surplus quantities are ignored.
    pub fn is_satisfied_by(&self, available: &BTreeMap<Resource, u32>) -> bool {
        self.ingredients
            .iter()
            .all(|(resource, needed)| available.get(resource).copied().unwrap_or(0) >= *needed)
    }
}

/// Select the first recipe in `recipes` satisfied by `available`.
///
/// This is the deterministic tie-break for stations whose ingredient set
/// could satisfy several recipes: the list order IS the priority order.
pub fn first_match<'a>(
    recipes: &'a [Recipe],
    available: &BTreeMap<Resource, u32>,
) -> Option<&'a Recipe> {
    recipes.iter().find(|recipe| recipe.is_satisfied_by(available))
}
