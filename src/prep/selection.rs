use serde::{Deserialize, Serialize};

use crate::ingredient_normalizer::{normalize_recipe, RawRecipe};
use crate::models::{MealRole, Recipe, RecipeId};

/// Household and week configuration chosen when a prep is started.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PrepConfig {
    pub number_of_people: u32,
    pub number_of_dinners: u32,
    pub number_of_lunches: u32,
    pub use_leftovers: bool,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            number_of_people: 1,
            number_of_dinners: 0,
            number_of_lunches: 0,
            use_leftovers: false,
        }
    }
}

impl PrepConfig {
    /// Household size used for serving math; an unset (zero) count means one person.
    pub fn people(&self) -> u32 {
        self.number_of_people.max(1)
    }
}

/// The recipes picked for a week plus the configuration they are measured
/// against.
///
/// Recipes live in one list; the dinner and lunch views are derived from
/// each recipe's course. Every operation returns a new selection.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PrepSelection {
    #[serde(default)]
    pub config: PrepConfig,
    #[serde(default)]
    pub selected_recipes: Vec<Recipe>,
}

impl PrepSelection {
    pub fn new(config: PrepConfig) -> Self {
        Self {
            config,
            selected_recipes: Vec::new(),
        }
    }

    pub fn from_raw(config: PrepConfig, raw_recipes: &[RawRecipe]) -> Self {
        raw_recipes
            .iter()
            .map(normalize_recipe)
            .fold(Self::new(config), Self::with_recipe)
    }

    pub fn contains(&self, id: RecipeId) -> bool {
        self.selected_recipes.iter().any(|r| r.id == id)
    }

    /// Adds a recipe. Adding one that is already selected changes nothing.
    pub fn with_recipe(mut self, recipe: Recipe) -> Self {
        if !self.contains(recipe.id) {
            self.selected_recipes.push(recipe);
        }
        self
    }

    pub fn without_recipe(mut self, id: RecipeId) -> Self {
        self.selected_recipes.retain(|r| r.id != id);
        self
    }

    pub fn with_config(self, config: PrepConfig) -> Self {
        Self { config, ..self }
    }

    pub fn cleared(self) -> Self {
        Self::default()
    }

    pub fn dinners(&self) -> impl Iterator<Item = &Recipe> {
        self.selected_recipes
            .iter()
            .filter(|r| r.role() == MealRole::Dinner)
    }

    pub fn lunches(&self) -> impl Iterator<Item = &Recipe> {
        self.selected_recipes
            .iter()
            .filter(|r| r.role() == MealRole::Lunch)
    }

    pub fn recipe_ids(&self) -> Vec<RecipeId> {
        self.selected_recipes.iter().map(|r| r.id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.selected_recipes.is_empty()
    }
}

/// On-disk form of a prep started locally: configuration plus recipes in
/// any of the backend's recipe shapes.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PrepFile {
    #[serde(default)]
    pub config: PrepConfig,
    #[serde(default)]
    pub recipes: Vec<RawRecipe>,
}

impl PrepFile {
    pub fn into_selection(self) -> PrepSelection {
        PrepSelection::from_raw(self.config, &self.recipes)
    }
}
