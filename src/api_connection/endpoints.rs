use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ingredient_normalizer::{RawIngredient, RawRecipe};
use crate::models::RecipeId;

pub const RECIPES_PATH: &str = "/recipes";
pub const CURRENT_PREP_PATH: &str = "/current-prep";
pub const PAST_PREPS_PATH: &str = "/past-preps";
pub const GROCERY_LIST_PATH: &str = "/grocery-list";
pub const SECTION_ORDER_PATH: &str = "/users/section-order";

/// Most backend responses wrap their payload in `{ "data": ... }`.
#[derive(Debug, Deserialize, Clone)]
pub struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PrepRecipes {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub recipes: Vec<RawRecipe>,
}

/// The current prep is saved with ids as strings.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SaveCurrentPrepRequest {
    pub recipe_ids: Vec<String>,
}

impl SaveCurrentPrepRequest {
    pub fn new(recipe_ids: &[RecipeId]) -> Self {
        Self {
            recipe_ids: recipe_ids.iter().map(|id| id.to_string()).collect(),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SavePastPrepRequest {
    pub name: String,
    pub recipe_ids: Vec<RecipeId>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroceryListRequest {
    pub recipe_ids: Vec<RecipeId>,
    pub prefer_metric: bool,
}

/// Server-side grouping: section key to the ingredients filed under it.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroceryListResponse {
    #[serde(default)]
    pub grocery_list: BTreeMap<String, Vec<RawIngredient>>,
}

impl GroceryListResponse {
    pub fn groups(&self) -> impl Iterator<Item = (&str, &[RawIngredient])> {
        self.grocery_list
            .iter()
            .map(|(section, items)| (section.as_str(), items.as_slice()))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct SectionOrderPayload {
    #[serde(default)]
    pub order: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BackendErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
