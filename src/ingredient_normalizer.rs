use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{Course, Ingredient, Recipe, RecipeId};
use crate::sections::normalize_section_key;

/// Ingredient as it arrives from any recipe source: full recipe detail,
/// recipe summary, saved prep, or a local prep file. Every field other
/// than `name` may be absent, and `quantity` may be any JSON value.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawIngredient {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: Option<Value>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub store_section: Option<String>,
    #[serde(default, alias = "isOptional")]
    pub optional: Option<bool>,
    #[serde(default)]
    pub preparation: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawRecipe {
    pub id: RecipeId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub course: Option<String>,
    #[serde(default)]
    pub ingredients: Option<Vec<RawIngredient>>,
}

/// Reads a quantity out of a loosely typed JSON value.
///
/// Decimal columns come back from the backend as strings, so numeric
/// strings are accepted. Everything else yields `None`.
pub fn parse_quantity(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|q| q.is_finite()),
        _ => None,
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

pub fn normalize_ingredient(raw: &RawIngredient) -> Ingredient {
    Ingredient {
        name: raw.name.trim().to_string(),
        quantity: raw.quantity.as_ref().and_then(parse_quantity),
        unit: non_blank(raw.unit.as_deref()).map(str::to_lowercase),
        store_section: normalize_section_key(raw.store_section.as_deref()),
        optional: raw.optional.unwrap_or(false),
        preparation: non_blank(raw.preparation.as_deref()).map(str::to_string),
    }
}

pub fn normalize_recipe(raw: &RawRecipe) -> Recipe {
    Recipe {
        id: raw.id,
        title: raw.title.trim().to_string(),
        servings: raw.servings,
        course: raw
            .course
            .as_deref()
            .map(Course::from_key)
            .unwrap_or(Course::Other),
        ingredients: raw
            .ingredients
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(normalize_ingredient)
            .collect(),
    }
}
