use serde::{Deserialize, Serialize};
use std::fmt;

pub type RecipeId = i64;
pub type UserId = i64;

/// Course a recipe is filed under on the backend.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Course {
    Breakfast,
    Lunch,
    Dinner,
    SnackSide,
    Other,
}

impl Course {
    /// Parses a backend course key. Unknown or empty keys map to `Course::Other`.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_uppercase().as_str() {
            "BREAKFAST" => Course::Breakfast,
            "LUNCH" => Course::Lunch,
            "DINNER" => Course::Dinner,
            "SNACK_SIDE" => Course::SnackSide,
            _ => Course::Other,
        }
    }

    pub fn as_key(&self) -> &'static str {
        match self {
            Course::Breakfast => "BREAKFAST",
            Course::Lunch => "LUNCH",
            Course::Dinner => "DINNER",
            Course::SnackSide => "SNACK_SIDE",
            Course::Other => "OTHER",
        }
    }

    /// Only lunch recipes fill lunch slots; everything else is picked as a dinner.
    pub fn role(&self) -> MealRole {
        match self {
            Course::Lunch => MealRole::Lunch,
            _ => MealRole::Dinner,
        }
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MealRole {
    Dinner,
    Lunch,
}

/// Canonical ingredient, produced by the normalizer.
///
/// `quantity` stays optional here: the aggregator is the one place that
/// decides what to do with a missing or non-finite amount.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub name: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub store_section: String,
    pub optional: bool,
    pub preparation: Option<String>,
}

/// Canonical recipe as seen by the grocery list engine. Immutable input.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    pub servings: Option<u32>,
    pub course: Course,
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    pub fn role(&self) -> MealRole {
        self.course.role()
    }

    pub fn servings_or_zero(&self) -> u32 {
        self.servings.unwrap_or(0)
    }
}
