use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

use crate::ingredient_normalizer::{normalize_ingredient, RawIngredient};
use crate::models::{Ingredient, Recipe, RecipeId};
use crate::sections::format_section_name;

/// Identity of a shopping-list line inside one section.
///
/// Name and unit are trimmed and lowercased; a missing unit and an empty
/// unit are the same key. Units are never converted into each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MergeKey {
    name: String,
    unit: String,
}

impl MergeKey {
    pub fn new(name: &str, unit: Option<&str>) -> Self {
        Self {
            name: name.trim().to_lowercase(),
            unit: unit.map(|u| u.trim().to_lowercase()).unwrap_or_default(),
        }
    }

    pub fn for_ingredient(ingredient: &Ingredient) -> Self {
        Self::new(&ingredient.name, ingredient.unit.as_deref())
    }
}

impl fmt::Display for MergeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.unit)
    }
}

/// One merged line of the grocery list.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroceryItem {
    pub name: String,
    pub quantity: f64,
    pub unit: Option<String>,
    pub store_section: String,
}

impl GroceryItem {
    pub fn merge_key(&self) -> MergeKey {
        MergeKey::new(&self.name, self.unit.as_deref())
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SectionGroup {
    pub section: String,
    pub items: Vec<GroceryItem>,
}

impl SectionGroup {
    pub fn label(&self) -> &str {
        format_section_name(&self.section)
    }

    pub fn get(&self, name: &str, unit: Option<&str>) -> Option<&GroceryItem> {
        let key = MergeKey::new(name, unit);
        self.items.iter().find(|item| item.merge_key() == key)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingQuantity,
    NonFiniteQuantity,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingQuantity => f.write_str("missing or non-numeric quantity"),
            SkipReason::NonFiniteQuantity => {
                f.write_str("quantity is not finite or overflows the line total")
            }
        }
    }
}

/// An ingredient left off the list, kept so callers can surface it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SkippedIngredient {
    pub recipe_id: Option<RecipeId>,
    pub recipe_title: Option<String>,
    pub ingredient_name: String,
    pub reason: SkipReason,
}

/// Section-grouped, deduplicated shopping list.
///
/// Sections and items keep the order in which they were first seen.
#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct GroceryList {
    sections: Vec<SectionGroup>,
    skipped: Vec<SkippedIngredient>,
}

impl GroceryList {
    pub fn sections(&self) -> &[SectionGroup] {
        &self.sections
    }

    pub fn section(&self, key: &str) -> Option<&SectionGroup> {
        self.sections.iter().find(|group| group.section == key)
    }

    pub fn section_keys(&self) -> Vec<String> {
        self.sections.iter().map(|group| group.section.clone()).collect()
    }

    pub fn skipped(&self) -> &[SkippedIngredient] {
        &self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|group| group.items.len()).sum()
    }
}

/// A recipe entering aggregation together with the factor its quantities
/// are multiplied by.
#[derive(Debug, Clone, Copy)]
pub struct ScaledRecipe<'a> {
    pub recipe: &'a Recipe,
    pub multiplier: f64,
}

#[derive(Default)]
struct GroceryListBuilder {
    list: GroceryList,
    section_index: HashMap<String, usize>,
    item_index: HashMap<(usize, MergeKey), usize>,
}

impl GroceryListBuilder {
    fn add(&mut self, origin: Option<&Recipe>, ingredient: &Ingredient, multiplier: f64) {
        let quantity = match ingredient.quantity {
            None => return self.skip(origin, ingredient, SkipReason::MissingQuantity),
            Some(q) if !(q * multiplier).is_finite() => {
                return self.skip(origin, ingredient, SkipReason::NonFiniteQuantity)
            }
            Some(q) => q * multiplier,
        };

        let section_idx = match self.section_index.get(&ingredient.store_section) {
            Some(&idx) => idx,
            None => {
                self.list.sections.push(SectionGroup {
                    section: ingredient.store_section.clone(),
                    items: Vec::new(),
                });
                let idx = self.list.sections.len() - 1;
                self.section_index.insert(ingredient.store_section.clone(), idx);
                idx
            }
        };

        let key = (section_idx, MergeKey::for_ingredient(ingredient));
        if let Some(&item_idx) = self.item_index.get(&key) {
            let item = &mut self.list.sections[section_idx].items[item_idx];
            let total = item.quantity + quantity;
            if !total.is_finite() {
                // The running total keeps its last finite value.
                return self.skip(origin, ingredient, SkipReason::NonFiniteQuantity);
            }
            item.quantity = total;
            return;
        }

        let items = &mut self.list.sections[section_idx].items;
        items.push(GroceryItem {
            name: ingredient.name.clone(),
            quantity,
            unit: ingredient.unit.clone(),
            store_section: ingredient.store_section.clone(),
        });
        self.item_index.insert(key, items.len() - 1);
    }

    fn skip(&mut self, origin: Option<&Recipe>, ingredient: &Ingredient, reason: SkipReason) {
        warn!(
            recipe_id = origin.map(|r| r.id),
            ingredient = %ingredient.name,
            %reason,
            "Skipping ingredient in grocery list"
        );
        self.list.skipped.push(SkippedIngredient {
            recipe_id: origin.map(|r| r.id),
            recipe_title: origin.map(|r| r.title.clone()),
            ingredient_name: ingredient.name.clone(),
            reason,
        });
    }

    fn finish(self) -> GroceryList {
        debug!(
            sections = self.list.sections.len(),
            items = self.list.item_count(),
            skipped = self.list.skipped.len(),
            "Grocery list aggregated"
        );
        self.list
    }
}

/// Merges the ingredients of `recipes` into a section-grouped list, every
/// recipe counted once.
pub fn aggregate(recipes: &[Recipe]) -> GroceryList {
    aggregate_scaled(recipes.iter().map(|recipe| ScaledRecipe {
        recipe,
        multiplier: 1.0,
    }))
}

pub fn aggregate_scaled<'a>(recipes: impl IntoIterator<Item = ScaledRecipe<'a>>) -> GroceryList {
    let mut builder = GroceryListBuilder::default();
    for scaled in recipes {
        for ingredient in &scaled.recipe.ingredients {
            builder.add(Some(scaled.recipe), ingredient, scaled.multiplier);
        }
    }
    builder.finish()
}

/// Re-aggregates a list that was grouped by the backend so that it goes
/// through the same merge rules as a locally built list. The group key
/// stands in for a missing `storeSection` on its entries.
pub fn aggregate_server_list<'a>(
    groups: impl IntoIterator<Item = (&'a str, &'a [RawIngredient])>,
) -> GroceryList {
    let mut builder = GroceryListBuilder::default();
    for (section, raw_ingredients) in groups {
        for raw in raw_ingredients {
            let mut raw = raw.clone();
            if raw.store_section.as_deref().map_or(true, |s| s.trim().is_empty()) {
                raw.store_section = Some(section.to_string());
            }
            builder.add(None, &normalize_ingredient(&raw), 1.0);
        }
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Course;
    use serde_json::json;

    fn ingredient(
        name: &str,
        quantity: Option<f64>,
        unit: Option<&str>,
        section: &str,
    ) -> Ingredient {
        Ingredient {
            name: name.to_string(),
            quantity,
            unit: unit.map(str::to_string),
            store_section: section.to_string(),
            optional: false,
            preparation: None,
        }
    }

    fn recipe(id: RecipeId, ingredients: Vec<Ingredient>) -> Recipe {
        Recipe {
            id,
            title: format!("Recipe {id}"),
            servings: Some(4),
            course: Course::Dinner,
            ingredients,
        }
    }

    #[test]
    fn test_same_name_and_unit_merge_different_units_stay_apart() {
        let recipes = vec![
            recipe(1, vec![ingredient("egg", Some(2.0), Some("count"), "DAIRY")]),
            recipe(
                2,
                vec![
                    ingredient("egg", Some(3.0), Some("count"), "DAIRY"),
                    ingredient("egg", Some(1.0), Some("cup"), "DAIRY"),
                ],
            ),
        ];

        let list = aggregate(&recipes);
        let dairy = list.section("DAIRY").unwrap();

        assert_eq!(dairy.items.len(), 2);
        assert_eq!(dairy.get("egg", Some("count")).unwrap().quantity, 5.0);
        assert_eq!(dairy.get("egg", Some("cup")).unwrap().quantity, 1.0);
        assert!(list.skipped().is_empty());
    }

    #[test]
    fn test_invalid_quantities_are_skipped_and_reported() {
        let recipes = vec![recipe(
            7,
            vec![
                ingredient("flour", Some(2.0), Some("cup"), "DRY_GOOD"),
                ingredient("flour", None, Some("cup"), "DRY_GOOD"),
                ingredient("flour", Some(f64::NAN), Some("cup"), "DRY_GOOD"),
                ingredient("sugar", Some(f64::INFINITY), Some("cup"), "DRY_GOOD"),
            ],
        )];

        let list = aggregate(&recipes);
        let dry = list.section("DRY_GOOD").unwrap();

        assert_eq!(dry.items.len(), 1);
        assert_eq!(dry.get("flour", Some("cup")).unwrap().quantity, 2.0);
        assert_eq!(list.skipped().len(), 3);
        assert_eq!(list.skipped()[0].reason, SkipReason::MissingQuantity);
        assert_eq!(list.skipped()[1].reason, SkipReason::NonFiniteQuantity);
        assert_eq!(list.skipped()[2].ingredient_name, "sugar");
        assert_eq!(list.skipped()[2].recipe_id, Some(7));
    }

    #[test]
    fn test_overflowing_total_is_skipped_and_keeps_last_finite_sum() {
        let recipes = vec![
            recipe(1, vec![ingredient("salt", Some(f64::MAX), Some("g"), "SPICES")]),
            recipe(2, vec![ingredient("salt", Some(f64::MAX), Some("g"), "SPICES")]),
        ];

        let list = aggregate(&recipes);
        let salt = list.section("SPICES").unwrap().get("salt", Some("g")).unwrap();
        assert_eq!(salt.quantity, f64::MAX);
        assert_eq!(list.skipped().len(), 1);
        assert_eq!(list.skipped()[0].recipe_id, Some(2));
        assert_eq!(list.skipped()[0].reason, SkipReason::NonFiniteQuantity);
    }

    #[test]
    fn test_section_with_only_invalid_entries_is_not_created() {
        let recipes = vec![recipe(1, vec![ingredient("mystery", None, None, "DELI")])];
        let list = aggregate(&recipes);
        assert!(list.is_empty());
        assert!(list.section("DELI").is_none());
    }

    #[test]
    fn test_merge_is_case_and_whitespace_insensitive_first_spelling_wins() {
        let recipes = vec![recipe(
            1,
            vec![
                ingredient("Egg", Some(1.0), Some("count"), "DAIRY"),
                ingredient(" egg ", Some(2.0), Some("COUNT"), "DAIRY"),
            ],
        )];
        let list = aggregate(&recipes);
        let dairy = list.section("DAIRY").unwrap();
        assert_eq!(dairy.items.len(), 1);
        assert_eq!(dairy.items[0].name, "Egg");
        assert_eq!(dairy.items[0].quantity, 3.0);
    }

    #[test]
    fn test_missing_and_empty_unit_share_a_key() {
        assert_eq!(MergeKey::new("salt", None), MergeKey::new("salt", Some("")));
        assert_eq!(MergeKey::new("salt", Some("tsp")).to_string(), "salt-tsp");
        assert_eq!(MergeKey::new("Salt", None).to_string(), "salt-");
    }

    #[test]
    fn test_same_ingredient_in_different_sections_is_not_merged() {
        let recipes = vec![recipe(
            1,
            vec![
                ingredient("parmesan", Some(1.0), Some("cup"), "CHEESE"),
                ingredient("parmesan", Some(1.0), Some("cup"), "DAIRY"),
            ],
        )];
        let list = aggregate(&recipes);
        assert_eq!(list.section_keys(), vec!["CHEESE", "DAIRY"]);
        assert_eq!(list.item_count(), 2);
    }

    #[test]
    fn test_sections_keep_first_appearance_order() {
        let recipes = vec![
            recipe(1, vec![ingredient("milk", Some(1.0), Some("cup"), "DAIRY")]),
            recipe(
                2,
                vec![
                    ingredient("onion", Some(1.0), Some("count"), "PRODUCE"),
                    ingredient("butter", Some(2.0), Some("tbsp"), "DAIRY"),
                    ingredient("rice", Some(1.0), Some("cup"), "DRY_GOOD"),
                ],
            ),
        ];
        let list = aggregate(&recipes);
        assert_eq!(list.section_keys(), vec!["DAIRY", "PRODUCE", "DRY_GOOD"]);
        let dairy_names: Vec<_> = list
            .section("DAIRY")
            .unwrap()
            .items
            .iter()
            .map(|i| i.name.as_str())
            .collect();
        assert_eq!(dairy_names, vec!["milk", "butter"]);
    }

    #[test]
    fn test_aggregate_scaled_multiplies_before_summing() {
        let a = recipe(1, vec![ingredient("rice", Some(1.0), Some("cup"), "DRY_GOOD")]);
        let b = recipe(2, vec![ingredient("rice", Some(0.5), Some("cup"), "DRY_GOOD")]);
        let list = aggregate_scaled([
            ScaledRecipe { recipe: &a, multiplier: 2.0 },
            ScaledRecipe { recipe: &b, multiplier: 1.0 },
        ]);
        assert_eq!(list.section("DRY_GOOD").unwrap().items[0].quantity, 2.5);
    }

    #[test]
    fn test_aggregate_does_not_mutate_input_and_is_repeatable() {
        let recipes = vec![recipe(1, vec![ingredient("egg", Some(2.0), Some("count"), "DAIRY")])];
        let snapshot = recipes.clone();
        let first = aggregate(&recipes);
        let second = aggregate(&recipes);
        assert_eq!(first, second);
        assert_eq!(recipes, snapshot);
    }

    #[test]
    fn test_server_list_is_reaggregated_with_group_key_as_fallback_section() {
        let dairy: Vec<RawIngredient> = serde_json::from_value(json!([
            { "name": "Milk", "quantity": 1, "unit": "Cup" },
            { "name": "milk", "quantity": "2", "unit": "cup", "storeSection": "DAIRY" },
            { "name": "cream", "quantity": null, "unit": "cup" }
        ]))
        .unwrap();
        let produce: Vec<RawIngredient> = serde_json::from_value(json!([
            { "name": "lime", "quantity": 2, "unit": "count", "storeSection": "PRODUCE" }
        ]))
        .unwrap();

        let list =
            aggregate_server_list([("DAIRY", dairy.as_slice()), ("PRODUCE", produce.as_slice())]);

        assert_eq!(list.section_keys(), vec!["DAIRY", "PRODUCE"]);
        assert_eq!(list.section("DAIRY").unwrap().get("milk", Some("cup")).unwrap().quantity, 3.0);
        assert_eq!(list.skipped().len(), 1);
        assert_eq!(list.skipped()[0].recipe_id, None);
    }
}
