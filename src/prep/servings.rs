use serde::Serialize;

use crate::grocery_aggregator::ScaledRecipe;
use super::selection::PrepSelection;

/// Serving counts for a prep: what the week needs, what the selected
/// recipes already cover, and what is still missing.
///
/// All values are in servings (one serving feeds one person for one meal).
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PrepProgress {
    pub dinner_servings_needed: u32,
    pub dinner_servings_selected: u32,
    pub lunch_servings_needed: u32,
    pub lunch_servings_from_recipes: u32,
    pub leftover_lunch_servings: u32,
    pub dinners_remaining: u32,
    pub lunches_remaining: u32,
}

impl PrepProgress {
    pub fn lunch_servings_counted(&self) -> u32 {
        self.lunch_servings_from_recipes
            .saturating_add(self.leftover_lunch_servings)
    }

    /// True once neither track needs more servings; gates moving on to
    /// the week summary.
    pub fn is_complete(&self) -> bool {
        self.dinners_remaining == 0 && self.lunches_remaining == 0
    }
}

/// Servings a dinner recipe has left over after feeding the household once.
pub fn leftover_servings(recipe_servings: Option<u32>, people: u32) -> u32 {
    recipe_servings.unwrap_or(0).saturating_sub(people)
}

/// Calculates the serving progress of a prep selection.
///
/// # Arguments
/// * `selection`: the selected recipes and the household configuration.
///
/// # Returns
/// A `PrepProgress` where each dinner recipe covers exactly `people`
/// servings (it is eaten in full in one sitting), lunch recipes cover their
/// own `servings`, and, with leftovers enabled, each dinner's surplus
/// beyond `people` counts towards lunches.
pub fn calculate_progress(selection: &PrepSelection) -> PrepProgress {
    let config = &selection.config;
    let people = config.people();

    // Counts saturate at u32::MAX instead of overflowing.
    let dinner_servings_needed = people.saturating_mul(config.number_of_dinners);
    let lunch_servings_needed = people.saturating_mul(config.number_of_lunches);

    let dinner_count = u32::try_from(selection.dinners().count()).unwrap_or(u32::MAX);
    let dinner_servings_selected = dinner_count.saturating_mul(people);

    let leftover_lunch_servings = if config.use_leftovers {
        selection
            .dinners()
            .map(|recipe| leftover_servings(recipe.servings, people))
            .fold(0u32, u32::saturating_add)
    } else {
        0
    };

    let lunch_servings_from_recipes = selection
        .lunches()
        .map(|r| r.servings_or_zero())
        .fold(0u32, u32::saturating_add);

    PrepProgress {
        dinner_servings_needed,
        dinner_servings_selected,
        lunch_servings_needed,
        lunch_servings_from_recipes,
        leftover_lunch_servings,
        dinners_remaining: dinner_servings_needed.saturating_sub(dinner_servings_selected),
        lunches_remaining: lunch_servings_needed
            .saturating_sub(lunch_servings_from_recipes.saturating_add(leftover_lunch_servings)),
    }
}

/// Recipes whose ingredients go on the shopping list, with their multiplier.
///
/// Every selected recipe is cooked whole, so each one is bought once; its
/// surplus servings show up as leftovers rather than as smaller amounts.
pub fn grocery_recipes(selection: &PrepSelection) -> Vec<ScaledRecipe<'_>> {
    selection
        .selected_recipes
        .iter()
        .map(|recipe| ScaledRecipe {
            recipe,
            multiplier: 1.0,
        })
        .collect()
}
