pub mod selection;
pub mod servings;

pub use selection::{PrepConfig, PrepFile, PrepSelection};
pub use servings::{calculate_progress, grocery_recipes, leftover_servings, PrepProgress};
