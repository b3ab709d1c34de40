//! Store section keys and their display labels.

pub const OTHER_SECTION: &str = "OTHER";

const SECTION_LABELS: &[(&str, &str)] = &[
    ("DAIRY", "Dairy Aisle"),
    ("BEVERAGE", "Beverages"),
    ("DELI", "Deli Aisle"),
    ("BREAKFAST", "Breakfast"),
    ("MEAT_SEAFOOD", "Meat & Seafood Aisle"),
    ("BREAD", "Bread or Bakery Aisle"),
    ("CHEESE", "Cheese Aisle"),
    ("CANNED", "Canned Goods"),
    ("DRY_GOOD", "Dry Goods"),
    ("SNACK", "Snack Aisle"),
    ("PRODUCE", "Produce Section"),
    ("FROZEN", "Frozen Foods"),
    ("INTERNATIONAL", "International Foods"),
    ("SPICES", "Spice Aisle"),
    (OTHER_SECTION, "Other"),
];

/// All section keys the backend knows about, in label-table order.
pub fn known_sections() -> impl Iterator<Item = &'static str> {
    SECTION_LABELS.iter().map(|(key, _)| *key)
}

/// Human-readable heading for a section key. Unknown keys are shown as-is.
pub fn format_section_name(key: &str) -> &str {
    SECTION_LABELS
        .iter()
        .find(|(known, _)| *known == key)
        .map(|(_, label)| *label)
        .unwrap_or(key)
}

/// Canonical form of a section key: trimmed, uppercased, inner whitespace
/// collapsed to `_`. Missing or blank keys land in `OTHER`.
pub fn normalize_section_key(raw: Option<&str>) -> String {
    let trimmed = raw.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return OTHER_SECTION.to_string();
    }
    trimmed
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_uppercase()
}
