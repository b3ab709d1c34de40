//! Unit vocabularies offered during ingredient entry.
//!
//! The preference only changes which list is offered. Aggregation compares
//! units as opaque strings whichever system they come from.

const COUNT_UNITS: &[&str] = &[
    "count", "clove", "slice", "can", "package", "pinch", "dash", "bunch", "head", "stalk",
    "sprig", "to taste",
];

const IMPERIAL_MEASURES: &[&str] = &[
    "tsp", "tbsp", "cup", "oz", "fl oz", "lb", "pint", "quart", "gallon",
];

const METRIC_MEASURES: &[&str] = &["ml", "l", "g", "kg"];

pub fn allowed_units(prefer_metric: bool) -> Vec<&'static str> {
    let measures = if prefer_metric {
        METRIC_MEASURES
    } else {
        IMPERIAL_MEASURES
    };
    measures.iter().chain(COUNT_UNITS).copied().collect()
}

pub fn is_allowed_unit(unit: &str, prefer_metric: bool) -> bool {
    let unit = unit.trim().to_lowercase();
    allowed_units(prefer_metric).contains(&unit.as_str())
}
