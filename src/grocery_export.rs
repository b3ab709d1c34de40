use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use crate::grocery_aggregator::{GroceryItem, SectionGroup};

pub const EMPTY_LIST_MESSAGE: &str = "No recipes selected yet.";
pub const CUSTOM_ITEMS_HEADING: &str = "Add to Shopping List?";

/// Display form of a summed quantity: at most two decimals, no trailing zeros.
pub fn format_quantity(quantity: f64) -> String {
    let rounded = (quantity * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

/// `"{quantity} {unit} {name}"`, leaving the unit out when there is none.
pub fn format_line(item: &GroceryItem) -> String {
    match item.unit.as_deref() {
        Some(unit) => format!("{} {} {}", format_quantity(item.quantity), unit, item.name),
        None => format!("{} {}", format_quantity(item.quantity), item.name),
    }
}

pub fn checkbox_id(item: &GroceryItem) -> String {
    let raw = format!("chk-{}-{}", item.name, item.unit.as_deref().unwrap_or_default());
    raw.split_whitespace().collect::<Vec<_>>().join("-").to_lowercase()
}

/// Plain-text checklist of `sections` in the given order, followed by the
/// user's custom items when there are any.
///
/// A prep without recipes renders only the empty-list message, whatever
/// else is passed in.
pub fn render_checklist(
    recipe_count: usize,
    sections: &[&SectionGroup],
    custom_items: &[String],
) -> String {
    let mut out = String::new();
    if recipe_count == 0 {
        out.push_str(EMPTY_LIST_MESSAGE);
        out.push('\n');
        return out;
    }

    for group in sections {
        let _ = writeln!(out, "{}", group.label());
        for item in &group.items {
            let _ = writeln!(out, "  [ ] {}", format_line(item));
        }
        out.push('\n');
    }

    if !custom_items.is_empty() {
        let _ = writeln!(out, "{}", CUSTOM_ITEMS_HEADING);
        for item in custom_items {
            let _ = writeln!(out, "  [ ] {}", item);
        }
    }
    out
}

pub fn write_csv<W: Write>(sections: &[&SectionGroup], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["id", "section", "label", "name", "quantity", "unit"])?;
    for group in sections {
        for item in &group.items {
            csv_writer.write_record([
                checkbox_id(item).as_str(),
                group.section.as_str(),
                group.label(),
                item.name.as_str(),
                format_quantity(item.quantity).as_str(),
                item.unit.as_deref().unwrap_or_default(),
            ])?;
        }
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn export_csv(sections: &[&SectionGroup], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create CSV file at {:?}", path))?;
    write_csv(sections, file)
        .with_context(|| format!("Failed to write grocery list CSV to {:?}", path))
}
