use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Free-text items the user adds to the current prep's shopping list,
/// on top of what the recipes call for.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct CustomItemList {
    #[serde(default)]
    items: Vec<String>,
    #[serde(skip)]
    storage_file: Option<PathBuf>,
}

impl CustomItemList {
    /// Opens the list stored at `path`; a missing or empty file is an empty list.
    pub fn open(path: &Path) -> Result<Self> {
        let mut list = if path.exists() && path.metadata()?.len() > 0 {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read custom items from {:?}", path))?;
            serde_json::from_str::<CustomItemList>(&contents)
                .with_context(|| format!("Custom items file {:?} is not valid JSON", path))?
        } else {
            CustomItemList::default()
        };
        list.storage_file = Some(path.to_path_buf());
        Ok(list)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds a trimmed item. Blank input is ignored and reported as `false`.
    pub fn add(&mut self, item: &str) -> bool {
        let item = item.trim();
        if item.is_empty() {
            return false;
        }
        self.items.push(item.to_string());
        true
    }

    /// Removes every entry equal to `item`, returning how many were removed.
    pub fn remove(&mut self, item: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|existing| existing != item);
        before - self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn save(&self) -> Result<()> {
        let Some(path) = &self.storage_file else {
            anyhow::bail!("Custom item list has no storage file");
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory {:?}", parent))?;
        }
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write custom items to {:?}", path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_add_trims_and_ignores_blank() {
        let mut list = CustomItemList::default();
        assert!(list.add("  paper towels "));
        assert!(!list.add("   "));
        assert_eq!(list.items(), &["paper towels".to_string()]);
    }

    #[test]
    fn test_remove_drops_every_match() {
        let mut list = CustomItemList::default();
        list.add("coffee");
        list.add("foil");
        list.add("coffee");
        assert_eq!(list.remove("coffee"), 2);
        assert_eq!(list.items(), &["foil".to_string()]);
        assert_eq!(list.remove("coffee"), 0);
    }

    #[test]
    fn test_save_and_reopen() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("data").join("custom_items.json");

        let mut list = CustomItemList::open(&path)?;
        assert!(list.is_empty());
        list.add("dish soap");
        list.save()?;

        let reopened = CustomItemList::open(&path)?;
        assert_eq!(reopened.items(), &["dish soap".to_string()]);
        Ok(())
    }

    #[test]
    fn test_save_without_storage_file_fails() {
        let list = CustomItemList::default();
        assert!(list.save().is_err());
    }

    #[test]
    fn test_corrupt_file_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("custom_items.json");
        fs::write(&path, "[not json")?;
        let result = CustomItemList::open(&path);
        assert!(result.unwrap_err().to_string().contains("not valid JSON"));
        Ok(())
    }
}
