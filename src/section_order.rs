//! User-specific display order of store sections.
//!
//! Ordering is applied at render time and never changes what the
//! aggregator produced. Saving is best effort: the local order takes effect
//! immediately and a failed write only downgrades the sync status.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

use crate::api_connection::{ApiConnectionError, BackendClient};
use crate::grocery_aggregator::{GroceryList, SectionGroup};
use crate::models::UserId;
use crate::sections::normalize_section_key;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Remote store error: {0}")]
    Remote(#[from] ApiConnectionError),
}

/// Persistence for saved section orders.
#[allow(async_fn_in_trait)]
pub trait SectionOrderStore {
    async fn load(&self, user_id: UserId) -> Result<Option<Vec<String>>, StoreError>;
    async fn save(&self, user_id: UserId, order: &[String]) -> Result<(), StoreError>;
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct SectionOrderFile {
    #[serde(default)]
    orders: BTreeMap<UserId, Vec<String>>,
}

/// Keeps every user's order in one JSON file.
#[derive(Debug, Clone)]
pub struct FileSectionOrderStore {
    path: PathBuf,
}

impl FileSectionOrderStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(&self) -> Result<SectionOrderFile, StoreError> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(SectionOrderFile::default());
        }
        let contents = fs::read_to_string(&self.path).await.map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        if contents.trim().is_empty() {
            return Ok(SectionOrderFile::default());
        }
        Ok(serde_json::from_str(&contents)?)
    }
}

impl SectionOrderStore for FileSectionOrderStore {
    async fn load(&self, user_id: UserId) -> Result<Option<Vec<String>>, StoreError> {
        Ok(self.read_file().await?.orders.remove(&user_id))
    }

    async fn save(&self, user_id: UserId, order: &[String]) -> Result<(), StoreError> {
        let mut file = self.read_file().await?;
        file.orders.insert(user_id, order.to_vec());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let serialized = serde_json::to_string_pretty(&file)?;
        fs::write(&self.path, serialized).await.map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Reads and writes `/users/section-order`. The backend identifies the user
/// from the bearer token, so `user_id` is only used for logging.
#[derive(Debug, Clone)]
pub struct RemoteSectionOrderStore {
    client: BackendClient,
}

impl RemoteSectionOrderStore {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

impl SectionOrderStore for RemoteSectionOrderStore {
    async fn load(&self, user_id: UserId) -> Result<Option<Vec<String>>, StoreError> {
        debug!(user_id, "Fetching saved section order");
        Ok(self.client.fetch_section_order().await?)
    }

    async fn save(&self, user_id: UserId, order: &[String]) -> Result<(), StoreError> {
        debug!(user_id, sections = order.len(), "Saving section order");
        Ok(self.client.save_section_order(order).await?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    Synced,
    LocalOnly { reason: String },
}

/// Merges a saved order with the sections actually on the list.
///
/// Saved keys that are present come first, in saved order; present keys the
/// saved order does not mention follow in their natural order. Saved keys
/// with nothing on the list are left out. No present key is ever dropped.
pub fn apply_section_order(saved: &[String], natural: &[String]) -> Vec<String> {
    let present: HashSet<&str> = natural.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();

    let mut ordered: Vec<String> = saved
        .iter()
        .filter(|key| present.contains(key.as_str()) && seen.insert(key.as_str()))
        .cloned()
        .collect();
    ordered.extend(
        natural
            .iter()
            .filter(|key| !seen.contains(key.as_str()))
            .cloned(),
    );
    ordered
}

pub struct SectionOrderManager<S> {
    store: S,
    local: HashMap<UserId, Vec<String>>,
}

impl<S: SectionOrderStore> SectionOrderManager<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            local: HashMap::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The user's saved order, if any. A store that cannot be read is
    /// treated as having nothing saved.
    pub async fn saved_order(&mut self, user_id: UserId) -> Option<Vec<String>> {
        if let Some(order) = self.local.get(&user_id) {
            return Some(order.clone());
        }
        match self.store.load(user_id).await {
            Ok(Some(order)) => {
                self.local.insert(user_id, order.clone());
                Some(order)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(user_id, error = %e, "Could not load section order, using list order");
                None
            }
        }
    }

    /// Saved order if one exists, otherwise the order in which sections
    /// first appear on `list`.
    pub async fn get_order(&mut self, user_id: UserId, list: &GroceryList) -> Vec<String> {
        match self.saved_order(user_id).await {
            Some(order) => order,
            None => list.section_keys(),
        }
    }

    /// Sections of `list` in display order for `user_id`.
    pub async fn ordered_sections<'l>(
        &mut self,
        user_id: UserId,
        list: &'l GroceryList,
    ) -> Vec<&'l SectionGroup> {
        let natural = list.section_keys();
        let order = match self.saved_order(user_id).await {
            Some(saved) => apply_section_order(&saved, &natural),
            None => natural,
        };
        order.iter().filter_map(|key| list.section(key)).collect()
    }

    /// Applies `new_order` locally right away, then tries to persist it.
    /// Keys are normalized the same way ingredient sections are.
    pub async fn set_order(&mut self, user_id: UserId, new_order: Vec<String>) -> SyncStatus {
        let new_order: Vec<String> = new_order
            .iter()
            .map(|key| normalize_section_key(Some(key.as_str())))
            .collect();
        self.local.insert(user_id, new_order.clone());
        match self.store.save(user_id, &new_order).await {
            Ok(()) => SyncStatus::Synced,
            Err(e) => {
                warn!(user_id, error = %e, "Section order kept locally, save failed");
                SyncStatus::LocalOnly {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grocery_aggregator::aggregate;
    use crate::models::{Course, Ingredient, Recipe};
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[derive(Default)]
    struct MemoryStore {
        orders: Mutex<HashMap<UserId, Vec<String>>>,
        fail: bool,
    }

    impl SectionOrderStore for MemoryStore {
        async fn load(&self, user_id: UserId) -> Result<Option<Vec<String>>, StoreError> {
            if self.fail {
                return Err(StoreError::Serialization(
                    serde_json::from_str::<Vec<String>>("not json").unwrap_err(),
                ));
            }
            Ok(self.orders.lock().unwrap().get(&user_id).cloned())
        }

        async fn save(&self, user_id: UserId, order: &[String]) -> Result<(), StoreError> {
            if self.fail {
                return Err(StoreError::Io {
                    path: PathBuf::from("memory"),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "offline"),
                });
            }
            self.orders.lock().unwrap().insert(user_id, order.to_vec());
            Ok(())
        }
    }

    fn keys(keys: &[&str]) -> Vec<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    fn list_with_sections(sections: &[&str]) -> GroceryList {
        let ingredients = sections
            .iter()
            .map(|section| Ingredient {
                name: format!("{section} item"),
                quantity: Some(1.0),
                unit: None,
                store_section: section.to_string(),
                optional: false,
                preparation: None,
            })
            .collect();
        aggregate(&[Recipe {
            id: 1,
            title: "Mixed".to_string(),
            servings: Some(2),
            course: Course::Dinner,
            ingredients,
        }])
    }

    #[test]
    fn test_apply_order_appends_unknown_and_drops_absent() {
        let saved = keys(&["PRODUCE", "FROZEN", "DAIRY"]);
        let natural = keys(&["DAIRY", "SPICES", "PRODUCE"]);
        assert_eq!(
            apply_section_order(&saved, &natural),
            keys(&["PRODUCE", "DAIRY", "SPICES"])
        );
    }

    #[test]
    fn test_apply_order_ignores_duplicate_saved_keys() {
        let saved = keys(&["DAIRY", "DAIRY", "PRODUCE"]);
        let natural = keys(&["PRODUCE", "DAIRY"]);
        assert_eq!(apply_section_order(&saved, &natural), keys(&["DAIRY", "PRODUCE"]));
    }

    #[tokio::test]
    async fn test_get_order_falls_back_to_natural_order() {
        let mut manager = SectionOrderManager::new(MemoryStore::default());
        let list = list_with_sections(&["PRODUCE", "DAIRY", "CANNED"]);
        assert_eq!(
            manager.get_order(7, &list).await,
            keys(&["PRODUCE", "DAIRY", "CANNED"])
        );
    }

    #[tokio::test]
    async fn test_set_order_is_persisted_and_used() {
        let mut manager = SectionOrderManager::new(MemoryStore::default());
        let status = manager.set_order(7, keys(&["CANNED", "PRODUCE"])).await;
        assert_eq!(status, SyncStatus::Synced);

        let list = list_with_sections(&["PRODUCE", "DAIRY", "CANNED"]);
        let rendered: Vec<_> = manager
            .ordered_sections(7, &list)
            .await
            .iter()
            .map(|g| g.section.clone())
            .collect();
        assert_eq!(rendered, keys(&["CANNED", "PRODUCE", "DAIRY"]));
        assert_eq!(
            manager.store().orders.lock().unwrap().get(&7),
            Some(&keys(&["CANNED", "PRODUCE"]))
        );
    }

    #[tokio::test]
    async fn test_set_order_normalizes_typed_keys() {
        let mut manager = SectionOrderManager::new(MemoryStore::default());
        manager.set_order(5, keys(&["produce", " Meat  Seafood "])).await;

        let list = list_with_sections(&["DAIRY", "MEAT_SEAFOOD", "PRODUCE"]);
        let rendered: Vec<_> = manager
            .ordered_sections(5, &list)
            .await
            .iter()
            .map(|g| g.section.clone())
            .collect();
        assert_eq!(rendered, keys(&["PRODUCE", "MEAT_SEAFOOD", "DAIRY"]));
        assert_eq!(
            manager.store().orders.lock().unwrap().get(&5),
            Some(&keys(&["PRODUCE", "MEAT_SEAFOOD"]))
        );
    }

    #[tokio::test]
    async fn test_failed_save_still_applies_locally() {
        let mut manager = SectionOrderManager::new(MemoryStore {
            fail: true,
            ..Default::default()
        });
        let status = manager.set_order(3, keys(&["DAIRY", "PRODUCE"])).await;
        assert!(matches!(status, SyncStatus::LocalOnly { .. }));

        let list = list_with_sections(&["PRODUCE", "DAIRY"]);
        assert_eq!(manager.get_order(3, &list).await, keys(&["DAIRY", "PRODUCE"]));
    }

    #[tokio::test]
    async fn test_unreadable_store_falls_back_to_natural_order() {
        let mut manager = SectionOrderManager::new(MemoryStore {
            fail: true,
            ..Default::default()
        });
        let list = list_with_sections(&["FROZEN", "DELI"]);
        assert_eq!(manager.get_order(1, &list).await, keys(&["FROZEN", "DELI"]));
    }

    #[tokio::test]
    async fn test_orders_are_per_user() {
        let mut manager = SectionOrderManager::new(MemoryStore::default());
        manager.set_order(1, keys(&["DAIRY", "PRODUCE"])).await;
        let list = list_with_sections(&["PRODUCE", "DAIRY"]);
        assert_eq!(manager.get_order(2, &list).await, keys(&["PRODUCE", "DAIRY"]));
    }

    #[tokio::test]
    async fn test_file_store_round_trips_multiple_users() {
        let dir = tempdir().unwrap();
        let store = FileSectionOrderStore::new(dir.path().join("nested").join("order.json"));

        assert_eq!(store.load(1).await.unwrap(), None);
        store.save(1, &keys(&["DAIRY"])).await.unwrap();
        store.save(2, &keys(&["PRODUCE", "DELI"])).await.unwrap();

        let reopened = FileSectionOrderStore::new(store.path().to_path_buf());
        assert_eq!(reopened.load(1).await.unwrap(), Some(keys(&["DAIRY"])));
        assert_eq!(reopened.load(2).await.unwrap(), Some(keys(&["PRODUCE", "DELI"])));
    }

    #[tokio::test]
    async fn test_file_store_reports_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("order.json");
        std::fs::write(&path, "{ not valid").unwrap();
        let store = FileSectionOrderStore::new(path);
        assert!(matches!(store.load(1).await, Err(StoreError::Serialization(_))));
    }
}
