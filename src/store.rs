//! Item store and preference store collaborators

use crate::error::StoreError;
use crate::schema::{Item, ItemId, ItemKind};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;

/// Preference key for the default archive choice
pub const PREF_DEFAULT_ARCHIVE: &str = "extensions.robustlinks.whatarchive";
/// Preference key for the always-URIR flag (`"yes"` enables it)
pub const PREF_ALWAYS_URIR: &str = "extensions.robustlinks.alwaysurir";
/// Default-archive value meaning "any archive"
pub const RANDOM_ARCHIVE: &str = "random";

/// A link attachment to be created under a parent item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLinkAttachment {
    pub url: String,
    pub parent: ItemId,
    pub title: String,
}

/// The operations the pipeline consumes from the host's item store
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Resolve an item (or attachment) by id
    async fn get(&self, id: ItemId) -> Result<Item, StoreError>;

    /// Create a link attachment and return its id
    async fn link_attachment(&self, link: NewLinkAttachment) -> Result<ItemId, StoreError>;

    /// Stage a note body on an item. Not durable until `save_tx`.
    async fn set_note(&self, id: ItemId, html: &str) -> Result<(), StoreError>;

    /// Commit staged changes for an item in one transaction
    async fn save_tx(&self, id: ItemId) -> Result<(), StoreError>;
}

/// Read-only preference lookups
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Preference values as kept in a library file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Archive used when the caller asks for the default (`random` = any)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatarchive: Option<String>,
    /// `"yes"` forces URIR mode for every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alwaysurir: Option<String>,
}

impl PreferenceStore for Preferences {
    fn get(&self, key: &str) -> Option<String> {
        match key {
            PREF_DEFAULT_ARCHIVE => self.whatarchive.clone(),
            PREF_ALWAYS_URIR => self.alwaysurir.clone(),
            _ => None,
        }
    }
}

/// In-memory item store with staged notes and transactional save
#[derive(Debug, Default)]
pub struct MemoryItemStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    items: BTreeMap<ItemId, Item>,
    staged_notes: HashMap<ItemId, String>,
    next_id: u64,
}

impl MemoryItemStore {
    pub fn new(items: impl IntoIterator<Item = Item>) -> Self {
        let items: BTreeMap<ItemId, Item> = items.into_iter().map(|i| (i.id, i)).collect();
        let next_id = items.keys().map(|id| id.0).max().unwrap_or(0) + 1;
        Self {
            inner: Mutex::new(MemoryInner {
                items,
                staged_notes: HashMap::new(),
                next_id,
            }),
        }
    }

    /// Committed items, ordered by id
    pub async fn snapshot(&self) -> Vec<Item> {
        self.inner.lock().await.items.values().cloned().collect()
    }
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn get(&self, id: ItemId) -> Result<Item, StoreError> {
        self.inner
            .lock()
            .await
            .items
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn link_attachment(&self, link: NewLinkAttachment) -> Result<ItemId, StoreError> {
        let mut inner = self.inner.lock().await;
        if !inner.items.contains_key(&link.parent) {
            return Err(StoreError::NotFound(link.parent));
        }

        let id = ItemId(inner.next_id);
        inner.next_id += 1;

        inner.items.insert(
            id,
            Item {
                id,
                kind: ItemKind::Attachment,
                title: link.title,
                url: link.url,
                doi: String::new(),
                attachments: Vec::new(),
                parent: Some(link.parent),
                note: None,
            },
        );
        if let Some(parent) = inner.items.get_mut(&link.parent) {
            parent.attachments.push(id);
        }

        Ok(id)
    }

    async fn set_note(&self, id: ItemId, html: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if !inner.items.contains_key(&id) {
            return Err(StoreError::NotFound(id));
        }
        inner.staged_notes.insert(id, html.to_string());
        Ok(())
    }

    async fn save_tx(&self, id: ItemId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let staged = inner.staged_notes.remove(&id);
        let item = inner.items.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if let Some(note) = staged {
            item.note = Some(note);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_link_attachment_registers_child() {
        let store = MemoryItemStore::new(vec![Item::reference(3)]);
        let id = store
            .link_attachment(NewLinkAttachment {
                url: "https://example.com".to_string(),
                parent: ItemId(3),
                title: "Robust Link".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(id, ItemId(4));
        let parent = store.get(ItemId(3)).await.unwrap();
        assert_eq!(parent.attachments, vec![ItemId(4)]);
        let child = store.get(id).await.unwrap();
        assert_eq!(child.kind, ItemKind::Attachment);
        assert_eq!(child.parent, Some(ItemId(3)));
    }

    #[tokio::test]
    async fn test_link_attachment_unknown_parent() {
        let store = MemoryItemStore::default();
        let err = store
            .link_attachment(NewLinkAttachment {
                url: "https://example.com".to_string(),
                parent: ItemId(9),
                title: "Robust Link".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ItemId(9))));
    }

    #[tokio::test]
    async fn test_note_is_staged_until_save() {
        let store = MemoryItemStore::new(vec![Item::reference(1)]);
        store.set_note(ItemId(1), "<p>hi</p>").await.unwrap();
        assert_eq!(store.get(ItemId(1)).await.unwrap().note, None);

        store.save_tx(ItemId(1)).await.unwrap();
        assert_eq!(
            store.get(ItemId(1)).await.unwrap().note.as_deref(),
            Some("<p>hi</p>")
        );
    }

    #[test]
    fn test_preferences_lookup() {
        let prefs = Preferences {
            whatarchive: Some("random".to_string()),
            alwaysurir: Some("yes".to_string()),
        };
        assert_eq!(prefs.get(PREF_DEFAULT_ARCHIVE).as_deref(), Some("random"));
        assert_eq!(prefs.get(PREF_ALWAYS_URIR).as_deref(), Some("yes"));
        assert_eq!(prefs.get("extensions.other"), None);
    }
}
