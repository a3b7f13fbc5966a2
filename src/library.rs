//! library.yaml: item and preference storage for the command-line host

use crate::schema::Item;
use crate::store::{MemoryItemStore, Preferences};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root structure for library.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryFile {
    pub meta: Meta,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub items: Vec<Item>,
}

/// Metadata about the library file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    /// ISO date when file was created
    pub created: String,
    /// ISO datetime of last archive run (null if never)
    pub last_archived: Option<String>,
    /// Tool that wrote the file
    pub tool: String,
    /// Total number of items, attachments included
    pub total_items: usize,
}

impl LibraryFile {
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        tokio::fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Item store seeded with this library's items
    pub fn store(&self) -> MemoryItemStore {
        MemoryItemStore::new(self.items.iter().cloned())
    }

    /// Replace the items with the store's committed state
    pub fn replace_items(&mut self, items: Vec<Item>) {
        self.meta.total_items = items.len();
        self.items = items;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ItemId, ItemKind};

    const LIBRARY: &str = r#"
meta:
  created: "2026-01-10"
  last_archived: null
  tool: robustlinks
  total_items: 2
preferences:
  whatarchive: random
items:
  - id: 1
    title: Robust Links in Scholarly Communication
    DOI: 10.25776/abc123
    attachments: [2]
  - id: 2
    kind: attachment
    title: Full Text PDF
    parent: 1
"#;

    #[test]
    fn test_parse_library() {
        let library: LibraryFile = serde_yaml::from_str(LIBRARY).unwrap();
        assert_eq!(library.items.len(), 2);
        assert_eq!(library.items[0].kind, ItemKind::Reference);
        assert_eq!(library.items[0].doi, "10.25776/abc123");
        assert_eq!(library.items[0].attachments, vec![ItemId(2)]);
        assert_eq!(library.items[1].kind, ItemKind::Attachment);
        assert_eq!(library.preferences.whatarchive.as_deref(), Some("random"));
        assert_eq!(library.preferences.alwaysurir, None);
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.yaml");

        let mut library: LibraryFile = serde_yaml::from_str(LIBRARY).unwrap();
        let mut extra = Item::reference(3);
        extra.url = "https://example.com".to_string();
        let mut items = library.items.clone();
        items.push(extra);
        library.replace_items(items);
        library.save(&path).await.unwrap();

        let loaded = LibraryFile::load(&path).await.unwrap();
        assert_eq!(loaded.meta.total_items, 3);
        assert_eq!(loaded.items[2].url, "https://example.com");
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = LibraryFile::load(Path::new("does-not-exist.yaml"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read file"));
    }
}
