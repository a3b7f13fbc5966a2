//! init command: Create library.yaml template
//!
//! Creates a new library file with one example item and default preferences.

use crate::library::{LibraryFile, Meta};
use crate::schema::Item;
use crate::store::{Preferences, RANDOM_ARCHIVE};
use anyhow::{bail, Result};
use chrono::Utc;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args)]
pub struct InitArgs {
    /// Output file path (default: library.yaml)
    #[arg(short, long, default_value = "library.yaml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
pub struct InitOutput {
    pub created: String,
    pub file: String,
}

pub async fn run_init(args: InitArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        let error = serde_json::json!({
            "error": "file_exists",
            "message": format!("{} already exists. Use --force to overwrite.", args.output.display()),
            "file": args.output.display().to_string()
        });
        println!("{}", serde_json::to_string(&error)?);
        bail!("File exists");
    }

    template().save(&args.output).await?;

    let output = InitOutput {
        created: Utc::now().to_rfc3339(),
        file: args.output.display().to_string(),
    };
    println!("{}", serde_json::to_string(&output)?);

    Ok(())
}

fn template() -> LibraryFile {
    let mut example = Item::reference(1);
    example.title = "Example Reference".to_string();
    example.url = "https://example.com".to_string();

    LibraryFile {
        meta: Meta {
            created: Utc::now().format("%Y-%m-%d").to_string(),
            last_archived: None,
            tool: "robustlinks".to_string(),
            total_items: 1,
        },
        preferences: Preferences {
            whatarchive: Some(RANDOM_ARCHIVE.to_string()),
            alwaysurir: Some("no".to_string()),
        },
        items: vec![example],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_is_archivable() {
        let library = template();
        assert_eq!(library.items.len(), 1);
        assert!(library.items[0].kind.is_archivable());
        assert_eq!(library.meta.total_items, 1);
        assert_eq!(library.preferences.whatarchive.as_deref(), Some("random"));
    }
}
