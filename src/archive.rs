//! archive command: Create Robust Links for library items
//!
//! Runs the pipeline one item at a time, waiting for each attachment before
//! the next item starts, then writes the library back:
//! - ok: memento created, "Robust Link" attachment and note added
//! - skipped: already preserved, blank URL, or not an archivable item
//! - failed: invalid URL, service or network error

use crate::client::ArchiveClient;
use crate::creator::{Invocation, RobustLinkCreator};
use crate::interpret::{Outcome, OutcomeClass};
use crate::library::LibraryFile;
use crate::notify::StderrSink;
use crate::schema::{ArchiveChoice, ItemId};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args)]
pub struct ArchiveArgs {
    /// Path to library.yaml file
    pub file: PathBuf,

    /// Item id to preserve (can be used multiple times)
    #[arg(long = "item", short = 'i')]
    pub items: Vec<u64>,

    /// Preserve every top-level item, without refusal notices
    #[arg(long, conflicts_with = "items")]
    pub all: bool,

    /// Web archive to use; "default" reads the preference (omit for any)
    #[arg(long, short)]
    pub archive: Option<String>,

    /// Dry run - don't write changes back to file
    #[arg(long)]
    pub dry_run: bool,
}

/// Service settings shared by commands
pub struct ServiceConfig {
    pub endpoint: String,
    pub timeout_ms: u64,
}

/// Result for a single item (compact)
#[derive(Debug, Serialize)]
pub struct ArchiveResult {
    pub item: ItemId,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memento: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<ItemId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Full report (compact)
#[derive(Debug, Serialize)]
pub struct ArchiveReport {
    pub ok: usize,
    pub failed: usize,
    pub skipped: usize,
    pub results: Vec<ArchiveResult>,
}

pub async fn run_archive(args: ArchiveArgs, service: ServiceConfig) -> Result<()> {
    if args.items.is_empty() && !args.all {
        eprintln!("Usage:");
        eprintln!("  robustlinks archive <library.yaml> --item <ID>   Preserve specific items");
        eprintln!("  robustlinks archive <library.yaml> --all         Preserve every item");
        std::process::exit(1);
    }

    let mut library = LibraryFile::load(&args.file).await?;
    eprintln!(
        "Loaded {} items from {}",
        library.items.len(),
        args.file.display()
    );

    let store = Arc::new(library.store());
    let client = ArchiveClient::new(&service.endpoint, Duration::from_millis(service.timeout_ms))
        .with_context(|| format!("Invalid service endpoint: {}", service.endpoint))?;
    let creator = RobustLinkCreator::new(
        store.clone(),
        Arc::new(library.preferences.clone()),
        Arc::new(StderrSink),
        Arc::new(client),
    );

    let choice = ArchiveChoice::from_arg(args.archive.as_deref());

    // Explicit ids show every notice; --all stays quiet on refusals
    let (targets, display_status): (Vec<ItemId>, bool) = if args.all {
        let ids = library
            .items
            .iter()
            .filter(|item| item.parent.is_none())
            .map(|item| item.id)
            .collect();
        (ids, false)
    } else {
        (unique_ids(&args.items), true)
    };

    let mut results = Vec::with_capacity(targets.len());
    for id in targets {
        eprintln!("  -> item {}", id);
        let invocation = creator
            .make_robust_link_by_id(&choice, id, display_status)
            .await;
        results.push(settle(invocation).await);
    }

    let report = tally(results);

    if !args.dry_run {
        library.replace_items(store.snapshot().await);
        library.meta.last_archived = Some(Utc::now().to_rfc3339());
        library.save(&args.file).await?;
        eprintln!("Updated {}", args.file.display());
    } else {
        eprintln!("Dry run - file not modified");
    }

    println!("{}", serde_json::to_string(&report)?);
    eprintln!(
        "Done: {}/{} OK",
        report.ok,
        report.ok + report.failed + report.skipped
    );

    Ok(())
}

/// Requested ids in order, each once
fn unique_ids(ids: &[u64]) -> Vec<ItemId> {
    let mut seen = BTreeSet::new();
    ids.iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .map(ItemId)
        .collect()
}

/// Wait for the pending attachment, if any, and build the item's result
async fn settle(invocation: Invocation) -> (OutcomeClass, ArchiveResult) {
    let memento = match &invocation.outcome {
        Outcome::Success(response) => response.memento_url.clone(),
        _ => None,
    };
    let class = invocation.outcome.class();

    let (attachment, error) = match invocation.attachment {
        Some(pending) => match pending.wait().await {
            Ok(id) => (Some(id), None),
            Err(e) => (None, Some(e.to_string())),
        },
        None => (None, failure_detail(&invocation.outcome)),
    };

    // A success whose attachment never landed counts as failed
    let class = if class == OutcomeClass::Ok && error.is_some() {
        OutcomeClass::Failed
    } else {
        class
    };

    (
        class,
        ArchiveResult {
            item: invocation.item,
            outcome: invocation.outcome.kind(),
            url: invocation.url,
            memento,
            attachment,
            error,
        },
    )
}

fn tally(results: Vec<(OutcomeClass, ArchiveResult)>) -> ArchiveReport {
    let mut report = ArchiveReport {
        ok: 0,
        failed: 0,
        skipped: 0,
        results: Vec::with_capacity(results.len()),
    };

    for (class, result) in results {
        match class {
            OutcomeClass::Ok => report.ok += 1,
            OutcomeClass::Failed => report.failed += 1,
            OutcomeClass::Skipped => report.skipped += 1,
        }
        report.results.push(result);
    }

    report
}

fn failure_detail(outcome: &Outcome) -> Option<String> {
    match outcome {
        Outcome::UserError(body) if !body.is_empty() => Some(body.clone()),
        Outcome::ServiceMisconfigured(status) => Some(format!("HTTP {}", status)),
        Outcome::ServiceDegraded(Some(detail)) => Some(detail.clone()),
        Outcome::NetworkFailure(detail) | Outcome::StoreFailure(detail) => Some(detail.clone()),
        _ => None,
    }
}
