//! Robust Link creation pipeline
//!
//! Phase 1 (validation, archive call, classification) completes before
//! `make_robust_link` returns. Phase 2 (attachment + note) runs as a spawned
//! task exposed through `PendingAttachment`.

use crate::attachment::{compose, is_archived};
use crate::client::ArchiveApi;
use crate::error::Error;
use crate::interpret::{interpret, Outcome, OutcomeClass};
use crate::notify::NotificationSink;
use crate::resolve::{forces_urir, is_valid_url, resolve_url};
use crate::schema::{ArchiveChoice, ArchiveRequest, Item, ItemId, Notice};
use crate::store::{
    ItemStore, PreferenceStore, PREF_ALWAYS_URIR, PREF_DEFAULT_ARCHIVE, RANDOM_ARCHIVE,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Creates Robust Links for items
#[derive(Clone)]
pub struct RobustLinkCreator {
    items: Arc<dyn ItemStore>,
    prefs: Arc<dyn PreferenceStore>,
    notices: Arc<dyn NotificationSink>,
    archive: Arc<dyn ArchiveApi>,
}

/// Result of one invocation
#[derive(Debug)]
pub struct Invocation {
    pub item: ItemId,
    /// Resolved target URL (may be empty)
    pub url: String,
    pub outcome: Outcome,
    /// Present only on success
    pub attachment: Option<PendingAttachment>,
}

/// Deferred attachment/note creation.
///
/// A failure is logged when it happens; no notice is raised for it.
#[derive(Debug)]
pub struct PendingAttachment {
    handle: JoinHandle<Result<ItemId, Error>>,
}

impl PendingAttachment {
    /// Wait for the attachment and its note to be committed
    pub async fn wait(self) -> Result<ItemId, Error> {
        self.handle.await?
    }
}

impl RobustLinkCreator {
    pub fn new(
        items: Arc<dyn ItemStore>,
        prefs: Arc<dyn PreferenceStore>,
        notices: Arc<dyn NotificationSink>,
        archive: Arc<dyn ArchiveApi>,
    ) -> Self {
        Self {
            items,
            prefs,
            notices,
            archive,
        }
    }

    /// Look the item up in the store, then run the pipeline on it
    pub async fn make_robust_link_by_id(
        &self,
        choice: &ArchiveChoice,
        id: ItemId,
        display_status: bool,
    ) -> Invocation {
        match self.items.get(id).await {
            Ok(item) => self.make_robust_link(choice, &item, display_status).await,
            Err(e) => {
                error!(item = %id, error = %e, "failed to load item");
                self.finish(id, String::new(), Outcome::StoreFailure(e.to_string()), true)
            }
        }
    }

    /// Run the pipeline once for `item`.
    ///
    /// With `display_status` off, unsupported-type and blank-URL refusals are
    /// silent; every other terminal state still notifies.
    pub async fn make_robust_link(
        &self,
        choice: &ArchiveChoice,
        item: &Item,
        display_status: bool,
    ) -> Invocation {
        debug!(item = %item.id, kind = %item.kind, "creating Robust Link");

        let url = resolve_url(item);

        if !item.kind.is_archivable() {
            return self.finish(
                item.id,
                url,
                Outcome::UnsupportedItemType(item.kind),
                display_status,
            );
        }

        if url.is_empty() {
            debug!("no URL field, returning");
            return self.finish(item.id, url, Outcome::BlankUrl, display_status);
        }

        if !is_valid_url(&url) {
            let outcome = Outcome::InvalidUrl(url.clone());
            return self.finish(item.id, url, outcome, true);
        }

        match is_archived(self.items.as_ref(), item.id).await {
            Ok(true) => return self.finish(item.id, url, Outcome::AlreadyArchived, true),
            Ok(false) => {}
            Err(e) => {
                error!(item = %item.id, error = %e, "failed to read attachments");
                let outcome = Outcome::StoreFailure(e.to_string());
                return self.finish(item.id, url, outcome, true);
            }
        }

        let archive_hint = self.effective_archive(choice);
        let preserving = match &archive_hint {
            None => format!("Preserving {} \n at any web archive", url),
            Some(name) => format!("Preserving {} \n at web archive {}", url, name),
        };
        debug!("{}", preserving);
        self.notices.show(Notice::info(preserving));

        let always_urir = self.prefs.get(PREF_ALWAYS_URIR);
        debug!(always_urir = ?always_urir, "read always-URIR preference");

        let request = ArchiveRequest {
            target_url: url.clone(),
            force_urir_mode: forces_urir(&url, always_urir.as_deref()),
            archive_hint,
        };

        let outcome = match self.archive.call(&request).await {
            Ok(raw) => {
                debug!(status = raw.status, "interpreting archive response");
                interpret(raw.status, &raw.body, request.archive_hint.as_deref())
            }
            Err(e) => {
                error!(error = %e, "archive request failed before a response arrived");
                Outcome::NetworkFailure(e.to_string())
            }
        };

        let response = match outcome {
            Outcome::Success(response) => response,
            other => return self.finish(item.id, url, other, true),
        };
        let outcome = Outcome::Success(response.clone());

        // Success notice goes out before the attachment task is started
        let attachment = {
            let notice = outcome.notice();
            info!(item = %item.id, outcome = outcome.kind(), "{}", notice.message);
            self.notices.show(notice);

            let items = Arc::clone(&self.items);
            let parent = item.id;
            let handle = tokio::spawn(async move {
                match compose(items.as_ref(), parent, &response).await {
                    Ok(id) => {
                        debug!(%parent, attachment = %id, "Robust Link attachment committed");
                        Ok(id)
                    }
                    Err(e) => {
                        error!(%parent, error = %e, "Robust Link attachment failed");
                        Err(Error::from(e))
                    }
                }
            });
            PendingAttachment { handle }
        };

        Invocation {
            item: item.id,
            url,
            outcome,
            attachment: Some(attachment),
        }
    }

    /// Archive to request for a choice; `None` is any archive
    pub fn effective_archive(&self, choice: &ArchiveChoice) -> Option<String> {
        match choice {
            ArchiveChoice::Any => None,
            ArchiveChoice::Default => self
                .prefs
                .get(PREF_DEFAULT_ARCHIVE)
                .filter(|name| !name.is_empty() && name != RANDOM_ARCHIVE),
            ArchiveChoice::Named(name) => Some(name.clone()),
        }
    }

    fn finish(&self, item: ItemId, url: String, outcome: Outcome, notify: bool) -> Invocation {
        let notice = outcome.notice();
        match outcome.class() {
            OutcomeClass::Failed => {
                warn!(%item, outcome = outcome.kind(), "{}", notice.message)
            }
            _ => info!(%item, outcome = outcome.kind(), "{}", notice.message),
        }
        if notify {
            self.notices.show(notice);
        }

        Invocation {
            item,
            url,
            outcome,
            attachment: None,
        }
    }
}
