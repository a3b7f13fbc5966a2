//! Robust Link attachments: detection and composition
//!
//! Both sides key on the attachment title, so `ROBUST_LINK_TITLE` is the only
//! place that literal may live.

use crate::error::StoreError;
use crate::schema::{ArchiveResponse, ItemId};
use crate::store::{ItemStore, NewLinkAttachment};
use tracing::debug;

/// Title marking an attachment as a Robust Link
pub const ROBUST_LINK_TITLE: &str = "Robust Link";

/// True if any attachment of `parent` is titled exactly "Robust Link".
///
/// Reads the parent's current attachments from the store. Title-keyed: a
/// renamed attachment no longer counts.
pub async fn is_archived(store: &dyn ItemStore, parent: ItemId) -> Result<bool, StoreError> {
    let item = store.get(parent).await?;
    debug!(%parent, attachments = item.attachments.len(), "checking for Robust Link");

    for id in &item.attachments {
        let attachment = store.get(*id).await?;
        if attachment.title == ROBUST_LINK_TITLE {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Note body recording both links
pub fn note_html(response: &ArchiveResponse) -> String {
    format!(
        "Original URL: {}<br>Memento URL: {}",
        response.original_anchor, response.memento_anchor
    )
}

/// Create the link attachment under `parent`, then write and commit its note.
///
/// The note is only written once the attachment exists.
pub async fn compose(
    store: &dyn ItemStore,
    parent: ItemId,
    response: &ArchiveResponse,
) -> Result<ItemId, StoreError> {
    debug!(%parent, url = %response.original_url, "creating Robust Link attachment");

    let attachment = store
        .link_attachment(NewLinkAttachment {
            url: response.original_url.clone(),
            parent,
            title: ROBUST_LINK_TITLE.to_string(),
        })
        .await?;

    debug!(%attachment, "attachment created");

    store.set_note(attachment, &note_html(response)).await?;
    store.save_tx(attachment).await?;

    Ok(attachment)
}
