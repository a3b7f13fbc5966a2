//! robust-links: Robust Link creation for reference items
//!
//! Turns an item holding a URL or DOI into a memento at a web archive,
//! recorded as a "Robust Link" attachment with a note.
//!
//! Commands:
//! - init: Create a library.yaml template
//! - archive: Create Robust Links for library items

pub mod archive;
pub mod attachment;
pub mod client;
pub mod creator;
pub mod error;
pub mod init;
pub mod interpret;
pub mod library;
pub mod notify;
pub mod resolve;
pub mod schema;
pub mod store;

pub use client::{ArchiveApi, ArchiveClient, RawResponse, DEFAULT_ENDPOINT};
pub use creator::{Invocation, PendingAttachment, RobustLinkCreator};
pub use error::{Error, ResponseError, StoreError, TransportError};
pub use interpret::{interpret, Outcome, Unreachable};
pub use notify::{NotificationSink, RecordingSink, StderrSink};
pub use schema::{
    ArchiveChoice, ArchiveRequest, ArchiveResponse, Item, ItemId, ItemKind, Notice, NoticeLevel,
};
pub use store::{ItemStore, MemoryItemStore, PreferenceStore, Preferences};
