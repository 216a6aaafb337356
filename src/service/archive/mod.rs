//! Paginated listings of previously saved messages, consumed by the crawler.

pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{Directory, QuotedMessage, Res};

// Types.

/// One item of a starred or pinned listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchivedItem {
    Message(QuotedMessage),
    /// Files, channels, and other things that can be starred but not quoted.
    Other { kind: String },
}

/// One page of a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchivePage {
    pub items: Vec<ArchivedItem>,
    /// Total pages the source reports; pages are numbered from 1.
    pub pages: u32,
}

// Traits.

/// Generic archive trait that sources must implement.
///
/// Every listing is paginated the same way: ask for page `n`, get the items
/// and the current total page count back.
#[async_trait]
pub trait GenericArchiveClient: Send + Sync + 'static {
    /// Read the whole user directory.
    async fn fetch_directory(&self) -> Res<Directory>;

    /// Read one page of a user's starred items.
    async fn starred_page(&self, user_id: &str, page: u32) -> Res<ArchivePage>;

    /// Read one page of a channel's pinned items.
    async fn pinned_page(&self, channel_id: &str, page: u32) -> Res<ArchivePage>;
}

// Structs.

/// Archive client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ArchiveClient {
    inner: Arc<dyn GenericArchiveClient>,
}

impl Deref for ArchiveClient {
    type Target = dyn GenericArchiveClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ArchiveClient {
    pub fn new(inner: Arc<dyn GenericArchiveClient>) -> Self {
        Self { inner }
    }
}
