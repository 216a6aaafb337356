//! Quote storage.
//!
//! [`GenericDbClient`] is the narrow set of document-collection primitives a
//! store must provide. [`DbClient`] wraps one and layers the repository
//! contract on top: idempotent insert, uniform random recall, and delete.

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, instrument};

use crate::base::types::{Insertion, Quote, QuoteId, QuotedMessage, Removal, Res};

pub mod surreal;

// Traits.

/// Generic database client trait that clients must implement.
///
/// Every method maps to one store primitive. Implementations report failures
/// as [`QuoteError::Store`](crate::base::types::QuoteError::Store).
#[async_trait]
pub trait GenericDbClient: Send + Sync + 'static {
    /// Stores `message` under `id` unless an identical `user`+`text`+`timestamp`
    /// record already exists, in which case nothing changes and `id` is discarded.
    async fn upsert_quote(&self, message: &QuotedMessage, id: QuoteId) -> Res<Insertion>;

    /// Counts quotes, or only the quotes by `user` when given.
    async fn count_quotes(&self, user: Option<&str>) -> Res<usize>;

    /// Returns the quote at `offset` within the (optionally filtered) collection.
    async fn quote_at(&self, user: Option<&str>, offset: usize) -> Res<Option<Quote>>;

    /// Removes the quote with the given id.
    async fn remove_quote(&self, id: &QuoteId) -> Res<Removal>;
}

// Structs.

/// Database client for slack-quoter.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct DbClient {
    inner: Arc<dyn GenericDbClient>,
}

impl Deref for DbClient {
    type Target = dyn GenericDbClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl DbClient {
    pub fn new(inner: Arc<dyn GenericDbClient>) -> Self {
        Self { inner }
    }

    /// Inserts `message` unless an identical record is already stored.
    #[instrument(skip_all)]
    pub async fn add_if_absent(&self, message: &QuotedMessage) -> Res<Insertion> {
        let insertion = self.upsert_quote(message, QuoteId::generate()).await?;

        debug!("Upserted quote from `{:?}` at `{}`: {:?}.", message.user, message.timestamp, insertion);

        Ok(insertion)
    }

    /// Picks a quote uniformly at random, optionally only among `user`'s.
    ///
    /// Returns `None` when nothing matches. The count and the fetch are two
    /// separate store calls, so a concurrent delete can also yield `None`.
    #[instrument(skip(self))]
    pub async fn random_quote(&self, user: Option<&str>) -> Res<Option<Quote>> {
        let count = self.count_quotes(user).await?;

        if count == 0 {
            return Ok(None);
        }

        let offset = rand::thread_rng().gen_range(0..count);

        self.quote_at(user, offset).await
    }

    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: &QuoteId) -> Res<Removal> {
        self.remove_quote(id).await
    }
}
