//! SurrealDB implementation of the quote store.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use surrealdb::{
    RecordId, Surreal,
    engine::any::{self, Any},
    opt::auth::Root,
};
use tracing::{info, instrument};

use crate::base::{
    config::Config,
    types::{Insertion, Quote, QuoteError, QuoteId, QuotedMessage, Removal, Res},
};

use super::{DbClient, GenericDbClient};

const TABLE: &str = "quote";

// Extra methods on `DbClient` applied by the surreal implementation.

impl DbClient {
    /// Connects to the store described by the configuration.
    pub async fn surreal(config: &Config) -> Res<Self> {
        let credentials = config.db_username.as_deref().zip(config.db_password.as_deref());
        let client = SurrealDbClient::connect(&config.db_endpoint, credentials, &config.db_namespace, &config.db_database).await?;

        Ok(Self { inner: Arc::new(client) })
    }

    /// Creates a fresh, empty in-memory store.
    pub async fn surreal_memory() -> Res<Self> {
        let client = SurrealDbClient::connect("mem://", None, "slack", "quotes").await?;

        Ok(Self { inner: Arc::new(client) })
    }
}

// Records.

#[derive(Debug, Deserialize)]
struct CountRow {
    total: usize,
}

#[derive(Debug, Deserialize)]
struct QuoteRow {
    key: String,
    #[serde(default)]
    user_id: Option<String>,
    body: String,
    ts: String,
}

impl TryFrom<QuoteRow> for Quote {
    type Error = QuoteError;

    fn try_from(row: QuoteRow) -> Result<Self, Self::Error> {
        Ok(Quote {
            id: row.key.parse()?,
            message: QuotedMessage::new(row.user_id, row.body, row.ts),
        })
    }
}

#[derive(Debug, Deserialize)]
struct RemovedRow {
    #[allow(dead_code)]
    id: RecordId,
}

fn user_filter(user: Option<&str>) -> &'static str {
    if user.is_some() { "WHERE user_id = $user" } else { "" }
}

// Specific implementations.

/// SurrealDB client implementation.
#[derive(Clone)]
pub struct SurrealDbClient {
    db: Surreal<Any>,
}

impl SurrealDbClient {
    /// Connects, signs in when credentials are given, and defines the schema.
    #[instrument(name = "SurrealDbClient::connect", skip(credentials))]
    pub async fn connect(endpoint: &str, credentials: Option<(&str, &str)>, namespace: &str, database: &str) -> Res<Self> {
        let db = any::connect(endpoint).await.map_err(QuoteError::from)?;

        if let Some((username, password)) = credentials {
            db.signin(Root { username, password }).await.map_err(QuoteError::from)?;
        }

        db.use_ns(namespace).use_db(database).await.map_err(QuoteError::from)?;

        // Quotes are schemaless documents keyed by their hex id; recall by author is indexed.
        db.query(format!("DEFINE TABLE IF NOT EXISTS {TABLE} SCHEMALESS;"))
            .query(format!("DEFINE INDEX IF NOT EXISTS quote_user ON {TABLE} FIELDS user_id;"))
            .await
            .map_err(QuoteError::from)?
            .check()
            .map_err(QuoteError::from)?;

        info!("Database initialized successfully.");

        Ok(Self { db })
    }
}

#[async_trait]
impl GenericDbClient for SurrealDbClient {
    #[instrument(skip_all)]
    async fn upsert_quote(&self, message: &QuotedMessage, id: QuoteId) -> Res<Insertion> {
        let query = format!(
            "LET $existing = (SELECT VALUE id FROM {TABLE} WHERE user_id = $user AND body = $body AND ts = $ts LIMIT 1);
            IF array::len($existing) = 0 {{ CREATE type::thing('{TABLE}', $key) CONTENT {{ user_id: $user, body: $body, ts: $ts }} RETURN NONE; }};
            RETURN array::len($existing) = 0;"
        );

        let mut response = self
            .db
            .query(query)
            .bind(("user", message.user.clone()))
            .bind(("body", message.text.clone()))
            .bind(("ts", message.timestamp.clone()))
            .bind(("key", id.to_string()))
            .await
            .map_err(QuoteError::from)?
            .check()
            .map_err(QuoteError::from)?;

        let last = response.num_statements() - 1;
        let inserted: Option<bool> = response.take(last).map_err(QuoteError::from)?;

        Ok(if inserted.unwrap_or(false) { Insertion::Inserted } else { Insertion::AlreadyPresent })
    }

    #[instrument(skip(self))]
    async fn count_quotes(&self, user: Option<&str>) -> Res<usize> {
        let query = format!("SELECT count() AS total FROM {TABLE} {} GROUP ALL;", user_filter(user));

        let mut response = self
            .db
            .query(query)
            .bind(("user", user.map(str::to_string)))
            .await
            .map_err(QuoteError::from)?;

        let row: Option<CountRow> = response.take(0).map_err(QuoteError::from)?;

        Ok(row.map(|r| r.total).unwrap_or(0))
    }

    #[instrument(skip(self))]
    async fn quote_at(&self, user: Option<&str>, offset: usize) -> Res<Option<Quote>> {
        let query = format!(
            "SELECT record::id(id) AS key, user_id, body, ts FROM {TABLE} {} LIMIT 1 START $offset;",
            user_filter(user)
        );

        let mut response = self
            .db
            .query(query)
            .bind(("user", user.map(str::to_string)))
            .bind(("offset", offset as i64))
            .await
            .map_err(QuoteError::from)?;

        let row: Option<QuoteRow> = response.take(0).map_err(QuoteError::from)?;

        Ok(row.map(Quote::try_from).transpose()?)
    }

    #[instrument(skip(self))]
    async fn remove_quote(&self, id: &QuoteId) -> Res<Removal> {
        let removed: Option<RemovedRow> = self.db.delete((TABLE, id.to_string())).await.map_err(QuoteError::from)?;

        Ok(if removed.is_some() { Removal::Deleted } else { Removal::NotFound })
    }
}
