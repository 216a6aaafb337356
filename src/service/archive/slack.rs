//! Slack Web API implementation of the archive source.
//!
//! `stars.list` and `pins.list` are not wrapped by slack-morphism, so they are
//! called directly over `reqwest`; the directory reuses the chat client's
//! `users.list` walk.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use slack_morphism::prelude::{SlackApiToken, SlackApiTokenValue};
use tracing::{debug, instrument};

use crate::{
    base::types::{Directory, QuoteError, QuotedMessage, Res},
    service::chat::slack::{FullClient, fetch_directory, https_client},
};

use super::{ArchiveClient, ArchivedItem, ArchivePage, GenericArchiveClient};

const SLACK_API: &str = "https://slack.com/api";
const PAGE_SIZE: &str = "100";

// Extra methods on `ArchiveClient` applied by the slack implementation.

impl ArchiveClient {
    /// Creates a Slack archive client authenticated with a user token.
    pub fn slack(token: &str) -> Res<Self> {
        let client = SlackArchiveClient::new(token)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Wire types.

#[derive(Debug, Deserialize)]
struct ListResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    items: Vec<ListItem>,
    #[serde(default)]
    paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
struct ListItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    message: Option<ListMessage>,
}

#[derive(Debug, Deserialize)]
struct ListMessage {
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    text: String,
    ts: String,
}

#[derive(Debug, Deserialize)]
struct Paging {
    pages: u32,
}

/// Decodes a `stars.list`/`pins.list` body.
///
/// A body without `paging` is treated as the only page.
fn parse_page(method: &str, page: u32, body: &[u8]) -> Res<ArchivePage> {
    let response: ListResponse = serde_json::from_slice(body).map_err(|e| QuoteError::Transport(format!("Malformed `{method}` response: {e}")))?;

    if !response.ok {
        let error = response.error.unwrap_or_else(|| "unknown_error".to_string());
        return Err(QuoteError::Transport(format!("`{method}` failed: {error}")).into());
    }

    let items = response
        .items
        .into_iter()
        .map(|item| match item.message {
            Some(message) if item.kind == "message" =>ArchivedItem::Message(QuotedMessage::new(message.user, message.text, message.ts)),
            _ => ArchivedItem::Other { kind: item.kind },
        })
        .collect();

    let pages = response.paging.map(|p| p.pages).unwrap_or(page);

    Ok(ArchivePage { items, pages })
}

// Specific implementations.

/// Slack archive client implementation.
struct SlackArchiveClient {
    token: String,
    http: reqwest::Client,
    slack: Arc<FullClient>,
}

impl SlackArchiveClient {
    fn new(token: &str) -> Res<Self> {
        Ok(Self {
            token: token.to_string(),
            http: reqwest::Client::new(),
            slack: https_client()?,
        })
    }

    #[instrument(skip(self, query))]
    async fn list(&self, method: &str, query: &[(&str, &str)], page: u32) -> Res<ArchivePage> {
        let page_param = page.to_string();

        let body = self
            .http
            .get(format!("{SLACK_API}/{method}"))
            .bearer_auth(&self.token)
            .query(query)
            .query(&[("page", page_param.as_str()), ("count", PAGE_SIZE)])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| QuoteError::Transport(format!("`{method}` request failed: {e}")))?
            .bytes()
            .await
            .map_err(|e| QuoteError::Transport(format!("`{method}` body failed: {e}")))?;

        let result = parse_page(method, page, &body)?;

        debug!("`{}` page {} of {} has {} items.", method, page, result.pages, result.items.len());

        Ok(result)
    }
}

#[async_trait]
impl GenericArchiveClient for SlackArchiveClient {
    async fn fetch_directory(&self) -> Res<Directory> {
        let token = SlackApiToken::new(SlackApiTokenValue(self.token.clone()));
        fetch_directory(&self.slack, &token).await
    }

    async fn starred_page(&self, user_id: &str, page: u32) -> Res<ArchivePage> {
        self.list("stars.list", &[("user", user_id)], page).await
    }

    async fn pinned_page(&self, channel_id: &str, page: u32) -> Res<ArchivePage> {
        self.list("pins.list", &[("channel", channel_id)], page).await
    }
}

// Tests.
