use std::{collections::HashMap, fmt, str::FromStr};

use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

// Errors.

/// Domain errors raised by the quote store and its collaborators.
///
/// "Nothing found" is not an error here: it is modelled by [`Option`] and
/// [`Removal::NotFound`] so callers are forced to turn it into a reply.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// Missing or invalid configuration; fatal at startup.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// The chat platform or archive API failed.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The chat platform rejected our credentials.
    #[error("the chat platform rejected the credentials")]
    InvalidAuth,
    /// The document store failed.
    #[error("store failure: {0}")]
    Store(String),
    /// A `forget` argument that is not a well-formed quote id.
    #[error("`{0}` is not a quote id")]
    InvalidId(String),
}

impl From<surrealdb::Error> for QuoteError {
    fn from(err: surrealdb::Error) -> Self {
        QuoteError::Store(err.to_string())
    }
}

// Quotes.

/// Identifier of a stored quote.
///
/// Twelve bytes: four bytes of big-endian seconds since the epoch followed by
/// eight random bytes. Printed as 24 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuoteId([u8; 12]);

impl QuoteId {
    /// Generates a fresh id. Only the store adapter should call this.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 12];
        let seconds = chrono::Utc::now().timestamp() as u32;

        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        rand::thread_rng().fill_bytes(&mut bytes[4..]);

        Self(bytes)
    }
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }

        Ok(())
    }
}

impl FromStr for QuoteId {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 24 || !s.is_ascii() {
            return Err(QuoteError::InvalidId(s.to_string()));
        }

        let mut bytes = [0u8; 12];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).map_err(|_| QuoteError::InvalidId(s.to_string()))?;
        }

        Ok(Self(bytes))
    }
}

/// The saved content of a chat message, before it has an id.
///
/// Two messages are the same quote iff all three fields match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuotedMessage {
    /// Author id; absent for some integration/bot posts.
    pub user: Option<String>,
    /// Raw message body, markup included.
    pub text: String,
    /// Platform timestamp, carried through untouched.
    pub timestamp: String,
}

impl QuotedMessage {
    pub fn new(user: Option<String>, text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            user,
            text: text.into(),
            timestamp: timestamp.into(),
        }
    }
}

/// A stored quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub id: QuoteId,
    pub message: QuotedMessage,
}

/// Result of an idempotent insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Inserted,
    AlreadyPresent,
}

/// Result of a delete-by-id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Deleted,
    NotFound,
}

// Directory.

/// A chat user as known at connection time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_bot: bool,
}

/// Snapshot of the workspace's users, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    users: HashMap<String, DirectoryUser>,
}

impl Directory {
    pub fn new(users: impl IntoIterator<Item = DirectoryUser>) -> Self {
        Self {
            users: users.into_iter().map(|u| (u.id.clone(), u)).collect(),
        }
    }

    pub fn user_by_id(&self, id: &str) -> Option<&DirectoryUser> {
        self.users.get(id)
    }

    /// Case-insensitive lookup by user name.
    pub fn user_by_name(&self, name: &str) -> Option<&DirectoryUser> {
        let name = name.to_lowercase();
        self.users.values().find(|u| u.name.to_lowercase() == name)
    }

    /// Users ordered by id, so crawls visit them deterministically.
    pub fn users(&self) -> Vec<&DirectoryUser> {
        let mut users: Vec<_> = self.users.values().collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        users
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

// Events.

/// A message posted to a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub channel_id: String,
    pub user: Option<String>,
    pub text: String,
    pub timestamp: String,
    /// Set when the platform marks the post as coming from a bot integration.
    pub from_bot: bool,
}

/// The payload of a "star added" event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StarredItem {
    Message { channel_id: String, message: QuotedMessage },
    Other { kind: String },
}

/// Everything the transport delivers to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// The link is up; carries the full user directory.
    Connected { directory: Directory },
    Message(IncomingMessage),
    StarAdded(StarredItem),
    /// A non-fatal transport problem.
    TransportError(String),
    /// The credentials were rejected; the listener must stop.
    InvalidAuth,
    /// Presence, latency, and anything else the dispatcher has no use for.
    Other { kind: String },
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_id_prints_as_24_hex_chars() {
        let id = QuoteId::generate();
        let printed = id.to_string();

        assert_eq!(printed.len(), 24);
        assert!(printed.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(printed.parse::<QuoteId>().unwrap(), id);
    }

    #[test]
    fn quote_id_parse_is_case_insensitive() {
        let lower: QuoteId = "5f2b1e7c9a0d3f4e6b8c1a2d".parse().unwrap();
        let upper: QuoteId = "5F2B1E7C9A0D3F4E6B8C1A2D".parse().unwrap();

        assert_eq!(lower, upper);
        assert_eq!(upper.to_string(), "5f2b1e7c9a0d3f4e6b8c1a2d");
    }

    #[test]
    fn quote_id_rejects_malformed_input() {
        for bad in ["", "short", "5f2b1e7c9a0d3f4e6b8c1a2", "5f2b1e7c9a0d3f4e6b8c1a2d0", "zzzzzzzzzzzzzzzzzzzzzzzz", "5f2b1e7c9a0d3f4e6b8c1aé"] {
            assert!(matches!(bad.parse::<QuoteId>(), Err(QuoteError::InvalidId(_))), "accepted `{bad}`");
        }
    }

    #[test]
    fn generated_ids_are_distinct() {
        let a = QuoteId::generate();
        let b = QuoteId::generate();

        assert_ne!(a, b);
    }

    #[test]
    fn directory_lookups() {
        let directory = Directory::new([
            DirectoryUser { id: "U2".into(), name: "bob".into(), is_bot: false },
            DirectoryUser { id: "U1".into(), name: "Alice".into(), is_bot: false },
            DirectoryUser { id: "B1".into(), name: "quotebot".into(), is_bot: true },
        ]);

        assert_eq!(directory.len(), 3);
        assert_eq!(directory.user_by_id("U1").map(|u| u.name.as_str()), Some("Alice"));
        assert_eq!(directory.user_by_name("alice").map(|u| u.id.as_str()), Some("U1"));
        assert_eq!(directory.user_by_name("BOB").map(|u| u.id.as_str()), Some("U2"));
        assert!(directory.user_by_name("carol").is_none());
        assert!(directory.user_by_id("U9").is_none());

        let ids: Vec<_> = directory.users().iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["B1", "U1", "U2"]);
    }
}
