pub mod slack;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use crate::base::types::{ChatEvent, Void};

// Types.

/// The ordered, unbounded queue the transport feeds and the event loop drains.
pub type EventSender = UnboundedSender<ChatEvent>;

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait defines the core functionality for interacting with chat platforms
/// like Slack. Implementing this trait allows different chat services to be used
/// with slack-quoter.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Start the chat client listener.
    ///
    /// Keeps the connection alive and forwards every decoded event to `events`,
    /// starting with [`ChatEvent::Connected`]. Returns when the connection is
    /// shut down; rejected credentials are reported as [`ChatEvent::InvalidAuth`].
    async fn start(&self, events: EventSender) -> Void;

    /// Post a message to a channel.
    ///
    /// Fire-and-forget: success only means the platform accepted the request.
    async fn send_message(&self, channel_id: &str, text: &str) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
