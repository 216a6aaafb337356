//! The live dispatcher: one session per connection, one event at a time.

use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    base::{
        command::Command,
        types::{ChatEvent, Directory, IncomingMessage, QuoteError, Void},
    },
    interaction::{quote_command, star_storage},
    service::{chat::ChatClient, db::DbClient},
};

/// Where the session is in its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Connected or connecting, but no directory yet; commands are dropped.
    AwaitingRoster,
    Ready(Directory),
    /// Credentials were rejected. Terminal.
    Halted,
}

/// What the event loop should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Halt,
}

/// Everything an event handler needs, threaded through explicitly.
pub struct Session {
    channel_id: String,
    db: DbClient,
    chat: ChatClient,
    state: SessionState,
}

impl Session {
    pub fn new(channel_id: impl Into<String>, db: DbClient, chat: ChatClient) -> Self {
        Self {
            channel_id: channel_id.into(),
            db,
            chat,
            state: SessionState::AwaitingRoster,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Drains `events` in order until the stream closes or the session halts.
    ///
    /// Halting is an error, so the process exits non-zero.
    pub async fn run(&mut self, mut events: UnboundedReceiver<ChatEvent>) -> Void {
        while let Some(event) = events.recv().await {
            if self.handle_event(event).await == Flow::Halt {
                return Err(QuoteError::InvalidAuth.into());
            }
        }

        info!("Event stream closed.");

        Ok(())
    }

    /// Handles one event. Failures are logged and scoped to this event.
    #[instrument(skip_all)]
    pub async fn handle_event(&mut self, event: ChatEvent) -> Flow {
        if self.state == SessionState::Halted {
            warn!("Dropping event after halt.");
            return Flow::Halt;
        }

        match event {
            ChatEvent::Connected { directory } => {
                info!("Connected; the directory has {} users.", directory.len());
                self.state = SessionState::Ready(directory);
            }
            ChatEvent::Message(message) => {
                if let Err(err) = self.handle_message(message).await {
                    error!("Error while handling: {}", err);
                }
            }
            ChatEvent::StarAdded(item) => {
                if let Err(err) = star_storage::handle_star_added(item, &self.channel_id, &self.db).await {
                    error!("Error while handling: {}", err);
                }
            }
            ChatEvent::TransportError(detail) => error!("Transport error: {}", detail),
            ChatEvent::InvalidAuth => {
                error!("Invalid credentials; halting.");
                self.state = SessionState::Halted;
                return Flow::Halt;
            }
            ChatEvent::Other { kind } => debug!("Ignoring `{}` event.", kind),
        }

        Flow::Continue
    }

    async fn handle_message(&self, message: IncomingMessage) -> Void {
        if message.channel_id != self.channel_id {
            return Ok(());
        }

        let command = Command::parse(&message.text);
        if command == Command::NoCommand {
            return Ok(());
        }

        let SessionState::Ready(directory) = &self.state else {
            warn!("Ignoring a command that arrived before the directory.");
            return Ok(());
        };

        let reply = match command {
            Command::Recall { author } => {
                if quote_command::is_bot_sender(directory, &message) {
                    debug!("Ignoring recall from a bot.");
                    return Ok(());
                }

                quote_command::recall(directory, author.as_deref(), &self.db).await?
            }
            Command::Forget { id } => quote_command::forget(&id, &self.db).await?,
            Command::NoCommand => return Ok(()),
        };

        self.chat.send_message(&self.channel_id, &reply).await
    }
}
