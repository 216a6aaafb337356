//! Slack implementation of the chat transport.
//!
//! Socket mode delivers push events, which are decoded into [`ChatEvent`]s and
//! queued for the event loop. The user directory is fetched with `users.list`
//! when the connection comes up.

use crate::base::{
    config::Config,
    types::{ChatEvent, Directory, DirectoryUser, IncomingMessage, QuoteError, QuotedMessage, Res, StarredItem, Void},
};
use anyhow::anyhow;
use async_trait::async_trait;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::{errors::SlackClientError, prelude::*};
use tracing::{error, info, instrument, warn};

use std::sync::Arc;

use super::{ChatClient, EventSender, GenericChatClient};

// Type aliases.

pub(crate) type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Slack API error codes that mean the token is no good.
const AUTH_ERROR_CODES: &[&str] = &["invalid_auth", "not_authed", "account_inactive", "token_revoked", "token_expired"];

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub async fn slack(config: &Config) -> Res<Self> {
        let client = SlackChatClient::new(config).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Helpers shared with the archive client.

/// Builds an HTTPS-only Slack client.
pub(crate) fn https_client() -> Res<Arc<FullClient>> {
    let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
    let connector = SlackClientHyperConnector::with_connector(https_connector);

    Ok(Arc::new(slack_morphism::SlackClient::new(connector)))
}

/// Reads the whole user directory, following `users.list` cursors.
#[instrument(skip_all)]
pub(crate) async fn fetch_directory(client: &FullClient, token: &SlackApiToken) -> Res<Directory> {
    let session = client.open_session(token);

    let mut users = Vec::new();
    let mut cursor: Option<SlackCursorId> = None;

    loop {
        let mut request = SlackApiUsersListRequest::new().with_limit(200);
        if let Some(cursor) = cursor.take() {
            request = request.with_cursor(cursor);
        }

        let response = session.users_list(&request).await.map_err(|e| QuoteError::Transport(format!("Failed to list users: {e}")))?;

        users.extend(response.members.into_iter().map(|member| DirectoryUser {
            id: member.id.0,
            name: member.name.unwrap_or_default(),
            is_bot: member.flags.is_bot.unwrap_or(false),
        }));

        match response.response_metadata.and_then(|m| m.next_cursor) {
            Some(next) if !next.0.is_empty() => cursor = Some(next),
            _ => break,
        }
    }

    Ok(Directory::new(users))
}

fn is_auth_error(err: &SlackClientError) -> bool {
    matches!(err, SlackClientError::ApiError(ae) if AUTH_ERROR_CODES.contains(&ae.code.as_str()))
}

// Structs.

/// User state for the slack socket client.
struct SlackUserState {
    events: EventSender,
}

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    pub app_token: SlackApiToken,
    pub bot_token: SlackApiToken,
    pub client: Arc<FullClient>,
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub async fn new(config: &Config) -> Res<Self> {
        // Initialize tokens.

        let app_token = SlackApiToken::new(SlackApiTokenValue(config.slack_app_token.clone()));
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let client = https_client()?;

        Ok(Self { app_token, bot_token, client })
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    async fn start(&self, events: EventSender) -> Void {
        // Check the bot token first; a rejected token halts the listener.

        let session = self.client.open_session(&self.bot_token);

        match session.auth_test().await {
            Ok(bot_user) => info!("Slack bot user ID: {}", bot_user.user_id.0),
            Err(err) if is_auth_error(&err) => {
                error!("Slack rejected the bot token: {}", err);
                let _ = events.send(ChatEvent::InvalidAuth);
                return Ok(());
            }
            Err(err) => return Err(QuoteError::Transport(format!("Failed to reach Slack: {err}")).into()),
        }

        // Capture the directory before any message can arrive.

        let directory = fetch_directory(&self.client, &self.bot_token).await?;
        info!("Fetched {} users from the directory.", directory.len());

        events.send(ChatEvent::Connected { directory }).map_err(|_| anyhow!("The event loop is gone."))?;

        // Initialize the socket mode listener.

        let socket_mode_callbacks = SlackSocketModeListenerCallbacks::new()
            .with_command_events(handle_command_event)
            .with_interaction_events(handle_interaction_event)
            .with_push_events(handle_push_event);

        let listener_environment = Arc::new(SlackClientEventsListenerEnvironment::new(self.client.clone()).with_user_state(SlackUserState { events: events.clone() }));

        let socket_mode_listener = Arc::new(SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment.clone(),
            socket_mode_callbacks,
        ));

        // Register an app token to listen for events.
        if let Err(err) = socket_mode_listener.listen_for(&self.app_token).await {
            if is_auth_error(&err) {
                error!("Slack rejected the app token: {}", err);
                let _ = events.send(ChatEvent::InvalidAuth);
                return Ok(());
            }

            let _ = events.send(ChatEvent::TransportError(err.to_string()));
            return Err(QuoteError::Transport(format!("Failed to open socket mode: {err}")).into());
        }

        // Serve until Ctrl-C; reconnects are handled by the listener.
        socket_mode_listener.serve().await;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn send_message(&self, channel_id: &str, text: &str) -> Void {
        let message = SlackMessageContent::new().with_text(text.to_string());

        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), message)
            .with_as_user(true)
            .with_unfurl_links(true);

        let session = self.client.open_session(&self.bot_token);

        let _ = session.chat_post_message(&request).await.map_err(|e| anyhow!("Failed to send message: {}", e))?;

        Ok(())
    }
}

// Event decoding.

/// Translates a Slack push event into the dispatcher's vocabulary.
fn decode_push_event(event: SlackEventCallbackBody) -> ChatEvent {
    match event {
        SlackEventCallbackBody::Message(message) => match message.origin.channel {
            Some(channel) => ChatEvent::Message(IncomingMessage {
                channel_id: channel.0,
                user: message.sender.user.map(|u| u.0),
                text: message.content.and_then(|c| c.text).unwrap_or_default(),
                timestamp: message.origin.ts.0,
                from_bot: message.sender.bot_id.is_some(),
            }),
            None => ChatEvent::Other { kind: "message without channel".to_string() },
        },
        SlackEventCallbackBody::StarAdded(star) => match star.item {
            SlackStarsItem::Message(item) => ChatEvent::StarAdded(StarredItem::Message {
                channel_id: item.channel.0,
                message: QuotedMessage::new(
                    item.message.sender.user.map(|u| u.0),
                    item.message.content.text.unwrap_or_default(),
                    item.message.origin.ts.0,
                ),
            }),
            other => ChatEvent::StarAdded(StarredItem::Other { kind: event_type(&other) }),
        },
        other => ChatEvent::Other { kind: event_type(&other) },
    }
}

/// The serde `type` tag of a Slack model, for logging.
fn event_type<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.get("type").and_then(|t| t.as_str()).map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}

// Socket mode listener callbacks for Slack.

/// Handles command events from Slack.
async fn handle_command_event(
    event: SlackCommandEvent,
    _client: Arc<SlackHyperClient>,
    _states: SlackClientEventsUserState,
) -> Result<SlackCommandEventResponse, Box<dyn std::error::Error + Send + Sync>> {
    warn!("[COMMAND] {:#?}", event);
    Ok(SlackCommandEventResponse::new(
        SlackMessageContent::new().with_text("Slash commands are not supported; say `quoth` instead.".into()),
    ))
}

/// Handles interaction events from Slack.
async fn handle_interaction_event(event: SlackInteractionEvent, _client: Arc<SlackHyperClient>, _states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    warn!("[INTERACTION] {:#?}", event);
    Ok(())
}

/// Handles push events from Slack by queueing them for the event loop.
#[instrument(skip_all)]
async fn handle_push_event(event_callback: SlackPushEventCallback, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let states = states.read().await;
    let user_state = states.get_user_state::<SlackUserState>().ok_or(anyhow!("Failed to get user state"))?;

    user_state.events.send(decode_push_event(event_callback.event)).map_err(|_| anyhow!("The event loop is gone."))?;

    Ok(())
}
