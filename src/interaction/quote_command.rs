//! Turns `quoth` and `forget` commands into replies.

use tracing::{info, instrument, warn};

use crate::{
    base::{
        format::{self, NO_QUOTES, UNKNOWN_AUTHOR},
        types::{Directory, IncomingMessage, QuoteId, Removal, Res},
    },
    service::db::DbClient,
};

/// Whether `message` was posted by a bot, either by the platform's own flag
/// or by the sender's directory entry.
pub fn is_bot_sender(directory: &Directory, message: &IncomingMessage) -> bool {
    message.from_bot || message.user.as_deref().and_then(|id| directory.user_by_id(id)).is_some_and(|user| user.is_bot)
}

/// Picks a random quote, by `author` if the directory knows that name.
///
/// An unknown name falls back to quoting anyone.
#[instrument(skip(directory, db))]
pub async fn recall(directory: &Directory, author: Option<&str>, db: &DbClient) -> Res<String> {
    let filter = match author {
        Some(name) => match directory.user_by_name(name) {
            Some(user) => Some(user.id.as_str()),
            None => {
                info!("No user named `{}`; quoting anyone instead.", name);
                None
            }
        },
        None => None,
    };

    let Some(quote) = db.random_quote(filter).await? else {
        return Ok(NO_QUOTES.to_string());
    };

    let name = quote
        .message
        .user
        .as_deref()
        .and_then(|id| directory.user_by_id(id))
        .map(|user| user.name.as_str())
        .unwrap_or(UNKNOWN_AUTHOR);

    Ok(format::quote_reply(name, &quote.id, &quote.message.text))
}

/// Deletes the quote with the given id; malformed ids never reach the store.
#[instrument(skip(db))]
pub async fn forget(id: &str, db: &DbClient) -> Res<String> {
    let quote_id: QuoteId = match id.parse() {
        Ok(quote_id) => quote_id,
        Err(err) => {
            warn!("Rejected forget: {}", err);
            return Ok(format::invalid_id_reply(id));
        }
    };

    let reply = match db.delete_by_id(&quote_id).await? {
        Removal::Deleted => {
            info!("Deleted quote `{}`.", quote_id);
            format::deleted_reply(id)
        }
        Removal::NotFound => format::not_found_reply(id),
    };

    Ok(reply)
}
