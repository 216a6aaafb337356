//! This module handles saving messages that get starred while the bot is listening.

use tracing::{debug, info, instrument};

use crate::{
    base::types::{Insertion, StarredItem, Void},
    service::db::DbClient,
};

/// Handles a "star added" event.
///
/// Messages starred in the watched channel are saved silently; everything
/// else is ignored.
#[instrument(skip_all)]
pub async fn handle_star_added(item: StarredItem, watched_channel_id: &str, db: &DbClient) -> Void {
    match item {
        StarredItem::Message { channel_id, message } if channel_id == watched_channel_id => match db.add_if_absent(&message).await? {
            Insertion::Inserted => info!("Saved starred message from `{}`.", message.timestamp),
            Insertion::AlreadyPresent => debug!("Starred message from `{}` is already saved.", message.timestamp),
        },
        StarredItem::Message { channel_id, .. } => debug!("Ignoring star in unwatched channel `{}`.", channel_id),
        StarredItem::Other { kind } => debug!("Ignoring star on a `{}`.", kind),
    }

    Ok(())
}
