//! Runtime services and shared state for slack-quoter.

use tokio::sync::mpsc;
use tracing::{Instrument, error, info, instrument};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction::{
        crawl::{self, CrawlReport},
        session::Session,
    },
    service::{archive::ArchiveClient, chat::ChatClient, db::DbClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the database client, chat client, and configuration.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The database client instance.
    pub db: DbClient,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance for the live listener.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        config.validate_for_listen()?;

        // Initialize the database.
        let db = DbClient::surreal(&config).await?;

        // Initialize the chat client.
        let chat = ChatClient::slack(&config).await?;

        Ok(Self { config, db, chat })
    }

    /// Runs the listener until the connection closes or the credentials are rejected.
    ///
    /// The connection task feeds the queue; this task drains it, one event at a time.
    pub async fn start(&self) -> Void {
        let (sender, receiver) = mpsc::unbounded_channel();

        let chat = self.chat.clone();
        let connection = tokio::spawn(async move { chat.start(sender).await }.in_current_span());

        let mut session = Session::new(self.config.channel_id.clone(), self.db.clone(), self.chat.clone());

        if let Err(err) = session.run(receiver).await {
            connection.abort();
            return Err(err);
        }

        connection.await?
    }
}

/// Runs the one-shot import of starred and pinned messages.
#[instrument(skip_all)]
pub async fn crawl(config: &Config) -> Res<CrawlReport> {
    let token = config.validate_for_crawl()?;

    let db = DbClient::surreal(config).await?;
    let archive = ArchiveClient::slack(token)?;

    let result = crawl::crawl(&archive, &db, &config.channel_id).await;

    match &result {
        Ok(report) => info!("Imported {} new quotes ({} already saved).", report.inserted, report.duplicates),
        Err(err) => error!("Crawl aborted: {}", err),
    }

    result
}
