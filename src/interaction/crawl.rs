//! One-shot import of already starred and pinned messages.
//!
//! Safe to re-run: every message goes through the idempotent insert, so a crawl
//! that died halfway is fixed by crawling again from scratch.

use tracing::{debug, error, info, instrument};

use crate::{
    base::types::{Insertion, Res, Void},
    service::{
        archive::{ArchiveClient, ArchivePage, ArchivedItem},
        db::DbClient,
    },
};

/// Tally of one crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub users_scanned: usize,
    pub messages_seen: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub store_failures: usize,
}

/// Imports every non-bot user's starred messages, then the channel's pins.
///
/// A failed fetch aborts the crawl; a failed insert is logged and counted.
#[instrument(skip(archive, db))]
pub async fn crawl(archive: &ArchiveClient, db: &DbClient, channel_id: &str) -> Res<CrawlReport> {
    let directory = archive.fetch_directory().await?;
    let mut report = CrawlReport::default();

    for user in directory.users() {
        if user.is_bot {
            debug!("Skipping bot `{}`.", user.name);
            continue;
        }

        info!("Crawling stars of `{}` ({}).", user.name, user.id);
        report.users_scanned += 1;

        drain_pages(move |page| archive.starred_page(&user.id, page), db, &mut report).await?;
    }

    info!("Crawling pins of `{}`.", channel_id);
    drain_pages(move |page| archive.pinned_page(channel_id, page), db, &mut report).await?;

    info!(?report, "Crawl finished.");

    Ok(report)
}

/// Walks pages 1..=pages, re-reading the total from every response.
async fn drain_pages<F, Fut>(mut fetch: F, db: &DbClient, report: &mut CrawlReport) -> Void
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Res<ArchivePage>>,
{
    let mut page = 1;
    let mut pages = 1;

    while page <= pages {
        let batch = fetch(page).await?;

        for item in batch.items {
            let ArchivedItem::Message(message) = item else {
                continue;
            };

            report.messages_seen += 1;

            match db.add_if_absent(&message).await {
                Ok(Insertion::Inserted) => report.inserted += 1,
                Ok(Insertion::AlreadyPresent) => report.duplicates += 1,
                Err(err) => {
                    error!("Failed to save message from `{}`: {}", message.timestamp, err);
                    report.store_failures += 1;
                }
            }
        }

        pages = batch.pages;
        page += 1;
    }

    Ok(())
}
