//! Event handling and user interactions for slack-quoter.
//!
//! This module provides functionality for handling chat events and batch imports:
//! - Dispatching live events through a per-connection session
//! - Answering `quoth` and `forget` commands
//! - Saving starred messages as they happen
//! - Crawling previously starred and pinned messages

pub mod crawl;
pub mod quote_command;
pub mod session;
pub mod star_storage;
