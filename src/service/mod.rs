//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for various services used by slack-quoter:
//! - Chat services (e.g., Slack socket mode)
//! - Archive services (e.g., Slack starred and pinned listings)
//! - Database services (e.g., SurrealDB)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod archive;
pub mod chat;
pub mod db;
