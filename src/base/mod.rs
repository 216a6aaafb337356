//! Core components, types, and utilities for slack-quoter.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - The chat command grammar.
//! - Reply formatting.
//! - Common types and result handling.

pub mod command;
pub mod config;
pub mod format;
pub mod types;
