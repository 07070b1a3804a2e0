//! Domain logic
//!
//! This module contains pure conversation-domain types and functions:
//! - Message records and identifiers
//! - The ordered message window
//! - Batch continuity filtering

pub mod filter;
pub mod message;
pub mod window;
