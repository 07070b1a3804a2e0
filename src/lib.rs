//! # Backscroll - Chat History Pagination Engine
//!
//! An infinite-scroll pagination engine for chat history windows, built around
//! a synchronous core and an async driver. The engine keeps a contiguous window
//! of messages, decides when scrolling should trigger a fetch, and folds fetch
//! results back into the window without ever blocking on I/O itself.
//!
//! ## Architecture Overview
//!
//! This crate separates deciding from doing:
//!
//! - **Domain** (`domain`): Messages, the ordered window, and batch filtering
//! - **Engine** (`engine`): The synchronous [`Paginator`] core that turns
//!   scroll positions into fetch descriptors and folds completions back in
//! - **Store** (`store`): The async [`MessageStore`](store::MessageStore)
//!   contract plus an in-memory implementation for tests and demos
//! - **Driver** (`driver`): The async session loop that executes fetch
//!   descriptors against a store and applies effects to a render surface
//! - **Surface** (`surface`): The render-side contract the driver talks to
//!
//! ## Example Usage
//!
//! ```rust
//! use backscroll::domain::filter::Direction;
//! use backscroll::domain::message::{AuthorId, Message, MessageId};
//! use backscroll::engine::{Paginator, PagingConfig};
//!
//! // Seed a window with the newest page of a conversation
//! let messages: Vec<Message> = (81..=100)
//!     .map(|n| Message::new(MessageId(n), AuthorId(n % 4), 1_700_000_000 + n as i64, format!("message {n}")))
//!     .collect();
//! let mut paginator = Paginator::new(PagingConfig::default());
//! paginator.install_seed(messages, Some((MessageId(1), MessageId(100))));
//!
//! // Older history remains, the newest edge is final
//! assert_eq!(paginator.window().len(), 20);
//! assert!(paginator.has_more(Direction::Older));
//! assert!(!paginator.has_more(Direction::Newer));
//!
//! // The engine hands back a descriptor; the caller runs the actual fetch
//! let request = paginator.request_fetch(Direction::Older).unwrap().unwrap();
//! assert_eq!(request.anchor(), Some(MessageId(81)));
//! assert_eq!(request.limit(), 20);
//! ```
//!
//! ## Key Features
//!
//! - **Synchronous Core**: Every pagination decision is a pure method call,
//!   testable without a runtime
//! - **Single In-Flight Fetch**: Concurrent requests are rejected, never queued
//! - **Contiguity Tracking**: Overlapping batches detect exhausted directions
//! - **Stale Completion Handling**: Results from before a window jump are dropped
//!
//! ## Modules
//!
//! - [`domain`] - Message types, the ordered window, and batch filtering
//! - [`engine`] - The synchronous pagination core
//! - [`store`] - Async message store contract and in-memory store
//! - [`driver`] - Async session loop wiring store, engine, and surface
//! - [`surface`] - Render surface contract and simulated implementation
//! - [`config`] - Configuration management

#![deny(warnings)]
#![allow(dead_code)]

// Core pagination modules
pub mod domain;
pub mod engine;
pub mod store;

// Session plumbing
pub mod driver;
pub mod surface;

// Application shell
pub mod cli;
pub mod config;
pub mod utils;

// Re-exports for convenience
pub use domain::filter::Direction;
pub use domain::message::{AuthorId, Message, MessageId};
pub use domain::window::MessageWindow;
pub use engine::{Paginator, PagingConfig};
pub use store::{InMemoryStore, MessageStore};

/// Result type used throughout the library
pub type Result<T> = color_eyre::eyre::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
