//! # Prokat
//!
//! Backend for a metal products storefront, usable both as a standalone
//! binary and as a library.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use prokat::config::ServerConfig;
//! use prokat::notify::{Notifier, TelegramConfig};
//! use prokat::server::{AppState, create_router};
//!
//! let config = ServerConfig::default();
//! let notifier = Notifier::spawn(TelegramConfig::from_env(&config.data_dir));
//! let state = Arc::new(AppState::open(&config, notifier).unwrap());
//! let router = create_router(state);
//! // Serve with axum...
//! ```

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod notify;
pub mod server;
pub mod store;
pub mod types;
