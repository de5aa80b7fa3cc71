//! Core business logic for Bastion.
//!
//! # Modules
//!
//! - [`engine`] - The [`Engine`](engine::Engine) facade and the response envelope
//! - [`migration`] - Registry of migration steps, single-document and batch migration
//! - [`snapshot`] - Full-store snapshot export and snapshot encoding
//! - [`schema`] - Schema template library and seeding
//!
//! # Example
//!
//! ```rust,no_run
//! use bastion::adapters::sink::FileSystemSink;
//! use bastion::adapters::store::create_store;
//! use bastion::config::load_config;
//! use bastion::core::engine::Engine;
//! use bastion::domain::CollectionName;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("bastion.toml")?;
//! let store = create_store(&config.store).await?;
//! let sink = Arc::new(FileSystemSink::new(&config.export.output_dir));
//! let engine = Engine::new(store, sink, &config);
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let response = engine
//!     .migrate_all(&CollectionName::new("characters")?, shutdown_rx)
//!     .await;
//!
//! println!("{}", response.to_pretty_json()?);
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod migration;
pub mod schema;
pub mod snapshot;
pub use engine::{Engine, Response};
