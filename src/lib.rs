// Bastion - Batch maintenance for the Fatins document store
// Copyright (c) 2025 Fatins Contributors
// Licensed under the MIT License

//! # Bastion - batch maintenance for a Firestore document store
//!
//! Bastion runs the maintenance jobs of the Fatins campaign store: it
//! migrates documents to new field layouts, exports the whole store to a
//! snapshot file, and seeds the canonical item schema templates.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Migration, snapshot export, schema seeding and the [`core::Engine`] facade
//! - [`adapters`] - Document stores (Firestore REST, local file, memory) and artifact sinks
//! - [`domain`] - Document model, typed coordinates and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bastion::adapters::sink::FileSystemSink;
//! use bastion::adapters::store::create_store;
//! use bastion::config::load_config;
//! use bastion::core::Engine;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("bastion.toml")?;
//!     let store = create_store(&config.store).await?;
//!     let sink = Arc::new(FileSystemSink::new(&config.export.output_dir));
//!     let engine = Engine::new(store, sink, &config);
//!
//!     let response = engine.export_all().await;
//!     println!("{}", response.to_pretty_json()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Responses
//!
//! Engine operations never return a bare error. Each returns a
//! [`core::Response`] that serializes as `{"status":"success","data":...}` or
//! `{"status":"error","kind":...,"message":...}`.
//!
//! ## Concurrent writers
//!
//! Migrations read a document and overwrite it without a precondition. A
//! write made by another client between the two is lost.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
