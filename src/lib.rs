//! # Wiremud — a multi-user text world over plain TCP
//!
//! Wiremud is a small MUD server: players connect with any line-based
//! TCP client (netcat, telnet), create a character, and walk a shared
//! persistent world of rooms, exits and doors while talking to each
//! other in real time.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use wiremud::config::Config;
//! use wiremud::mud::MudServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let server = MudServer::new(config)?;
//!     server.run().await
//! }
//! ```
//!
//! ## Module organization
//!
//! - [`mud`] - sessions, verb parsing, the command catalog and the TCP server
//! - [`world`] - users, rooms, exits, doors and their sled-backed store
//! - [`config`] - TOML configuration loading and the starter template
//! - [`validation`] - username rules applied at account creation
//! - [`logutil`] - single-line escaping for logged player input
//! - [`metrics`] - process-wide counters
//!
//! ## Concurrency notes
//!
//! Each connection runs in its own tokio task. The session registry is
//! the one shared mutable structure; its mutex is held only for list
//! operations, never across an await. World records use a
//! read-mutate-save cycle per command with last-write-wins semantics —
//! there is deliberately no per-entity locking (see DESIGN.md).

pub mod config;
pub mod logutil;
pub mod metrics;
pub mod mud;
pub mod validation;
pub mod world;
