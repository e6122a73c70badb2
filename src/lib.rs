//! LuxWS exporter - Prometheus exporter for Luxtronik 2 heat pump
//! controllers.
//!
//! Luxtronik 2 controllers expose their web interface data over "LuxWS", a
//! text-framed, half-duplex command/response protocol carried over a
//! persistent websocket. This library speaks that protocol, resolves the
//! controller's content tree and derives validated metric samples from it.
//!
//! # Architecture
//!
//! A scrape flows bottom-up through three layers:
//!
//! - **Transport**: owns the websocket, runs a single receiver task and
//!   serializes round trips (one in flight at a time).
//! - **Client & trees**: `LOGIN` yields the navigation tree, `GET` yields
//!   a content page; both are parsed once and immutable.
//! - **Pipeline**: a fixed list of isolated extraction steps turns the
//!   content tree into samples; failures aggregate without discarding the
//!   samples of unaffected steps.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use luxws_exporter::collector::{Collector, CollectorOpts};
//! use luxws_exporter::{lang, metrics};
//!
//! #[tokio::main]
//! async fn main() -> luxws_exporter::Result<()> {
//!     let collector = Collector::new(CollectorOpts {
//!         address: "192.0.2.1:8214".to_string(),
//!         password: String::new(),
//!         http_address: None,
//!         terms: lang::lookup("de")?,
//!         timezone: chrono::FixedOffset::east_opt(3600).unwrap(),
//!         timeout: Duration::from_secs(60),
//!         max_concurrent: 3,
//!     });
//!
//!     let scrape = collector.scrape().await;
//!     println!("{}", metrics::render(&scrape)?);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | High-level LuxWS client: `LOGIN`, `GET` |
//! | [`collector`] | Scrape orchestration and derivation pipeline |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`lang`] | Controller terminology tables and parsing |
//! | [`metrics`] | Prometheus text exposition rendering |
//! | [`protocol`] | Navigation and content tree models |
//! | [`transport`] | Websocket transport and round-trip engine |

// ============================================================================
// Modules
// ============================================================================

/// High-level LuxWS client.
pub mod client;

/// Scrape orchestration and metric derivation.
pub mod collector;

/// Error types and result aliases.
pub mod error;

/// Controller terminology tables and locale-specific parsing.
pub mod lang;

/// Prometheus exposition rendering.
pub mod metrics;

/// Navigation and content tree models.
pub mod protocol;

/// Websocket transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::Client;

// Collector types
pub use collector::{Collector, CollectorOpts, Sample, Scrape};

// Error types
pub use error::{Error, Result};

// Terminology
pub use lang::Terminology;

// Tree types
pub use protocol::{ContentItem, ContentRoot, NavItem, NavRoot};

// Transport types
pub use transport::Transport;
