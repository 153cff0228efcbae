//! # floorboard-source: Remote Source Boundary for Floorboard
//!
//! The collaborator boundary between the pure metrics engine and the
//! remote line-of-business system. This crate owns the typed fetch
//! surface ([`source::RecordSource`]), snapshot assembly with concurrent
//! fan-out ([`source::DashboardSnapshot`]), explicit configuration
//! ([`config::SourceConfig`], always passed by value, never global), and
//! the documented empty-default fallback for failed fetches.
//!
//! What this crate deliberately does NOT contain: the remote query
//! language, transport, authentication and retry live behind the
//! `RecordSource` trait in its implementations. The aggregation engine
//! in `floorboard-core` never sees any of it.
//!
//! ## Modules
//!
//! - [`source`] - `RecordSource` trait, snapshot fan-out, `or_empty`
//! - [`config`] - TOML + environment configuration
//! - [`memory`] - In-memory source for tests and offline demos
//! - [`error`] - `FetchError` / `FetchResult`

pub mod config;
pub mod error;
pub mod memory;
pub mod source;

pub use config::SourceConfig;
pub use error::{FetchError, FetchResult};
pub use memory::InMemorySource;
pub use source::{or_empty, DashboardSnapshot, RecordSource};
