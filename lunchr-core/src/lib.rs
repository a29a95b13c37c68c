//! Core of the lunchr daily lunch-menu aggregator.
//!
//! Sources are registered as [`SourceDescriptor`]s, collected concurrently by
//! the [`Orchestrator`], normalized and cached per day by the [`LunchService`].

/// Which client addresses count towards the access statistics.
pub mod access;
/// Engine settings and their defaults.
pub mod config;
/// Domain models and identifiers shared by all sources.
pub mod model;
/// Text and price cleanup applied to every scraped item.
pub mod normalize;
/// Concurrent collection of all sources.
pub mod orchestrator;
/// The parse-routine contract.
pub mod ports;
/// The set of known sources.
pub mod registry;
/// High-level service facade used by clients.
pub mod service;
/// Cache store backends.
pub mod store;

pub use access::*;
pub use config::*;
pub use model::*;
pub use orchestrator::*;
pub use ports::*;
pub use registry::*;
pub use service::*;
pub use store::*;
