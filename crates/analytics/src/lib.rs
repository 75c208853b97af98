//! In-memory aggregation of real-time ad auction lifecycle events into
//! normalized, nested auction records for an external analytics collector.
//!
//! The host auction framework delivers one call per lifecycle event to
//! [`AnalyticsAdapter::track`], synchronously and on a single thread.
//! Terminal conditions (auction end, bid won, late bid) hand finished
//! snapshots to the configured [`infra::collector::Collector`].

pub mod adapter;
pub mod config;
pub mod domain;
pub mod infra;
pub mod store;
pub mod time;

pub use {adapter::AnalyticsAdapter, config::Config};
