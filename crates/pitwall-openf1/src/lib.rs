//! OpenF1 timing-source integration for pitwall.
//!
//! Provides the HTTP client with per-instance response memoization and the
//! analyzer that drives a full tire-strategy analysis:
//! fetch driver identity, laps and declared stints concurrently, then run
//! the pure resolution and degradation pipeline from `pitwall-core`.

mod analyzer;
mod client;

pub use analyzer::{AnalysisError, Analyzer, TimingSource};
pub use client::{Client, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, FetchError};
