//! Core domain logic for pitwall.
//!
//! This crate contains the fundamental types and logic for:
//! - Stint resolution: reconstructing tire stints from raw lap records
//! - Degradation estimation: the lap-time trend within one stint
//! - Analysis assembly: per-stint summaries and session-level totals
//!
//! Everything here is pure and synchronous; fetching lives in
//! `pitwall-openf1`.

pub mod analysis;
pub mod degradation;
pub mod record;
pub mod resolve;
pub mod types;

pub use analysis::{ResolvedStint, StintAnalysis, build_analysis};
pub use degradation::degradation_rate;
pub use record::{Driver, Lap, Session, StintRecord};
pub use resolve::{LapGroup, Resolution, ResolveError, ResolverConfig, StintLabel, resolve};
pub use types::{DriverNumber, ResolutionTier, SessionKey, ValidationError};
