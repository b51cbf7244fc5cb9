//! The analysis driver: fetch, resolve, estimate, assemble.

use thiserror::Error;

use pitwall_core::analysis::{StintAnalysis, build_analysis};
use pitwall_core::record::{Driver, Lap, StintRecord};
use pitwall_core::resolve::{ResolveError, ResolverConfig, resolve};
use pitwall_core::types::{DriverNumber, SessionKey};

use crate::client::{Client, FetchError};

/// The three read endpoints one analysis needs.
///
/// Abstracting the source lets the analyzer run against an in-memory fake in
/// tests; [`Client`] is the production implementation.
#[expect(
    async_fn_in_trait,
    reason = "the analyzer is generic over the source; Send futures are not required"
)]
pub trait TimingSource {
    /// Drivers in a session, optionally narrowed to one car number.
    async fn drivers(
        &self,
        session: SessionKey,
        driver: Option<DriverNumber>,
    ) -> Result<Vec<Driver>, FetchError>;

    /// Completed laps in a session, optionally narrowed to one car number.
    async fn laps(
        &self,
        session: SessionKey,
        driver: Option<DriverNumber>,
    ) -> Result<Vec<Lap>, FetchError>;

    /// Declared stints in a session, optionally narrowed to one car number.
    async fn stints(
        &self,
        session: SessionKey,
        driver: Option<DriverNumber>,
    ) -> Result<Vec<StintRecord>, FetchError>;
}

impl TimingSource for Client {
    async fn drivers(
        &self,
        session: SessionKey,
        driver: Option<DriverNumber>,
    ) -> Result<Vec<Driver>, FetchError> {
        self.fetch("drivers", session_query(session, driver)).await
    }

    async fn laps(
        &self,
        session: SessionKey,
        driver: Option<DriverNumber>,
    ) -> Result<Vec<Lap>, FetchError> {
        self.fetch("laps", session_query(session, driver)).await
    }

    async fn stints(
        &self,
        session: SessionKey,
        driver: Option<DriverNumber>,
    ) -> Result<Vec<StintRecord>, FetchError> {
        self.fetch("stints", session_query(session, driver)).await
    }
}

fn session_query(
    session: SessionKey,
    driver: Option<DriverNumber>,
) -> Vec<(&'static str, String)> {
    let mut query = vec![("session_key", session.to_string())];
    if let Some(driver) = driver {
        query.push(("driver_number", driver.to_string()));
    }
    query
}

/// Errors that abort an analysis.
///
/// All variants are terminal; the analyzer never retries. Retry policy, if
/// any, belongs to the caller.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A fetch failed; the inner error names the endpoint.
    #[error(transparent)]
    Source(#[from] FetchError),

    /// The session has no entry for the requested car number.
    #[error("driver #{driver} not found in session {session}")]
    DriverNotFound {
        session: SessionKey,
        driver: DriverNumber,
    },

    /// The driver has no laps with a usable time in this session.
    #[error("no valid lap data for driver #{driver} in session {session}")]
    NoLapData {
        session: SessionKey,
        driver: DriverNumber,
    },
}

/// Drives one full tire-strategy analysis.
///
/// Stateless across calls apart from the source's response cache.
#[derive(Debug)]
pub struct Analyzer<S> {
    source: S,
    config: ResolverConfig,
}

impl<S: TimingSource> Analyzer<S> {
    /// Creates an analyzer over the given source with default resolution
    /// settings.
    pub fn new(source: S) -> Self {
        Self {
            source,
            config: ResolverConfig::default(),
        }
    }

    /// Replaces the resolver configuration.
    #[must_use]
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Analyze one driver's tire strategy in one session.
    ///
    /// The three fetches are issued concurrently and must all complete
    /// before resolution starts; any fetch failure aborts the analysis.
    /// Absent stint records are tolerated and simply force the lower
    /// resolution strategies.
    pub async fn analyze(
        &self,
        session: SessionKey,
        driver: DriverNumber,
    ) -> Result<StintAnalysis, AnalysisError> {
        let (drivers, laps, stints) = tokio::try_join!(
            self.source.drivers(session, Some(driver)),
            self.source.laps(session, Some(driver)),
            self.source.stints(session, Some(driver)),
        )?;

        let Some(driver_info) = drivers.first() else {
            return Err(AnalysisError::DriverNotFound { session, driver });
        };
        if laps.is_empty() {
            return Err(AnalysisError::NoLapData { session, driver });
        }

        let resolution = resolve(&laps, &stints, &self.config).map_err(|error| match error {
            ResolveError::NoValidLaps => AnalysisError::NoLapData { session, driver },
        })?;
        tracing::debug!(
            tier = %resolution.tier,
            groups = resolution.groups.len(),
            "stints resolved"
        );

        Ok(build_analysis(driver_info, session, driver, resolution))
    }
}
