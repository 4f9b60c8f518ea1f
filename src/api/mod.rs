pub(crate) mod client;
pub(crate) mod types;
pub mod worker;

pub use client::ApiClient;
pub use types::{LapTime, Race, SessionResult, SessionType, TelemetrySample};

use crate::{LaptraceError, state::LapKey};

/// Read-only access to the race data API. Implemented over HTTP by
/// [`ApiClient`]; tests provide in-memory sources.
pub trait RaceDataSource {
    fn calendar(&self, year: i32) -> Result<Vec<Race>, LaptraceError>;

    fn session_results(
        &self,
        year: i32,
        race_name: &str,
        session: SessionType,
    ) -> Result<Vec<SessionResult>, LaptraceError>;

    fn lap_times(
        &self,
        year: i32,
        race_name: &str,
        session: SessionType,
        driver_number: &str,
    ) -> Result<Vec<LapTime>, LaptraceError>;

    fn telemetry(
        &self,
        year: i32,
        race_name: &str,
        session: SessionType,
        key: &LapKey,
    ) -> Result<Vec<TelemetrySample>, LaptraceError>;
}
