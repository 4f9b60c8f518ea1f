use crate::{
    LaptraceError,
    api::{LapTime, Race, RaceDataSource, SessionResult, SessionType, TelemetrySample},
};

use super::LapKey;

/// Which part of the selection a request belongs to. Each scope has its own
/// generation counter in [`super::DashboardState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    Calendar,
    Results,
    LapTimes,
    Telemetry,
}

/// Identifies the selection a request was issued for. A response is applied
/// only while its token's generation is still the current one for its scope.
/// `sequence` is unique per request, so a lap or driver that was deselected
/// and selected again only accepts the response to its latest request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestToken {
    pub scope: Scope,
    pub generation: u64,
    pub sequence: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FetchKind {
    Calendar {
        year: i32,
    },
    SessionResults {
        year: i32,
        race_name: String,
        session: SessionType,
    },
    LapTimes {
        year: i32,
        race_name: String,
        session: SessionType,
        driver_number: String,
    },
    Telemetry {
        year: i32,
        race_name: String,
        session: SessionType,
        key: LapKey,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct FetchRequest {
    pub token: RequestToken,
    pub kind: FetchKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FetchPayload {
    Calendar(Vec<Race>),
    SessionResults(Vec<SessionResult>),
    LapTimes(Vec<LapTime>),
    Telemetry(Vec<TelemetrySample>),
}

#[derive(Debug)]
pub struct FetchResponse {
    pub token: RequestToken,
    pub kind: FetchKind,
    pub result: Result<FetchPayload, LaptraceError>,
}

impl FetchRequest {
    /// Runs the request against a data source. Never fails itself: errors are
    /// carried in the response so the state can decide how to surface them.
    pub fn execute(self, source: &impl RaceDataSource) -> FetchResponse {
        let result = match &self.kind {
            FetchKind::Calendar { year } => source.calendar(*year).map(FetchPayload::Calendar),
            FetchKind::SessionResults {
                year,
                race_name,
                session,
            } => source
                .session_results(*year, race_name, *session)
                .map(FetchPayload::SessionResults),
            FetchKind::LapTimes {
                year,
                race_name,
                session,
                driver_number,
            } => source
                .lap_times(*year, race_name, *session, driver_number)
                .map(FetchPayload::LapTimes),
            FetchKind::Telemetry {
                year,
                race_name,
                session,
                key,
            } => source
                .telemetry(*year, race_name, *session, key)
                .map(FetchPayload::Telemetry),
        };
        FetchResponse {
            token: self.token,
            kind: self.kind,
            result,
        }
    }
}
