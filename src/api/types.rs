use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::ThrottleUnit;

/// A race weekend as listed by the calendar endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Race {
    #[serde(default)]
    pub round: Option<u32>,
    /// Official event name, used as the `race_name` query value
    pub race_name: String,
    #[serde(default)]
    pub circuit_name: Option<String>,
    pub country: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub available_sessions: Vec<String>,
}

impl Race {
    /// Matches the official race name or the country, ignoring case
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        self.race_name.eq_ignore_ascii_case(query) || self.country.eq_ignore_ascii_case(query)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Race,
    Qualifying,
}

impl SessionType {
    pub const ALL: [SessionType; 2] = [SessionType::Race, SessionType::Qualifying];

    /// Value sent as the `session_type` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Race => "race",
            Self::Qualifying => "qualifying",
        }
    }

    pub fn results_endpoint(&self) -> &'static str {
        match self {
            Self::Race => "results",
            Self::Qualifying => "qualifying-results",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Race => "Race",
            Self::Qualifying => "Qualifying",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result row as returned by the API, before validation.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct RawSessionResult {
    #[serde(default)]
    position: Option<u32>,
    #[serde(default)]
    driver_number: Option<String>,
    #[serde(default)]
    driver_name: Option<String>,
    #[serde(default)]
    team: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    points: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionResult {
    pub driver_number: String,
    pub driver_name: String,
    pub position: Option<u32>,
    pub team: Option<String>,
    pub status: Option<String>,
    pub points: Option<f64>,
}

impl SessionResult {
    /// Rows without a driver number cannot be selected, so they are dropped.
    pub(crate) fn from_raw(raw: RawSessionResult) -> Option<Self> {
        let driver_number = raw.driver_number?;
        let driver_name = raw
            .driver_name
            .unwrap_or_else(|| format!("Driver {}", driver_number));
        Some(Self {
            driver_number,
            driver_name,
            position: raw.position,
            team: raw.team,
            status: raw.status,
            points: raw.points,
        })
    }

    /// Dropdown label, e.g. `1. Max Verstappen`
    pub fn label(&self) -> String {
        match self.position {
            Some(position) => format!("{}. {}", position, self.driver_name),
            None => format!("-. {}", self.driver_name),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LapTime {
    pub lap_number: u32,
    /// Either a day-prefixed duration (`0 days 00:01:23.456000`), an already
    /// formatted `MM:SS.mmm` string or `None`
    #[serde(default)]
    pub lap_time: Option<String>,
    #[serde(default)]
    pub compound: Option<String>,
    #[serde(default)]
    pub is_personal_best: Option<bool>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum BrakeValue {
    Flag(bool),
    Level(f64),
}

impl BrakeValue {
    fn is_on(&self) -> bool {
        match self {
            Self::Flag(on) => *on,
            Self::Level(level) => *level > 0.,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct RawTelemetrySample {
    distance: f64,
    speed: f64,
    #[serde(default)]
    throttle: Option<f64>,
    #[serde(default)]
    brake: Option<BrakeValue>,
    #[serde(default)]
    rpm: Option<f64>,
    #[serde(default)]
    gear: Option<u8>,
    #[serde(default)]
    drs: Option<u8>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct TelemetrySample {
    /// Meters from the start of the lap
    pub distance: f64,
    /// km/h
    pub speed: f64,
    /// Throttle application in percent (0-100)
    pub throttle: f64,
    pub brake: bool,
    pub rpm: Option<f64>,
    pub gear: Option<u8>,
    pub drs: Option<u8>,
}

impl TelemetrySample {
    pub(crate) fn from_raw(raw: RawTelemetrySample, throttle_unit: ThrottleUnit) -> Self {
        Self {
            distance: raw.distance,
            speed: raw.speed,
            throttle: throttle_unit.to_percent(raw.throttle.unwrap_or(0.)),
            brake: raw.brake.as_ref().is_some_and(BrakeValue::is_on),
            rpm: raw.rpm,
            gear: raw.gear,
            drs: raw.drs,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResultsResponse {
    pub(crate) results: Vec<RawSessionResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LapTimesResponse {
    #[serde(default)]
    pub(crate) lap_times: Vec<LapTime>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TelemetryResponse {
    #[serde(default)]
    pub(crate) telemetry: Vec<RawTelemetrySample>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_race_matches_name_or_country() {
        let race = Race {
            round: Some(8),
            race_name: "FORMULA 1 GRAND PRIX DE MONACO 2024".to_string(),
            circuit_name: None,
            country: "Monaco".to_string(),
            date: None,
            available_sessions: Vec::new(),
        };
        assert!(race.matches("monaco"));
        assert!(race.matches(" Formula 1 Grand Prix de Monaco 2024 "));
        assert!(!race.matches("Monza"));
    }

    #[test]
    fn test_session_type_values() {
        use clap::ValueEnum;

        assert_eq!(SessionType::from_str("race", true).unwrap(), SessionType::Race);
        assert_eq!(
            SessionType::from_str("Qualifying", true).unwrap(),
            SessionType::Qualifying
        );
        assert!(SessionType::from_str("sprint", true).is_err());
        assert_eq!(SessionType::Race.to_string(), "race");
        assert_eq!(
            serde_json::to_string(&SessionType::Qualifying).unwrap(),
            "\"qualifying\""
        );
        assert_eq!(SessionType::Race.results_endpoint(), "results");
        assert_eq!(SessionType::Qualifying.results_endpoint(), "qualifying-results");
    }

    #[test]
    fn test_results_without_driver_number_are_dropped() {
        let response: ResultsResponse = serde_json::from_str(
            r#"{"race_name":"x","date":"2024-03-02","results":[
                {"position":1,"driver_number":"1","driver_name":"Max Verstappen","team":"Red Bull Racing"},
                {"position":null,"driver_number":null,"driver_name":"Nobody"}
            ]}"#,
        )
        .unwrap();
        let results: Vec<SessionResult> = response
            .results
            .into_iter()
            .filter_map(SessionResult::from_raw)
            .collect();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].label(), "1. Max Verstappen");
        assert_eq!(results[0].team.as_deref(), Some("Red Bull Racing"));
    }

    #[test]
    fn test_telemetry_brake_and_throttle_normalization() {
        let response: TelemetryResponse = serde_json::from_str(
            r#"{"telemetry":[
                {"distance":0.0,"speed":280.0,"throttle":0.98,"brake":false},
                {"distance":5.5,"speed":281.0,"throttle":null,"brake":1.0,"gear":7},
                {"distance":9.1,"speed":282.0,"throttle":1.0}
            ]}"#,
        )
        .unwrap();
        let samples: Vec<TelemetrySample> = response
            .telemetry
            .into_iter()
            .map(|raw| TelemetrySample::from_raw(raw, ThrottleUnit::Fraction))
            .collect();

        assert!((samples[0].throttle - 98.).abs() < 1e-9);
        assert!(!samples[0].brake);
        assert_eq!(samples[1].throttle, 0.);
        assert!(samples[1].brake);
        assert_eq!(samples[1].gear, Some(7));
        assert!(!samples[2].brake);
    }

    #[test]
    fn test_calendar_optional_fields() {
        let races: Vec<Race> = serde_json::from_str(
            r#"[{"race_name":"FORMULA 1 GULF AIR BAHRAIN GRAND PRIX 2024","country":"Bahrain"}]"#,
        )
        .unwrap();
        assert_eq!(races[0].country, "Bahrain");
        assert!(races[0].round.is_none());
        assert!(races[0].available_sessions.is_empty());
    }
}
