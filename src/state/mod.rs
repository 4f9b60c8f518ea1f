mod lap_key;
mod requests;

use std::collections::HashMap;

use log::{debug, error, info, warn};

pub use lap_key::{LapKey, SelectedLaps};
pub use requests::{FetchKind, FetchPayload, FetchRequest, FetchResponse, RequestToken, Scope};

use crate::{
    LaptraceError,
    api::{LapTime, Race, SessionResult, SessionType, TelemetrySample},
    colors::{ColorAllocator, DriverColor},
};

/// Everything the dashboard has selected and fetched so far.
///
/// UI events call the selection methods, which return the fetch requests to
/// run. Fetch results come back through [`DashboardState::apply`]. Changing a
/// selection discards everything below it and bumps the generation of the
/// affected scopes, so responses that arrive late for an older selection are
/// dropped instead of overwriting newer data.
#[derive(Debug)]
pub struct DashboardState {
    year: i32,
    races: Vec<Race>,
    race: Option<Race>,
    session: Option<SessionType>,
    results: Vec<SessionResult>,
    drivers: ColorAllocator,
    lap_times: HashMap<String, Vec<LapTime>>,
    selected_laps: SelectedLaps,
    telemetry: HashMap<LapKey, Vec<TelemetrySample>>,
    generations: HashMap<Scope, u64>,
    next_sequence: u64,
    // sequence of the latest request per selected driver and lap
    lap_time_requests: HashMap<String, u64>,
    telemetry_requests: HashMap<LapKey, u64>,
    in_flight: HashMap<Scope, usize>,
    notifications: Vec<String>,
}

impl DashboardState {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            races: Vec::new(),
            race: None,
            session: None,
            results: Vec::new(),
            drivers: ColorAllocator::default(),
            lap_times: HashMap::new(),
            selected_laps: SelectedLaps::default(),
            telemetry: HashMap::new(),
            generations: HashMap::new(),
            next_sequence: 0,
            lap_time_requests: HashMap::new(),
            telemetry_requests: HashMap::new(),
            in_flight: HashMap::new(),
            notifications: Vec::new(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn races(&self) -> &[Race] {
        &self.races
    }

    pub fn race(&self) -> Option<&Race> {
        self.race.as_ref()
    }

    pub fn session(&self) -> Option<SessionType> {
        self.session
    }

    pub fn results(&self) -> &[SessionResult] {
        &self.results
    }

    pub fn drivers(&self) -> &[DriverColor] {
        self.drivers.drivers()
    }

    pub fn driver(&self, driver_number: &str) -> Option<&DriverColor> {
        self.drivers.get(driver_number)
    }

    pub fn lap_times(&self, driver_number: &str) -> Option<&[LapTime]> {
        self.lap_times.get(driver_number).map(Vec::as_slice)
    }

    pub fn selected_laps(&self) -> &SelectedLaps {
        &self.selected_laps
    }

    pub fn telemetry(&self, key: &LapKey) -> Option<&[TelemetrySample]> {
        self.telemetry.get(key).map(Vec::as_slice)
    }

    pub fn is_loading(&self, scope: Scope) -> bool {
        self.in_flight.get(&scope).copied().unwrap_or(0) > 0
    }

    /// Messages that should be shown to the user, oldest first
    pub fn take_notifications(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notifications)
    }

    pub fn select_year(&mut self, year: i32) -> Vec<FetchRequest> {
        info!("Selected year {}", year);
        self.year = year;
        self.races.clear();
        self.race = None;
        self.reset_session();
        self.bump(&[Scope::Calendar]);
        vec![self.request(Scope::Calendar, FetchKind::Calendar { year })]
    }

    pub fn select_race(&mut self, race_name: &str) -> Result<Vec<FetchRequest>, LaptraceError> {
        let race = self
            .races
            .iter()
            .find(|r| r.race_name == race_name)
            .cloned()
            .ok_or_else(|| LaptraceError::UnknownRace {
                race_name: race_name.to_string(),
            })?;
        info!("Selected race {}", race.race_name);
        self.race = Some(race);
        self.reset_session();
        Ok(Vec::new())
    }

    pub fn select_session(
        &mut self,
        session: SessionType,
    ) -> Result<Vec<FetchRequest>, LaptraceError> {
        let race_name = self
            .race
            .as_ref()
            .map(|r| r.race_name.clone())
            .ok_or(LaptraceError::NoSessionSelected)?;
        info!("Selected session {}", session);
        self.reset_session();
        self.session = Some(session);
        Ok(vec![self.request(
            Scope::Results,
            FetchKind::SessionResults {
                year: self.year,
                race_name,
                session,
            },
        )])
    }

    /// Adds a driver to the comparison. Duplicate drivers and an exhausted
    /// palette are rejected without changing any state.
    pub fn select_driver(
        &mut self,
        driver_number: &str,
    ) -> Result<Vec<FetchRequest>, LaptraceError> {
        let (race_name, session) = self.race_and_session()?;
        let name = self
            .results
            .iter()
            .find(|r| r.driver_number == driver_number)
            .map(|r| r.driver_name.clone())
            .unwrap_or_else(|| format!("Driver {}", driver_number));

        let color = self.drivers.allocate(driver_number, &name)?;
        info!("Selected driver {} ({}) with color {}", driver_number, name, color);

        let request = self.request(
            Scope::LapTimes,
            FetchKind::LapTimes {
                year: self.year,
                race_name,
                session,
                driver_number: driver_number.to_string(),
            },
        );
        self.lap_time_requests
            .insert(driver_number.to_string(), request.token.sequence);
        Ok(vec![request])
    }

    /// Removes a driver together with its lap times and selected laps.
    pub fn remove_driver(&mut self, driver_number: &str) -> bool {
        if self.drivers.release(driver_number).is_none() {
            return false;
        }
        self.lap_times.remove(driver_number);
        self.lap_time_requests.remove(driver_number);
        for key in self.selected_laps.remove_driver(driver_number) {
            self.telemetry.remove(&key);
            self.telemetry_requests.remove(&key);
        }
        info!("Removed driver {}", driver_number);
        true
    }

    /// Selects a lap for telemetry, or deselects it if it was already
    /// selected. Selecting issues exactly one telemetry request.
    pub fn toggle_lap(&mut self, key: LapKey) -> Result<Vec<FetchRequest>, LaptraceError> {
        if self.remove_lap(&key) {
            return Ok(Vec::new());
        }
        let (race_name, session) = self.race_and_session()?;
        if self.drivers.get(&key.driver_number).is_none() {
            debug!("Ignoring lap {} of a driver that is not selected", key);
            return Ok(Vec::new());
        }

        info!("Selected lap {}", key);
        self.selected_laps.insert(key.clone());
        let request = self.request(
            Scope::Telemetry,
            FetchKind::Telemetry {
                year: self.year,
                race_name,
                session,
                key: key.clone(),
            },
        );
        self.telemetry_requests.insert(key, request.token.sequence);
        Ok(vec![request])
    }

    pub fn remove_lap(&mut self, key: &LapKey) -> bool {
        if !self.selected_laps.remove(key) {
            return false;
        }
        self.telemetry.remove(key);
        self.telemetry_requests.remove(key);
        info!("Deselected lap {}", key);
        true
    }

    /// Applies a fetch response. Responses for a superseded selection, or for
    /// drivers and laps that have been deselected or reselected meanwhile,
    /// are ignored whether they succeeded or failed.
    pub fn apply(&mut self, response: FetchResponse) {
        let scope = response.token.scope;
        if let Some(count) = self.in_flight.get_mut(&scope) {
            *count = count.saturating_sub(1);
        }
        if response.token.generation != self.generation(scope) {
            debug!("Ignoring stale {:?} response", response.kind);
            return;
        }
        let sequence = response.token.sequence;
        match &response.kind {
            FetchKind::LapTimes { driver_number, .. }
                if self.lap_time_requests.get(driver_number) != Some(&sequence) =>
            {
                debug!("Ignoring lap times for deselected driver {}", driver_number);
                return;
            }
            FetchKind::Telemetry { key, .. }
                if self.telemetry_requests.get(key) != Some(&sequence) =>
            {
                debug!("Ignoring telemetry for deselected lap {}", key);
                return;
            }
            _ => {}
        }

        match (response.kind, response.result) {
            (FetchKind::Calendar { .. }, Ok(FetchPayload::Calendar(races))) => {
                info!("Loaded {} races for {}", races.len(), self.year);
                self.races = races;
            }
            (FetchKind::Calendar { .. }, Err(e)) => {
                self.races.clear();
                self.notify_error("Failed to load races", &e);
            }
            (FetchKind::SessionResults { .. }, Ok(FetchPayload::SessionResults(results))) => {
                info!("Loaded {} session results", results.len());
                self.results = results;
            }
            (FetchKind::SessionResults { .. }, Err(e)) => {
                self.results.clear();
                self.notify_error("Failed to load session results", &e);
            }
            (FetchKind::LapTimes { driver_number, .. }, Ok(FetchPayload::LapTimes(laps))) => {
                if laps.is_empty() {
                    warn!("No lap times for driver {}", driver_number);
                    self.lap_times.remove(&driver_number);
                } else {
                    info!("Loaded {} laps for driver {}", laps.len(), driver_number);
                    self.lap_times.insert(driver_number, laps);
                }
            }
            (FetchKind::LapTimes { driver_number, .. }, Err(e)) => {
                self.lap_times.remove(&driver_number);
                self.notify_error("Failed to load driver details", &e);
            }
            (FetchKind::Telemetry { key, .. }, Ok(FetchPayload::Telemetry(samples))) => {
                if samples.is_empty() {
                    warn!("No telemetry data for driver {}, lap {}", key.driver_number, key.lap_number);
                    self.selected_laps.remove(&key);
                    self.telemetry_requests.remove(&key);
                } else {
                    info!("Loaded {} telemetry samples for {}", samples.len(), key);
                    self.telemetry.insert(key, samples);
                }
            }
            (FetchKind::Telemetry { key, .. }, Err(e)) => {
                self.selected_laps.remove(&key);
                self.telemetry.remove(&key);
                self.telemetry_requests.remove(&key);
                self.notify_error("Failed to load telemetry", &e);
            }
            (kind, Ok(_)) => {
                error!("Response payload does not match request {:?}", kind);
            }
        }
    }

    fn race_and_session(&self) -> Result<(String, SessionType), LaptraceError> {
        match (&self.race, self.session) {
            (Some(race), Some(session)) => Ok((race.race_name.clone(), session)),
            _ => Err(LaptraceError::NoSessionSelected),
        }
    }

    /// Discards the session and everything selected for it
    fn reset_session(&mut self) {
        self.session = None;
        self.results.clear();
        self.drivers.clear();
        self.lap_times.clear();
        self.selected_laps.clear();
        self.telemetry.clear();
        self.lap_time_requests.clear();
        self.telemetry_requests.clear();
        self.bump(&[Scope::Results, Scope::LapTimes, Scope::Telemetry]);
    }

    fn generation(&self, scope: Scope) -> u64 {
        self.generations.get(&scope).copied().unwrap_or(0)
    }

    fn bump(&mut self, scopes: &[Scope]) {
        for scope in scopes {
            *self.generations.entry(*scope).or_insert(0) += 1;
        }
    }

    fn request(&mut self, scope: Scope, kind: FetchKind) -> FetchRequest {
        *self.in_flight.entry(scope).or_insert(0) += 1;
        self.next_sequence += 1;
        FetchRequest {
            token: RequestToken {
                scope,
                generation: self.generation(scope),
                sequence: self.next_sequence,
            },
            kind,
        }
    }

    fn notify_error(&mut self, context: &str, e: &LaptraceError) {
        error!("{}: {}", context, e.detailed_message());
        self.notifications
            .push(format!("{}: {}", context, e.detailed_message()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn race(name: &str, country: &str) -> Race {
        Race {
            round: None,
            race_name: name.to_string(),
            circuit_name: None,
            country: country.to_string(),
            date: None,
            available_sessions: vec!["R".to_string(), "Q".to_string()],
        }
    }

    fn respond(request: FetchRequest, result: Result<FetchPayload, LaptraceError>) -> FetchResponse {
        FetchResponse {
            token: request.token,
            kind: request.kind,
            result,
        }
    }

    fn sample(distance: f64) -> TelemetrySample {
        TelemetrySample {
            distance,
            speed: 250.,
            throttle: 100.,
            ..Default::default()
        }
    }

    /// State with a race and session selected and driver 44 added
    fn state_with_driver() -> DashboardState {
        let mut state = DashboardState::new(2024);
        let calendar = state.select_year(2024).remove(0);
        state.apply(respond(
            calendar,
            Ok(FetchPayload::Calendar(vec![race("Bahrain GP", "Bahrain")])),
        ));
        state.select_race("Bahrain GP").unwrap();
        let results = state.select_session(SessionType::Race).unwrap().remove(0);
        state.apply(respond(
            results,
            Ok(FetchPayload::SessionResults(vec![SessionResult {
                driver_number: "44".to_string(),
                driver_name: "Lewis Hamilton".to_string(),
                position: Some(7),
                team: None,
                status: None,
                points: None,
            }])),
        ));
        state.select_driver("44").unwrap();
        state
    }

    #[test]
    fn test_stale_calendar_response_is_ignored() {
        let mut state = DashboardState::new(2024);
        let old = state.select_year(2023).remove(0);
        let new = state.select_year(2024).remove(0);
        assert!(state.is_loading(Scope::Calendar));

        state.apply(respond(new, Ok(FetchPayload::Calendar(vec![race("2024", "A")]))));
        state.apply(respond(old, Ok(FetchPayload::Calendar(vec![race("2023", "B")]))));

        assert_eq!(state.races().len(), 1);
        assert_eq!(state.races()[0].race_name, "2024");
        assert!(!state.is_loading(Scope::Calendar));
    }

    #[test]
    fn test_calendar_error_leaves_empty_list_and_notifies() {
        let mut state = DashboardState::new(2024);
        let request = state.select_year(2024).remove(0);
        state.apply(respond(request, Err(LaptraceError::WorkerDisconnected)));

        assert!(state.races().is_empty());
        let notifications = state.take_notifications();
        assert_eq!(notifications.len(), 1);
        assert!(notifications[0].starts_with("Failed to load races"));
        assert!(state.take_notifications().is_empty());
    }

    #[test]
    fn test_unknown_race_and_missing_session() {
        let mut state = DashboardState::new(2024);
        assert!(matches!(
            state.select_race("Nowhere"),
            Err(LaptraceError::UnknownRace { .. })
        ));
        assert!(matches!(
            state.select_session(SessionType::Race),
            Err(LaptraceError::NoSessionSelected)
        ));
        assert!(matches!(
            state.select_driver("44"),
            Err(LaptraceError::NoSessionSelected)
        ));
    }

    #[test]
    fn test_duplicate_driver_issues_no_request() {
        let mut state = state_with_driver();
        let result = state.select_driver("44");
        assert!(matches!(
            result,
            Err(LaptraceError::DriverAlreadySelected { .. })
        ));
        assert_eq!(state.drivers().len(), 1);
        assert_eq!(state.drivers()[0].name, "Lewis Hamilton");
    }

    #[test]
    fn test_toggle_lap_selects_and_deselects() {
        let mut state = state_with_driver();
        let key = LapKey::new("44", 5);

        let requests = state.toggle_lap(key.clone()).unwrap();
        assert_eq!(requests.len(), 1);
        assert!(state.selected_laps().contains(&key));
        let request = requests.into_iter().next().unwrap();
        state.apply(respond(
            request,
            Ok(FetchPayload::Telemetry(vec![sample(0.), sample(4.2)])),
        ));
        assert_eq!(state.telemetry(&key).map(|t| t.len()), Some(2));

        assert!(state.toggle_lap(key.clone()).unwrap().is_empty());
        assert!(!state.selected_laps().contains(&key));
        assert!(state.telemetry(&key).is_none());
    }

    #[test]
    fn test_empty_telemetry_drops_key_without_notification() {
        let mut state = state_with_driver();
        let key = LapKey::new("44", 1);
        let request = state.toggle_lap(key.clone()).unwrap().remove(0);
        state.apply(respond(request, Ok(FetchPayload::Telemetry(Vec::new()))));

        assert!(!state.selected_laps().contains(&key));
        assert!(state.take_notifications().is_empty());
    }

    #[test]
    fn test_telemetry_error_drops_key_and_notifies() {
        let mut state = state_with_driver();
        let key = LapKey::new("44", 2);
        let request = state.toggle_lap(key.clone()).unwrap().remove(0);
        state.apply(respond(
            request,
            Err(LaptraceError::HttpStatus {
                url: "http://localhost/telemetry".to_string(),
                status: 404,
                body: "not found".to_string(),
            }),
        ));

        assert!(state.selected_laps().is_empty());
        let notifications = state.take_notifications();
        assert_eq!(
            notifications,
            vec!["Failed to load telemetry: HTTP error! status: 404, details: not found"]
        );
    }

    #[test]
    fn test_telemetry_for_deselected_lap_is_ignored() {
        let mut state = state_with_driver();
        let key = LapKey::new("44", 3);
        let request = state.toggle_lap(key.clone()).unwrap().remove(0);
        state.toggle_lap(key.clone()).unwrap();
        state.apply(respond(request, Ok(FetchPayload::Telemetry(vec![sample(1.)]))));

        assert!(state.telemetry(&key).is_none());
        assert!(!state.selected_laps().contains(&key));
    }

    #[test]
    fn test_reselected_lap_ignores_failure_of_earlier_request() {
        let mut state = state_with_driver();
        let key = LapKey::new("44", 5);
        let first = state.toggle_lap(key.clone()).unwrap().remove(0);
        assert!(state.toggle_lap(key.clone()).unwrap().is_empty());
        let second = state.toggle_lap(key.clone()).unwrap().remove(0);
        assert_ne!(first.token, second.token);

        state.apply(respond(first, Err(LaptraceError::WorkerDisconnected)));
        assert!(state.selected_laps().contains(&key));
        assert!(state.take_notifications().is_empty());

        state.apply(respond(second, Ok(FetchPayload::Telemetry(vec![sample(1.)]))));
        assert!(state.selected_laps().contains(&key));
        assert_eq!(state.telemetry(&key).map(|t| t.len()), Some(1));
        assert!(!state.is_loading(Scope::Telemetry));
    }

    #[test]
    fn test_reselected_lap_ignores_data_of_earlier_request() {
        let mut state = state_with_driver();
        let key = LapKey::new("44", 6);
        let first = state.toggle_lap(key.clone()).unwrap().remove(0);
        state.toggle_lap(key.clone()).unwrap();
        let second = state.toggle_lap(key.clone()).unwrap().remove(0);

        state.apply(respond(first, Ok(FetchPayload::Telemetry(vec![sample(1.), sample(2.)]))));
        assert!(state.telemetry(&key).is_none());
        state.apply(respond(second, Ok(FetchPayload::Telemetry(vec![sample(3.)]))));
        assert_eq!(state.telemetry(&key).map(|t| t[0].distance), Some(3.));
    }

    #[test]
    fn test_telemetry_error_for_deselected_lap_is_silent() {
        let mut state = state_with_driver();
        let key = LapKey::new("44", 3);
        let request = state.toggle_lap(key.clone()).unwrap().remove(0);
        assert!(state.remove_lap(&key));
        state.apply(respond(request, Err(LaptraceError::WorkerDisconnected)));

        assert!(state.take_notifications().is_empty());
        assert!(!state.is_loading(Scope::Telemetry));
    }

    #[test]
    fn test_lap_times_error_for_removed_driver_is_silent() {
        let mut state = DashboardState::new(2024);
        let calendar = state.select_year(2024).remove(0);
        state.apply(respond(
            calendar,
            Ok(FetchPayload::Calendar(vec![race("Bahrain GP", "Bahrain")])),
        ));
        state.select_race("Bahrain GP").unwrap();
        state.select_session(SessionType::Race).unwrap();
        let request = state.select_driver("1").unwrap().remove(0);
        assert!(state.remove_driver("1"));

        state.apply(respond(request, Err(LaptraceError::WorkerDisconnected)));
        assert!(state.take_notifications().is_empty());
    }

    #[test]
    fn test_readded_driver_ignores_lap_times_of_earlier_request() {
        let mut state = DashboardState::new(2024);
        let calendar = state.select_year(2024).remove(0);
        state.apply(respond(
            calendar,
            Ok(FetchPayload::Calendar(vec![race("Bahrain GP", "Bahrain")])),
        ));
        state.select_race("Bahrain GP").unwrap();
        state.select_session(SessionType::Race).unwrap();
        let first = state.select_driver("1").unwrap().remove(0);
        state.remove_driver("1");
        let second = state.select_driver("1").unwrap().remove(0);

        state.apply(respond(first, Err(LaptraceError::WorkerDisconnected)));
        assert!(state.take_notifications().is_empty());
        state.apply(respond(
            second,
            Ok(FetchPayload::LapTimes(vec![LapTime {
                lap_number: 1,
                lap_time: Some("01:30.000".to_string()),
                compound: None,
                is_personal_best: None,
            }])),
        ));
        assert_eq!(state.lap_times("1").map(|l| l.len()), Some(1));
    }

    #[test]
    fn test_remove_driver_drops_laps_and_telemetry() {
        let mut state = state_with_driver();
        let key = LapKey::new("44", 7);
        let request = state.toggle_lap(key.clone()).unwrap().remove(0);
        state.apply(respond(request, Ok(FetchPayload::Telemetry(vec![sample(1.)]))));

        assert!(state.remove_driver("44"));
        assert!(state.drivers().is_empty());
        assert!(state.selected_laps().is_empty());
        assert!(state.telemetry(&key).is_none());
        assert!(!state.remove_driver("44"));
    }

    #[test]
    fn test_session_change_discards_drivers_and_late_lap_times() {
        let mut state = DashboardState::new(2024);
        let calendar = state.select_year(2024).remove(0);
        state.apply(respond(
            calendar,
            Ok(FetchPayload::Calendar(vec![race("Bahrain GP", "Bahrain")])),
        ));
        state.select_race("Bahrain GP").unwrap();
        state.select_session(SessionType::Race).unwrap();
        let laps = state.select_driver("1").unwrap().remove(0);

        state.select_session(SessionType::Qualifying).unwrap();
        assert!(state.drivers().is_empty());

        state.select_driver("1").unwrap();
        state.apply(respond(
            laps,
            Ok(FetchPayload::LapTimes(vec![LapTime {
                lap_number: 1,
                lap_time: Some("01:30.000".to_string()),
                compound: None,
                is_personal_best: None,
            }])),
        ));
        assert!(state.lap_times("1").is_none());
    }
}
