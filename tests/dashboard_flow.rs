// End-to-end selection flow against an in-memory race data source:
// year -> race -> session -> drivers -> laps -> telemetry.

use laptrace::{
    DashboardState, LapKey, LaptraceError, RaceDataSource, SessionType, TelemetryCharts,
    api::{LapTime, Race, SessionResult, TelemetrySample},
    charts::{TelemetryChannel, lap_time_series},
    colors::DRIVER_PALETTE,
    state::{FetchKind, FetchRequest},
};

const MONACO: &str = "FORMULA 1 GRAND PRIX DE MONACO 2024";

struct FakeSource {
    drivers: usize,
}

impl FakeSource {
    fn lap_time(lap_number: u32) -> Option<String> {
        match lap_number {
            1 => None,
            // pit stop lap, well outside two standard deviations
            12 => Some("0 days 00:02:10.000000".to_string()),
            n => Some(format!("0 days 00:01:32.{}00000", n - 2)),
        }
    }
}

impl RaceDataSource for FakeSource {
    fn calendar(&self, year: i32) -> Result<Vec<Race>, LaptraceError> {
        Ok(vec![Race {
            round: Some(8),
            race_name: MONACO.to_string(),
            circuit_name: Some("Circuit de Monaco".to_string()),
            country: "Monaco".to_string(),
            date: Some(format!("{}-05-26", year)),
            available_sessions: vec!["race".to_string(), "qualifying".to_string()],
        }])
    }

    fn session_results(
        &self,
        _year: i32,
        _race_name: &str,
        _session: SessionType,
    ) -> Result<Vec<SessionResult>, LaptraceError> {
        Ok((0..self.drivers)
            .map(|i| SessionResult {
                driver_number: if i == 0 {
                    "44".to_string()
                } else {
                    (i + 1).to_string()
                },
                driver_name: format!("Driver {}", i),
                position: Some(i as u32 + 1),
                team: None,
                status: None,
                points: None,
            })
            .collect())
    }

    fn lap_times(
        &self,
        _year: i32,
        _race_name: &str,
        _session: SessionType,
        _driver_number: &str,
    ) -> Result<Vec<LapTime>, LaptraceError> {
        Ok((1..=12)
            .map(|lap_number| LapTime {
                lap_number,
                lap_time: Self::lap_time(lap_number),
                compound: None,
                is_personal_best: None,
            })
            .collect())
    }

    fn telemetry(
        &self,
        _year: i32,
        _race_name: &str,
        _session: SessionType,
        key: &LapKey,
    ) -> Result<Vec<TelemetrySample>, LaptraceError> {
        Ok((0..50)
            .map(|i| TelemetrySample {
                distance: i as f64 * 10. + key.lap_number as f64,
                speed: 200. + i as f64,
                throttle: if i < 40 { 100. } else { 0. },
                brake: i >= 40,
                ..Default::default()
            })
            .collect())
    }
}

fn run(state: &mut DashboardState, source: &FakeSource, requests: Vec<FetchRequest>) {
    for request in requests {
        state.apply(request.execute(source));
    }
}

/// Runs the selection up to a chosen session
fn session_state(source: &FakeSource) -> DashboardState {
    let mut state = DashboardState::new(2024);
    let requests = state.select_year(2024);
    run(&mut state, source, requests);
    let requests = state.select_race(MONACO).unwrap();
    run(&mut state, source, requests);
    let requests = state.select_session(SessionType::Race).unwrap();
    run(&mut state, source, requests);
    state
}

#[test]
fn test_full_selection_flow() {
    let source = FakeSource { drivers: 20 };
    let mut state = session_state(&source);
    assert_eq!(state.races().len(), 1);
    assert_eq!(state.results().len(), 20);
    assert_eq!(state.results()[0].label(), "1. Driver 0");

    let requests = state.select_driver("44").unwrap();
    assert_eq!(requests.len(), 1);
    run(&mut state, &source, requests);

    let series = lap_time_series(&state);
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].color, DRIVER_PALETTE[0]);
    // lap 1 has no time and lap 12 is an outlier
    assert_eq!(series[0].points().len(), 10);
    assert!(series[0].lap(1).is_none());
    assert!(series[0].lap(12).is_none());
    assert_eq!(series[0].lap(5).map(|l| l.label.as_str()), Some("01:32.300"));

    let requests = state.toggle_lap(LapKey::new("44", 5)).unwrap();
    assert_eq!(requests.len(), 1);
    match &requests[0].kind {
        FetchKind::Telemetry { key, session, .. } => {
            assert_eq!(key.to_string(), "44:5");
            assert_eq!(*session, SessionType::Race);
        }
        other => panic!("expected a telemetry request, got {:?}", other),
    }
    run(&mut state, &source, requests);

    let charts = TelemetryCharts::from_state(&state);
    assert_eq!(charts.series(TelemetryChannel::Speed).len(), 1);
    assert_eq!(charts.series(TelemetryChannel::Speed)[0].label, "Driver 0 - Lap 5");
    assert_eq!(charts.distances().len(), 50);
    assert_eq!(charts.nearest_distance(17.), Some(15.));
    assert_eq!(
        charts.readout(15.),
        vec![
            "Driver 0 - Lap 5: Speed 201 km/h",
            "Driver 0 - Lap 5: Throttle 100%",
            "Driver 0 - Lap 5: Brake OFF",
        ]
    );
}

#[test]
fn test_laps_of_two_drivers_share_the_distance_axis() {
    let source = FakeSource { drivers: 20 };
    let mut state = session_state(&source);
    for driver in ["44", "2"] {
        let requests = state.select_driver(driver).unwrap();
        run(&mut state, &source, requests);
    }
    for key in [LapKey::new("44", 3), LapKey::new("2", 4), LapKey::new("44", 4)] {
        let requests = state.toggle_lap(key).unwrap();
        run(&mut state, &source, requests);
    }

    let charts = TelemetryCharts::from_state(&state);
    let brake = charts.series(TelemetryChannel::Brake);
    assert_eq!(brake.len(), 3);
    assert_eq!(brake[0].color, DRIVER_PALETTE[0]);
    assert_eq!(brake[1].color, DRIVER_PALETTE[1]);
    assert_ne!(brake[2].color, DRIVER_PALETTE[0]);
    // laps 3 and 4 are sampled at different offsets
    assert_eq!(charts.distances().len(), 100);

    assert!(state.remove_driver("44"));
    let charts = TelemetryCharts::from_state(&state);
    assert_eq!(charts.series(TelemetryChannel::Speed).len(), 1);
    assert_eq!(state.selected_laps().len(), 1);
}

#[test]
fn test_eleventh_driver_is_rejected() {
    let source = FakeSource { drivers: 11 };
    let mut state = session_state(&source);
    let numbers: Vec<String> = state
        .results()
        .iter()
        .map(|r| r.driver_number.clone())
        .collect();
    for number in &numbers[..10] {
        let requests = state.select_driver(number).unwrap();
        run(&mut state, &source, requests);
    }

    let error = state.select_driver(&numbers[10]).unwrap_err();
    assert!(matches!(error, LaptraceError::PaletteExhausted));
    assert_eq!(state.drivers().len(), 10);
    assert_eq!(lap_time_series(&state).len(), 10);
}

#[test]
fn test_changing_session_discards_drivers_and_late_responses() {
    let source = FakeSource { drivers: 20 };
    let mut state = session_state(&source);
    let pending = state.select_driver("44").unwrap();

    let requests = state.select_session(SessionType::Qualifying).unwrap();
    run(&mut state, &source, requests);
    // lap times for the previous session arrive after the switch
    run(&mut state, &source, pending);

    assert!(state.drivers().is_empty());
    assert!(state.lap_times("44").is_none());
    assert!(lap_time_series(&state).is_empty());
    assert_eq!(state.session(), Some(SessionType::Qualifying));
}
