//! Chart-ready series built from the dashboard state. Nothing in here draws;
//! the UI turns these into plot items.

use std::collections::HashMap;

use crate::{
    api::TelemetrySample,
    colors::{Rgb, lap_color},
    lap_times::{ProcessedLap, chart_laps},
    state::{DashboardState, LapKey, SelectedLaps},
};

pub const HOVER_RADIUS: f32 = 5.;
/// Pointer distance (in points) within which a click selects a lap
pub const HIT_RADIUS: f32 = 10.;

/// How a lap marker is drawn. Selected laps are larger with an inverted fill.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointStyle {
    pub radius: f32,
    pub fill: Rgb,
    pub border: Rgb,
    pub border_width: f32,
}

impl PointStyle {
    pub fn for_selection(color: Rgb, selected: bool) -> Self {
        if selected {
            Self {
                radius: 6.,
                fill: Rgb::WHITE,
                border: color,
                border_width: 2.,
            }
        } else {
            Self {
                radius: 3.,
                fill: color,
                border: Rgb::WHITE,
                border_width: 1.,
            }
        }
    }
}

/// Filtered lap times of one driver
#[derive(Clone, Debug, PartialEq)]
pub struct LapTimeSeries {
    pub driver_number: String,
    pub label: String,
    pub color: Rgb,
    pub laps: Vec<ProcessedLap>,
}

impl LapTimeSeries {
    /// `[lap number, seconds]` pairs
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.laps
            .iter()
            .map(|l| [l.lap_number as f64, l.seconds])
            .collect()
    }

    pub fn lap_key(&self, lap: &ProcessedLap) -> LapKey {
        LapKey::new(self.driver_number.clone(), lap.lap_number)
    }

    /// Lap markers grouped by how they are drawn: unselected laps first, then
    /// the selected ones so they render on top.
    pub fn marker_groups(&self, selected: &SelectedLaps) -> [(PointStyle, Vec<[f64; 2]>); 2] {
        let (chosen, others): (Vec<_>, Vec<_>) = self
            .laps
            .iter()
            .partition(|lap| selected.contains(&self.lap_key(lap)));
        let points = |laps: Vec<&ProcessedLap>| {
            laps.iter()
                .map(|l| [l.lap_number as f64, l.seconds])
                .collect::<Vec<_>>()
        };
        [
            (PointStyle::for_selection(self.color, false), points(others)),
            (PointStyle::for_selection(self.color, true), points(chosen)),
        ]
    }

    pub fn lap(&self, lap_number: u32) -> Option<&ProcessedLap> {
        self.laps.iter().find(|l| l.lap_number == lap_number)
    }
}

/// One series per selected driver with lap data, in selection order
pub fn lap_time_series(state: &DashboardState) -> Vec<LapTimeSeries> {
    state
        .drivers()
        .iter()
        .filter_map(|driver| {
            let laps = state.lap_times(&driver.driver_number)?;
            Some(LapTimeSeries {
                driver_number: driver.driver_number.clone(),
                label: driver.name.clone(),
                color: driver.color,
                laps: chart_laps(laps),
            })
        })
        .collect()
}

/// Finds the lap marker closest to `target` (in plot coordinates scaled by
/// `scale`, so distances compare in screen points) within `max_distance`.
pub fn nearest_lap(
    series: &[LapTimeSeries],
    target: [f64; 2],
    scale: [f64; 2],
    max_distance: f64,
) -> Option<LapKey> {
    series
        .iter()
        .flat_map(|s| s.laps.iter().map(move |lap| (s, lap)))
        .map(|(s, lap)| {
            let dx = (lap.lap_number as f64 - target[0]) * scale[0];
            let dy = (lap.seconds - target[1]) * scale[1];
            (s.lap_key(lap), (dx * dx + dy * dy).sqrt())
        })
        .filter(|(_, distance)| *distance <= max_distance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(key, _)| key)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TelemetryChannel {
    Speed,
    Throttle,
    Brake,
}

impl TelemetryChannel {
    pub const ALL: [TelemetryChannel; 3] = [Self::Speed, Self::Throttle, Self::Brake];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Speed => "Speed (km/h)",
            Self::Throttle => "Throttle (%)",
            Self::Brake => "Brake",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Speed => "Speed",
            Self::Throttle => "Throttle",
            Self::Brake => "Brake",
        }
    }

    /// Fixed y range, `None` when the chart scales to the data
    pub fn y_range(&self) -> Option<(f64, f64)> {
        match self {
            Self::Speed => None,
            Self::Throttle => Some((0., 100.)),
            Self::Brake => Some((-0.1, 1.1)),
        }
    }

    /// Brake is an on/off signal and is drawn as steps
    pub fn is_stepped(&self) -> bool {
        matches!(self, Self::Brake)
    }

    fn value(&self, sample: &TelemetrySample) -> f64 {
        match self {
            Self::Speed => sample.speed,
            Self::Throttle => sample.throttle,
            Self::Brake => {
                if sample.brake {
                    1.
                } else {
                    0.
                }
            }
        }
    }

    pub fn format_value(&self, value: f64) -> String {
        match self {
            Self::Speed => format!("{} km/h", value.round()),
            Self::Throttle => format!("{}%", value.round()),
            Self::Brake => {
                if value <= 0. {
                    "OFF".to_string()
                } else {
                    "ON".to_string()
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TelemetrySeries {
    pub key: LapKey,
    pub label: String,
    pub color: Rgb,
    /// `[distance, value]` at the lap's own sample points
    pub points: Vec<[f64; 2]>,
}

impl TelemetrySeries {
    pub fn value_at(&self, distance: f64) -> Option<f64> {
        self.points.iter().find(|p| p[0] == distance).map(|p| p[1])
    }
}

/// Telemetry of one selected lap, ready to be turned into series
#[derive(Clone, Copy, Debug)]
pub struct TelemetryEntry<'a> {
    pub key: &'a LapKey,
    pub driver_name: &'a str,
    pub base_color: Rgb,
    pub samples: &'a [TelemetrySample],
}

/// Speed, throttle and brake series of every selected lap, plotted against
/// distance. Series keep their native sample points; `distances` is the
/// sorted union of all of them and drives the shared cursor.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TelemetryCharts {
    speed: Vec<TelemetrySeries>,
    throttle: Vec<TelemetrySeries>,
    brake: Vec<TelemetrySeries>,
    distances: Vec<f64>,
}

impl TelemetryCharts {
    pub fn build<'a>(entries: impl IntoIterator<Item = TelemetryEntry<'a>>) -> Self {
        let mut charts = Self::default();
        let mut laps_per_driver: HashMap<&str, usize> = HashMap::new();

        for entry in entries {
            if entry.samples.is_empty() {
                continue;
            }
            let lap_index = laps_per_driver
                .entry(entry.key.driver_number.as_str())
                .or_insert(0);
            let color = lap_color(entry.base_color, *lap_index);
            *lap_index += 1;

            let label = format!("{} - Lap {}", entry.driver_name, entry.key.lap_number);
            for channel in TelemetryChannel::ALL {
                let points = entry
                    .samples
                    .iter()
                    .map(|s| [s.distance, channel.value(s)])
                    .collect();
                charts.series_mut(channel).push(TelemetrySeries {
                    key: entry.key.clone(),
                    label: label.clone(),
                    color,
                    points,
                });
            }
            charts
                .distances
                .extend(entry.samples.iter().map(|s| s.distance).filter(|d| d.is_finite()));
        }

        charts.distances.sort_by(f64::total_cmp);
        charts.distances.dedup();
        charts
    }

    /// Builds the charts for the laps currently selected, in selection order
    pub fn from_state(state: &DashboardState) -> Self {
        Self::build(state.selected_laps().iter().filter_map(|key| {
            let driver = state.driver(&key.driver_number)?;
            let samples = state.telemetry(key)?;
            Some(TelemetryEntry {
                key,
                driver_name: &driver.name,
                base_color: driver.color,
                samples,
            })
        }))
    }

    pub fn series(&self, channel: TelemetryChannel) -> &[TelemetrySeries] {
        match channel {
            TelemetryChannel::Speed => &self.speed,
            TelemetryChannel::Throttle => &self.throttle,
            TelemetryChannel::Brake => &self.brake,
        }
    }

    fn series_mut(&mut self, channel: TelemetryChannel) -> &mut Vec<TelemetrySeries> {
        match channel {
            TelemetryChannel::Speed => &mut self.speed,
            TelemetryChannel::Throttle => &mut self.throttle,
            TelemetryChannel::Brake => &mut self.brake,
        }
    }

    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    pub fn is_empty(&self) -> bool {
        self.speed.is_empty()
    }

    /// Closest recorded distance to `x`, ties going to the lower distance
    pub fn nearest_distance(&self, x: f64) -> Option<f64> {
        if x.is_nan() {
            return None;
        }
        let index = self.distances.partition_point(|d| *d < x);
        let above = self.distances.get(index).copied();
        let below = index
            .checked_sub(1)
            .and_then(|i| self.distances.get(i))
            .copied();
        match (below, above) {
            (Some(b), Some(a)) => Some(if x - b <= a - x { b } else { a }),
            (Some(b), None) => Some(b),
            (None, a) => a,
        }
    }

    /// One line per series that has a sample at exactly `distance`, e.g.
    /// `Lewis Hamilton - Lap 5: Speed 312 km/h`
    pub fn readout(&self, distance: f64) -> Vec<String> {
        TelemetryChannel::ALL
            .iter()
            .flat_map(|channel| {
                self.series(*channel).iter().filter_map(move |series| {
                    let value = series.value_at(distance)?;
                    Some(format!(
                        "{}: {} {}",
                        series.label,
                        channel.name(),
                        channel.format_value(value)
                    ))
                })
            })
            .collect()
    }
}

/// Expands a series into horizontal/vertical segments so a line through the
/// result holds each value until the next sample.
pub fn stepped_points(points: &[[f64; 2]]) -> Vec<[f64; 2]> {
    let mut stepped = Vec::with_capacity(points.len() * 2);
    for (i, point) in points.iter().enumerate() {
        if i > 0 {
            stepped.push([point[0], points[i - 1][1]]);
        }
        stepped.push(*point);
    }
    stepped
}
