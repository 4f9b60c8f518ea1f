//! Lap time parsing and the per-driver outlier filter used by the lap time chart.

use serde::{Deserialize, Serialize};

use crate::api::LapTime;

/// Label shown for laps without a recorded time
pub const NO_TIME: &str = "-";
const NONE_SENTINEL: &str = "None";
/// Laps further than this many standard deviations from the mean are hidden
const OUTLIER_STD_DEVS: f64 = 2.;

/// A lap that can be plotted: lap number as recorded, time in seconds and the
/// `MM:SS.mmm` label it was parsed from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessedLap {
    pub lap_number: u32,
    pub seconds: f64,
    pub label: String,
}

/// Normalizes an API lap time to `MM:SS.mmm`.
///
/// Day-prefixed durations (`0 days 00:01:23.456000`) are reformatted, values
/// already in `MM:SS.mmm` are returned unchanged, missing values become
/// [`NO_TIME`] and anything else is returned verbatim.
pub fn format_time(raw: Option<&str>) -> String {
    let Some(time) = raw else {
        return NO_TIME.to_string();
    };
    if time.is_empty() || time == NONE_SENTINEL {
        return NO_TIME.to_string();
    }

    if time.contains("day") {
        return format_day_duration(time).unwrap_or_else(|| time.to_string());
    }

    time.to_string()
}

fn format_day_duration(time: &str) -> Option<String> {
    let parts: Vec<&str> = time.split('.').collect();
    if parts.len() != 2 {
        return None;
    }

    let fraction: String = parts[1]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .take(3)
        .collect();
    if fraction.is_empty() {
        return None;
    }
    // a short fraction is a decimal fraction of a second: `.5` is 500 ms
    let milliseconds: u32 = format!("{:0<3}", fraction).parse().ok()?;

    let components: Vec<&str> = parts[0].split(':').collect();
    let seconds: u32 = leading_int(components.last()?)?;
    let minutes: u32 = components
        .len()
        .checked_sub(2)
        .and_then(|i| leading_int(components[i]))
        .unwrap_or(0);

    Some(format!("{:02}:{:02}.{:03}", minutes, seconds, milliseconds))
}

/// Parses the leading digits of a component such as `00` or `23`.
fn leading_int(component: &str) -> Option<u32> {
    let digits: String = component
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// True for labels shaped exactly like `MM:SS.mmm`
pub fn is_lap_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    bytes.len() == 9
        && bytes[2] == b':'
        && bytes[5] == b'.'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || i == 5 || b.is_ascii_digit())
}

/// Converts a `MM:SS.mmm` label to seconds. Labels that do not split into two
/// numeric `:` separated parts cannot be plotted and yield `None`.
pub fn lap_seconds(label: &str) -> Option<f64> {
    let (minutes, seconds) = label.split_once(':')?;
    let minutes: f64 = minutes.trim().parse().ok()?;
    let seconds: f64 = seconds.trim().parse().ok()?;
    let total = minutes * 60. + seconds;
    total.is_finite().then_some(total)
}

/// Parses every lap and drops the ones whose normalized label is not
/// `MM:SS.mmm`, keeping the order the laps were received in.
pub fn process_laps(laps: &[LapTime]) -> Vec<ProcessedLap> {
    laps.iter()
        .filter_map(|lap| {
            let label = format_time(lap.lap_time.as_deref());
            if !is_lap_label(&label) {
                return None;
            }
            let seconds = lap_seconds(&label)?;
            Some(ProcessedLap {
                lap_number: lap.lap_number,
                seconds,
                label,
            })
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LapStatistics {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation (divisor N)
    pub std_dev: f64,
}

impl LapStatistics {
    pub fn from_seconds(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;
        Some(Self {
            count,
            mean,
            std_dev: variance.sqrt(),
        })
    }

    pub fn is_outlier(&self, seconds: f64) -> bool {
        (seconds - self.mean).abs() > OUTLIER_STD_DEVS * self.std_dev
    }
}

/// Keeps laps within two standard deviations of the driver's mean lap time.
pub fn filter_outliers(laps: Vec<ProcessedLap>) -> Vec<ProcessedLap> {
    let seconds: Vec<f64> = laps.iter().map(|l| l.seconds).collect();
    let Some(stats) = LapStatistics::from_seconds(&seconds) else {
        return Vec::new();
    };
    laps.into_iter()
        .filter(|lap| !stats.is_outlier(lap.seconds))
        .collect()
}

/// Processed and outlier-filtered laps for one driver
pub fn chart_laps(laps: &[LapTime]) -> Vec<ProcessedLap> {
    filter_outliers(process_laps(laps))
}

/// Formats seconds for axes and tooltips, e.g. `83.456` as `1:23.456`
pub fn format_lap_seconds(seconds: f64) -> String {
    let minutes = (seconds / 60.).floor();
    let remainder = seconds - minutes * 60.;
    format!("{}:{:0>6}", minutes as i64, format!("{:.3}", remainder))
}
