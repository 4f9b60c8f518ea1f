use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::info;
use serde::Serialize;
use serde_jsonlines::WriteExt;

use crate::{LaptraceError, api::SessionType, charts::LapTimeSeries};

/// One exported lap, written as a JSON line
#[derive(Debug, Serialize)]
struct ExportedLap<'a> {
    year: i32,
    race_name: &'a str,
    session: SessionType,
    driver_number: &'a str,
    driver_name: &'a str,
    lap_number: u32,
    lap_time: &'a str,
    seconds: f64,
}

pub struct LapExport<'a> {
    pub year: i32,
    pub race_name: &'a str,
    pub session: SessionType,
    pub series: &'a [LapTimeSeries],
}

/// Writes the filtered laps of every series as JSON lines and returns the
/// number of laps written.
pub fn write_laps(file: &Path, export: &LapExport<'_>) -> Result<usize, LaptraceError> {
    let output = File::create(file).map_err(|e| LaptraceError::ExportIOError { source: e })?;
    let mut writer = BufWriter::new(output);

    let rows = export.series.iter().flat_map(|series| {
        series.laps.iter().map(move |lap| ExportedLap {
            year: export.year,
            race_name: export.race_name,
            session: export.session,
            driver_number: &series.driver_number,
            driver_name: &series.label,
            lap_number: lap.lap_number,
            lap_time: &lap.label,
            seconds: lap.seconds,
        })
    });
    writer
        .write_json_lines(rows)
        .map_err(|e| LaptraceError::ExportIOError { source: e })?;
    writer
        .flush()
        .map_err(|e| LaptraceError::ExportIOError { source: e })?;

    let written = export.series.iter().map(|s| s.laps.len()).sum();
    info!("Wrote {} laps to {:?}", written, file);
    Ok(written)
}
