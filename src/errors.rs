// Error types for laptrace

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum LaptraceError {
    // Errors talking to the race data API
    #[snafu(display("Request to {url} failed"))]
    HttpRequest { url: String, source: reqwest::Error },
    #[snafu(display("HTTP error! status: {status}, details: {body}"))]
    HttpStatus {
        url: String,
        status: u16,
        body: String,
    },
    #[snafu(display("Malformed response from {endpoint}"))]
    MalformedResponse {
        endpoint: String,
        source: serde_json::Error,
    },
    #[snafu(display("Invalid API url: {url}"))]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[snafu(display("Could not start the HTTP runtime"))]
    RuntimeInit { source: io::Error },
    #[snafu(display("Could not build the HTTP client"))]
    ClientInit { source: reqwest::Error },
    #[snafu(display("Fetch worker is no longer running"))]
    WorkerDisconnected,

    // Selection errors
    #[snafu(display("Maximum number of drivers reached"))]
    PaletteExhausted,
    #[snafu(display("Driver {driver_number} is already selected"))]
    DriverAlreadySelected { driver_number: String },
    #[snafu(display("Unknown race: {race_name}"))]
    UnknownRace { race_name: String },
    #[snafu(display("Select a race and a session first"))]
    NoSessionSelected,
    #[snafu(display("Invalid lap key: {value}"))]
    InvalidLapKey { value: String },
    #[snafu(display("Invalid hex color: {value}"))]
    InvalidColor { value: String },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error parsing config file"))]
    ConfigParseError { source: serde_json::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // Export errors
    #[snafu(display("Error writing export file"))]
    ExportIOError { source: io::Error },
}

impl LaptraceError {
    /// Display message followed by the underlying causes, for notifications
    pub fn detailed_message(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}
