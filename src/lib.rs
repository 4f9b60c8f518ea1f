// Library interface for laptrace
// This allows integration tests to access internal modules

pub mod api;
pub mod charts;
pub mod colors;
pub mod config;
pub mod errors;
pub mod export;
pub mod lap_times;
pub mod state;

// Re-export commonly used types
pub use api::{ApiClient, RaceDataSource, SessionType};
pub use charts::{LapTimeSeries, TelemetryCharts};
pub use colors::{ColorAllocator, Rgb};
pub use config::AppConfig;
pub use errors::LaptraceError;
pub use state::{DashboardState, LapKey};
