mod ui;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use egui::Vec2;
use log::{info, warn};
use snafu::{ResultExt, Snafu};

use laptrace::{
    ApiClient, AppConfig, LaptraceError, RaceDataSource, SessionType,
    api::worker::FetchWorker,
    charts::LapTimeSeries,
    colors::DRIVER_PALETTE,
    export::{LapExport, write_laps},
    lap_times::chart_laps,
};
use ui::dashboard::DashboardApp;

#[derive(Debug, Snafu)]
enum AppError {
    #[snafu(transparent)]
    Laptrace { source: LaptraceError },

    #[snafu(display("Could not start the dashboard window"))]
    Ui { source: eframe::Error },

    #[snafu(display("Could not set Ctrl-C handler"))]
    CtrlC { source: ctrlc::Error },

    #[snafu(display("No race of {year} matches '{query}'"))]
    RaceNotFound { year: i32, query: String },
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Base URL of the race data API, overrides the config file
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Opens the interactive dashboard (default)
    Dashboard {
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// Writes one driver's filtered lap times as JSON lines
    Export {
        #[arg(short, long)]
        year: i32,

        /// Official race name or country
        #[arg(short, long)]
        race: String,

        #[arg(short, long, value_enum, default_value_t = SessionType::Race)]
        session: SessionType,

        #[arg(short, long)]
        driver: String,

        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Loads the config file, writing the defaults on first run so they can be edited.
fn load_config() -> AppConfig {
    match AppConfig::from_local_file() {
        Ok(Some(config)) => config,
        Ok(None) => {
            let config = AppConfig::default();
            if let Err(e) = config.save() {
                warn!("Could not write default config: {}", e.detailed_message());
            }
            config
        }
        Err(e) => {
            warn!("Ignoring config file: {}", e.detailed_message());
            AppConfig::default()
        }
    }
}

fn dashboard(config: AppConfig, api_url: Option<&str>, year: Option<i32>) -> Result<(), AppError> {
    let start_year = year.unwrap_or(config.default_year);
    let client = ApiClient::new(&config.with_api_url(api_url))?;
    info!("Using race data API at {}", client.base_url());
    let worker = FetchWorker::spawn(client);

    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = native_options.viewport.with_inner_size(Vec2::new(
        config.window_size.width,
        config.window_size.height,
    ));

    eframe::run_native(
        "Laptrace",
        native_options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(config, start_year, worker, cc)))),
    )
    .context(UiSnafu)
}

fn export(
    config: &AppConfig,
    year: i32,
    race: &str,
    session: SessionType,
    driver: &str,
    output: &Path,
) -> Result<(), AppError> {
    let client = ApiClient::new(config)?;
    let race = client
        .calendar(year)?
        .into_iter()
        .find(|r| r.matches(race))
        .ok_or_else(|| AppError::RaceNotFound {
            year,
            query: race.to_string(),
        })?;

    let driver_name = client
        .session_results(year, &race.race_name, session)?
        .into_iter()
        .find(|r| r.driver_number == driver)
        .map(|r| r.driver_name)
        .unwrap_or_else(|| format!("Driver {}", driver));
    let laps = client.lap_times(year, &race.race_name, session, driver)?;
    let series = [LapTimeSeries {
        driver_number: driver.to_string(),
        label: driver_name,
        color: DRIVER_PALETTE[0],
        laps: chart_laps(&laps),
    }];

    let written = write_laps(
        output,
        &LapExport {
            year,
            race_name: &race.race_name,
            session,
            series: &series,
        },
    )?;
    println!(
        "Wrote {} of {} laps for driver {} to {}",
        written,
        laps.len(),
        driver,
        output.display()
    );
    Ok(())
}

#[snafu::report]
fn main() -> Result<(), AppError> {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    })
    .context(CtrlCSnafu)?;

    let config = load_config();
    let api_url = cli.api_url.as_deref();
    match cli.command {
        None => dashboard(config, api_url, None),
        Some(Commands::Dashboard { year }) => dashboard(config, api_url, year),
        Some(Commands::Export {
            year,
            race,
            session,
            driver,
            output,
        }) => export(&config.with_api_url(api_url), year, &race, session, &driver, &output),
    }
}
