mod lap_chart;
mod notifications;
mod selectors;
mod telemetry_view;

use std::{path::Path, time::Duration};

use egui::{Color32, RichText, ScrollArea};
use log::{error, info};

use laptrace::{
    AppConfig, LaptraceError, LapTimeSeries, TelemetryCharts,
    api::worker::FetchWorker,
    charts::lap_time_series,
    export::{LapExport, write_laps},
    state::{DashboardState, FetchRequest, LapKey, Scope},
};

use notifications::Notifications;

const POLL_INTERVAL_MS: u64 = 100;

/// Interactive comparison of lap times and telemetry for up to ten drivers.
///
/// Fetches run on a [`FetchWorker`] thread. Every frame drains the finished
/// responses into the [`DashboardState`] and rebuilds the chart series when
/// something changed.
pub struct DashboardApp {
    config: AppConfig,
    state: DashboardState,
    worker: FetchWorker,
    notifications: Notifications,
    lap_series: Vec<LapTimeSeries>,
    telemetry_charts: TelemetryCharts,
    charts_dirty: bool,
    race_filter: String,
    hovered_lap: Option<LapKey>,
    hovered_distance: Option<f64>,
}

impl DashboardApp {
    /// `config` is the file-backed config saved on exit. Command line
    /// overrides only reach the worker's client and `start_year`.
    pub fn new(
        config: AppConfig,
        start_year: i32,
        worker: FetchWorker,
        cc: &eframe::CreationContext<'_>,
    ) -> Self {
        cc.egui_ctx.set_visuals(crate::ui::dashboard_visuals());

        let mut app = Self {
            state: DashboardState::new(start_year),
            config,
            worker,
            notifications: Notifications::default(),
            lap_series: Vec::new(),
            telemetry_charts: TelemetryCharts::default(),
            charts_dirty: false,
            race_filter: String::new(),
            hovered_lap: None,
            hovered_distance: None,
        };
        let requests = app.state.select_year(start_year);
        app.submit(Ok(requests));
        app
    }

    /// Sends the requests of a selection change to the worker, or shows the
    /// error that prevented the change.
    fn submit(&mut self, requests: Result<Vec<FetchRequest>, LaptraceError>) {
        self.charts_dirty = true;
        let result = requests.and_then(|requests| self.worker.submit(requests));
        if let Err(e) = result {
            error!("{}", e.detailed_message());
            self.notifications.push(e.to_string());
        }
    }

    fn drain_responses(&mut self) {
        let responses = self.worker.poll();
        if responses.is_empty() {
            return;
        }
        for response in responses {
            self.state.apply(response);
        }
        for message in self.state.take_notifications() {
            self.notifications.push(message);
        }
        self.charts_dirty = true;
    }

    fn refresh_charts(&mut self) {
        if !self.charts_dirty {
            return;
        }
        self.lap_series = lap_time_series(&self.state);
        self.telemetry_charts = TelemetryCharts::from_state(&self.state);
        self.charts_dirty = false;
    }

    fn is_loading(&self) -> bool {
        [Scope::Calendar, Scope::Results, Scope::LapTimes, Scope::Telemetry]
            .into_iter()
            .any(|scope| self.state.is_loading(scope))
    }

    fn export_laps(&mut self, path: &Path) {
        let (Some(race), Some(session)) = (self.state.race(), self.state.session()) else {
            return;
        };
        let export = LapExport {
            year: self.state.year(),
            race_name: &race.race_name,
            session,
            series: &self.lap_series,
        };
        match write_laps(path, &export) {
            Ok(count) => info!("Exported {} laps", count),
            Err(e) => {
                error!("{}", e.detailed_message());
                self.notifications.push(e.to_string());
            }
        }
    }

    fn show_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading(RichText::new("F1 Lap Time Dashboard").color(Color32::WHITE).strong());
            if self.is_loading() {
                ui.spinner();
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let can_export = self.lap_series.iter().any(|s| !s.laps.is_empty());
                if ui
                    .add_enabled(can_export, egui::Button::new("💾 Export laps"))
                    .clicked()
                    && let Some(path) = rfd::FileDialog::new()
                        .add_filter("JSON lines", &["jsonl"])
                        .set_file_name("laps.jsonl")
                        .save_file()
                {
                    self.export_laps(&path);
                }
            });
        });
    }
}

impl eframe::App for DashboardApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.config.default_year = self.state.year();
        if let Err(e) = self.config.save() {
            error!("Error while saving config file: {}", e.detailed_message());
        }
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_responses();
        self.refresh_charts();

        egui::TopBottomPanel::top("selectors")
            .frame(egui::Frame::new().inner_margin(8))
            .show(ctx, |ui| {
                self.show_header(ui);
                ui.separator();
                self.show_selectors(ui);
                self.show_driver_tags(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                self.show_lap_chart(ui);
                ui.add_space(12.);
                self.show_telemetry(ui);
            });
        });

        self.notifications.show(ctx);

        // Keep polling the worker while responses are outstanding
        if self.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(POLL_INTERVAL_MS));
        }
    }
}
