use egui::{Color32, RichText, Ui, Vec2b};
use egui_plot::{Legend, Line, Plot, PlotPoints};

use laptrace::charts::{TelemetryChannel, stepped_points};

use super::DashboardApp;

const TELEMETRY_LINK_GROUP: &str = "telemetry";

fn chart_height(channel: TelemetryChannel) -> f32 {
    match channel {
        TelemetryChannel::Speed => 300.,
        TelemetryChannel::Throttle => 200.,
        TelemetryChannel::Brake => 130.,
    }
}

impl DashboardApp {
    pub(super) fn show_telemetry(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Telemetry").color(Color32::WHITE).strong());
        if self.telemetry_charts.is_empty() {
            ui.label(
                RichText::new("Select laps on the chart above to compare telemetry")
                    .color(Color32::GRAY),
            );
            return;
        }

        self.show_readout(ui);

        let mut hovered_x = None;
        for channel in TelemetryChannel::ALL {
            if let Some(x) = self.show_channel(ui, channel) {
                hovered_x = Some(x);
            }
        }
        self.hovered_distance = hovered_x.and_then(|x| self.telemetry_charts.nearest_distance(x));
    }

    /// Draws one channel and returns the pointer's distance when it hovers
    /// the chart.
    fn show_channel(&self, ui: &mut Ui, channel: TelemetryChannel) -> Option<f64> {
        ui.label(RichText::new(channel.title()).color(Color32::WHITE));
        let mut plot = Plot::new(("telemetry", channel.title()))
            .height(chart_height(channel))
            .legend(Legend::default())
            .link_axis(TELEMETRY_LINK_GROUP, Vec2b::new(true, false))
            .link_cursor(TELEMETRY_LINK_GROUP, Vec2b::new(true, false))
            .x_axis_label("Distance (meters)")
            .x_axis_formatter(|mark, _range| format!("{}m", mark.value))
            .include_x(0.);
        if let Some((min, max)) = channel.y_range() {
            plot = plot.include_y(min).include_y(max);
        }
        plot = match channel {
            TelemetryChannel::Brake => plot
                .y_axis_formatter(move |mark, _range| channel.format_value(mark.value.round())),
            _ => plot.y_axis_formatter(move |mark, _range| channel.format_value(mark.value)),
        };

        let hovered = self.hovered_distance;
        let plot_response = plot.show(ui, |plot_ui| {
            for series in self.telemetry_charts.series(channel) {
                let points = if channel.is_stepped() {
                    stepped_points(&series.points)
                } else {
                    series.points.clone()
                };
                plot_ui.line(
                    Line::new(series.label.clone(), PlotPoints::new(points))
                        .color(Color32::from(series.color))
                        .width(1.5),
                );
            }
            if let Some(distance) = hovered {
                plot_ui.vline(
                    egui_plot::VLine::new("Cursor", distance).color(Color32::from_gray(160)),
                );
            }
        });

        plot_response
            .response
            .hover_pos()
            .map(|pos| plot_response.transform.value_from_position(pos).x)
    }

    fn show_readout(&self, ui: &mut Ui) {
        let Some(distance) = self.hovered_distance else {
            ui.label(RichText::new("Hover a chart to read values").color(Color32::GRAY));
            return;
        };
        ui.label(RichText::new(format!("Distance: {}m", distance.round())).color(Color32::WHITE));
        ui.horizontal_wrapped(|ui| {
            for line in self.telemetry_charts.readout(distance) {
                ui.label(RichText::new(line).color(Color32::LIGHT_GRAY));
                ui.separator();
            }
        });
    }
}
