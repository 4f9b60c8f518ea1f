use egui::{Color32, RichText, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, Points};

use laptrace::{
    charts::{HIT_RADIUS, HOVER_RADIUS, nearest_lap},
    lap_times::format_lap_seconds,
    state::LapKey,
};

use super::DashboardApp;
use crate::ui::removable_tag;

const LAP_CHART_HEIGHT: f32 = 360.;

impl DashboardApp {
    pub(super) fn show_lap_chart(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Lap Times").color(Color32::WHITE).strong());
        if self.lap_series.is_empty() {
            ui.label(
                RichText::new("Select drivers to compare their lap times").color(Color32::GRAY),
            );
            return;
        }

        let selected = self.state.selected_laps();
        let hovered = self.hovered_lap.as_ref();
        let plot_response = Plot::new("lap_times")
            .height(LAP_CHART_HEIGHT)
            .legend(Legend::default())
            .x_axis_label("Lap Number")
            .y_axis_label("Lap Time")
            .y_axis_formatter(|mark, _range| format_lap_seconds(mark.value))
            .show(ui, |plot_ui| {
                for series in &self.lap_series {
                    plot_ui.line(
                        Line::new(series.label.clone(), PlotPoints::new(series.points()))
                            .color(Color32::from(series.color))
                            .width(2.),
                    );
                    // border layer first, fill on top
                    for (style, points) in series.marker_groups(selected) {
                        if points.is_empty() {
                            continue;
                        }
                        plot_ui.points(
                            Points::new(series.label.clone(), PlotPoints::new(points.clone()))
                                .radius(style.radius + style.border_width)
                                .color(Color32::from(style.border))
                                .filled(true),
                        );
                        plot_ui.points(
                            Points::new(series.label.clone(), PlotPoints::new(points))
                                .radius(style.radius)
                                .color(Color32::from(style.fill))
                                .filled(true),
                        );
                    }
                    if let Some(key) = hovered
                        && key.driver_number == series.driver_number
                        && let Some(lap) = series.lap(key.lap_number)
                    {
                        plot_ui.points(
                            Points::new(
                                series.label.clone(),
                                PlotPoints::new(vec![[lap.lap_number as f64, lap.seconds]]),
                            )
                            .radius(HOVER_RADIUS + 3.)
                            .color(Color32::from(series.color))
                            .filled(false),
                        );
                    }
                }
            });

        let transform = plot_response.transform;
        let scale = [
            transform.dpos_dvalue_x().abs(),
            transform.dpos_dvalue_y().abs(),
        ];
        self.hovered_lap = plot_response.response.hover_pos().and_then(|pos| {
            let value = transform.value_from_position(pos);
            nearest_lap(&self.lap_series, [value.x, value.y], scale, HIT_RADIUS as f64)
        });

        if plot_response.response.clicked()
            && let Some(pos) = plot_response.response.interact_pointer_pos()
        {
            let value = transform.value_from_position(pos);
            if let Some(key) =
                nearest_lap(&self.lap_series, [value.x, value.y], scale, HIT_RADIUS as f64)
            {
                let requests = self.state.toggle_lap(key);
                self.submit(requests);
            }
        }

        ui.horizontal(|ui| match self.hovered_lap_text() {
            Some(text) => ui.label(RichText::new(text).color(Color32::WHITE)),
            None => ui.label(
                RichText::new("Click a lap to compare its telemetry").color(Color32::GRAY),
            ),
        });
        self.show_selected_laps(ui);
    }

    fn hovered_lap_text(&self) -> Option<String> {
        let key = self.hovered_lap.as_ref()?;
        let series = self
            .lap_series
            .iter()
            .find(|s| s.driver_number == key.driver_number)?;
        let lap = series.lap(key.lap_number)?;
        Some(format!(
            "Lap {} · {}: {}",
            lap.lap_number, series.label, lap.label
        ))
    }

    fn show_selected_laps(&mut self, ui: &mut Ui) {
        let selected: Vec<LapKey> = self.state.selected_laps().iter().cloned().collect();
        if selected.is_empty() {
            return;
        }
        ui.horizontal_wrapped(|ui| {
            ui.label(RichText::new("Selected laps: ").color(Color32::WHITE));
            for key in selected {
                let Some(driver) = self.state.driver(&key.driver_number) else {
                    continue;
                };
                let text = format!("{} - Lap {}", driver.name, key.lap_number);
                if removable_tag(ui, &text, driver.color.into()) {
                    self.state.remove_lap(&key);
                    self.charts_dirty = true;
                }
            }
        });
    }
}
