use egui::{Color32, ComboBox, Layout, RichText, Ui};
use egui_dropdown::DropDownBox;
use itertools::Itertools;

use laptrace::{
    SessionType,
    api::Race,
    colors::{DriverColor, MAX_DRIVERS},
};

use super::DashboardApp;
use crate::ui::removable_tag;

const FIRST_SEASON: i32 = 2018;
const LATEST_SEASON: i32 = 2025;

/// Country name, extended with the race name when the country hosts more than
/// one race in the season.
fn race_label(race: &Race, races: &[Race]) -> String {
    if races.iter().filter(|r| r.country == race.country).count() > 1 {
        format!("{} - {}", race.country, race.race_name)
    } else {
        race.country.clone()
    }
}

impl DashboardApp {
    pub(super) fn show_selectors(&mut self, ui: &mut Ui) {
        ui.with_layout(Layout::left_to_right(egui::Align::Center), |ui| {
            self.show_year_selector(ui);
            ui.separator();
            self.show_race_selector(ui);
            ui.separator();
            self.show_session_selector(ui);
            ui.separator();
            self.show_driver_selector(ui);
        });
    }

    fn show_year_selector(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Year: ").color(Color32::WHITE));
        let latest = LATEST_SEASON.max(self.config.default_year);
        let mut year = self.state.year();
        ComboBox::from_id_salt("year_select")
            .selected_text(year.to_string())
            .show_ui(ui, |ui| {
                for season in (FIRST_SEASON..=latest).rev() {
                    ui.selectable_value(&mut year, season, season.to_string());
                }
            });
        if year != self.state.year() {
            self.race_filter.clear();
            let requests = self.state.select_year(year);
            self.submit(Ok(requests));
        }
    }

    fn show_race_selector(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Grand Prix: ").color(Color32::WHITE));
        let races = self.state.races();
        let labels = races.iter().map(|r| race_label(r, races)).collect_vec();
        let enabled = !labels.is_empty();
        ui.add_enabled(
            enabled,
            DropDownBox::from_iter(
                &labels,
                "race_dropbox",
                &mut self.race_filter,
                |ui, text| ui.selectable_label(false, text),
            )
            .filter_by_input(false),
        );

        let chosen = races
            .iter()
            .find(|r| race_label(r, races) == self.race_filter)
            .map(|r| r.race_name.clone());
        let current = self.state.race().map(|r| r.race_name.clone());
        if let Some(race_name) = chosen
            && current.as_ref() != Some(&race_name)
        {
            let requests = self.state.select_race(&race_name);
            self.submit(requests);
        }
    }

    fn show_session_selector(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Session: ").color(Color32::WHITE));
        let current = self.state.session();
        let mut session = current;
        ui.add_enabled_ui(self.state.race().is_some(), |ui| {
            ComboBox::from_id_salt("session_select")
                .selected_text(session.map(|s| s.title()).unwrap_or("Select a session"))
                .show_ui(ui, |ui| {
                    for option in SessionType::ALL {
                        ui.selectable_value(&mut session, Some(option), option.title());
                    }
                });
        });
        if let Some(session) = session
            && current != Some(session)
        {
            let requests = self.state.select_session(session);
            self.submit(requests);
        }
    }

    fn show_driver_selector(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Drivers: ").color(Color32::WHITE));
        let full = self.state.drivers().len() >= MAX_DRIVERS;
        let enabled = !self.state.results().is_empty() && !full;
        let mut chosen = None;
        ui.add_enabled_ui(enabled, |ui| {
            ComboBox::from_id_salt("driver_select")
                .selected_text(if full {
                    "Maximum drivers selected"
                } else {
                    "Add a driver"
                })
                .show_ui(ui, |ui| {
                    for result in self.state.results() {
                        let selected = self.state.driver(&result.driver_number).is_some();
                        if ui.selectable_label(selected, result.label()).clicked() {
                            chosen = Some(result.driver_number.clone());
                        }
                    }
                });
        });
        if let Some(driver_number) = chosen {
            let requests = self.state.select_driver(&driver_number);
            self.submit(requests);
        }
    }

    pub(super) fn show_driver_tags(&mut self, ui: &mut Ui) {
        let drivers: Vec<DriverColor> = self.state.drivers().to_vec();
        if drivers.is_empty() {
            return;
        }
        ui.add_space(4.);
        ui.horizontal_wrapped(|ui| {
            for driver in drivers {
                if removable_tag(ui, &driver.name, driver.color.into()) {
                    self.state.remove_driver(&driver.driver_number);
                    self.charts_dirty = true;
                }
            }
        });
    }
}
