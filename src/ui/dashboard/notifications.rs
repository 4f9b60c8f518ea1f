use std::collections::VecDeque;

use egui::{Align2, Color32, RichText};

/// Error messages waiting to be acknowledged, shown one at a time in a modal
/// window.
#[derive(Default)]
pub(crate) struct Notifications {
    pending: VecDeque<String>,
}

impl Notifications {
    pub(crate) fn push(&mut self, message: String) {
        if self.pending.back() != Some(&message) {
            self.pending.push_back(message);
        }
    }

    pub(crate) fn show(&mut self, ctx: &egui::Context) {
        let Some(message) = self.pending.front() else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0., 0.])
            .show(ctx, |ui| {
                ui.label(RichText::new(message).color(Color32::WHITE));
                ui.add_space(8.);
                dismissed = ui.button("OK").clicked();
            });
        if dismissed {
            self.pending.pop_front();
        }
    }
}
