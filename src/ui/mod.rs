use egui::{Color32, CornerRadius, Frame, RichText, Stroke, Ui, Visuals, style::Widgets};

pub(crate) mod dashboard;

pub(crate) const PALETTE_BLACK: Color32 = Color32::from_rgb(12, 12, 12);
pub(crate) const PALETTE_GRAPHITE: Color32 = Color32::from_rgb(30, 30, 34);
pub(crate) const PALETTE_MAROON: Color32 = Color32::from_rgb(155, 57, 34);

const TAG_CORNER_RADIUS: u8 = 12;

pub(crate) fn dashboard_visuals() -> Visuals {
    Visuals {
        dark_mode: true,
        hyperlink_color: PALETTE_MAROON,
        faint_bg_color: PALETTE_GRAPHITE,
        extreme_bg_color: PALETTE_BLACK,
        panel_fill: PALETTE_BLACK,
        button_frame: true,
        window_fill: PALETTE_GRAPHITE,
        widgets: Widgets::dark(),
        striped: false,
        ..Default::default()
    }
}

/// A rounded tag with a colored border and a remove button. Returns true when
/// the remove button was clicked.
pub(crate) fn removable_tag(ui: &mut Ui, text: &str, color: Color32) -> bool {
    let mut removed = false;
    Frame::new()
        .stroke(Stroke::new(2., color))
        .corner_radius(CornerRadius::same(TAG_CORNER_RADIUS))
        .inner_margin(4)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(text).color(Color32::WHITE));
                removed = ui
                    .small_button("×")
                    .on_hover_text(format!("Remove {}", text))
                    .clicked();
            });
        });
    removed
}
