use crate::domain::models::{MessageSeverity, StatusMessage};
use eframe::egui;

pub struct Components;

impl Components {
    pub fn heading(ui: &mut egui::Ui, text: &str) {
        ui.label(egui::RichText::new(text).heading().strong());
    }

    pub fn card<R>(
        ui: &mut egui::Ui,
        title: &str,
        add_contents: impl FnOnce(&mut egui::Ui) -> R,
    ) -> R {
        let stroke = ui.style().visuals.widgets.noninteractive.bg_stroke;
        let bg = ui.style().visuals.extreme_bg_color;

        egui::Frame::none()
            .inner_margin(egui::Margin::same(18.0))
            .rounding(egui::Rounding::same(16.0))
            .stroke(stroke)
            .fill(bg)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(title).strong().size(22.0));
                    ui.add_space(8.0);
                    add_contents(ui)
                })
                .inner
            })
            .inner
    }

    pub fn status_banner(
        ui: &mut egui::Ui,
        text: &str,
        bg_color: egui::Color32,
        text_color: egui::Color32,
    ) {
        ui.add_sized(
            [ui.available_width(), 40.0],
            egui::Label::new(
                egui::RichText::new(text)
                    .color(text_color)
                    .background_color(bg_color)
                    .size(20.0)
                    .strong(),
            )
            .wrap_mode(egui::TextWrapMode::Extend),
        );
    }

    /// Full-width touch button
    pub fn big_button(ui: &mut egui::Ui, text: &str, enabled: bool) -> bool {
        ui.add_enabled(
            enabled,
            egui::Button::new(egui::RichText::new(text).size(28.0).strong())
                .min_size(egui::vec2(ui.available_width(), 72.0)),
        )
        .clicked()
    }

    pub fn severity_color(severity: MessageSeverity) -> egui::Color32 {
        match severity {
            MessageSeverity::Info => egui::Color32::from_rgb(59, 130, 246),
            MessageSeverity::Success => egui::Color32::from_rgb(5, 150, 105),
            MessageSeverity::Warning => egui::Color32::from_rgb(217, 119, 6),
            MessageSeverity::Error => egui::Color32::from_rgb(220, 38, 38),
        }
    }

    /// Notice with a close button. Returns true when dismissed.
    pub fn notice(ui: &mut egui::Ui, msg: &StatusMessage) -> bool {
        let color = Self::severity_color(msg.severity);
        let mut dismissed = false;
        egui::Frame::none()
            .inner_margin(egui::Margin::same(14.0))
            .rounding(egui::Rounding::same(12.0))
            .stroke(egui::Stroke::new(2.0, color))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(&msg.message).color(color).strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        dismissed = ui.button("닫기").clicked();
                    });
                });
            });
        dismissed
    }
}
