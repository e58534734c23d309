#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod domain;
mod infrastructure;
mod presentation;

use eframe::egui;

fn main() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 768.0])
            .with_title("Roulette Quiz Kiosk"),
        ..Default::default()
    };

    eframe::run_native(
        "Roulette Quiz Kiosk",
        options,
        Box::new(|cc| Ok(Box::new(presentation::app::KioskApp::new(cc)))),
    )
}
