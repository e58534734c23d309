use crate::domain::models::{BluetoothCommand, Category, ConnectionStatus, MessageSeverity, QUESTIONS_PER_CATEGORY};
use crate::domain::play::{AnswerOutcome, PlayStep};
use crate::presentation::app::KioskApp;
use crate::presentation::components::Components;
use eframe::egui;

pub fn render(app: &mut KioskApp, ui: &mut egui::Ui) {
    Components::heading(ui, "퀴즈 룰렛");
    ui.add_space(20.0);

    ui_connection_panel(app, ui);
    ui.add_space(15.0);

    if let Some(msg) = app.status_message.clone() {
        if Components::notice(ui, &msg) {
            app.status_message = None;
        }
        ui.add_space(15.0);
    }

    ui_stage(app, ui);
}

fn ui_connection_panel(app: &mut KioskApp, ui: &mut egui::Ui) {
    Components::card(ui, "룰렛 연결", |ui| {
        let (status_text, bg_color, text_color) = match app.connection_status {
            ConnectionStatus::Connected => (
                "✅ 연결됨",
                egui::Color32::from_rgb(209, 250, 229),
                egui::Color32::from_rgb(6, 95, 70),
            ),
            ConnectionStatus::Connecting => (
                "연결 중...",
                egui::Color32::from_rgb(254, 243, 199),
                egui::Color32::from_rgb(146, 64, 14),
            ),
            ConnectionStatus::Disconnected => (
                "연결 안 됨",
                egui::Color32::from_gray(100),
                egui::Color32::WHITE,
            ),
        };
        Components::status_banner(ui, status_text, bg_color, text_color);

        egui::Grid::new("connection_grid")
            .spacing([30.0, 8.0])
            .show(ui, |ui| {
                ui.label("부스:");
                ui.label(app.booths.get_booth().to_string());
                ui.end_row();

                ui.label("기기:");
                ui.label(app.device_name.as_deref().unwrap_or("-"));
                ui.end_row();
            });

        ui.horizontal(|ui| match app.connection_status {
            ConnectionStatus::Connected => {
                if ui.button("연결 해제").clicked() {
                    app.send_bluetooth(BluetoothCommand::Disconnect);
                }
            }
            ConnectionStatus::Connecting => {
                ui.spinner();
            }
            ConnectionStatus::Disconnected => {
                if ui.button("🔗 룰렛 연결").clicked() {
                    app.begin_connect();
                }
            }
        });
    });
}

fn ui_stage(app: &mut KioskApp, ui: &mut egui::Ui) {
    match app.play.step() {
        PlayStep::CategorySelection => {
            Components::card(ui, "카테고리를 고르세요", |ui| {
                ui.columns(Category::ALL.len(), |columns| {
                    for (column, category) in columns.iter_mut().zip(Category::ALL) {
                        if Components::big_button(column, category.as_str(), true) {
                            let _ = app.play.select_category(category);
                        }
                    }
                });
            });
        }
        PlayStep::IndexSelection { category } => {
            Components::card(ui, &format!("{} - 문항 번호를 고르세요", category), |ui| {
                ui.columns(QUESTIONS_PER_CATEGORY as usize, |columns| {
                    for (column, index) in columns.iter_mut().zip(1..=QUESTIONS_PER_CATEGORY) {
                        if Components::big_button(column, &index.to_string(), true) {
                            if let Err(e) = app.play.select_index(index) {
                                app.notify(e.to_string(), MessageSeverity::Error);
                            }
                        }
                    }
                });
                if ui.button("← 뒤로").clicked() {
                    app.play.back();
                }
            });
        }
        PlayStep::QuestionAnswer { .. } => ui_question(app, ui),
    }
}

fn ui_question(app: &mut KioskApp, ui: &mut egui::Ui) {
    let Some(question) = app.play.current_question().cloned() else {
        app.play.reset();
        return;
    };

    Components::card(ui, &format!("{} {}번", question.category, question.index), |ui| {
        ui.label(egui::RichText::new(&question.question).size(28.0).strong());
        ui.add_space(10.0);

        if !question.enabled {
            ui.label(
                egui::RichText::new("⛔ 이 문항은 지금 풀 수 없어요. 다른 문항을 골라 주세요.")
                    .color(Components::severity_color(MessageSeverity::Warning))
                    .size(22.0),
            );
        } else {
            for (i, choice) in question.choices.iter().enumerate() {
                if Components::big_button(ui, choice, !app.play.is_armed()) {
                    match app.play.answer(i) {
                        Ok(AnswerOutcome::Correct) => {
                            app.notify("정답이에요! 룰렛을 돌려 보세요 🎉", MessageSeverity::Success);
                        }
                        Ok(AnswerOutcome::Incorrect) => {
                            app.notify("틀렸어요! 다른 문항 선택!", MessageSeverity::Warning);
                        }
                        Err(e) => app.notify(e.to_string(), MessageSeverity::Error),
                    }
                }
            }
        }

        if app.play.is_armed() {
            ui.add_space(10.0);
            if Components::big_button(ui, "🎡 룰렛 돌리기", true) {
                app.send_bluetooth(BluetoothCommand::SendStart);
            }
        }

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            if ui.button("← 다른 문항").clicked() {
                app.play.back();
            }
            if ui.button("처음으로").clicked() {
                app.play.reset();
            }
        });
    });
}
