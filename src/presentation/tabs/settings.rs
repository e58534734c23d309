use crate::domain::models::MessageSeverity;
use crate::infrastructure::bluetooth::protocol;
use crate::presentation::app::KioskApp;
use crate::presentation::components::Components;
use eframe::egui;
use tracing::error;

pub fn render(app: &mut KioskApp, ui: &mut egui::Ui) {
    Components::heading(ui, "설정");
    ui.add_space(20.0);

    let mut outcome = None;

    if let Ok(mut settings) = app.settings.lock() {
        let settings_mut = settings.get_mut();

        Components::card(ui, "룰렛 기기", |ui| {
            ui.horizontal(|ui| {
                ui.label("이름 접두사:");
                ui.text_edit_singleline(&mut settings_mut.device_name_prefix);
            });

            ui.collapsing("UUID 직접 지정", |ui| {
                ui.label(
                    egui::RichText::new("⚠️ 잘못 바꾸면 룰렛을 찾지 못할 수 있어요.")
                        .color(egui::Color32::from_rgb(255, 200, 0)),
                );

                egui::Grid::new("ble_uuids")
                    .spacing([10.0, 10.0])
                    .show(ui, |ui| {
                        ui.label("Service:");
                        ui.text_edit_singleline(&mut settings_mut.ble_service_uuid);
                        ui.end_row();
                        ui.label("RX:");
                        ui.text_edit_singleline(&mut settings_mut.ble_rx_char_uuid);
                        ui.end_row();
                    });

                for (label, value) in [
                    ("Service", &settings_mut.ble_service_uuid),
                    ("RX", &settings_mut.ble_rx_char_uuid),
                ] {
                    if protocol::parse_uuid(value).is_err() {
                        ui.label(
                            egui::RichText::new(format!("{} UUID 형식이 올바르지 않아요", label))
                                .color(Components::severity_color(MessageSeverity::Error)),
                        );
                    }
                }
            });
        });

        ui.add_space(10.0);

        Components::card(ui, "로그", |ui| {
            ui.horizontal(|ui| {
                ui.label("레벨:");
                egui::ComboBox::from_id_salt("log_level")
                    .selected_text(&settings_mut.log_settings.level)
                    .show_ui(ui, |ui| {
                        for level in &["trace", "debug", "info", "warn", "error"] {
                            ui.selectable_value(
                                &mut settings_mut.log_settings.level,
                                level.to_string(),
                                *level,
                            );
                        }
                    });
            });

            ui.checkbox(
                &mut settings_mut.log_settings.console_logging_enabled,
                "콘솔 로그",
            );
            ui.checkbox(
                &mut settings_mut.log_settings.file_logging_enabled,
                "파일 로그",
            );

            if settings_mut.log_settings.file_logging_enabled {
                ui.indent("file_logs", |ui| {
                    ui.horizontal(|ui| {
                        ui.label("저장 위치:");
                        ui.text_edit_singleline(&mut settings_mut.log_settings.log_dir);
                    });
                    ui.horizontal(|ui| {
                        ui.label("교체 주기:");
                        egui::ComboBox::from_id_salt("log_rot")
                            .selected_text(&settings_mut.log_settings.rotation)
                            .show_ui(ui, |ui| {
                                for rot in &["daily", "hourly", "never"] {
                                    ui.selectable_value(
                                        &mut settings_mut.log_settings.rotation,
                                        rot.to_string(),
                                        *rot,
                                    );
                                }
                            });
                    });
                });
            }
        });

        ui.add_space(10.0);

        ui.horizontal(|ui| {
            if ui.button("💾 저장").clicked() {
                outcome = Some(settings.save());
            }
            if ui.button("기기 설정 기본값").clicked() {
                outcome = Some(settings.reset_ble_defaults());
            }
        });
        ui.label(
            egui::RichText::new("변경 사항은 다시 시작한 뒤 적용돼요.")
                .italics()
                .size(12.0),
        );
    }

    match outcome {
        Some(Ok(())) => app.notify("설정을 저장했어요", MessageSeverity::Success),
        Some(Err(e)) => {
            error!("Failed to save settings: {}", e);
            app.notify(format!("설정 저장 실패: {}", e), MessageSeverity::Error);
        }
        None => {}
    }
}
