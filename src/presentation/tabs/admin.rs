use crate::domain::booth::Booth;
use crate::domain::models::{Category, MessageSeverity, Tab, CHOICE_COUNT};
use crate::presentation::app::KioskApp;
use crate::presentation::components::Components;
use eframe::egui;
use tracing::error;

pub fn render(app: &mut KioskApp, ui: &mut egui::Ui) {
    Components::heading(ui, "관리자");
    ui.add_space(20.0);

    if !app.admin.is_authenticated() {
        ui_pin_gate(app, ui);
        return;
    }

    if let Some(msg) = app.status_message.clone() {
        if Components::notice(ui, &msg) {
            app.status_message = None;
        }
        ui.add_space(15.0);
    }

    ui_booth_panel(app, ui);
    ui.add_space(15.0);

    ui_question_editor(app, ui);
    ui.add_space(15.0);

    ui_bulk_panel(app, ui);
}

fn ui_pin_gate(app: &mut KioskApp, ui: &mut egui::Ui) {
    Components::card(ui, "관리자 PIN 입력", |ui| {
        let response = ui.add(
            egui::TextEdit::singleline(&mut app.pin_input)
                .password(true)
                .desired_width(200.0),
        );
        let submitted =
            response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        if ui.button("확인").clicked() || submitted {
            let pin = std::mem::take(&mut app.pin_input);
            match app.admin.login(&pin) {
                Ok(()) => app.notify("관리자 모드", MessageSeverity::Info),
                Err(e) => {
                    app.notify(format!("PIN 오류: {}", e), MessageSeverity::Error);
                    app.selected_tab = Tab::Play;
                }
            }
        }
    });
}

fn ui_booth_panel(app: &mut KioskApp, ui: &mut egui::Ui) {
    Components::card(ui, "부스 설정", |ui| {
        let current = app.admin.booth();
        let mut selected = current;
        ui.horizontal(|ui| {
            ui.label("이 키오스크의 부스:");
            egui::ComboBox::from_id_salt("booth_select")
                .selected_text(selected.to_string())
                .show_ui(ui, |ui| {
                    for booth in Booth::ALL {
                        ui.selectable_value(&mut selected, booth, booth.to_string());
                    }
                });
        });
        if selected != current {
            app.admin.set_booth(selected);
        }

        if ui.button("로그아웃").clicked() {
            app.admin.logout();
            app.selected_tab = Tab::Play;
        }
    });
}

fn ui_question_editor(app: &mut KioskApp, ui: &mut egui::Ui) {
    Components::card(ui, "문항 편집", |ui| {
        let mut save_requests = Vec::new();

        for category in Category::ALL {
            let ids: Vec<String> = app
                .admin
                .buffer
                .ids()
                .iter()
                .filter(|id| {
                    app.admin
                        .buffer
                        .draft(id)
                        .is_some_and(|q| q.category == category)
                })
                .cloned()
                .collect();

            egui::CollapsingHeader::new(category.as_str())
                .id_salt(category.as_str())
                .show(ui, |ui| {
                    for id in &ids {
                        let dirty = app.admin.buffer.is_dirty(id);
                        let Some(draft) = app.admin.buffer.draft_mut(id) else {
                            continue;
                        };

                        ui.group(|ui| {
                            ui.horizontal(|ui| {
                                ui.label(egui::RichText::new(&draft.id).strong());
                                ui.checkbox(&mut draft.enabled, "사용");
                                if ui.add_enabled(dirty, egui::Button::new("저장")).clicked() {
                                    save_requests.push(id.clone());
                                }
                            });
                            ui.add(
                                egui::TextEdit::singleline(&mut draft.question)
                                    .desired_width(f32::INFINITY),
                            );
                            for i in 0..CHOICE_COUNT {
                                ui.horizontal(|ui| {
                                    ui.radio_value(&mut draft.answer, i as u8, "정답");
                                    ui.add(
                                        egui::TextEdit::singleline(&mut draft.choices[i])
                                            .desired_width(f32::INFINITY),
                                    );
                                });
                            }
                        });
                    }
                });
        }

        for id in save_requests {
            if app.admin.save_card(&id).is_some() {
                app.reload_play();
                app.notify(format!("{} 저장됨", id), MessageSeverity::Success);
            }
        }

        ui.horizontal(|ui| {
            let has_changes = app.admin.buffer.has_changes();
            if ui
                .add_enabled(has_changes, egui::Button::new("모두 저장"))
                .clicked()
            {
                app.admin.save_all();
                app.reload_play();
                app.notify("모든 문항을 저장했어요", MessageSeverity::Success);
            }
            if ui
                .add_enabled(has_changes, egui::Button::new("변경 취소"))
                .clicked()
            {
                app.admin.buffer.discard();
            }
        });
    });
}

fn ui_bulk_panel(app: &mut KioskApp, ui: &mut egui::Ui) {
    Components::card(ui, "가져오기 / 내보내기", |ui| {
        ui.horizontal(|ui| {
            if ui.button("JSON 내보내기").clicked() {
                app.admin.export();
            }
            if ui.button("JSON 가져오기").clicked() {
                match app.admin.import() {
                    Ok(_) => {
                        app.reload_play();
                        app.notify("문항을 가져왔어요", MessageSeverity::Success);
                    }
                    Err(e) => app.notify(e.to_string(), MessageSeverity::Error),
                }
            }
            if ui.button("기본값으로 초기화").clicked() {
                app.admin.reset_bank();
                app.reload_play();
                app.notify("문항을 기본값으로 초기화했어요", MessageSeverity::Warning);
            }
        });

        ui.add(
            egui::TextEdit::multiline(&mut app.admin.document)
                .code_editor()
                .desired_rows(10)
                .desired_width(f32::INFINITY),
        );

        ui.horizontal(|ui| {
            ui.label("파일:");
            ui.text_edit_singleline(&mut app.document_path);
            if ui.button("파일로 저장").clicked() {
                match std::fs::write(&app.document_path, &app.admin.document) {
                    Ok(()) => app.notify(
                        format!("{} 에 저장했어요", app.document_path),
                        MessageSeverity::Success,
                    ),
                    Err(e) => {
                        error!("Failed to write {}: {}", app.document_path, e);
                        app.notify(format!("파일 저장 실패: {}", e), MessageSeverity::Error);
                    }
                }
            }
            if ui.button("파일 열기").clicked() {
                match std::fs::read_to_string(&app.document_path) {
                    Ok(contents) => app.admin.document = contents,
                    Err(e) => {
                        error!("Failed to read {}: {}", app.document_path, e);
                        app.notify(format!("파일 열기 실패: {}", e), MessageSeverity::Error);
                    }
                }
            }
        });
    });
}
