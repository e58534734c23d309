use crate::domain::admin::{AdminFlow, AdminGate};
use crate::domain::booth::BoothRegistry;
use crate::domain::models::{
    AppEvent, BluetoothCommand, ConnectionStatus, DevicePick, MessageSeverity, PickerAnswer,
    ScannedDevice, StatusMessage, Tab,
};
use crate::domain::play::PlayFlow;
use crate::domain::question_store::QuestionStore;
use crate::domain::settings::SettingsService;
use crate::infrastructure::bluetooth::channel::ChannelConfig;
use crate::infrastructure::bluetooth::{BluetoothService, DevicePicker, PlatformTransport};
use crate::infrastructure::logging::LoggingGuard;
use crate::infrastructure::storage;
use eframe::egui;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::{error, info};

pub struct KioskApp {
    // Services
    pub(crate) settings: Arc<Mutex<SettingsService>>,
    pub(crate) questions: QuestionStore,
    pub(crate) booths: BoothRegistry,

    // Flows
    pub(crate) play: PlayFlow,
    pub(crate) admin: AdminFlow,

    // Bluetooth
    pub(crate) bluetooth_tx: mpsc::UnboundedSender<BluetoothCommand>,
    pub(crate) picker_tx: mpsc::UnboundedSender<PickerAnswer>,
    pub(crate) event_rx: mpsc::UnboundedReceiver<AppEvent>,

    // State
    pub(crate) connection_status: ConnectionStatus,
    pub(crate) device_name: Option<String>,
    pub(crate) status_message: Option<StatusMessage>,

    // Device picker
    pub(crate) picker_request: Option<u64>,
    pub(crate) scanned_devices: Vec<ScannedDevice>,

    // UI State
    pub(crate) selected_tab: Tab,
    pub(crate) pin_input: String,
    pub(crate) document_path: String,
    pub(crate) is_dark_mode: bool,

    pub(crate) _logging_guard: Option<LoggingGuard>,
}

impl KioskApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings_service = SettingsService::new().unwrap_or_else(|e| {
            eprintln!("Settings unavailable, using defaults: {}", e);
            SettingsService::at_path("settings.json".into())
        });

        let logging_guard =
            crate::infrastructure::logging::init_logger(&settings_service.get().log_settings)
                .map_err(|e| eprintln!("Failed to initialize logging: {}", e))
                .ok();

        info!("Starting Roulette Quiz Kiosk");

        let is_dark_mode = settings_service.get().dark_mode;
        crate::presentation::theme::configure_kiosk_style(&cc.egui_ctx, is_dark_mode);
        crate::presentation::theme::install_hangul_font(&cc.egui_ctx);

        let store = storage::open_default_store();
        let questions = QuestionStore::new(store.clone());
        let booths = BoothRegistry::new(store.clone());
        let admin = AdminFlow::new(AdminGate::new(store), questions.clone(), booths.clone());
        let play = PlayFlow::new(questions.load());

        let channel_config = ChannelConfig::from_settings(settings_service.get());
        let settings = Arc::new(Mutex::new(settings_service));

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (bt_cmd_tx, bt_cmd_rx) = mpsc::unbounded_channel();
        let (picker_tx, picker_rx) = mpsc::unbounded_channel();
        let bt_booths = booths.clone();

        std::thread::spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    error!("Failed to create tokio runtime for Bluetooth: {}", e);
                    return;
                }
            };

            rt.block_on(async move {
                let picker = DevicePicker::new(picker_rx, event_tx.clone());
                let transport = PlatformTransport::new(picker, event_tx.clone());
                let service = BluetoothService::new(transport, channel_config, bt_booths, event_tx);
                service.run(bt_cmd_rx).await;
            });
        });

        Self {
            settings,
            questions,
            booths,
            play,
            admin,
            bluetooth_tx: bt_cmd_tx,
            picker_tx,
            event_rx,
            connection_status: ConnectionStatus::Disconnected,
            device_name: None,
            status_message: None,
            picker_request: None,
            scanned_devices: Vec::new(),
            selected_tab: Tab::Play,
            pin_input: String::new(),
            document_path: "questions.json".to_string(),
            is_dark_mode,
            _logging_guard: logging_guard,
        }
    }

    pub(crate) fn notify(&mut self, message: impl Into<String>, severity: MessageSeverity) {
        self.status_message = Some(StatusMessage::new(message, severity));
    }

    pub(crate) fn send_bluetooth(&mut self, cmd: BluetoothCommand) {
        if self.bluetooth_tx.send(cmd).is_err() {
            self.notify("Bluetooth worker is not running", MessageSeverity::Error);
        }
    }

    /// Ask the worker to connect; it opens the picker once it is ready
    pub(crate) fn begin_connect(&mut self) {
        self.scanned_devices.clear();
        self.connection_status = ConnectionStatus::Connecting;
        self.send_bluetooth(BluetoothCommand::Connect);
    }

    pub(crate) fn answer_picker(&mut self, pick: DevicePick) {
        if let Some(request) = self.picker_request.take() {
            let _ = self.picker_tx.send(PickerAnswer { request, pick });
        }
    }

    /// Play screen follows whatever the admin last saved
    pub(crate) fn reload_play(&mut self) {
        self.play.reload(self.questions.load());
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                AppEvent::ConnectionStatus(status) => {
                    self.connection_status = status;
                    if status != ConnectionStatus::Connecting {
                        self.picker_request = None;
                    }
                    if status == ConnectionStatus::Disconnected {
                        self.device_name = None;
                    }
                }
                AppEvent::DeviceConnected(name) => {
                    self.notify(format!("✅ 연결됨: {}", name), MessageSeverity::Success);
                    self.device_name = Some(name);
                }
                AppEvent::DeviceFound(device) => {
                    if let Some(existing) = self
                        .scanned_devices
                        .iter_mut()
                        .find(|d| d.address == device.address)
                    {
                        existing.signal_strength = device.signal_strength;
                    } else {
                        self.scanned_devices.push(device);
                    }
                }
                AppEvent::PickerOpened(request) => {
                    self.picker_request = Some(request);
                }
                AppEvent::StartSent(token) => {
                    info!("Roulette started for token {}", token);
                }
                AppEvent::LogMessage(msg) => self.status_message = Some(msg),
            }
        }
    }

    fn ui_device_picker(&mut self, ctx: &egui::Context) {
        if self.picker_request.is_none() {
            return;
        }

        let mut pick = None;
        egui::Window::new("룰렛 기기 선택")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                if self.scanned_devices.is_empty() {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("주변 룰렛 기기를 찾는 중...");
                    });
                }
                for device in &self.scanned_devices {
                    ui.horizontal(|ui| {
                        ui.label(format!("{} ({} dBm)", device.name, device.signal_strength));
                        if ui.button("선택").clicked() {
                            pick = Some(DevicePick::Selected(device.address));
                        }
                    });
                }
                ui.separator();
                if ui.button("취소").clicked() {
                    pick = Some(DevicePick::Cancelled);
                }
            });

        if let Some(pick) = pick {
            self.answer_picker(pick);
        }
    }
}

impl eframe::App for KioskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();
        ctx.request_repaint_after(std::time::Duration::from_millis(100));

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.selectable_value(&mut self.selected_tab, Tab::Play, "🎡 퀴즈");
                ui.selectable_value(&mut self.selected_tab, Tab::Admin, "🔒 관리자");
                if self.admin.is_authenticated() {
                    ui.selectable_value(&mut self.selected_tab, Tab::Settings, "⚙ 설정");
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let switch_icon = if self.is_dark_mode { "☀" } else { "🌙" };
                    if ui.button(switch_icon).clicked() {
                        self.is_dark_mode = !self.is_dark_mode;
                        crate::presentation::theme::configure_kiosk_style(ctx, self.is_dark_mode);
                        if let Ok(mut settings) = self.settings.lock() {
                            settings.get_mut().dark_mode = self.is_dark_mode;
                            if let Err(e) = settings.save() {
                                error!("Failed to save settings: {}", e);
                            }
                        }
                    }
                });
            });
        });

        self.ui_device_picker(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.set_max_width(900.0);
                    ui.add_space(20.0);

                    use crate::presentation::tabs;
                    match self.selected_tab {
                        Tab::Play => tabs::play::render(self, ui),
                        Tab::Admin => tabs::admin::render(self, ui),
                        Tab::Settings => tabs::settings::render(self, ui),
                    }

                    ui.add_space(50.0);
                });
            });
        });
    }
}
