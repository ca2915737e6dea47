//! ChainStreamer Hub
//! Desktop client for live and recorded streams registered on Sui

// Hide console window on Windows release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

// Use mimalloc for faster memory allocation (Linux, macOS)
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use eframe::egui;
use std::io::{BufRead, BufReader};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

mod api;
mod chain;
mod classify;
mod config;
mod error;
mod models;
mod notify;
mod refresh;
mod registration;
mod session;
mod throttle;
mod watch;

use api::{BackendClient, HttpTransport, RegistrationOutcome, UreqTransport};
use chain::{parse_object_id, ChainReader, SuiRpcClient};
use config::AppConfig;
use error::HubError;
use models::{format_ago, StreamKind, StreamLists, StreamRecord, Tab};
use notify::{ToastLevel, Toasts};
use refresh::{RefreshOutcome, RefreshTask};
use registration::StreamForm;
use session::{short_address, WalletSession};
use throttle::FetchThrottle;
use watch::WatchTarget;

const CONSOLE_LINES: usize = 500;

/// Case-insensitive substring check without allocation
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() { return true; }
    if needle.len() > haystack.len() { return false; }

    haystack.as_bytes()
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
}

/// Local time as HH:MM:SS
fn timestamp_now() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Window icon: indigo tile, white play triangle, red "live" dot
fn load_icon() -> egui::IconData {
    let size: usize = 64;
    let mut rgba = vec![0u8; size * size * 4];

    for y in 0..size {
        for x in 0..size {
            let idx = (y * size + x) * 4;
            let nx = (x as f32 + 0.5) / size as f32;
            let ny = (y as f32 + 0.5) / size as f32;

            let corner = 0.16;
            let in_tile = {
                let dx = (corner - nx).max(nx - (1.0 - corner)).max(0.0);
                let dy = (corner - ny).max(ny - (1.0 - corner)).max(0.0);
                dx * dx + dy * dy <= corner * corner
            };
            if !in_tile {
                continue;
            }

            // Triangle pointing right, centred slightly left of middle
            let px = nx - 0.36;
            let py = ny - 0.52;
            let in_play = px >= 0.0 && px <= 0.34 && py.abs() <= (0.34 - px) * 0.62;

            let ddx = nx - 0.78;
            let ddy = ny - 0.22;
            let in_dot = ddx * ddx + ddy * ddy <= 0.09 * 0.09;

            let (r, g, b) = if in_dot {
                (239, 68, 68)
            } else if in_play {
                (255, 255, 255)
            } else {
                // #4f46e5 -> #7c3aed
                let t = (nx + ny) * 0.5;
                (
                    (79.0 + (124.0 - 79.0) * t) as u8,
                    (70.0 + (58.0 - 70.0) * t) as u8,
                    (229.0 + (237.0 - 229.0) * t) as u8,
                )
            };

            rgba[idx] = r;
            rgba[idx + 1] = g;
            rgba[idx + 2] = b;
            rgba[idx + 3] = 255;
        }
    }

    egui::IconData {
        rgba,
        width: size as u32,
        height: size as u32,
    }
}

const WINDOWS_EMOJI_FONTS: &[&str] = &["C:\\Windows\\Fonts\\seguiemj.ttf"];
const MACOS_EMOJI_FONTS: &[&str] = &["/System/Library/Fonts/Apple Color Emoji.ttc"];
const LINUX_EMOJI_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/noto/NotoColorEmoji.ttf",
    "/usr/share/fonts/noto-emoji/NotoColorEmoji.ttf",
    "/usr/share/fonts/google-noto-emoji/NotoColorEmoji.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
];

fn emoji_font_paths() -> &'static [&'static str] {
    if cfg!(target_os = "windows") {
        WINDOWS_EMOJI_FONTS
    } else if cfg!(target_os = "macos") {
        MACOS_EMOJI_FONTS
    } else {
        LINUX_EMOJI_FONTS
    }
}

/// Add the first system emoji font found as a proportional fallback
fn install_fonts(ctx: &egui::Context) {
    let mut fonts = egui::FontDefinitions::default();

    for path in emoji_font_paths() {
        if let Ok(font_data) = std::fs::read(path) {
            fonts.font_data.insert(
                "emoji".to_owned(),
                egui::FontData::from_owned(font_data).into(),
            );
            fonts.families
                .entry(egui::FontFamily::Proportional)
                .or_default()
                .push("emoji".to_owned());
            log::debug!("Loaded emoji font {}", path);
            break;
        }
    }

    ctx.set_fonts(fonts);
}

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Force X11 backend on Linux before any windowing code runs
    #[cfg(target_os = "linux")]
    {
        std::env::set_var("WINIT_UNIX_BACKEND", "x11");
        std::env::remove_var("WAYLAND_DISPLAY");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([760.0, 480.0])
            .with_icon(load_icon()),
        vsync: true,
        hardware_acceleration: eframe::HardwareAcceleration::Preferred,
        ..Default::default()
    };

    eframe::run_native(
        "ChainStreamer Hub",
        options,
        Box::new(|cc| {
            install_fonts(&cc.egui_ctx);
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(HubApp::new(&cc.egui_ctx)))
        }),
    )
}

/// Results from background work, drained at the start of every frame
enum TaskResult {
    StreamsLoaded { epoch: u64, outcome: RefreshOutcome },
    Registered { name: String, outcome: Result<RegistrationOutcome, String> },
    PlayerLog(String),
    PlayerExited { code: Option<i32>, stderr: String },
}

enum RowAction {
    Watch(StreamRecord),
    Play(StreamRecord),
    Copied(&'static str),
}

/// Refresh worker and backend client built from one config snapshot
fn build_services(
    config: &AppConfig,
    sender: &Sender<TaskResult>,
    ctx: &egui::Context,
    epoch: u64,
) -> (RefreshTask, Arc<BackendClient>) {
    let transport: Arc<dyn HttpTransport> = Arc::new(UreqTransport::new(config.request_timeout()));

    let reader = ChainReader::new(
        SuiRpcClient::new(&config.rpc_url, transport.clone()),
        config.chain_target(),
    );

    let sender = sender.clone();
    let ctx = ctx.clone();
    let refresh = RefreshTask::spawn(reader, move |outcome| {
        let _ = sender.send(TaskResult::StreamsLoaded { epoch, outcome });
        ctx.request_repaint();
    });

    let backend = Arc::new(BackendClient::new(&config.backend_url_prefix, transport));
    (refresh, backend)
}

struct HubApp {
    config: AppConfig,
    session: WalletSession,

    // State
    current_tab: Tab,
    status_message: String,
    lists: StreamLists,
    has_loaded: bool,
    search_query: String,

    // Refresh
    throttle: FetchThrottle,
    refresh: RefreshTask,
    refresh_pending: bool,
    services_epoch: u64,
    last_auto_refresh: Instant,

    backend: Arc<BackendClient>,

    // Background task channel
    task_receiver: Receiver<TaskResult>,
    task_sender: Sender<TaskResult>,

    create_form: StreamForm,

    // Wallet dialog
    show_connect_dialog: bool,
    address_input: String,
    connect_error: Option<String>,

    // Settings dialog
    show_settings_dialog: bool,
    settings_draft: AppConfig,
    shared_version_input: String,
    settings_error: Option<String>,

    toasts: Toasts,
    console_log: Vec<String>,
    dark_mode: bool,
}

impl HubApp {
    fn new(ctx: &egui::Context) -> Self {
        let config = AppConfig::load();
        let (task_sender, task_receiver) = channel();
        let (refresh, backend) = build_services(&config, &task_sender, ctx, 0);

        let mut app = Self {
            current_tab: Tab::Live,
            status_message: "Ready".to_string(),
            lists: StreamLists::default(),
            has_loaded: false,
            search_query: String::new(),
            throttle: FetchThrottle::new(config.throttle_window()),
            refresh,
            refresh_pending: false,
            services_epoch: 0,
            last_auto_refresh: Instant::now(),
            backend,
            task_receiver,
            task_sender,
            create_form: StreamForm::default(),
            show_connect_dialog: false,
            address_input: config.last_account.clone(),
            connect_error: None,
            show_settings_dialog: false,
            settings_draft: config.clone(),
            shared_version_input: String::new(),
            settings_error: None,
            toasts: Toasts::default(),
            console_log: Vec::new(),
            dark_mode: config.dark_mode,
            session: WalletSession::disconnected(),
            config,
        };

        app.log("[INFO] ChainStreamer Hub started");
        app.log(&format!(
            "[INFO] Backend {} | RPC {}",
            app.config.backend_url_prefix, app.config.rpc_url
        ));

        if !app.config.last_account.is_empty() {
            let last = app.config.last_account.clone();
            app.connect_wallet(&last);
        }

        app
    }

    /// Append to the console and mirror to the log facade by tag
    fn log(&mut self, message: &str) {
        if message.starts_with("[ERROR]") {
            log::error!("{}", message);
        } else if message.starts_with("[WARN]") {
            log::warn!("{}", message);
        } else {
            log::info!("{}", message);
        }

        self.console_log.push(format!("[{}] {}", timestamp_now(), message));
        if self.console_log.len() > CONSOLE_LINES {
            self.console_log.remove(0);
        }
    }

    fn report_error(&mut self, context: &str, message: &str) {
        self.toasts.error(message);
        self.log(&format!("[ERROR] {}: {}", context, message));
        self.status_message = format!("Error: {}", message);
    }

    fn connect_wallet(&mut self, input: &str) -> bool {
        match WalletSession::connect(input) {
            Ok(session) => {
                let account = session.account().unwrap_or_default().to_string();
                let switched = self.session.account() != Some(account.as_str());

                self.session = session;
                if switched {
                    self.refresh.invalidate();
                    self.lists = StreamLists::default();
                    self.has_loaded = false;
                }
                self.refresh_pending = true;
                self.connect_error = None;
                self.log(&format!("[INFO] Wallet connected: {}", account));
                self.status_message = format!("Connected as {}", short_address(&account));

                if self.config.last_account != account {
                    self.config.last_account = account;
                    self.config.save();
                }
                true
            }
            Err(e) => {
                self.connect_error = Some(e.to_string());
                self.log(&format!("[WARN] {}", e));
                false
            }
        }
    }

    fn disconnect_wallet(&mut self) {
        self.session = WalletSession::disconnected();
        self.refresh.invalidate();
        self.refresh_pending = false;
        self.lists = StreamLists::default();
        self.has_loaded = false;
        self.create_form.hide();
        self.config.last_account.clear();
        self.config.save();
        self.log("[INFO] Wallet disconnected");
        self.status_message = "Disconnected".to_string();
    }

    /// Wallet gate for UI actions: prompt and abort when nobody is connected
    fn require_wallet(&mut self) -> bool {
        if self.session.is_connected() {
            return true;
        }
        let message = HubError::WalletNotConnected.to_string();
        self.toasts.error(message.as_str());
        self.log(&format!("[WARN] {}", message));
        self.show_connect_dialog = true;
        false
    }

    /// Swap in a fresh worker and backend client after a config change
    fn rebuild_services(&mut self, ctx: &egui::Context) {
        self.services_epoch += 1;
        let (refresh, backend) = build_services(&self.config, &self.task_sender, ctx, self.services_epoch);

        // Dropping the old task cancels it; its in-flight result never arrives
        self.refresh = refresh;
        self.backend = backend;
        self.throttle.finish();
        self.throttle.set_window(self.config.throttle_window());
        self.refresh_pending = self.session.is_connected();
        self.log("[INFO] Settings applied, services restarted");
    }

    fn drive_refresh(&mut self, now: Instant) {
        if let Some(interval) = self.config.auto_refresh_interval() {
            if self.session.is_connected() && now.saturating_duration_since(self.last_auto_refresh) >= interval {
                self.refresh_pending = true;
                self.last_auto_refresh = now;
            }
        }

        self.throttle.set_writing(self.create_form.is_writing());

        if !self.refresh_pending {
            return;
        }
        if !self.session.is_connected() {
            self.refresh_pending = false;
            return;
        }
        if !self.throttle.try_begin(now) {
            return;
        }

        self.refresh_pending = false;
        self.last_auto_refresh = now;
        if self.refresh.request(self.session.clone()) {
            self.status_message = "Loading streams...".to_string();
        } else {
            self.throttle.finish();
            self.log("[ERROR] Refresh worker is not running");
        }
    }

    fn handle_streams_loaded(&mut self, outcome: RefreshOutcome) {
        self.throttle.finish();

        if !self.refresh.is_current(outcome.generation) {
            self.log("[INFO] Discarded stream list fetched for a previous session");
            return;
        }

        match outcome.result {
            Ok(lists) => {
                self.log(&format!(
                    "[INFO] Loaded {} live and {} VOD streams",
                    lists.live.len(),
                    lists.vod.len()
                ));
                self.status_message = format!(
                    "{} live, {} VOD | updated {}",
                    lists.live.len(),
                    lists.vod.len(),
                    timestamp_now()
                );
                self.lists = lists;
                self.has_loaded = true;
            }
            Err(msg) => self.report_error("Failed to fetch streams", &msg),
        }
    }

    fn handle_registered(&mut self, name: String, outcome: Result<RegistrationOutcome, String>) {
        match self.create_form.finish(outcome, &mut self.toasts) {
            Ok(()) => {
                self.log(&format!("[INFO] Stream '{}' created", name));
                self.status_message = format!("Stream '{}' created", name);
                self.refresh_pending = true;
            }
            Err(msg) => {
                self.log(&format!("[ERROR] Failed to create '{}': {}", name, msg));
                self.status_message = format!("Error: {}", msg);
            }
        }
    }

    fn submit_stream(&mut self, ctx: &egui::Context) {
        let request = match self.create_form.begin_submit(&self.session) {
            Ok(request) => request,
            Err(HubError::WalletNotConnected) => {
                self.require_wallet();
                return;
            }
            // Shown inside the form
            Err(_) => return,
        };
        self.log(&format!("[INFO] Creating stream '{}'", request.name));

        let backend = self.backend.clone();
        let session = self.session.clone();
        let sender = self.task_sender.clone();
        let ctx = ctx.clone();

        thread::spawn(move || {
            let outcome = backend
                .create_live_stream(&session, &request)
                .map_err(|e| e.to_string());
            let _ = sender.send(TaskResult::Registered { name: request.name, outcome });
            ctx.request_repaint();
        });
    }

    fn watch(&mut self, record: &StreamRecord) {
        let url = match watch::watch_url(
            &self.session,
            &self.config.player_page_url,
            self.backend.url_prefix(),
            record,
        ) {
            Ok(url) => url,
            Err(HubError::WalletNotConnected) => {
                self.require_wallet();
                return;
            }
            Err(e) => {
                self.report_error("Cannot watch", &e.to_string());
                return;
            }
        };

        match watch::open_in_browser(&url) {
            Ok(()) => {
                self.log(&format!("[PLAY] {} | {}", record.name, url));
                self.status_message = format!("Opened '{}' in browser", record.name);
            }
            Err(e) => self.report_error("Failed to open browser", &e.to_string()),
        }
    }

    /// Launch the configured media player on the raw playlist endpoint
    fn play_external(&mut self, record: &StreamRecord) {
        if !self.require_wallet() {
            return;
        }
        let target = match WatchTarget::for_record(record) {
            Ok(target) => target,
            Err(e) => {
                self.report_error("Cannot play", &e.to_string());
                return;
            }
        };
        let playlist = target.playlist_url(self.backend.url_prefix());
        let player = self.config.external_player.clone();
        self.log(&format!("[PLAY] {} | {} {}", record.name, player, playlist));

        let mut child = match watch::launch_player(&player, &playlist) {
            Ok(child) => child,
            Err(e) => {
                self.report_error("Player", &e.to_string());
                return;
            }
        };
        self.log(&format!("[PLAY] Player launched (PID: {})", child.id()));

        if let Some(stderr) = child.stderr.take() {
            let sender = self.task_sender.clone();
            thread::spawn(move || {
                for line in BufReader::new(stderr).lines().map_while(|l| l.ok()) {
                    if !line.trim().is_empty() {
                        let _ = sender.send(TaskResult::PlayerLog(format!("[PLAYER] {}", line)));
                    }
                }
            });
        }

        let sender = self.task_sender.clone();
        let name = record.name.clone();
        thread::spawn(move || match child.wait() {
            Ok(status) if !status.success() => {
                let _ = sender.send(TaskResult::PlayerExited {
                    code: status.code(),
                    stderr: format!("Player exited with error for '{}'", name),
                });
            }
            Ok(_) => {}
            Err(e) => {
                let _ = sender.send(TaskResult::PlayerLog(format!("[ERROR] Failed to wait for player: {}", e)));
            }
        });
    }

    fn open_settings(&mut self) {
        self.settings_draft = self.config.clone();
        self.shared_version_input = self
            .config
            .streamer_initial_shared_version
            .map(|v| v.to_string())
            .unwrap_or_default();
        self.settings_error = None;
        self.show_settings_dialog = true;
    }

    fn apply_settings(&mut self, ctx: &egui::Context) -> Result<(), String> {
        let mut draft = self.settings_draft.clone();

        draft.streamer_initial_shared_version = match self.shared_version_input.trim() {
            "" => None,
            s => Some(s.parse::<u64>().map_err(|_| format!("Invalid shared version '{}'", s))?),
        };
        parse_object_id(&draft.package_id).map_err(|e| format!("Package ID: {}", e))?;
        parse_object_id(&draft.streamer_object_id).map_err(|e| format!("Streamer object: {}", e))?;

        draft.dark_mode = self.dark_mode;
        draft.last_account = self.config.last_account.clone();

        let restart = draft.rpc_url != self.config.rpc_url
            || draft.backend_url_prefix != self.config.backend_url_prefix
            || draft.request_timeout_secs != self.config.request_timeout_secs
            || draft.chain_target() != self.config.chain_target();

        self.config = draft;
        self.config.save();
        self.throttle.set_window(self.config.throttle_window());
        if restart {
            self.rebuild_services(ctx);
        } else {
            self.log("[INFO] Settings saved");
        }
        Ok(())
    }

    fn matches_search(&self, record: &StreamRecord) -> bool {
        let query = self.search_query.trim();
        contains_ignore_case(&record.name, query) || contains_ignore_case(&record.description, query)
    }

    fn show_stream_list(&mut self, ui: &mut egui::Ui, kind: StreamKind) {
        if !self.has_loaded {
            let loading = self.throttle.is_in_flight() || self.refresh_pending;
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                if loading {
                    ui.spinner();
                    ui.label("Loading streams...");
                } else {
                    ui.label(egui::RichText::new("Streams not loaded. Press Refresh to try again.").weak());
                }
            });
            return;
        }

        let (records, empty_text) = match kind {
            StreamKind::Live => (&self.lists.live, "No active streams found"),
            StreamKind::Vod => (&self.lists.vod, "No VOD streams found"),
        };

        if records.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.label(egui::RichText::new(empty_text).weak());
            });
            return;
        }

        let now = chrono::Utc::now();
        let backend = self.backend.url_prefix();
        let rtmp_prefix = self.config.rtmp_url_prefix.as_str();
        let has_player = !self.config.external_player.trim().is_empty();
        let mut action: Option<RowAction> = None;

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for record in records.iter().filter(|r| self.matches_search(r)) {
                    egui::Frame::group(ui.style()).show(ui, |ui| {
                        ui.set_width(ui.available_width());

                        ui.horizontal(|ui| {
                            match (kind, record.index.as_deref()) {
                                (StreamKind::Live, _) => {
                                    ui.label(egui::RichText::new("● LIVE").strong().color(egui::Color32::RED));
                                }
                                (StreamKind::Vod, Some(index)) => {
                                    ui.label(egui::RichText::new(format!("#{}", index)).strong().weak());
                                }
                                (StreamKind::Vod, None) => {}
                            }
                            ui.label(egui::RichText::new(&record.name).strong().size(16.0));
                        });

                        if !record.description.is_empty() {
                            ui.label(&record.description);
                        }

                        if let Some(key) = record.url.as_deref().filter(|k| !k.is_empty()) {
                            let push = format!("{}{}", rtmp_prefix, key);
                            ui.horizontal(|ui| {
                                ui.label(egui::RichText::new(format!("RTMP push: {}", push)).monospace().weak());
                                if ui.small_button("📋").on_hover_text("Copy RTMP push URL").clicked() {
                                    ui.ctx().copy_text(push.clone());
                                    action = Some(RowAction::Copied("RTMP push URL copied"));
                                }
                            });
                            ui.label(
                                egui::RichText::new(format!("View URL: {}", api::live_m3u8_url(backend, key)))
                                    .monospace()
                                    .weak(),
                            );
                        }

                        if let Some(millis) = record.timestamp_millis() {
                            ui.label(
                                egui::RichText::new(format!("Started {} ago", format_ago(millis, now)))
                                    .small()
                                    .weak(),
                            );
                        }

                        ui.horizontal(|ui| {
                            if ui.button("▶ Watch").on_hover_text("Open the player page in your browser").clicked() {
                                action = Some(RowAction::Watch(record.clone()));
                            }
                            if has_player && ui.button("🎬 Play").on_hover_text("Open in the external player").clicked() {
                                action = Some(RowAction::Play(record.clone()));
                            }
                        });
                    });
                    ui.add_space(4.0);
                }
            });

        match action {
            Some(RowAction::Watch(record)) => self.watch(&record),
            Some(RowAction::Play(record)) => self.play_external(&record),
            Some(RowAction::Copied(text)) => self.toasts.info(text),
            None => {}
        }
    }

    fn show_console_tab(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Console Log");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("🗑 Clear").clicked() {
                    self.console_log.clear();
                    self.console_log.push(format!("[{}] Console cleared", timestamp_now()));
                }
            });
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in &self.console_log {
                    let color = if line.contains("[ERROR]") {
                        egui::Color32::RED
                    } else if line.contains("[WARN]") {
                        egui::Color32::YELLOW
                    } else if line.contains("[INFO]") {
                        egui::Color32::LIGHT_BLUE
                    } else if line.contains("[PLAY]") {
                        egui::Color32::GREEN
                    } else {
                        egui::Color32::GRAY
                    };

                    ui.label(egui::RichText::new(line).monospace().color(color));
                }
            });
    }

    fn render_connect_dialog(&mut self, ctx: &egui::Context) {
        let mut open = true;
        let mut connect = false;

        egui::Window::new("👛 Connect Wallet")
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Sui address:");
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.address_input)
                        .hint_text("0x…")
                        .desired_width(440.0),
                );
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    connect = true;
                }
                if let Some(err) = &self.connect_error {
                    ui.colored_label(egui::Color32::RED, err);
                }
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    if ui.button("Connect").clicked() {
                        connect = true;
                    }
                    if ui.button("Cancel").clicked() {
                        self.show_connect_dialog = false;
                    }
                });
            });

        if connect {
            let input = self.address_input.clone();
            if self.connect_wallet(&input) {
                self.show_connect_dialog = false;
            }
        }
        if !open {
            self.show_connect_dialog = false;
        }
    }

    fn render_create_dialog(&mut self, ctx: &egui::Context) {
        let mut open = true;
        let mut submit = false;

        egui::Window::new("➕ New Stream")
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .min_width(420.0)
            .show(ctx, |ui| {
                egui::Grid::new("create_stream_grid")
                    .num_columns(2)
                    .spacing([12.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("Stream URL:");
                        ui.horizontal(|ui| {
                            ui.label(egui::RichText::new(&self.config.rtmp_url_prefix).monospace().weak());
                            ui.add(egui::TextEdit::singleline(&mut self.create_form.request.url).hint_text("stream key"));
                        });
                        ui.end_row();

                        ui.label("Stream Title");
                        ui.add(egui::TextEdit::singleline(&mut self.create_form.request.name).desired_width(280.0));
                        ui.end_row();

                        ui.label("Description");
                        ui.add(
                            egui::TextEdit::multiline(&mut self.create_form.request.description)
                                .desired_width(280.0)
                                .desired_rows(3),
                        );
                        ui.end_row();
                    });

                if let Some(err) = &self.create_form.error {
                    ui.colored_label(egui::Color32::RED, err);
                }

                ui.separator();
                ui.horizontal(|ui| {
                    let pending = self.create_form.is_pending();
                    if ui.add_enabled(!pending, egui::Button::new("Start Streaming")).clicked() {
                        submit = true;
                    }
                    if pending {
                        ui.spinner();
                        ui.label("Creating...");
                    }
                    if ui.button("Cancel").clicked() {
                        self.create_form.hide();
                    }
                });
            });

        if submit {
            self.submit_stream(ctx);
        }
        if !open {
            self.create_form.hide();
        }
    }

    fn render_settings_dialog(&mut self, ctx: &egui::Context) {
        let mut open = true;
        let mut save = false;

        egui::Window::new("⚙ Settings")
            .collapsible(false)
            .resizable(true)
            .open(&mut open)
            .min_width(520.0)
            .show(ctx, |ui| {
                let draft = &mut self.settings_draft;

                ui.heading("Backend");
                egui::Grid::new("settings_backend")
                    .num_columns(2)
                    .spacing([12.0, 6.0])
                    .show(ui, |ui| {
                        ui.label("Backend URL prefix:");
                        ui.add(egui::TextEdit::singleline(&mut draft.backend_url_prefix).desired_width(320.0));
                        ui.end_row();
                        ui.label("RTMP URL prefix:");
                        ui.add(egui::TextEdit::singleline(&mut draft.rtmp_url_prefix).desired_width(320.0));
                        ui.end_row();
                        ui.label("Player page:");
                        ui.add(egui::TextEdit::singleline(&mut draft.player_page_url).desired_width(320.0));
                        ui.end_row();
                    });

                ui.separator();
                ui.heading("Chain");
                egui::Grid::new("settings_chain")
                    .num_columns(2)
                    .spacing([12.0, 6.0])
                    .show(ui, |ui| {
                        ui.label("RPC URL:");
                        ui.add(egui::TextEdit::singleline(&mut draft.rpc_url).desired_width(320.0));
                        ui.end_row();
                        ui.label("Package ID:");
                        ui.add(egui::TextEdit::singleline(&mut draft.package_id).desired_width(320.0));
                        ui.end_row();
                        ui.label("Streamer object:");
                        ui.add(egui::TextEdit::singleline(&mut draft.streamer_object_id).desired_width(320.0));
                        ui.end_row();
                        ui.label("Shared version:");
                        ui.add(
                            egui::TextEdit::singleline(&mut self.shared_version_input)
                                .hint_text("looked up when empty")
                                .desired_width(160.0),
                        );
                        ui.end_row();
                    });

                ui.separator();
                ui.heading("Refresh");
                egui::Grid::new("settings_refresh")
                    .num_columns(2)
                    .spacing([12.0, 6.0])
                    .show(ui, |ui| {
                        ui.label("Fetch throttle:");
                        ui.add(egui::DragValue::new(&mut draft.fetch_throttle_ms).range(0..=60_000).suffix(" ms"));
                        ui.end_row();
                        ui.label("Auto refresh:");
                        ui.add(egui::DragValue::new(&mut draft.auto_refresh_secs).range(0..=3600).suffix(" s"))
                            .on_hover_text("0 = off");
                        ui.end_row();
                        ui.label("Request timeout:");
                        ui.add(egui::DragValue::new(&mut draft.request_timeout_secs).range(1..=300).suffix(" s"));
                        ui.end_row();
                    });

                ui.separator();
                ui.heading("External player");
                ui.horizontal(|ui| {
                    ui.add(
                        egui::TextEdit::singleline(&mut draft.external_player)
                            .hint_text("mpv, vlc, ffplay... (optional)")
                            .desired_width(320.0),
                    );
                    if ui.button("📂 Browse").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .set_title("Select Media Player")
                            .pick_file()
                        {
                            draft.external_player = path.display().to_string();
                        }
                    }
                });

                if let Some(err) = &self.settings_error {
                    ui.colored_label(egui::Color32::RED, err);
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        save = true;
                    }
                    if ui.button("Cancel").clicked() {
                        self.show_settings_dialog = false;
                    }
                });
            });

        if save {
            match self.apply_settings(ctx) {
                Ok(()) => self.show_settings_dialog = false,
                Err(e) => self.settings_error = Some(e),
            }
        }
        if !open {
            self.show_settings_dialog = false;
        }
    }

    fn render_toasts(&self, ctx: &egui::Context) {
        if self.toasts.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, [-12.0, -36.0])
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                for toast in self.toasts.iter() {
                    let color = match toast.level {
                        ToastLevel::Success => egui::Color32::from_rgb(34, 197, 94),
                        ToastLevel::Info => egui::Color32::LIGHT_BLUE,
                        ToastLevel::Error => egui::Color32::from_rgb(239, 68, 68),
                    };
                    egui::Frame::popup(ui.style()).show(ui, |ui| {
                        ui.set_max_width(320.0);
                        ui.label(egui::RichText::new(&toast.text).color(color));
                    });
                    ui.add_space(4.0);
                }
            });
    }
}

impl eframe::App for HubApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Process background task results (non-blocking)
        while let Ok(result) = self.task_receiver.try_recv() {
            match result {
                TaskResult::StreamsLoaded { epoch, outcome } => {
                    if epoch == self.services_epoch {
                        self.handle_streams_loaded(outcome);
                    }
                }
                TaskResult::Registered { name, outcome } => self.handle_registered(name, outcome),
                TaskResult::PlayerLog(msg) => self.log(&msg),
                TaskResult::PlayerExited { code, stderr } => {
                    let exit_msg = match code {
                        Some(c) => format!("[WARN] Player exited with code {}: {}", c, stderr),
                        None => format!("[WARN] Player terminated by signal: {}", stderr),
                    };
                    self.log(&exit_msg);
                    self.status_message = stderr;
                }
            }
        }

        let now = Instant::now();
        self.toasts.prune(now);
        self.drive_refresh(now);

        if self.refresh_pending || self.create_form.is_pending() || !self.toasts.is_empty() {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
        if let Some(interval) = self.config.auto_refresh_interval() {
            ctx.request_repaint_after(interval);
        }

        // Apply theme
        if self.dark_mode {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }

        // Top panel - Controls
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_space(5.0);
            ui.horizontal(|ui| {
                ui.heading("📡 ChainStreamer Hub");
                ui.separator();

                if ui.button("➕ New Stream").clicked() && self.require_wallet() {
                    self.create_form.show();
                }

                let refresh_btn = ui.add_enabled(self.session.is_connected(), egui::Button::new("🔄 Refresh"));
                if refresh_btn.on_hover_text("Reload streams from chain").clicked() {
                    self.refresh_pending = true;
                }

                ui.separator();
                if ui.checkbox(&mut self.dark_mode, "🌙 Dark").changed() {
                    self.config.dark_mode = self.dark_mode;
                    self.config.save();
                }
                if ui.button("⚙ Settings").clicked() {
                    self.open_settings();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    match self.session.account().map(str::to_string) {
                        Some(account) => {
                            if ui.button("Disconnect").clicked() {
                                self.disconnect_wallet();
                            }
                            if ui.button(format!("👛 {}", short_address(&account)))
                                .on_hover_text(format!("{}\nClick to copy", account))
                                .clicked()
                            {
                                ui.ctx().copy_text(account);
                                self.toasts.info("Address copied");
                            }
                        }
                        None => {
                            if ui.button("👛 Connect Wallet").clicked() {
                                self.connect_error = None;
                                self.show_connect_dialog = true;
                            }
                        }
                    }
                });
            });
            ui.add_space(5.0);
        });

        // Bottom panel - Status
        egui::TopBottomPanel::bottom("bottom_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.throttle.is_in_flight() || self.create_form.is_pending() {
                    ui.spinner();
                }
                ui.label(&self.status_message);
            });
        });

        // Main content
        egui::CentralPanel::default().show(ctx, |ui| {
            if !self.session.is_connected() {
                ui.vertical_centered(|ui| {
                    ui.add_space(100.0);
                    ui.heading("📡 ChainStreamer Hub");
                    ui.add_space(20.0);
                    ui.label("Connect your wallet to browse live and recorded streams");
                    ui.add_space(10.0);
                    if ui.button("👛 Connect Wallet").clicked() {
                        self.connect_error = None;
                        self.show_connect_dialog = true;
                    }
                });
                return;
            }

            // Tab bar
            ui.horizontal(|ui| {
                let live = format!("📡 Live Streams ({})", self.lists.live.len());
                let vod = format!("🎞 VOD Streams ({})", self.lists.vod.len());
                ui.selectable_value(&mut self.current_tab, Tab::Live, live);
                ui.selectable_value(&mut self.current_tab, Tab::Vod, vod);
                ui.selectable_value(&mut self.current_tab, Tab::Console, "🖥 Console");

                if self.current_tab != Tab::Console {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.add(
                            egui::TextEdit::singleline(&mut self.search_query)
                                .hint_text("🔍 Search")
                                .desired_width(200.0),
                        );
                    });
                }
            });
            ui.separator();

            match self.current_tab {
                Tab::Live => self.show_stream_list(ui, StreamKind::Live),
                Tab::Vod => self.show_stream_list(ui, StreamKind::Vod),
                Tab::Console => self.show_console_tab(ui),
            }
        });

        if self.show_connect_dialog {
            self.render_connect_dialog(ctx);
        }
        if self.create_form.open {
            self.render_create_dialog(ctx);
        }
        if self.show_settings_dialog {
            self.render_settings_dialog(ctx);
        }

        self.render_toasts(ctx);
    }
}
