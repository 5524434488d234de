use std::{collections::BTreeMap, path::PathBuf, time::Duration};

use client_core::{DisplayResolution, Snapshot, ViewState};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::FieldName;

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::{
        events::{err_label, UiError, UiErrorContext, UiEvent},
        orchestration::dispatch_backend_command,
    },
};

/// Frames to wait for the viewport to report a monitor size before falling back.
const MONITOR_PROBE_FRAMES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusBannerSeverity {
    Error,
}

#[derive(Debug, Clone)]
struct StatusBanner {
    severity: StatusBannerSeverity,
    title: &'static str,
    message: String,
}

impl StatusBanner {
    fn from_ui_error(err: &UiError) -> Self {
        let title = match err.context() {
            UiErrorContext::BackendStartup => "Startup",
            UiErrorContext::Submit => err_label(err.category()),
        };
        Self {
            severity: StatusBannerSeverity::Error,
            title,
            message: err.message().to_string(),
        }
    }
}

pub struct BackdropApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    snapshot: Option<Snapshot>,
    /// Text being edited; seeded from the first snapshot, then owned by the UI.
    drafts: BTreeMap<FieldName, String>,
    status: String,
    status_banner: Option<StatusBanner>,
    dismissed_form_message: Option<String>,
    started: bool,
    frames: u32,
}

impl BackdropApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            snapshot: None,
            drafts: BTreeMap::new(),
            status: "Starting".to_string(),
            status_banner: None,
            dismissed_form_message: None,
            started: false,
            frames: 0,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Info(message) => {
                    self.status = message;
                }
                UiEvent::Snapshot(snapshot) => {
                    if self.drafts.is_empty() {
                        for field in snapshot.form.fields() {
                            self.drafts.insert(field.name(), field.value().to_string());
                        }
                    }
                    if snapshot.view.status_message() != self.dismissed_form_message.as_deref() {
                        self.dismissed_form_message = None;
                    }
                    self.snapshot = Some(*snapshot);
                }
                UiEvent::Error(err) => {
                    tracing::warn!(
                        category = ?err.category(),
                        context = ?err.context(),
                        "{}",
                        err.message()
                    );
                    self.status_banner = Some(StatusBanner::from_ui_error(&err));
                }
            }
        }
    }

    fn send(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
    }

    /// Reports the monitor's logical size once it is known, or nothing after a few frames.
    fn start_backend_if_needed(&mut self, ctx: &egui::Context) {
        if self.started {
            return;
        }
        self.frames += 1;
        let monitor = ctx.input(|i| i.viewport().monitor_size);
        let display = monitor.map(|size| DisplayResolution {
            width: size.x.round() as u32,
            height: size.y.round() as u32,
        });
        if display.is_none() && self.frames < MONITOR_PROBE_FRAMES {
            return;
        }
        let detected_display = &display;
        tracing::info!(display = ?detected_display, "detected host display");
        self.started = true;
        self.send(BackendCommand::Start { display });
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(banner) = self.status_banner.clone() {
            let (fill, stroke) = match banner.severity {
                StatusBannerSeverity::Error => (
                    egui::Color32::from_rgb(111, 53, 53),
                    egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)),
                ),
            };

            egui::Frame::NONE
                .fill(fill)
                .stroke(stroke)
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(
                            egui::RichText::new(format!("{}: {}", banner.title, banner.message))
                                .color(egui::Color32::WHITE),
                        );
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.status_banner = None;
                            }
                        });
                    });
                });
            ui.add_space(8.0);
        }
    }

    fn show_form_message(&mut self, ui: &mut egui::Ui, snapshot: &Snapshot) {
        let Some(message) = snapshot.view.status_message() else {
            return;
        };
        if self.dismissed_form_message.as_deref() == Some(message) {
            return;
        }
        egui::Frame::NONE
            .fill(egui::Color32::from_rgb(111, 53, 53))
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
            .corner_radius(8.0)
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.label(egui::RichText::new(message).color(egui::Color32::WHITE));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Dismiss").clicked() {
                            self.dismissed_form_message = Some(message.to_string());
                        }
                    });
                });
            });
        ui.add_space(8.0);
    }

    fn show_form(&mut self, ui: &mut egui::Ui, snapshot: &Snapshot) {
        self.show_form_message(ui, snapshot);

        egui::Grid::new("request_form")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                for name in FieldName::ALL {
                    let field = snapshot.form.field(name);
                    ui.label(egui::RichText::new(name.label()).strong());
                    ui.vertical(|ui| {
                        let draft = self.drafts.entry(name).or_default();
                        let mut changed = false;
                        let mut picked: Option<PathBuf> = None;
                        ui.horizontal(|ui| {
                            let edit = egui::TextEdit::singleline(draft)
                                .id_salt(name.as_str())
                                .desired_width(220.0);
                            changed = ui.add(edit).changed();
                            if name == FieldName::DownloadPath && ui.button("Browse…").clicked() {
                                picked = pick_folder(draft);
                            }
                        });
                        if let Some(folder) = picked {
                            *draft = folder.display().to_string();
                            changed = true;
                        }
                        let value = draft.clone();
                        if let Some(message) = field.error_message() {
                            ui.label(
                                egui::RichText::new(message)
                                    .color(ui.visuals().error_fg_color)
                                    .small(),
                            );
                        }
                        if changed {
                            self.send(BackendCommand::SetField { name, value });
                        }
                    });
                    ui.end_row();
                }
            });

        ui.add_space(12.0);
        if ui
            .add_sized([180.0, 32.0], egui::Button::new("Get Backgrounds"))
            .clicked()
        {
            self.dismissed_form_message = None;
            self.send(BackendCommand::Submit);
        }
    }

    fn show_in_progress(&mut self, ui: &mut egui::Ui, snapshot: &Snapshot) {
        ui.heading("Retrieving backgrounds");
        ui.add_space(8.0);
        let fraction = (snapshot.progress.percent() / 100.0) as f32;
        ui.add(
            egui::ProgressBar::new(fraction)
                .desired_width(ui.available_width())
                .text(snapshot.progress.label()),
        );
        ui.weak(format!("{:.0}%", snapshot.progress.percent()));
    }

    fn show_done(&mut self, ui: &mut egui::Ui, snapshot: &Snapshot) {
        ui.heading("Backgrounds saved");
        ui.label(format!(
            "{} images written to {}",
            snapshot.progress.completed_count(),
            snapshot
                .form
                .field(FieldName::DownloadPath)
                .value()
                .trim()
        ));
        ui.add_space(12.0);
        if ui
            .add_sized([180.0, 32.0], egui::Button::new("Get More Images"))
            .clicked()
        {
            self.send(BackendCommand::Dismiss);
        }
    }
}

fn pick_folder(current: &str) -> Option<PathBuf> {
    let start = Some(PathBuf::from(current.trim()))
        .filter(|path| path.is_dir())
        .or_else(dirs::picture_dir)
        .or_else(dirs::home_dir);
    let mut dialog = rfd::FileDialog::new().set_title("Save backgrounds to");
    if let Some(start) = start {
        dialog = dialog.set_directory(start);
    }
    dialog.pick_folder()
}

impl eframe::App for BackdropApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.start_backend_if_needed(ctx);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.weak(&self.status);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(8.0);
            self.show_status_banner(ui);

            let Some(snapshot) = self.snapshot.clone() else {
                ui.spinner();
                return;
            };
            match snapshot.view.state() {
                ViewState::Form => self.show_form(ui, &snapshot),
                ViewState::InProgress => self.show_in_progress(ui, &snapshot),
                ViewState::Done => self.show_done(ui, &snapshot),
            }
        });

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
