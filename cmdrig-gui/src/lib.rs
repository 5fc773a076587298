use cmdrig_core::{
    build_menu, AppSettings, Control, ControlKind, FieldStore, FormSession, PreviewResponse,
    PreviewTicket,
};
use eframe::egui;
use schema::ConnectorRegistry;
use std::sync::mpsc::{self, Receiver, Sender};

mod client;

pub use client::fetch_preview;

#[derive(Debug, Clone)]
pub struct GuiConfig {
    pub title: String,
    pub width: f32,
    pub height: f32,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            title: "cmdrig".to_string(),
            width: 1100.0,
            height: 680.0,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum GuiError {
    #[error("gui error: {0}")]
    Gui(String),
}

/// Builds the registry (bundled connectors plus overlay files), opens the
/// field store and runs the application.
pub fn run_gui(config: GuiConfig) -> Result<(), GuiError> {
    let settings = AppSettings::load_or_create(&AppSettings::default_path());
    let mut registry = ConnectorRegistry::builtin();
    registry.merge(ConnectorRegistry::load_dir(&settings.connectors_dir));
    let store = FieldStore::open(settings.fields_path());
    let session = FormSession::new(registry, store);
    run_gui_with_session(config, settings, session)
}

pub fn run_gui_with_session(
    config: GuiConfig,
    settings: AppSettings,
    session: FormSession,
) -> Result<(), GuiError> {
    let mut options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([config.width, config.height]),
        ..Default::default()
    };
    // NOTE: Vsync generates hangs and lag on occluded windows.
    options.vsync = false;

    eframe::run_native(
        &config.title,
        options,
        Box::new(move |_cc| Box::new(GuiApp::new(settings, session))),
    )
    .map_err(|err| GuiError::Gui(err.to_string()))
}

type PreviewMessage = (u64, Result<PreviewResponse, String>);

struct GuiApp {
    settings: AppSettings,
    session: FormSession,
    search: String,
    status: String,
    started: bool,
    preview_tx: Sender<PreviewMessage>,
    preview_rx: Receiver<PreviewMessage>,
}

impl GuiApp {
    fn new(settings: AppSettings, session: FormSession) -> Self {
        let (preview_tx, preview_rx) = mpsc::channel();
        Self {
            settings,
            session,
            search: String::new(),
            status: String::new(),
            started: false,
            preview_tx,
            preview_rx,
        }
    }

    /// Sends the ticket's snapshot from a background thread; the result comes
    /// back tagged with the ticket's sequence number so stale responses can
    /// be discarded on receipt.
    fn spawn_preview(&self, ticket: PreviewTicket, ctx: &egui::Context) {
        let url = self.settings.preview_url.clone();
        let tx = self.preview_tx.clone();
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let result = client::fetch_preview(&url, &ticket.snapshot);
            let _ = tx.send((ticket.seq, result));
            ctx.request_repaint();
        });
    }

    fn poll_preview(&mut self) {
        while let Ok((seq, result)) = self.preview_rx.try_recv() {
            let text = match result {
                Ok(response) => response.display_text(),
                Err(message) => message,
            };
            if !self.session.resolve_preview(seq, text) {
                log::debug!("discarding stale preview response (seq {seq})");
            }
        }
    }

    fn restore_on_first_frame(&mut self, ctx: &egui::Context) {
        if self.started {
            return;
        }
        self.started = true;
        match self.session.restore_last_selection() {
            Ok(Some(ticket)) => self.spawn_preview(ticket, ctx),
            Ok(None) => {}
            Err(err) => self.status = format!("Failed to restore last selection: {err}"),
        }
    }

    fn on_form_changed(&mut self, ctx: &egui::Context) {
        match self.session.form_changed() {
            Ok(Some(ticket)) => self.spawn_preview(ticket, ctx),
            Ok(None) => {}
            Err(err) => self.status = format!("Failed to save fields: {err}"),
        }
    }

    fn menu_panel(&mut self, ctx: &egui::Context) {
        let mut clicked: Option<(String, String)> = None;
        egui::SidePanel::left("menu")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.add_space(6.0);
                ui.add_sized(
                    [ui.available_width(), 24.0],
                    egui::TextEdit::singleline(&mut self.search).hint_text("Search connectors"),
                );
                ui.add_space(6.0);
                ui.separator();

                let sections = build_menu(self.session.registry(), &self.search);
                let selection = self.session.selection().clone();
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        for section in &sections {
                            egui::CollapsingHeader::new(section.connector.as_str())
                                .default_open(true)
                                .show(ui, |ui| {
                                    for sub in &section.subs {
                                        let active = selection.connector.as_deref()
                                            == Some(section.connector.as_str())
                                            && selection.sub.as_deref() == Some(sub.as_str());
                                        if ui.selectable_label(active, sub.as_str()).clicked() {
                                            clicked =
                                                Some((section.connector.clone(), sub.clone()));
                                        }
                                    }
                                });
                        }
                    });
            });

        if let Some((name, sub)) = clicked {
            match self.session.select(&name, &sub) {
                Ok(Some(ticket)) => self.spawn_preview(ticket, ctx),
                Ok(None) => {}
                Err(err) => self.status = format!("Failed to save selection: {err}"),
            }
        }
    }

    fn globals_window(&mut self, ctx: &egui::Context) {
        if self.session.globals().is_empty() {
            return;
        }
        let mut changed = false;
        egui::Window::new("Globals")
            .default_pos([290.0, 40.0])
            .show(ctx, |ui| {
                changed = draw_controls(ui, self.session.globals_mut());
            });
        if changed {
            self.on_form_changed(ctx);
        }
    }

    fn extras_window(&mut self, ctx: &egui::Context) {
        if self.session.extras().is_empty() {
            return;
        }
        let mut changed = false;
        egui::Window::new("Extras")
            .default_pos([290.0, 300.0])
            .show(ctx, |ui| {
                changed = draw_controls(ui, self.session.extras_mut());
            });
        if changed {
            self.on_form_changed(ctx);
        }
    }

    fn preview_window(&mut self, ctx: &egui::Context) {
        if self.session.selection().connector.is_none() {
            return;
        }
        egui::Window::new("Preview")
            .default_pos([620.0, 40.0])
            .default_width(420.0)
            .show(ctx, |ui| {
                if self.session.preview().in_flight() {
                    ui.add(egui::Spinner::new().size(16.0));
                }
                let mut display = self.session.preview().display();
                ui.add(
                    egui::TextEdit::multiline(&mut display)
                        .font(egui::TextStyle::Monospace)
                        .desired_width(f32::INFINITY)
                        .desired_rows(4),
                );
            });
    }

    fn doc_window(&mut self, ctx: &egui::Context) {
        let Some(doc) = self.session.doc().map(str::to_string) else {
            return;
        };
        egui::Window::new("Documentation")
            .default_pos([620.0, 300.0])
            .default_width(420.0)
            .show(ctx, |ui| {
                // Plain label: doc text is never interpreted as markup.
                ui.label(doc);
            });
    }

    fn status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.status.is_empty() {
                    ui.label(egui::RichText::new(self.settings.preview_url.as_str()).weak());
                } else {
                    ui.colored_label(
                        egui::Color32::from_rgb(220, 120, 120),
                        self.status.as_str(),
                    );
                }
            });
        });
    }
}

impl eframe::App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.restore_on_first_frame(ctx);
        self.poll_preview();
        self.menu_panel(ctx);
        self.status_bar(ctx);
        egui::CentralPanel::default().show(ctx, |_ui| {});
        self.globals_window(ctx);
        self.extras_window(ctx);
        self.preview_window(ctx);
        self.doc_window(ctx);
    }
}

/// Draws every control and reports whether any value changed this frame.
/// Control identity is the field name; the widgets mutate control state in
/// place, so there is nothing to rebind across rebuilds.
fn draw_controls(ui: &mut egui::Ui, controls: &mut [Control]) -> bool {
    let mut changed = false;
    for control in controls {
        match &mut control.kind {
            ControlKind::Toggle(on) => {
                if ui.checkbox(on, control.name.as_str()).changed() {
                    changed = true;
                }
            }
            ControlKind::Text(text) => {
                ui.label(format!("{} ({})", control.name, control.type_name));
                if ui
                    .add(egui::TextEdit::singleline(text).desired_width(f32::INFINITY))
                    .changed()
                {
                    changed = true;
                }
                ui.add_space(4.0);
            }
        }
    }
    changed
}
