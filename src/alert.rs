use crate::error::AlertError;
use crate::monitors::{plan_windows, MonitorProvider, WindowPlacement, WindowSize};
use crate::session::AlertSession;
use crate::snooze::SnoozeStore;
use eframe::egui::{self, Color32, RichText};

const APP_ID: &str = "work-end-alert";

const COLOR_BG: Color32 = Color32::from_rgb(0x1a, 0x1a, 0x1a);
const COLOR_ACCENT: Color32 = Color32::from_rgb(0xff, 0x17, 0x44);
const COLOR_TEXT: Color32 = Color32::WHITE;
const COLOR_SUBTEXT: Color32 = Color32::from_rgb(0xaa, 0xaa, 0xaa);
const COLOR_CAPTION: Color32 = Color32::from_rgb(0x66, 0x66, 0x66);
const COLOR_BTN_BG: Color32 = Color32::from_rgb(0x2d, 0x2d, 0x2d);

const BASE_WIDTH: u32 = 720;
const BASE_HEIGHT: u32 = 520;
const SNOOZE_BUTTON_WIDTH: f32 = 96.0;
const SNOOZE_BUTTON_SPACING: f32 = 16.0;

/// What every alert window shows
#[derive(Debug, Clone, PartialEq)]
pub struct AlertContent {
    pub title: String,
    pub message: String,
    pub snooze_options: Vec<u32>,
}

impl AlertContent {
    pub fn work_day_complete(worked: &str, snooze_options: Vec<u32>) -> Self {
        Self {
            title: "Work Day Complete".to_string(),
            message: format!("You have worked {} today.\nTime to rest!", worked),
            snooze_options,
        }
    }

    /// Room for the default layout, widened when there are many snooze buttons
    pub fn window_size(&self) -> WindowSize {
        let extra = u32::try_from(self.snooze_options.len().saturating_sub(4)).unwrap_or(u32::MAX);
        WindowSize {
            width: BASE_WIDTH.saturating_add(extra.saturating_mul(110)),
            height: BASE_HEIGHT,
        }
    }
}

pub trait AlertPresenter {
    /// Block until the user has dismissed or snoozed the alert
    fn show_alert(&self, content: &AlertContent, store: &SnoozeStore) -> Result<(), AlertError>;
}

/// Shows one borderless, always-on-top window per connected monitor
pub struct WindowPresenter<M: MonitorProvider> {
    monitors: M,
}

impl<M: MonitorProvider> WindowPresenter<M> {
    pub fn new(monitors: M) -> Self {
        Self { monitors }
    }
}

impl<M: MonitorProvider> AlertPresenter for WindowPresenter<M> {
    fn show_alert(&self, content: &AlertContent, store: &SnoozeStore) -> Result<(), AlertError> {
        let placements = plan_windows(&self.monitors, content.window_size());
        let root = placements
            .first()
            .copied()
            .ok_or_else(|| AlertError::Display("no window placement".to_string()))?;
        log::info!("Showing alert on {} display(s)", placements.len());

        let native_options = eframe::NativeOptions {
            viewport: viewport_builder(&content.title, root),
            centered: root.position.is_none(),
            ..Default::default()
        };
        let app = AlertApp::new(content.clone(), AlertSession::new(placements, store.clone()));

        eframe::run_native(
            APP_ID,
            native_options,
            Box::new(move |cc| {
                cc.egui_ctx.set_visuals(egui::Visuals::dark());
                Ok(Box::new(app))
            }),
        )
        .map_err(|e| AlertError::Display(e.to_string()))
    }
}

fn viewport_builder(title: &str, placement: WindowPlacement) -> egui::ViewportBuilder {
    let builder = egui::ViewportBuilder::default()
        .with_title(title)
        .with_decorations(false)
        .with_always_on_top()
        .with_resizable(false)
        .with_inner_size([placement.size.width as f32, placement.size.height as f32]);
    match placement.position {
        Some((x, y)) => builder.with_position([x as f32, y as f32]),
        None => builder,
    }
}

/// The root viewport is the first placement; every other monitor gets an
/// immediate child viewport drawn by the same layout.
struct AlertApp {
    content: AlertContent,
    session: AlertSession,
    /// Child viewports drawn in the last frame
    children_shown: usize,
}

impl AlertApp {
    fn new(content: AlertContent, session: AlertSession) -> Self {
        Self {
            content,
            session,
            children_shown: 0,
        }
    }

    fn ui(&mut self, ctx: &egui::Context) {
        // Closing any window by other means counts as dismissing the alert
        if ctx.input(|i| i.viewport().close_requested()) {
            self.session.dismiss();
        }
        if !self.session.is_over() {
            render_alert(ctx, &self.content, &mut self.session);
        }

        let children: Vec<(usize, WindowPlacement)> = self
            .session
            .open_windows()
            .iter()
            .copied()
            .enumerate()
            .skip(1)
            .collect();
        self.children_shown = children.len();
        for (index, placement) in children {
            let content = &self.content;
            let session = &mut self.session;
            ctx.show_viewport_immediate(
                egui::ViewportId::from_hash_of((APP_ID, index)),
                viewport_builder(&content.title, placement),
                |ctx, class| {
                    if ctx.input(|i| i.viewport().close_requested()) {
                        session.dismiss();
                    }
                    if session.is_over() {
                        return;
                    }
                    match class {
                        // Backends without native multi-window support
                        egui::ViewportClass::Embedded => {
                            render_embedded(ctx, index, placement, content, session)
                        }
                        _ => render_alert(ctx, content, session),
                    }
                },
            );
        }

        if self.session.is_over() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }
}

impl eframe::App for AlertApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui(ctx);
    }
}

fn alert_frame() -> egui::Frame {
    egui::Frame::none()
        .fill(COLOR_BG)
        .stroke(egui::Stroke::new(4.0, COLOR_ACCENT))
        .inner_margin(egui::Margin::symmetric(60.0, 50.0))
}

fn render_alert(ctx: &egui::Context, content: &AlertContent, session: &mut AlertSession) {
    egui::CentralPanel::default()
        .frame(alert_frame())
        .show(ctx, |ui| alert_body(ui, content, session));
}

/// A child drawn inside the root window as a floating egui window
fn render_embedded(
    ctx: &egui::Context,
    index: usize,
    placement: WindowPlacement,
    content: &AlertContent,
    session: &mut AlertSession,
) {
    egui::Window::new(content.title.as_str())
        .id(egui::Id::new((APP_ID, index)))
        .title_bar(false)
        .collapsible(false)
        .resizable(false)
        .fixed_size([placement.size.width as f32, placement.size.height as f32])
        .frame(alert_frame())
        .show(ctx, |ui| alert_body(ui, content, session));
}

fn alert_body(ui: &mut egui::Ui, content: &AlertContent, session: &mut AlertSession) {
    ui.vertical_centered(|ui| {
        ui.label(RichText::new("⛔").size(64.0).color(COLOR_ACCENT));
        ui.add_space(20.0);
        ui.label(
            RichText::new(content.title.to_uppercase())
                .size(36.0)
                .strong()
                .color(COLOR_TEXT),
        );
        ui.add_space(10.0);
        ui.label(RichText::new(&content.message).size(16.0).color(COLOR_SUBTEXT));
        ui.add_space(40.0);

        let stop = ui.add(
            egui::Button::new(
                RichText::new("I AM STOPPING NOW")
                    .size(14.0)
                    .strong()
                    .color(Color32::WHITE),
            )
            .fill(COLOR_ACCENT)
            .min_size(egui::vec2(280.0, 48.0)),
        );
        if stop.clicked() {
            session.dismiss();
        }
        ui.add_space(40.0);

        ui.label(
            RichText::new("SNOOZE (Extend Session)")
                .size(9.0)
                .strong()
                .color(COLOR_CAPTION),
        );
        ui.add_space(10.0);
        snooze_row(ui, &content.snooze_options, session);
    });
}

fn snooze_row(ui: &mut egui::Ui, options: &[u32], session: &mut AlertSession) {
    let count = options.len() as f32;
    let row_width = count * SNOOZE_BUTTON_WIDTH + (count - 1.0).max(0.0) * SNOOZE_BUTTON_SPACING;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = SNOOZE_BUTTON_SPACING;
        ui.add_space(((ui.available_width() - row_width) / 2.0).max(0.0));
        for &minutes in options {
            let button = egui::Button::new(
                RichText::new(format!("+{}m", minutes))
                    .size(11.0)
                    .color(COLOR_TEXT),
            )
            .fill(COLOR_BTN_BG)
            .min_size(egui::vec2(SNOOZE_BUTTON_WIDTH, 32.0));
            if ui.add(button).clicked() {
                session.snooze(minutes);
            }
        }
    });
}
