//! UI helper components

use eframe::egui;

use sbt_mint_core::{Severity, StatusMessage};

pub const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(0xff, 0x6b, 0x6b);
pub const SUCCESS_COLOR: egui::Color32 = egui::Color32::from_rgb(0x51, 0xcf, 0x66);
const ACCENT: egui::Color32 = egui::Color32::from_rgb(0, 82, 255);

/// Open URL in a new browser tab
#[cfg(target_arch = "wasm32")]
pub fn open_url_new_tab(url: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.open_with_url_and_target(url, "_blank");
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn open_url_new_tab(url: &str) {
    if let Err(e) = open::that(url) {
        tracing::warn!(error = %e, url, "could not open browser");
    }
}

pub fn styled_heading(ui: &mut egui::Ui, text: &str) {
    ui.heading(egui::RichText::new(text).color(ACCENT));
}

/// Status line: red for errors, green otherwise.
pub fn status_line(ui: &mut egui::Ui, status: &StatusMessage) {
    let color = match status.severity {
        Severity::Error => ERROR_COLOR,
        Severity::Info => SUCCESS_COLOR,
    };
    ui.label(egui::RichText::new(&status.text).size(14.0).color(color));
}

pub fn labeled_value(ui: &mut egui::Ui, label: &str, value: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(format!("{label}:")).strong());
        ui.label(egui::RichText::new(value).monospace());
    });
}

/// Large accent button; disabled buttons keep their label.
pub fn primary_button_enabled(ui: &mut egui::Ui, text: &str, enabled: bool) -> egui::Response {
    let btn = egui::Button::new(egui::RichText::new(text).size(16.0).color(egui::Color32::WHITE))
        .min_size(egui::vec2(220.0, 40.0))
        .fill(ACCENT);
    ui.add_enabled(enabled, btn)
}

pub fn secondary_button(ui: &mut egui::Ui, text: &str, enabled: bool) -> egui::Response {
    let btn = egui::Button::new(egui::RichText::new(text).size(14.0))
        .min_size(egui::vec2(110.0, 30.0));
    ui.add_enabled(enabled, btn)
}

pub fn card(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::none()
        .fill(ui.visuals().faint_bg_color)
        .rounding(8.0)
        .inner_margin(16.0)
        .show(ui, add_contents);
}
