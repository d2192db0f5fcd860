//! Mint widget state and update loop

use std::time::Duration;

use alloy::primitives::Address;
use eframe::egui;

use sbt_mint_adapters::ViewSnapshot;
use sbt_mint_core::domain::MINT_FEE_ETHER;
use sbt_mint_core::{truncate_address, MintControlState};

use crate::bridge::MintBridge;
use crate::ui;

/// Wallet notifications arrive without user input; poll for them this often.
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(500);

pub struct App {
    bridge: MintBridge,
    initialized: bool,
    /// Account (and whether it had minted) the owned count was last fetched for.
    owned_count_key: Option<(Address, bool)>,
}

impl App {
    pub fn new(_cc: &eframe::CreationContext<'_>, bridge: MintBridge) -> Self {
        Self {
            bridge,
            initialized: false,
            owned_count_key: None,
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());

        if !self.initialized {
            self.initialized = true;
            self.bridge.initialize(ctx);
        }
        self.bridge.pump_pending_events(ctx);

        let view = self.bridge.view().snapshot();
        let key = view
            .account
            .map(|account| (account, view.control == MintControlState::Minted));
        if key != self.owned_count_key {
            self.owned_count_key = key;
            if key.is_some() {
                self.bridge.refresh_owned_count(ctx);
            }
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui::styled_heading(ui, "🪪 Base SBT");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    match view.account {
                        Some(account) => {
                            ui.label(egui::RichText::new(truncate_address(&account)).monospace())
                        }
                        None => ui.label(egui::RichText::new("not connected").weak()),
                    };
                });
            });
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(20.0);
            ui.vertical_centered(|ui| {
                ui::card(ui, |ui| {
                    ui.set_max_width(420.0);
                    ui.vertical_centered(|ui| {
                        self.render_mint_card(ui, ctx, &view);
                    });
                });
            });
        });

        ctx.request_repaint_after(EVENT_POLL_INTERVAL);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.bridge.teardown();
    }
}

impl App {
    fn render_mint_card(
        &self,
        ui: &mut egui::Ui,
        ctx: &egui::Context,
        view: &ViewSnapshot,
    ) {
        let supply = view
            .total_supply
            .map(|s| s.to_string())
            .unwrap_or_else(|| "…".to_owned());
        ui.label(egui::RichText::new(supply).size(36.0).strong());
        ui.label(egui::RichText::new("minted so far").weak());
        ui.add_space(12.0);

        ui::labeled_value(ui, "Mint fee", &format!("{MINT_FEE_ETHER} ETH"));
        if let Some(owned) = view.owned_count {
            ui::labeled_value(ui, "You own", &owned.to_string());
        }
        ui.add_space(12.0);

        let busy = self.bridge.is_busy();
        let enabled = view.control.is_enabled() && !busy;
        if ui::primary_button_enabled(ui, view.control.label(), enabled).clicked() {
            match view.control {
                MintControlState::Disconnected => self.bridge.connect(ctx),
                _ => self.bridge.mint(ctx),
            }
        }

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            if ui::secondary_button(ui, "Balance", view.account.is_some() && !busy).clicked() {
                self.bridge.show_balance(ctx);
            }
            if busy {
                ui.spinner();
            }
        });

        ui.add_space(10.0);
        if let Some(status) = &view.status {
            ui::status_line(ui, status);
        } else if !self.bridge.wallet_available() {
            ui.label(egui::RichText::new("No wallet detected").weak());
        }

        let explorer = view
            .last_transaction
            .and_then(|hash| self.bridge.deployment().network.explorer_tx_url(hash));
        if let Some(url) = explorer {
            ui.add_space(6.0);
            if ui.link("View transaction on BaseScan").clicked() {
                ui::open_url_new_tab(&url);
            }
        }
    }
}
