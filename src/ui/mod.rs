//! # mqttdeck User Interface
//!
//! Single-window egui shell around the broker facade. The window is split
//! into three panels: a top connection bar (broker selection, port,
//! connect/disconnect), a central area with the message log and the
//! subscribe/publish controls, and a bottom status line.
//!
//! The UI owns the facade and calls it directly from button handlers; the
//! facade's notifications arrive over a channel that is drained once per
//! frame. Controls that need a connection are disabled while disconnected.
//!
//! On window close the broker preferences are written back to disk and any
//! active connection is torn down.

pub mod common;
pub mod connection_menu;
pub mod messages_menu;

use eframe::egui;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::broker::client::BrokerClient;
use crate::broker::message::BrokerEvent;
use crate::persistence::store::PreferencesStore;
use crate::persistence::Preferences;

use self::connection_menu::ConnectionMenuData;
use self::messages_menu::MessagesMenuData;

/// Top-level application state handed to `eframe::run_native`.
pub struct MqttDeckUi {
    broker: BrokerClient,
    events: mpsc::Receiver<BrokerEvent>,
    store: PreferencesStore,
    connection_menu: ConnectionMenuData,
    messages_menu: MessagesMenuData,
}

impl MqttDeckUi {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        broker: BrokerClient,
        events: mpsc::Receiver<BrokerEvent>,
        store: PreferencesStore,
        preferences: Preferences,
    ) -> Self {
        cc.egui_ctx.set_theme(egui::Theme::Dark);
        MqttDeckUi {
            broker,
            events,
            store,
            connection_menu: ConnectionMenuData::new(&preferences),
            messages_menu: MessagesMenuData::new(),
        }
    }

    /// Drains pending broker notifications into the UI state.
    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                BrokerEvent::Message(message) => {
                    debug!("Message received on {}", message.topic);
                    self.messages_menu.push_message(message);
                }
                BrokerEvent::ConnectionChanged(connected) => {
                    info!("Broker connection changed: {}", connected);
                }
            }
        }
    }
}

impl eframe::App for MqttDeckUi {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.ctx().request_repaint_after(Duration::from_millis(33));

            egui::TopBottomPanel::top("top_panel")
                .show_separator_line(false)
                .show_inside(ui, |ui| {
                    self.connection_menu.render(ui, &mut self.broker);
                });

            egui::CentralPanel::default().show_inside(ui, |ui| {
                self.messages_menu.render(ui, &mut self.broker);
            });

            egui::TopBottomPanel::bottom("bottom_panel")
                .show_separator_line(false)
                .show_inside(ui, |ui| {
                    ui.horizontal_centered(|ui| {
                        common::status_dot(ui, self.broker.is_connected());
                        let status = if self.broker.is_connected() {
                            format!("Connected to {}:{}", self.broker.host(), self.broker.port())
                        } else {
                            "Disconnected".to_string()
                        };
                        ui.label(status);
                    });
                });
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Err(e) = self.store.save(&self.connection_menu.preferences()) {
            error!("Failed to save preferences: {}", e);
        }
        self.broker.disconnect();
    }
}
