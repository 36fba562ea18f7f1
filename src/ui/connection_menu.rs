use eframe::egui::{self, ComboBox, Id, Modal, TextEdit, Ui};
use std::cell::Cell;
use tracing::debug;

use crate::broker::client::BrokerClient;
use crate::broker::config::DEFAULT_PORT;
use crate::persistence::Preferences;

use super::common;

/// State for the connection bar: broker selection, port and the
/// connect/disconnect toggle.
pub struct ConnectionMenuData {
    known_brokers: Vec<String>,
    selected_broker: String,
    port_text: String,
    adding_broker: Cell<bool>,
    new_broker: String,
    response_trigger: bool,
}

impl ConnectionMenuData {
    pub fn new(preferences: &Preferences) -> Self {
        Self {
            selected_broker: preferences.brokers.first().cloned().unwrap_or_default(),
            known_brokers: preferences.brokers.clone(),
            port_text: preferences.broker_port.to_string(),
            adding_broker: Cell::new(false),
            new_broker: String::new(),
            response_trigger: false,
        }
    }

    /// Snapshot of the broker list and port for saving at shutdown.
    pub fn preferences(&self) -> Preferences {
        Preferences {
            brokers: self.known_brokers.clone(),
            broker_port: self.port_text.trim().parse().unwrap_or(DEFAULT_PORT),
        }
    }

    /// Renders the connection bar.
    pub fn render(&mut self, ui: &mut Ui, broker: &mut BrokerClient) {
        ui.horizontal(|ui| {
            ui.heading("mqttdeck");
            self.broker_selection(ui);

            ui.label("Port");
            ui.add(TextEdit::singleline(&mut self.port_text).desired_width(60.0));

            let toggle_label = if broker.is_connected() {
                "Disconnect"
            } else {
                "Connect"
            };
            if ui.button(toggle_label).clicked() {
                if broker.is_connected() {
                    broker.disconnect();
                } else {
                    // A non-numeric port falls through as 0 and fails the
                    // connect, matching the facade's fail-closed contract.
                    let port = self.port_text.trim().parse().unwrap_or(0);
                    broker.connect(&self.selected_broker, port);
                }
            }

            common::status_dot(ui, broker.is_connected());
        });
    }

    /// Renders the broker selector with its add-broker modal.
    fn broker_selection(&mut self, ui: &mut Ui) {
        ComboBox::from_id_salt("broker_select")
            .selected_text(if self.selected_broker.is_empty() {
                "Select broker".to_string()
            } else {
                self.selected_broker.clone()
            })
            .show_ui(ui, |ui| {
                for host in &self.known_brokers {
                    ui.selectable_value(&mut self.selected_broker, host.clone(), host);
                }
                ui.toggle_value(self.adding_broker.get_mut(), "Add Broker");
            });

        if self.adding_broker.get() {
            let new_broker = &mut self.new_broker;
            let known_brokers = &mut self.known_brokers;
            let selected_broker = &mut self.selected_broker;
            let adding_broker = &self.adding_broker;
            let response_trigger = &mut self.response_trigger;

            let modal = Modal::new(Id::new("add_broker"));
            modal.show(ui.ctx(), |ui| {
                ui.set_width(250.0);

                ui.heading("New Broker");

                ui.label("Host");
                ui.text_edit_singleline(new_broker);

                ui.separator();

                egui::Sides::new().show(
                    ui,
                    |left| {
                        if left.button("Save").clicked() {
                            *response_trigger = true;
                        }

                        if *response_trigger {
                            let err_msg = Modal::new(Id::new("BrokerValidationErr"));
                            let err_response = if new_broker.trim().is_empty() {
                                err_msg.show(left.ctx(), |pop| {
                                    pop.set_width(100.0);
                                    pop.label("Host empty!");
                                })
                            } else {
                                let host = new_broker.trim().to_string();
                                if !known_brokers.contains(&host) {
                                    known_brokers.push(host.clone());
                                }
                                *selected_broker = host;
                                new_broker.clear();
                                adding_broker.set(false);
                                debug!("Broker added to known list");
                                err_msg.show(left.ctx(), |pop| {
                                    pop.label("Saved!");
                                })
                            };
                            if err_response.should_close() {
                                *response_trigger = false;
                            }
                        }
                    },
                    |right| {
                        if right.button("Cancel").clicked() {
                            adding_broker.set(false);
                        }
                    },
                );
            });
        }
    }
}
