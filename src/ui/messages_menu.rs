use eframe::egui::{self, ComboBox, Id, Modal, ScrollArea, Stroke, TextEdit, Ui, Vec2};
use rumqttc::QoS;
use std::fs;
use tracing::warn;

use crate::broker::client::BrokerClient;
use crate::broker::message::InboundMessage;

use super::common::{self, UiColors};

/// State for the central panel: message log, subscription controls and the
/// publish editor.
pub struct MessagesMenuData {
    log: Vec<String>,
    sub_topic: String,
    sub_qos: QoS,
    pub_topic: String,
    pub_qos: QoS,
    retain: bool,
    payload: String,
    load_path: String,
    notice: Option<String>,
}

impl MessagesMenuData {
    pub fn new() -> Self {
        Self {
            log: Vec::new(),
            sub_topic: String::new(),
            sub_qos: QoS::AtLeastOnce,
            pub_topic: String::new(),
            pub_qos: QoS::AtLeastOnce,
            retain: false,
            payload: String::new(),
            load_path: String::new(),
            notice: None,
        }
    }

    /// Appends a delivered message to the log.
    pub fn push_message(&mut self, message: InboundMessage) {
        self.log.push(message.render());
    }

    /// Renders the central panel.
    pub fn render(&mut self, ui: &mut Ui, broker: &mut BrokerClient) {
        let available_size = ui.available_size();
        let total_width = available_size.x - 40.0;
        let log_width = total_width * 0.6;
        let right_width = total_width * 0.4 - 8.0;
        let panel_height = available_size.y - 20.0;

        ui.horizontal(|ui| {
            common::create_frame(UiColors::INNER_BG, UiColors::BORDER).show(ui, |ui| {
                ui.set_max_width(log_width);
                ui.set_min_height(panel_height);
                self.message_log(ui, Vec2::new(log_width, panel_height));
            });

            ui.add_space(4.0);

            common::create_frame(UiColors::MAIN_BG, UiColors::BORDER).show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.set_max_width(right_width);
                    ui.add_enabled_ui(broker.is_connected(), |ui| {
                        self.subscription_controls(ui, broker);
                        ui.separator();
                        self.publish_editor(ui, broker, right_width);
                    });
                });
            });
        });

        self.notice_modal(ui);
    }

    /// Renders the scrollable message log with a clear button.
    fn message_log(&mut self, ui: &mut Ui, size: Vec2) {
        ui.vertical(|ui| {
            ui.horizontal(|ui| {
                ui.label("Messages");
                if ui.button("Clear").clicked() {
                    self.log.clear();
                }
            });

            egui::Frame::new()
                .fill(UiColors::EXTREME_BG)
                .inner_margin(4)
                .stroke(Stroke::new(1.0, UiColors::BORDER))
                .show(ui, |ui| {
                    ui.set_min_size(Vec2::new(size.x, size.y - 30.0));

                    ScrollArea::vertical()
                        .id_salt("message_log")
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for line in &self.log {
                                ui.label(line);
                            }
                        });
                });
        });
    }

    /// Renders topic filter input, subscribe/unsubscribe buttons and the
    /// list of active subscriptions.
    fn subscription_controls(&mut self, ui: &mut Ui, broker: &mut BrokerClient) {
        ui.label("Subscription");
        ui.horizontal(|ui| {
            ui.add(TextEdit::singleline(&mut self.sub_topic).hint_text("topic filter"));
            qos_selector(ui, "sub_qos", &mut self.sub_qos);
        });
        ui.horizontal(|ui| {
            if ui.button("Subscribe").clicked() && broker.subscribe(&self.sub_topic, self.sub_qos)
            {
                self.log.push(format!("Subscribed to topic {}", self.sub_topic));
            }
            if ui.button("Unsubscribe").clicked() && !broker.unsubscribe(&self.sub_topic) {
                warn!("Unable to unsubscribe from topic {}", self.sub_topic);
            }
        });

        for filter in broker.subscriptions() {
            ui.label(format!("  {}", filter));
        }
    }

    /// Renders the publish editor: topic, QoS, retain, payload and the
    /// payload file loader.
    fn publish_editor(&mut self, ui: &mut Ui, broker: &mut BrokerClient, width: f32) {
        ui.label("Publish");
        ui.horizontal(|ui| {
            ui.add(TextEdit::singleline(&mut self.pub_topic).hint_text("topic"));
            qos_selector(ui, "pub_qos", &mut self.pub_qos);
            ui.checkbox(&mut self.retain, "retain");
        });

        ScrollArea::vertical().id_salt("payload_editor").show(ui, |ui| {
            TextEdit::multiline(&mut self.payload)
                .min_size(Vec2::new(width - 8.0, 120.0))
                .hint_text("payload")
                .code_editor()
                .show(ui);
        });

        ui.horizontal(|ui| {
            ui.add(TextEdit::singleline(&mut self.load_path).hint_text("payload file path"));
            if ui.button("Load").clicked() {
                match fs::read_to_string(self.load_path.trim()) {
                    Ok(content) => self.payload = content,
                    Err(e) => {
                        warn!("Unable to open file {}: {}", self.load_path, e);
                        self.notice = Some(format!("Unable to open file {}", self.load_path));
                    }
                }
            }
        });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Publish").clicked() {
                if self.pub_topic.is_empty() {
                    self.notice = Some("No topic specified".to_string());
                } else if self.payload.is_empty() {
                    self.notice = Some("No message specified".to_string());
                } else {
                    broker.publish(
                        &self.pub_topic,
                        self.payload.as_bytes(),
                        self.pub_qos,
                        self.retain,
                    );
                }
            }
        });
    }

    /// Shows the pending validation notice, if any.
    fn notice_modal(&mut self, ui: &mut Ui) {
        if let Some(text) = self.notice.clone() {
            let modal = Modal::new(Id::new("publish_notice"));
            let response = modal.show(ui.ctx(), |pop| {
                pop.set_width(200.0);
                pop.heading("mqttdeck");
                pop.label(text);
                pop.separator();
                if pop.button("OK").clicked() {
                    self.notice = None;
                }
            });
            if response.should_close() {
                self.notice = None;
            }
        }
    }
}

impl Default for MessagesMenuData {
    fn default() -> Self {
        Self::new()
    }
}

fn qos_selector(ui: &mut Ui, id: &str, qos: &mut QoS) {
    ComboBox::from_id_salt(id)
        .selected_text(qos_label(*qos))
        .show_ui(ui, |ui| {
            ui.selectable_value(qos, QoS::AtMostOnce, qos_label(QoS::AtMostOnce));
            ui.selectable_value(qos, QoS::AtLeastOnce, qos_label(QoS::AtLeastOnce));
            ui.selectable_value(qos, QoS::ExactlyOnce, qos_label(QoS::ExactlyOnce));
        });
}

fn qos_label(qos: QoS) -> &'static str {
    match qos {
        QoS::AtMostOnce => "QoS 0",
        QoS::AtLeastOnce => "QoS 1",
        QoS::ExactlyOnce => "QoS 2",
    }
}
