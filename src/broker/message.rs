use chrono::NaiveDateTime;
use rumqttc::Publish;
use std::borrow::Cow;
use std::fmt;

/// A message delivered by the broker. Payload bytes are kept exactly as
/// received; decoding to text happens only at display time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub timestamp: NaiveDateTime,
}

impl InboundMessage {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        InboundMessage {
            topic: topic.into(),
            payload: payload.into(),
            timestamp: chrono::Local::now().naive_local(),
        }
    }

    pub fn payload_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    pub fn render(&self) -> String {
        format!(
            "{}  {}: {}",
            self.timestamp.format("%H:%M:%S"),
            self.topic,
            self.payload_text()
        )
    }
}

impl fmt::Display for InboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} - {}", self.timestamp, self.topic)
    }
}

/// Notifications the facade raises toward the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerEvent {
    Message(InboundMessage),
    ConnectionChanged(bool),
}

impl BrokerEvent {
    /// Builds a message notification from an incoming `Publish` packet,
    /// copying topic and payload bytes verbatim.
    pub fn from_publish(publish: &Publish) -> Self {
        BrokerEvent::Message(InboundMessage::new(
            publish.topic.clone(),
            publish.payload.as_ref(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rumqttc::QoS;

    #[test]
    fn publish_passes_through_untouched() {
        // Payload is deliberately not valid UTF-8.
        let payload: Vec<u8> = vec![0x00, 0x9f, 0x92, 0x96, 0xff];
        let publish = Publish::new("sensors/kitchen/temp", QoS::AtLeastOnce, payload.clone());

        match BrokerEvent::from_publish(&publish) {
            BrokerEvent::Message(msg) => {
                assert_eq!(msg.topic, "sensors/kitchen/temp");
                assert_eq!(msg.payload, payload);
            }
            other => panic!("expected message notification, got {:?}", other),
        }
    }

    #[test]
    fn payload_text_is_lossy_not_failing() {
        let msg = InboundMessage::new("t", vec![0xff, 0xfe]);
        assert!(!msg.payload_text().is_empty());

        let msg = InboundMessage::new("t", "plain text");
        assert_eq!(msg.payload_text(), "plain text");
    }
}
