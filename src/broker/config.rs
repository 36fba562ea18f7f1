use std::time::Duration;

/// Default MQTT broker port.
pub const DEFAULT_PORT: u16 = 1883;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerConfig {
    pub client_id: String,
    pub keep_alive: Duration,
    pub request_capacity: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            client_id: "mqttdeck".to_string(),
            keep_alive: Duration::from_secs(60),
            request_capacity: 100,
        }
    }
}
