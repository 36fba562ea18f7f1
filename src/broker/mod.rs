//! # Broker Client Module
//!
//! Thin facade over the `rumqttc` MQTT client for mqttdeck's debugging UI.
//! The protocol work (framing, QoS handshakes, reconnects) stays inside
//! `rumqttc`; this module owns the client handle, tracks the connection
//! flag and subscription set, and re-emits event-loop deliveries as typed
//! [`BrokerEvent`] notifications the UI drains once per frame.
//!
//! ## Module Layout
//!
//! ```text
//! broker/
//! ├── config.rs   - Client settings and defaults
//! ├── message.rs  - Inbound message representation and notifications
//! └── client.rs   - Connection lifecycle and request dispatch
//! ```
//!
//! ## Operation Contract
//!
//! All facade operations return `bool`. Publish, subscribe and unsubscribe
//! are failing no-ops while disconnected. Connect and disconnect each emit
//! a single `ConnectionChanged` notification on state change; disconnecting
//! an already-disconnected client succeeds silently.

pub mod client;
pub mod config;
pub mod message;
