//! Connection lifecycle and request dispatch for the broker facade.

use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, Incoming, MqttOptions, QoS};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::BrokerConfig;
use super::message::BrokerEvent;

/// Pause before polling again after an event loop error. `rumqttc`
/// redials on the next poll.
const POLL_RETRY_PAUSE: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// A second connect was requested while a connection is active.
    #[error("already connected to {0}")]
    AlreadyConnected(String),

    /// Host was empty or the port was zero.
    #[error("invalid broker address: {0}")]
    InvalidAddress(String),

    /// The underlying client rejected a request.
    #[error("client request failed: {0}")]
    Request(#[from] rumqttc::ClientError),
}

/// Facade over a single `rumqttc` client connection.
///
/// Owns the client handle, the background event loop task and the local
/// connection state. Requests are issued with the client's non-blocking
/// `try_*` variants so the UI thread never waits on the network; deliveries
/// come back through the [`BrokerEvent`] channel handed in at construction.
///
/// The connected flag tracks only this facade's own connect and disconnect
/// outcomes. Broker-side drops are handled inside the event loop, which
/// keeps redialing without touching the flag.
pub struct BrokerClient {
    config: BrokerConfig,
    host: String,
    port: u16,
    connected: bool,
    subscriptions: Vec<String>,
    client: Option<AsyncClient>,
    relay_stop: Option<CancellationToken>,
    events: mpsc::Sender<BrokerEvent>,
}

impl BrokerClient {
    pub fn new(config: BrokerConfig, events: mpsc::Sender<BrokerEvent>) -> Self {
        Self {
            config,
            host: String::new(),
            port: 0,
            connected: false,
            subscriptions: Vec::new(),
            client: None,
            relay_stop: None,
            events,
        }
    }

    /// Opens a connection to `host:port` and starts the background event
    /// loop. Returns `true` only when both steps succeed; on success the
    /// connected flag is set and a single `ConnectionChanged(true)`
    /// notification is raised.
    ///
    /// The dial itself is asynchronous. A successful return means the loop
    /// is running, not that the broker has acknowledged yet.
    pub fn connect(&mut self, host: &str, port: u16) -> bool {
        match self.try_connect(host, port) {
            Ok(()) => {
                info!("Connected to broker {}:{}", self.host, self.port);
                true
            }
            Err(e) => {
                warn!("Unable to connect to broker {}:{}: {}", host, port, e);
                false
            }
        }
    }

    fn try_connect(&mut self, host: &str, port: u16) -> Result<(), BrokerError> {
        if self.connected {
            return Err(BrokerError::AlreadyConnected(format!(
                "{}:{}",
                self.host, self.port
            )));
        }

        let host = host.trim();
        if host.is_empty() || port == 0 {
            return Err(BrokerError::InvalidAddress(format!("{}:{}", host, port)));
        }

        let mut options = MqttOptions::new(self.config.client_id.clone(), host, port);
        options.set_keep_alive(self.config.keep_alive);

        let (client, event_loop) = AsyncClient::new(options, self.config.request_capacity);

        let stop = CancellationToken::new();
        spawn_relay(event_loop, self.events.clone(), stop.clone());

        self.client = Some(client);
        self.relay_stop = Some(stop);
        self.host = host.to_string();
        self.port = port;
        self.connected = true;
        self.notify(BrokerEvent::ConnectionChanged(true));

        Ok(())
    }

    /// Requests a disconnect and stops the event loop task. Returns `true`
    /// whenever the post-state is "not connected", including the case where
    /// no connection was active (which raises no notification).
    pub fn disconnect(&mut self) -> bool {
        if !self.connected {
            debug!("Disconnect requested while not connected");
            return true;
        }

        match self.try_disconnect() {
            Ok(()) => {
                info!("Disconnected from broker {}:{}", self.host, self.port);
                true
            }
            Err(e) => {
                warn!("Unable to disconnect from {}:{}: {}", self.host, self.port, e);
                false
            }
        }
    }

    fn try_disconnect(&mut self) -> Result<(), BrokerError> {
        if let Some(client) = &self.client {
            client.try_disconnect()?;
        }

        if let Some(stop) = self.relay_stop.take() {
            stop.cancel();
        }
        self.client = None;
        self.connected = false;
        self.subscriptions.clear();
        self.notify(BrokerEvent::ConnectionChanged(false));

        Ok(())
    }

    /// Issues a subscribe request and records the topic filter. Requires a
    /// connection. Success means the request was queued; the broker's grant
    /// is not awaited, so a rejected subscription still reports `true`.
    pub fn subscribe(&mut self, topic: &str, qos: QoS) -> bool {
        let Some(client) = self.active_client() else {
            return false;
        };

        if let Err(e) = client.try_subscribe(topic, qos) {
            warn!("Subscribe request for {} failed: {}", topic, e);
        }
        self.subscriptions.push(topic.to_string());
        debug!("Subscribed to {} at {:?}", topic, qos);

        true
    }

    /// Issues an unsubscribe request. Requires a connection; returns `true`
    /// only when the client accepts the request, and drops the recorded
    /// filter in that case.
    pub fn unsubscribe(&mut self, topic: &str) -> bool {
        let Some(client) = self.active_client() else {
            return false;
        };

        if let Err(e) = client.try_unsubscribe(topic) {
            warn!("Unsubscribe request for {} failed: {}", topic, e);
            return false;
        }
        if let Some(pos) = self.subscriptions.iter().position(|sub| sub == topic) {
            self.subscriptions.remove(pos);
        }
        debug!("Unsubscribed from {}", topic);

        true
    }

    /// Publishes a payload. Requires a connection; returns `true` only when
    /// the client accepts the request.
    pub fn publish(&mut self, topic: &str, payload: &[u8], qos: QoS, retain: bool) -> bool {
        let Some(client) = self.active_client() else {
            return false;
        };

        match client.try_publish(topic, qos, retain, payload.to_vec()) {
            Ok(()) => {
                info!("Published {} bytes to {}", payload.len(), topic);
                true
            }
            Err(e) => {
                warn!("Publish to {} failed: {}", topic, e);
                false
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn subscriptions(&self) -> &[String] {
        &self.subscriptions
    }

    fn active_client(&self) -> Option<&AsyncClient> {
        if !self.connected {
            warn!("Not connected");
            return None;
        }
        self.client.as_ref()
    }

    fn notify(&self, event: BrokerEvent) {
        if let Err(e) = self.events.try_send(event) {
            warn!("Dropped broker notification: {}", e);
        }
    }
}

impl Drop for BrokerClient {
    fn drop(&mut self) {
        if let Some(stop) = self.relay_stop.take() {
            stop.cancel();
        }
    }
}

/// Runs the `rumqttc` event loop in a background task, forwarding incoming
/// publishes as notifications until the token is cancelled or the receiving
/// side goes away.
fn spawn_relay(
    mut event_loop: EventLoop,
    events: mpsc::Sender<BrokerEvent>,
    stop: CancellationToken,
) {
    tokio::spawn(async move {
        debug!("Broker event loop started");
        loop {
            tokio::select! {
                _ = stop.cancelled() => {
                    debug!("Broker event loop stopped");
                    break;
                }
                polled = event_loop.poll() => match polled {
                    Ok(Event::Incoming(Incoming::Publish(publish))) => {
                        let topic = publish.topic.clone();
                        if events.send(BrokerEvent::from_publish(&publish)).await.is_err() {
                            debug!("Notification receiver gone, stopping event loop");
                            break;
                        }
                        debug!("Delivered message on {}", topic);
                    }
                    Ok(Event::Incoming(Incoming::ConnAck(ack))) => {
                        debug!("Broker acknowledged connection: {:?}", ack.code);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Broker event loop error: {}", e);
                        tokio::time::sleep(POLL_RETRY_PAUSE).await;
                    }
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::error::TryRecvError;

    fn client_with_channel() -> (BrokerClient, mpsc::Receiver<BrokerEvent>) {
        let (tx, rx) = mpsc::channel(16);
        (BrokerClient::new(BrokerConfig::default(), tx), rx)
    }

    #[tokio::test]
    async fn operations_fail_closed_while_disconnected() {
        let (mut broker, mut rx) = client_with_channel();

        assert!(!broker.publish("a/b", b"payload", QoS::AtLeastOnce, false));
        assert!(!broker.subscribe("a/b", QoS::AtLeastOnce));
        assert!(!broker.unsubscribe("a/b"));
        assert!(broker.subscriptions().is_empty());
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn connect_sets_flag_and_notifies_once() {
        let (mut broker, mut rx) = client_with_channel();

        assert!(broker.connect("127.0.0.1", 1883));
        assert!(broker.is_connected());
        assert_eq!(broker.host(), "127.0.0.1");
        assert_eq!(broker.port(), 1883);

        assert_eq!(rx.try_recv(), Ok(BrokerEvent::ConnectionChanged(true)));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn connect_rejects_empty_host() {
        let (mut broker, mut rx) = client_with_channel();

        assert!(!broker.connect("", 1883));
        assert!(!broker.connect("   ", 1883));
        assert!(!broker.connect("127.0.0.1", 0));
        assert!(!broker.is_connected());
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn connect_while_connected_fails_closed() {
        let (mut broker, mut rx) = client_with_channel();

        assert!(broker.connect("127.0.0.1", 1883));
        assert_eq!(rx.try_recv(), Ok(BrokerEvent::ConnectionChanged(true)));

        assert!(!broker.connect("127.0.0.1", 1884));
        assert_eq!(broker.port(), 1883);
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn disconnect_clears_flag_and_notifies_once() {
        let (mut broker, mut rx) = client_with_channel();

        assert!(broker.connect("127.0.0.1", 1883));
        assert_eq!(rx.try_recv(), Ok(BrokerEvent::ConnectionChanged(true)));

        assert!(broker.disconnect());
        assert!(!broker.is_connected());
        assert_eq!(rx.try_recv(), Ok(BrokerEvent::ConnectionChanged(false)));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn disconnect_when_already_disconnected_is_silent_success() {
        let (mut broker, mut rx) = client_with_channel();

        assert!(broker.disconnect());
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

        assert!(broker.connect("127.0.0.1", 1883));
        assert!(broker.disconnect());
        rx.try_recv().expect("connected notification");
        rx.try_recv().expect("disconnected notification");

        assert!(broker.disconnect());
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn subscriptions_track_subscribe_and_unsubscribe() {
        let (mut broker, _rx) = client_with_channel();

        assert!(broker.connect("127.0.0.1", 1883));
        assert!(broker.subscribe("device/#", QoS::AtLeastOnce));
        assert!(broker.subscribe("sensors/+/temp", QoS::AtMostOnce));
        assert_eq!(broker.subscriptions(), ["device/#", "sensors/+/temp"]);

        assert!(broker.unsubscribe("device/#"));
        assert_eq!(broker.subscriptions(), ["sensors/+/temp"]);
    }

    #[tokio::test]
    async fn disconnect_drops_recorded_subscriptions() {
        let (mut broker, _rx) = client_with_channel();

        assert!(broker.connect("127.0.0.1", 1883));
        assert!(broker.subscribe("device/#", QoS::AtLeastOnce));
        assert!(broker.disconnect());
        assert!(broker.subscriptions().is_empty());
    }

    #[tokio::test]
    async fn publish_succeeds_once_connected() {
        let (mut broker, _rx) = client_with_channel();

        assert!(broker.connect("127.0.0.1", 1883));
        assert!(broker.publish("device/update", b"{}", QoS::AtLeastOnce, false));
    }
}
