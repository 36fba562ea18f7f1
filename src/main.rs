pub mod broker;
pub mod persistence;
pub mod ui;

use crate::broker::client::BrokerClient;
use crate::broker::config::BrokerConfig;
use crate::persistence::store::PreferencesStore;
use crate::ui::MqttDeckUi;
use color_eyre::{eyre::eyre, Result};
use eframe::egui;
use tokio::sync::mpsc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let store = PreferencesStore::new();
    let preferences = store.load();
    info!(
        "Loaded preferences: {} known brokers, port {}",
        preferences.brokers.len(),
        preferences.broker_port
    );

    let (event_tx, event_rx) = mpsc::channel(100);
    let broker = BrokerClient::new(BrokerConfig::default(), event_tx);

    info!("Starting UI");
    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = egui::ViewportBuilder::default()
        .with_inner_size(egui::vec2(960.0, 600.0))
        .with_title("mqttdeck");

    eframe::run_native(
        "mqttdeck",
        native_options,
        Box::new(|cc| {
            Ok(Box::new(MqttDeckUi::new(
                cc,
                broker,
                event_rx,
                store,
                preferences,
            )))
        }),
    )
    .map_err(|e| eyre!("UI terminated with error: {}", e))?;

    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
