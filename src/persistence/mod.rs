//! # Persistence Module
//!
//! Loads and saves the broker preferences that survive between runs: the
//! ordered list of known broker hosts and the last-used port. Preferences
//! live in a TOML file under the user's config directory and follow a
//! fail-safe policy: a missing or unreadable file degrades to defaults
//! with a warning instead of blocking startup.
//!
//! The on-disk format keeps the legacy key layout: an `[options]` table
//! with the host list colon-joined into a single string.

pub mod store;

use serde::{Deserialize, Serialize};

use crate::broker::config::DEFAULT_PORT;

/// Broker preferences as the application uses them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    /// Known broker hosts, in the order the UI lists them.
    pub brokers: Vec<String>,
    /// Port used for the last connection.
    pub broker_port: u16,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            brokers: Vec::new(),
            broker_port: DEFAULT_PORT,
        }
    }
}

/// On-disk representation. Hosts are stored colon-joined under `options`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub(crate) struct PreferencesFile {
    pub options: OptionsTable,
}

#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct OptionsTable {
    pub brokers: String,
    pub broker_port: u16,
}

impl Default for OptionsTable {
    fn default() -> Self {
        Self {
            brokers: String::new(),
            broker_port: DEFAULT_PORT,
        }
    }
}

impl From<&Preferences> for PreferencesFile {
    fn from(preferences: &Preferences) -> Self {
        PreferencesFile {
            options: OptionsTable {
                brokers: preferences.brokers.join(":"),
                broker_port: preferences.broker_port,
            },
        }
    }
}

impl From<PreferencesFile> for Preferences {
    fn from(file: PreferencesFile) -> Self {
        Preferences {
            brokers: file
                .options
                .brokers
                .split(':')
                .filter(|host| !host.is_empty())
                .map(str::to_string)
                .collect(),
            broker_port: file.options.broker_port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hosts_are_colon_joined_on_disk() {
        let preferences = Preferences {
            brokers: vec!["broker-a".to_string(), "broker-b".to_string()],
            broker_port: 1884,
        };

        let file = PreferencesFile::from(&preferences);
        assert_eq!(file.options.brokers, "broker-a:broker-b");
        assert_eq!(file.options.broker_port, 1884);
    }

    #[test]
    fn decode_drops_empty_segments() {
        let file = PreferencesFile {
            options: OptionsTable {
                brokers: ":broker-a::broker-b:".to_string(),
                broker_port: 1883,
            },
        };

        let preferences = Preferences::from(file);
        assert_eq!(preferences.brokers, ["broker-a", "broker-b"]);
    }

    #[test]
    fn empty_list_round_trips_to_no_hosts() {
        let file = PreferencesFile::from(&Preferences::default());
        let preferences = Preferences::from(file);
        assert!(preferences.brokers.is_empty());
        assert_eq!(preferences.broker_port, DEFAULT_PORT);
    }
}
