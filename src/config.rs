//! Server configuration
//!
//! Read from the first command line argument and the environment:
//! - `CHAT_RELAY_ADDR` or `PORT`: bind address (argument wins)
//! - `CHAT_RELAY_ROOMS`: comma separated room names
//! - `CHAT_RELAY_SILENT_ERRORS`: drop failed events without replying

use std::env;

use crate::types::RoomName;

/// Default server address
pub const DEFAULT_ADDR: &str = "127.0.0.1:5000";

/// Rooms available when none are configured
pub const DEFAULT_ROOMS: [&str; 3] = ["general", "random", "tech"];

/// What the router does with a rejected event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Unicast an `error` event to the originating connection
    Reply,
    /// Log and drop, never answering the client
    Silent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub addr: String,
    pub rooms: Vec<RoomName>,
    pub error_policy: ErrorPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            rooms: DEFAULT_ROOMS.iter().map(|r| RoomName::from(*r)).collect(),
            error_policy: ErrorPolicy::Reply,
        }
    }
}

impl Config {
    /// Load from process arguments and environment
    pub fn from_env() -> Self {
        Self::from_sources(env::args().nth(1), |key| env::var(key).ok())
    }

    /// Load from an optional address argument and a variable lookup
    pub fn from_sources<F>(arg: Option<String>, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let addr = arg
            .or_else(|| var("CHAT_RELAY_ADDR"))
            .or_else(|| var("PORT").map(|port| format!("0.0.0.0:{}", port.trim())))
            .unwrap_or(defaults.addr);

        let rooms = var("CHAT_RELAY_ROOMS")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(RoomName::from)
                    .collect::<Vec<_>>()
            })
            .filter(|rooms| !rooms.is_empty())
            .unwrap_or(defaults.rooms);

        let silent = var("CHAT_RELAY_SILENT_ERRORS").is_some_and(|v| {
            matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
        });

        Self {
            addr,
            rooms,
            error_policy: if silent {
                ErrorPolicy::Silent
            } else {
                ErrorPolicy::Reply
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(arg: Option<&str>, vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_sources(arg.map(String::from), |key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(None, &[]);
        assert_eq!(config, Config::default());
        assert_eq!(config.addr, DEFAULT_ADDR);
        assert_eq!(config.rooms.len(), 3);
        assert_eq!(config.error_policy, ErrorPolicy::Reply);
    }

    #[test]
    fn test_addr_precedence() {
        let vars = [("CHAT_RELAY_ADDR", "127.0.0.1:9000"), ("PORT", "7000")];
        assert_eq!(load(Some("0.0.0.0:1234"), &vars).addr, "0.0.0.0:1234");
        assert_eq!(load(None, &vars).addr, "127.0.0.1:9000");
        assert_eq!(load(None, &[("PORT", "7000")]).addr, "0.0.0.0:7000");
    }

    #[test]
    fn test_rooms_from_env() {
        let config = load(None, &[("CHAT_RELAY_ROOMS", "lobby, games,,")]);
        assert_eq!(config.rooms, vec![RoomName::from("lobby"), RoomName::from("games")]);

        // Blank list falls back to defaults
        let config = load(None, &[("CHAT_RELAY_ROOMS", " , ")]);
        assert_eq!(config.rooms.len(), 3);
    }

    #[test]
    fn test_silent_errors() {
        let config = load(None, &[("CHAT_RELAY_SILENT_ERRORS", "TRUE")]);
        assert_eq!(config.error_policy, ErrorPolicy::Silent);

        let config = load(None, &[("CHAT_RELAY_SILENT_ERRORS", "0")]);
        assert_eq!(config.error_policy, ErrorPolicy::Reply);
    }
}
