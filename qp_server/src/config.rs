//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use quiz_poker::{AntePolicy, GameConfig};
use std::net::SocketAddr;
use std::str::FromStr;

/// Default HTTP bind address, reachable from tablets on the studio LAN
pub const DEFAULT_BIND: &str = "0.0.0.0:3001";

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP/WebSocket bind address
    pub bind: SocketAddr,
    /// Prometheus exporter bind address, disabled when `None`
    pub metrics_bind: Option<SocketAddr>,
    /// Game rules
    pub game: GameConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `metrics_override` - Optional metrics address override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but can't be parsed
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        metrics_override: Option<SocketAddr>,
    ) -> Result<Self, ConfigError> {
        Self::from_lookup(bind_override, metrics_override, |key| {
            std::env::var(key).ok()
        })
    }

    /// Same as [`ServerConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(
        bind_override: Option<SocketAddr>,
        metrics_override: Option<SocketAddr>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_or(&lookup, "SERVER_BIND", default_bind())?,
        };

        let metrics_bind = match metrics_override {
            Some(addr) => Some(addr),
            None => parse_opt(&lookup, "METRICS_BIND")?,
        };

        let defaults = GameConfig::default();
        let elimination_after_round = match lookup("ELIMINATION_AFTER_ROUND").as_deref() {
            None => defaults.elimination_after_round,
            Some("" | "0" | "off" | "none") => None,
            Some(_) => parse_opt(&lookup, "ELIMINATION_AFTER_ROUND")?,
        };

        let game = GameConfig {
            starting_balance: parse_or(&lookup, "STARTING_BALANCE", defaults.starting_balance)?,
            questions_per_round: parse_or(
                &lookup,
                "QUESTIONS_PER_ROUND",
                defaults.questions_per_round,
            )?,
            ante_policy: parse_or::<AntePolicy>(&lookup, "ANTE_POLICY", defaults.ante_policy)?,
            timer_autotick: parse_or(&lookup, "TIMER_AUTOTICK", defaults.timer_autotick)?,
            elimination_after_round,
            ..defaults
        };

        Ok(ServerConfig {
            bind,
            metrics_bind,
            game,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.metrics_bind == Some(self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from server bind ({})", self.bind),
            });
        }

        self.game.validate().map_err(|reason| ConfigError::Invalid {
            var: "game rules".to_string(),
            reason,
        })
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 3001))
}

/// Parse a variable, falling back to `default` when it is unset
fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse_opt(lookup, key)?.unwrap_or(default))
}

fn parse_opt<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                var: key.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(None, None, |key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind, DEFAULT_BIND.parse().unwrap());
        assert_eq!(config.metrics_bind, None);
        assert_eq!(config.game, GameConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_game_overrides() {
        let config = load(&[
            ("STARTING_BALANCE", "1000"),
            ("ANTE_POLICY", "all-or-nothing"),
            ("TIMER_AUTOTICK", "false"),
            ("ELIMINATION_AFTER_ROUND", "off"),
        ])
        .unwrap();
        assert_eq!(config.game.starting_balance, 1000);
        assert_eq!(config.game.ante_policy, AntePolicy::AllOrNothing);
        assert!(!config.game.timer_autotick);
        assert_eq!(config.game.elimination_after_round, None);
    }

    #[test]
    fn test_cli_override_wins() {
        let vars: HashMap<&str, &str> = HashMap::from([("SERVER_BIND", "127.0.0.1:9000")]);
        let bind: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        let config = ServerConfig::from_lookup(Some(bind), None, |key| {
            vars.get(key).map(|v| v.to_string())
        })
        .unwrap();
        assert_eq!(config.bind, bind);
    }

    #[test]
    fn test_unparseable_value() {
        let err = load(&[("STARTING_BALANCE", "lots")]).unwrap_err();
        assert!(err.to_string().contains("STARTING_BALANCE"));

        let err = load(&[("ANTE_POLICY", "sometimes")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_validation_rejects_zero_balance() {
        let config = load(&[("STARTING_BALANCE", "0")]).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_validation_rejects_shared_port() {
        let config = load(&[
            ("SERVER_BIND", "127.0.0.1:3001"),
            ("METRICS_BIND", "127.0.0.1:3001"),
        ])
        .unwrap();
        assert!(config.validate().is_err());
    }
}
