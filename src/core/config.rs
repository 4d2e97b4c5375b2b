use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tokio_tungstenite::tungstenite::http::Uri;

pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8000/api/chat/ws";
pub const ENDPOINT_ENV_VAR: &str = "DESKCHAT_ENDPOINT";

/// Keys accepted by `deskchat set` / `deskchat unset`.
pub const CONFIG_KEYS: &[&str] = &["endpoint", "probe", "timestamps", "trace-file"];

#[derive(Debug)]
pub enum ConfigError {
    InvalidEndpoint { endpoint: String, reason: String },
    UnknownKey(String),
    InvalidValue { key: String, value: String },
    NoConfigDir,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidEndpoint { endpoint, reason } => {
                write!(f, "invalid endpoint '{endpoint}': {reason}")
            }
            ConfigError::UnknownKey(key) => write!(
                f,
                "unknown config key: {key} (expected one of: {})",
                CONFIG_KEYS.join(", ")
            ),
            ConfigError::InvalidValue { key, value } => {
                write!(f, "invalid value for {key}: {value}")
            }
            ConfigError::NoConfigDir => write!(f, "could not determine the config directory"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// WebSocket endpoint of the chat service
    pub endpoint: Option<String>,
    /// Message sent automatically once the connection opens
    pub probe_message: Option<String>,
    /// Show entry times in the transcript
    pub timestamps: Option<bool>,
    /// File that receives diagnostic tracing output in the full-screen UI
    pub trace_file: Option<PathBuf>,
}

impl Config {
    pub fn load() -> Result<Config, Box<dyn Error>> {
        let config_path = Self::get_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn load_from_path(config_path: &Path) -> Result<Config, Box<dyn Error>> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn Error>> {
        let config_path = Self::get_config_path()?;
        self.save_to_path(&config_path)
    }

    pub fn save_to_path(&self, config_path: &Path) -> Result<(), Box<dyn Error>> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        let proj_dirs = ProjectDirs::from("org", "servicedesk", "deskchat")
            .ok_or(ConfigError::NoConfigDir)?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.endpoint {
            Some(endpoint) => println!("  endpoint: {endpoint}"),
            None => println!("  endpoint: (unset, using {DEFAULT_ENDPOINT})"),
        }
        match &self.probe_message {
            Some(probe) => println!("  probe: {probe}"),
            None => println!("  probe: (unset)"),
        }
        match self.show_timestamps() {
            true => println!("  timestamps: on"),
            false => println!("  timestamps: off"),
        }
        match &self.trace_file {
            Some(path) => println!("  trace-file: {}", path.display()),
            None => println!("  trace-file: (unset)"),
        }
    }

    pub fn show_timestamps(&self) -> bool {
        self.timestamps.unwrap_or(true)
    }

    /// Pick the endpoint: command-line flag, then environment, then the
    /// config file, then the built-in default.
    pub fn resolve_endpoint(
        &self,
        flag: Option<&str>,
        env_value: Option<&str>,
    ) -> Result<String, ConfigError> {
        let endpoint = flag
            .or(env_value)
            .or(self.endpoint.as_deref())
            .unwrap_or(DEFAULT_ENDPOINT)
            .trim()
            .to_string();
        validate_endpoint(&endpoint)?;
        Ok(endpoint)
    }

    /// Apply `deskchat set <key> <value>`; returns a confirmation line.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<String, ConfigError> {
        let value = value.trim();
        match key {
            "endpoint" => {
                validate_endpoint(value)?;
                self.endpoint = Some(value.to_string());
                Ok(format!("Set endpoint to: {value}"))
            }
            "probe" => {
                if value.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    });
                }
                self.probe_message = Some(value.to_string());
                Ok(format!("Set probe to: {value}"))
            }
            "timestamps" => {
                let enabled = parse_toggle(value).ok_or_else(|| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                })?;
                self.timestamps = Some(enabled);
                Ok(format!(
                    "Set timestamps to: {}",
                    if enabled { "on" } else { "off" }
                ))
            }
            "trace-file" => {
                if value.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    });
                }
                self.trace_file = Some(PathBuf::from(value));
                Ok(format!("Set trace-file to: {value}"))
            }
            _ => Err(ConfigError::UnknownKey(key.to_string())),
        }
    }

    pub fn unset_value(&mut self, key: &str) -> Result<String, ConfigError> {
        match key {
            "endpoint" => self.endpoint = None,
            "probe" => self.probe_message = None,
            "timestamps" => self.timestamps = None,
            "trace-file" => self.trace_file = None,
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(format!("Unset {key}"))
    }
}

fn parse_toggle(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Accepts `ws://` and `wss://` URLs with a host.
pub fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidEndpoint {
        endpoint: endpoint.to_string(),
        reason: reason.to_string(),
    };

    let uri = endpoint
        .parse::<Uri>()
        .map_err(|err| invalid(&err.to_string()))?;

    match uri.scheme_str() {
        Some("ws") | Some("wss") => {}
        Some(other) => return Err(invalid(&format!("unsupported scheme '{other}'"))),
        None => return Err(invalid("missing ws:// or wss:// scheme")),
    }

    if uri.host().is_none_or(str::is_empty) {
        return Err(invalid("missing host"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_nonexistent_config() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config_path = temp_dir.path().join("nonexistent_config.toml");

        let config = Config::load_from_path(&config_path).expect("Failed to load config");

        assert_eq!(config, Config::default());
        assert!(config.show_timestamps());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let config = Config {
            endpoint: Some("ws://desk.example:9000/api/chat/ws".to_string()),
            probe_message: Some("Test connection".to_string()),
            timestamps: Some(false),
            trace_file: Some(PathBuf::from("/tmp/deskchat.log")),
        };
        config
            .save_to_path(&config_path)
            .expect("Failed to save config");

        let loaded = Config::load_from_path(&config_path).expect("Failed to load config");
        assert_eq!(loaded, config);
        assert!(!loaded.show_timestamps());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "endpoint = [").unwrap();

        assert!(Config::load_from_path(&config_path).is_err());
    }

    #[test]
    fn test_endpoint_precedence() {
        let config = Config {
            endpoint: Some("ws://from-config/ws".to_string()),
            ..Default::default()
        };

        assert_eq!(
            config
                .resolve_endpoint(Some("ws://from-flag/ws"), Some("ws://from-env/ws"))
                .unwrap(),
            "ws://from-flag/ws"
        );
        assert_eq!(
            config
                .resolve_endpoint(None, Some("ws://from-env/ws"))
                .unwrap(),
            "ws://from-env/ws"
        );
        assert_eq!(
            config.resolve_endpoint(None, None).unwrap(),
            "ws://from-config/ws"
        );
        assert_eq!(
            Config::default().resolve_endpoint(None, None).unwrap(),
            DEFAULT_ENDPOINT
        );
    }

    #[test]
    fn test_endpoint_validation() {
        assert!(validate_endpoint("ws://localhost:8000/api/chat/ws").is_ok());
        assert!(validate_endpoint("wss://desk.example/api/chat/ws").is_ok());

        for bad in [
            "http://localhost:8000/api/chat/ws",
            "localhost:8000",
            "ws://",
            "not a url",
        ] {
            assert!(
                matches!(
                    validate_endpoint(bad),
                    Err(ConfigError::InvalidEndpoint { .. })
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_set_and_unset_values() {
        let mut config = Config::default();

        config.set_value("endpoint", "ws://desk:1/ws").unwrap();
        config.set_value("probe", "Test connection").unwrap();
        config.set_value("timestamps", "off").unwrap();
        config.set_value("trace-file", "trace.log").unwrap();

        assert_eq!(config.endpoint.as_deref(), Some("ws://desk:1/ws"));
        assert_eq!(config.probe_message.as_deref(), Some("Test connection"));
        assert_eq!(config.timestamps, Some(false));
        assert_eq!(config.trace_file, Some(PathBuf::from("trace.log")));

        for key in CONFIG_KEYS {
            config.unset_value(key).unwrap();
        }
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut config = Config::default();

        assert!(matches!(
            config.set_value("colour", "blue"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            config.set_value("timestamps", "sometimes"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set_value("endpoint", "https://desk/ws"),
            Err(ConfigError::InvalidEndpoint { .. })
        ));
        assert_eq!(config, Config::default());
    }
}
