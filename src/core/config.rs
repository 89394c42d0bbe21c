use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub presence: PresenceConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: Option<u16>,
    pub unix_socket: Option<PathBuf>,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PresenceConfig {
    /// Maximum heartbeat age, in seconds, before a row is hidden from matching
    #[serde(default = "default_freshness_window")]
    pub freshness_window: i64,

    /// How often the background sweeper demotes stale rows, in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval: u64,

    #[serde(default = "default_table_capacity")]
    pub table_capacity: usize,

    #[serde(default = "default_journal_path")]
    pub journal_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    /// Recognized interest tags. Empty selects the open-vocabulary variant,
    /// where raw tag sets are compared without projection.
    #[serde(default)]
    pub vocabulary: Vec<String>,

    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            vocabulary: Vec::new(),
            max_results: default_max_results(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_console")]
    pub console: bool,
}

// Default value functions
fn default_num_threads() -> usize {
    num_cpus::get()
}

fn default_freshness_window() -> i64 {
    60
}

fn default_sweep_interval() -> u64 {
    30
}

fn default_table_capacity() -> usize {
    10_000
}

fn default_journal_path() -> PathBuf {
    PathBuf::from("ailink.journal")
}

fn default_max_results() -> usize {
    4
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_console() -> bool {
    false
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port.is_none() && self.server.unix_socket.is_none() {
            bail!("Either port or unix_socket must be specified in server config");
        }

        if let Some(port) = self.server.port {
            if port == 0 {
                bail!("Server port must be greater than 0");
            }
        }

        if self.server.num_threads == 0 {
            bail!("num_threads must be greater than 0");
        }

        // The freshness window the source deployments used spans 15-120s;
        // anything outside that either hides everyone or keeps zombies live
        if !(15..=120).contains(&self.presence.freshness_window) {
            bail!(
                "freshness_window ({}) must be between 15 and 120 seconds",
                self.presence.freshness_window
            );
        }

        if self.presence.sweep_interval == 0 {
            bail!("sweep_interval must be greater than 0");
        }

        if self.presence.sweep_interval as i64 >= self.presence.freshness_window {
            bail!(
                "sweep_interval ({}) must be less than freshness_window ({})",
                self.presence.sweep_interval,
                self.presence.freshness_window
            );
        }

        if self.presence.table_capacity == 0 {
            bail!("table_capacity must be greater than 0");
        }

        if self.matching.max_results == 0 {
            bail!("max_results must be greater than 0");
        }

        for tag in &self.matching.vocabulary {
            if tag.trim().is_empty() {
                bail!("Vocabulary tags must not be empty");
            }
            if tag.contains('|') {
                bail!("Vocabulary tag {:?} must not contain '|'", tag);
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            server: ServerConfig {
                port: Some(8080),
                unix_socket: None,
                num_threads: 4,
            },
            presence: PresenceConfig {
                freshness_window: 60,
                sweep_interval: 30,
                table_capacity: 10_000,
                journal_path: PathBuf::from("test.journal"),
            },
            matching: MatchingConfig {
                vocabulary: vec!["python".to_string(), "ml".to_string()],
                max_results: 4,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
                console: false,
            },
        }
    }

    #[test]
    fn test_load_shipped_config() {
        let path = PathBuf::from("config.toml");
        let config = Config::from_file(&path).expect("Failed to load config");

        assert!(config.server.port.is_some());
        assert!(!config.matching.vocabulary.is_empty());
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_no_listener_rejected() {
        let mut config = base_config();
        config.server.port = None;
        config.server.unix_socket = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_freshness_window_bounds() {
        let mut config = base_config();

        config.presence.freshness_window = 10;
        assert!(config.validate().is_err());

        config.presence.freshness_window = 121;
        assert!(config.validate().is_err());

        config.presence.freshness_window = 15;
        config.presence.sweep_interval = 10;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sweep_interval_must_be_inside_window() {
        let mut config = base_config();
        config.presence.sweep_interval = 60;
        assert!(config.validate().is_err());

        config.presence.sweep_interval = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_vocabulary_tag_rejected() {
        let mut config = base_config();
        config.matching.vocabulary.push("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_open_vocabulary_allowed() {
        let mut config = base_config();
        config.matching.vocabulary.clear();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_from_minimal_toml() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9090

            [presence]

            [logging]
            "#,
        )
        .unwrap();

        assert_eq!(config.presence.freshness_window, 60);
        assert_eq!(config.presence.sweep_interval, 30);
        assert_eq!(config.matching.max_results, 4);
        assert!(config.matching.vocabulary.is_empty());
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }
}
