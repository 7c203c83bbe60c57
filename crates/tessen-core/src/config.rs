use anyhow::Result;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder};
use serde::Deserialize;

use crate::constants::{DEFAULT_MAX_ITERATIONS, DEFAULT_UNTITLED_DESCRIPTION};
use crate::error::{CoreError, CoreResult};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub alarm: AlarmConfig,
    #[serde(default)]
    pub recurrence: RecurrenceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Host identity used when synthesizing component uids.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityConfig {
    /// Overrides the detected hostname.
    pub hostname: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlarmConfig {
    /// Description given to display/email alarms when the owner has no summary.
    pub untitled_description: String,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            untitled_description: DEFAULT_UNTITLED_DESCRIPTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecurrenceConfig {
    /// Per-rule candidate cap; `0` disables the cap.
    pub max_iterations: u64,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl Settings {
    /// ## Summary
    /// Returns a configuration builder pre-populated with every default.
    ///
    /// ## Errors
    /// Returns an error if a default cannot be registered.
    pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("logging.level", "info")?
            .set_default("alarm.untitled_description", DEFAULT_UNTITLED_DESCRIPTION)?
            .set_default("recurrence.max_iterations", DEFAULT_MAX_ITERATIONS)?)
    }

    /// ## Summary
    /// Loads configuration from `TESSEN_*` environment variables and an optional
    /// `tessen.toml` file into a `Settings`.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Self::builder_with_defaults()?
            .add_source(
                config::Environment::with_prefix("TESSEN")
                    .convert_case(config::Case::Snake)
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .add_source(config::File::with_name("tessen.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?)
    }

    /// Checks values the deserializer cannot.
    ///
    /// ## Errors
    /// Returns `ConfigError` for an unknown log level, `InvalidInput` for a
    /// blank or whitespace-bearing hostname override and `ValidationError`
    /// for an empty alarm placeholder.
    pub fn validate(&self) -> CoreResult<()> {
        let level = self.logging.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(CoreError::ConfigError(format!(
                "unknown logging.level `{}`",
                self.logging.level
            )));
        }
        if let Some(host) = self.identity.hostname.as_deref()
            && (host.is_empty() || host.contains(char::is_whitespace))
        {
            return Err(CoreError::InvalidInput(format!(
                "identity.hostname `{host}` is not a host name"
            )));
        }
        if self.alarm.untitled_description.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "alarm.untitled_description must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    settings.validate()?;
    tracing::debug!(settings = ?settings, "Configuration loaded");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn defaults_match_constants() {
        let settings = Settings::default();
        assert_eq!(settings.logging.level, "info");
        assert!(settings.identity.hostname.is_none());
        assert_eq!(
            settings.alarm.untitled_description,
            DEFAULT_UNTITLED_DESCRIPTION
        );
        assert_eq!(settings.recurrence.max_iterations, DEFAULT_MAX_ITERATIONS);
    }

    #[test_log::test]
    fn builder_defaults_deserialize() {
        let settings: Settings = Settings::builder_with_defaults()
            .and_then(|b| Ok(b.build()?.try_deserialize()?))
            .expect("defaults should deserialize");

        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.recurrence.max_iterations, DEFAULT_MAX_ITERATIONS);
    }

    #[test]
    fn validate_rejects_bad_values() {
        assert!(Settings::default().validate().is_ok());

        let mut settings = Settings::default();
        settings.logging.level = "loud".to_string();
        assert!(matches!(settings.validate(), Err(CoreError::ConfigError(_))));

        let mut settings = Settings::default();
        settings.identity.hostname = Some("my host".to_string());
        assert!(matches!(settings.validate(), Err(CoreError::InvalidInput(_))));

        let mut settings = Settings::default();
        settings.alarm.untitled_description = "  ".to_string();
        assert!(matches!(
            settings.validate(),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[test]
    fn overrides_take_precedence() {
        let settings: Settings = Settings::builder_with_defaults()
            .and_then(|b| {
                Ok(b.set_override("identity.hostname", "calendar.example.com")?
                    .set_override("recurrence.max_iterations", 50)?
                    .build()?
                    .try_deserialize()?)
            })
            .expect("overrides should deserialize");

        assert_eq!(
            settings.identity.hostname.as_deref(),
            Some("calendar.example.com")
        );
        assert_eq!(settings.recurrence.max_iterations, 50);
        assert_eq!(
            settings.alarm.untitled_description,
            DEFAULT_UNTITLED_DESCRIPTION
        );
    }
}
