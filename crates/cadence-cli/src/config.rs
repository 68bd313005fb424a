use cadence_core::calendar::validate_timezone;
use cadence_core::error::CoreError;
use cadence_core::matching::{MatcherConfig, MerchantMatcher, MerchantRule};
use chrono_tz::Tz;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// CLI settings: built-in defaults, then `cadence.toml`, then `CADENCE_*`
/// environment variables (nested keys use `__`, e.g. `CADENCE_MATCHING__MIN_SCORE`).
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub database_path: String,
    /// IANA timezone used to decide what "today" is
    pub timezone: String,
    /// Default tracing filter; `RUST_LOG` takes precedence
    pub log_level: String,
    /// How many dates `preview` and `series show` print
    pub preview_count: usize,
    pub matching: MatcherConfig,
    pub merchant_rules: Vec<MerchantRule>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "cadence.db".to_string(),
            timezone: detect_system_timezone(),
            log_level: "warn".to_string(),
            preview_count: 12,
            matching: MatcherConfig::default(),
            merchant_rules: Vec::new(),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file("cadence.toml"))
            .merge(Env::prefixed("CADENCE_").split("__"))
            .extract()
    }

    pub fn tz(&self) -> Result<Tz, CoreError> {
        validate_timezone(&self.timezone)
    }

    pub fn matcher(&self) -> MerchantMatcher {
        MerchantMatcher::new(self.matching, self.merchant_rules.iter().cloned())
    }
}

/// Detects the system timezone, falling back to UTC if detection fails
pub fn detect_system_timezone() -> String {
    if let Ok(tz) = std::env::var("TZ") {
        if validate_timezone(&tz).is_ok() {
            return tz;
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Ok(tz) = std::fs::read_to_string("/etc/timezone") {
            let tz = tz.trim();
            if validate_timezone(tz).is_ok() {
                return tz.to_string();
            }
        }
    }

    if let Ok(local_tz) = iana_time_zone::get_timezone() {
        if validate_timezone(&local_tz).is_ok() {
            return local_tz;
        }
    }

    "UTC".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.database_path, "cadence.db");
        assert_eq!(config.preview_count, 12);
        assert_eq!(config.matching, MatcherConfig::default());
        assert!(config.tz().is_ok());
    }

    #[test]
    fn test_toml_and_env_layers() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "cadence.toml",
                r#"
                    timezone = "Europe/Berlin"
                    preview_count = 4

                    [[merchant_rules]]
                    merchant = "Starbucks"
                    category = "Coffee"
                "#,
            )?;
            jail.set_env("CADENCE_DATABASE_PATH", "/tmp/budget.db");
            jail.set_env("CADENCE_MATCHING__MIN_SCORE", "0.9");

            let config = Config::new()?;
            assert_eq!(config.timezone, "Europe/Berlin");
            assert_eq!(config.preview_count, 4);
            assert_eq!(config.database_path, "/tmp/budget.db");
            assert_eq!(config.matching.min_score, 0.9);
            assert_eq!(config.matching.min_margin, 0.04);
            assert_eq!(config.merchant_rules.len(), 1);
            assert_eq!(
                config.matcher().suggest("STARBUCKS").map(|s| s.category),
                Some("Coffee".to_string())
            );
            Ok(())
        });
    }
}
