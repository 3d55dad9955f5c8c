use std::collections::HashMap;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Layered configuration for the `runtime` binary (spec.md's ambient config
/// addition): `config/<env>.yaml` overridden by `config/local.yaml` (not
/// checked in) overridden by `RUNTIME__`-prefixed environment variables,
/// the same three-layer precedence `trader::settings::Settings::new`
/// builds in the platform's own `server` binary.
#[derive(Debug, Deserialize)]
pub struct RuntimeSettings {
    /// Base URL each `demo_exchange` request is built against.
    pub exchange_base_url: String,
    /// Default subscription poll period, used wherever a strategy doesn't
    /// pick its own.
    #[serde(default = "default_poll_ms")]
    pub default_poll_ms: u64,
    /// Overrides [`engine::SHUTDOWN_DEADLINE`] when set.
    #[serde(default)]
    pub shutdown_deadline_ms: Option<u64>,
    /// `tracing_subscriber::EnvFilter` directive string, e.g. `"info"` or
    /// `"runtime=debug,engine=trace"`.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Per-strategy overrides, keyed by strategy name; currently unused by
    /// `demo-strategies` but threaded through so a real deployment can pin
    /// markets per strategy without a code change.
    #[serde(default)]
    pub strategy_markets: HashMap<String, String>,
}

fn default_poll_ms() -> u64 { 1000 }

fn default_log_filter() -> String { "info".to_string() }

impl RuntimeSettings {
    /// Mirrors `trader::settings::Settings::new(env)`: reads
    /// `RUNTIME_ENV` (falling back to `development`), layers
    /// `config/<env>.yaml`, an optional `config/local.yaml`, then
    /// `RUNTIME__`-prefixed environment variables over it.
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("RUNTIME_ENV").unwrap_or_else(|_| "development".to_string());
        Self::load_for_env(&env)
    }

    pub fn load_for_env(env: &str) -> Result<Self, ConfigError> {
        let config_file = format!("config/{env}.yaml");
        let built = Config::builder()
            .add_source(File::with_name(&config_file).required(false))
            .add_source(File::with_name("config/local.yaml").required(false))
            .add_source(Environment::with_prefix("RUNTIME").separator("__"))
            .build()?;
        built.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_files_still_resolve_through_environment_variables() {
        std::env::set_var("RUNTIME__EXCHANGE_BASE_URL", "https://example.invalid");
        let settings = RuntimeSettings::load_for_env("this-env-does-not-exist").unwrap();
        assert_eq!(settings.exchange_base_url, "https://example.invalid");
        assert_eq!(settings.default_poll_ms, 1000);
        assert_eq!(settings.log_filter, "info");
        std::env::remove_var("RUNTIME__EXCHANGE_BASE_URL");
    }
}
