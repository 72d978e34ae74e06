// Configuration module for echoroutes
// Reads from environment variables with sensible defaults

use crate::routes::extract::Strategy;
use crate::routes::resolve::{DEFAULT_PASSES, ResolverKind};
use std::env;
use std::str::FromStr;
use std::sync::OnceLock;

/// Global configuration instance
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Declaration extraction strategy (ECHOROUTES_STRATEGY)
    pub strategy: Strategy,

    /// Group resolver (ECHOROUTES_RESOLVER)
    pub resolver: ResolverKind,

    /// Sweeps made by the fixed-point resolver (ECHOROUTES_PASSES)
    pub passes: usize,

    /// Files above this size are skipped (ECHOROUTES_MAX_FILE_BYTES)
    pub max_file_bytes: u64,

    /// Quiet period before re-parsing changed files (ECHOROUTES_WATCH_DEBOUNCE_MS)
    pub watch_debounce_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy: Strategy::Syntax,
            resolver: ResolverKind::FixedPoint,
            passes: DEFAULT_PASSES,
            max_file_bytes: 4 * 1024 * 1024,
            watch_debounce_ms: 150,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();

        if let Some(val) = lookup("ECHOROUTES_STRATEGY") {
            match Strategy::parse(&val) {
                Some(parsed) => config.strategy = parsed,
                None => tracing::warn!(
                    "invalid ECHOROUTES_STRATEGY value: {val}, using default: {:?}",
                    config.strategy
                ),
            }
        }

        if let Some(val) = lookup("ECHOROUTES_RESOLVER") {
            match ResolverKind::parse(&val) {
                Some(parsed) => config.resolver = parsed,
                None => tracing::warn!(
                    "invalid ECHOROUTES_RESOLVER value: {val}, using default: {:?}",
                    config.resolver
                ),
            }
        }

        if let Some(parsed) = parse_number(&lookup, "ECHOROUTES_PASSES", config.passes) {
            config.passes = parsed.max(1);
        }

        if let Some(parsed) =
            parse_number(&lookup, "ECHOROUTES_MAX_FILE_BYTES", config.max_file_bytes)
        {
            config.max_file_bytes = parsed;
        }

        if let Some(parsed) =
            parse_number(&lookup, "ECHOROUTES_WATCH_DEBOUNCE_MS", config.watch_debounce_ms)
        {
            config.watch_debounce_ms = parsed;
        }

        config
    }

    /// Get the global configuration instance
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(Config::from_env)
    }
}

fn parse_number<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Option<T>
where
    T: FromStr + std::fmt::Display,
{
    let val = lookup(key)?;
    match val.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!("invalid {key} value: {val}, using default: {default}");
            None
        }
    }
}
