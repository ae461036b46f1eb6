use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::language_utils::LanguagePair;

/// Application configuration module
/// Configuration is read once at startup from named environment values;
/// nothing is persisted and nothing is written back.
/// Environment variable forcing the fallback engine when its model is present
pub const FORCE_FALLBACK_ENV: &str = "TRANSLATOR_FORCE_HF";

/// Environment variable overriding the root directory of local fallback models
pub const FALLBACK_ROOT_ENV: &str = "TRANSLATOR_HF_ROOT";

/// Environment variable selecting the log level
pub const LOG_LEVEL_ENV: &str = "TRANSLATOR_LOG_LEVEL";

/// Default root directory of local fallback models
pub const DEFAULT_FALLBACK_ROOT: &str = "models/hf";

/// Source of named configuration values
pub trait EnvSource {
    /// Look up a named value; `None` when unset
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Represents the resolved application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Primary model locations keyed by direction ("de->en")
    #[serde(default)]
    pub model_locations: BTreeMap<String, PathBuf>,

    /// Prefer the fallback engine whenever its local model exists
    #[serde(default)]
    pub force_fallback: bool,

    /// Root directory holding per-pair fallback model directories
    #[serde(default = "default_fallback_root")]
    pub fallback_root: PathBuf,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(anyhow!("Invalid log level: {}", s)),
        }
    }
}

fn default_fallback_root() -> PathBuf {
    PathBuf::from(DEFAULT_FALLBACK_ROOT)
}

/// Boolean flags are true only for a case-insensitive "true"
fn parse_flag(value: Option<String>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

impl Config {
    /// Resolve configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_source(&ProcessEnv)
    }

    /// Resolve configuration from any source of named values
    pub fn from_source(env: &dyn EnvSource) -> Self {
        let model_locations = LanguagePair::all()
            .filter_map(|pair| {
                env.var(pair.model_env_var())
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .map(|v| (pair.direction(), PathBuf::from(v)))
            })
            .collect();

        let fallback_root = env
            .var(FALLBACK_ROOT_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_fallback_root);

        let log_level = match env.var(LOG_LEVEL_ENV) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                // the logger is not installed yet, so this cannot go through `log`
                eprintln!("Ignoring invalid {}={}", LOG_LEVEL_ENV, raw);
                LogLevel::default()
            }),
            None => LogLevel::default(),
        };

        Config {
            model_locations,
            force_fallback: parse_flag(env.var(FORCE_FALLBACK_ENV)),
            fallback_root,
            log_level,
        }
    }

    /// Configured primary model location for a pair
    pub fn model_location(&self, pair: &LanguagePair) -> Option<&Path> {
        self.model_locations.get(&pair.direction()).map(PathBuf::as_path)
    }

    /// Candidate fallback model directory for a pair (may not exist)
    pub fn fallback_dir(&self, pair: &LanguagePair) -> PathBuf {
        self.fallback_root.join(pair.fallback_model_name())
    }

    /// Check that every configured location names a supported direction
    pub fn validate(&self) -> Result<()> {
        for direction in self.model_locations.keys() {
            if !LanguagePair::all().any(|p| &p.direction() == direction) {
                return Err(anyhow!("Model location configured for unsupported direction: {}", direction));
            }
        }
        if self.fallback_root.as_os_str().is_empty() {
            return Err(anyhow!("Fallback model root must not be empty"));
        }
        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            model_locations: BTreeMap::new(),
            force_fallback: false,
            fallback_root: default_fallback_root(),
            log_level: LogLevel::default(),
        }
    }
}
