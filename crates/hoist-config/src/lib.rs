use std::path::Path;
use std::sync::Once;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer};

mod schema;

pub use schema::json_schema;

/// Settings for the extract-variable refactoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ExtractVariableConfig {
    /// Offer the refactoring at all.
    #[serde(default = "ExtractVariableConfig::default_enabled")]
    pub enabled: bool,

    /// Name of the introduced variable. Must be a C identifier that is not a keyword.
    #[serde(default = "ExtractVariableConfig::default_variable_name")]
    #[schemars(regex(pattern = r"^[A-Za-z_][A-Za-z0-9_]*$"))]
    pub variable_name: String,
}

impl ExtractVariableConfig {
    fn default_enabled() -> bool {
        true
    }

    fn default_variable_name() -> String {
        "placeholder".to_owned()
    }
}

impl Default for ExtractVariableConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            variable_name: Self::default_variable_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// A level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    /// The configured level as filter directives. Plain level names are matched loosely.
    pub(crate) fn level_directives(level: &str) -> String {
        let level = level.trim();
        match level.to_ascii_lowercase().as_str() {
            "" => Self::default_level(),
            "warning" => "warn".to_owned(),
            name @ ("trace" | "debug" | "info" | "warn" | "error") => name.to_owned(),
            _ => level.to_owned(),
        }
    }

    /// The effective filter: the configured level, with `RUST_LOG` appended when set.
    ///
    /// Candidates that fail to parse are skipped in order: the merged directives, `RUST_LOG`
    /// alone, the configured level, and finally `info`.
    pub fn env_filter(&self) -> EnvFilter {
        let configured = Self::level_directives(&self.level);
        let mut candidates = Vec::with_capacity(3);
        if let Some(env) = std::env::var("RUST_LOG")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
        {
            candidates.push(format!("{configured},{env}"));
            candidates.push(env);
        }
        candidates.push(configured);

        candidates
            .into_iter()
            .find_map(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::default().add_directive(LevelFilter::INFO.into()))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
        }
    }
}

/// Top-level `hoist.toml`.
///
/// ```toml
/// [extract_variable]
/// enabled = true
/// variable_name = "extracted"
///
/// [logging]
/// level = "debug"
/// json = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct HoistConfig {
    #[serde(default)]
    pub extract_variable: ExtractVariableConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
    #[error("invalid value for `{toml_path}`: {message}")]
    InvalidValue { toml_path: String, message: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // The `Display` impl embeds a source snippet; keep only the message.
        ConfigError::Toml(err.message().to_owned())
    }
}

const KEYWORDS: &[&str] = &[
    "alignas", "alignof", "auto", "bool", "break", "case", "catch", "char", "class", "const",
    "constexpr", "continue", "decltype", "default", "delete", "do", "double", "else", "enum",
    "explicit", "extern", "false", "float", "for", "friend", "goto", "if", "inline", "int",
    "long", "mutable", "namespace", "new", "noexcept", "nullptr", "operator", "private",
    "protected", "public", "register", "requires", "restrict", "return", "short", "signed",
    "sizeof", "static", "struct", "switch", "template", "this", "throw", "true", "try",
    "typedef", "typename", "union", "unsigned", "using", "virtual", "void", "volatile", "while",
];

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

impl HoistConfig {
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let config: HoistConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }

    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = &self.extract_variable.variable_name;
        let message = if !is_identifier(name) {
            Some("must be a C identifier")
        } else if KEYWORDS.contains(&name.as_str()) {
            Some("must not be a keyword")
        } else {
            None
        };
        if let Some(message) = message {
            return Err(ConfigError::InvalidValue {
                toml_path: "extract_variable.variable_name".to_owned(),
                message: message.to_owned(),
            });
        }

        let level = LoggingConfig::level_directives(&self.logging.level);
        if EnvFilter::try_new(&level).is_err() {
            return Err(ConfigError::InvalidValue {
                toml_path: "logging.level".to_owned(),
                message: format!("`{level}` is not a valid filter"),
            });
        }
        Ok(())
    }
}

static TRACING_INIT: Once = Once::new();

/// Installs the global `tracing` subscriber.
///
/// Only the first call has an effect.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        let layer: Box<dyn Layer<_> + Send + Sync> = if config.json {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .boxed()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .boxed()
        };
        let subscriber = tracing_subscriber::registry()
            .with(config.env_filter())
            .with(layer);
        if tracing::subscriber::set_global_default(subscriber).is_ok() {
            tracing::debug!(target = "hoist.config", json = config.json, "tracing initialized");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_apply_to_missing_tables() {
        let config = HoistConfig::load_from_str("").unwrap();
        assert_eq!(config, HoistConfig::default());
        assert!(config.extract_variable.enabled);
        assert_eq!(config.extract_variable.variable_name, "placeholder");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn level_normalization_is_forgiving() {
        assert_eq!(LoggingConfig::level_directives(" WARNING "), "warn");
        assert_eq!(LoggingConfig::level_directives(""), "info");
        assert_eq!(
            LoggingConfig::level_directives("hoist.refactor=trace"),
            "hoist.refactor=trace"
        );
    }

    #[test]
    fn identifiers_are_checked() {
        assert!(is_identifier("_tmp1"));
        assert!(!is_identifier("1tmp"));
        assert!(!is_identifier("two words"));
        assert!(!is_identifier(""));
    }
}
