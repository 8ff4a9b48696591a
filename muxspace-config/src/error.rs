//! Typed error variants for the muxspace-config crate.
//!
//! These are used internally and exposed for library consumers who want to
//! match on specific failure modes instead of opaque `anyhow` strings. For
//! backward compatibility with callers that use `anyhow`, `Config::load` and
//! `Config::save` return `anyhow::Result`; `ConfigError` values are coerced
//! via the blanket `From` impl anyhow provides for any `std::error::Error`.

use thiserror::Error;

/// Errors that can occur when loading, saving, or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An I/O error occurred reading or writing the config file.
    #[error("I/O error reading config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file contained invalid YAML that could not be parsed.
    #[error("YAML parse error in config: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    /// A field value failed semantic validation.
    ///
    /// The inner string describes which field is invalid and why.
    #[error("config validation failed: {0}")]
    Validation(String),

    /// No usable configuration directory could be resolved on this platform.
    #[error("could not resolve a configuration directory")]
    NoConfigDir,
}
