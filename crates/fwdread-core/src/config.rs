//! Reader configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default size of the read buffer, in bytes.
pub const DEFAULT_READER_SIZE: usize = 2048;

/// Smallest buffer a reader will ever work with. Smaller hints are clamped up.
pub const MIN_READER_SIZE: usize = 16;

/// Environment variable consulted by [`ReaderConfig::from_env`].
pub const BUFFER_SIZE_ENV: &str = "FWDREAD_BUFFER_SIZE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// Buffer capacity hint (in bytes). Clamped to [`MIN_READER_SIZE`].
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

fn default_buffer_size() -> usize {
    DEFAULT_READER_SIZE
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_READER_SIZE,
        }
    }
}

impl ReaderConfig {
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self { buffer_size }
    }

    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `FWDREAD_BUFFER_SIZE`: buffer capacity hint in bytes
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ReaderConfig::from_env`] but reads through `lookup`.
    /// Unparsable values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(s) = lookup(BUFFER_SIZE_ENV) {
            if let Ok(v) = s.trim().parse::<usize>() {
                cfg.buffer_size = v;
            }
        }

        cfg
    }

    /// Parse a JSON document such as `{"buffer_size": 4096}`.
    pub fn from_json(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(Error::Config("buffer_size must be non-zero".into()));
        }
        Ok(())
    }

    /// The capacity a reader built from this config will actually use.
    pub fn effective_buffer_size(&self) -> usize {
        self.buffer_size.max(MIN_READER_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ReaderConfig::default();
        assert_eq!(cfg.buffer_size, DEFAULT_READER_SIZE);
        assert_eq!(cfg.effective_buffer_size(), DEFAULT_READER_SIZE);
    }

    #[test]
    fn test_lookup_overrides_and_ignores_garbage() {
        let cfg =
            ReaderConfig::from_lookup(|k| (k == BUFFER_SIZE_ENV).then(|| "4096".to_string()));
        assert_eq!(cfg.buffer_size, 4096);

        let cfg = ReaderConfig::from_lookup(|_| Some("lots".to_string()));
        assert_eq!(cfg, ReaderConfig::default());

        let cfg = ReaderConfig::from_lookup(|_| None);
        assert_eq!(cfg, ReaderConfig::default());
    }

    #[test]
    fn test_floor_applies() {
        assert_eq!(
            ReaderConfig::with_buffer_size(3).effective_buffer_size(),
            MIN_READER_SIZE
        );
    }

    #[test]
    fn test_json() {
        let cfg = ReaderConfig::from_json(r#"{"buffer_size": 512}"#).unwrap();
        assert_eq!(cfg.buffer_size, 512);

        let cfg = ReaderConfig::from_json("{}").unwrap();
        assert_eq!(cfg.buffer_size, DEFAULT_READER_SIZE);

        let err = ReaderConfig::from_json(r#"{"buffer_size": 0}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = ReaderConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
