//! config.rs
//! Encoder configuration.
//!
//! Design notes:
//! - Every field has a default (see `constants`), so `{}` is a valid JSON config.
//! - `Encoder::new` enforces the same chunk_size rule as `validate()`; a config
//!   read from disk or a UI form can be checked before any content is encoded.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::DEFAULT_CHUNK_SIZE;
use crate::packet::CorrectionLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Payload bytes per data packet (1..=255).
    pub chunk_size: u8,
    /// Error-correction level requested from the renderer.
    pub correction_level: CorrectionLevel,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            correction_level: CorrectionLevel::default(),
        }
    }
}

impl EncoderConfig {
    pub fn new(chunk_size: u8, correction_level: CorrectionLevel) -> Self {
        Self { chunk_size, correction_level }
    }

    pub fn with_chunk_size(mut self, chunk_size: u8) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_correction_level(mut self, correction_level: CorrectionLevel) -> Self {
        self.correction_level = correction_level;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSizeZero);
        }
        Ok(())
    }

    /// Parse and validate a JSON config, e.g. `{"chunk_size": 64, "correction_level": "Q"}`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid chunk_size: zero")]
    InvalidChunkSizeZero,

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
