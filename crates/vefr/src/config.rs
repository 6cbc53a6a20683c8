//! Pipeline configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config:
//!
//! ```json
//! { "tick_budget_ms": 4, "font_cache_budget": 64 }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("`{field}` must be at least {min}")]
    OutOfRange { field: &'static str, min: u64 },
}

/// Tunables of the widget pipeline. Inserted as a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Wall-clock ceiling for one tick of widget work, in milliseconds.
    pub tick_budget_ms: u64,
    /// Total cost the bitmap-font cache may hold. Each font costs 1.
    pub font_cache_budget: usize,
    /// Appended to a font stem to find its glyph table.
    pub glyph_table_extension: String,
    /// Appended to a font stem to find its glyph sheet.
    pub glyph_sprite_extension: String,
    /// Palette used for button labels.
    pub label_palette: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tick_budget_ms: 4,
            font_cache_budget: 64,
            glyph_table_extension: ".tbl".to_string(),
            glyph_sprite_extension: ".dc6".to_string(),
            label_palette: "/data/global/palette/units/pal.dat".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        log::info!("loaded pipeline config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.font_cache_budget == 0 {
            return Err(ConfigError::OutOfRange {
                field: "font_cache_budget",
                min: 1,
            });
        }
        Ok(())
    }

    pub fn tick_budget(&self) -> Duration {
        Duration::from_millis(self.tick_budget_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = PipelineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.tick_budget(), Duration::from_millis(4));
        assert_eq!(config.font_cache_budget, 64);
    }

    #[test]
    fn partial_override() {
        let config = PipelineConfig::from_json_str(r#"{ "tick_budget_ms": 16 }"#).unwrap();
        assert_eq!(config.tick_budget_ms, 16);
        assert_eq!(config.glyph_table_extension, ".tbl");
    }

    #[test]
    fn zero_cache_budget_is_rejected() {
        let err = PipelineConfig::from_json_str(r#"{ "font_cache_budget": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "font_cache_budget", .. }));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            PipelineConfig::from_json_str("{ nope"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = PipelineConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
