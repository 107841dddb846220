//! Application configuration module.
//!
//! Handles loading, validating, and merging `shubhkaman.toml`. Stock defaults
//! are serialized to a TOML table, the user file is merged on top key by key,
//! and the result is deserialized and validated.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! assets_dir = "assets"      # Directory holding the template images
//!
//! [text]
//! endpoint = "https://api.openai.com/v1/chat/completions"
//! model = "gpt-4o-mini"
//! max_words = 15
//! api_key_env = "SHUBHKAMAN_TEXT_API_KEY"
//!
//! [image]
//! endpoint = "https://api-inference.huggingface.co/models/stabilityai/stable-diffusion-xl-base-1.0"
//! count = 1                  # Candidates per request
//! api_key_env = "SHUBHKAMAN_IMAGE_API_KEY"
//!
//! [upload]
//! max_bytes = 5242880        # 5 MiB
//!
//! [export]
//! output_dir = "."
//! width = 1080
//! height = 1080
//! font_size = 64.0
//! text_color = "#ffffff"
//! band_color = "#000000"
//! band_opacity = 0.45
//! ```
//!
//! ## Credentials
//!
//! API keys never live in the file. Each generator names an environment
//! variable (`api_key_env`) that is read when a request is sent.
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "shubhkaman.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `shubhkaman.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Directory holding `sun1.jpg` .. `sun5.jpg`.
    pub assets_dir: PathBuf,
    /// Quote generation service.
    pub text: TextConfig,
    /// Background generation service.
    pub image: ImageConfig,
    /// Upload limits.
    pub upload: UploadConfig,
    /// Post rendering and output location.
    pub export: ExportConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets"),
            text: TextConfig::default(),
            image: ImageConfig::default(),
            upload: UploadConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.text.endpoint.trim().is_empty() {
            return Err(ConfigError::Validation(
                "text.endpoint must not be empty".into(),
            ));
        }
        if self.text.model.trim().is_empty() {
            return Err(ConfigError::Validation("text.model must not be empty".into()));
        }
        if self.text.max_words == 0 {
            return Err(ConfigError::Validation(
                "text.max_words must be at least 1".into(),
            ));
        }
        if self.image.endpoint.trim().is_empty() {
            return Err(ConfigError::Validation(
                "image.endpoint must not be empty".into(),
            ));
        }
        if self.image.count == 0 {
            return Err(ConfigError::Validation(
                "image.count must be at least 1".into(),
            ));
        }
        if self.upload.max_bytes == 0 {
            return Err(ConfigError::Validation(
                "upload.max_bytes must be non-zero".into(),
            ));
        }
        if self.export.width == 0 || self.export.height == 0 {
            return Err(ConfigError::Validation(
                "export.width and export.height must be non-zero".into(),
            ));
        }
        if self.export.font_size.is_nan() || self.export.font_size <= 0.0 {
            return Err(ConfigError::Validation(
                "export.font_size must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.export.band_opacity) {
            return Err(ConfigError::Validation(
                "export.band_opacity must be between 0 and 1".into(),
            ));
        }
        for (key, value) in [
            ("export.text_color", &self.export.text_color),
            ("export.band_color", &self.export.band_color),
        ] {
            if parse_hex_color(value).is_none() {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a #rrggbb color, got '{value}'"
                )));
            }
        }
        Ok(())
    }
}

/// Chat-completion service used for quotes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextConfig {
    pub endpoint: String,
    pub model: String,
    /// Word ceiling spliced into the instruction.
    pub max_words: u32,
    /// Environment variable holding the bearer token.
    pub api_key_env: String,
    /// Whole-request timeout. Absent means wait indefinitely.
    pub request_timeout_secs: Option<u64>,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_words: 15,
            api_key_env: "SHUBHKAMAN_TEXT_API_KEY".to_string(),
            request_timeout_secs: None,
        }
    }
}

/// Text-to-image service used for backgrounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageConfig {
    pub endpoint: String,
    /// Candidates requested per "Generate" click.
    pub count: usize,
    /// Environment variable holding the bearer token.
    pub api_key_env: String,
    /// Per-request timeout. Absent means wait indefinitely.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            endpoint:
                "https://api-inference.huggingface.co/models/stabilityai/stable-diffusion-xl-base-1.0"
                    .to_string(),
            count: 1,
            api_key_env: "SHUBHKAMAN_IMAGE_API_KEY".to_string(),
            request_timeout_secs: None,
        }
    }
}

/// Upload acceptance limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    /// Largest accepted file, inclusive.
    pub max_bytes: u64,
}

/// 5 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Post rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Where `<theme>-post.png` is written.
    pub output_dir: PathBuf,
    pub width: u32,
    pub height: u32,
    /// TrueType font for the quote. Without one only the caption band is drawn.
    pub font_path: Option<PathBuf>,
    /// Quote size in pixels.
    pub font_size: f32,
    pub text_color: String,
    pub band_color: String,
    /// 0 = invisible band, 1 = opaque.
    pub band_opacity: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            width: 1080,
            height: 1080,
            font_path: None,
            font_size: 64.0,
            text_color: "#ffffff".to_string(),
            band_color: "#000000".to_string(),
            band_opacity: 0.45,
        }
    }
}

/// Parse `#rrggbb` into RGB components.
pub fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Read a credential from the environment variable named in the config.
///
/// Empty values count as missing.
pub fn credential_from_env(var: &str) -> Option<String> {
    std::env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(AppConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from `path`, merged over stock defaults and validated.
///
/// A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# ShubhkamanAI Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# Directory holding the template backgrounds (sun1.jpg .. sun5.jpg).
assets_dir = "assets"

# ---------------------------------------------------------------------------
# Quote generation (chat-completions API)
# ---------------------------------------------------------------------------
[text]
endpoint = "https://api.openai.com/v1/chat/completions"
model = "gpt-4o-mini"

# Upper bound on the phrase length, spliced into the instruction.
max_words = 15

# Environment variable holding the bearer token. Keys are never stored here.
api_key_env = "SHUBHKAMAN_TEXT_API_KEY"

# Give up on a request after this many seconds. Omit to wait indefinitely.
# request_timeout_secs = 30

# ---------------------------------------------------------------------------
# Background generation (text-to-image API, raw image response)
# ---------------------------------------------------------------------------
[image]
endpoint = "https://api-inference.huggingface.co/models/stabilityai/stable-diffusion-xl-base-1.0"

# Candidates requested per generation. All must succeed or none are kept.
count = 1

api_key_env = "SHUBHKAMAN_IMAGE_API_KEY"

# request_timeout_secs = 120

# ---------------------------------------------------------------------------
# Uploads
# ---------------------------------------------------------------------------
[upload]
# Largest accepted file in bytes (inclusive). Default is 5 MiB.
max_bytes = 5242880

# ---------------------------------------------------------------------------
# Export
# ---------------------------------------------------------------------------
[export]
# Where <theme>-post.png is written.
output_dir = "."

# Canvas size in pixels. The background is center-cropped to this shape and scaled.
width = 1080
height = 1080

# TrueType font used for the quote. Without one, only the caption band is drawn.
# font_path = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"
font_size = 64.0

text_color = "#ffffff"
band_color = "#000000"

# Caption band opacity, 0 (invisible) to 1 (opaque).
band_opacity = 0.45
"##
}
