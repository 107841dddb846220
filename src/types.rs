//! Selection enums shared by the state, the controller and the CLI.
//!
//! Each enum has a stable lowercase wire name (used by serde, `FromStr` and
//! the CLI) and a human label taken from the card form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseSelectionError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

/// The greeting category. Drives the template list and the text prompt framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Morning,
    Night,
    Congratulations,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Morning, Theme::Night, Theme::Congratulations];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Morning => "morning",
            Theme::Night => "night",
            Theme::Congratulations => "congratulations",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Morning => "Morning",
            Theme::Night => "Night",
            Theme::Congratulations => "Congratulations",
        }
    }

    /// Phrase spliced into the text-generation instruction.
    pub fn greeting(self) -> &'static str {
        match self {
            Theme::Morning => "good morning",
            Theme::Night => "good night",
            Theme::Congratulations => "congratulations",
        }
    }

    /// Flat background used when a post has no image selected.
    pub fn placeholder_color(self) -> [u8; 3] {
        match self {
            Theme::Morning => [0xf6, 0xb2, 0x6b],
            Theme::Night => [0x1b, 0x24, 0x4a],
            Theme::Congratulations => [0x8e, 0x3b, 0xb8],
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ParseSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseSelectionError {
                kind: "theme",
                value: s.to_string(),
                expected: "morning, night, congratulations",
            })
    }
}

/// Where the background image comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageSourceMode {
    #[default]
    Template,
    Upload,
    AiGenerate,
}

impl ImageSourceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageSourceMode::Template => "template",
            ImageSourceMode::Upload => "upload",
            ImageSourceMode::AiGenerate => "ai-generate",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ImageSourceMode::Template => "Template images",
            ImageSourceMode::Upload => "Upload image",
            ImageSourceMode::AiGenerate => "Generate image by AI",
        }
    }
}

impl fmt::Display for ImageSourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageSourceMode {
    type Err = ParseSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "template" => Ok(ImageSourceMode::Template),
            "upload" => Ok(ImageSourceMode::Upload),
            "ai-generate" | "ai" => Ok(ImageSourceMode::AiGenerate),
            _ => Err(ParseSelectionError {
                kind: "image source",
                value: s.to_string(),
                expected: "template, upload, ai-generate",
            }),
        }
    }
}

/// Where the quote text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextSourceMode {
    Own,
    #[default]
    AiGenerate,
}

impl TextSourceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            TextSourceMode::Own => "own",
            TextSourceMode::AiGenerate => "ai-generate",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TextSourceMode::Own => "Write by own",
            TextSourceMode::AiGenerate => "Generate text by AI",
        }
    }
}

impl fmt::Display for TextSourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextSourceMode {
    type Err = ParseSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "own" => Ok(TextSourceMode::Own),
            "ai-generate" | "ai" => Ok(TextSourceMode::AiGenerate),
            _ => Err(ParseSelectionError {
                kind: "text source",
                value: s.to_string(),
                expected: "own, ai-generate",
            }),
        }
    }
}
