use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use log::info;

use crate::models::chat::Side;

#[derive(Debug)]
pub enum StyleError {
    NotFound(String),
    Io(std::io::Error),
    Json(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for StyleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleError::NotFound(path) => write!(f, "Style file '{}' not found", path),
            StyleError::Io(e) => write!(f, "Style file IO error: {}", e),
            StyleError::Json(e) => write!(f, "Style JSON parsing error: {}", e),
            StyleError::Invalid(msg) => write!(f, "Invalid style: {}", msg),
        }
    }
}

impl Error for StyleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StyleError::Io(e) => Some(e),
            StyleError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StyleError {
    fn from(err: std::io::Error) -> Self {
        StyleError::Io(err)
    }
}

impl From<serde_json::Error> for StyleError {
    fn from(err: serde_json::Error) -> Self {
        StyleError::Json(err)
    }
}

pub type Color = [u8; 3];

/// Largest canvas edge accepted from a style file.
pub const MAX_CANVAS_EDGE: u32 = 16384;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct BubbleColors {
    pub fill: Color,
    pub outline: Color,
}

/// Everything the renderer needs to know about how a conversation looks.
///
/// Loaded once and never mutated while rendering. Fields missing from a
/// style file keep their default.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StyleConfig {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub bubble_font_size: f32,
    pub time_font_size: f32,
    pub sender: BubbleColors,
    pub receiver: BubbleColors,
    pub text_color: Color,
    pub meta_color: Color,
    /// Widest a bubble may get, as a fraction of the canvas width.
    pub max_bubble_fraction: f32,
    pub bubble_padding: u32,
    pub line_spacing: u32,
    pub corner_radius: u32,
    pub outline_width: u32,
    pub left_margin: u32,
    pub right_margin: u32,
    pub bottom_padding: u32,
    pub bubble_gap: u32,
    pub same_speaker_gap: u32,
    pub timestamp_gap: u32,
    pub seen_gap: u32,
    pub seen_text: String,
    pub show_timestamp: bool,
    pub show_seen: bool,
}

impl Default for BubbleColors {
    fn default() -> Self {
        Self {
            fill: [255, 255, 255],
            outline: [230, 230, 230],
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            width: 1290,
            height: 1290,
            background: [255, 255, 255],
            bubble_font_size: 40.0,
            time_font_size: 34.0,
            sender: BubbleColors::default(),
            receiver: BubbleColors {
                fill: [240, 240, 240],
                outline: [255, 255, 255],
            },
            text_color: [0, 0, 0],
            meta_color: [128, 128, 128],
            max_bubble_fraction: 0.65,
            bubble_padding: 32,
            line_spacing: 8,
            corner_radius: 50,
            outline_width: 3,
            left_margin: 190,
            right_margin: 40,
            bottom_padding: 280,
            bubble_gap: 22,
            same_speaker_gap: 2,
            timestamp_gap: 50,
            seen_gap: 10,
            seen_text: "Seen just now".to_string(),
            show_timestamp: true,
            show_seen: true,
        }
    }
}

impl StyleConfig {
    pub fn colors(&self, side: Side) -> BubbleColors {
        match side {
            Side::Sender => self.sender,
            Side::Receiver => self.receiver,
        }
    }

    /// Pixel budget for the text inside one bubble.
    pub fn max_text_width(&self) -> f32 {
        ((self.width as f32) * self.max_bubble_fraction).floor() -
            (2 * self.bubble_padding) as f32
    }

    pub fn validate(&self) -> Result<(), StyleError> {
        if self.width == 0 || self.height == 0 {
            return Err(
                StyleError::Invalid(format!("canvas must be non-empty, got {}x{}", self.width, self.height))
            );
        }
        if self.width > MAX_CANVAS_EDGE || self.height > MAX_CANVAS_EDGE {
            return Err(
                StyleError::Invalid(
                    format!(
                        "canvas {}x{} exceeds the {}px limit",
                        self.width,
                        self.height,
                        MAX_CANVAS_EDGE
                    )
                )
            );
        }
        if !(self.max_bubble_fraction > 0.0 && self.max_bubble_fraction <= 1.0) {
            return Err(
                StyleError::Invalid(
                    format!("max_bubble_fraction must be in (0, 1], got {}", self.max_bubble_fraction)
                )
            );
        }
        if !(self.bubble_font_size > 0.0) || !(self.time_font_size > 0.0) {
            return Err(StyleError::Invalid("font sizes must be positive".to_string()));
        }
        if self.max_text_width() <= 0.0 {
            return Err(
                StyleError::Invalid(
                    "bubble_padding leaves no room for text at this width".to_string()
                )
            );
        }
        Ok(())
    }
}

pub fn load_style_from_str(json: &str) -> Result<StyleConfig, StyleError> {
    let style: StyleConfig = serde_json::from_str(json)?;
    style.validate()?;
    Ok(style)
}

pub fn load_style<P: AsRef<Path>>(path: P) -> Result<StyleConfig, StyleError> {
    let path = path.as_ref();
    let json_str = fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            StyleError::NotFound(path.display().to_string())
        } else {
            StyleError::Io(e)
        }
    })?;
    let style = load_style_from_str(&json_str)?;
    info!("Loaded style from {}", path.display());
    Ok(style)
}
