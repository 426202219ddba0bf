use fontdue::{ Font, FontSettings };
use image::RgbImage;
use log::{ debug, info };
use std::fs;
use std::io::ErrorKind;
use std::path::{ Path, PathBuf };

use super::canvas;
use super::layout::TextMeasure;
use super::RenderError;
use crate::config::style::StyleConfig;

/// Font files tried, in order, when no explicit font is given.
pub const FONT_CANDIDATES: &[&str] = &[
    "sf-pro-text-regular.ttf",
    "SFUIText-Regular.ttf",
    "SanFrancisco.ttf",
    "Helvetica.ttf",
    "HelveticaNeue.ttf",
];

/// Something that can both measure and paint a line of text.
pub trait Typeface: TextMeasure {
    /// Draws `text` with the top of its line box at (x, y).
    fn draw(&self, canvas: &mut RgbImage, x: i32, y: i32, text: &str, color: [u8; 3]);
}

#[derive(Clone)]
pub struct FontFace {
    font: Font,
    size: f32,
    ascent: f32,
    descent: f32,
}

impl FontFace {
    pub fn new(font: Font, size: f32) -> Self {
        let (ascent, descent) = match font.horizontal_line_metrics(size) {
            Some(metrics) => (metrics.ascent, metrics.descent),
            None => (size * 0.8, -size * 0.2),
        };
        Self { font, size, ascent, descent }
    }

    fn kern(&self, prev: Option<char>, ch: char) -> f32 {
        prev.and_then(|p| self.font.horizontal_kern(p, ch, self.size)).unwrap_or(0.0)
    }
}

impl TextMeasure for FontFace {
    fn width(&self, text: &str) -> f32 {
        let mut pen = 0.0;
        let mut prev = None;
        for ch in text.chars() {
            pen += self.kern(prev, ch);
            pen += self.font.metrics(ch, self.size).advance_width;
            prev = Some(ch);
        }
        pen
    }

    fn line_height(&self) -> f32 {
        self.ascent - self.descent
    }
}

impl Typeface for FontFace {
    fn draw(&self, canvas: &mut RgbImage, x: i32, y: i32, text: &str, color: [u8; 3]) {
        let baseline = (y as f32) + self.ascent;
        let mut pen = x as f32;
        let mut prev = None;
        for ch in text.chars() {
            pen += self.kern(prev, ch);
            let (metrics, bitmap) = self.font.rasterize(ch, self.size);
            if metrics.width > 0 && metrics.height > 0 {
                let gx = (pen + (metrics.xmin as f32)).round() as i32;
                let gy = (baseline - (metrics.height as f32) - (metrics.ymin as f32)).round() as i32;
                canvas::blend_mask(canvas, gx, gy, &bitmap, metrics.width, color);
            }
            pen += metrics.advance_width;
            prev = Some(ch);
        }
    }
}

/// The two faces a conversation is drawn with. Loaded once per run.
#[derive(Clone)]
pub struct FontSet {
    pub bubble: FontFace,
    pub time: FontFace,
    pub path: PathBuf,
}

impl FontSet {
    pub fn load(
        explicit: Option<&Path>,
        fonts_dir: &Path,
        style: &StyleConfig
    ) -> Result<Self, RenderError> {
        let path = resolve_font_path(explicit, fonts_dir)?;
        let bytes = fs::read(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                RenderError::FontNotFound(vec![path.clone()])
            } else {
                RenderError::FontIo { path: path.clone(), source: e }
            }
        })?;
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(|e| RenderError::FontParse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        info!("Loaded font {}", path.display());

        Ok(Self {
            bubble: FontFace::new(font.clone(), style.bubble_font_size),
            time: FontFace::new(font, style.time_font_size),
            path,
        })
    }
}

pub fn resolve_font_path(explicit: Option<&Path>, fonts_dir: &Path) -> Result<PathBuf, RenderError> {
    if let Some(path) = explicit {
        return if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(RenderError::FontNotFound(vec![path.to_path_buf()]))
        };
    }

    let searched: Vec<PathBuf> = FONT_CANDIDATES.iter()
        .map(|name| fonts_dir.join(name))
        .collect();
    for candidate in &searched {
        debug!("Looking for font at {}", candidate.display());
        if candidate.is_file() {
            return Ok(candidate.clone());
        }
    }
    Err(RenderError::FontNotFound(searched))
}
