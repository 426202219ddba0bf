pub mod canvas;
pub mod font;
pub mod layout;
pub mod timestamp;

use image::RgbImage;
use log::debug;
use std::path::{ Path, PathBuf };
use thiserror::Error;

use crate::config::style::StyleConfig;
use crate::models::chat::{ ConversationLine, Side };
use self::font::{ FontFace, FontSet, Typeface };
use self::layout::{ layout_conversation, ConversationLayout };

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("No usable font found (looked at: {})", display_paths(.0))]
    FontNotFound(Vec<PathBuf>),
    #[error("Failed to read font '{}': {source}", path.display())]
    FontIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse font '{}': {message}", path.display())]
    FontParse {
        path: PathBuf,
        message: String,
    },
    #[error("Failed to write image '{}': {source}", path.display())]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A finished picture together with the layout that produced it.
pub struct RenderedImage {
    pub pixels: RgbImage,
    pub layout: ConversationLayout,
}

impl RenderedImage {
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), RenderError> {
        let path = path.as_ref();
        self.pixels
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(|source| RenderError::ImageWrite { path: path.to_path_buf(), source })
    }
}

/// Draws conversations with a fixed style and pair of typefaces.
///
/// Holds no mutable state, so one renderer serves a whole run.
pub struct Renderer<'a, F: Typeface> {
    style: &'a StyleConfig,
    body: &'a F,
    meta: &'a F,
}

impl<'a> Renderer<'a, FontFace> {
    pub fn with_fonts(style: &'a StyleConfig, fonts: &'a FontSet) -> Self {
        Self::new(style, &fonts.bubble, &fonts.time)
    }
}

impl<'a, F: Typeface> Renderer<'a, F> {
    pub fn new(style: &'a StyleConfig, body: &'a F, meta: &'a F) -> Self {
        Self { style, body, meta }
    }

    pub fn render_conversation(
        &self,
        lines: &[ConversationLine],
        sides: &[Side],
        timestamp: Option<&str>
    ) -> RenderedImage {
        let layout = layout_conversation(lines, sides, self.style, self.body, self.meta, timestamp);
        let pixels = self.paint(&layout);
        debug!("Rendered {} bubble(s)", layout.bubbles.len());
        RenderedImage { pixels, layout }
    }

    /// A canvas holding a single bubble.
    pub fn render_message(
        &self,
        line: &ConversationLine,
        side: Side,
        timestamp: Option<&str>
    ) -> RenderedImage {
        self.render_conversation(std::slice::from_ref(line), &[side], timestamp)
    }

    fn paint(&self, layout: &ConversationLayout) -> RgbImage {
        let style = self.style;
        let mut pixels = canvas::blank(style.width, style.height, style.background);

        for bubble in &layout.bubbles {
            let colors = style.colors(bubble.side);
            canvas::rounded_rect(
                &mut pixels,
                &bubble.rect,
                style.corner_radius,
                colors.fill,
                colors.outline,
                style.outline_width
            );
            for line in &bubble.lines {
                self.body.draw(&mut pixels, line.x, line.y, &line.text, style.text_color);
            }
        }

        for meta in layout.seen.iter().chain(layout.timestamp.iter()) {
            self.meta.draw(&mut pixels, meta.x, meta.y, &meta.text, style.meta_color);
        }
        pixels
    }
}
