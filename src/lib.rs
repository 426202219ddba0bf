pub mod models;
pub mod config;
pub mod cli;
pub mod parser;
pub mod render;

use cli::{ Args, Command };
use config::style::{ load_style, StyleConfig };
use log::{ info, warn };
use models::chat::{ resolve_sides, ConversationLine, Side };
use parser::{ parse_file, ContinuationPolicy };
use render::font::FontSet;
use render::timestamp::TimestampSource;
use render::Renderer;
use std::error::Error;
use std::fs;
use std::path::{ Path, PathBuf };

/// Resolves the style from the optional style file plus command-line overrides.
pub fn build_style(args: &Args) -> Result<StyleConfig, Box<dyn Error + Send + Sync>> {
    let mut style = match &args.style {
        Some(path) => load_style(path)?,
        None => StyleConfig::default(),
    };
    if args.no_timestamp {
        style.show_timestamp = false;
    }
    if args.no_seen {
        style.show_seen = false;
    }
    style.validate()?;
    Ok(style)
}

pub fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let style = build_style(&args)?;

    info!("--- Core Configuration ---");
    info!("Style: {}", args.style.as_deref().unwrap_or("built-in"));
    info!("Font: {}", args.font.as_deref().unwrap_or("auto"));
    info!("Fonts Dir: {}", args.fonts_dir);
    info!("Canvas: {}x{}", style.width, style.height);
    info!("Sender: {}", args.sender.as_deref().unwrap_or("first speaker"));
    info!("Timestamp: {}", if style.show_timestamp { "on" } else { "off" });
    info!("Seen Indicator: {}", if style.show_seen { "on" } else { "off" });
    info!("-------------------------");

    let fonts = FontSet::load(args.font.as_deref().map(Path::new), Path::new(&args.fonts_dir), &style)?;
    info!("Using font: {}", fonts.path.display());
    let mut timestamps = TimestampSource::new(args.timestamp.as_deref(), args.seed)?;
    let renderer = Renderer::with_fonts(&style, &fonts);

    match &args.command {
        Command::Parse { file, output_dir, per_message, continuation } => {
            let out_dir = create_run_dir(Path::new(output_dir))?;
            info!("Output images will be saved in: {}", out_dir.display());
            let written = render_file(
                &renderer,
                Path::new(file),
                &out_dir,
                *continuation,
                *per_message,
                args.sender.as_deref(),
                &mut timestamps
            )?;
            info!("Wrote {} image(s)", written.len());
        }
        Command::Render { text, speaker, output, side } => {
            let line = ConversationLine::new(speaker.trim(), text.trim());
            let side = message_side(&line, *side, args.sender.as_deref());
            let timestamp = timestamps.next_timestamp();
            let image = renderer.render_message(&line, side, Some(&timestamp));
            image.save(output)?;
            info!("Saved {}", output);
        }
    }

    Ok(())
}

/// Side for a lone message: an explicit side wins, otherwise the speaker is
/// compared against the configured sender.
pub fn message_side(line: &ConversationLine, explicit: Option<Side>, sender: Option<&str>) -> Side {
    explicit.unwrap_or_else(|| {
        resolve_sides(std::slice::from_ref(line), sender)
            .first()
            .copied()
            .unwrap_or(Side::Sender)
    })
}

/// Creates `<parent>/<MM_DD_YYYY_HHMMSS>` for this run.
pub fn create_run_dir(parent: &Path) -> std::io::Result<PathBuf> {
    let stamp = chrono::Local::now().format("%m_%d_%Y_%H%M%S").to_string();
    let dir = parent.join(stamp);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Renders every conversation of `input` into `out_dir` and returns the written paths.
///
/// Conversations are numbered from 1 in file order; in per-message mode each
/// message gets its own image inside its conversation's numbering.
pub fn render_file<F: render::font::Typeface>(
    renderer: &Renderer<'_, F>,
    input: &Path,
    out_dir: &Path,
    policy: ContinuationPolicy,
    per_message: bool,
    sender: Option<&str>,
    timestamps: &mut TimestampSource
) -> Result<Vec<PathBuf>, Box<dyn Error + Send + Sync>> {
    let transcript = parse_file(input, policy)?;
    if !transcript.skipped.is_empty() {
        warn!("Skipped {} malformed line(s) in {}", transcript.skipped.len(), input.display());
    }
    if transcript.conversations.is_empty() {
        warn!("No conversations found in {}", input.display());
    }

    let mut written = Vec::new();
    for (i, conversation) in transcript.conversations.iter().enumerate() {
        let n = i + 1;
        let sides: Vec<Side> = resolve_sides(&conversation.lines, sender);
        let timestamp = timestamps.next_timestamp();

        if per_message {
            for (j, (line, side)) in conversation.lines.iter().zip(&sides).enumerate() {
                let path = out_dir.join(format!("conversation_{}_message_{}.png", n, j + 1));
                renderer.render_message(line, *side, Some(&timestamp)).save(&path)?;
                info!("Saved {}", path.display());
                written.push(path);
            }
        } else {
            let path = out_dir.join(format!("conversation_{}.png", n));
            renderer.render_conversation(&conversation.lines, &sides, Some(&timestamp)).save(&path)?;
            info!("Saved {}", path.display());
            written.push(path);
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use image::RgbImage;
    use render::font::Typeface;
    use render::layout::TextMeasure;

    struct Blocks;

    impl TextMeasure for Blocks {
        fn width(&self, text: &str) -> f32 {
            (text.chars().count() as f32) * 10.0
        }

        fn line_height(&self) -> f32 {
            16.0
        }
    }

    impl Typeface for Blocks {
        fn draw(&self, canvas: &mut RgbImage, x: i32, y: i32, text: &str, color: [u8; 3]) {
            let mask = vec![255u8; 8 * 14];
            for (i, _) in text.chars().enumerate() {
                render::canvas::blend_mask(canvas, x + (i as i32) * 10, y, &mask, 8, color);
            }
        }
    }

    fn small_style() -> StyleConfig {
        StyleConfig { width: 400, height: 400, bottom_padding: 40, left_margin: 20, right_margin: 20, ..StyleConfig::default() }
    }

    #[test]
    fn renders_one_image_per_conversation() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("chat.txt");
        fs::write(&input, "A: Hi there\nB: Hello!\n\nnarration\nA: Second chat\n").unwrap();

        let style = small_style();
        let renderer = Renderer::new(&style, &Blocks, &Blocks);
        let mut timestamps = TimestampSource::new(Some("08:15"), None).unwrap();
        let written = render_file(
            &renderer,
            &input,
            dir.path(),
            ContinuationPolicy::Skip,
            false,
            None,
            &mut timestamps
        ).unwrap();

        assert_eq!(written, vec![dir.path().join("conversation_1.png"), dir.path().join("conversation_2.png")]);
        let first = image::open(&written[0]).unwrap();
        assert_eq!((first.width(), first.height()), (400, 400));
    }

    #[test]
    fn per_message_mode_numbers_each_message() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("chat.txt");
        fs::write(&input, "A: one\nB: two\nB: three\n").unwrap();

        let style = small_style();
        let renderer = Renderer::new(&style, &Blocks, &Blocks);
        let mut timestamps = TimestampSource::new(None, Some(3)).unwrap();
        let written = render_file(
            &renderer,
            &input,
            dir.path(),
            ContinuationPolicy::Skip,
            true,
            Some("B"),
            &mut timestamps
        ).unwrap();

        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![
            "conversation_1_message_1.png",
            "conversation_1_message_2.png",
            "conversation_1_message_3.png"
        ]);
    }

    #[test]
    fn missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let style = small_style();
        let renderer = Renderer::new(&style, &Blocks, &Blocks);
        let mut timestamps = TimestampSource::new(Some("08:15"), None).unwrap();
        let result = render_file(
            &renderer,
            &dir.path().join("absent.txt"),
            dir.path(),
            ContinuationPolicy::Skip,
            false,
            None,
            &mut timestamps
        );
        assert!(result.is_err());
    }

    #[test]
    fn single_message_side_follows_sender_name() {
        let bob = ConversationLine::new("Bob", "hi");
        assert_eq!(message_side(&bob, None, Some("Alice")), Side::Receiver);
        assert_eq!(message_side(&bob, None, Some("Bob")), Side::Sender);
        assert_eq!(message_side(&bob, None, None), Side::Sender);
        assert_eq!(message_side(&bob, Some(Side::Receiver), Some("Bob")), Side::Receiver);
    }

    #[test]
    fn run_dir_is_created_under_parent() {
        let dir = tempfile::tempdir().unwrap();
        let run_dir = create_run_dir(dir.path()).unwrap();
        assert!(run_dir.is_dir());
        assert_eq!(run_dir.parent(), Some(dir.path()));
        assert_eq!(run_dir.file_name().unwrap().len(), "10_17_2026_153000".len());
    }

    #[test]
    fn flags_override_style() {
        let args = Args::try_parse_from(["chat-bubbles", "--no-seen", "--no-timestamp", "render", "hi", "A"]).unwrap();
        let style = build_style(&args).unwrap();
        assert!(!style.show_seen);
        assert!(!style.show_timestamp);
    }
}
