use crate::config::style::StyleConfig;
use crate::models::chat::{ ConversationLine, Side };

/// Pixel measurements for a single font at a single size.
pub trait TextMeasure {
    fn width(&self, text: &str) -> f32;
    /// Height of one line box, ascent to descent.
    fn line_height(&self) -> f32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedText {
    pub text: String,
    /// Top-left corner of the line box.
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BubbleLayout {
    pub side: Side,
    pub rect: Rect,
    pub lines: Vec<PlacedText>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationLayout {
    /// Oldest message first.
    pub bubbles: Vec<BubbleLayout>,
    pub seen: Option<PlacedText>,
    pub timestamp: Option<PlacedText>,
}

/// Greedy word wrap against a pixel budget.
///
/// Words wider than the budget on their own are broken between characters,
/// so every returned line measures at most `max_width` unless a single
/// character is already wider than that.
pub fn wrap_text<M: TextMeasure + ?Sized>(text: &str, measure: &M, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if measure.width(&candidate) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if measure.width(word) <= max_width {
            current = word.to_string();
        } else {
            let mut pieces = split_word(word, measure, max_width);
            current = pieces.pop().unwrap_or_default();
            lines.extend(pieces);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn split_word<M: TextMeasure + ?Sized>(word: &str, measure: &M, max_width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    for ch in word.chars() {
        piece.push(ch);
        if measure.width(&piece) > max_width && piece.chars().count() > 1 {
            piece.pop();
            pieces.push(std::mem::take(&mut piece));
            piece.push(ch);
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// Positions every bubble of a conversation, newest at the bottom.
///
/// `lines` and `sides` are parallel slices in conversation order.
pub fn layout_conversation<B, T>(
    lines: &[ConversationLine],
    sides: &[Side],
    style: &StyleConfig,
    body: &B,
    meta: &T,
    timestamp: Option<&str>
) -> ConversationLayout
    where B: TextMeasure + ?Sized, T: TextMeasure + ?Sized
{
    debug_assert_eq!(lines.len(), sides.len());

    let max_text_width = style.max_text_width();
    let width = style.width as i32;
    let pad = style.bubble_padding as i32;
    let spacing = style.line_spacing as i32;
    let line_height = body.line_height().ceil() as i32;

    let mut current_y = (style.height as i32) - (style.bottom_padding as i32);
    let mut bubbles = Vec::with_capacity(lines.len());

    for idx in (0..lines.len()).rev() {
        let side = sides[idx];
        let wrapped = wrap_text(&lines[idx].text, body, max_text_width);

        let block_width = wrapped
            .iter()
            .map(|l| body.width(l))
            .fold(0.0_f32, f32::max)
            .ceil() as i32;
        let block_height = match wrapped.len() {
            0 => 0,
            n => line_height * (n as i32) + spacing * ((n as i32) - 1),
        };

        let bubble_width = block_width + 2 * pad;
        let bottom = current_y;
        let top = bottom - (block_height + 2 * pad);
        let (left, right) = match side {
            Side::Sender => {
                let left = style.left_margin as i32;
                (left, left + bubble_width)
            }
            Side::Receiver => {
                let right = width - (style.right_margin as i32);
                (right - bubble_width, right)
            }
        };

        let mut text_y = top + pad;
        let placed = wrapped
            .into_iter()
            .map(|text| {
                let line = PlacedText { text, x: left + pad, y: text_y };
                text_y += line_height + spacing;
                line
            })
            .collect();

        let gap = if idx > 0 && sides[idx - 1] == side {
            style.same_speaker_gap
        } else {
            style.bubble_gap
        };
        current_y = top - (gap as i32);

        bubbles.push(BubbleLayout {
            side,
            rect: Rect { left, top, right, bottom },
            lines: placed,
        });
    }
    bubbles.reverse();

    let seen = match bubbles.last() {
        Some(newest) if style.show_seen && newest.side == Side::Receiver => {
            let seen_width = meta.width(&style.seen_text).ceil() as i32;
            Some(PlacedText {
                text: style.seen_text.clone(),
                x: newest.rect.right - seen_width,
                y: newest.rect.bottom + (style.seen_gap as i32),
            })
        }
        _ => None,
    };

    let timestamp = match (bubbles.first(), timestamp) {
        (Some(oldest), Some(time)) if style.show_timestamp => {
            let time_width = meta.width(time).ceil() as i32;
            let time_height = meta.line_height().ceil() as i32;
            Some(PlacedText {
                text: time.to_string(),
                x: width / 2 - time_width / 2,
                y: oldest.rect.top - time_height - (style.timestamp_gap as i32),
            })
        }
        _ => None,
    };

    ConversationLayout { bubbles, seen, timestamp }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is `advance` pixels wide.
    struct Monospace {
        advance: f32,
        height: f32,
    }

    impl TextMeasure for Monospace {
        fn width(&self, text: &str) -> f32 {
            (text.chars().count() as f32) * self.advance
        }

        fn line_height(&self) -> f32 {
            self.height
        }
    }

    const MONO: Monospace = Monospace { advance: 10.0, height: 20.0 };

    #[test]
    fn short_text_stays_on_one_line() {
        assert_eq!(wrap_text("Hello there", &MONO, 200.0), vec!["Hello there"]);
    }

    #[test]
    fn long_text_wraps_within_budget() {
        let text = "the quick brown fox jumps over the lazy dog and keeps on running";
        let lines = wrap_text(text, &MONO, 120.0);
        assert!(lines.len() >= 2);
        for line in &lines {
            assert!(MONO.width(line) <= 120.0, "{:?} is too wide", line);
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn overlong_word_is_split_between_characters() {
        let lines = wrap_text("hi abcdefghijklmnop ok", &MONO, 50.0);
        assert_eq!(lines, vec!["hi", "abcde", "fghij", "klmno", "p ok"]);
        assert!(lines.iter().all(|l| MONO.width(l) <= 50.0));
    }

    #[test]
    fn whitespace_only_text_has_no_lines() {
        assert!(wrap_text("   \t ", &MONO, 100.0).is_empty());
    }

    fn small_style() -> StyleConfig {
        StyleConfig {
            width: 400,
            height: 600,
            max_bubble_fraction: 0.5,
            bubble_padding: 10,
            line_spacing: 4,
            left_margin: 20,
            right_margin: 30,
            bottom_padding: 50,
            bubble_gap: 22,
            same_speaker_gap: 2,
            timestamp_gap: 15,
            seen_gap: 5,
            ..StyleConfig::default()
        }
    }

    #[test]
    fn bubbles_are_placed_by_side_and_stacked_upwards() {
        let style = small_style();
        let lines = vec![
            ConversationLine::new("A", "Hi"),
            ConversationLine::new("B", "Hello"),
            ConversationLine::new("B", "Again")
        ];
        let sides = vec![Side::Sender, Side::Receiver, Side::Receiver];
        let layout = layout_conversation(&lines, &sides, &style, &MONO, &MONO, Some("09:41"));

        assert_eq!(layout.bubbles.len(), 3);
        let [a, b1, b2] = [&layout.bubbles[0], &layout.bubbles[1], &layout.bubbles[2]];

        assert_eq!(b2.rect, Rect { left: 370 - 70, top: 510, right: 370, bottom: 550 });
        assert_eq!(b2.lines[0], PlacedText { text: "Again".to_string(), x: 310, y: 520 });
        // same speaker: tight gap
        assert_eq!(b1.rect.bottom, b2.rect.top - 2);
        // speaker change: wide gap
        assert_eq!(a.rect.bottom, b1.rect.top - 22);
        assert_eq!(a.rect.left, 20);
        assert_eq!(a.rect.width(), 20 + 20);

        let seen = layout.seen.expect("receiver was last");
        assert_eq!(seen.y, 555);
        assert_eq!(seen.x, 370 - 130);

        let ts = layout.timestamp.expect("timestamp requested");
        assert_eq!(ts.x, 200 - 25);
        assert_eq!(ts.y, a.rect.top - 20 - 15);
    }

    #[test]
    fn no_seen_when_sender_is_last() {
        let style = small_style();
        let lines = vec![ConversationLine::new("B", "Hello"), ConversationLine::new("A", "Hi")];
        let sides = vec![Side::Receiver, Side::Sender];
        let layout = layout_conversation(&lines, &sides, &style, &MONO, &MONO, None);
        assert!(layout.seen.is_none());
        assert!(layout.timestamp.is_none());
    }

    #[test]
    fn flags_suppress_meta_text() {
        let style = StyleConfig {
            show_seen: false,
            show_timestamp: false,
            ..small_style()
        };
        let lines = vec![ConversationLine::new("B", "Hello")];
        let layout = layout_conversation(&lines, &[Side::Receiver], &style, &MONO, &MONO, Some("12:00"));
        assert!(layout.seen.is_none());
        assert!(layout.timestamp.is_none());
    }

    #[test]
    fn multi_line_bubble_height_includes_spacing() {
        let style = small_style();
        // budget: floor(400 * 0.5) - 20 = 180px, 18 chars
        let lines = vec![ConversationLine::new("A", "aaaa bbbb cccc dddd eeee ffff")];
        let layout = layout_conversation(&lines, &[Side::Sender], &style, &MONO, &MONO, None);
        let bubble = &layout.bubbles[0];
        assert_eq!(bubble.lines.len(), 2);
        assert_eq!(bubble.rect.height(), 20 * 2 + 4 + 2 * 10);
        assert_eq!(bubble.lines[1].y - bubble.lines[0].y, 24);
        assert!(bubble.rect.width() - 20 <= 180);
    }
}
