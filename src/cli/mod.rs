use clap::{ Parser, Subcommand };

use crate::models::chat::Side;
use crate::parser::ContinuationPolicy;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    // --- Style Args ---
    /// Optional JSON file overriding the default bubble style.
    #[arg(long, global = true, env = "STYLE_PATH")]
    pub style: Option<String>,

    /// Font file used for bubbles and timestamps. Searched in --fonts-dir when unset.
    #[arg(long, global = true, env = "FONT_PATH")]
    pub font: Option<String>,

    /// Directory searched for SF / Helvetica font files.
    #[arg(long, global = true, env = "FONTS_DIR", default_value = "fonts")]
    pub fonts_dir: String,

    /// Speaker drawn on the sender side. Defaults to the first speaker of each conversation.
    #[arg(long, global = true, env = "SENDER_NAME")]
    pub sender: Option<String>,

    // --- Meta Text Args ---
    /// Fixed time (HH:MM) shown above each conversation instead of a random one.
    #[arg(long, global = true, env = "CHAT_TIMESTAMP")]
    pub timestamp: Option<String>,

    /// Seed for the random timestamps, for reproducible output.
    #[arg(long, global = true, env = "CHAT_SEED")]
    pub seed: Option<u64>,

    /// Do not draw the timestamp above the oldest bubble.
    #[arg(long, global = true, default_value = "false")]
    pub no_timestamp: bool,

    /// Do not draw the "Seen" indicator under the newest bubble.
    #[arg(long, global = true, default_value = "false")]
    pub no_seen: bool,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, global = true, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Render every conversation in a `Speaker: message` file.
    Parse {
        /// Input text file, one `Speaker: message` per line.
        file: String,

        /// Parent directory for the timestamped output folder.
        #[arg(long, env = "OUTPUT_DIR", default_value = "content")]
        output_dir: String,

        /// Write one image per message instead of one per conversation.
        #[arg(long, default_value = "false")]
        per_message: bool,

        /// What to do with lines that have no `Speaker:` prefix (skip, append).
        #[arg(long, env = "CONTINUATION", default_value = "skip")]
        continuation: ContinuationPolicy,
    },
    /// Render a single bubble from the command line.
    Render {
        /// Message text.
        text: String,

        /// Who says it.
        speaker: String,

        /// Output PNG path.
        #[arg(short, long, default_value = "bubble.png")]
        output: String,

        /// Side to draw the bubble on (sender, receiver). Derived from --sender when unset.
        #[arg(long)]
        side: Option<Side>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_subcommand_with_globals() {
        let args = Args::try_parse_from([
            "chat-bubbles",
            "parse",
            "chat.txt",
            "--continuation",
            "append",
            "--seed",
            "9",
            "--no-seen",
        ]).unwrap();
        assert_eq!(args.seed, Some(9));
        assert!(args.no_seen);
        match args.command {
            Command::Parse { file, continuation, per_message, .. } => {
                assert_eq!(file, "chat.txt");
                assert_eq!(continuation, ContinuationPolicy::Append);
                assert!(!per_message);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn render_subcommand_defaults() {
        let args = Args::try_parse_from(["chat-bubbles", "render", "Hello!", "B", "--side", "receiver"]).unwrap();
        match args.command {
            Command::Render { text, speaker, output, side } => {
                assert_eq!(text, "Hello!");
                assert_eq!(speaker, "B");
                assert_eq!(output, "bubble.png");
                assert_eq!(side, Some(Side::Receiver));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn render_side_is_optional() {
        let args = Args::try_parse_from(["chat-bubbles", "render", "hi", "Bob"]).unwrap();
        assert!(matches!(args.command, Command::Render { side: None, .. }));
    }

    #[test]
    fn bad_policy_is_rejected() {
        assert!(Args::try_parse_from(["chat-bubbles", "parse", "x.txt", "--continuation", "merge"]).is_err());
    }
}
