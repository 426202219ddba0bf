use crate::models::chat::{ Conversation, ConversationLine };
use log::{ debug, warn };
use serde::{ Deserialize, Serialize };
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{ Path, PathBuf };
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Conversation file '{}' not found", .0.display())]
    FileNotFound(PathBuf),
    #[error("Failed to read conversation file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What to do with a non-blank line that carries no `Speaker:` prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContinuationPolicy {
    /// Drop the line and close the current conversation.
    #[default]
    Skip,
    /// Glue the line onto the previous message of the current conversation.
    Append,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParsePolicyError {
    message: String,
}

impl fmt::Display for ParsePolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParsePolicyError {}

impl FromStr for ContinuationPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(ContinuationPolicy::Skip),
            "append" => Ok(ContinuationPolicy::Append),
            _ =>
                Err(ParsePolicyError {
                    message: format!("Invalid continuation policy: '{}'", s),
                }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    MissingColon,
    EmptySpeaker,
    EmptyText,
    NothingToContinue,
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReason::MissingColon => write!(f, "no 'Speaker:' prefix"),
            MalformedReason::EmptySpeaker => write!(f, "empty speaker"),
            MalformedReason::EmptyText => write!(f, "empty message"),
            MalformedReason::NothingToContinue => write!(f, "continuation with no previous message"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// 1-based line number in the source text.
    pub line_number: usize,
    pub content: String,
    pub reason: MalformedReason,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    pub conversations: Vec<Conversation>,
    pub skipped: Vec<MalformedLine>,
}

impl Transcript {
    /// Every parsed line across all conversations, in file order.
    pub fn lines(&self) -> impl Iterator<Item = &ConversationLine> {
        self.conversations.iter().flat_map(|c| c.lines.iter())
    }
}

enum LineKind<'a> {
    Blank,
    Message(ConversationLine),
    Malformed(MalformedReason),
    Bare(&'a str),
}

fn classify(line: &str) -> LineKind<'_> {
    let stripped = line.trim();
    if stripped.is_empty() {
        return LineKind::Blank;
    }
    match stripped.split_once(':') {
        None => LineKind::Bare(stripped),
        Some((speaker, text)) => {
            let speaker = speaker.trim();
            let text = text.trim();
            if speaker.is_empty() {
                LineKind::Malformed(MalformedReason::EmptySpeaker)
            } else if text.is_empty() {
                LineKind::Malformed(MalformedReason::EmptyText)
            } else {
                LineKind::Message(ConversationLine::new(speaker, text))
            }
        }
    }
}

struct Builder {
    policy: ContinuationPolicy,
    transcript: Transcript,
    current: Conversation,
}

impl Builder {
    fn close(&mut self) {
        if !self.current.is_empty() {
            let finished = std::mem::take(&mut self.current);
            self.transcript.conversations.push(finished);
        }
    }

    fn skip(&mut self, line_number: usize, content: &str, reason: MalformedReason) {
        warn!("Skipping line {}: {} ({:?})", line_number, reason, content);
        self.transcript.skipped.push(MalformedLine {
            line_number,
            content: content.to_string(),
            reason,
        });
        self.close();
    }
}

/// Parses `Speaker: message` text into conversations.
///
/// Blank lines separate conversations. Lines that cannot be read as a
/// message are collected in [`Transcript::skipped`] and never abort parsing.
pub fn parse_str(raw: &str, policy: ContinuationPolicy) -> Transcript {
    let mut builder = Builder {
        policy,
        transcript: Transcript::default(),
        current: Conversation::default(),
    };

    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    for (idx, line) in raw.lines().enumerate() {
        let line_number = idx + 1;
        match classify(line) {
            LineKind::Blank => builder.close(),
            LineKind::Message(parsed) => builder.current.lines.push(parsed),
            LineKind::Malformed(reason) => builder.skip(line_number, line.trim(), reason),
            LineKind::Bare(text) =>
                match builder.policy {
                    ContinuationPolicy::Skip => {
                        builder.skip(line_number, text, MalformedReason::MissingColon);
                    }
                    ContinuationPolicy::Append => {
                        match builder.current.lines.last_mut() {
                            Some(previous) => {
                                debug!("Line {} continues message from {}", line_number, previous.speaker);
                                previous.text.push(' ');
                                previous.text.push_str(text);
                            }
                            None => builder.skip(line_number, text, MalformedReason::NothingToContinue),
                        }
                    }
                }
        }
    }
    builder.close();

    builder.transcript
}

pub fn parse_file<P: AsRef<Path>>(
    path: P,
    policy: ContinuationPolicy
) -> Result<Transcript, ParseError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            ParseError::FileNotFound(path.to_path_buf())
        } else {
            ParseError::Io { path: path.to_path_buf(), source: e }
        }
    })?;
    let transcript = parse_str(&raw, policy);
    debug!(
        "Parsed {} conversation(s) from {}, skipped {} line(s)",
        transcript.conversations.len(),
        path.display(),
        transcript.skipped.len()
    );
    Ok(transcript)
}
