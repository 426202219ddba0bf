use serde::{ Serialize, Deserialize };
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationLine {
    pub speaker: String,
    pub text: String,
}

impl ConversationLine {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub lines: Vec<ConversationLine>,
}

impl Conversation {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

/// Which side of the screen a bubble is drawn on.
///
/// The sender is inset from the left margin, receivers hug the right margin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Sender,
    Receiver,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseSideError {
    message: String,
}

impl fmt::Display for ParseSideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseSideError {}

impl FromStr for Side {
    type Err = ParseSideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sender" | "left" => Ok(Side::Sender),
            "receiver" | "right" => Ok(Side::Receiver),
            _ =>
                Err(ParseSideError {
                    message: format!("Invalid side: '{}'", s),
                }),
        }
    }
}

/// Assigns a side to every line of a conversation.
///
/// With an explicit `sender` name only that speaker is the sender; otherwise
/// whoever speaks first in the conversation is.
pub fn resolve_sides(lines: &[ConversationLine], sender: Option<&str>) -> Vec<Side> {
    let sender = match sender {
        Some(name) => Some(name),
        None => lines.first().map(|line| line.speaker.as_str()),
    };
    lines
        .iter()
        .map(|line| {
            if Some(line.speaker.as_str()) == sender { Side::Sender } else { Side::Receiver }
        })
        .collect()
}
