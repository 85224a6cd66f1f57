//! Envelope codecs for the fixed-grammar and tag-bag message blocks.
//!
//! Blocks 1 and 2 are pure positional grammars: parsing reads fixed-width
//! substrings in a declared order, generation concatenates them back.
//! Blocks 3 and 5 are tag bags: `{tag:value}` groups in encounter order
//! with no fixed cardinality, unknown tags preserved opaquely.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Basic Header (block 1).
///
/// Grammar: `App(1) Svc(2) LTAddr(12) [Session(4) Sequence(6)]`.
///
/// # Examples
///
/// ```
/// use swift_mt::envelope::BasicHeader;
///
/// let header = BasicHeader::parse("F01COBADEFFAXXX1234567890").unwrap();
/// assert_eq!(header.bic(), "COBADEFF");
/// assert_eq!(header.to_string(), "{1:F01COBADEFFAXXX1234567890}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicHeader {
    /// Application identifier, e.g. `F` for FIN.
    pub application_id: char,
    /// Service identifier, two digits, e.g. `01`.
    pub service_id: String,
    /// 12-character logical terminal address.
    pub logical_terminal: String,
    /// Session number (4 digits); present together with the sequence number.
    pub session_number: Option<String>,
    /// Sequence number (6 digits); present together with the session number.
    pub sequence_number: Option<String>,
}

impl BasicHeader {
    /// Parse the block 1 content (the text between `{1:` and `}`).
    pub fn parse(content: &str) -> Result<Self> {
        // The grammar is positional over single-byte characters.
        if !content.is_ascii() {
            return Err(Error::Envelope(format!(
                "basic header must be ASCII: {content:?}"
            )));
        }
        if content.len() != 15 && content.len() != 25 {
            return Err(Error::Envelope(format!(
                "basic header must be 15 or 25 characters: {content:?}"
            )));
        }

        let application_id = content
            .chars()
            .next()
            .ok_or_else(|| Error::Envelope("empty basic header".into()))?;
        let service_id = content[1..3].to_string();
        let logical_terminal = content[3..15].to_string();

        // Session and sequence number appear together or not at all.
        let (session_number, sequence_number) = if content.len() == 25 {
            (
                Some(content[15..19].to_string()),
                Some(content[19..25].to_string()),
            )
        } else {
            (None, None)
        };

        Ok(Self {
            application_id,
            service_id,
            logical_terminal,
            session_number,
            sequence_number,
        })
    }

    /// Sender BIC, the first 8 characters of the logical terminal address.
    pub fn bic(&self) -> &str {
        &self.logical_terminal[..8]
    }

    /// Terminal code, the 9th character of the logical terminal address.
    pub fn terminal_code(&self) -> &str {
        &self.logical_terminal[8..9]
    }

    /// Branch code, the last 3 characters of the logical terminal address.
    pub fn branch_code(&self) -> &str {
        &self.logical_terminal[9..12]
    }
}

impl fmt::Display for BasicHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{1:{}{}{}",
            self.application_id, self.service_id, self.logical_terminal
        )?;
        if let (Some(session), Some(sequence)) = (&self.session_number, &self.sequence_number) {
            write!(f, "{session}{sequence}")?;
        }
        write!(f, "}}")
    }
}

/// Message direction, the first character of block 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Message sent to the network (`I`).
    Input,
    /// Message received from the network (`O`).
    Output,
}

/// Application Header (block 2), input variant.
///
/// Grammar: `I Type(3) ReceiverLT(12) [Priority(1) [Monitor(1) Obsolescence(3)]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputHeader {
    /// Three-digit message type code, e.g. `103`.
    pub message_type: String,
    /// 12-character receiver logical terminal address.
    pub receiver: String,
    /// Message priority; rendered as `N` when unset.
    pub priority: Option<char>,
    /// Delivery monitoring option; appears together with obsolescence.
    pub delivery_monitor: Option<char>,
    /// Obsolescence period (3 digits); appears together with the monitor.
    pub obsolescence_period: Option<String>,
}

/// Application Header (block 2), output variant.
///
/// Grammar: `O Type(3) InputTime(4) InputDate(6) MIR(≤28) OutputDate(6)
/// OutputTime(6) Priority(1)`. The MIR is variable-width, so parsing
/// anchors the trailing fields at the end of the content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputHeader {
    /// Three-digit message type code.
    pub message_type: String,
    /// Input time (`HHMM`).
    pub input_time: String,
    /// Input date (`YYMMDD`).
    pub input_date: String,
    /// Message input reference, up to 28 characters.
    pub input_reference: String,
    /// Output date (`YYMMDD`).
    pub output_date: String,
    /// Output time (6 characters).
    pub output_time: String,
    /// Message priority.
    pub priority: char,
}

/// Application Header (block 2).
///
/// Exactly one layout is populated per instance; the direction is decided
/// by the first character of the block and is immutable once set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationHeader {
    /// `{2:I...}` — message addressed to the network.
    Input(InputHeader),
    /// `{2:O...}` — message delivered by the network.
    Output(OutputHeader),
}

impl ApplicationHeader {
    /// Parse the block 2 content (the text between `{2:` and `}`).
    pub fn parse(content: &str) -> Result<Self> {
        // The grammar is positional over single-byte characters.
        if !content.is_ascii() {
            return Err(Error::Envelope(format!(
                "application header must be ASCII: {content:?}"
            )));
        }
        match content.chars().next() {
            Some('I') => Self::parse_input(&content[1..]),
            Some('O') => Self::parse_output(&content[1..]),
            _ => Err(Error::Envelope(format!(
                "application header must start with I or O: {content:?}"
            ))),
        }
    }

    fn parse_input(rest: &str) -> Result<Self> {
        if rest.len() < 15 {
            return Err(Error::Envelope(format!(
                "input application header too short: {rest:?}"
            )));
        }
        let message_type = rest[0..3].to_string();
        let receiver = rest[3..15].to_string();
        let tail = &rest[15..];

        let (priority, delivery_monitor, obsolescence_period) = match tail.len() {
            0 => (None, None, None),
            1 => (tail.chars().next(), None, None),
            // Monitor and obsolescence only appear together.
            5 => (
                tail.chars().next(),
                tail.chars().nth(1),
                Some(tail[2..5].to_string()),
            ),
            _ => {
                return Err(Error::Envelope(format!(
                    "invalid input application header tail: {tail:?}"
                )))
            }
        };

        Ok(Self::Input(InputHeader {
            message_type,
            receiver,
            priority,
            delivery_monitor,
            obsolescence_period,
        }))
    }

    fn parse_output(rest: &str) -> Result<Self> {
        // Fixed head: Type(3) InputTime(4) InputDate(6); fixed tail:
        // OutputDate(6) OutputTime(6) Priority(1); the MIR fills the middle.
        if rest.len() < 3 + 4 + 6 + 6 + 6 + 1 {
            return Err(Error::Envelope(format!(
                "output application header too short: {rest:?}"
            )));
        }
        let message_type = rest[0..3].to_string();
        let input_time = rest[3..7].to_string();
        let input_date = rest[7..13].to_string();

        let tail_start = rest.len() - 13;
        let input_reference = rest[13..tail_start].to_string();
        if input_reference.len() > 28 {
            return Err(Error::Envelope(format!(
                "message input reference longer than 28 characters: {input_reference:?}"
            )));
        }
        let output_date = rest[tail_start..tail_start + 6].to_string();
        let output_time = rest[tail_start + 6..tail_start + 12].to_string();
        let priority = rest[tail_start + 12..]
            .chars()
            .next()
            .ok_or_else(|| Error::Envelope("missing output priority".into()))?;

        Ok(Self::Output(OutputHeader {
            message_type,
            input_time,
            input_date,
            input_reference,
            output_date,
            output_time,
            priority,
        }))
    }

    /// Message direction.
    pub fn direction(&self) -> Direction {
        match self {
            Self::Input(_) => Direction::Input,
            Self::Output(_) => Direction::Output,
        }
    }

    /// Three-digit message type code.
    pub fn message_type(&self) -> &str {
        match self {
            Self::Input(h) => &h.message_type,
            Self::Output(h) => &h.message_type,
        }
    }
}

impl fmt::Display for ApplicationHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(h) => {
                write!(
                    f,
                    "{{2:I{}{}{}",
                    h.message_type,
                    h.receiver,
                    h.priority.unwrap_or('N')
                )?;
                if let (Some(monitor), Some(period)) =
                    (h.delivery_monitor, &h.obsolescence_period)
                {
                    write!(f, "{monitor}{period}")?;
                }
                write!(f, "}}")
            }
            Self::Output(h) => write!(
                f,
                "{{2:O{}{}{}{}{}{}{}}}",
                h.message_type,
                h.input_time,
                h.input_date,
                h.input_reference,
                h.output_date,
                h.output_time,
                h.priority
            ),
        }
    }
}

/// Ordered `{tag:value}` bag shared by the user header and trailer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagBlock {
    entries: Vec<(String, String)>,
}

impl TagBlock {
    /// Parse a sequence of `{tag:value}` groups in encounter order.
    pub fn parse(content: &str) -> Result<Self> {
        let mut entries = Vec::new();
        let mut rest = content;

        while !rest.is_empty() {
            let inner = rest
                .strip_prefix('{')
                .ok_or_else(|| Error::Envelope(format!("expected '{{' in tag block: {rest:?}")))?;
            let close = inner
                .find('}')
                .ok_or_else(|| Error::Envelope(format!("unterminated tag group: {rest:?}")))?;
            let group = &inner[..close];
            let colon = group.find(':').ok_or_else(|| {
                Error::Envelope(format!("tag group without ':' separator: {group:?}"))
            })?;
            entries.push((group[..colon].to_string(), group[colon + 1..].to_string()));
            rest = &inner[close + 1..];
        }

        Ok(Self { entries })
    }

    /// Value of the first group with the given tag.
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, v)| v.as_str())
    }

    /// Whether a group with the given tag is present.
    pub fn contains(&self, tag: &str) -> bool {
        self.entries.iter().any(|(t, _)| t == tag)
    }

    /// Set a tag, replacing an existing group or appending a new one.
    pub fn set(&mut self, tag: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(t, _)| t == tag) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((tag.to_string(), value)),
        }
    }

    /// Iterate over groups in encounter order.
    pub fn iter(&self) -> std::slice::Iter<'_, (String, String)> {
        self.entries.iter()
    }

    /// Whether the block holds no groups.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for TagBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (tag, value) in &self.entries {
            write!(f, "{{{tag}:{value}}}")?;
        }
        Ok(())
    }
}

/// User Header (block 3): optional service tags keyed by 3-digit codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserHeader {
    /// Underlying tag bag; unknown tags are preserved as encountered.
    pub tags: TagBlock,
}

impl UserHeader {
    /// Parse the block 3 content (the text between `{3:` and the final `}`).
    pub fn parse(content: &str) -> Result<Self> {
        Ok(Self {
            tags: TagBlock::parse(content)?,
        })
    }

    /// Tag 108: message user reference.
    pub fn message_user_reference(&self) -> Option<&str> {
        self.tags.get("108")
    }

    /// Tag 119: validation flag, e.g. `STP`.
    pub fn validation_flag(&self) -> Option<&str> {
        self.tags.get("119")
    }

    /// Tag 121: unique end-to-end transaction reference.
    pub fn end_to_end_reference(&self) -> Option<&str> {
        self.tags.get("121")
    }
}

impl fmt::Display for UserHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{3:{}}}", self.tags)
    }
}

/// Trailer (block 5): checksum and service markers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trailer {
    /// Underlying tag bag; unknown tags are preserved as encountered.
    pub tags: TagBlock,
}

impl Trailer {
    /// Parse the block 5 content (the text between `{5:` and the final `}`).
    pub fn parse(content: &str) -> Result<Self> {
        Ok(Self {
            tags: TagBlock::parse(content)?,
        })
    }

    /// `CHK`: message checksum, passed through without recomputation.
    pub fn checksum(&self) -> Option<&str> {
        self.tags.get("CHK")
    }

    /// `TNG`: test-and-training marker.
    pub fn is_training(&self) -> bool {
        self.tags.contains("TNG")
    }

    /// `PDE`: possible duplicate emission marker.
    pub fn possible_duplicate_emission(&self) -> bool {
        self.tags.contains("PDE")
    }

    /// `PDM`: possible duplicate message marker.
    pub fn possible_duplicate_message(&self) -> bool {
        self.tags.contains("PDM")
    }
}

impl fmt::Display for Trailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{5:{}}}", self.tags)
    }
}
