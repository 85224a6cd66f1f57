//! Field-block tag parser.
//!
//! Block 4 of an MT message is a linear sequence of `:tag:value` fields.
//! Tags are two digits plus an optional letter option (`20`, `32A`, `28C`);
//! a value runs until the next tag opens and may span multiple lines.
//! Field order is preserved and is semantically significant: a `:61:`
//! statement line is always immediately followed by its `:86:` narrative.

use crate::error::{Error, Result};
use std::fmt;

/// A single `:tag:value` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// 2-3 character tag, e.g. `20` or `32A`.
    pub tag: String,
    /// Raw field value; may contain embedded newlines.
    pub value: String,
}

/// Ordered sequence of fields extracted from a message text block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSequence {
    fields: Vec<Field>,
}

/// Check whether `tag` is a well-formed field tag: two digits plus an
/// optional uppercase letter option.
fn valid_tag(tag: &str) -> bool {
    let bytes = tag.as_bytes();
    match bytes.len() {
        2 => bytes[0].is_ascii_digit() && bytes[1].is_ascii_digit(),
        3 => {
            bytes[0].is_ascii_digit()
                && bytes[1].is_ascii_digit()
                && bytes[2].is_ascii_uppercase()
        }
        _ => false,
    }
}

/// Split a `:tag:rest` line into tag and first value line.
fn split_tag_line(line: &str) -> Result<(&str, &str)> {
    debug_assert!(line.starts_with(':'));
    let rest = &line[1..];
    // A tag is never more than 4 characters, so the closing colon must
    // appear early; anything else is an unterminated tag.
    let close = rest
        .find(':')
        .filter(|&i| i <= 4)
        .ok_or_else(|| Error::Tag(format!("unterminated tag in line: {line}")))?;
    let tag = &rest[..close];
    if !valid_tag(tag) {
        return Err(Error::Tag(format!("invalid tag {tag:?} in line: {line}")));
    }
    Ok((tag, &rest[close + 1..]))
}

impl FieldSequence {
    /// Create an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the raw text of block 4 into an ordered field sequence.
    ///
    /// # Examples
    ///
    /// ```
    /// use swift_mt::tags::FieldSequence;
    ///
    /// let seq = FieldSequence::parse(":20:REF001\n:32A:250512EUR1000,00").unwrap();
    /// assert_eq!(seq.first("20"), Some("REF001"));
    /// ```
    pub fn parse(text: &str) -> Result<Self> {
        let mut fields: Vec<Field> = Vec::new();
        let mut current: Option<Field> = None;

        for raw_line in text.lines() {
            let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);

            if line.starts_with(':') {
                let (tag, first) = split_tag_line(line)?;
                if let Some(field) = current.take() {
                    fields.push(field);
                }
                current = Some(Field {
                    tag: tag.to_string(),
                    value: first.to_string(),
                });
            } else if let Some(field) = current.as_mut() {
                // Continuation line of a multi-line value.
                field.value.push('\n');
                field.value.push_str(line);
            } else if !line.trim().is_empty() {
                return Err(Error::Tag(format!("text before first tag: {line}")));
            }
        }

        if let Some(field) = current.take() {
            fields.push(field);
        }

        Ok(Self { fields })
    }

    /// Append a field, validating the tag shape.
    pub fn push(&mut self, tag: &str, value: impl Into<String>) -> Result<()> {
        if !valid_tag(tag) {
            return Err(Error::Tag(format!("invalid tag {tag:?}")));
        }
        self.fields.push(Field {
            tag: tag.to_string(),
            value: value.into(),
        });
        Ok(())
    }

    /// Value of the first field with the given tag, if present.
    pub fn first(&self, tag: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.tag == tag)
            .map(|f| f.value.as_str())
    }

    /// Value of the first field with the given tag, or a missing-field error.
    pub fn require(&self, tag: &str) -> Result<&str> {
        self.first(tag)
            .ok_or_else(|| Error::MissingField(tag.to_string()))
    }

    /// Whether any field carries the given tag.
    pub fn contains(&self, tag: &str) -> bool {
        self.fields.iter().any(|f| f.tag == tag)
    }

    /// Iterate over fields in original order.
    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the sequence holds no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for FieldSequence {
    /// Recompose the block 4 text, preserving original field order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, ":{}:{}", field.tag, field.value)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a FieldSequence {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_fields() {
        let seq = FieldSequence::parse(":20:REF001\n:23B:CRED").unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.first("20"), Some("REF001"));
        assert_eq!(seq.first("23B"), Some("CRED"));
    }

    #[test]
    fn test_parse_multiline_value() {
        let seq = FieldSequence::parse(":50K:/DE89370400440532013000\nMax Mustermann\n:71A:SHA")
            .unwrap();
        assert_eq!(
            seq.first("50K"),
            Some("/DE89370400440532013000\nMax Mustermann")
        );
        assert_eq!(seq.first("71A"), Some("SHA"));
    }

    #[test]
    fn test_order_preserved() {
        let seq = FieldSequence::parse(":61:LINE1\n:86:INFO1\n:61:LINE2\n:86:INFO2").unwrap();
        let tags: Vec<&str> = seq.iter().map(|f| f.tag.as_str()).collect();
        assert_eq!(tags, vec!["61", "86", "61", "86"]);
    }

    #[test]
    fn test_roundtrip_exact() {
        let text = ":20:REF001\n:50K:/ACC\nName Line\n:71A:SHA";
        let seq = FieldSequence::parse(text).unwrap();
        assert_eq!(seq.to_string(), text);
    }

    #[test]
    fn test_unterminated_tag_is_error() {
        assert!(FieldSequence::parse(":20 no closing colon").is_err());
    }

    #[test]
    fn test_invalid_tag_is_error() {
        assert!(FieldSequence::parse(":2:X").is_err());
        assert!(FieldSequence::parse(":ABCD:X").is_err());
        assert!(FieldSequence::parse(":20a:X").is_err());
    }

    #[test]
    fn test_text_before_first_tag_is_error() {
        assert!(FieldSequence::parse("garbage\n:20:REF").is_err());
    }

    #[test]
    fn test_require_missing_field() {
        let seq = FieldSequence::parse(":20:REF001").unwrap();
        match seq.require("32A") {
            Err(Error::MissingField(tag)) => assert_eq!(tag, "32A"),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn test_push_validates_tag() {
        let mut seq = FieldSequence::new();
        seq.push("20", "REF").unwrap();
        assert!(seq.push("XX", "bad").is_err());
    }
}
