//! Structured narrative subfield codecs.
//!
//! Remittance/purpose fields (`:86:`, `:70:`) can carry a structured
//! subfield grammar in one of two mutually exclusive dialects: the
//! international SWIFT keyword grammar (`/EREF/value`) and the German-bank
//! DATEV numeric grammar (`?20value`). Both codecs share one contract:
//! encode `(key, optional sub-keyword, value)` triples into a field value
//! string and decode such a string back into triples. Values longer than a
//! key's declared maximum are truncated, never rejected. The dialect used
//! for generation is an explicit configuration, not auto-detected.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// SWIFT narrative keyword. Closed set: adding a keyword is a
/// forced-review change site for every exhaustive match below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Keyword {
    /// End-to-end reference.
    Eref,
    /// Customer reference.
    Kref,
    /// Mandate reference.
    Mref,
    /// Creditor identifier.
    Cred,
    /// Debtor identifier.
    Debt,
    /// Remittance information (Verwendungszweck).
    Svwz,
    /// Deviating ordering party.
    Abwa,
    /// Deviating beneficiary.
    Abwe,
    /// Beneficiary party.
    Benm,
    /// Ordering party.
    Ordp,
    /// Ultimate debtor.
    Ultd,
    /// Ultimate creditor.
    Ultc,
    /// Payment purpose.
    Purp,
    /// Return reason.
    Rtrn,
}

impl Keyword {
    /// Keyword text as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Eref => "EREF",
            Keyword::Kref => "KREF",
            Keyword::Mref => "MREF",
            Keyword::Cred => "CRED",
            Keyword::Debt => "DEBT",
            Keyword::Svwz => "SVWZ",
            Keyword::Abwa => "ABWA",
            Keyword::Abwe => "ABWE",
            Keyword::Benm => "BENM",
            Keyword::Ordp => "ORDP",
            Keyword::Ultd => "ULTD",
            Keyword::Ultc => "ULTC",
            Keyword::Purp => "PURP",
            Keyword::Rtrn => "RTRN",
        }
    }

    /// Maximum value length; longer values are truncated on encode.
    pub fn max_len(&self) -> usize {
        match self {
            Keyword::Eref | Keyword::Mref | Keyword::Cred | Keyword::Debt => 35,
            Keyword::Kref => 16,
            Keyword::Svwz => 140,
            Keyword::Abwa | Keyword::Abwe => 70,
            Keyword::Benm | Keyword::Ordp | Keyword::Ultd | Keyword::Ultc => 70,
            Keyword::Purp | Keyword::Rtrn => 35,
        }
    }

    /// Legal sub-keywords for this keyword; empty for plain keywords.
    pub fn sub_keywords(&self) -> &'static [SubKeyword] {
        match self {
            Keyword::Benm | Keyword::Ordp | Keyword::Ultd | Keyword::Ultc => &[
                SubKeyword::Name,
                SubKeyword::Addr,
                SubKeyword::City,
                SubKeyword::Ctry,
            ],
            Keyword::Purp => &[SubKeyword::Cd, SubKeyword::Prtry],
            Keyword::Eref
            | Keyword::Kref
            | Keyword::Mref
            | Keyword::Cred
            | Keyword::Debt
            | Keyword::Svwz
            | Keyword::Abwa
            | Keyword::Abwe
            | Keyword::Rtrn => &[],
        }
    }
}

impl FromStr for Keyword {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "EREF" => Ok(Keyword::Eref),
            "KREF" => Ok(Keyword::Kref),
            "MREF" => Ok(Keyword::Mref),
            "CRED" => Ok(Keyword::Cred),
            "DEBT" => Ok(Keyword::Debt),
            "SVWZ" => Ok(Keyword::Svwz),
            "ABWA" => Ok(Keyword::Abwa),
            "ABWE" => Ok(Keyword::Abwe),
            "BENM" => Ok(Keyword::Benm),
            "ORDP" => Ok(Keyword::Ordp),
            "ULTD" => Ok(Keyword::Ultd),
            "ULTC" => Ok(Keyword::Ultc),
            "PURP" => Ok(Keyword::Purp),
            "RTRN" => Ok(Keyword::Rtrn),
            _ => Err(Error::Narrative(format!("unknown keyword: {s}"))),
        }
    }
}

/// Sub-keyword qualifying a keyword's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubKeyword {
    /// Party name.
    Name,
    /// Street address.
    Addr,
    /// City.
    City,
    /// Country.
    Ctry,
    /// Externalized purpose code.
    Cd,
    /// Proprietary purpose code.
    Prtry,
}

impl SubKeyword {
    /// Sub-keyword text as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubKeyword::Name => "NAME",
            SubKeyword::Addr => "ADDR",
            SubKeyword::City => "CITY",
            SubKeyword::Ctry => "CTRY",
            SubKeyword::Cd => "CD",
            SubKeyword::Prtry => "PRTRY",
        }
    }
}

impl FromStr for SubKeyword {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "NAME" => Ok(SubKeyword::Name),
            "ADDR" => Ok(SubKeyword::Addr),
            "CITY" => Ok(SubKeyword::City),
            "CTRY" => Ok(SubKeyword::Ctry),
            "CD" => Ok(SubKeyword::Cd),
            "PRTRY" => Ok(SubKeyword::Prtry),
            _ => Err(Error::Narrative(format!("unknown sub-keyword: {s}"))),
        }
    }
}

/// Maximum value length for a DATEV numeric subfield code.
fn datev_max_len(code: u8) -> usize {
    match code {
        // ?30 carries the counterparty bank identifier.
        30 => 12,
        // ?31 carries the counterparty account number.
        31 => 24,
        _ => 27,
    }
}

/// DATEV code 00: free-text subject line.
pub const DATEV_SUBJECT: u8 = 0;

/// Narrative dialect selected for generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NarrativeMode {
    /// International `/KEYWORD/value` grammar.
    Swift,
    /// German-bank `?NNvalue` grammar.
    Datev,
}

/// Key of a single narrative entry, matching the dialect in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NarrativeKey {
    /// SWIFT keyword.
    Keyword(Keyword),
    /// DATEV two-digit numeric code.
    Code(u8),
}

/// One `(key, optional sub-keyword, value)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeEntry {
    /// Entry key.
    pub key: NarrativeKey,
    /// Optional qualifying sub-keyword (SWIFT dialect only).
    pub sub: Option<SubKeyword>,
    /// Length-truncated value.
    pub value: String,
}

/// Ordered list of structured narrative entries in a single dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredNarrative {
    mode: NarrativeMode,
    entries: Vec<NarrativeEntry>,
}

fn truncate(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

impl StructuredNarrative {
    /// Create an empty narrative in SWIFT keyword mode.
    pub fn swift() -> Self {
        Self {
            mode: NarrativeMode::Swift,
            entries: Vec::new(),
        }
    }

    /// Create an empty narrative in DATEV numeric mode.
    pub fn datev() -> Self {
        Self {
            mode: NarrativeMode::Datev,
            entries: Vec::new(),
        }
    }

    /// The dialect this narrative encodes to.
    pub fn mode(&self) -> NarrativeMode {
        self.mode
    }

    /// Entries in encounter order.
    pub fn entries(&self) -> &[NarrativeEntry] {
        &self.entries
    }

    /// Append a keyword entry; the value is truncated to the keyword's
    /// declared maximum length. Errors if the narrative is in DATEV mode.
    pub fn push_keyword(&mut self, keyword: Keyword, value: &str) -> Result<()> {
        if self.mode != NarrativeMode::Swift {
            return Err(Error::Narrative(
                "keyword entries require SWIFT mode".into(),
            ));
        }
        self.entries.push(NarrativeEntry {
            key: NarrativeKey::Keyword(keyword),
            sub: None,
            value: truncate(value, keyword.max_len()),
        });
        Ok(())
    }

    /// Append a qualified keyword entry. The sub-keyword must belong to the
    /// keyword's declared legal set.
    pub fn push_keyword_sub(
        &mut self,
        keyword: Keyword,
        sub: SubKeyword,
        value: &str,
    ) -> Result<()> {
        if self.mode != NarrativeMode::Swift {
            return Err(Error::Narrative(
                "keyword entries require SWIFT mode".into(),
            ));
        }
        if !keyword.sub_keywords().contains(&sub) {
            return Err(Error::Narrative(format!(
                "sub-keyword {} not legal for {}",
                sub.as_str(),
                keyword.as_str()
            )));
        }
        self.entries.push(NarrativeEntry {
            key: NarrativeKey::Keyword(keyword),
            sub: Some(sub),
            value: truncate(value, keyword.max_len()),
        });
        Ok(())
    }

    /// Append a DATEV numeric entry. Errors if the narrative is in SWIFT
    /// mode or the code is not two digits.
    pub fn push_code(&mut self, code: u8, value: &str) -> Result<()> {
        if self.mode != NarrativeMode::Datev {
            return Err(Error::Narrative("numeric entries require DATEV mode".into()));
        }
        if code > 99 {
            return Err(Error::Narrative(format!("DATEV code out of range: {code}")));
        }
        self.entries.push(NarrativeEntry {
            key: NarrativeKey::Code(code),
            sub: None,
            value: truncate(value, datev_max_len(code)),
        });
        Ok(())
    }

    /// First value for the given keyword and sub-keyword, if present.
    pub fn keyword_value(&self, keyword: Keyword, sub: Option<SubKeyword>) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == NarrativeKey::Keyword(keyword) && e.sub == sub)
            .map(|e| e.value.as_str())
    }

    /// First value for the given DATEV code, if present.
    pub fn code_value(&self, code: u8) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == NarrativeKey::Code(code))
            .map(|e| e.value.as_str())
    }

    /// Decode a SWIFT-dialect field value into entries.
    ///
    /// Tolerates keywords without a sub-keyword and a trailing `/`.
    pub fn decode_swift(text: &str) -> Result<Self> {
        let mut narrative = Self::swift();
        if text.is_empty() {
            return Ok(narrative);
        }

        let stripped = text.strip_prefix('/').ok_or_else(|| {
            Error::Narrative(format!("SWIFT narrative must start with '/': {text:?}"))
        })?;
        let mut tokens: Vec<&str> = stripped.split('/').collect();
        // Trailing slash produces one empty trailing token; drop it.
        if tokens.last() == Some(&"") {
            tokens.pop();
        }

        let mut i = 0;
        while i < tokens.len() {
            let keyword = Keyword::from_str(tokens[i])?;
            i += 1;

            let mut sub = None;
            if i < tokens.len() && !keyword.sub_keywords().is_empty() {
                if let Ok(candidate) = SubKeyword::from_str(tokens[i]) {
                    if keyword.sub_keywords().contains(&candidate) {
                        sub = Some(candidate);
                        i += 1;
                    }
                }
            }

            // Value runs until the next token that is itself a keyword.
            let start = i;
            while i < tokens.len() && Keyword::from_str(tokens[i]).is_err() {
                i += 1;
            }
            let value = tokens[start..i].join("/");
            narrative.entries.push(NarrativeEntry {
                key: NarrativeKey::Keyword(keyword),
                sub,
                value: truncate(&value, keyword.max_len()),
            });
        }

        Ok(narrative)
    }

    /// Decode a DATEV-dialect field value into entries.
    pub fn decode_datev(text: &str) -> Result<Self> {
        let mut narrative = Self::datev();
        if text.is_empty() {
            return Ok(narrative);
        }

        let stripped = text.strip_prefix('?').ok_or_else(|| {
            Error::Narrative(format!("DATEV narrative must start with '?': {text:?}"))
        })?;

        for segment in stripped.split('?') {
            if segment.len() < 2 || !segment.as_bytes()[..2].iter().all(u8::is_ascii_digit) {
                return Err(Error::Narrative(format!(
                    "DATEV subfield must open with a two-digit code: {segment:?}"
                )));
            }
            let code: u8 = segment[..2]
                .parse()
                .map_err(|_| Error::Narrative(format!("bad DATEV code: {segment:?}")))?;
            narrative.entries.push(NarrativeEntry {
                key: NarrativeKey::Code(code),
                sub: None,
                value: truncate(&segment[2..], datev_max_len(code)),
            });
        }

        Ok(narrative)
    }

    /// Decode a field value in the given dialect.
    pub fn decode(mode: NarrativeMode, text: &str) -> Result<Self> {
        match mode {
            NarrativeMode::Swift => Self::decode_swift(text),
            NarrativeMode::Datev => Self::decode_datev(text),
        }
    }
}

impl fmt::Display for StructuredNarrative {
    /// Encode the entries back into a field value string in this
    /// narrative's dialect.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            match entry.key {
                NarrativeKey::Keyword(keyword) => {
                    write!(f, "/{}", keyword.as_str())?;
                    if let Some(sub) = entry.sub {
                        write!(f, "/{}", sub.as_str())?;
                    }
                    write!(f, "/{}", entry.value)?;
                }
                NarrativeKey::Code(code) => {
                    write!(f, "?{code:02}{}", entry.value)?;
                }
            }
        }
        Ok(())
    }
}
