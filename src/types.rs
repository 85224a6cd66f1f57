//! Common types shared by all business message codecs.

use crate::error::{Error, Result};
use crate::locale;
use crate::narrative::StructuredNarrative;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Debit/Credit indicator, kept separate from the amount magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebitCredit {
    /// Debit (outgoing).
    Debit,
    /// Credit (incoming).
    Credit,
}

impl DebitCredit {
    /// Wire representation: `D` or `C`.
    pub fn as_str(&self) -> &'static str {
        match self {
            DebitCredit::Debit => "D",
            DebitCredit::Credit => "C",
        }
    }

    /// The opposite indicator.
    pub fn flipped(&self) -> DebitCredit {
        match self {
            DebitCredit::Debit => DebitCredit::Credit,
            DebitCredit::Credit => DebitCredit::Debit,
        }
    }
}

impl FromStr for DebitCredit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "D" => Ok(DebitCredit::Debit),
            "C" => Ok(DebitCredit::Credit),
            _ => Err(Error::Parse(format!("invalid debit/credit indicator: {s}"))),
        }
    }
}

/// A monetary amount: unsigned magnitude, currency, and sign indicator.
///
/// The magnitude is never negative; the debit/credit indicator carries the
/// sign separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// Non-negative magnitude.
    pub value: Decimal,
    /// 3-letter currency code.
    pub currency: String,
    /// Sign indicator.
    pub debit_credit: DebitCredit,
}

impl Amount {
    /// Parse a `:32A:` field value: 6-digit date, 3-letter currency, then
    /// a comma-decimal magnitude with an optional leading sign (absent
    /// sign means credit).
    pub fn from_32a(value: &str) -> Result<(NaiveDate, Amount)> {
        if value.len() < 10 {
            return Err(Error::Parse(format!("32A value too short: {value}")));
        }
        let date = locale::parse_swift_date(&value[0..6])?;
        let amount = Self::from_currency_amount(&value[6..])?;
        Ok((date, amount))
    }

    /// Parse a `:32B:` field value: 3-letter currency, then a signed
    /// comma-decimal magnitude.
    pub fn from_32b(value: &str) -> Result<Amount> {
        Self::from_currency_amount(value)
    }

    fn from_currency_amount(value: &str) -> Result<Amount> {
        if value.len() < 4 || !value[0..3].bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(Error::Parse(format!(
                "expected currency code and amount: {value}"
            )));
        }
        let currency = value[0..3].to_string();
        let (magnitude, debit_credit) = locale::parse_signed_amount(&value[3..])?;
        Ok(Amount {
            value: magnitude,
            currency,
            debit_credit,
        })
    }

    /// Render as a `:32A:` field value for the given date.
    pub fn to_32a(&self, date: &NaiveDate) -> String {
        format!("{}{}", locale::format_swift_date(date), self.to_32b())
    }

    /// Render as a `:32B:` field value.
    pub fn to_32b(&self) -> String {
        format!(
            "{}{}",
            self.currency,
            locale::format_signed_amount(&self.value, self.debit_credit)
        )
    }
}

/// Balance type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceType {
    /// Opening booked balance (`:60F:`).
    Opening,
    /// Closing booked balance (`:62F:`).
    Closing,
    /// Interim balance (`:60M:` / `:62M:`).
    Interim,
    /// Available balance (`:64:` / `:65:`).
    Available,
}

/// Account statement balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    /// Sign indicator.
    pub debit_credit: DebitCredit,
    /// Balance date.
    pub date: NaiveDate,
    /// 3-letter currency code.
    pub currency: String,
    /// Non-negative magnitude.
    pub amount: Decimal,
    /// Balance type tag.
    pub balance_type: BalanceType,
}

impl Balance {
    /// Parse a balance field value: `C/D + YYMMDD + CCY + amount`.
    pub fn parse(value: &str, balance_type: BalanceType) -> Result<Self> {
        if value.len() < 11 {
            return Err(Error::Parse(format!("balance value too short: {value}")));
        }
        let debit_credit: DebitCredit = value[0..1].parse()?;
        let date = locale::parse_swift_date(&value[1..7])?;
        let currency = value[7..10].to_string();
        let amount = locale::parse_unsigned_amount(&value[10..])?;
        Ok(Balance {
            debit_credit,
            date,
            currency,
            amount,
            balance_type,
        })
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            self.debit_credit.as_str(),
            locale::format_swift_date(&self.date),
            self.currency,
            locale::format_amount(&self.amount)
        )
    }
}

/// A payment party: optional account line plus name/address lines.
///
/// Wire form (`:50K:` / `:59:`): a `/account` first line, then up to four
/// name and address lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Account identification without the leading slash.
    pub account: Option<String>,
    /// Name and address lines.
    pub name_lines: Vec<String>,
}

impl Party {
    /// Parse a party field value.
    pub fn parse(value: &str) -> Self {
        let mut lines = value.lines();
        let mut account = None;
        let mut name_lines: Vec<String> = Vec::new();

        if let Some(first) = lines.next() {
            if let Some(acc) = first.strip_prefix('/') {
                account = Some(acc.to_string());
            } else {
                name_lines.push(first.to_string());
            }
        }
        name_lines.extend(lines.map(str::to_string));

        Party {
            account,
            name_lines,
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        if let Some(account) = &self.account {
            write!(f, "/{account}")?;
            first = false;
        }
        for line in &self.name_lines {
            if !first {
                writeln!(f)?;
            }
            write!(f, "{line}")?;
            first = false;
        }
        Ok(())
    }
}

/// What a narrative field (`:86:` / `:70:`) carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Narrative {
    /// Decoded structured subfields.
    Structured(StructuredNarrative),
    /// Unstructured free text, kept verbatim.
    Free(String),
}

impl Narrative {
    /// Classify and decode a narrative field value.
    ///
    /// Text opening with `?` decodes as DATEV, text opening with a known
    /// `/KEYWORD/` as SWIFT; anything else (including text that merely
    /// resembles either grammar) is preserved as free text.
    pub fn parse(text: &str) -> Narrative {
        if text.starts_with('?') {
            if let Ok(n) = StructuredNarrative::decode_datev(text) {
                return Narrative::Structured(n);
            }
        } else if text.starts_with('/') {
            if let Ok(n) = StructuredNarrative::decode_swift(text) {
                return Narrative::Structured(n);
            }
        }
        Narrative::Free(text.to_string())
    }
}

impl fmt::Display for Narrative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Narrative::Structured(n) => write!(f, "{n}"),
            Narrative::Free(text) => write!(f, "{text}"),
        }
    }
}

/// A single statement line (`:61:`) plus its attached narrative (`:86:`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Value date.
    pub value_date: NaiveDate,
    /// Booking (entry) date.
    pub booking_date: NaiveDate,
    /// Non-negative magnitude.
    pub amount: Decimal,
    /// Stored sign indicator, before any reversal flip.
    pub debit_credit: DebitCredit,
    /// Reversal marker (`RC`/`RD` on the wire).
    pub reversal: bool,
    /// Funds code letter following the sign indicator, if any.
    pub funds_code: Option<char>,
    /// 4-character transaction type code, e.g. `NTRF`.
    pub transaction_type: Option<String>,
    /// Customer reference.
    pub reference: String,
    /// Bank reference (after `//`).
    pub bank_reference: Option<String>,
    /// Supplementary details (second line of the statement line).
    pub supplementary: Option<String>,
    /// Attached narrative from the following `:86:` field.
    pub narrative: Option<Narrative>,
}

impl Transaction {
    /// The sign indicator as exposed to callers: a reversal flips the
    /// stored indicator.
    pub fn effective_debit_credit(&self) -> DebitCredit {
        if self.reversal {
            self.debit_credit.flipped()
        } else {
            self.debit_credit
        }
    }

    /// Parse a `:61:` statement line value.
    pub fn from_61(value: &str) -> Result<Self> {
        let (first, supplementary) = match value.split_once('\n') {
            Some((head, tail)) => (head, Some(tail.to_string())),
            None => (value, None),
        };

        // The fixed head lives entirely on the first line.
        let date_part = first
            .get(0..6)
            .ok_or_else(|| Error::Parse(format!("statement line too short: {value}")))?;
        let value_date = locale::parse_swift_date(date_part)?;
        let mut pos = 6;

        // Optional 4-digit entry date.
        let booking_date = match first.get(pos..pos + 4) {
            Some(part) if part.bytes().all(|b| b.is_ascii_digit()) => {
                pos += 4;
                locale::parse_entry_date(part, value_date.year())?
            }
            _ => value_date,
        };

        // Sign mark: C, D, RC or RD.
        let mut reversal = false;
        if first[pos..].starts_with('R') {
            reversal = true;
            pos += 1;
        }
        let debit_credit: DebitCredit = first
            .get(pos..pos + 1)
            .ok_or_else(|| Error::Parse(format!("missing D/C indicator: {value}")))?
            .parse()?;
        pos += 1;

        // Optional funds code letter (the amount always starts with a digit).
        let mut funds_code = None;
        if let Some(c) = first[pos..].chars().next() {
            if c.is_ascii_uppercase() {
                funds_code = Some(c);
                pos += 1;
            }
        }

        let rest = &first[pos..];
        let amount_end = rest
            .find(|c: char| c.is_ascii_alphabetic())
            .ok_or_else(|| Error::InvalidAmount(format!("no amount in statement line: {value}")))?;
        let amount = locale::parse_unsigned_amount(&rest[..amount_end])?;
        let mut tail = &rest[amount_end..];

        // 4-character transaction type code.
        let mut transaction_type = None;
        if tail.len() >= 4
            && tail.as_bytes()[0].is_ascii_alphabetic()
            && tail.as_bytes()[1..4].iter().all(u8::is_ascii_alphanumeric)
        {
            transaction_type = Some(tail[..4].to_string());
            tail = &tail[4..];
        }

        let (reference, bank_reference) = match tail.split_once("//") {
            Some((customer, bank)) => (customer.to_string(), Some(bank.to_string())),
            None => (tail.to_string(), None),
        };

        Ok(Transaction {
            value_date,
            booking_date,
            amount,
            debit_credit,
            reversal,
            funds_code,
            transaction_type,
            reference,
            bank_reference,
            supplementary,
            narrative: None,
        })
    }

    /// Render this transaction as a `:61:` field value.
    pub fn to_61(&self) -> String {
        let mut out = String::new();
        out.push_str(&locale::format_swift_date(&self.value_date));
        out.push_str(&locale::format_entry_date(&self.booking_date));
        if self.reversal {
            out.push('R');
        }
        out.push_str(self.debit_credit.as_str());
        if let Some(c) = self.funds_code {
            out.push(c);
        }
        out.push_str(&locale::format_amount(&self.amount));
        out.push_str(self.transaction_type.as_deref().unwrap_or("NTRF"));
        if self.reference.is_empty() {
            out.push_str("NONREF");
        } else {
            out.push_str(&self.reference);
        }
        if let Some(bank) = &self.bank_reference {
            out.push_str("//");
            out.push_str(bank);
        }
        if let Some(supp) = &self.supplementary {
            out.push('\n');
            out.push_str(supp);
        }
        out
    }
}
