//! Debit/credit confirmation codecs: MT900 and MT910.

use crate::error::{Error, Result};
use crate::tags::FieldSequence;
use crate::types::{Amount, Party};
use crate::MessageType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whether the confirmation advises a debit (MT900) or credit (MT910).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmationKind {
    /// MT900 confirmation of debit.
    Debit,
    /// MT910 confirmation of credit.
    Credit,
}

/// MT900/910 confirmation of debit/credit.
///
/// Canonical tag order: `20, 21, 25?, 32A, 50K?, 52A?, 72?`. The account
/// (`:25:`) is mandatory for MT900 and optional for MT910; the ordering
/// customer (`:50K:`) appears on credit confirmations only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    /// Debit or credit advice.
    pub kind: ConfirmationKind,
    /// `:20:` transaction reference.
    pub reference: String,
    /// `:21:` related reference (the confirmed message's `:20:`).
    pub related_reference: String,
    /// `:25:` account identification.
    pub account: Option<String>,
    /// `:32A:` value date.
    pub value_date: NaiveDate,
    /// `:32A:` confirmed amount.
    pub amount: Amount,
    /// `:50K:` ordering customer (MT910).
    pub ordering_customer: Option<Party>,
    /// `:52A:` ordering institution BIC.
    pub ordering_institution: Option<String>,
    /// `:72:` sender-to-receiver information.
    pub sender_info: Option<String>,
}

impl Confirmation {
    fn kind_for(message_type: MessageType) -> Result<ConfirmationKind> {
        match message_type {
            MessageType::Mt900 => Ok(ConfirmationKind::Debit),
            MessageType::Mt910 => Ok(ConfirmationKind::Credit),
            other => Err(Error::TypeMismatch {
                header: other.code().to_string(),
                requested: "900/910".to_string(),
            }),
        }
    }

    /// Parse an MT900 or MT910 body.
    pub fn from_fields(fields: &FieldSequence, message_type: MessageType) -> Result<Self> {
        let kind = Self::kind_for(message_type)?;
        let account = fields.first("25").map(str::to_string);
        if kind == ConfirmationKind::Debit && account.is_none() {
            return Err(Error::MissingField("25".into()));
        }

        let (value_date, amount) = Amount::from_32a(fields.require("32A")?)?;
        Ok(Self {
            kind,
            reference: fields.require("20")?.to_string(),
            related_reference: fields.require("21")?.to_string(),
            account,
            value_date,
            amount,
            ordering_customer: fields.first("50K").map(Party::parse),
            ordering_institution: fields.first("52A").map(str::to_string),
            sender_info: fields.first("72").map(str::to_string),
        })
    }

    /// Render as an MT900 or MT910 body.
    pub fn to_fields(&self, message_type: MessageType) -> Result<FieldSequence> {
        let kind = Self::kind_for(message_type)?;
        if kind != self.kind {
            return Err(Error::Parse(format!(
                "{:?} confirmation passed to the MT{} generator",
                self.kind,
                message_type.code()
            )));
        }

        let mut fields = FieldSequence::new();
        fields.push("20", &self.reference)?;
        fields.push("21", &self.related_reference)?;
        match &self.account {
            Some(account) => fields.push("25", account)?,
            None if kind == ConfirmationKind::Debit => {
                return Err(Error::MissingField("25".into()))
            }
            None => {}
        }
        fields.push("32A", self.amount.to_32a(&self.value_date))?;
        if let Some(customer) = &self.ordering_customer {
            fields.push("50K", customer.to_string())?;
        }
        if let Some(institution) = &self.ordering_institution {
            fields.push("52A", institution)?;
        }
        if let Some(info) = &self.sender_info {
            fields.push("72", info)?;
        }
        Ok(fields)
    }
}
