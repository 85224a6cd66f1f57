//! Single payment order codecs: MT103, MT200 and MT202.

use crate::error::{Error, Result};
use crate::tags::FieldSequence;
use crate::types::{Amount, Narrative, Party};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Details-of-charges code (`:71A:`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeOption {
    /// All charges borne by the ordering customer (`OUR`).
    Our,
    /// All charges borne by the beneficiary (`BEN`).
    Beneficiary,
    /// Charges shared (`SHA`).
    Shared,
}

impl ChargeOption {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChargeOption::Our => "OUR",
            ChargeOption::Beneficiary => "BEN",
            ChargeOption::Shared => "SHA",
        }
    }
}

impl FromStr for ChargeOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "OUR" => Ok(ChargeOption::Our),
            "BEN" => Ok(ChargeOption::Beneficiary),
            "SHA" => Ok(ChargeOption::Shared),
            _ => Err(Error::Parse(format!("invalid charges code: {s}"))),
        }
    }
}

/// MT103 single customer credit transfer.
///
/// Canonical tag order: `20, 23B, 32A, 50K, 59, 70?, 71A`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerCreditTransfer {
    /// `:20:` sender's reference.
    pub reference: String,
    /// `:23B:` bank operation code, e.g. `CRED`.
    pub operation_code: String,
    /// `:32A:` value date.
    pub value_date: NaiveDate,
    /// `:32A:` settled amount.
    pub amount: Amount,
    /// `:50K:` ordering customer.
    pub ordering_customer: Party,
    /// `:59:` beneficiary customer.
    pub beneficiary: Party,
    /// `:70:` remittance information.
    pub remittance: Option<Narrative>,
    /// `:71A:` details of charges.
    pub charges: ChargeOption,
}

impl CustomerCreditTransfer {
    /// Parse an MT103 body.
    pub fn from_fields(fields: &FieldSequence) -> Result<Self> {
        let (value_date, amount) = Amount::from_32a(fields.require("32A")?)?;
        Ok(Self {
            reference: fields.require("20")?.to_string(),
            operation_code: fields.require("23B")?.to_string(),
            value_date,
            amount,
            ordering_customer: Party::parse(fields.require("50K")?),
            beneficiary: Party::parse(fields.require("59")?),
            remittance: fields.first("70").map(Narrative::parse),
            charges: fields.require("71A")?.parse()?,
        })
    }

    /// Render as an MT103 body.
    pub fn to_fields(&self) -> Result<FieldSequence> {
        let mut fields = FieldSequence::new();
        fields.push("20", &self.reference)?;
        fields.push("23B", &self.operation_code)?;
        fields.push("32A", self.amount.to_32a(&self.value_date))?;
        fields.push("50K", self.ordering_customer.to_string())?;
        fields.push("59", self.beneficiary.to_string())?;
        if let Some(remittance) = &self.remittance {
            fields.push("70", remittance.to_string())?;
        }
        fields.push("71A", self.charges.as_str())?;
        Ok(fields)
    }
}

/// MT200 financial institution transfer for its own account.
///
/// Canonical tag order: `20, 32A, 53B?, 56A?, 57A, 72?`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnAccountTransfer {
    /// `:20:` transaction reference.
    pub reference: String,
    /// `:32A:` value date.
    pub value_date: NaiveDate,
    /// `:32A:` transferred amount.
    pub amount: Amount,
    /// `:53B:` sender's correspondent.
    pub sender_correspondent: Option<String>,
    /// `:56A:` intermediary institution BIC.
    pub intermediary: Option<String>,
    /// `:57A:` account-with institution BIC.
    pub account_with: String,
    /// `:72:` sender-to-receiver information.
    pub sender_info: Option<String>,
}

impl OwnAccountTransfer {
    /// Parse an MT200 body.
    pub fn from_fields(fields: &FieldSequence) -> Result<Self> {
        let (value_date, amount) = Amount::from_32a(fields.require("32A")?)?;
        Ok(Self {
            reference: fields.require("20")?.to_string(),
            value_date,
            amount,
            sender_correspondent: fields.first("53B").map(str::to_string),
            intermediary: fields.first("56A").map(str::to_string),
            account_with: fields.require("57A")?.to_string(),
            sender_info: fields.first("72").map(str::to_string),
        })
    }

    /// Render as an MT200 body.
    pub fn to_fields(&self) -> Result<FieldSequence> {
        let mut fields = FieldSequence::new();
        fields.push("20", &self.reference)?;
        fields.push("32A", self.amount.to_32a(&self.value_date))?;
        if let Some(correspondent) = &self.sender_correspondent {
            fields.push("53B", correspondent)?;
        }
        if let Some(intermediary) = &self.intermediary {
            fields.push("56A", intermediary)?;
        }
        fields.push("57A", &self.account_with)?;
        if let Some(info) = &self.sender_info {
            fields.push("72", info)?;
        }
        Ok(fields)
    }
}

/// MT202 general financial institution transfer.
///
/// Canonical tag order: `20, 21, 32A, 52A?, 56A?, 57A?, 58A, 72?`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionTransfer {
    /// `:20:` transaction reference.
    pub reference: String,
    /// `:21:` related reference.
    pub related_reference: String,
    /// `:32A:` value date.
    pub value_date: NaiveDate,
    /// `:32A:` transferred amount.
    pub amount: Amount,
    /// `:52A:` ordering institution BIC.
    pub ordering_institution: Option<String>,
    /// `:56A:` intermediary institution BIC.
    pub intermediary: Option<String>,
    /// `:57A:` account-with institution BIC.
    pub account_with: Option<String>,
    /// `:58A:` beneficiary institution BIC.
    pub beneficiary_institution: String,
    /// `:72:` sender-to-receiver information.
    pub sender_info: Option<String>,
}

impl InstitutionTransfer {
    /// Parse an MT202 body.
    pub fn from_fields(fields: &FieldSequence) -> Result<Self> {
        let (value_date, amount) = Amount::from_32a(fields.require("32A")?)?;
        Ok(Self {
            reference: fields.require("20")?.to_string(),
            related_reference: fields.require("21")?.to_string(),
            value_date,
            amount,
            ordering_institution: fields.first("52A").map(str::to_string),
            intermediary: fields.first("56A").map(str::to_string),
            account_with: fields.first("57A").map(str::to_string),
            beneficiary_institution: fields.require("58A")?.to_string(),
            sender_info: fields.first("72").map(str::to_string),
        })
    }

    /// Render as an MT202 body.
    pub fn to_fields(&self) -> Result<FieldSequence> {
        let mut fields = FieldSequence::new();
        fields.push("20", &self.reference)?;
        fields.push("21", &self.related_reference)?;
        fields.push("32A", self.amount.to_32a(&self.value_date))?;
        if let Some(institution) = &self.ordering_institution {
            fields.push("52A", institution)?;
        }
        if let Some(intermediary) = &self.intermediary {
            fields.push("56A", intermediary)?;
        }
        if let Some(account_with) = &self.account_with {
            fields.push("57A", account_with)?;
        }
        fields.push("58A", &self.beneficiary_institution)?;
        if let Some(info) = &self.sender_info {
            fields.push("72", info)?;
        }
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DebitCredit;
    use rust_decimal::Decimal;

    const MT103_BODY: &str = ":20:TESTREF001\n:23B:CRED\n:32A:250512EUR1000,00\n:50K:/DE89370400440532013000\nMax Mustermann\n:59:/DE89370400440532013001\nFirma ABC\n:71A:SHA";

    #[test]
    fn test_mt103_scenario() {
        let fields = FieldSequence::parse(MT103_BODY).unwrap();
        let doc = CustomerCreditTransfer::from_fields(&fields).unwrap();

        assert_eq!(doc.reference, "TESTREF001");
        assert_eq!(doc.amount.value, Decimal::from_str("1000.00").unwrap());
        assert_eq!(doc.amount.currency, "EUR");
        assert_eq!(doc.amount.debit_credit, DebitCredit::Credit);
        assert_eq!(doc.charges, ChargeOption::Shared);
        assert_eq!(
            doc.ordering_customer.account.as_deref(),
            Some("DE89370400440532013000")
        );
        assert_eq!(doc.beneficiary.name_lines, vec!["Firma ABC"]);
        assert_eq!(doc.remittance, None);
    }

    #[test]
    fn test_mt103_roundtrip() {
        let fields = FieldSequence::parse(MT103_BODY).unwrap();
        let doc = CustomerCreditTransfer::from_fields(&fields).unwrap();
        let rendered = doc.to_fields().unwrap();
        assert_eq!(rendered.to_string(), MT103_BODY);
        assert_eq!(CustomerCreditTransfer::from_fields(&rendered).unwrap(), doc);
    }

    #[test]
    fn test_mt103_missing_mandatory_names_tag() {
        let fields = FieldSequence::parse(":20:REF\n:23B:CRED").unwrap();
        match CustomerCreditTransfer::from_fields(&fields) {
            Err(Error::MissingField(tag)) => assert_eq!(tag, "32A"),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn test_mt103_remittance_narrative() {
        let body = format!("{MT103_BODY}\n:70:/EREF/E2E001/SVWZ/Invoice 42");
        // 70 is rendered before 71A in canonical order; parse accepts either.
        let fields = FieldSequence::parse(&body).unwrap();
        let doc = CustomerCreditTransfer::from_fields(&fields).unwrap();
        match &doc.remittance {
            Some(Narrative::Structured(n)) => {
                assert_eq!(
                    n.keyword_value(crate::narrative::Keyword::Eref, None),
                    Some("E2E001")
                );
            }
            other => panic!("expected structured remittance, got {other:?}"),
        }
    }

    #[test]
    fn test_mt200_roundtrip() {
        let doc = OwnAccountTransfer {
            reference: "MT200REF".into(),
            value_date: NaiveDate::from_ymd_opt(2025, 5, 12).unwrap(),
            amount: Amount::from_32b("EUR50000,00").unwrap(),
            sender_correspondent: Some("/D/1234567890".into()),
            intermediary: None,
            account_with: "DEUTDEFFXXX".into(),
            sender_info: None,
        };
        let fields = doc.to_fields().unwrap();
        assert_eq!(
            fields.to_string(),
            ":20:MT200REF\n:32A:250512EUR50000,00\n:53B:/D/1234567890\n:57A:DEUTDEFFXXX"
        );
        assert_eq!(OwnAccountTransfer::from_fields(&fields).unwrap(), doc);
    }

    #[test]
    fn test_mt202_roundtrip() {
        let doc = InstitutionTransfer {
            reference: "MT202REF".into(),
            related_reference: "RELREF01".into(),
            value_date: NaiveDate::from_ymd_opt(2025, 5, 12).unwrap(),
            amount: Amount::from_32b("USD750000,00").unwrap(),
            ordering_institution: Some("COBADEFF".into()),
            intermediary: Some("CHASUS33".into()),
            account_with: None,
            beneficiary_institution: "BNPAFRPP".into(),
            sender_info: Some("/BNF/COVER PAYMENT".into()),
        };
        let fields = doc.to_fields().unwrap();
        assert_eq!(InstitutionTransfer::from_fields(&fields).unwrap(), doc);
    }

    #[test]
    fn test_mt202_requires_related_reference() {
        let fields =
            FieldSequence::parse(":20:REF\n:32A:250512EUR1,00\n:58A:BNPAFRPP").unwrap();
        match InstitutionTransfer::from_fields(&fields) {
            Err(Error::MissingField(tag)) => assert_eq!(tag, "21"),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn test_charge_option_codes() {
        assert_eq!("OUR".parse::<ChargeOption>().unwrap(), ChargeOption::Our);
        assert_eq!("BEN".parse::<ChargeOption>().unwrap(), ChargeOption::Beneficiary);
        assert_eq!("SHA".parse::<ChargeOption>().unwrap(), ChargeOption::Shared);
        assert!("XXX".parse::<ChargeOption>().is_err());
    }
}
