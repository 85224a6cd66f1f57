//! Account statement codecs: MT940, MT941, MT942 and MT950.
//!
//! The four types share one document shape and one tag walk; they differ
//! in which balances are legal (booked `F` vs interim `M`), whether
//! statement lines appear at all (MT941 is balance-only) and whether the
//! lines may carry `:86:` narratives (MT950 may not).

use crate::error::{Error, Result};
use crate::tags::FieldSequence;
use crate::types::{Balance, BalanceType, Narrative, Transaction};
use crate::MessageType;
use serde::{Deserialize, Serialize};

/// MT94x/950 account statement or balance report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementDocument {
    /// `:20:` transaction reference number.
    pub reference: String,
    /// `:21:` related reference.
    pub related_reference: Option<String>,
    /// `:25:` account identification.
    pub account: String,
    /// `:28C:` statement/sequence number.
    pub statement_number: Option<String>,
    /// The number arrived under the bare `:28:` tag rather than `:28C:`,
    /// and regenerates under the same tag.
    pub bare_number_tag: bool,
    /// `:60F:`/`:60M:` opening balance.
    pub opening: Option<Balance>,
    /// `:62F:`/`:62M:` closing balance.
    pub closing: Option<Balance>,
    /// `:64:` closing available balance.
    pub closing_available: Option<Balance>,
    /// `:65:` forward available balance.
    pub forward_available: Option<Balance>,
    /// `:61:` statement lines with their attached `:86:` narratives.
    pub transactions: Vec<Transaction>,
    /// Statement-level `:86:` information following the closing balance.
    pub information: Option<Narrative>,
}

impl StatementDocument {
    /// Statement currency, taken from the closing or opening balance.
    pub fn currency(&self) -> Option<&str> {
        self.closing
            .as_ref()
            .or(self.opening.as_ref())
            .map(|b| b.currency.as_str())
    }

    /// Parse a statement body, enforcing the given type's constraints.
    pub fn from_fields(fields: &FieldSequence, message_type: MessageType) -> Result<Self> {
        let mut doc = StatementDocument::default();
        let mut reference = None;
        let mut account = None;
        let mut current: Option<Transaction> = None;

        for field in fields {
            let value = field.value.as_str();
            match field.tag.as_str() {
                "20" => reference = Some(value.to_string()),
                "21" => doc.related_reference = Some(value.to_string()),
                "25" => account = Some(value.to_string()),
                "28C" => doc.statement_number = Some(value.to_string()),
                "28" => {
                    doc.statement_number = Some(value.to_string());
                    doc.bare_number_tag = true;
                }
                "60F" => doc.opening = Some(Balance::parse(value, BalanceType::Opening)?),
                "60M" => doc.opening = Some(Balance::parse(value, BalanceType::Interim)?),
                "61" => {
                    if let Some(tx) = current.take() {
                        doc.transactions.push(tx);
                    }
                    current = Some(Transaction::from_61(value)?);
                }
                "86" => match current.as_mut() {
                    Some(tx) if tx.narrative.is_none() => {
                        tx.narrative = Some(Narrative::parse(value));
                    }
                    _ => doc.information = Some(Narrative::parse(value)),
                },
                "62F" => {
                    if let Some(tx) = current.take() {
                        doc.transactions.push(tx);
                    }
                    doc.closing = Some(Balance::parse(value, BalanceType::Closing)?);
                }
                "62M" => {
                    if let Some(tx) = current.take() {
                        doc.transactions.push(tx);
                    }
                    doc.closing = Some(Balance::parse(value, BalanceType::Interim)?);
                }
                "64" => doc.closing_available = Some(Balance::parse(value, BalanceType::Available)?),
                "65" => doc.forward_available = Some(Balance::parse(value, BalanceType::Available)?),
                // Tags outside the modeled subset are tolerated.
                _ => {}
            }
        }
        if let Some(tx) = current.take() {
            doc.transactions.push(tx);
        }

        doc.reference = reference.ok_or_else(|| Error::MissingField("20".into()))?;
        doc.account = account.ok_or_else(|| Error::MissingField("25".into()))?;
        doc.validate(message_type)?;
        Ok(doc)
    }

    fn validate(&self, message_type: MessageType) -> Result<()> {
        match message_type {
            MessageType::Mt940 | MessageType::Mt950 => {
                if self.opening.is_none() {
                    return Err(Error::MissingField("60F".into()));
                }
                if self.closing.is_none() {
                    return Err(Error::MissingField("62F".into()));
                }
                // MT950 statements carry no narratives at all.
                if message_type == MessageType::Mt950
                    && (self.information.is_some()
                        || self.transactions.iter().any(|tx| tx.narrative.is_some()))
                {
                    return Err(Error::Parse(
                        "MT950 statements carry no :86: narratives".into(),
                    ));
                }
            }
            MessageType::Mt942 => {
                if self.opening.is_none() {
                    return Err(Error::MissingField("60M".into()));
                }
                if self.closing.is_none() {
                    return Err(Error::MissingField("62M".into()));
                }
            }
            MessageType::Mt941 => {
                if self.closing.is_none() {
                    return Err(Error::MissingField("62F".into()));
                }
                if !self.transactions.is_empty() {
                    return Err(Error::Parse(
                        "MT941 balance reports carry no statement lines".into(),
                    ));
                }
            }
            other => {
                return Err(Error::TypeMismatch {
                    header: other.code().to_string(),
                    requested: "94x".to_string(),
                })
            }
        }
        Ok(())
    }

    /// Render as a statement body in the given type's canonical tag order.
    pub fn to_fields(&self, message_type: MessageType) -> Result<FieldSequence> {
        self.validate(message_type)?;

        let mut fields = FieldSequence::new();
        fields.push("20", &self.reference)?;
        if let Some(related) = &self.related_reference {
            fields.push("21", related)?;
        }
        fields.push("25", &self.account)?;
        if let Some(number) = &self.statement_number {
            fields.push(if self.bare_number_tag { "28" } else { "28C" }, number)?;
        }
        if let Some(opening) = &self.opening {
            fields.push(opening_tag(opening)?, opening.to_string())?;
        }
        for tx in &self.transactions {
            fields.push("61", tx.to_61())?;
            if let Some(narrative) = &tx.narrative {
                fields.push("86", narrative.to_string())?;
            }
        }
        if let Some(closing) = &self.closing {
            fields.push(closing_tag(closing)?, closing.to_string())?;
        }
        if let Some(available) = &self.closing_available {
            fields.push("64", available.to_string())?;
        }
        if let Some(available) = &self.forward_available {
            fields.push("65", available.to_string())?;
        }
        if let Some(information) = &self.information {
            fields.push("86", information.to_string())?;
        }
        Ok(fields)
    }
}

fn opening_tag(balance: &Balance) -> Result<&'static str> {
    match balance.balance_type {
        BalanceType::Opening => Ok("60F"),
        BalanceType::Interim => Ok("60M"),
        other => Err(Error::Parse(format!(
            "opening balance cannot be of type {other:?}"
        ))),
    }
}

fn closing_tag(balance: &Balance) -> Result<&'static str> {
    match balance.balance_type {
        BalanceType::Closing => Ok("62F"),
        BalanceType::Interim => Ok("62M"),
        other => Err(Error::Parse(format!(
            "closing balance cannot be of type {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DebitCredit;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const MT940_BODY: &str = ":20:STMT001\n:25:DE89370400440532013000\n:28C:49/1\n:60F:C250511EUR10000,00\n:61:2505120512D12,01NTRFREF001//GI2504900007841\n:86:?00LASTSCHRIFT?20EREF+E2E001?32FIRMA ABC\n:61:2505120512C65,00NTRFREF002\n:86:/SVWZ/Invoice 42/EREF/E2E002\n:62F:C250512EUR10052,99";

    #[test]
    fn test_mt940_parse() {
        let fields = FieldSequence::parse(MT940_BODY).unwrap();
        let doc = StatementDocument::from_fields(&fields, MessageType::Mt940).unwrap();

        assert_eq!(doc.reference, "STMT001");
        assert_eq!(doc.account, "DE89370400440532013000");
        assert_eq!(doc.statement_number.as_deref(), Some("49/1"));
        assert_eq!(doc.currency(), Some("EUR"));
        assert_eq!(doc.transactions.len(), 2);

        let first = &doc.transactions[0];
        assert_eq!(first.amount, Decimal::from_str("12.01").unwrap());
        assert_eq!(first.debit_credit, DebitCredit::Debit);
        match first.narrative.as_ref().unwrap() {
            Narrative::Structured(n) => assert_eq!(n.code_value(0), Some("LASTSCHRIFT")),
            other => panic!("expected DATEV narrative, got {other:?}"),
        }

        let opening = doc.opening.as_ref().unwrap();
        assert_eq!(opening.balance_type, BalanceType::Opening);
        assert_eq!(opening.amount, Decimal::from_str("10000.00").unwrap());
    }

    #[test]
    fn test_bare_sequence_tag_roundtrips() {
        let body = ":20:STMT004\n:25:ACC\n:28:7\n:60F:C250511EUR1,00\n:62F:C250512EUR1,00";
        let fields = FieldSequence::parse(body).unwrap();
        let doc = StatementDocument::from_fields(&fields, MessageType::Mt950).unwrap();
        assert!(doc.bare_number_tag);
        assert_eq!(doc.statement_number.as_deref(), Some("7"));
        assert_eq!(doc.to_fields(MessageType::Mt950).unwrap().to_string(), body);
    }

    #[test]
    fn test_mt940_roundtrip_exact() {
        let fields = FieldSequence::parse(MT940_BODY).unwrap();
        let doc = StatementDocument::from_fields(&fields, MessageType::Mt940).unwrap();
        let rendered = doc.to_fields(MessageType::Mt940).unwrap();
        assert_eq!(rendered.to_string(), MT940_BODY);
    }

    #[test]
    fn test_mt940_malformed_statement_line_is_error() {
        let body = ":20:X\n:25:ACC\n:60F:C250511EUR1,00\n:61:2505\nXETC\n:62F:C250512EUR1,00";
        let fields = FieldSequence::parse(body).unwrap();
        assert!(StatementDocument::from_fields(&fields, MessageType::Mt940).is_err());
    }

    #[test]
    fn test_mt940_missing_opening_balance() {
        let body = ":20:STMT001\n:25:ACC\n:62F:C250512EUR1,00";
        let fields = FieldSequence::parse(body).unwrap();
        match StatementDocument::from_fields(&fields, MessageType::Mt940) {
            Err(Error::MissingField(tag)) => assert_eq!(tag, "60F"),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn test_mt942_interim_balances() {
        let body = ":20:INTERIM01\n:25:ACC\n:28C:1/1\n:60M:C250512EUR500,00\n:61:2505120512C65,00NTRFREF001\n:62M:C250512EUR565,00";
        let fields = FieldSequence::parse(body).unwrap();
        let doc = StatementDocument::from_fields(&fields, MessageType::Mt942).unwrap();

        assert_eq!(doc.opening.as_ref().unwrap().balance_type, BalanceType::Interim);
        assert_eq!(doc.closing.as_ref().unwrap().balance_type, BalanceType::Interim);
        assert_eq!(doc.to_fields(MessageType::Mt942).unwrap().to_string(), body);
    }

    #[test]
    fn test_mt942_rejects_booked_balances() {
        let body = ":20:X\n:25:ACC\n:60F:C250512EUR1,00\n:62F:C250512EUR1,00";
        let fields = FieldSequence::parse(body).unwrap();
        // MT942 requires interim balances; booked ones leave 60M unset.
        match StatementDocument::from_fields(&fields, MessageType::Mt942) {
            Err(Error::MissingField(tag)) => assert_eq!(tag, "60M"),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn test_mt941_balance_report() {
        let body = ":20:BAL001\n:25:ACC\n:28C:10/1\n:62F:D250512EUR152,40\n:64:D250512EUR152,40";
        let fields = FieldSequence::parse(body).unwrap();
        let doc = StatementDocument::from_fields(&fields, MessageType::Mt941).unwrap();
        assert!(doc.transactions.is_empty());
        assert!(doc.opening.is_none());
        assert_eq!(doc.to_fields(MessageType::Mt941).unwrap().to_string(), body);
    }

    #[test]
    fn test_mt941_rejects_statement_lines() {
        let body = ":20:X\n:25:ACC\n:61:250512C1,00NTRFREF\n:62F:C250512EUR1,00";
        let fields = FieldSequence::parse(body).unwrap();
        assert!(StatementDocument::from_fields(&fields, MessageType::Mt941).is_err());
    }

    #[test]
    fn test_mt950_rejects_narratives_on_parse() {
        let fields = FieldSequence::parse(MT940_BODY).unwrap();
        match StatementDocument::from_fields(&fields, MessageType::Mt950) {
            Err(Error::Parse(_)) => {}
            other => panic!("expected parse rejection, got {other:?}"),
        }

        let body = ":20:X\n:25:ACC\n:60F:C250511EUR1,00\n:62F:C250512EUR1,00\n:86:NO MOVEMENTS";
        let fields = FieldSequence::parse(body).unwrap();
        assert!(StatementDocument::from_fields(&fields, MessageType::Mt950).is_err());
    }

    #[test]
    fn test_mt950_rejects_narratives_on_generate() {
        let fields = FieldSequence::parse(MT940_BODY).unwrap();
        let doc = StatementDocument::from_fields(&fields, MessageType::Mt940).unwrap();
        assert!(doc.to_fields(MessageType::Mt950).is_err());
    }

    #[test]
    fn test_mt950_without_narratives() {
        let body = ":20:STMT002\n:25:ACC\n:28C:50/1\n:60F:C250511EUR100,00\n:61:2505120512C65,00NTRFREF001\n:62F:C250512EUR165,00";
        let fields = FieldSequence::parse(body).unwrap();
        let doc = StatementDocument::from_fields(&fields, MessageType::Mt950).unwrap();
        assert_eq!(doc.to_fields(MessageType::Mt950).unwrap().to_string(), body);
    }

    #[test]
    fn test_statement_level_information() {
        let body = ":20:STMT003\n:25:ACC\n:60F:C250511EUR100,00\n:62F:C250512EUR100,00\n:86:NO MOVEMENTS";
        let fields = FieldSequence::parse(body).unwrap();
        let doc = StatementDocument::from_fields(&fields, MessageType::Mt940).unwrap();
        assert_eq!(doc.information, Some(Narrative::Free("NO MOVEMENTS".into())));
        assert_eq!(doc.to_fields(MessageType::Mt940).unwrap().to_string(), body);
    }
}
