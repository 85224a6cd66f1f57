//! Batch payment order codec shared by MT101, MT102 and MT104.
//!
//! A batch message repeats a transaction tag block N times and appends a
//! `:19:` summary whose total must equal the sum of the per-transaction
//! amounts. The generator always computes that sum itself; the parser
//! re-checks an explicit `:19:` against the transactions and treats a
//! mismatch as fatal.

use crate::error::{Error, Result};
use crate::locale;
use crate::tags::FieldSequence;
use crate::types::{Amount, Narrative, Party};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::payment::ChargeOption;

/// One repetition of the batch transaction block.
///
/// Tag order: `21, 32B, 59, 70?, 71A?`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTransaction {
    /// `:21:` transaction reference.
    pub reference: String,
    /// `:32B:` currency and amount.
    pub amount: Amount,
    /// `:59:` beneficiary.
    pub beneficiary: Party,
    /// `:70:` remittance information.
    pub remittance: Option<Narrative>,
    /// `:71A:` details of charges.
    pub charges: Option<ChargeOption>,
}

/// MT101/102/104 batch payment order.
///
/// Sequence A tag order: `20, 28D?, 30?, 50K?`, then the transaction
/// blocks, then the computed `:19:` summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTransfer {
    /// `:20:` sender's reference.
    pub reference: String,
    /// `:28D:` message index/total, e.g. `1/1`.
    pub message_index: Option<String>,
    /// `:30:` requested execution date.
    pub execution_date: Option<NaiveDate>,
    /// `:50K:` ordering customer for the whole batch.
    pub ordering_customer: Option<Party>,
    /// Transaction blocks in order.
    pub transactions: Vec<BatchTransaction>,
}

impl BatchTransfer {
    /// Sum of the per-transaction amount magnitudes.
    pub fn settlement_sum(&self) -> Decimal {
        self.transactions
            .iter()
            .map(|tx| tx.amount.value)
            .sum()
    }

    /// Parse a batch body.
    pub fn from_fields(fields: &FieldSequence) -> Result<Self> {
        let mut reference = None;
        let mut message_index = None;
        let mut execution_date = None;
        let mut ordering_customer = None;
        let mut declared_sum: Option<Decimal> = None;

        struct Pending {
            reference: String,
            amount: Option<Amount>,
            beneficiary: Option<Party>,
            remittance: Option<Narrative>,
            charges: Option<ChargeOption>,
        }

        let mut transactions: Vec<BatchTransaction> = Vec::new();
        let mut current: Option<Pending> = None;

        let mut close =
            |pending: Option<Pending>, transactions: &mut Vec<BatchTransaction>| -> Result<()> {
                if let Some(p) = pending {
                    transactions.push(BatchTransaction {
                        reference: p.reference,
                        amount: p.amount.ok_or_else(|| Error::MissingField("32B".into()))?,
                        beneficiary: p
                            .beneficiary
                            .ok_or_else(|| Error::MissingField("59".into()))?,
                        remittance: p.remittance,
                        charges: p.charges,
                    });
                }
                Ok(())
            };

        for field in fields {
            let value = field.value.as_str();
            match field.tag.as_str() {
                "20" => reference = Some(value.to_string()),
                "28D" => message_index = Some(value.to_string()),
                "30" => execution_date = Some(locale::parse_swift_date(value)?),
                "50K" | "50H" if current.is_none() => {
                    ordering_customer = Some(Party::parse(value));
                }
                "21" => {
                    close(current.take(), &mut transactions)?;
                    current = Some(Pending {
                        reference: value.to_string(),
                        amount: None,
                        beneficiary: None,
                        remittance: None,
                        charges: None,
                    });
                }
                "32B" => {
                    let pending = current.as_mut().ok_or_else(|| {
                        Error::Parse(":32B: outside a transaction block".into())
                    })?;
                    pending.amount = Some(Amount::from_32b(value)?);
                }
                "59" => {
                    let pending = current.as_mut().ok_or_else(|| {
                        Error::Parse(":59: outside a transaction block".into())
                    })?;
                    pending.beneficiary = Some(Party::parse(value));
                }
                "70" => {
                    if let Some(pending) = current.as_mut() {
                        pending.remittance = Some(Narrative::parse(value));
                    }
                }
                "71A" => {
                    if let Some(pending) = current.as_mut() {
                        pending.charges = Some(value.parse()?);
                    }
                }
                "19" => declared_sum = Some(locale::parse_unsigned_amount(value)?),
                // Tags outside the modeled subset are tolerated.
                _ => {}
            }
        }
        close(current.take(), &mut transactions)?;

        let batch = BatchTransfer {
            reference: reference.ok_or_else(|| Error::MissingField("20".into()))?,
            message_index,
            execution_date,
            ordering_customer,
            transactions,
        };

        if let Some(declared) = declared_sum {
            let computed = batch.settlement_sum();
            if declared != computed {
                return Err(Error::SummaryMismatch {
                    declared: locale::format_amount(&declared),
                    computed: locale::format_amount(&computed),
                });
            }
        }

        Ok(batch)
    }

    /// Render as a batch body; the `:19:` summary is always computed from
    /// the transactions, never taken from caller input.
    pub fn to_fields(&self) -> Result<FieldSequence> {
        let mut fields = FieldSequence::new();
        fields.push("20", &self.reference)?;
        if let Some(index) = &self.message_index {
            fields.push("28D", index)?;
        }
        if let Some(date) = &self.execution_date {
            fields.push("30", locale::format_swift_date(date))?;
        }
        if let Some(customer) = &self.ordering_customer {
            fields.push("50K", customer.to_string())?;
        }
        for tx in &self.transactions {
            fields.push("21", &tx.reference)?;
            fields.push("32B", tx.amount.to_32b())?;
            fields.push("59", tx.beneficiary.to_string())?;
            if let Some(remittance) = &tx.remittance {
                fields.push("70", remittance.to_string())?;
            }
            if let Some(charges) = &tx.charges {
                fields.push("71A", charges.as_str())?;
            }
        }
        fields.push("19", locale::format_amount(&self.settlement_sum()))?;
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DebitCredit;
    use std::str::FromStr;

    fn sample_batch() -> BatchTransfer {
        BatchTransfer {
            reference: "BATCH001".into(),
            message_index: Some("1/1".into()),
            execution_date: NaiveDate::from_ymd_opt(2025, 5, 12),
            ordering_customer: Some(Party {
                account: Some("DE89370400440532013000".into()),
                name_lines: vec!["Max Mustermann".into()],
            }),
            transactions: vec![
                BatchTransaction {
                    reference: "TX001".into(),
                    amount: Amount {
                        value: Decimal::from_str("1000.00").unwrap(),
                        currency: "EUR".into(),
                        debit_credit: DebitCredit::Credit,
                    },
                    beneficiary: Party {
                        account: Some("DE89370400440532013001".into()),
                        name_lines: vec!["Firma ABC".into()],
                    },
                    remittance: None,
                    charges: Some(ChargeOption::Shared),
                },
                BatchTransaction {
                    reference: "TX002".into(),
                    amount: Amount {
                        value: Decimal::from_str("2500.50").unwrap(),
                        currency: "EUR".into(),
                        debit_credit: DebitCredit::Credit,
                    },
                    beneficiary: Party {
                        account: Some("DE89370400440532013002".into()),
                        name_lines: vec!["Firma XYZ".into()],
                    },
                    remittance: None,
                    charges: None,
                },
            ],
        }
    }

    #[test]
    fn test_summary_is_computed_from_transactions() {
        let batch = sample_batch();
        assert_eq!(batch.settlement_sum(), Decimal::from_str("3500.50").unwrap());

        let fields = batch.to_fields().unwrap();
        assert_eq!(fields.first("19"), Some("3500,50"));
    }

    #[test]
    fn test_batch_roundtrip() {
        let batch = sample_batch();
        let fields = batch.to_fields().unwrap();
        let parsed = BatchTransfer::from_fields(&fields).unwrap();
        assert_eq!(parsed, batch);
    }

    #[test]
    fn test_summary_mismatch_is_fatal() {
        let body = ":20:BATCH001\n:21:TX001\n:32B:EUR1000,00\n:59:/ACC\nFirma ABC\n:19:9999,99";
        let fields = FieldSequence::parse(body).unwrap();
        match BatchTransfer::from_fields(&fields) {
            Err(Error::SummaryMismatch { declared, computed }) => {
                assert_eq!(declared, "9999,99");
                assert_eq!(computed, "1000,00");
            }
            other => panic!("expected SummaryMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_transaction_missing_amount_names_tag() {
        let body = ":20:BATCH001\n:21:TX001\n:59:/ACC\nFirma ABC";
        let fields = FieldSequence::parse(body).unwrap();
        match BatchTransfer::from_fields(&fields) {
            Err(Error::MissingField(tag)) => assert_eq!(tag, "32B"),
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn test_amount_field_outside_block_is_fatal() {
        let fields = FieldSequence::parse(":20:BATCH001\n:32B:EUR1,00").unwrap();
        assert!(BatchTransfer::from_fields(&fields).is_err());
    }

    #[test]
    fn test_empty_batch_summary_is_zero() {
        let batch = BatchTransfer {
            reference: "EMPTY".into(),
            message_index: None,
            execution_date: None,
            ordering_customer: None,
            transactions: vec![],
        };
        let fields = batch.to_fields().unwrap();
        assert_eq!(fields.first("19"), Some("0"));
    }
}
