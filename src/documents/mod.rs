//! Business document parsers and generators, one per message type family.
//!
//! Each codec maps a fixed, ordered subset of field tags to typed
//! attributes. Parsing walks the field sequence once; a missing mandatory
//! tag is a fatal error naming the tag, an absent optional tag becomes
//! `None`. Generation renders attributes back in the canonical per-type
//! tag order, omitting unset optionals entirely.

pub mod batch;
pub mod confirmation;
pub mod payment;
pub mod statement;

pub use batch::{BatchTransaction, BatchTransfer};
pub use confirmation::{Confirmation, ConfirmationKind};
pub use payment::{ChargeOption, CustomerCreditTransfer, InstitutionTransfer, OwnAccountTransfer};
pub use statement::StatementDocument;

use crate::error::{Error, Result};
use crate::tags::FieldSequence;
use crate::MessageType;
use serde::{Deserialize, Serialize};

/// A typed business document, one variant per codec family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Document {
    /// MT103 single customer credit transfer.
    CustomerCreditTransfer(CustomerCreditTransfer),
    /// MT200 own-account transfer.
    OwnAccountTransfer(OwnAccountTransfer),
    /// MT202 general financial institution transfer.
    InstitutionTransfer(InstitutionTransfer),
    /// MT101/102/104 batch payment order.
    Batch(BatchTransfer),
    /// MT940/941/942/950 account statement or balance report.
    Statement(StatementDocument),
    /// MT900/910 debit or credit confirmation.
    Confirmation(Confirmation),
}

impl Document {
    /// Parse the body fields of a message into the typed document matching
    /// the message type.
    pub fn parse(message_type: MessageType, fields: &FieldSequence) -> Result<Document> {
        match message_type {
            MessageType::Mt103 => Ok(Document::CustomerCreditTransfer(
                CustomerCreditTransfer::from_fields(fields)?,
            )),
            MessageType::Mt200 => Ok(Document::OwnAccountTransfer(
                OwnAccountTransfer::from_fields(fields)?,
            )),
            MessageType::Mt202 => Ok(Document::InstitutionTransfer(
                InstitutionTransfer::from_fields(fields)?,
            )),
            MessageType::Mt101 | MessageType::Mt102 | MessageType::Mt104 => {
                Ok(Document::Batch(BatchTransfer::from_fields(fields)?))
            }
            MessageType::Mt900 | MessageType::Mt910 => Ok(Document::Confirmation(
                Confirmation::from_fields(fields, message_type)?,
            )),
            MessageType::Mt940 | MessageType::Mt941 | MessageType::Mt942 | MessageType::Mt950 => {
                Ok(Document::Statement(StatementDocument::from_fields(
                    fields,
                    message_type,
                )?))
            }
        }
    }

    /// Render this document as body fields for the given message type.
    ///
    /// Passing a document to a generator of the wrong family is a fatal
    /// error, never a silent fallback.
    pub fn to_fields(&self, message_type: MessageType) -> Result<FieldSequence> {
        match (self, message_type) {
            (Document::CustomerCreditTransfer(doc), MessageType::Mt103) => doc.to_fields(),
            (Document::OwnAccountTransfer(doc), MessageType::Mt200) => doc.to_fields(),
            (Document::InstitutionTransfer(doc), MessageType::Mt202) => doc.to_fields(),
            (
                Document::Batch(doc),
                MessageType::Mt101 | MessageType::Mt102 | MessageType::Mt104,
            ) => doc.to_fields(),
            (Document::Confirmation(doc), MessageType::Mt900 | MessageType::Mt910) => {
                doc.to_fields(message_type)
            }
            (
                Document::Statement(doc),
                MessageType::Mt940 | MessageType::Mt941 | MessageType::Mt942 | MessageType::Mt950,
            ) => doc.to_fields(message_type),
            _ => Err(Error::Parse(format!(
                "document family does not match MT{} generator",
                message_type.code()
            ))),
        }
    }
}
