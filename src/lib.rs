//! SWIFT MT interchange message codecs.
//!
//! Parses and generates SWIFT MT messages: the five-block envelope, the
//! `:tag:value` field grammar of the text block, structured remittance
//! narratives in two dialects, and typed business documents for the
//! supported payment-order and statement message types. Amounts and dates
//! use the German interchange conventions (comma decimal separator,
//! two-digit years with a fixed century pivot).
//!
//! # Examples
//!
//! ```
//! use swift_mt::{Document, Message};
//!
//! let raw = "{1:F01COBADEFFAXXX1234567890}{2:I103DEUTDEFFXXXXN}{4:\n\
//!            :20:TESTREF001\n\
//!            :23B:CRED\n\
//!            :32A:250512EUR1000,00\n\
//!            :50K:/DE89370400440532013000\nMax Mustermann\n\
//!            :59:/DE89370400440532013001\nFirma ABC\n\
//!            :71A:SHA\n-}";
//!
//! let message = Message::parse(raw)?;
//! if let Document::CustomerCreditTransfer(transfer) = message.document()? {
//!     assert_eq!(transfer.reference, "TESTREF001");
//! }
//! # Ok::<(), swift_mt::Error>(())
//! ```

pub mod documents;
pub mod envelope;
pub mod error;
pub mod locale;
pub mod message;
pub mod narrative;
pub mod tags;
pub mod types;

pub use documents::{
    BatchTransaction, BatchTransfer, ChargeOption, Confirmation, ConfirmationKind,
    CustomerCreditTransfer, Document, InstitutionTransfer, OwnAccountTransfer, StatementDocument,
};
pub use error::{Error, Result};
pub use message::{detect_message_type, Message, MessageBuilder};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    /// Request for transfer.
    Mt101,
    /// Multiple customer credit transfer.
    Mt102,
    /// Single customer credit transfer.
    Mt103,
    /// Direct debit and request for debit transfer.
    Mt104,
    /// Financial institution transfer for its own account.
    Mt200,
    /// General financial institution transfer.
    Mt202,
    /// Confirmation of debit.
    Mt900,
    /// Confirmation of credit.
    Mt910,
    /// Customer statement.
    Mt940,
    /// Balance report.
    Mt941,
    /// Interim transaction report.
    Mt942,
    /// Statement message.
    Mt950,
}

/// Coarse message classification by business family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageClass {
    /// Payment orders and confirmations (MT1xx, MT2xx, MT9xx confirmations).
    PaymentOrder,
    /// Account statements and balance reports (MT94x, MT950).
    Statement,
    /// A type code this crate has no codec for.
    Unsupported,
}

impl MessageType {
    /// Resolve a three-digit type code, e.g. `"103"`.
    pub fn from_code(code: &str) -> Option<MessageType> {
        match code {
            "101" => Some(Self::Mt101),
            "102" => Some(Self::Mt102),
            "103" => Some(Self::Mt103),
            "104" => Some(Self::Mt104),
            "200" => Some(Self::Mt200),
            "202" => Some(Self::Mt202),
            "900" => Some(Self::Mt900),
            "910" => Some(Self::Mt910),
            "940" => Some(Self::Mt940),
            "941" => Some(Self::Mt941),
            "942" => Some(Self::Mt942),
            "950" => Some(Self::Mt950),
            _ => None,
        }
    }

    /// The three-digit type code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Mt101 => "101",
            Self::Mt102 => "102",
            Self::Mt103 => "103",
            Self::Mt104 => "104",
            Self::Mt200 => "200",
            Self::Mt202 => "202",
            Self::Mt900 => "900",
            Self::Mt910 => "910",
            Self::Mt940 => "940",
            Self::Mt941 => "941",
            Self::Mt942 => "942",
            Self::Mt950 => "950",
        }
    }

    /// The business family this type belongs to.
    pub fn class(&self) -> MessageClass {
        match self {
            Self::Mt101 | Self::Mt102 | Self::Mt103 | Self::Mt104 | Self::Mt200 | Self::Mt202 => {
                MessageClass::PaymentOrder
            }
            Self::Mt900 | Self::Mt910 | Self::Mt940 | Self::Mt941 | Self::Mt942 | Self::Mt950 => {
                MessageClass::Statement
            }
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MT{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_type_code_roundtrip() {
        let all = [
            MessageType::Mt101,
            MessageType::Mt102,
            MessageType::Mt103,
            MessageType::Mt104,
            MessageType::Mt200,
            MessageType::Mt202,
            MessageType::Mt900,
            MessageType::Mt910,
            MessageType::Mt940,
            MessageType::Mt941,
            MessageType::Mt942,
            MessageType::Mt950,
        ];
        for mt in all {
            assert_eq!(MessageType::from_code(mt.code()), Some(mt));
        }
        assert_eq!(MessageType::from_code("999"), None);
    }

    #[test]
    fn test_message_type_display() {
        assert_eq!(MessageType::Mt103.to_string(), "MT103");
        assert_eq!(MessageType::Mt940.to_string(), "MT940");
    }

    #[test]
    fn test_message_class_split() {
        assert_eq!(MessageType::Mt103.class(), MessageClass::PaymentOrder);
        assert_eq!(MessageType::Mt202.class(), MessageClass::PaymentOrder);
        assert_eq!(MessageType::Mt900.class(), MessageClass::Statement);
        assert_eq!(MessageType::Mt940.class(), MessageClass::Statement);
    }
}
