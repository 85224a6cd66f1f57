//! MT message composition: envelope blocks plus the raw text block.
//!
//! A message is the five braces-delimited blocks: basic header (1),
//! application header (2), optional user header (3), field block (4) and
//! optional trailer (5). A parsed `Message` is immutable; typed business
//! documents are extracted on demand through [`Message::document`].

use crate::documents::Document;
use crate::envelope::{
    ApplicationHeader, BasicHeader, Direction, InputHeader, Trailer, UserHeader,
};
use crate::error::{Error, Result};
use crate::tags::FieldSequence;
use crate::{MessageClass, MessageType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{Read, Write};

/// A complete SWIFT MT message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Block 1.
    pub basic: BasicHeader,
    /// Block 2.
    pub application: ApplicationHeader,
    /// Block 3, if present.
    pub user: Option<UserHeader>,
    /// Raw block 4 text.
    pub body: String,
    /// Block 5, if present.
    pub trailer: Option<Trailer>,
}

/// Split raw message text into `(block number, content)` pairs, counting
/// brace depth so the nested groups of blocks 3 and 5 stay intact.
fn split_blocks(raw: &str) -> Result<Vec<(char, String)>> {
    let mut blocks = Vec::new();
    let mut rest = raw.trim();

    while !rest.is_empty() {
        if !rest.starts_with('{') {
            return Err(Error::Envelope(format!(
                "expected block start '{{', found: {:.20}",
                rest
            )));
        }

        let mut depth = 0usize;
        let mut end = None;
        for (i, c) in rest.char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let end = end.ok_or_else(|| Error::Envelope("unterminated block".into()))?;

        let inner = &rest[1..end];
        let (number, content) = inner
            .split_once(':')
            .ok_or_else(|| Error::Envelope(format!("block without number: {inner:.20}")))?;
        let number = match number {
            "1" | "2" | "3" | "4" | "5" => number.chars().next().unwrap_or('0'),
            _ => {
                return Err(Error::Envelope(format!("unknown block number: {number}")));
            }
        };
        blocks.push((number, content.to_string()));
        rest = rest[end + 1..].trim_start();
    }

    Ok(blocks)
}

/// Strip the conventional `{4:\n ... \n-}` framing from block 4 content.
fn unwrap_body(content: &str) -> String {
    let content = content.strip_prefix("\r\n").unwrap_or(content);
    let content = content.strip_prefix('\n').unwrap_or(content);
    let content = content.strip_suffix('-').unwrap_or(content);
    let content = content.strip_suffix("\r\n").unwrap_or(content);
    content.strip_suffix('\n').unwrap_or(content).to_string()
}

impl Message {
    /// Parse a raw MT message.
    ///
    /// Blocks 1, 2 and 4 are mandatory; 3 and 5 are kept when present.
    ///
    /// # Examples
    ///
    /// ```
    /// use swift_mt::message::Message;
    ///
    /// let raw = "{1:F01COBADEFFAXXX1234567890}{2:I103DEUTDEFFXXXXN}{4:\n:20:REF001\n-}";
    /// let message = Message::parse(raw).unwrap();
    /// assert_eq!(message.application.message_type(), "103");
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let mut basic = None;
        let mut application = None;
        let mut user = None;
        let mut body = None;
        let mut trailer = None;

        for (number, content) in split_blocks(raw)? {
            match number {
                '1' => basic = Some(BasicHeader::parse(&content)?),
                '2' => application = Some(ApplicationHeader::parse(&content)?),
                '3' => user = Some(UserHeader::parse(&content)?),
                '4' => body = Some(unwrap_body(&content)),
                '5' => trailer = Some(Trailer::parse(&content)?),
                _ => unreachable!("split_blocks validates block numbers"),
            }
        }

        Ok(Message {
            basic: basic.ok_or_else(|| Error::Envelope("missing basic header block".into()))?,
            application: application
                .ok_or_else(|| Error::Envelope("missing application header block".into()))?,
            user,
            body: body.ok_or_else(|| Error::Envelope("missing text block".into()))?,
            trailer,
        })
    }

    /// Parse an MT message from any source implementing `Read`.
    pub fn from_read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut raw = String::new();
        reader.read_to_string(&mut raw)?;
        Self::parse(&raw)
    }

    /// Write the rendered message to any destination implementing `Write`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write!(writer, "{self}")?;
        Ok(())
    }

    /// Parse the text block into an ordered field sequence.
    pub fn fields(&self) -> Result<FieldSequence> {
        FieldSequence::parse(&self.body)
    }

    /// The message type from the application header, when recognized.
    pub fn message_type(&self) -> Option<MessageType> {
        MessageType::from_code(self.application.message_type())
    }

    /// Message direction from the application header.
    pub fn direction(&self) -> Direction {
        self.application.direction()
    }

    /// Classify the message from its header type code.
    pub fn classify(&self) -> MessageClass {
        match self.message_type() {
            Some(mt) => mt.class(),
            None => MessageClass::Unsupported,
        }
    }

    /// Extract the typed business document matching the header type.
    ///
    /// An unrecognized type code is terminal: extraction always fails with
    /// [`Error::UnsupportedType`].
    pub fn document(&self) -> Result<Document> {
        let message_type = self.message_type().ok_or_else(|| {
            Error::UnsupportedType(self.application.message_type().to_string())
        })?;
        Document::parse(message_type, &self.fields()?)
    }

    /// Extract a document, first checking the header against an expected
    /// type. A mismatch is a hard error, never a silent fallback.
    pub fn document_as(&self, requested: MessageType) -> Result<Document> {
        let header = self.application.message_type();
        if header != requested.code() {
            return Err(Error::TypeMismatch {
                header: header.to_string(),
                requested: requested.code().to_string(),
            });
        }
        Document::parse(requested, &self.fields()?)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.basic, self.application)?;
        if let Some(user) = &self.user {
            write!(f, "{user}")?;
        }
        write!(f, "{{4:\n{}\n-}}", self.body)?;
        if let Some(trailer) = &self.trailer {
            write!(f, "{trailer}")?;
        }
        Ok(())
    }
}

/// Detect the message type from content signatures.
///
/// Used when no application header is available. Checks run most specific
/// first: an explicit `{2:...}` type code wins; afterwards field
/// combinations unique to each type are probed. The MT900-vs-MT910 split
/// shares a signature and falls back to `:25:` presence — best effort,
/// not authoritative. Returns `None` rather than guessing when no
/// signature matches.
pub fn detect_message_type(text: &str) -> Option<MessageType> {
    if let Some(pos) = text.find("{2:") {
        let code = text.get(pos + 4..pos + 7)?;
        return MessageType::from_code(code);
    }

    let has = |tag: &str| text.contains(tag);

    if has(":23B:") && has(":32A:") {
        return Some(MessageType::Mt103);
    }
    // The batch layouts share one body shape, so detection collapses
    // them: `:28D:` claims MT101, transaction blocks claim MT102, and a
    // bare `:19:` summary falls back to MT104.
    if has(":28D:") {
        return Some(MessageType::Mt101);
    }
    if has(":21:") && has(":32B:") {
        return Some(MessageType::Mt102);
    }
    if has(":19:") {
        return Some(MessageType::Mt104);
    }
    if has(":60M:") || has(":62M:") {
        return Some(MessageType::Mt942);
    }
    if has(":60F:") && has(":62F:") {
        return Some(if has(":86:") {
            MessageType::Mt940
        } else {
            MessageType::Mt950
        });
    }
    if has(":62F:") && !has(":61:") {
        return Some(MessageType::Mt941);
    }
    if has(":58A:") {
        return Some(MessageType::Mt202);
    }
    if has(":21:") && has(":32A:") {
        // MT900 and MT910 share this signature; :25: presence is the
        // documented best-effort discriminator.
        return Some(if has(":25:") {
            MessageType::Mt900
        } else {
            MessageType::Mt910
        });
    }
    if has(":32A:") && has(":57A:") {
        return Some(MessageType::Mt200);
    }

    None
}

/// Business-side message construction.
///
/// Produces an input-direction message whose body comes from a typed
/// document generator.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    message_type: MessageType,
    sender: String,
    receiver: String,
    priority: Option<char>,
    user: Option<UserHeader>,
    trailer: Option<Trailer>,
}

impl MessageBuilder {
    /// Start building a message of the given type between two 12-character
    /// logical terminal addresses.
    pub fn new(
        message_type: MessageType,
        sender: impl Into<String>,
        receiver: impl Into<String>,
    ) -> Self {
        Self {
            message_type,
            sender: sender.into(),
            receiver: receiver.into(),
            priority: None,
            user: None,
            trailer: None,
        }
    }

    /// Set the message priority (rendered as `N` when unset).
    pub fn priority(mut self, priority: char) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Attach a user header carrying a `108` message user reference.
    pub fn message_user_reference(mut self, reference: &str) -> Self {
        let mut user = self.user.unwrap_or_default();
        user.tags.set("108", reference);
        self.user = Some(user);
        self
    }

    /// Attach a trailer block.
    pub fn trailer(mut self, trailer: Trailer) -> Self {
        self.trailer = Some(trailer);
        self
    }

    /// Build the message around a typed document.
    pub fn build(self, document: &Document) -> Result<Message> {
        let fields = document.to_fields(self.message_type)?;
        self.build_from_fields(fields)
    }

    /// Build the message around pre-assembled body fields.
    pub fn build_from_fields(self, fields: FieldSequence) -> Result<Message> {
        if self.sender.len() != 12 {
            return Err(Error::Envelope(format!(
                "sender logical terminal must be 12 characters: {:?}",
                self.sender
            )));
        }
        if self.receiver.len() != 12 {
            return Err(Error::Envelope(format!(
                "receiver logical terminal must be 12 characters: {:?}",
                self.receiver
            )));
        }

        Ok(Message {
            basic: BasicHeader {
                application_id: 'F',
                service_id: "01".to_string(),
                logical_terminal: self.sender,
                session_number: None,
                sequence_number: None,
            },
            application: ApplicationHeader::Input(InputHeader {
                message_type: self.message_type.code().to_string(),
                receiver: self.receiver,
                priority: self.priority,
                delivery_monitor: None,
                obsolescence_period: None,
            }),
            user: self.user,
            body: fields.to_string(),
            trailer: self.trailer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::{ChargeOption, CustomerCreditTransfer};
    use crate::types::{Amount, Party};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const RAW_MT103: &str = "{1:F01COBADEFFAXXX1234567890}{2:I103DEUTDEFFXXXXN}{3:{108:MUR2025001}}{4:\n:20:TESTREF001\n:23B:CRED\n:32A:250512EUR1000,00\n:50K:/DE89370400440532013000\nMax Mustermann\n:59:/DE89370400440532013001\nFirma ABC\n:71A:SHA\n-}{5:{CHK:ABCDEF123456}}";

    #[test]
    fn test_parse_full_envelope() {
        let message = Message::parse(RAW_MT103).unwrap();
        assert_eq!(message.basic.bic(), "COBADEFF");
        assert_eq!(message.application.message_type(), "103");
        assert_eq!(message.direction(), Direction::Input);
        assert_eq!(
            message.user.as_ref().unwrap().message_user_reference(),
            Some("MUR2025001")
        );
        assert_eq!(
            message.trailer.as_ref().unwrap().checksum(),
            Some("ABCDEF123456")
        );
    }

    #[test]
    fn test_envelope_roundtrip_exact() {
        let message = Message::parse(RAW_MT103).unwrap();
        assert_eq!(message.to_string(), RAW_MT103);
    }

    #[test]
    fn test_classify_and_extract_document() {
        let message = Message::parse(RAW_MT103).unwrap();
        assert_eq!(message.classify(), MessageClass::PaymentOrder);
        match message.document().unwrap() {
            Document::CustomerCreditTransfer(doc) => {
                assert_eq!(doc.reference, "TESTREF001");
                assert_eq!(doc.charges, ChargeOption::Shared);
            }
            other => panic!("expected MT103 document, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_type_is_terminal() {
        let raw = "{1:F01COBADEFFAXXX}{2:I999DEUTDEFFXXXXN}{4:\n:20:REF\n-}";
        let message = Message::parse(raw).unwrap();
        assert_eq!(message.classify(), MessageClass::Unsupported);
        match message.document() {
            Err(Error::UnsupportedType(code)) => assert_eq!(code, "999"),
            other => panic!("expected UnsupportedType, got {other:?}"),
        }
    }

    #[test]
    fn test_document_as_type_mismatch() {
        let message = Message::parse(RAW_MT103).unwrap();
        match message.document_as(MessageType::Mt940) {
            Err(Error::TypeMismatch { header, requested }) => {
                assert_eq!(header, "103");
                assert_eq!(requested, "940");
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_non_ascii_header_is_error_not_panic() {
        let raw = "{1:F0ÄCOBADEFFAXX}{2:I103DEUTDEFFXXXXN}{4:\n:20:REF\n-}";
        assert!(matches!(Message::parse(raw), Err(Error::Envelope(_))));
    }

    #[test]
    fn test_unterminated_block_is_error() {
        assert!(Message::parse("{1:F01COBADEFFAXXX").is_err());
    }

    #[test]
    fn test_unknown_block_number_is_error() {
        assert!(Message::parse("{1:F01COBADEFFAXXX}{7:X}").is_err());
    }

    #[test]
    fn test_builder_produces_parseable_message() {
        let doc = Document::CustomerCreditTransfer(CustomerCreditTransfer {
            reference: "TESTREF001".into(),
            operation_code: "CRED".into(),
            value_date: NaiveDate::from_ymd_opt(2025, 5, 12).unwrap(),
            amount: Amount::from_32b("EUR1000,00").unwrap(),
            ordering_customer: Party::parse("/DE89370400440532013000\nMax Mustermann"),
            beneficiary: Party::parse("/DE89370400440532013001\nFirma ABC"),
            remittance: None,
            charges: ChargeOption::Shared,
        });

        let message = MessageBuilder::new(MessageType::Mt103, "COBADEFFAXXX", "DEUTDEFFXXXX")
            .message_user_reference("MUR2025001")
            .build(&doc)
            .unwrap();

        let reparsed = Message::parse(&message.to_string()).unwrap();
        assert_eq!(reparsed, message);
        assert_eq!(reparsed.document().unwrap(), doc);
    }

    #[test]
    fn test_builder_rejects_bad_terminal_address() {
        let builder = MessageBuilder::new(MessageType::Mt103, "SHORT", "DEUTDEFFXXXX");
        assert!(builder.build_from_fields(FieldSequence::new()).is_err());
    }

    #[test]
    fn test_detect_from_application_header() {
        assert_eq!(detect_message_type(RAW_MT103), Some(MessageType::Mt103));
    }

    #[test]
    fn test_detect_from_signatures() {
        assert_eq!(
            detect_message_type(":20:R\n:23B:CRED\n:32A:250512EUR1,00"),
            Some(MessageType::Mt103)
        );
        assert_eq!(
            detect_message_type(":20:R\n:60F:C250511EUR1,00\n:62F:C250512EUR1,00\n:86:X"),
            Some(MessageType::Mt940)
        );
        assert_eq!(
            detect_message_type(":20:R\n:60F:C250511EUR1,00\n:62F:C250512EUR1,00"),
            Some(MessageType::Mt950)
        );
        assert_eq!(
            detect_message_type(":20:R\n:60M:C250511EUR1,00\n:62M:C250512EUR1,00"),
            Some(MessageType::Mt942)
        );
        assert_eq!(
            detect_message_type(":20:R\n:21:REL\n:32A:250512EUR1,00\n:58A:BNPAFRPP"),
            Some(MessageType::Mt202)
        );
        assert_eq!(detect_message_type(":20:R\n:99:X"), None);
    }

    #[test]
    fn test_detect_mt900_vs_mt910_heuristic() {
        assert_eq!(
            detect_message_type(":20:R\n:21:REL\n:25:ACC\n:32A:250512EUR1,00"),
            Some(MessageType::Mt900)
        );
        assert_eq!(
            detect_message_type(":20:R\n:21:REL\n:32A:250512EUR1,00"),
            Some(MessageType::Mt910)
        );
    }
}
