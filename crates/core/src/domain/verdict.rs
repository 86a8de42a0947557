use serde::{Deserialize, Serialize};

/// Routing decision produced by the message classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Query,
    General,
    Chat,
    Clarify,
}

/// The classifier's structured decision about how to handle a message.
///
/// Produced per message, consumed immediately by the orchestrator,
/// never persisted. Anything the model emits that does not parse into
/// this shape degrades to [`Verdict::fallback`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub requires_data: bool,
}

impl Verdict {
    /// The degrade-to-safe verdict: treat an unclassifiable message as
    /// plain conversation rather than failing the request.
    pub fn fallback() -> Self {
        Self { kind: MessageKind::Chat, requires_data: false }
    }
}

#[cfg(test)]
mod tests {
    use super::{MessageKind, Verdict};

    #[test]
    fn parses_the_strict_two_field_shape() {
        let verdict: Verdict =
            serde_json::from_str(r#"{"type": "query", "requires_data": true}"#).expect("parse");
        assert_eq!(verdict.kind, MessageKind::Query);
        assert!(verdict.requires_data);
    }

    #[test]
    fn unknown_kind_is_a_parse_error() {
        let result = serde_json::from_str::<Verdict>(r#"{"type": "sql", "requires_data": true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn fallback_is_chat_without_data() {
        assert_eq!(
            Verdict::fallback(),
            Verdict { kind: MessageKind::Chat, requires_data: false }
        );
    }
}
