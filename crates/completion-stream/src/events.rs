//! Classification of framed payloads into typed protocol events.

use serde::Deserialize;

use crate::chunk::Usage;

/// One streamed output element, as reported by item events and by the final
/// response snapshot.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub(crate) struct OutputItem {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub call_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<String>,
    #[serde(default)]
    pub content: Vec<ContentPart>,
}

/// A piece of message content inside an output item or a content-part event.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub(crate) struct ContentPart {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

/// Full response snapshot optionally nested inside the terminal event.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub(crate) struct ResponseSnapshot {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub output: Vec<OutputItem>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// Decoded payload of one record, discriminated by its declared kind.
///
/// Kinds outside the known set decode to `Unknown` and are ignored rather
/// than rejected.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum ResponseEvent {
    #[serde(rename = "response.output_text.delta")]
    OutputTextDelta {
        #[serde(default)]
        delta: String,
    },
    /// Full text generated so far.
    #[serde(rename = "response.output_text.done")]
    OutputTextDone {
        #[serde(default)]
        text: String,
    },
    #[serde(rename = "response.output_item.added")]
    OutputItemAdded {
        item: OutputItem,
        #[serde(default)]
        output_index: Option<u64>,
    },
    #[serde(rename = "response.output_item.done")]
    OutputItemDone {
        item: OutputItem,
        #[serde(default)]
        output_index: Option<u64>,
    },
    #[serde(rename = "response.content_part.added")]
    ContentPartAdded { part: ContentPart },
    #[serde(rename = "response.content_part.done")]
    ContentPartDone { part: ContentPart },
    #[serde(rename = "response.function_call_arguments.delta")]
    ArgumentsDelta {
        #[serde(default)]
        item_id: Option<String>,
        #[serde(default)]
        call_id: Option<String>,
        #[serde(default)]
        output_index: Option<u64>,
        #[serde(default)]
        delta: String,
    },
    /// Final argument string for one tool invocation.
    #[serde(rename = "response.function_call_arguments.done")]
    ArgumentsDone {
        #[serde(default)]
        item_id: Option<String>,
        #[serde(default)]
        call_id: Option<String>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        output_index: Option<u64>,
        #[serde(default)]
        arguments: String,
    },
    #[serde(rename = "response.completed")]
    Completed {
        #[serde(default)]
        usage: Option<Usage>,
        #[serde(default)]
        response: Option<ResponseSnapshot>,
    },
    #[serde(other)]
    Unknown,
}

impl ResponseEvent {
    /// Parses one record payload. A parse failure means the record is
    /// malformed and should be skipped, not that decoding must stop.
    pub fn classify(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_text_delta() {
        let event = ResponseEvent::classify(
            r#"{"type":"response.output_text.delta","delta":"Hi"}"#,
        )
        .expect("classify");
        assert_eq!(event, ResponseEvent::OutputTextDelta { delta: "Hi".into() });
    }

    #[test]
    fn classifies_arguments_done_with_both_ids() {
        let event = ResponseEvent::classify(
            r#"{"type":"response.function_call_arguments.done","item_id":"fc_1","call_id":"call_1","name":"lookup","arguments":"{}"}"#,
        )
        .expect("classify");
        assert_eq!(
            event,
            ResponseEvent::ArgumentsDone {
                item_id: Some("fc_1".into()),
                call_id: Some("call_1".into()),
                name: Some("lookup".into()),
                output_index: None,
                arguments: "{}".into(),
            }
        );
    }

    #[test]
    fn classifies_terminal_with_nested_usage() {
        let event = ResponseEvent::classify(
            r#"{"type":"response.completed","response":{"status":"completed","output":[],"usage":{"input_tokens":3,"output_tokens":2,"total_tokens":5}}}"#,
        )
        .expect("classify");
        let ResponseEvent::Completed { usage, response } = event else {
            panic!("expected terminal event");
        };
        assert!(usage.is_none());
        let snapshot = response.expect("snapshot");
        assert_eq!(snapshot.usage.expect("usage").total_tokens, 5);
        assert_eq!(snapshot.status.as_deref(), Some("completed"));
    }

    #[test]
    fn unknown_kind_is_tolerated() {
        let event = ResponseEvent::classify(r#"{"type":"response.audio.delta","delta":"x"}"#)
            .expect("classify");
        assert_eq!(event, ResponseEvent::Unknown);
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(ResponseEvent::classify("{not json").is_err());
        assert!(ResponseEvent::classify(r#"{"delta":"no kind"}"#).is_err());
    }
}
