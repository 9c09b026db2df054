//! Assembly of tool invocations from fragments spread across events.

use std::collections::HashMap;

use crate::chunk::ToolCall;

/// Mutable slot for one in-flight tool invocation.
///
/// Empty strings mean "not yet reported". Identifiers and the name are
/// set-only; only the argument buffer is ever rewritten.
#[derive(Debug, Default)]
struct CallRecord {
    item_id: String,
    call_id: String,
    name: String,
    arguments: String,
    delivered: bool,
}

impl CallRecord {
    fn eligible(&self) -> bool {
        !self.delivered
            && !self.call_id.is_empty()
            && !self.name.is_empty()
            && !self.arguments.is_empty()
    }
}

/// Argument payload carried by one event.
pub(crate) enum ArgUpdate<'a> {
    None,
    /// Incremental fragment appended to the buffer.
    Append(&'a str),
    /// Final argument string replacing the buffer outright.
    Replace(&'a str),
}

/// Identity and field fragments carried by one event.
pub(crate) struct CallUpdate<'a> {
    pub item_id: Option<&'a str>,
    pub call_id: Option<&'a str>,
    pub name: Option<&'a str>,
    pub output_index: Option<u64>,
    pub arguments: ArgUpdate<'a>,
}

/// Correlates tool-call fragments into records addressable by either id.
///
/// Records live in an append-only arena. The two id maps and the
/// output-position fallback map all point at the same slot, so a fragment
/// arriving under the other key still lands on the record it belongs to,
/// and a key learned late is backfilled into its index on arrival.
#[derive(Default)]
pub(crate) struct CallAssembler {
    slots: Vec<CallRecord>,
    by_item: HashMap<String, usize>,
    by_call: HashMap<String, usize>,
    by_position: HashMap<u64, usize>,
    delivered_any: bool,
}

impl CallAssembler {
    /// Applies one event's fragments and returns the completed invocation
    /// the moment its record first holds a call id, a name, and arguments.
    /// A record fires at most once; later updates never re-emit it.
    pub fn apply(&mut self, update: CallUpdate<'_>) -> Option<ToolCall> {
        let slot = self.resolve(&update);

        if let Some(item_id) = nonempty(update.item_id) {
            self.by_item.entry(item_id.to_string()).or_insert(slot);
        }
        if let Some(call_id) = nonempty(update.call_id) {
            self.by_call.entry(call_id.to_string()).or_insert(slot);
        }
        if let Some(position) = update.output_index {
            self.by_position.entry(position).or_insert(slot);
        }

        let record = &mut self.slots[slot];
        if record.item_id.is_empty()
            && let Some(item_id) = nonempty(update.item_id)
        {
            record.item_id = item_id.to_string();
        }
        if record.call_id.is_empty()
            && let Some(call_id) = nonempty(update.call_id)
        {
            record.call_id = call_id.to_string();
        }
        if record.name.is_empty()
            && let Some(name) = nonempty(update.name)
        {
            record.name = name.to_string();
        }
        match update.arguments {
            ArgUpdate::Append(fragment) => record.arguments.push_str(fragment),
            ArgUpdate::Replace(arguments) if !arguments.is_empty() => {
                record.arguments = arguments.to_string();
            }
            _ => {}
        }

        if record.eligible() {
            record.delivered = true;
            self.delivered_any = true;
            return Some(ToolCall {
                call_id: record.call_id.clone(),
                name: record.name.clone(),
                arguments: record.arguments.clone(),
            });
        }
        None
    }

    /// True once any record has produced a chunk.
    pub fn delivered_any(&self) -> bool {
        self.delivered_any
    }

    fn resolve(&mut self, update: &CallUpdate<'_>) -> usize {
        if let Some(item_id) = nonempty(update.item_id)
            && let Some(&slot) = self.by_item.get(item_id)
        {
            return slot;
        }
        if let Some(call_id) = nonempty(update.call_id)
            && let Some(&slot) = self.by_call.get(call_id)
        {
            return slot;
        }
        // Position keying only applies to events that carry no id at all.
        if nonempty(update.item_id).is_none()
            && nonempty(update.call_id).is_none()
            && let Some(position) = update.output_index
            && let Some(&slot) = self.by_position.get(&position)
        {
            return slot;
        }
        self.slots.push(CallRecord::default());
        self.slots.len() - 1
    }
}

fn nonempty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update<'a>() -> CallUpdate<'a> {
        CallUpdate {
            item_id: None,
            call_id: None,
            name: None,
            output_index: None,
            arguments: ArgUpdate::None,
        }
    }

    #[test]
    fn late_correlation_id_completes_the_record() {
        let mut calls = CallAssembler::default();
        assert!(calls
            .apply(CallUpdate {
                item_id: Some("fc_1"),
                name: Some("lookup"),
                ..update()
            })
            .is_none());
        let call = calls
            .apply(CallUpdate {
                item_id: Some("fc_1"),
                call_id: Some("call_1"),
                arguments: ArgUpdate::Replace("{}"),
                ..update()
            })
            .expect("completes on the event that fills the last field");
        assert_eq!(call.call_id, "call_1");
        assert_eq!(call.name, "lookup");
        assert_eq!(call.arguments, "{}");
    }

    #[test]
    fn fragments_under_either_key_land_on_one_record() {
        let mut calls = CallAssembler::default();
        calls.apply(CallUpdate {
            item_id: Some("fc_1"),
            call_id: Some("call_1"),
            ..update()
        });
        calls.apply(CallUpdate {
            call_id: Some("call_1"),
            name: Some("search"),
            ..update()
        });
        let call = calls
            .apply(CallUpdate {
                item_id: Some("fc_1"),
                arguments: ArgUpdate::Replace(r#"{"q":"rust"}"#),
                ..update()
            })
            .expect("single record assembled across keys");
        assert_eq!(call.call_id, "call_1");
        assert_eq!(call.name, "search");
    }

    #[test]
    fn argument_deltas_concatenate_and_final_replaces() {
        let mut calls = CallAssembler::default();
        calls.apply(CallUpdate {
            item_id: Some("fc_1"),
            arguments: ArgUpdate::Append(r#"{"q":"#),
            ..update()
        });
        calls.apply(CallUpdate {
            item_id: Some("fc_1"),
            arguments: ArgUpdate::Append(r#""ru"#),
            ..update()
        });
        let call = calls
            .apply(CallUpdate {
                item_id: Some("fc_1"),
                call_id: Some("call_1"),
                name: Some("search"),
                arguments: ArgUpdate::Replace(r#"{"q":"rust"}"#),
                ..update()
            })
            .expect("eligible after final arguments");
        assert_eq!(call.arguments, r#"{"q":"rust"}"#);
    }

    #[test]
    fn delivered_record_never_fires_again() {
        let mut calls = CallAssembler::default();
        let first = CallUpdate {
            item_id: Some("fc_1"),
            call_id: Some("call_1"),
            name: Some("save"),
            arguments: ArgUpdate::Replace("{}"),
            ..update()
        };
        assert!(calls.apply(first).is_some());
        let duplicate = calls.apply(CallUpdate {
            item_id: Some("fc_1"),
            call_id: Some("call_1"),
            name: Some("save"),
            arguments: ArgUpdate::Replace("{}"),
            ..update()
        });
        assert!(duplicate.is_none());
        assert!(calls.delivered_any());
    }

    #[test]
    fn record_without_correlation_id_never_fires() {
        let mut calls = CallAssembler::default();
        let result = calls.apply(CallUpdate {
            item_id: Some("fc_1"),
            name: Some("orphan"),
            arguments: ArgUpdate::Replace("{}"),
            ..update()
        });
        assert!(result.is_none());
        assert!(!calls.delivered_any());
    }

    #[test]
    fn idless_fragment_falls_back_to_output_position() {
        let mut calls = CallAssembler::default();
        calls.apply(CallUpdate {
            item_id: Some("fc_1"),
            call_id: Some("call_1"),
            name: Some("search"),
            output_index: Some(0),
            ..update()
        });
        let call = calls
            .apply(CallUpdate {
                output_index: Some(0),
                arguments: ArgUpdate::Append("{}"),
                ..update()
            })
            .expect("position keyed fragment reaches the record");
        assert_eq!(call.call_id, "call_1");
    }

    #[test]
    fn empty_final_arguments_do_not_clobber_the_buffer() {
        let mut calls = CallAssembler::default();
        calls.apply(CallUpdate {
            item_id: Some("fc_1"),
            arguments: ArgUpdate::Append("{}"),
            ..update()
        });
        let call = calls
            .apply(CallUpdate {
                item_id: Some("fc_1"),
                call_id: Some("call_1"),
                name: Some("noop"),
                arguments: ArgUpdate::Replace(""),
                ..update()
            })
            .expect("accumulated buffer still counts");
        assert_eq!(call.arguments, "{}");
    }
}
