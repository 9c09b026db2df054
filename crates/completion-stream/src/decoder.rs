//! Pull-based decoding loop and terminal-event reconciliation.

use std::collections::VecDeque;

use futures::StreamExt as _;
use futures::stream;
use tracing::debug;

use crate::calls::{ArgUpdate, CallAssembler, CallUpdate};
use crate::chunk::{FinishReason, StreamChunk, Usage};
use crate::errors::StreamError;
use crate::events::{OutputItem, ResponseEvent, ResponseSnapshot};
use crate::sse::{RawRecord, SseFramer};
use crate::text::TextTracker;
use crate::transport::ByteStream;

const ITEM_KIND_FUNCTION_CALL: &str = "function_call";
const ITEM_KIND_MESSAGE: &str = "message";
const PART_KIND_OUTPUT_TEXT: &str = "output_text";

/// Decodes one completion stream into an ordered sequence of `StreamChunk`s.
///
/// The decoder is single-consumer and does nothing unless pulled: each
/// `next_chunk` call returns from the pending queue when it can and
/// otherwise awaits exactly one transport read. Sharing an instance across
/// concurrent callers is out of contract.
pub struct CompletionStream {
    transport: ByteStream,
    framer: SseFramer,
    text: TextTracker,
    calls: CallAssembler,
    pending: VecDeque<StreamChunk>,
    finished: bool,
    exhausted: bool,
}

impl CompletionStream {
    /// Wraps an already-open transport.
    pub fn new(transport: ByteStream) -> Self {
        Self {
            transport,
            framer: SseFramer::default(),
            text: TextTracker::default(),
            calls: CallAssembler::default(),
            pending: VecDeque::new(),
            finished: false,
            exhausted: false,
        }
    }

    /// Wraps the body of an established HTTP response.
    pub fn from_response(response: reqwest::Response) -> Self {
        Self::new(crate::transport::response_bytes(response))
    }

    /// Returns the next decoded chunk, or `Ok(None)` once the pending queue
    /// and the underlying input are both exhausted.
    ///
    /// A transport failure is fatal: it is returned immediately and the
    /// decoder must not be pulled again afterwards.
    pub async fn next_chunk(&mut self) -> Result<Option<StreamChunk>, StreamError> {
        loop {
            if let Some(chunk) = self.pending.pop_front() {
                return Ok(Some(chunk));
            }
            if self.exhausted {
                return Ok(None);
            }
            match self.transport.next().await {
                Some(Ok(bytes)) => {
                    for record in self.framer.push(&bytes) {
                        self.handle_record(&record);
                    }
                }
                Some(Err(error)) => {
                    self.exhausted = true;
                    return Err(StreamError::transport(format!(
                        "streaming read failed: {error}"
                    )));
                }
                None => self.exhausted = true,
            }
        }
    }

    /// Adapts the decoder into a `futures::Stream` of chunks.
    pub fn into_stream(
        self,
    ) -> impl futures::Stream<Item = Result<StreamChunk, StreamError>> + Send {
        stream::try_unfold(self, |mut decoder| async move {
            match decoder.next_chunk().await? {
                Some(chunk) => Ok(Some((chunk, decoder))),
                None => Ok(None),
            }
        })
    }

    /// Drops the transport and all decoder state. No further pulls are
    /// possible once closed.
    pub fn close(self) {}

    fn handle_record(&mut self, record: &RawRecord) {
        if self.finished {
            debug!("ignoring record after terminal event");
            return;
        }
        let event = match ResponseEvent::classify(&record.payload) {
            Ok(event) => event,
            Err(error) => {
                debug!(%error, "skipping undecodable record");
                return;
            }
        };
        self.handle_event(event);
    }

    fn handle_event(&mut self, event: ResponseEvent) {
        match event {
            ResponseEvent::OutputTextDelta { delta } => {
                if self.text.apply_delta(&delta) {
                    self.pending.push_back(StreamChunk::Content { text: delta });
                }
            }
            ResponseEvent::OutputTextDone { text } => self.push_snapshot_text(&text),
            ResponseEvent::ContentPartAdded { part } | ResponseEvent::ContentPartDone { part } => {
                if part.kind == PART_KIND_OUTPUT_TEXT {
                    self.push_snapshot_text(&part.text);
                }
            }
            ResponseEvent::OutputItemAdded { item, output_index }
            | ResponseEvent::OutputItemDone { item, output_index } => {
                if item.kind == ITEM_KIND_FUNCTION_CALL {
                    let mut update = call_update_from_item(&item);
                    update.output_index = output_index;
                    self.push_call_update(update);
                }
            }
            ResponseEvent::ArgumentsDelta {
                item_id,
                call_id,
                output_index,
                delta,
            } => {
                self.push_call_update(CallUpdate {
                    item_id: item_id.as_deref(),
                    call_id: call_id.as_deref(),
                    name: None,
                    output_index,
                    arguments: ArgUpdate::Append(&delta),
                });
            }
            ResponseEvent::ArgumentsDone {
                item_id,
                call_id,
                name,
                output_index,
                arguments,
            } => {
                self.push_call_update(CallUpdate {
                    item_id: item_id.as_deref(),
                    call_id: call_id.as_deref(),
                    name: name.as_deref(),
                    output_index,
                    arguments: ArgUpdate::Replace(&arguments),
                });
            }
            ResponseEvent::Completed { usage, response } => self.finalize(usage, response),
            ResponseEvent::Unknown => {}
        }
    }

    fn push_snapshot_text(&mut self, snapshot: &str) {
        if let Some(text) = self.text.apply_snapshot(snapshot) {
            self.pending.push_back(StreamChunk::Content { text });
        }
    }

    fn push_call_update(&mut self, update: CallUpdate<'_>) {
        if let Some(call) = self.calls.apply(update) {
            debug!(call_id = %call.call_id, name = %call.name, "tool call assembled");
            self.pending.push_back(StreamChunk::ToolCall(call));
        }
    }

    /// Reconciles the terminal event: resolves usage, emits anything the
    /// final snapshot saw that the incremental events did not, and queues
    /// the terminal chunk last.
    fn finalize(&mut self, usage: Option<Usage>, response: Option<ResponseSnapshot>) {
        let mut usage = usage;
        let mut trailing_text: Option<String> = None;

        if let Some(snapshot) = response {
            if usage.is_none() {
                usage = snapshot.usage;
            }
            let mut message_text = String::new();
            for item in &snapshot.output {
                match item.kind.as_str() {
                    ITEM_KIND_FUNCTION_CALL => self.push_call_update(call_update_from_item(item)),
                    ITEM_KIND_MESSAGE => {
                        for part in &item.content {
                            if part.kind == PART_KIND_OUTPUT_TEXT {
                                message_text.push_str(&part.text);
                            }
                        }
                    }
                    _ => {}
                }
            }
            if !message_text.is_empty() {
                trailing_text = self.text.apply_snapshot(&message_text);
            }
            debug!(status = ?snapshot.status, "terminal snapshot reconciled");
        }

        let finish = if self.calls.delivered_any() {
            FinishReason::ToolCalls
        } else {
            FinishReason::Stop
        };
        debug!(?finish, "terminal chunk queued");
        self.pending.push_back(StreamChunk::Completed {
            finish,
            usage,
            text: trailing_text,
        });
        self.finished = true;
    }
}

fn call_update_from_item(item: &OutputItem) -> CallUpdate<'_> {
    CallUpdate {
        item_id: item.id.as_deref(),
        call_id: item.call_id.as_deref(),
        name: item.name.as_deref(),
        output_index: None,
        arguments: match item.arguments.as_deref() {
            Some(arguments) => ArgUpdate::Replace(arguments),
            None => ArgUpdate::None,
        },
    }
}
