/// Token accounting reported by the terminal event.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Usage {
    /// Tokens consumed by the prompt.
    #[serde(default)]
    pub input_tokens: u64,
    /// Tokens produced by the generation.
    #[serde(default)]
    pub output_tokens: u64,
    /// Reasoning tokens, when the model reports them separately.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_tokens: Option<u64>,
    /// Total tokens for the exchange.
    #[serde(default)]
    pub total_tokens: u64,
}

/// Why generation stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The model finished its reply.
    Stop,
    /// The model stopped to wait for tool results.
    ToolCalls,
}

/// A fully assembled tool invocation.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ToolCall {
    /// Correlation id that downstream consumers echo back with the result.
    pub call_id: String,
    /// Tool name as declared by the model.
    pub name: String,
    /// Raw JSON argument string.
    pub arguments: String,
}

/// One decoded unit of model output.
///
/// This is the only type crossing the decoder boundary. Chunks arrive in
/// generation order; `Completed` is always last.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum StreamChunk {
    /// Incremental text content, already de-duplicated against snapshots.
    Content { text: String },
    /// A tool invocation whose id, name, and arguments are all known.
    ToolCall(ToolCall),
    /// Terminal chunk; only end-of-stream follows.
    Completed {
        finish: FinishReason,
        usage: Option<Usage>,
        /// Text that surfaced only in the final response snapshot.
        text: Option<String>,
    },
}
