//! Decoder for an incremental, event-based completion protocol delivered
//! over a persistent stream.
//!
//! The decoder turns a raw byte stream into a clean, ordered sequence of
//! semantic chunks: text fragments, completed tool invocations, and a single
//! terminal summary. Along the way it absorbs the real-world messiness of
//! such APIs: fields split across events, identifiers assigned
//! asynchronously, and the same content reported more than once through
//! different event shapes.
//!
//! # Usage
//!
//! The caller opens the connection (auth, request body, timeouts) and hands
//! the decoder the response body:
//!
//! ```no_run
//! use completion_stream::{CompletionStream, StreamChunk, StreamError};
//!
//! # async fn demo(response: reqwest::Response) -> Result<(), StreamError> {
//! let mut stream = CompletionStream::from_response(response);
//! while let Some(chunk) = stream.next_chunk().await? {
//!     match chunk {
//!         StreamChunk::Content { text } => print!("{text}"),
//!         StreamChunk::ToolCall(call) => println!("{}({})", call.name, call.arguments),
//!         StreamChunk::Completed { finish, .. } => println!("[{finish:?}]"),
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Tool-call correlation and assembly.
mod calls;
/// Decoded output chunk types.
pub mod chunk;
/// Pull-based decoding loop.
pub mod decoder;
/// Public error types.
pub mod errors;
/// Typed protocol events and their classification.
mod events;
/// Blank-line framing of the raw stream.
mod sse;
/// De-duplicating text accumulation.
mod text;
/// Transport seam and adapters.
pub mod transport;

pub use chunk::{FinishReason, StreamChunk, ToolCall, Usage};
pub use decoder::CompletionStream;
pub use errors::StreamError;
pub use transport::{ByteStream, TransportError};
