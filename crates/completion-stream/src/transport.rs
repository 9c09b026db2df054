//! Transport seam between the caller-owned connection and the decoder.
//!
//! The decoder never opens connections: authentication, request
//! construction, timeouts, and closing all belong to the caller, who hands
//! over an already-open byte stream.

use std::error::Error;
use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt as _};

/// Error produced by the underlying transport.
pub type TransportError = Box<dyn Error + Send + Sync + 'static>;

/// An open byte stream handed to the decoder by its caller.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send + 'static>>;

/// Adapts the body of an established HTTP response into a `ByteStream`.
pub fn response_bytes(response: reqwest::Response) -> ByteStream {
    Box::pin(
        response
            .bytes_stream()
            .map(|result| result.map_err(|error| Box::new(error) as TransportError)),
    )
}
