use bytes::Bytes;
use completion_stream::{ByteStream, CompletionStream, StreamChunk, StreamError, TransportError};
use futures::stream;

const TRANSCRIPT: &[&str] = &[
    "data: {\"type\":\"response.output_text.delta\",\"delta\":\"Checking the weather\"}\n\n",
    "data: {\"type\":\"response.output_text.delta\",\"delta\":\" for you.\"}\n\n",
    "data: {\"type\":\"response.output_text.done\",\"text\":\"Checking the weather for you.\"}\n\n",
    "data: {\"type\":\"response.output_item.added\",\"output_index\":1,\"item\":{\"type\":\"function_call\",\"id\":\"fc_1\",\"name\":\"get_weather\",\"arguments\":\"\"}}\n\n",
    "data: {\"type\":\"response.function_call_arguments.delta\",\"item_id\":\"fc_1\",\"delta\":\"{\\\"city\\\":\"}\n\n",
    "data: {\"type\":\"response.function_call_arguments.delta\",\"item_id\":\"fc_1\",\"delta\":\"\\\"Lisbon\\\"}\"}\n\n",
    "data: {\"type\":\"response.function_call_arguments.done\",\"item_id\":\"fc_1\",\"call_id\":\"call_1\",\"arguments\":\"{\\\"city\\\":\\\"Lisbon\\\"}\"}\n\n",
    "data: {\"type\":\"response.completed\",\"usage\":{\"input_tokens\":42,\"output_tokens\":17,\"total_tokens\":59}}\n\n",
    "data: [DONE]\n\n",
];

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), StreamError> {
    let transport: ByteStream = Box::pin(stream::iter(TRANSCRIPT.iter().map(|chunk| {
        Ok::<_, TransportError>(Bytes::from_static(chunk.as_bytes()))
    })));

    let mut stream = CompletionStream::new(transport);
    while let Some(chunk) = stream.next_chunk().await? {
        match chunk {
            StreamChunk::Content { text } => print!("{text}"),
            StreamChunk::ToolCall(call) => {
                println!("\ntool call {} -> {}({})", call.call_id, call.name, call.arguments);
            }
            StreamChunk::Completed { finish, usage, .. } => {
                println!("finished: {finish:?}, usage: {usage:?}");
            }
        }
    }
    Ok(())
}
