//! Blank-line framing of the raw event stream.

const DATA_PREFIX: &str = "data:";
const END_SENTINEL: &str = "[DONE]";

/// One framed unit of the input, reduced to its payload line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawRecord {
    pub payload: String,
}

/// Splits successive byte buffers into discrete records.
///
/// Bytes accumulate across `push` calls; a record is complete once a
/// blank-line delimiter arrives. Anything after the last delimiter stays
/// buffered for the next call and is discarded if the stream ends first.
#[derive(Default)]
pub(crate) struct SseFramer {
    buf: Vec<u8>,
}

impl SseFramer {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<RawRecord> {
        self.buf.extend_from_slice(chunk);
        let mut records = Vec::new();
        while let Some((idx, delim_len)) = find_record_delimiter(&self.buf) {
            let record_bytes = self.buf[..idx].to_vec();
            self.buf.drain(..idx + delim_len);
            if let Some(record) = parse_record(&record_bytes) {
                records.push(record);
            }
        }
        records
    }
}

fn find_record_delimiter(buf: &[u8]) -> Option<(usize, usize)> {
    let mut i = 0;
    while i + 1 < buf.len() {
        if buf[i] == b'\n' && buf[i + 1] == b'\n' {
            return Some((i, 2));
        }
        if i + 3 < buf.len()
            && buf[i] == b'\r'
            && buf[i + 1] == b'\n'
            && buf[i + 2] == b'\r'
            && buf[i + 3] == b'\n'
        {
            return Some((i, 4));
        }
        i += 1;
    }
    None
}

/// Extracts the payload from one record.
///
/// Only the first `data:` line counts as payload; comment and metadata lines
/// are never merged into it. The end-of-stream sentinel produces no record.
fn parse_record(bytes: &[u8]) -> Option<RawRecord> {
    if bytes.is_empty() {
        return None;
    }
    let text = String::from_utf8_lossy(bytes);
    for raw_line in text.split('\n') {
        let line = raw_line.trim_end_matches('\r');
        if let Some(rest) = line.strip_prefix(DATA_PREFIX) {
            let payload = rest.trim_start();
            if payload == END_SENTINEL {
                return None;
            }
            return Some(RawRecord {
                payload: payload.to_string(),
            });
        }
    }
    None
}
