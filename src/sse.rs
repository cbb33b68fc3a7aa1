//! Server-Sent Events processing for the completion stream.
//!
//! The completion endpoint streams line-oriented SSE: every meaningful line
//! starts with a `data:` prefix and carries either a JSON frame or the
//! literal `[DONE]` terminator. This module turns the raw byte stream into a
//! stream of [`StreamFrame`]s, buffering partial lines across network chunks.
//!
//! Tolerance policy: lines that are not `data:`-prefixed, payloads that fail
//! to parse as JSON, and frames with an unrecognized tag are all silently
//! skipped. The service adds event types over time and old clients are
//! expected to ignore what they do not understand.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};

use crate::error::{Error, Result};
use crate::observability::{STREAM_FRAMES, STREAM_SKIPPED_LINES};
use crate::types::StreamFrame;

/// Prefix of a meaningful SSE line.
const DATA_PREFIX: &str = "data:";

/// Payload that terminates the stream.
const DONE_PAYLOAD: &str = "[DONE]";

/// Process a stream of bytes into a stream of completion frames.
///
/// The stream ends when the `[DONE]` terminator arrives or the underlying
/// byte stream is exhausted, whichever comes first. Transport errors are
/// yielded as stream items; skipped lines are not surfaced at all.
pub fn process_frames<S>(byte_stream: S) -> impl Stream<Item = Result<StreamFrame>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + 'static,
{
    // Convert reqwest errors to our error type
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    // Use a state machine to process the SSE stream
    let buffer = String::new();

    stream::unfold(
        (stream, buffer, false),
        move |(mut stream, mut buffer, mut done)| async move {
            loop {
                if done {
                    return None;
                }

                // Drain complete lines already in the buffer
                while let Some((line, remaining)) = take_line(&buffer) {
                    let remaining = remaining.to_string();
                    match decode_line(&line) {
                        LineOutcome::Frame(frame) => {
                            buffer = remaining;
                            STREAM_FRAMES.click();
                            return Some((Ok(frame), (stream, buffer, done)));
                        }
                        LineOutcome::Done => {
                            return None;
                        }
                        LineOutcome::Skip => {
                            STREAM_SKIPPED_LINES.click();
                            buffer = remaining;
                        }
                    }
                }

                // Read more data
                match stream.next().await {
                    Some(Ok(bytes)) => match String::from_utf8(bytes.to_vec()) {
                        Ok(text) => buffer.push_str(&text),
                        Err(e) => {
                            return Some((
                                Err(Error::encoding(
                                    format!("Invalid UTF-8 in stream: {e}"),
                                    Some(Box::new(e)),
                                )),
                                (stream, buffer, done),
                            ));
                        }
                    },
                    Some(Err(e)) => {
                        return Some((Err(e), (stream, buffer, done)));
                    }
                    None => {
                        // End of stream: the remainder is one final, unterminated line.
                        done = true;
                        if !buffer.is_empty() {
                            let line = std::mem::take(&mut buffer);
                            match decode_line(line.trim_end_matches('\r')) {
                                LineOutcome::Frame(frame) => {
                                    STREAM_FRAMES.click();
                                    return Some((Ok(frame), (stream, buffer, done)));
                                }
                                LineOutcome::Done | LineOutcome::Skip => return None,
                            }
                        }
                        return None;
                    }
                }
            }
        },
    )
}

enum LineOutcome {
    Frame(StreamFrame),
    Done,
    Skip,
}

/// Splits the first complete line off the buffer, handling CRLF.
fn take_line(buffer: &str) -> Option<(String, &str)> {
    let at = buffer.find('\n')?;
    let line = buffer[..at].trim_end_matches('\r').to_string();
    Some((line, &buffer[at + 1..]))
}

/// Decodes one SSE line into a frame, the terminator, or a skip.
fn decode_line(line: &str) -> LineOutcome {
    let Some(payload) = line.strip_prefix(DATA_PREFIX).map(str::trim) else {
        return LineOutcome::Skip;
    };
    if payload == DONE_PAYLOAD {
        return LineOutcome::Done;
    }
    match serde_json::from_str::<StreamFrame>(payload) {
        Ok(frame) => LineOutcome::Frame(frame),
        // Unknown tags and malformed payloads are dropped, not surfaced.
        Err(_) => LineOutcome::Skip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn byte_stream(
        chunks: Vec<&'static [u8]>,
    ) -> impl Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin {
        Box::pin(stream::iter(
            chunks.into_iter().map(|c| Ok(Bytes::from(c))),
        ))
    }

    async fn collect_frames(chunks: Vec<&'static [u8]>) -> Vec<Result<StreamFrame>> {
        process_frames(byte_stream(chunks)).collect().await
    }

    #[tokio::test]
    async fn text_frames_in_order() {
        let frames = collect_frames(vec![
            b"data: {\"type\":\"string\",\"data\":\"hel\"}\n",
            b"data: {\"type\":\"string\",\"data\":\"lo\"}\ndata: [DONE]\n",
        ])
        .await;
        let texts: Vec<String> = frames
            .into_iter()
            .map(|f| match f.unwrap() {
                StreamFrame::String(s) => s,
                other => panic!("unexpected frame {other:?}"),
            })
            .collect();
        assert_eq!(texts, vec!["hel", "lo"]);
    }

    #[tokio::test]
    async fn unparseable_payloads_yield_nothing() {
        // `no-op` is not JSON; the stream ends cleanly with zero frames.
        let frames = collect_frames(vec![b"data: no-op\n", b"data: [DONE]\n"]).await;
        assert!(frames.is_empty());
    }

    #[tokio::test]
    async fn unknown_frame_tags_are_skipped() {
        let frames = collect_frames(vec![
            b"data: {\"type\":\"telemetry\",\"data\":{}}\n",
            b"data: {\"type\":\"string\",\"data\":\"kept\"}\n",
            b"data: [DONE]\n",
        ])
        .await;
        assert_eq!(frames.len(), 1);
        assert!(matches!(&frames[0], Ok(StreamFrame::String(s)) if s == "kept"));
    }

    #[tokio::test]
    async fn non_data_lines_are_skipped() {
        let frames = collect_frames(vec![
            b": keepalive\n\n",
            b"event: message\n",
            b"data: {\"type\":\"string\",\"data\":\"x\"}\n",
        ])
        .await;
        assert_eq!(frames.len(), 1);
    }

    #[tokio::test]
    async fn line_split_across_chunks() {
        let frames = collect_frames(vec![
            b"data: {\"type\":\"str",
            b"ing\",\"data\":\"joined\"}\n",
            b"data: [DONE]\n",
        ])
        .await;
        assert_eq!(frames.len(), 1);
        assert!(matches!(&frames[0], Ok(StreamFrame::String(s)) if s == "joined"));
    }

    #[tokio::test]
    async fn nothing_after_done_is_decoded() {
        let frames = collect_frames(vec![
            b"data: [DONE]\ndata: {\"type\":\"string\",\"data\":\"late\"}\n",
        ])
        .await;
        assert!(frames.is_empty());
    }

    #[tokio::test]
    async fn final_line_without_newline_is_processed() {
        let frames = collect_frames(vec![b"data: {\"type\":\"string\",\"data\":\"tail\"}"]).await;
        assert_eq!(frames.len(), 1);
        assert!(matches!(&frames[0], Ok(StreamFrame::String(s)) if s == "tail"));
    }

    #[tokio::test]
    async fn crlf_lines_decode() {
        let frames = collect_frames(vec![
            b"data: {\"type\":\"string\",\"data\":\"x\"}\r\ndata: [DONE]\r\n",
        ])
        .await;
        assert_eq!(frames.len(), 1);
    }
}
