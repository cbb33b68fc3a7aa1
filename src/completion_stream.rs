//! Completion stream that separates text chunks from the final metadata.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;

use crate::error::{Error, Result};
use crate::observability::{STREAM_CHUNKS, STREAM_ERRORS};
use crate::types::{StreamFrame, TurnMetadata};

/// A lazy, finite, non-restartable stream of completion text chunks.
///
/// Yields only the `type: "string"` deltas; the final metadata frame and the
/// legacy stats frame are absorbed as they pass through and exposed via
/// [`metadata`](Self::metadata) and [`tokens_used`](Self::tokens_used) once
/// the stream has been drained. Transport errors surface as `Err` items;
/// every error is terminal for the stream.
pub struct CompletionStream {
    inner: Pin<Box<dyn Stream<Item = Result<StreamFrame>> + Send>>,
    metadata: Option<TurnMetadata>,
    tokens_used: u32,
    failed: bool,
}

impl CompletionStream {
    /// Wraps a frame stream.
    pub fn new<S>(frames: S) -> Self
    where
        S: Stream<Item = Result<StreamFrame>> + Send + 'static,
    {
        Self {
            inner: Box::pin(frames),
            metadata: None,
            tokens_used: 0,
            failed: false,
        }
    }

    /// A stream that yields a single error and ends.
    ///
    /// Used when the request could not be made at all (no token, no session,
    /// or a transport failure before the first byte), so that every failure
    /// reaches the consumer through the same channel.
    pub fn failed(error: Error) -> Self {
        Self::new(futures::stream::once(async move { Err(error) }))
    }

    /// The final metadata frame, available after the stream is drained.
    pub fn metadata(&self) -> Option<&TurnMetadata> {
        self.metadata.as_ref()
    }

    /// Completion tokens reported for the turn, zero until the final frame
    /// arrives.
    pub fn tokens_used(&self) -> u32 {
        self.tokens_used
    }
}

impl Stream for CompletionStream {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if self.failed {
                return Poll::Ready(None);
            }
            match self.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(StreamFrame::String(text)))) => {
                    STREAM_CHUNKS.click();
                    return Poll::Ready(Some(Ok(text)));
                }
                Poll::Ready(Some(Ok(StreamFrame::Object(meta)))) => {
                    if let Some(tokens) = meta.completion_tokens {
                        self.tokens_used = tokens;
                    }
                    self.metadata = Some(meta);
                }
                Poll::Ready(Some(Ok(StreamFrame::Stats(stats)))) => {
                    self.tokens_used = stats.total_token;
                }
                Poll::Ready(Some(Err(e))) => {
                    STREAM_ERRORS.click();
                    self.failed = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StatsFrame;
    use futures::StreamExt;

    fn frame_stream(frames: Vec<Result<StreamFrame>>) -> CompletionStream {
        CompletionStream::new(futures::stream::iter(frames))
    }

    #[tokio::test]
    async fn yields_only_text_chunks() {
        let mut stream = frame_stream(vec![
            Ok(StreamFrame::String("a".to_string())),
            Ok(StreamFrame::Object(TurnMetadata {
                id: Some(7),
                completion_tokens: Some(12),
                ..TurnMetadata::default()
            })),
            Ok(StreamFrame::String("b".to_string())),
        ]);

        let mut chunks = Vec::new();
        while let Some(item) = stream.next().await {
            chunks.push(item.unwrap());
        }
        assert_eq!(chunks, vec!["a", "b"]);
        assert_eq!(stream.tokens_used(), 12);
        assert_eq!(stream.metadata().and_then(|m| m.id), Some(7));
    }

    #[tokio::test]
    async fn stats_frame_updates_tokens() {
        let mut stream = frame_stream(vec![Ok(StreamFrame::Stats(StatsFrame {
            total_token: 99,
        }))]);
        assert!(stream.next().await.is_none());
        assert_eq!(stream.tokens_used(), 99);
    }

    #[tokio::test]
    async fn failed_stream_yields_single_error() {
        let mut stream = CompletionStream::failed(Error::validation(
            "no session selected",
            Some("session".to_string()),
        ));
        let first = stream.next().await.unwrap();
        assert!(first.unwrap_err().is_validation());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn error_terminates_stream() {
        let mut stream = frame_stream(vec![
            Ok(StreamFrame::String("partial".to_string())),
            Err(Error::streaming("connection reset", None)),
            Ok(StreamFrame::String("never seen".to_string())),
        ]);
        assert_eq!(stream.next().await.unwrap().unwrap(), "partial");
        assert!(stream.next().await.unwrap().is_err());
        assert!(stream.next().await.is_none());
    }
}
