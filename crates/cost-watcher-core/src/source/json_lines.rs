//! Newline-delimited JSON event source
//!
//! Each non-blank line is one event: `{"service": "EC2", "cost": 150.0}`.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::{EventSource, SourceError};
use crate::models::SpendEvent;

/// Reads spend events from a file, a pipe or stdin
#[derive(Debug)]
pub struct JsonLinesSource<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R> JsonLinesSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    /// Create a source reading from the given buffered reader
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }

    /// Number of lines consumed so far, blank lines included
    pub fn lines_read(&self) -> usize {
        self.line_no
    }
}

#[async_trait]
impl<R> EventSource for JsonLinesSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next(&mut self, cancel: &CancellationToken) -> Result<SpendEvent, SourceError> {
        loop {
            let line = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SourceError::Cancelled),
                line = self.lines.next_line() => line?,
            };

            let Some(line) = line else {
                return Err(SourceError::Exhausted);
            };
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let event: SpendEvent =
                serde_json::from_str(trimmed).map_err(|source| SourceError::Decode {
                    line: self.line_no,
                    source,
                })?;
            event
                .validate()
                .map_err(|reason| SourceError::InvalidEvent {
                    line: self.line_no,
                    reason,
                })?;

            trace!(line = self.line_no, service = %event.service, "Decoded spend event");
            return Ok(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_events_and_skips_blank_lines() {
        let input: &[u8] = b"{\"service\":\"EC2\",\"cost\":150.0}\n\n   \n{\"service\":\"S3\",\"cost\":2.5}\n";
        let cancel = CancellationToken::new();
        let mut source = JsonLinesSource::new(input);

        assert_eq!(source.next(&cancel).await.unwrap(), SpendEvent::new("EC2", 150.0));
        assert_eq!(source.next(&cancel).await.unwrap(), SpendEvent::new("S3", 2.5));
        assert!(source.next(&cancel).await.unwrap_err().is_exhausted());
        assert_eq!(source.lines_read(), 4);
    }

    #[tokio::test]
    async fn test_last_line_without_newline() {
        let input: &[u8] = b"{\"service\":\"EC2\",\"cost\":1}";
        let cancel = CancellationToken::new();
        let mut source = JsonLinesSource::new(input);

        assert_eq!(source.next(&cancel).await.unwrap().cost, 1.0);
        assert!(source.next(&cancel).await.unwrap_err().is_exhausted());
    }

    #[tokio::test]
    async fn test_malformed_line_reports_line_number() {
        let input: &[u8] = b"{\"service\":\"EC2\",\"cost\":1}\nnot json\n";
        let cancel = CancellationToken::new();
        let mut source = JsonLinesSource::new(input);

        source.next(&cancel).await.unwrap();
        let err = source.next(&cancel).await.unwrap_err();
        assert!(matches!(err, SourceError::Decode { line: 2, .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_negative_cost_is_invalid() {
        let input: &[u8] = b"{\"service\":\"EC2\",\"cost\":-4}\n";
        let cancel = CancellationToken::new();
        let mut source = JsonLinesSource::new(input);

        let err = source.next(&cancel).await.unwrap_err();
        assert!(matches!(err, SourceError::InvalidEvent { line: 1, .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_cancelled_before_read() {
        let input: &[u8] = b"{\"service\":\"EC2\",\"cost\":1}\n";
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut source = JsonLinesSource::new(input);

        assert!(matches!(
            source.next(&cancel).await.unwrap_err(),
            SourceError::Cancelled
        ));
        assert_eq!(source.lines_read(), 0);
    }
}
