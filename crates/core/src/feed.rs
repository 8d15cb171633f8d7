//! Sources of change batches.

use std::io::BufRead;

use thiserror::Error;

use crate::model::ChangeBatch;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("reading change feed: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: malformed change batch: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// A single-consumer stream of change batches, in delivery order.
///
/// `None` means the feed is exhausted.
pub trait ChangeFeed {
    fn next_batch(&mut self) -> Option<Result<ChangeBatch, FeedError>>;
}

/// Reads one batch per line, each a JSON array of
/// `{"type": ..., "doc": {...}}` objects. Blank lines are skipped.
#[derive(Debug)]
pub struct JsonLinesFeed<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> JsonLinesFeed<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> ChangeFeed for JsonLinesFeed<R> {
    fn next_batch(&mut self) -> Option<Result<ChangeBatch, FeedError>> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(err) => return Some(Err(err.into())),
            }
            self.line += 1;
            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }
            return Some(
                ChangeBatch::from_json_str(text).map_err(|source| FeedError::Json {
                    line: self.line,
                    source,
                }),
            );
        }
    }
}

/// Adapts any iterator of batches, e.g. a channel receiver's iterator.
#[derive(Debug)]
pub struct IterFeed<I>(pub I);

impl<I: Iterator<Item = ChangeBatch>> ChangeFeed for IterFeed<I> {
    fn next_batch(&mut self) -> Option<Result<ChangeBatch, FeedError>> {
        self.0.next().map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_one_batch_per_line_skipping_blanks() {
        let input = concat!(
            r#"[{"type": "added", "doc": {"id": "1", "date": "2024-01-02", "distance": 5, "activity": "run"}}]"#,
            "\n\n",
            r#"[{"type": "removed", "doc": {"id": "1"}}]"#,
            "\n",
        );
        let mut feed = JsonLinesFeed::new(input.as_bytes());
        assert_eq!(feed.next_batch().unwrap().unwrap().len(), 1);
        assert_eq!(feed.next_batch().unwrap().unwrap().len(), 1);
        assert!(feed.next_batch().is_none());
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let input = "[]\nnot json\n";
        let mut feed = JsonLinesFeed::new(input.as_bytes());
        assert!(feed.next_batch().unwrap().is_ok());
        match feed.next_batch() {
            Some(Err(FeedError::Json { line, .. })) => assert_eq!(line, 2),
            other => panic!("expected a JSON error, got {other:?}"),
        }
    }
}
