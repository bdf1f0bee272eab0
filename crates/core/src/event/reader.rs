//! Event log readers.
//!
//! A log is either a single JSON array of event objects or one JSON object per
//! line (blank lines ignored). Newline-delimited logs are decoded lazily so a
//! long capture never has to be held in memory.

use std::io::{self, BufRead};
use std::vec;

use serde::Deserialize;

use super::StageEvent;
use crate::common::error::TraceError;

/// Layout of an event log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
pub enum InputFormat {
    /// Detect from the first non-whitespace byte: `[` selects [`Array`](Self::Array).
    #[default]
    #[serde(alias = "auto")]
    Auto,
    /// A single JSON array of event objects.
    #[serde(alias = "array", alias = "json")]
    Array,
    /// One JSON object per line.
    #[serde(alias = "lines", alias = "ndjson", alias = "jsonl")]
    Lines,
}

/// Skips leading whitespace and reports the detected layout together with
/// the number of line breaks consumed.
fn sniff<R: BufRead>(reader: &mut R) -> io::Result<(InputFormat, usize)> {
    let mut newlines = 0;
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok((InputFormat::Lines, newlines));
        }

        match buf.iter().position(|b| !b.is_ascii_whitespace()) {
            Some(pos) => {
                let first = buf[pos];
                newlines += buf[..pos].iter().filter(|&&b| b == b'\n').count();
                reader.consume(pos);
                let format = if first == b'[' {
                    InputFormat::Array
                } else {
                    InputFormat::Lines
                };
                return Ok((format, newlines));
            }
            None => {
                let len = buf.len();
                newlines += buf.iter().filter(|&&b| b == b'\n').count();
                reader.consume(len);
            }
        }
    }
}

/// Lazy decoder for newline-delimited logs.
///
/// Yields one event per non-blank line; a line that fails to decode yields
/// [`TraceError::Parse`] with its 1-based line number.
#[derive(Debug)]
pub struct EventLines<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> EventLines<R> {
    /// Wraps a reader positioned at the start of the log.
    pub fn new(reader: R) -> Self {
        Self::starting_at(reader, 0)
    }

    fn starting_at(reader: R, line: usize) -> Self {
        Self {
            reader,
            line,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for EventLines<R> {
    type Item = Result<StageEvent, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            self.line += 1;

            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }
            let line = self.line;
            return Some(serde_json::from_str(text).map_err(|source| TraceError::Parse { line, source }));
        }
    }
}

/// Events of an opened log, in log order.
#[derive(Debug)]
pub enum EventStream<R> {
    /// Events of an array log, decoded up front.
    Array(vec::IntoIter<StageEvent>),
    /// Events of a newline-delimited log, decoded on demand.
    Lines(EventLines<R>),
}

impl<R: BufRead> Iterator for EventStream<R> {
    type Item = Result<StageEvent, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Array(events) => events.next().map(Ok),
            Self::Lines(lines) => lines.next(),
        }
    }
}

/// Opens an event log.
///
/// An array log is decoded completely before the first event is returned; a
/// newline-delimited log is decoded line by line as the stream is consumed.
///
/// # Errors
///
/// Returns [`TraceError::Io`] if the reader fails while detecting the layout
/// and [`TraceError::Log`] if an array log is not a valid array of events.
pub fn open_events<R: BufRead>(mut reader: R, format: InputFormat) -> Result<EventStream<R>, TraceError> {
    let (format, skipped) = match format {
        InputFormat::Auto => sniff(&mut reader)?,
        explicit => (explicit, 0),
    };

    match format {
        InputFormat::Array => {
            let events: Vec<StageEvent> = serde_json::from_reader(reader).map_err(TraceError::Log)?;
            Ok(EventStream::Array(events.into_iter()))
        }
        InputFormat::Lines | InputFormat::Auto => Ok(EventStream::Lines(EventLines::starting_at(reader, skipped))),
    }
}

/// Reads every event of a log into memory.
///
/// # Errors
///
/// Returns the first error of [`open_events`] or of the event stream.
pub fn read_events<R: BufRead>(reader: R, format: InputFormat) -> Result<Vec<StageEvent>, TraceError> {
    open_events(reader, format)?.collect()
}
