//! Bounded, append-only transcripts of rendered console lines.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

pub const HOST_CAPACITY: usize = 50;
pub const FLEET_CAPACITY: usize = 100;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum LineKind {
    Command,
    Output,
    Error,
    SuccessHeader,
    ErrorHeader,
    Warning,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscriptLine {
    pub text: String,
    pub kind: LineKind,
}

impl TranscriptLine {
    pub fn new<S: Into<String>>(kind: LineKind, text: S) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    pub fn command<S: Into<String>>(text: S) -> Self {
        Self::new(LineKind::Command, text)
    }

    pub fn output<S: Into<String>>(text: S) -> Self {
        Self::new(LineKind::Output, text)
    }

    pub fn error<S: Into<String>>(text: S) -> Self {
        Self::new(LineKind::Error, text)
    }
}

/// A transcript that keeps at most `capacity` lines, evicting the oldest
/// first.
#[derive(Clone, Debug)]
pub struct Transcript {
    capacity: usize,
    lines: VecDeque<TranscriptLine>,
}

impl Transcript {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            lines: VecDeque::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Append one line. Returns how many lines were evicted to make room.
    pub fn append(&mut self, line: TranscriptLine) -> usize {
        self.lines.push_back(line);
        self.evict_overflow()
    }

    /// Append a block of lines in one step. Returns the eviction count.
    pub fn extend<I: IntoIterator<Item = TranscriptLine>>(&mut self, block: I) -> usize {
        block.into_iter().map(|line| self.append(line)).sum()
    }

    /// Drop the oldest lines until the transcript is back within capacity.
    pub fn evict_overflow(&mut self) -> usize {
        let overflow = self.lines.len().saturating_sub(self.capacity);
        self.lines.drain(..overflow);
        overflow
    }

    /// Lines, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &TranscriptLine> {
        self.lines.iter()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
