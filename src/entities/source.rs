//! Resource references for one player: a cover and a numbered frame pattern.
//!
//! Frame patterns use a run of `#` as the frame number placeholder, padded to
//! the run length: `frames/p1/frame.####.png` with start number 1 resolves
//! index 0 to `frames/p1/frame.0001.png`.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::loader::LoadError;

lazy_static! {
    static ref NUMBER_RUN: Regex = Regex::new("#+").expect("valid frame number regex");
}

fn default_start_number() -> u32 {
    1
}

/// Cover reference plus frame pattern, as written in the board config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceSource {
    pub cover: String,
    pub frames: String,
    /// Number substituted for index 0
    #[serde(default = "default_start_number")]
    pub start_number: u32,
}

impl SequenceSource {
    pub fn new(cover: impl Into<String>, frames: impl Into<String>) -> Self {
        Self {
            cover: cover.into(),
            frames: frames.into(),
            start_number: default_start_number(),
        }
    }

    /// Parse the frame pattern
    pub fn pattern(&self) -> Result<FramePattern, LoadError> {
        Ok(FramePattern::parse(&self.frames)?.with_start(self.start_number))
    }
}

/// Parsed frame pattern: `prefix` + zero-padded number + `suffix`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramePattern {
    prefix: String,
    padding: usize,
    suffix: String,
    start: u32,
}

impl FramePattern {
    /// Split at the first `#` run. Patterns without one are rejected.
    pub fn parse(pattern: &str) -> Result<Self, LoadError> {
        let run = NUMBER_RUN
            .find(pattern)
            .ok_or_else(|| LoadError::Pattern(pattern.to_string()))?;

        Ok(Self {
            prefix: pattern[..run.start()].to_string(),
            padding: run.len(),
            suffix: pattern[run.end()..].to_string(),
            start: default_start_number(),
        })
    }

    pub fn with_start(mut self, start: u32) -> Self {
        self.start = start;
        self
    }

    /// Reference for frame `index` (0-based)
    pub fn resolve(&self, index: usize) -> String {
        let number = self.start as usize + index;
        format!("{}{:0width$}{}", self.prefix, number, self.suffix, width = self.padding)
    }
}
