//! Sequence loader with placeholder fallback
//!
//! Loads the cover, then every frame in index order, one at a time. The first
//! failure aborts the pass and the whole sequence is replaced by placeholder
//! tiles, so a player always ends up with a full, renderable sequence.
//! Failures are logged, never returned.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{ImageError, RgbaImage};
use log::{debug, warn};

use super::frame::{Frame, FrameOrigin, FrameSequence};
use super::placeholder::{self, PlaceholderStyle};
use super::source::SequenceSource;
use super::traits::Fetch;

/// Resource load errors
#[derive(Debug)]
pub enum LoadError {
    Io { reference: String, source: std::io::Error },
    Decode { reference: String, message: String },
    /// Frame pattern without a `#` run
    Pattern(String),
    Missing(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io { reference, source } => write!(f, "I/O error reading {}: {}", reference, source),
            LoadError::Decode { reference, message } => write!(f, "Cannot decode {}: {}", reference, message),
            LoadError::Pattern(p) => write!(f, "Frame pattern has no '#' placeholder: {}", p),
            LoadError::Missing(r) => write!(f, "Resource not found: {}", r),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// How a sequence came to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// Load failed; every frame and the cover are placeholders
    Substituted { reason: String },
}

/// Loader output: always a full sequence
#[derive(Debug, Clone)]
pub struct LoadResult {
    pub sequence: FrameSequence,
    pub outcome: LoadOutcome,
}

impl LoadResult {
    pub fn is_substituted(&self) -> bool {
        matches!(self.outcome, LoadOutcome::Substituted { .. })
    }
}

/// Decodes image files relative to a root directory
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Fetch for FileFetcher {
    fn fetch(&self, reference: &str) -> Result<RgbaImage, LoadError> {
        let path = self.root.join(reference);
        if !path.is_file() {
            return Err(LoadError::Missing(path.display().to_string()));
        }
        let img = image::open(&path).map_err(|e| match e {
            ImageError::IoError(source) => LoadError::Io {
                reference: reference.to_string(),
                source,
            },
            other => LoadError::Decode {
                reference: reference.to_string(),
                message: other.to_string(),
            },
        })?;
        Ok(img.to_rgba8())
    }
}

/// Fetches one player's sequence, substituting placeholders on failure
pub struct ResourceLoader {
    fetcher: Arc<dyn Fetch>,
    placeholder: PlaceholderStyle,
}

impl ResourceLoader {
    pub fn new(fetcher: Arc<dyn Fetch>, placeholder: PlaceholderStyle) -> Self {
        Self { fetcher, placeholder }
    }

    /// Load `count` frames (at least one) plus the cover. Never fails.
    pub fn load(&self, source: &SequenceSource, count: usize) -> LoadResult {
        let count = count.max(1);
        match self.try_load(source, count) {
            Ok(sequence) => {
                debug!("Loaded sequence {} ({} frames)", source.frames, count);
                LoadResult {
                    sequence,
                    outcome: LoadOutcome::Loaded,
                }
            }
            Err(e) => {
                warn!("Load of {} failed, using placeholders: {}", source.frames, e);
                LoadResult {
                    sequence: placeholder::sequence(count, self.placeholder),
                    outcome: LoadOutcome::Substituted { reason: e.to_string() },
                }
            }
        }
    }

    fn try_load(&self, source: &SequenceSource, count: usize) -> Result<FrameSequence, LoadError> {
        let pattern = source.pattern()?;

        debug!("Fetching cover {}", source.cover);
        let cover = Frame::new(
            self.fetcher.fetch(&source.cover)?,
            "cover",
            FrameOrigin::File(source.cover.clone()),
        );

        let mut frames = Vec::with_capacity(count);
        for index in 0..count {
            let reference = pattern.resolve(index);
            debug!("Fetching frame {} from {}", index, reference);
            let pixels = self.fetcher.fetch(&reference)?;
            frames.push(Frame::new(pixels, format!("frame {}", index + 1), FrameOrigin::File(reference)));
        }

        Ok(FrameSequence::new(cover, frames))
    }
}
