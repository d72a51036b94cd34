//! Decoded frames and the fixed-length sequence a player owns.
//!
//! Pixels are shared behind `Arc`, so handing a frame to several surfaces
//! (panel canvas, expanded view) never copies the image.

use std::sync::Arc;

use image::RgbaImage;

/// Where a frame's pixels came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOrigin {
    /// Decoded from a resource reference
    File(String),
    /// Generated locally after a failed load
    Placeholder,
}

/// Single decoded image, cheap to clone
#[derive(Debug, Clone)]
pub struct Frame {
    pixels: Arc<RgbaImage>,
    label: String,
    origin: FrameOrigin,
}

impl Frame {
    pub fn new(pixels: RgbaImage, label: impl Into<String>, origin: FrameOrigin) -> Self {
        Self {
            pixels: Arc::new(pixels),
            label: label.into(),
            origin,
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// (width, height)
    pub fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Short human-readable name ("cover", "frame 3", ...)
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn origin(&self) -> &FrameOrigin {
        &self.origin
    }

    pub fn is_placeholder(&self) -> bool {
        self.origin == FrameOrigin::Placeholder
    }
}

/// Cover plus an ordered, non-empty list of frames.
///
/// Built only by the loader, which guarantees the frame count it was asked for.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    cover: Frame,
    frames: Vec<Frame>,
}

impl FrameSequence {
    pub(crate) fn new(cover: Frame, frames: Vec<Frame>) -> Self {
        debug_assert!(!frames.is_empty(), "frame sequence must not be empty");
        Self { cover, frames }
    }

    pub fn cover(&self) -> &Frame {
        &self.cover
    }

    /// Frame at `index`, None when out of range
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }
}
