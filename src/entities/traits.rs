//! Abstract traits for dependency inversion.
//!
//! The engine talks to the outside world only through these: a fetcher that
//! turns resource references into pixels, render surfaces that paint frames,
//! and control surfaces that display enablement. Concrete implementations live
//! in `widgets/` (and in tests).

use image::RgbaImage;

use super::controls::ControlState;
use super::frame::Frame;
use super::loader::LoadError;
use super::rect::Rect;

/// Resolves a resource reference into decoded pixels.
///
/// Called from loader worker threads.
pub trait Fetch: Send + Sync {
    fn fetch(&self, reference: &str) -> Result<RgbaImage, LoadError>;
}

/// Paint target owned by a player panel or by the expanded view.
pub trait RenderSurface {
    /// (width, height) in pixels
    fn size(&self) -> (u32, u32);

    fn clear(&mut self);

    /// Paint `frame` scaled into `dest`.
    fn paint(&mut self, frame: &Frame, dest: Rect);

    /// Change the surface size. Content is discarded.
    fn resize(&mut self, _width: u32, _height: u32) {}

    /// Current pixels, for surfaces that keep a raster.
    fn raster(&self) -> Option<&RgbaImage> {
        None
    }
}

/// Receives control enablement whenever the owning player changes.
pub trait ControlSurface {
    fn refresh(&mut self, state: &ControlState);
}
