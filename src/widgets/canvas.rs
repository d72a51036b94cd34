//! Raster canvas: a [`RenderSurface`] backed by an in-memory RGBA image.
//!
//! Used for the headless runner's panels and expanded view. Frames are
//! resampled into the destination rect and composited over the background.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use log::trace;

use crate::entities::{Frame, Rect, RenderSurface};

const DEFAULT_BACKGROUND: Rgba<u8> = Rgba([0x11, 0x11, 0x11, 0xff]);

pub struct Canvas {
    name: String,
    pixels: RgbaImage,
    background: Rgba<u8>,
    paints: u64,
    last_label: Option<String>,
}

impl Canvas {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            pixels: RgbaImage::from_pixel(width, height, DEFAULT_BACKGROUND),
            background: DEFAULT_BACKGROUND,
            paints: 0,
            last_label: None,
        }
    }

    pub fn with_background(mut self, background: Rgba<u8>) -> Self {
        self.background = background;
        self.clear();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Paint calls since creation
    pub fn paints(&self) -> u64 {
        self.paints
    }

    /// Label of the last painted frame
    pub fn last_label(&self) -> Option<&str> {
        self.last_label.as_deref()
    }
}

impl RenderSurface for Canvas {
    fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    fn clear(&mut self) {
        for px in self.pixels.pixels_mut() {
            *px = self.background;
        }
    }

    fn paint(&mut self, frame: &Frame, dest: Rect) {
        if dest.is_empty() {
            return;
        }
        let w = dest.size.x.round() as u32;
        let h = dest.size.y.round() as u32;

        if frame.size() == (w, h) {
            imageops::overlay(&mut self.pixels, frame.pixels(), dest.min.x as i64, dest.min.y as i64);
        } else {
            let scaled = imageops::resize(frame.pixels(), w, h, FilterType::Triangle);
            imageops::overlay(&mut self.pixels, &scaled, dest.min.x as i64, dest.min.y as i64);
        }
        self.paints += 1;
        self.last_label = Some(frame.label().to_string());
        trace!("{}: painted {} at {:?}", self.name, frame.label(), dest);
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.pixels = RgbaImage::from_pixel(width, height, self.background);
    }

    fn raster(&self) -> Option<&RgbaImage> {
        Some(&self.pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::FrameOrigin;

    fn red_tile(w: u32, h: u32) -> Frame {
        Frame::new(RgbaImage::from_pixel(w, h, Rgba([255, 0, 0, 255])), "red", FrameOrigin::Placeholder)
    }

    #[test]
    fn test_fill_paint_covers_canvas() {
        let mut canvas = Canvas::new("panel", 8, 6);
        canvas.paint(&red_tile(2, 2), Rect::fill(canvas.size()));
        assert!(canvas.pixels().pixels().all(|p| p.0 == [255, 0, 0, 255]));
        assert_eq!(canvas.paints(), 1);
        assert_eq!(canvas.last_label(), Some("red"));
    }

    #[test]
    fn test_fit_paint_leaves_bars() {
        let mut canvas = Canvas::new("expanded", 12, 6);
        let dest = Rect::fit_centered((2, 2), canvas.size()).unwrap();
        canvas.paint(&red_tile(2, 2), dest);

        assert_eq!(canvas.pixels().get_pixel(0, 3), &DEFAULT_BACKGROUND);
        assert_eq!(canvas.pixels().get_pixel(6, 3).0, [255, 0, 0, 255]);
        assert_eq!(canvas.pixels().get_pixel(11, 3), &DEFAULT_BACKGROUND);
    }

    #[test]
    fn test_clear_and_resize() {
        let mut canvas = Canvas::new("c", 4, 4).with_background(Rgba([0, 0, 255, 255]));
        canvas.paint(&red_tile(4, 4), Rect::fill((4, 4)));
        canvas.clear();
        assert!(canvas.pixels().pixels().all(|p| p.0 == [0, 0, 255, 255]));

        canvas.resize(10, 2);
        assert_eq!(canvas.size(), (10, 2));
    }

    #[test]
    fn test_empty_dest_is_skipped() {
        let mut canvas = Canvas::new("c", 4, 4);
        canvas.paint(&red_tile(4, 4), Rect::new(0.0, 0.0, 0.0, 4.0));
        assert_eq!(canvas.paints(), 0);
    }
}
