//! Destination rectangles for painting frames onto surfaces.
//!
//! Panels stretch frames over the whole canvas; the expanded view keeps the
//! aspect ratio and centers the result (same math as a viewport auto-fit:
//! `zoom = min(view.x / image.x, view.y / image.y)`).

use glam::Vec2;

/// Axis-aligned rectangle in surface pixels, +Y down
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Whole target, ignoring the source aspect
    pub fn fill(target: (u32, u32)) -> Self {
        Self::new(0.0, 0.0, target.0 as f32, target.1 as f32)
    }

    /// Largest rect with the source aspect that fits `target`, centered.
    ///
    /// None when either size has a zero dimension.
    pub fn fit_centered(source: (u32, u32), target: (u32, u32)) -> Option<Self> {
        let source = Vec2::new(source.0 as f32, source.1 as f32);
        let target = Vec2::new(target.0 as f32, target.1 as f32);
        if source.min_element() <= 0.0 || target.min_element() <= 0.0 {
            return None;
        }

        let scale = (target / source).min_element();
        let size = source * scale;
        let min = (target - size) * 0.5;
        Some(Self { min, size })
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size.x < 1.0 || self.size.y < 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_covers_target() {
        let r = Rect::fill((400, 300));
        assert_eq!(r.min, Vec2::ZERO);
        assert_eq!(r.size, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_fit_square_into_wide() {
        // 400x400 into 960x640: height-bound, scale 1.6
        let r = Rect::fit_centered((400, 400), (960, 640)).unwrap();
        assert_eq!(r.size, Vec2::new(640.0, 640.0));
        assert_eq!(r.min, Vec2::new(160.0, 0.0));
    }

    #[test]
    fn test_fit_wide_into_tall() {
        let r = Rect::fit_centered((200, 100), (100, 300)).unwrap();
        assert_eq!(r.size, Vec2::new(100.0, 50.0));
        assert_eq!(r.min, Vec2::new(0.0, 125.0));
        assert_eq!(r.max(), Vec2::new(100.0, 175.0));
    }

    #[test]
    fn test_fit_degenerate() {
        assert!(Rect::fit_centered((0, 10), (100, 100)).is_none());
        assert!(Rect::fit_centered((10, 10), (100, 0)).is_none());
    }
}
