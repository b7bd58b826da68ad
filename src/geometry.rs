use egui::{Pos2, Rect};

/// A coordinate in surface-local pixel space
pub type Point = Pos2;

/// An integer, clipped, non-empty region of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Normalize two drag corners into a pixel region clipped to `bounds`.
    ///
    /// Returns `None` when the region collapses to zero width or height.
    pub fn from_corners(a: Point, b: Point, bounds: (u32, u32)) -> Option<Self> {
        let rect = Rect::from_two_pos(a, b);
        let clip = |v: f32, max: u32| v.round().clamp(0.0, max as f32) as u32;

        let x0 = clip(rect.min.x, bounds.0);
        let y0 = clip(rect.min.y, bounds.1);
        let x1 = clip(rect.max.x, bounds.0);
        let y1 = clip(rect.max.y, bounds.1);

        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

/// Scale `(width, height)` down to fit inside `(max_width, max_height)`.
///
/// The aspect ratio is kept, images are never upscaled and the result is at least 1x1.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (1, 1);
    }
    let scale = (max_width as f64 / width as f64)
        .min(max_height as f64 / height as f64)
        .min(1.0);
    let fitted = |v: u32| ((v as f64 * scale).round() as u32).max(1);
    (fitted(width), fitted(height))
}

/// Width over height, or `None` when either side is zero.
pub fn aspect_ratio(width: u32, height: u32) -> Option<f64> {
    (width > 0 && height > 0).then(|| width as f64 / height as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn test_corners_are_normalized() {
        let rect = PixelRect::from_corners(pos2(50.0, 40.0), pos2(10.0, 20.0), (100, 100)).unwrap();
        assert_eq!(rect, PixelRect { x: 10, y: 20, width: 40, height: 20 });
    }

    #[test]
    fn test_corners_are_clipped_to_bounds() {
        let rect = PixelRect::from_corners(pos2(-5.0, 90.0), pos2(30.0, 150.0), (100, 100)).unwrap();
        assert_eq!(rect, PixelRect { x: 0, y: 90, width: 30, height: 10 });
    }

    #[test]
    fn test_degenerate_regions() {
        assert!(PixelRect::from_corners(pos2(10.0, 10.0), pos2(10.0, 10.0), (100, 100)).is_none());
        assert!(PixelRect::from_corners(pos2(10.0, 10.0), pos2(40.0, 10.0), (100, 100)).is_none());
        // Entirely outside the surface
        assert!(PixelRect::from_corners(pos2(120.0, 10.0), pos2(140.0, 40.0), (100, 100)).is_none());
    }

    #[test]
    fn test_fit_within() {
        assert_eq!(fit_within(1600, 900, 800, 600), (800, 450));
        assert_eq!(fit_within(600, 1200, 800, 600), (300, 600));
        assert_eq!(fit_within(320, 200, 800, 600), (320, 200));
        assert_eq!(fit_within(0, 10, 800, 600), (1, 1));
    }
}
