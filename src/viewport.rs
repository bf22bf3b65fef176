//! Window size bookkeeping
//!
//! Tracks the logical window size and device pixel ratio. The drawing surface
//! is sized from them with the pixel ratio capped at 2, which keeps high-DPI
//! displays from rendering at full native resolution.

use winit::dpi::PhysicalSize;

/// Upper bound on the pixel ratio used for the surface
pub const MAX_PIXEL_RATIO: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    /// Logical width
    pub width: f64,
    /// Logical height
    pub height: f64,
    pub device_pixel_ratio: f64,
}

impl ViewportState {
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    /// Builds the state from a window's physical size and scale factor
    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        Self::new(size.width as f64 / scale, size.height as f64 / scale, scale)
    }

    pub fn aspect(&self) -> f32 {
        (self.width / self.height) as f32
    }

    pub fn effective_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio.min(MAX_PIXEL_RATIO)
    }

    /// Surface size in physical pixels
    pub fn surface_size(&self) -> PhysicalSize<u32> {
        let ratio = self.effective_pixel_ratio();
        PhysicalSize::new(
            (self.width * ratio).round().max(1.0) as u32,
            (self.height * ratio).round().max(1.0) as u32,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Applies a window resize; zero-area sizes (minimised) are ignored
    ///
    /// Returns true when the state changed.
    pub fn resize(&mut self, size: PhysicalSize<u32>, scale_factor: f64) -> bool {
        if size.width == 0 || size.height == 0 {
            return false;
        }
        let next = Self::from_physical(size, scale_factor);
        if next == *self {
            return false;
        }
        *self = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn aspect_and_surface_follow_logical_size() {
        let mut viewport = ViewportState::new(1200.0, 800.0, 1.0);
        assert!(viewport.resize(PhysicalSize::new(1600, 900), 1.0));
        assert_relative_eq!(viewport.aspect(), 1600.0 / 900.0);
        assert_eq!(viewport.surface_size(), PhysicalSize::new(1600, 900));
    }

    #[test]
    fn surface_uses_device_pixel_ratio_up_to_two() {
        // 1000x500 logical at 1.5 dpr
        let viewport = ViewportState::from_physical(PhysicalSize::new(1500, 750), 1.5);
        assert_relative_eq!(viewport.width, 1000.0);
        assert_relative_eq!(viewport.aspect(), 2.0);
        assert_eq!(viewport.surface_size(), PhysicalSize::new(1500, 750));

        // 3x display renders at 2x
        let viewport = ViewportState::from_physical(PhysicalSize::new(3000, 1500), 3.0);
        assert_relative_eq!(viewport.width, 1000.0);
        assert_eq!(viewport.surface_size(), PhysicalSize::new(2000, 1000));
    }

    #[test]
    fn zero_sizes_are_ignored() {
        let mut viewport = ViewportState::new(800.0, 600.0, 1.0);
        assert!(!viewport.resize(PhysicalSize::new(0, 600), 1.0));
        assert!(!viewport.resize(PhysicalSize::new(800, 0), 2.0));
        assert_eq!(viewport, ViewportState::new(800.0, 600.0, 1.0));
    }

    #[test]
    fn unchanged_size_reports_no_change() {
        let mut viewport = ViewportState::from_physical(PhysicalSize::new(800, 600), 1.0);
        assert!(!viewport.resize(PhysicalSize::new(800, 600), 1.0));
        assert!(viewport.resize(PhysicalSize::new(800, 600), 2.0));
        assert_eq!(viewport.surface_size(), PhysicalSize::new(800, 600));
        assert_relative_eq!(viewport.width, 400.0);
    }
}
