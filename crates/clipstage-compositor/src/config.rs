//! Overlay configuration and geometry.

use crate::OVERLAY_PADDING_PX;

/// Shape of the webcam overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayShape {
    Circle,
    RoundedRect,
    Square,
}

impl OverlayShape {
    /// Corner radius for the clip path, given the overlay rectangle.
    pub fn corner_radius(self, width: u32, height: u32) -> f32 {
        match self {
            Self::Circle => width.min(height) as f32 / 2.0,
            Self::RoundedRect => height as f32 * 0.12,
            Self::Square => 0.0,
        }
    }
}

/// Size class of the overlay, as a fraction of the minimum canvas dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlaySize {
    Small,
    Medium,
    Large,
}

impl OverlaySize {
    /// Fraction of min(canvas width, canvas height).
    pub fn fraction(self) -> f32 {
        match self {
            Self::Small => 0.15,
            Self::Medium => 0.22,
            Self::Large => 0.30,
        }
    }
}

/// Canvas corner the overlay is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayCorner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Resolved overlay rectangle in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl OverlayRect {
    /// Check containment within a surface, honoring the padding constant.
    pub fn contained_in(&self, surface_width: u32, surface_height: u32) -> bool {
        self.x >= OVERLAY_PADDING_PX
            && self.y >= OVERLAY_PADDING_PX
            && self.x + self.width + OVERLAY_PADDING_PX <= surface_width
            && self.y + self.height + OVERLAY_PADDING_PX <= surface_height
    }
}

/// Compositor settings, read as one snapshot at the start of every tick.
#[derive(Debug, Clone, Copy)]
pub struct CompositorConfig {
    /// Whether the secondary overlay is drawn at all.
    pub overlay_enabled: bool,
    pub shape: OverlayShape,
    pub size: OverlaySize,
    pub corner: OverlayCorner,
    /// Flip the secondary frame horizontally about its own center.
    pub mirror: bool,
    /// Stroke the clip path after drawing.
    pub border: bool,
    /// Drop shadow behind the overlay, rendered before clipping.
    pub shadow: bool,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            overlay_enabled: false,
            shape: OverlayShape::Circle,
            size: OverlaySize::Medium,
            corner: OverlayCorner::BottomRight,
            mirror: true,
            border: false,
            shadow: true,
        }
    }
}

impl CompositorConfig {
    /// Resolve the overlay rectangle for a surface.
    ///
    /// The rectangle is always fully inside the surface with
    /// [`OVERLAY_PADDING_PX`] clearance; oversized requests are clamped.
    /// Returns `None` for surfaces too small to hold any overlay.
    pub fn overlay_rect(&self, surface_width: u32, surface_height: u32) -> Option<OverlayRect> {
        let pad = OVERLAY_PADDING_PX;
        if surface_width <= 2 * pad + 1 || surface_height <= 2 * pad + 1 {
            return None;
        }

        let min_dim = surface_width.min(surface_height) as f32;
        let base = (min_dim * self.size.fraction()).round().max(1.0) as u32;

        // 1:1 for circle/square, 4:3 for the rounded rectangle.
        let (mut width, mut height) = match self.shape {
            OverlayShape::Circle | OverlayShape::Square => (base, base),
            OverlayShape::RoundedRect => (base * 4 / 3, base),
        };

        width = width.min(surface_width - 2 * pad).max(1);
        height = height.min(surface_height - 2 * pad).max(1);

        let (x, y) = match self.corner {
            OverlayCorner::TopLeft => (pad, pad),
            OverlayCorner::TopRight => (surface_width - pad - width, pad),
            OverlayCorner::BottomLeft => (pad, surface_height - pad - height),
            OverlayCorner::BottomRight => {
                (surface_width - pad - width, surface_height - pad - height)
            }
        };

        Some(OverlayRect {
            x,
            y,
            width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHAPES: [OverlayShape; 3] = [
        OverlayShape::Circle,
        OverlayShape::RoundedRect,
        OverlayShape::Square,
    ];
    const SIZES: [OverlaySize; 3] = [OverlaySize::Small, OverlaySize::Medium, OverlaySize::Large];
    const CORNERS: [OverlayCorner; 4] = [
        OverlayCorner::TopLeft,
        OverlayCorner::TopRight,
        OverlayCorner::BottomLeft,
        OverlayCorner::BottomRight,
    ];

    #[test]
    fn overlay_always_contained() {
        let dims = [
            (320u32, 240u32),
            (640, 480),
            (1280, 720),
            (1920, 1080),
            (2560, 1440),
            (3840, 2160),
            // Odd aspect ratios
            (320, 2160),
            (3840, 240),
        ];

        for &(w, h) in &dims {
            for &shape in &SHAPES {
                for &size in &SIZES {
                    for &corner in &CORNERS {
                        let config = CompositorConfig {
                            overlay_enabled: true,
                            shape,
                            size,
                            corner,
                            ..Default::default()
                        };
                        let rect = config.overlay_rect(w, h).unwrap_or_else(|| {
                            panic!("no rect for {}x{} {:?} {:?} {:?}", w, h, shape, size, corner)
                        });
                        assert!(
                            rect.contained_in(w, h),
                            "rect {:?} escapes {}x{} ({:?} {:?} {:?})",
                            rect,
                            w,
                            h,
                            shape,
                            size,
                            corner
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn circle_rect_is_square() {
        let config = CompositorConfig {
            shape: OverlayShape::Circle,
            ..Default::default()
        };
        let rect = config.overlay_rect(1920, 1080).unwrap();
        assert_eq!(rect.width, rect.height);
    }

    #[test]
    fn rounded_rect_is_wider_than_tall() {
        let config = CompositorConfig {
            shape: OverlayShape::RoundedRect,
            ..Default::default()
        };
        let rect = config.overlay_rect(1920, 1080).unwrap();
        assert!(rect.width > rect.height);
    }

    #[test]
    fn tiny_surface_yields_no_overlay() {
        let config = CompositorConfig::default();
        assert!(config.overlay_rect(24, 24).is_none());
    }

    #[test]
    fn size_classes_are_ordered() {
        let rects: Vec<_> = SIZES
            .iter()
            .map(|&size| {
                CompositorConfig {
                    size,
                    ..Default::default()
                }
                .overlay_rect(1920, 1080)
                .unwrap()
            })
            .collect();
        assert!(rects[0].width < rects[1].width);
        assert!(rects[1].width < rects[2].width);
    }
}
