//! BGRA drawing surface.

use bytes::Bytes;
use clipstage_capture::{FrameTimestamp, VideoFrame};

use crate::config::{CompositorConfig, OverlayRect};
use crate::{CompositorError, CompositorResult};

/// Drop shadow blur radius in pixels.
const SHADOW_BLUR_PX: f32 = 12.0;

/// Drop shadow vertical offset in pixels.
const SHADOW_OFFSET_Y: i32 = 4;

/// Shadow darkening at full coverage (0..1).
const SHADOW_STRENGTH: f32 = 0.45;

/// Border stroke width in pixels.
const BORDER_WIDTH_PX: f32 = 3.0;

/// Border color (BGRA).
const BORDER_COLOR: [u8; 4] = [255, 255, 255, 255];

/// An owned BGRA raster surface.
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    /// Create a black surface.
    pub fn new(width: u32, height: u32) -> CompositorResult<Self> {
        if width == 0 || height == 0 {
            return Err(CompositorError::InvalidDimensions { width, height });
        }
        let mut data = vec![0u8; width as usize * height as usize * 4];
        // Opaque alpha.
        for px in data.chunks_exact_mut(4) {
            px[3] = 255;
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw BGRA pixel data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable BGRA pixel data, for in-place post-processing.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn pixel_index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Draw the primary frame scaled to fill the whole surface exactly
    /// (stretched, no letterboxing), nearest-neighbor.
    pub fn draw_frame_fill(&mut self, frame: &VideoFrame) {
        if !frame.is_valid() {
            return;
        }
        for y in 0..self.height {
            let src_y = (y as u64 * frame.height as u64 / self.height as u64) as u32;
            for x in 0..self.width {
                let src_x = (x as u64 * frame.width as u64 / self.width as u64) as u32;
                let src = frame.pixel(src_x, src_y);
                let idx = self.pixel_index(x, y);
                self.data[idx..idx + 3].copy_from_slice(&src[..3]);
                self.data[idx + 3] = 255;
            }
        }
    }

    /// Draw the secondary frame into the overlay rectangle with shape
    /// clipping and the configured effects.
    ///
    /// Order matches the per-tick contract: shadow first (before clipping),
    /// then the clipped frame (mirrored if requested), then the border
    /// stroke over the same path.
    pub fn draw_overlay(
        &mut self,
        frame: &VideoFrame,
        rect: &OverlayRect,
        config: &CompositorConfig,
    ) {
        if !frame.is_valid() || rect.width == 0 || rect.height == 0 {
            return;
        }

        let radius = config.shape.corner_radius(rect.width, rect.height);

        if config.shadow {
            self.draw_shadow(rect, radius);
        }

        self.draw_clipped_frame(frame, rect, radius, config.mirror);

        if config.border {
            self.draw_border(rect, radius);
        }
    }

    fn draw_shadow(&mut self, rect: &OverlayRect, radius: f32) {
        let margin = SHADOW_BLUR_PX.ceil() as i64;
        let x0 = (rect.x as i64 - margin).max(0);
        let y0 = (rect.y as i64 + SHADOW_OFFSET_Y as i64 - margin).max(0);
        let x1 = (rect.x as i64 + rect.width as i64 + margin).min(self.width as i64);
        let y1 = (rect.y as i64 + rect.height as i64 + SHADOW_OFFSET_Y as i64 + margin)
            .min(self.height as i64);

        for y in y0..y1 {
            for x in x0..x1 {
                let d = sdf_rounded_rect(
                    x as f32 + 0.5 - (rect.x as f32 + rect.width as f32 / 2.0),
                    y as f32 + 0.5 - (rect.y as f32 + SHADOW_OFFSET_Y as f32 + rect.height as f32 / 2.0),
                    rect.width as f32 / 2.0,
                    rect.height as f32 / 2.0,
                    radius,
                );
                if d >= SHADOW_BLUR_PX {
                    continue;
                }
                // Full strength over the offset silhouette, falling off
                // across the blur band.
                let alpha = if d <= 0.0 {
                    SHADOW_STRENGTH
                } else {
                    (1.0 - d / SHADOW_BLUR_PX) * SHADOW_STRENGTH
                };
                let idx = self.pixel_index(x as u32, y as u32);
                for c in 0..3 {
                    let v = self.data[idx + c] as f32 * (1.0 - alpha);
                    self.data[idx + c] = v as u8;
                }
            }
        }
    }

    fn draw_clipped_frame(
        &mut self,
        frame: &VideoFrame,
        rect: &OverlayRect,
        radius: f32,
        mirror: bool,
    ) {
        // Aspect-fill: scale the source so it covers the rect, center-crop.
        let scale = (rect.width as f32 / frame.width as f32)
            .max(rect.height as f32 / frame.height as f32);
        let crop_w = rect.width as f32 / scale;
        let crop_h = rect.height as f32 / scale;
        let crop_x = (frame.width as f32 - crop_w) / 2.0;
        let crop_y = (frame.height as f32 - crop_h) / 2.0;

        let half_w = rect.width as f32 / 2.0;
        let half_h = rect.height as f32 / 2.0;
        let cx = rect.x as f32 + half_w;
        let cy = rect.y as f32 + half_h;

        let x_end = (rect.x + rect.width).min(self.width);
        let y_end = (rect.y + rect.height).min(self.height);

        for y in rect.y..y_end {
            for x in rect.x..x_end {
                let d = sdf_rounded_rect(
                    x as f32 + 0.5 - cx,
                    y as f32 + 0.5 - cy,
                    half_w,
                    half_h,
                    radius,
                );
                // 1px feathered clip edge.
                let coverage = (0.5 - d).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }

                let mut local_x = (x - rect.x) as f32;
                if mirror {
                    local_x = rect.width as f32 - 1.0 - local_x;
                }
                let local_y = (y - rect.y) as f32;

                let src_x = (crop_x + local_x / scale).clamp(0.0, frame.width as f32 - 1.0) as u32;
                let src_y = (crop_y + local_y / scale).clamp(0.0, frame.height as f32 - 1.0) as u32;
                let src = frame.pixel(src_x, src_y);

                let idx = self.pixel_index(x, y);
                for c in 0..3 {
                    let blended =
                        self.data[idx + c] as f32 * (1.0 - coverage) + src[c] as f32 * coverage;
                    self.data[idx + c] = blended as u8;
                }
            }
        }
    }

    fn draw_border(&mut self, rect: &OverlayRect, radius: f32) {
        let half_stroke = BORDER_WIDTH_PX / 2.0;
        let margin = BORDER_WIDTH_PX.ceil() as i64;
        let x0 = (rect.x as i64 - margin).max(0);
        let y0 = (rect.y as i64 - margin).max(0);
        let x1 = (rect.x as i64 + rect.width as i64 + margin).min(self.width as i64);
        let y1 = (rect.y as i64 + rect.height as i64 + margin).min(self.height as i64);

        let half_w = rect.width as f32 / 2.0;
        let half_h = rect.height as f32 / 2.0;
        let cx = rect.x as f32 + half_w;
        let cy = rect.y as f32 + half_h;

        for y in y0..y1 {
            for x in x0..x1 {
                let d = sdf_rounded_rect(
                    x as f32 + 0.5 - cx,
                    y as f32 + 0.5 - cy,
                    half_w,
                    half_h,
                    radius,
                );
                let coverage = (half_stroke + 0.5 - d.abs()).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let idx = self.pixel_index(x as u32, y as u32);
                for c in 0..3 {
                    let blended = self.data[idx + c] as f32 * (1.0 - coverage)
                        + BORDER_COLOR[c] as f32 * coverage;
                    self.data[idx + c] = blended as u8;
                }
            }
        }
    }

    /// Snapshot the surface contents as a frame.
    pub fn snapshot(&self, timestamp: FrameTimestamp, sequence: u64) -> VideoFrame {
        VideoFrame::new(
            Bytes::copy_from_slice(&self.data),
            self.width,
            self.height,
            timestamp,
            sequence,
        )
    }
}

/// Signed distance from point (px, py) relative to a rounded rectangle
/// centered at the origin. Negative inside.
///
/// A circle is the degenerate case of a square rect with radius = half side.
fn sdf_rounded_rect(px: f32, py: f32, half_w: f32, half_h: f32, radius: f32) -> f32 {
    let r = radius.min(half_w).min(half_h);
    let qx = px.abs() - (half_w - r);
    let qy = py.abs() - (half_h - r);
    let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
    outside + qx.max(qy).min(0.0) - r
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OverlayCorner, OverlayShape, OverlaySize};
    use std::time::Instant;

    fn solid_frame(width: u32, height: u32, bgr: [u8; 3]) -> VideoFrame {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            data.extend_from_slice(&[bgr[0], bgr[1], bgr[2], 255]);
        }
        VideoFrame::new(
            Bytes::from(data),
            width,
            height,
            FrameTimestamp::now(Instant::now()),
            0,
        )
    }

    fn pixel(surface: &Surface, x: u32, y: u32) -> [u8; 4] {
        let idx = surface.pixel_index(x, y);
        let px = &surface.data()[idx..idx + 4];
        [px[0], px[1], px[2], px[3]]
    }

    #[test]
    fn fill_stretches_source_over_whole_surface() {
        let mut surface = Surface::new(64, 48).unwrap();
        let frame = solid_frame(16, 16, [10, 20, 30]);
        surface.draw_frame_fill(&frame);
        assert_eq!(pixel(&surface, 0, 0)[..3], [10, 20, 30]);
        assert_eq!(pixel(&surface, 63, 47)[..3], [10, 20, 30]);
    }

    #[test]
    fn circle_clip_leaves_rect_corners_untouched() {
        let mut surface = Surface::new(200, 200).unwrap();
        surface.draw_frame_fill(&solid_frame(8, 8, [0, 0, 0]));

        let config = CompositorConfig {
            overlay_enabled: true,
            shape: OverlayShape::Circle,
            size: OverlaySize::Large,
            corner: OverlayCorner::TopLeft,
            mirror: false,
            border: false,
            shadow: false,
        };
        let rect = config.overlay_rect(200, 200).unwrap();
        surface.draw_overlay(&solid_frame(8, 8, [200, 200, 200]), &rect, &config);

        // Center of the circle is covered.
        let center = pixel(&surface, rect.x + rect.width / 2, rect.y + rect.height / 2);
        assert_eq!(center[..3], [200, 200, 200]);

        // The rect's top-left corner is outside the circle.
        let corner = pixel(&surface, rect.x, rect.y);
        assert_eq!(corner[..3], [0, 0, 0]);
    }

    #[test]
    fn square_clip_covers_whole_rect() {
        let mut surface = Surface::new(200, 200).unwrap();
        surface.draw_frame_fill(&solid_frame(8, 8, [0, 0, 0]));

        let config = CompositorConfig {
            overlay_enabled: true,
            shape: OverlayShape::Square,
            size: OverlaySize::Medium,
            corner: OverlayCorner::BottomRight,
            mirror: false,
            border: false,
            shadow: false,
        };
        let rect = config.overlay_rect(200, 200).unwrap();
        surface.draw_overlay(&solid_frame(8, 8, [99, 99, 99]), &rect, &config);

        assert_eq!(pixel(&surface, rect.x + 1, rect.y + 1)[..3], [99, 99, 99]);
        assert_eq!(
            pixel(&surface, rect.x + rect.width - 2, rect.y + rect.height - 2)[..3],
            [99, 99, 99]
        );
    }

    #[test]
    fn mirror_flips_horizontally() {
        // Source frame: left half blue-ish, right half red-ish.
        let width = 8u32;
        let height = 8u32;
        let mut data = Vec::new();
        for _y in 0..height {
            for x in 0..width {
                if x < width / 2 {
                    data.extend_from_slice(&[255, 0, 0, 255]); // blue (BGRA)
                } else {
                    data.extend_from_slice(&[0, 0, 255, 255]); // red
                }
            }
        }
        let frame = VideoFrame::new(
            Bytes::from(data),
            width,
            height,
            FrameTimestamp::now(Instant::now()),
            0,
        );

        let config = CompositorConfig {
            overlay_enabled: true,
            shape: OverlayShape::Square,
            size: OverlaySize::Large,
            corner: OverlayCorner::TopLeft,
            mirror: true,
            border: false,
            shadow: false,
        };

        let mut surface = Surface::new(200, 200).unwrap();
        let rect = config.overlay_rect(200, 200).unwrap();
        surface.draw_overlay(&frame, &rect, &config);

        // Mirrored: the overlay's left side now shows the source's right half.
        let left = pixel(&surface, rect.x + 2, rect.y + rect.height / 2);
        assert_eq!(left[..3], [0, 0, 255]);
        let right = pixel(&surface, rect.x + rect.width - 3, rect.y + rect.height / 2);
        assert_eq!(right[..3], [255, 0, 0]);
    }

    #[test]
    fn border_strokes_the_clip_path() {
        let mut surface = Surface::new(200, 200).unwrap();
        surface.draw_frame_fill(&solid_frame(8, 8, [0, 0, 0]));

        let config = CompositorConfig {
            overlay_enabled: true,
            shape: OverlayShape::Square,
            size: OverlaySize::Medium,
            corner: OverlayCorner::TopLeft,
            mirror: false,
            border: true,
            shadow: false,
        };
        let rect = config.overlay_rect(200, 200).unwrap();
        surface.draw_overlay(&solid_frame(8, 8, [40, 40, 40]), &rect, &config);

        // A pixel on the rect edge should be bright from the stroke.
        let edge = pixel(&surface, rect.x, rect.y + rect.height / 2);
        assert!(edge[0] > 150, "border not drawn: {:?}", edge);
    }

    #[test]
    fn shadow_darkens_below_overlay() {
        let mut surface = Surface::new(200, 200).unwrap();
        surface.draw_frame_fill(&solid_frame(8, 8, [200, 200, 200]));

        let config = CompositorConfig {
            overlay_enabled: true,
            shape: OverlayShape::Square,
            size: OverlaySize::Medium,
            corner: OverlayCorner::TopLeft,
            mirror: false,
            border: false,
            shadow: true,
        };
        let rect = config.overlay_rect(200, 200).unwrap();
        surface.draw_overlay(&solid_frame(8, 8, [200, 200, 200]), &rect, &config);

        // Just below the overlay bottom edge, inside the shadow band.
        let below = pixel(&surface, rect.x + rect.width / 2, rect.y + rect.height + 2);
        assert!(below[0] < 200, "shadow not drawn: {:?}", below);
    }

    #[test]
    fn invalid_dimensions_rejected() {
        assert!(Surface::new(0, 10).is_err());
        assert!(Surface::new(10, 0).is_err());
    }

    #[test]
    fn snapshot_matches_surface() {
        let mut surface = Surface::new(16, 16).unwrap();
        surface.draw_frame_fill(&solid_frame(4, 4, [1, 2, 3]));
        let shot = surface.snapshot(FrameTimestamp::now(Instant::now()), 7);
        assert!(shot.is_valid());
        assert_eq!(shot.sequence, 7);
        assert_eq!(shot.pixel(8, 8)[..3], [1, 2, 3]);
    }
}
