//! Timestamped raster overlays burned in during export.

use uuid::Uuid;

use clipstage_capture::VideoFrame;

/// A pre-rasterized overlay (text is rasterized upstream) with a normalized
/// position and a `[start, end)` visibility window on the source timeline.
#[derive(Debug, Clone)]
pub struct ExportOverlay {
    pub id: Uuid,

    /// BGRA raster; alpha is honored when blending.
    pub raster: VideoFrame,

    /// Normalized horizontal position of the top-left corner, 0..=1.
    pub x: f32,

    /// Normalized vertical position of the top-left corner, 0..=1.
    pub y: f32,

    /// First second the overlay is visible.
    pub start_secs: f64,

    /// First second the overlay is no longer visible.
    pub end_secs: f64,
}

impl ExportOverlay {
    pub fn new(raster: VideoFrame, x: f32, y: f32, start_secs: f64, end_secs: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            raster,
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
            start_secs,
            end_secs,
        }
    }

    /// Visibility test, half-open window.
    pub fn active_at(&self, t: f64) -> bool {
        t >= self.start_secs && t < self.end_secs
    }

    /// Alpha-blend the raster onto a BGRA canvas.
    ///
    /// The normalized position maps over the canvas area the raster can
    /// occupy without spilling off the edge.
    pub fn draw(&self, canvas: &mut [u8], canvas_width: u32, canvas_height: u32) {
        if !self.raster.is_valid() {
            return;
        }
        let cw = canvas_width as usize;
        let ch = canvas_height as usize;
        let ow = self.raster.width as usize;
        let oh = self.raster.height as usize;

        let max_x = cw.saturating_sub(ow);
        let max_y = ch.saturating_sub(oh);
        let origin_x = (self.x as f64 * max_x as f64).round() as usize;
        let origin_y = (self.y as f64 * max_y as f64).round() as usize;

        for oy in 0..oh.min(ch) {
            let cy = origin_y + oy;
            if cy >= ch {
                break;
            }
            for ox in 0..ow.min(cw) {
                let cx = origin_x + ox;
                if cx >= cw {
                    break;
                }
                let src = (oy * ow + ox) * 4;
                let dst = (cy * cw + cx) * 4;
                let alpha = self.raster.data[src + 3] as u32;
                if alpha == 0 {
                    continue;
                }
                for c in 0..3 {
                    let over = self.raster.data[src + c] as u32;
                    let under = canvas[dst + c] as u32;
                    canvas[dst + c] = ((over * alpha + under * (255 - alpha)) / 255) as u8;
                }
            }
        }
    }
}
