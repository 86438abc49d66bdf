//! Per-pixel visual filter chain.

/// Rec. 709 luma weights.
const LUMA_R: f32 = 0.2126;
const LUMA_G: f32 = 0.7152;
const LUMA_B: f32 = 0.0722;

/// Visual adjustments applied to every exported frame.
///
/// All fields are identity by default. The per-pixel chain runs in order
/// brightness, contrast, saturation, hue rotation, grayscale; the box blur
/// runs last over the whole frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualFilterState {
    /// Channel multiplier; 1.0 is identity.
    pub brightness: f32,

    /// Contrast around mid-gray; 1.0 is identity.
    pub contrast: f32,

    /// Saturation; 1.0 is identity, 0.0 is fully desaturated.
    pub saturation: f32,

    /// Hue rotation in degrees; 0.0 is identity.
    pub hue_rotate_deg: f32,

    /// Grayscale mix; 0.0 is identity, 1.0 fully gray.
    pub grayscale: f32,

    /// Box blur radius in pixels; 0 is identity.
    pub blur_px: u32,
}

impl Default for VisualFilterState {
    fn default() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
            hue_rotate_deg: 0.0,
            grayscale: 0.0,
            blur_px: 0,
        }
    }
}

impl VisualFilterState {
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the chain in place over a BGRA buffer.
    pub fn apply(&self, data: &mut [u8], width: u32, height: u32) {
        if self.is_identity() {
            return;
        }

        let needs_color_pass = self.brightness != 1.0
            || self.contrast != 1.0
            || self.saturation != 1.0
            || self.hue_rotate_deg != 0.0
            || self.grayscale != 0.0;

        if needs_color_pass {
            let (sin_h, cos_h) = self.hue_rotate_deg.to_radians().sin_cos();
            for px in data.chunks_exact_mut(4) {
                let mut b = px[0] as f32 / 255.0;
                let mut g = px[1] as f32 / 255.0;
                let mut r = px[2] as f32 / 255.0;

                if self.brightness != 1.0 {
                    b *= self.brightness;
                    g *= self.brightness;
                    r *= self.brightness;
                }

                if self.contrast != 1.0 {
                    b = (b - 0.5) * self.contrast + 0.5;
                    g = (g - 0.5) * self.contrast + 0.5;
                    r = (r - 0.5) * self.contrast + 0.5;
                }

                if self.saturation != 1.0 {
                    let luma = LUMA_R * r + LUMA_G * g + LUMA_B * b;
                    b = luma + (b - luma) * self.saturation;
                    g = luma + (g - luma) * self.saturation;
                    r = luma + (r - luma) * self.saturation;
                }

                if self.hue_rotate_deg != 0.0 {
                    // SVG feColorMatrix hueRotate coefficients.
                    let nr = (LUMA_R + cos_h * (1.0 - LUMA_R) - sin_h * LUMA_R) * r
                        + (LUMA_G - cos_h * LUMA_G - sin_h * LUMA_G) * g
                        + (LUMA_B - cos_h * LUMA_B + sin_h * (1.0 - LUMA_B)) * b;
                    let ng = (LUMA_R - cos_h * LUMA_R + sin_h * 0.143) * r
                        + (LUMA_G + cos_h * (1.0 - LUMA_G) + sin_h * 0.140) * g
                        + (LUMA_B - cos_h * LUMA_B - sin_h * 0.283) * b;
                    let nb = (LUMA_R - cos_h * LUMA_R - sin_h * (1.0 - LUMA_R)) * r
                        + (LUMA_G - cos_h * LUMA_G + sin_h * LUMA_G) * g
                        + (LUMA_B + cos_h * (1.0 - LUMA_B) + sin_h * LUMA_B) * b;
                    r = nr;
                    g = ng;
                    b = nb;
                }

                if self.grayscale != 0.0 {
                    let mix = self.grayscale.clamp(0.0, 1.0);
                    let luma = LUMA_R * r + LUMA_G * g + LUMA_B * b;
                    b = b + (luma - b) * mix;
                    g = g + (luma - g) * mix;
                    r = r + (luma - r) * mix;
                }

                px[0] = (b.clamp(0.0, 1.0) * 255.0).round() as u8;
                px[1] = (g.clamp(0.0, 1.0) * 255.0).round() as u8;
                px[2] = (r.clamp(0.0, 1.0) * 255.0).round() as u8;
            }
        }

        if self.blur_px > 0 {
            box_blur(data, width, height, self.blur_px);
        }
    }
}

/// Separable box blur over the color channels, alpha untouched.
fn box_blur(data: &mut [u8], width: u32, height: u32, radius: u32) {
    let w = width as i64;
    let h = height as i64;
    let r = radius as i64;
    let mut scratch = data.to_vec();

    // Horizontal pass: data -> scratch.
    for y in 0..h {
        for x in 0..w {
            let mut sum = [0u32; 3];
            let mut count = 0u32;
            for dx in -r..=r {
                let sx = x + dx;
                if sx < 0 || sx >= w {
                    continue;
                }
                let idx = ((y * w + sx) * 4) as usize;
                for c in 0..3 {
                    sum[c] += data[idx + c] as u32;
                }
                count += 1;
            }
            let idx = ((y * w + x) * 4) as usize;
            for c in 0..3 {
                scratch[idx + c] = (sum[c] / count) as u8;
            }
        }
    }

    // Vertical pass: scratch -> data.
    for y in 0..h {
        for x in 0..w {
            let mut sum = [0u32; 3];
            let mut count = 0u32;
            for dy in -r..=r {
                let sy = y + dy;
                if sy < 0 || sy >= h {
                    continue;
                }
                let idx = ((sy * w + x) * 4) as usize;
                for c in 0..3 {
                    sum[c] += scratch[idx + c] as u32;
                }
                count += 1;
            }
            let idx = ((y * w + x) * 4) as usize;
            for c in 0..3 {
                data[idx + c] = (sum[c] / count) as u8;
            }
        }
    }
}
