use kurbo::{Affine, Point};

use crate::{
    assets::image::SourceImage,
    foundation::core::Canvas,
    foundation::error::{SlidecastError, SlidecastResult},
    foundation::math::{mul_div255_u8, mul_div255_u16},
};

/// One rendered frame: premultiplied RGBA8 unless flattened downstream.
#[derive(Clone, Debug)]
pub struct FrameRgba {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

/// Source-over for premultiplied RGBA8 with an extra opacity factor.
pub fn over(dst: [u8; 4], src: [u8; 4], opacity: f32) -> [u8; 4] {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Uniform cover scaling: the image fills the canvas, overflow is cropped,
/// centered on both axes. Never stretches non-uniformly.
pub fn cover_affine(canvas: Canvas, image_width: u32, image_height: u32) -> Affine {
    let cw = f64::from(canvas.width);
    let ch = f64::from(canvas.height);
    let iw = f64::from(image_width);
    let ih = f64::from(image_height);

    let scale = (cw / iw).max(ch / ih);
    let dx = (cw - iw * scale) / 2.0;
    let dy = (ch - ih * scale) / 2.0;
    Affine::translate((dx, dy)) * Affine::scale(scale)
}

/// The drawing surface for one render job. Exclusively owned by that job;
/// acquired at job start and released with it.
pub struct Compositor {
    canvas: Canvas,
    data: Vec<u8>,
}

impl Compositor {
    pub fn new(canvas: Canvas) -> SlidecastResult<Self> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(SlidecastError::validation(
                "compositor canvas must be non-zero",
            ));
        }
        Ok(Self {
            data: vec![0u8; canvas.pixel_bytes()],
            canvas,
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn clear(&mut self, rgba8_premul: [u8; 4]) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba8_premul);
        }
    }

    /// Draw `image` through `transform` (canvas coordinates, composed over
    /// the image's cover scaling) with bilinear sampling and `over` blending.
    ///
    /// A degenerate transform (zero determinant, e.g. the flip midpoint)
    /// draws nothing.
    pub fn draw_image(
        &mut self,
        image: &SourceImage,
        transform: Affine,
        opacity: f32,
    ) -> SlidecastResult<()> {
        if opacity <= 0.0 {
            return Ok(());
        }

        let full = transform * cover_affine(self.canvas, image.width, image.height);
        if full.determinant().abs() < 1e-12 {
            return Ok(());
        }
        let inv = full.inverse();

        let width = self.canvas.width as usize;
        let src = image.rgba8_premul.as_slice();
        for y in 0..self.canvas.height as usize {
            let row = &mut self.data[y * width * 4..(y + 1) * width * 4];
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let p = inv * Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let sampled = sample_bilinear(src, image.width, image.height, p.x - 0.5, p.y - 0.5);
                if sampled[3] == 0 && opacity >= 1.0 {
                    continue;
                }
                let blended = over([px[0], px[1], px[2], px[3]], sampled, opacity);
                px.copy_from_slice(&blended);
            }
        }
        Ok(())
    }

    pub fn frame(&self) -> FrameRgba {
        FrameRgba {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.data.clone(),
            premultiplied: true,
        }
    }
}

/// Bilinear sample of a premultiplied RGBA8 buffer; outside the image is
/// fully transparent.
fn sample_bilinear(src: &[u8], width: u32, height: u32, x: f64, y: f64) -> [u8; 4] {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let x0 = x0 as i64;
    let y0 = y0 as i64;

    let fetch = |xi: i64, yi: i64| -> [u8; 4] {
        if xi < 0 || yi < 0 || xi >= i64::from(width) || yi >= i64::from(height) {
            return [0, 0, 0, 0];
        }
        let off = (yi as usize * width as usize + xi as usize) * 4;
        [src[off], src[off + 1], src[off + 2], src[off + 3]]
    };

    let p00 = fetch(x0, y0);
    let p10 = fetch(x0 + 1, y0);
    let p01 = fetch(x0, y0 + 1);
    let p11 = fetch(x0 + 1, y0 + 1);

    let wx = ((fx * 255.0).round() as i32).clamp(0, 255) as u16;
    let wy = ((fy * 255.0).round() as i32).clamp(0, 255) as u16;
    let iwx = 255 - wx;
    let iwy = 255 - wy;

    let mut out = [0u8; 4];
    for i in 0..4 {
        let top = mul_div255_u16(u16::from(p00[i]), iwx) + mul_div255_u16(u16::from(p10[i]), wx);
        let bottom = mul_div255_u16(u16::from(p01[i]), iwx) + mul_div255_u16(u16::from(p11[i]), wx);
        let v = mul_div255_u16(top, iwy) + mul_div255_u16(bottom, wy);
        out[i] = v.min(255) as u8;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/engine/compositor.rs"]
mod tests;
