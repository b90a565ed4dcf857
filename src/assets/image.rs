use std::{path::Path, sync::Arc};

use anyhow::Context;

use crate::foundation::{
    error::{SlidecastError, SlidecastResult},
    math::premultiply_rgba8_in_place,
};

/// One decoded still image. Dimensions and pixels are fixed once decoded;
/// the pixel buffer is premultiplied RGBA8.
#[derive(Clone, Debug)]
pub struct SourceImage {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl SourceImage {
    pub fn from_rgba8_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> SlidecastResult<Self> {
        if rgba8_premul.len() != width as usize * height as usize * 4 {
            return Err(SlidecastError::validation(
                "image byte length must equal width*height*4",
            ));
        }
        if width == 0 || height == 0 {
            return Err(SlidecastError::validation("image dimensions must be non-zero"));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }
}

pub fn decode_image(bytes: &[u8]) -> SlidecastResult<SourceImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    SourceImage::from_rgba8_premul(width, height, rgba8_premul)
}

/// Decode every image before the first scheduler tick. Lazy per-tick decode
/// risks skipped or duplicated frames when decode latency exceeds the frame
/// interval, so all decoding is front-loaded.
pub fn load_images(paths: &[impl AsRef<Path>]) -> SlidecastResult<Vec<SourceImage>> {
    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read image '{}'", path.display()))?;
        out.push(decode_image(&bytes)?);
    }
    Ok(out)
}
