use image::{imageops, DynamicImage, GrayImage};
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to load image: {0}")]
    Load(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// Hard binarization cutoff: pixels below this intensity become black.
pub const BINARIZE_THRESHOLD: u8 = 140;

/// Fixed integer upscale applied last; the engine reads small glyphs badly.
pub const UPSCALE_FACTOR: u32 = 3;

/// 3×3 sharpening kernel, restores edge contrast lost to the median pass.
const SHARPEN_KERNEL: [f32; 9] = [0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0];

/// Process raw image bytes (JPEG / PNG / WEBP / …) and return an
/// OCR-friendly binarized PNG.
pub fn prepare_for_ocr_from_bytes(data: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let img = image::load_from_memory(data)?;
    encode_as_png(normalize(img))
}

/// Grayscale → denoise → sharpen → binarize → upscale, in that order.
fn normalize(img: DynamicImage) -> DynamicImage {
    let gray: GrayImage = img.to_luma8();

    // 3×3 median window: removes salt-and-pepper noise without eating
    // thin pen strokes.
    let denoised = imageproc::filter::median_filter(&gray, 1, 1);

    let sharpened = imageops::filter3x3(&denoised, &SHARPEN_KERNEL);

    let binary = binarize(sharpened, BINARIZE_THRESHOLD);

    // Not adaptive: documents with strong lighting gradients lose
    // legibility here. Known limitation of the hard cutoff.
    let upscaled = imageops::resize(
        &binary,
        binary.width() * UPSCALE_FACTOR,
        binary.height() * UPSCALE_FACTOR,
        imageops::FilterType::Lanczos3,
    );

    DynamicImage::ImageLuma8(upscaled)
}

fn binarize(mut img: GrayImage, threshold: u8) -> GrayImage {
    for px in img.pixels_mut() {
        px[0] = if px[0] < threshold { 0 } else { 255 };
    }
    img
}

fn encode_as_png(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}
