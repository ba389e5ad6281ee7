//! Image input shaping for the ulcer classifier.
//!
//! Decode → RGB → exact square resize → scale to [0, 1], laid out as a
//! single NHWC sample. The resize does not preserve aspect ratio and uses
//! nearest-neighbour sampling, which is what the deployed model was fed.

use image::imageops::FilterType;
use image::GenericImageView;
use tracing::debug;

use super::PredictionError;

/// Maximum accepted upload size before decoding.
const MAX_IMAGE_BYTES: usize = 50 * 1024 * 1024; // 50 MB

/// Normalized `size × size × 3` float tensor in row-major HWC order.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    pub size: u32,
    pub data: Vec<f32>,
}

impl ImageTensor {
    /// NHWC shape with a batch of one.
    pub fn shape(&self) -> [usize; 4] {
        [1, self.size as usize, self.size as usize, 3]
    }

    /// Channel values of the pixel at (x, y).
    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> [f32; 3] {
        let offset = ((y * self.size + x) * 3) as usize;
        [self.data[offset], self.data[offset + 1], self.data[offset + 2]]
    }
}

pub fn preprocess_image(bytes: &[u8], size: u32) -> Result<ImageTensor, PredictionError> {
    if bytes.is_empty() {
        return Err(PredictionError::ImageDecode("Image is empty".into()));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(PredictionError::ImageDecode(format!(
            "Image too large: {} bytes (max {MAX_IMAGE_BYTES})",
            bytes.len()
        )));
    }
    if size == 0 {
        return Err(PredictionError::InvalidInput("Target size must be positive".into()));
    }

    let img = image::load_from_memory(bytes)
        .map_err(|e| PredictionError::ImageDecode(format!("Failed to decode image: {e}")))?;
    let (orig_w, orig_h) = img.dimensions();

    let rgb = img.resize_exact(size, size, FilterType::Nearest).to_rgb8();
    let data: Vec<f32> = rgb.into_raw().into_iter().map(|v| v as f32 / 255.0).collect();

    debug!(
        original = format!("{orig_w}x{orig_h}"),
        output = format!("{size}x{size}"),
        "Image preprocessed for ulcer model"
    );

    Ok(ImageTensor { size, data })
}
