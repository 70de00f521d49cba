use image::{ImageFormat, RgbImage};
use std::io::Cursor;

use crate::error::EnhanceError;

/// Decode an uploaded byte blob into a canonical 8-bit RGB buffer.
///
/// Any source color mode (grayscale, RGBA, palette) is normalized to
/// 3-channel RGB; alpha is discarded.
pub fn decode(bytes: &[u8]) -> Result<RgbImage, EnhanceError> {
    let img = image::load_from_memory(bytes).map_err(EnhanceError::Decode)?;
    Ok(img.to_rgb8())
}

/// Serialize a canonical RGB image to PNG bytes.
///
/// PNG is lossless, so sample values survive the save/reload round trip
/// exactly.
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>, EnhanceError> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(EnhanceError::Encode)?;
    Ok(bytes)
}
