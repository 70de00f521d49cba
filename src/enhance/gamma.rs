use image::RgbImage;

use crate::error::EnhanceError;

/// Build the 256-entry tone curve for the given gamma.
///
/// `table[i] = round(255 * (i/255)^(1/gamma))`. The table is rebuilt on
/// every call since the parameter can change between requests.
fn build_table(gamma: f64) -> [u8; 256] {
    let inv_gamma = 1.0 / gamma;
    let mut table = [0u8; 256];
    for (i, entry) in table.iter_mut().enumerate() {
        let mapped = (i as f64 / 255.0).powf(inv_gamma) * 255.0;
        *entry = mapped.round().clamp(0.0, 255.0) as u8;
    }
    table
}

/// Apply gamma correction to every sample of every channel.
///
/// Gamma below 1 brightens midtones, above 1 darkens them, exactly 1 is
/// the identity. Fails fast for gamma at or below zero.
pub fn gamma_correct(img: &RgbImage, gamma: f64) -> Result<RgbImage, EnhanceError> {
    if gamma <= 0.0 {
        return Err(EnhanceError::InvalidGamma(gamma));
    }

    let table = build_table(gamma);
    let mut out = img.clone();
    for px in out.pixels_mut() {
        for c in px.0.iter_mut() {
            *c = table[*c as usize];
        }
    }
    Ok(out)
}
