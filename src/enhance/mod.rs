pub mod clahe;
pub mod gamma;
pub mod unsharp;

use image::RgbImage;

use crate::error::EnhanceError;

/// Default and UI range for the gamma parameter.
pub const DEFAULT_GAMMA: f64 = 1.0;
pub const GAMMA_RANGE: std::ops::RangeInclusive<f64> = 0.1..=3.0;

/// The three mutually exclusive enhancement methods. Only gamma
/// correction carries a user parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Method {
    Clahe,
    UnsharpMask,
    GammaCorrection { gamma: f64 },
}

impl Method {
    pub fn name(self) -> &'static str {
        match self {
            Method::Clahe => "CLAHE",
            Method::UnsharpMask => "Unsharp Masking",
            Method::GammaCorrection { .. } => "Gamma Correction",
        }
    }

    /// Caption shown under the enhanced preview.
    pub fn caption(self) -> String {
        match self {
            Method::Clahe => "Enhanced Image (CLAHE)".to_string(),
            Method::UnsharpMask => "Sharpened Image (Unsharp Masking)".to_string(),
            Method::GammaCorrection { gamma } => {
                format!("Gamma Corrected Image (γ = {gamma:.1})")
            }
        }
    }

    /// Run the selected operator on a canonical RGB image.
    pub fn apply(self, img: &RgbImage) -> Result<RgbImage, EnhanceError> {
        match self {
            Method::Clahe => Ok(clahe::clahe(img)),
            Method::UnsharpMask => Ok(unsharp::unsharp_mask(img)),
            Method::GammaCorrection { gamma } => gamma::gamma_correct(img, gamma),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn sample() -> RgbImage {
        RgbImage::from_fn(21, 13, |x, y| {
            Rgb([(x * 12) as u8, (y * 19) as u8, ((x * y) % 256) as u8])
        })
    }

    #[test]
    fn every_method_preserves_dimensions_and_channels() {
        let img = sample();
        let methods = [
            Method::Clahe,
            Method::UnsharpMask,
            Method::GammaCorrection { gamma: 0.7 },
        ];
        for method in methods {
            let out = method.apply(&img).unwrap();
            assert_eq!(out.dimensions(), img.dimensions(), "{}", method.name());
        }
    }

    #[test]
    fn invalid_gamma_fails_through_dispatch() {
        let img = sample();
        let result = Method::GammaCorrection { gamma: 0.0 }.apply(&img);
        assert!(matches!(result, Err(EnhanceError::InvalidGamma(_))));
    }

    #[test]
    fn decode_enhance_encode_runs_end_to_end() {
        let img = RgbImage::from_pixel(100, 100, Rgb([128, 128, 128]));
        let bytes = crate::image_io::encode_png(&img).unwrap();

        let decoded = crate::image_io::decode(&bytes).unwrap();
        let enhanced = Method::GammaCorrection { gamma: 2.0 }
            .apply(&decoded)
            .unwrap();
        let out = crate::image_io::encode_png(&enhanced).unwrap();

        let reloaded = crate::image_io::decode(&out).unwrap();
        for px in reloaded.pixels() {
            assert_eq!(px, &Rgb([181, 181, 181]));
        }
    }

    #[test]
    fn captions_match_the_selected_method() {
        assert_eq!(Method::Clahe.caption(), "Enhanced Image (CLAHE)");
        assert_eq!(
            Method::UnsharpMask.caption(),
            "Sharpened Image (Unsharp Masking)"
        );
        assert_eq!(
            Method::GammaCorrection { gamma: 2.0 }.caption(),
            "Gamma Corrected Image (γ = 2.0)"
        );
    }
}
