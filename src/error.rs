use thiserror::Error;

/// Errors produced by the enhancement pipeline.
#[derive(Debug, Error)]
pub enum EnhanceError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode PNG: {0}")]
    Encode(#[source] image::ImageError),

    /// Inverse gamma is undefined at zero, so anything at or below
    /// zero is rejected before touching pixel data.
    #[error("invalid gamma value {0}: must be greater than zero")]
    InvalidGamma(f64),
}
