//! Image Enhancement Suite - library crate.
//!
//! Provides the enhancement pipeline (CLAHE, unsharp masking, gamma
//! correction) and the image decode/encode plumbing around it for use
//! by the desktop application.

pub mod colorspace;
pub mod enhance;
pub mod error;
pub mod image_io;
