//! Channel-order and LAB color-space conversions used internally by the
//! enhancement operators. Everything crossing a module boundary is RGB;
//! BGR and LAB only exist as intermediates inside CLAHE.

use image::RgbImage;

/// D65 reference white.
const D65_X: f32 = 0.95047;
const D65_Y: f32 = 1.00000;
const D65_Z: f32 = 1.08883;

/// sRGB to XYZ matrix (D65).
const SRGB_TO_XYZ: [[f32; 3]; 3] = [
    [0.4124564, 0.3575761, 0.1804375],
    [0.2126729, 0.7151522, 0.0721750],
    [0.0193339, 0.1191920, 0.9503041],
];

/// XYZ to sRGB matrix (D65).
const XYZ_TO_SRGB: [[f32; 3]; 3] = [
    [3.2404542, -1.5371385, -0.4985314],
    [-0.9692660, 1.8760108, 0.0415560],
    [0.0556434, -0.2040259, 1.0572252],
];

/// Reorder an RGB image into an interleaved BGR byte buffer.
pub fn rgb_to_bgr(img: &RgbImage) -> Vec<u8> {
    let mut bgr = Vec::with_capacity(img.as_raw().len());
    for p in img.pixels() {
        bgr.push(p[2]);
        bgr.push(p[1]);
        bgr.push(p[0]);
    }
    bgr
}

/// Reorder an interleaved BGR buffer back into an RGB image.
pub fn bgr_to_rgb(bgr: &[u8], width: u32, height: u32) -> RgbImage {
    let mut rgb = Vec::with_capacity(bgr.len());
    for px in bgr.chunks_exact(3) {
        rgb.push(px[2]);
        rgb.push(px[1]);
        rgb.push(px[0]);
    }
    RgbImage::from_raw(width, height, rgb)
        .unwrap_or_else(|| RgbImage::new(width, height))
}

#[inline]
fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

#[inline]
fn lab_f(t: f32) -> f32 {
    const DELTA: f32 = 6.0 / 29.0;
    const DELTA_CUBED: f32 = DELTA * DELTA * DELTA;

    if t > DELTA_CUBED {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

#[inline]
fn lab_f_inv(t: f32) -> f32 {
    const DELTA: f32 = 6.0 / 29.0;

    if t > DELTA {
        t * t * t
    } else {
        3.0 * DELTA * DELTA * (t - 4.0 / 29.0)
    }
}

/// Convert an interleaved BGR buffer to 8-bit L, a, b planes.
///
/// sRGB companding, XYZ (D65), then L*a*b*, encoded the usual 8-bit way:
/// L scaled from 0..100 to 0..255, a and b offset by +128.
pub fn bgr_to_lab(bgr: &[u8]) -> (Vec<u8>, Vec<u8>, Vec<u8>) {
    let count = bgr.len() / 3;
    let mut l_plane = Vec::with_capacity(count);
    let mut a_plane = Vec::with_capacity(count);
    let mut b_plane = Vec::with_capacity(count);

    for px in bgr.chunks_exact(3) {
        let b = srgb_to_linear(px[0] as f32 / 255.0);
        let g = srgb_to_linear(px[1] as f32 / 255.0);
        let r = srgb_to_linear(px[2] as f32 / 255.0);

        let x = SRGB_TO_XYZ[0][0] * r + SRGB_TO_XYZ[0][1] * g + SRGB_TO_XYZ[0][2] * b;
        let y = SRGB_TO_XYZ[1][0] * r + SRGB_TO_XYZ[1][1] * g + SRGB_TO_XYZ[1][2] * b;
        let z = SRGB_TO_XYZ[2][0] * r + SRGB_TO_XYZ[2][1] * g + SRGB_TO_XYZ[2][2] * b;

        let fx = lab_f(x / D65_X);
        let fy = lab_f(y / D65_Y);
        let fz = lab_f(z / D65_Z);

        let l_star = 116.0 * fy - 16.0;
        let a_star = 500.0 * (fx - fy);
        let b_star = 200.0 * (fy - fz);

        l_plane.push((l_star * 255.0 / 100.0).round().clamp(0.0, 255.0) as u8);
        a_plane.push((a_star + 128.0).round().clamp(0.0, 255.0) as u8);
        b_plane.push((b_star + 128.0).round().clamp(0.0, 255.0) as u8);
    }

    (l_plane, a_plane, b_plane)
}

/// Convert 8-bit L, a, b planes back to an interleaved BGR buffer.
pub fn lab_to_bgr(l_plane: &[u8], a_plane: &[u8], b_plane: &[u8]) -> Vec<u8> {
    let mut bgr = Vec::with_capacity(l_plane.len() * 3);

    for i in 0..l_plane.len() {
        let l_star = l_plane[i] as f32 * 100.0 / 255.0;
        let a_star = a_plane[i] as f32 - 128.0;
        let b_star = b_plane[i] as f32 - 128.0;

        let fy = (l_star + 16.0) / 116.0;
        let fx = a_star / 500.0 + fy;
        let fz = fy - b_star / 200.0;

        let x = D65_X * lab_f_inv(fx);
        let y = D65_Y * lab_f_inv(fy);
        let z = D65_Z * lab_f_inv(fz);

        let r = XYZ_TO_SRGB[0][0] * x + XYZ_TO_SRGB[0][1] * y + XYZ_TO_SRGB[0][2] * z;
        let g = XYZ_TO_SRGB[1][0] * x + XYZ_TO_SRGB[1][1] * y + XYZ_TO_SRGB[1][2] * z;
        let b = XYZ_TO_SRGB[2][0] * x + XYZ_TO_SRGB[2][1] * y + XYZ_TO_SRGB[2][2] * z;

        bgr.push((linear_to_srgb(b.clamp(0.0, 1.0)) * 255.0).round() as u8);
        bgr.push((linear_to_srgb(g.clamp(0.0, 1.0)) * 255.0).round() as u8);
        bgr.push((linear_to_srgb(r.clamp(0.0, 1.0)) * 255.0).round() as u8);
    }

    bgr
}
