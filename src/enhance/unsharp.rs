use image::RgbImage;
use rayon::prelude::*;

/// Fixed unsharp-mask parameters: 9x9 Gaussian with sigma 10, then
/// `1.5*src - 0.9*blurred + 5` saturated to the 8-bit range.
const KERNEL_RADIUS: usize = 4;
const KERNEL_SIZE: usize = 2 * KERNEL_RADIUS + 1;
const SIGMA: f32 = 10.0;
const SHARPEN_WEIGHT: f32 = 1.5;
const BLUR_WEIGHT: f32 = -0.9;
const OFFSET: f32 = 5.0;

fn gaussian_kernel() -> [f32; KERNEL_SIZE] {
    let mut kernel = [0.0f32; KERNEL_SIZE];
    let mut sum = 0.0;
    for (i, k) in kernel.iter_mut().enumerate() {
        let d = i as f32 - KERNEL_RADIUS as f32;
        *k = (-d * d / (2.0 * SIGMA * SIGMA)).exp();
        sum += *k;
    }
    for k in kernel.iter_mut() {
        *k /= sum;
    }
    kernel
}

/// Reflect-101 border indexing: ...2 1 | 0 1 2 ... n-1 | n-2 n-3...
#[inline]
fn reflect(mut i: isize, n: usize) -> usize {
    let n = n as isize;
    if n == 1 {
        return 0;
    }
    loop {
        if i < 0 {
            i = -i;
        } else if i >= n {
            i = 2 * n - 2 - i;
        } else {
            return i as usize;
        }
    }
}

/// Separable 9x9 Gaussian blur, quantized back to u8.
fn gaussian_blur(src: &RgbImage) -> RgbImage {
    let (w, h) = src.dimensions();
    let (wi, hi) = (w as usize, h as usize);
    let stride = wi * 3;
    let kernel = gaussian_kernel();
    let data = src.as_raw();

    let mut horiz = vec![0.0f32; wi * hi * 3];
    horiz
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..wi {
                for c in 0..3 {
                    let mut acc = 0.0;
                    for (k, &kv) in kernel.iter().enumerate() {
                        let sx = reflect(x as isize + k as isize - KERNEL_RADIUS as isize, wi);
                        acc += data[y * stride + sx * 3 + c] as f32 * kv;
                    }
                    row[x * 3 + c] = acc;
                }
            }
        });

    let mut out = vec![0u8; wi * hi * 3];
    out.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..wi {
                for c in 0..3 {
                    let mut acc = 0.0;
                    for (k, &kv) in kernel.iter().enumerate() {
                        let sy = reflect(y as isize + k as isize - KERNEL_RADIUS as isize, hi);
                        acc += horiz[sy * stride + x * 3 + c] * kv;
                    }
                    row[x * 3 + c] = acc.round().clamp(0.0, 255.0) as u8;
                }
            }
        });

    RgbImage::from_raw(w, h, out).expect("blur buffer matches image dimensions")
}

/// Sharpen by subtracting a scaled Gaussian blur from the scaled original.
///
/// Operates directly on RGB; output dimensions equal input dimensions.
pub fn unsharp_mask(img: &RgbImage) -> RgbImage {
    let blurred = gaussian_blur(img);
    let mut out = img.clone();
    for (op, bp) in out.pixels_mut().zip(blurred.pixels()) {
        for c in 0..3 {
            let v = SHARPEN_WEIGHT * op[c] as f32 + BLUR_WEIGHT * bp[c] as f32 + OFFSET;
            op.0[c] = v.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}
