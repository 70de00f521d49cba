use image::RgbImage;
use rayon::prelude::*;

use crate::colorspace;

/// Fixed CLAHE parameters: clip limit 2.0 over an 8x8 tile grid.
const CLIP_LIMIT: f32 = 2.0;
const TILE_GRID: usize = 8;

/// Contrast-limited adaptive histogram equalization on the lightness
/// channel only.
///
/// The image goes RGB -> BGR -> LAB, the L plane is equalized per tile
/// with clipped histograms and bilinear blending between tile mappings,
/// then the untouched a/b planes are recombined and converted back.
pub fn clahe(img: &RgbImage) -> RgbImage {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return img.clone();
    }

    let bgr = colorspace::rgb_to_bgr(img);
    let (l_plane, a_plane, b_plane) = colorspace::bgr_to_lab(&bgr);

    let equalized = equalize_plane(&l_plane, w as usize, h as usize);

    let out_bgr = colorspace::lab_to_bgr(&equalized, &a_plane, &b_plane);
    colorspace::bgr_to_rgb(&out_bgr, w, h)
}

/// Tile boundaries for one axis: near-even partition, with boundary
/// tiles absorbing the remainder when the dimension is not divisible.
fn tile_bounds(extent: usize, tiles: usize) -> Vec<(usize, usize)> {
    (0..tiles)
        .map(|t| (t * extent / tiles, (t + 1) * extent / tiles))
        .collect()
}

/// Clip a tile histogram at `clip` and redistribute the excess across
/// the under-limit bins proportionally to their remaining headroom.
///
/// Single pass: no bin exceeds the limit afterwards, and the total
/// count is conserved exactly (up to float error).
fn clip_histogram(hist: &mut [f32; 256], clip: f32) {
    let mut excess = 0.0;
    for bin in hist.iter_mut() {
        if *bin > clip {
            excess += *bin - clip;
            *bin = clip;
        }
    }
    if excess <= 0.0 {
        return;
    }

    let headroom: f32 = hist.iter().filter(|&&b| b < clip).map(|&b| clip - b).sum();
    if headroom <= 0.0 {
        return;
    }
    for bin in hist.iter_mut() {
        if *bin < clip {
            *bin += (clip - *bin) * excess / headroom;
        }
    }
}

/// Equalization LUT from a clipped histogram.
///
/// The half-bin correction keeps a perfectly flat histogram on the
/// identity mapping, so flat regions pass through unchanged.
fn build_lut(hist: &[f32; 256], area: f32) -> [u8; 256] {
    let mut lut = [0u8; 256];
    let mut cdf = 0.0;
    for i in 0..256 {
        cdf += hist[i];
        let mapped = (cdf - hist[i] / 2.0) * 255.0 / area;
        lut[i] = mapped.round().clamp(0.0, 255.0) as u8;
    }
    lut
}

/// Locate the two tile centers surrounding position `p` on one axis and
/// the interpolation weight between them. Clamps to the nearest center
/// outside the first/last tile midpoints.
#[inline]
fn axis_lookup(centers: &[f32], p: f32) -> (usize, usize, f32) {
    if p <= centers[0] {
        return (0, 0, 0.0);
    }
    let last = centers.len() - 1;
    if p >= centers[last] {
        return (last, last, 0.0);
    }
    let mut i = 0;
    while p >= centers[i + 1] {
        i += 1;
    }
    (i, i + 1, (p - centers[i]) / (centers[i + 1] - centers[i]))
}

/// Adaptive equalization of a single 8-bit plane.
fn equalize_plane(plane: &[u8], w: usize, h: usize) -> Vec<u8> {
    let tiles_x = TILE_GRID.min(w);
    let tiles_y = TILE_GRID.min(h);
    let bounds_x = tile_bounds(w, tiles_x);
    let bounds_y = tile_bounds(h, tiles_y);
    let centers_x: Vec<f32> = bounds_x.iter().map(|&(a, b)| (a + b) as f32 / 2.0).collect();
    let centers_y: Vec<f32> = bounds_y.iter().map(|&(a, b)| (a + b) as f32 / 2.0).collect();

    // One clipped-histogram LUT per tile.
    let luts: Vec<[u8; 256]> = (0..tiles_x * tiles_y)
        .into_par_iter()
        .map(|tile| {
            let (x0, x1) = bounds_x[tile % tiles_x];
            let (y0, y1) = bounds_y[tile / tiles_x];
            let area = ((x1 - x0) * (y1 - y0)) as f32;

            let mut hist = [0.0f32; 256];
            for y in y0..y1 {
                for x in x0..x1 {
                    hist[plane[y * w + x] as usize] += 1.0;
                }
            }
            clip_histogram(&mut hist, CLIP_LIMIT * area / 256.0);
            build_lut(&hist, area)
        })
        .collect();

    // Map every pixel through the four surrounding tile mappings.
    let mut out = vec![0u8; w * h];
    out.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        let (ty0, ty1, ay) = axis_lookup(&centers_y, y as f32 + 0.5);
        for (x, slot) in row.iter_mut().enumerate() {
            let (tx0, tx1, ax) = axis_lookup(&centers_x, x as f32 + 0.5);
            let v = plane[y * w + x] as usize;

            let v00 = luts[ty0 * tiles_x + tx0][v] as f32;
            let v10 = luts[ty0 * tiles_x + tx1][v] as f32;
            let v01 = luts[ty1 * tiles_x + tx0][v] as f32;
            let v11 = luts[ty1 * tiles_x + tx1][v] as f32;

            let top = v00 * (1.0 - ax) + v10 * ax;
            let bottom = v01 * (1.0 - ax) + v11 * ax;
            *slot = (top * (1.0 - ay) + bottom * ay).round().clamp(0.0, 255.0) as u8;
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn tile_bounds_cover_irregular_extents() {
        let bounds = tile_bounds(100, 8);
        assert_eq!(bounds.len(), 8);
        assert_eq!(bounds[0].0, 0);
        assert_eq!(bounds[7].1, 100);
        for pair in bounds.windows(2) {
            assert_eq!(pair[0].1, pair[1].0, "tiles must be contiguous");
        }
    }

    #[test]
    fn clipped_histogram_respects_limit_and_conserves_count() {
        let area = 156.0f32;
        let clip = CLIP_LIMIT * area / 256.0;
        let mut hist = [0.0f32; 256];
        hist[40] = 100.0;
        hist[200] = 56.0;

        clip_histogram(&mut hist, clip);

        let total: f32 = hist.iter().sum();
        assert!((total - area).abs() < 1e-3);
        for &bin in hist.iter() {
            assert!(bin <= clip + 1e-4, "bin {bin} exceeds clip {clip}");
        }
    }

    #[test]
    fn flat_histogram_lut_is_identity() {
        let area = 2560.0f32;
        let hist = [area / 256.0; 256];
        let lut = build_lut(&hist, area);
        for (i, &v) in lut.iter().enumerate() {
            assert_eq!(v as usize, i);
        }
    }

    #[test]
    fn constant_plane_is_nearly_fixed() {
        for v in [5u8, 50, 128, 137, 200, 250] {
            let plane = vec![v; 100 * 100];
            let out = equalize_plane(&plane, 100, 100);
            for &o in &out {
                assert!(
                    (o as i16 - v as i16).abs() <= 1,
                    "constant {v} moved to {o}"
                );
            }
        }
    }

    #[test]
    fn constant_mid_gray_image_round_trips_exactly() {
        let img = RgbImage::from_pixel(100, 100, Rgb([128, 128, 128]));
        let out = clahe(&img);
        assert_eq!(out, img);
    }

    #[test]
    fn chrominance_is_preserved() {
        let img = RgbImage::from_fn(64, 48, |x, y| {
            Rgb([(x * 4) as u8, (y * 5) as u8, ((x + y) * 2) as u8])
        });
        let out = clahe(&img);
        assert_eq!(out.dimensions(), img.dimensions());

        // The a/b planes are passed through untouched internally; the small
        // tolerance here only absorbs the 8-bit re-quantization of measuring
        // them again from the output RGB.
        let (_, a_in, b_in) = colorspace::bgr_to_lab(&colorspace::rgb_to_bgr(&img));
        let (_, a_out, b_out) = colorspace::bgr_to_lab(&colorspace::rgb_to_bgr(&out));
        for i in 0..a_in.len() {
            assert!(
                (a_in[i] as i16 - a_out[i] as i16).abs() <= 3,
                "a* drifted at {i}"
            );
            assert!(
                (b_in[i] as i16 - b_out[i] as i16).abs() <= 3,
                "b* drifted at {i}"
            );
        }
    }

    #[test]
    fn dimensions_not_divisible_by_grid_still_work() {
        let img = RgbImage::from_fn(37, 23, |x, y| {
            let v = ((x * 11 + y * 17) % 256) as u8;
            Rgb([v, v, v])
        });
        let out = clahe(&img);
        assert_eq!(out.dimensions(), (37, 23));
    }

    #[test]
    fn extreme_inputs_stay_in_range() {
        for fill in [0u8, 255] {
            let img = RgbImage::from_pixel(16, 16, Rgb([fill, fill, fill]));
            let out = clahe(&img);
            assert_eq!(out.dimensions(), (16, 16));
            for px in out.pixels() {
                assert!(
                    (px[0] as i16 - fill as i16).abs() <= 1
                        && (px[1] as i16 - fill as i16).abs() <= 1
                        && (px[2] as i16 - fill as i16).abs() <= 1
                );
            }
        }
    }
}
