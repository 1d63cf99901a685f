//! Bilinear resampling of single-channel planes.
//!
//! Every output sample is a blend of the four nearest source samples, weighted
//! by fractional distance. The mapping from output to source coordinates is
//! chosen by [`SamplingGrid`].

use rayon::prelude::*;

use crate::core::errors::{DigitError, DigitResult};
use crate::processors::types::SamplingGrid;

/// Precomputed neighbours and weights along one axis: `(i0, i1, w0, w1)`.
type AxisTap = (usize, usize, f32, f32);

/// Output rows below this count are resampled on the calling thread.
const PARALLEL_ROW_THRESHOLD: usize = 64;

/// Resamples a row-major `in_h x in_w` plane to `out_h x out_w`.
///
/// # Errors
///
/// Returns `InvalidImage` if the source plane is empty or its length does not
/// match the given dimensions, and a configuration error if the target has a
/// zero dimension.
pub fn resize_bilinear(
    plane: &[f32],
    in_h: usize,
    in_w: usize,
    out_h: usize,
    out_w: usize,
    grid: SamplingGrid,
) -> DigitResult<Vec<f32>> {
    if in_h == 0 || in_w == 0 {
        return Err(DigitError::empty_image(format!(
            "cannot resample a {in_w}x{in_h} plane"
        )));
    }
    if plane.len() != in_h * in_w {
        return Err(DigitError::invalid_image(format!(
            "plane holds {} samples, expected {}",
            plane.len(),
            in_h * in_w
        )));
    }
    if out_h == 0 || out_w == 0 {
        return Err(DigitError::config_error(format!(
            "target size must be positive, got {out_w}x{out_h}"
        )));
    }

    let y_lut = axis_taps(in_h, out_h, grid);
    let x_lut = axis_taps(in_w, out_w, grid);

    let mut out = vec![0f32; out_h * out_w];
    let fill_row = |(oy, row): (usize, &mut [f32])| {
        let (y0, y1, wy0, wy1) = y_lut[oy];
        let src0 = &plane[y0 * in_w..(y0 + 1) * in_w];
        let src1 = &plane[y1 * in_w..(y1 + 1) * in_w];
        for (dst, &(x0, x1, wx0, wx1)) in row.iter_mut().zip(&x_lut) {
            let top = src0[x0] * wx0 + src0[x1] * wx1;
            let bottom = src1[x0] * wx0 + src1[x1] * wx1;
            *dst = top * wy0 + bottom * wy1;
        }
    };

    if out_h >= PARALLEL_ROW_THRESHOLD {
        out.par_chunks_mut(out_w).enumerate().for_each(fill_row);
    } else {
        out.chunks_mut(out_w).enumerate().for_each(fill_row);
    }

    Ok(out)
}

fn axis_taps(in_len: usize, out_len: usize, grid: SamplingGrid) -> Vec<AxisTap> {
    let last = (in_len - 1) as f32;
    let ratio = in_len as f32 / out_len as f32;

    (0..out_len)
        .map(|o| {
            let src = match grid {
                SamplingGrid::HalfPixel => (o as f32 + 0.5) * ratio - 0.5,
                SamplingGrid::Asymmetric => o as f32 * ratio,
                SamplingGrid::AlignCorners => {
                    if out_len > 1 {
                        o as f32 * last / (out_len - 1) as f32
                    } else {
                        0.0
                    }
                }
            };
            let src = src.clamp(0.0, last);
            let i0 = src.floor() as usize;
            let i1 = (i0 + 1).min(in_len - 1);
            let w1 = src - i0 as f32;
            (i0, i1, 1.0 - w1, w1)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_size_is_identity() {
        // [[0, 1],
        //  [2, 3]]
        let base = vec![0f32, 1.0, 2.0, 3.0];
        for grid in [
            SamplingGrid::HalfPixel,
            SamplingGrid::Asymmetric,
            SamplingGrid::AlignCorners,
        ] {
            let out = resize_bilinear(&base, 2, 2, 2, 2, grid).unwrap();
            assert_eq!(out, base, "grid {:?}", grid);
        }
    }

    #[test]
    fn test_half_pixel_1x1_samples_the_centre() {
        let base = vec![0f32, 1.0, 2.0, 3.0];
        let out = resize_bilinear(&base, 2, 2, 1, 1, SamplingGrid::HalfPixel).unwrap();
        assert_eq!(out.len(), 1);
        assert!((out[0] - 1.5).abs() < 1e-6, "got {}", out[0]);
    }

    #[test]
    fn test_half_pixel_downscale_by_ten_blends_inner_pair() {
        // One row of 20 samples, value = column index. Output column o maps to
        // source 10 * o + 4.5, halfway between columns 4 and 5 of each block.
        let base: Vec<f32> = (0..20).map(|x| x as f32).collect();
        let out = resize_bilinear(&base, 1, 20, 1, 2, SamplingGrid::HalfPixel).unwrap();
        assert!((out[0] - 4.5).abs() < 1e-5);
        assert!((out[1] - 14.5).abs() < 1e-5);
    }

    #[test]
    fn test_asymmetric_downscale_picks_block_origin() {
        let base: Vec<f32> = (0..280).map(|x| x as f32).collect();
        let out = resize_bilinear(&base, 1, 280, 1, 28, SamplingGrid::Asymmetric).unwrap();
        for (o, v) in out.iter().enumerate() {
            assert!((v - (o * 10) as f32).abs() < 1e-4, "column {o}: {v}");
        }
    }

    #[test]
    fn test_align_corners_keeps_endpoints() {
        let base = vec![0f32, 10.0, 20.0, 30.0];
        let out = resize_bilinear(&base, 1, 4, 1, 7, SamplingGrid::AlignCorners).unwrap();
        assert_eq!(out[0], 0.0);
        assert!((out[6] - 30.0).abs() < 1e-5);
        assert!((out[1] - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_upscale_single_pixel() {
        let out = resize_bilinear(&[7.0], 1, 1, 3, 3, SamplingGrid::HalfPixel).unwrap();
        assert!(out.iter().all(|&v| v == 7.0));
    }

    #[test]
    fn test_uniform_plane_stays_uniform_on_large_targets() {
        let base = vec![128f32; 30 * 20];
        let out = resize_bilinear(&base, 30, 20, 100, 90, SamplingGrid::HalfPixel).unwrap();
        assert_eq!(out.len(), 100 * 90);
        assert!(out.iter().all(|&v| (v - 128.0).abs() < 1e-3));
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        assert!(resize_bilinear(&[], 0, 4, 2, 2, SamplingGrid::HalfPixel).is_err());
        assert!(resize_bilinear(&[1.0; 4], 2, 2, 0, 2, SamplingGrid::HalfPixel).is_err());
        assert!(resize_bilinear(&[1.0; 3], 2, 2, 1, 1, SamplingGrid::HalfPixel).is_err());
    }
}
