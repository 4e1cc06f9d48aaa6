//! Spatial resampling of image-like arrays.
//!
//! Arrays are laid out as (height, width, trailing...). Every trailing position is
//! treated as an independent channel plane and resampled with the `image` crate's
//! filters, channels in parallel.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma};
use ndarray::{ArrayD, IxDyn};
use rayon::prelude::*;
use rlds_structures::{format_dims, RldsDataError, RldsResult};

/// Resamples the first two axes of `array` to `height` x `width`.
pub fn resize_spatial(
    array: &ArrayD<f32>,
    height: usize,
    width: usize,
    filter: FilterType,
    key: &str,
) -> RldsResult<ArrayD<f32>> {
    let shape = array.shape();
    if shape.len() < 2 {
        return Err(RldsDataError::ShapeMismatch {
            key: key.to_string(),
            expected: "at least two spatial axes".to_string(),
            actual: format_dims(shape),
        });
    }
    let (src_height, src_width) = (shape[0], shape[1]);
    let trailing = &shape[2..];
    let channels: usize = trailing.iter().product();
    if src_height == 0 || src_width == 0 || channels == 0 {
        return Err(RldsDataError::unsupported(
            key,
            format!("cannot resample an empty array of shape {}", format_dims(shape)),
        ));
    }

    // logical (row-major) order regardless of the array's memory layout
    let data: Vec<f32> = array.iter().copied().collect();

    let planes: Vec<Vec<f32>> = (0..channels)
        .into_par_iter()
        .map(|channel| {
            let plane: Vec<f32> = data.iter().skip(channel).step_by(channels).copied().collect();
            resize_plane(plane, (src_height, src_width), (height, width), filter, key)
        })
        .collect::<RldsResult<Vec<Vec<f32>>>>()?;

    let mut interleaved = Vec::with_capacity(height * width * channels);
    for pixel in 0..height * width {
        for plane in &planes {
            interleaved.push(plane[pixel]);
        }
    }

    let mut out_shape = vec![height, width];
    out_shape.extend_from_slice(trailing);
    ArrayD::from_shape_vec(IxDyn(&out_shape), interleaved)
        .map_err(|e| RldsDataError::InternalError(format!("Resized array has wrong size: {}", e)))
}

/// Resamples one channel plane.
///
/// `imageops::resize` clamps floating point samples to [0, 1], so the plane is
/// normalised to that range first and mapped back afterwards. Filter overshoot
/// therefore never leaves the plane's original value range.
fn resize_plane(
    plane: Vec<f32>,
    (src_height, src_width): (usize, usize),
    (height, width): (usize, usize),
    filter: FilterType,
    key: &str,
) -> RldsResult<Vec<f32>> {
    let (low, high) = plane
        .iter()
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    if high <= low {
        let fill = if low.is_finite() { low } else { 0.0 };
        return Ok(vec![fill; height * width]);
    }
    let range = high - low;

    let normalised: Vec<f32> = plane.iter().map(|v| (v - low) / range).collect();
    let buffer: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_raw(to_u32(src_width, key)?, to_u32(src_height, key)?, normalised).ok_or_else(|| {
            RldsDataError::InternalError(format!("Plane of '{}' does not match its dimensions", key))
        })?;
    let resized = imageops::resize(&buffer, to_u32(width, key)?, to_u32(height, key)?, filter);
    Ok(resized.into_raw().into_iter().map(|v| v * range + low).collect())
}

fn to_u32(value: usize, key: &str) -> RldsResult<u32> {
    u32::try_from(value)
        .map_err(|_| RldsDataError::unsupported(key, format!("dimension {} exceeds the resampler's range", value)))
}
