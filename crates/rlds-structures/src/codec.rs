//! Encoding of image feature values to and from their compressed byte form.
//!
//! JPEG accepts `uint8` images with 1 or 3 channels. PNG accepts `uint8` images with
//! 1 to 4 channels and single channel `uint16` images (depth maps). A rank 2 value
//! is treated as a single channel image, and decodes back to rank 2 when its
//! declared shape has rank 2.

use crate::shape::format_dims;
use crate::{ImageEncoding, RldsDataError, RldsResult, Shape, Tensor};
use image::{DynamicImage, ImageBuffer, ImageFormat, Luma};
use ndarray::{ArrayD, IxDyn};

fn image_format(encoding: ImageEncoding) -> ImageFormat {
    match encoding {
        ImageEncoding::Jpeg => ImageFormat::Jpeg,
        ImageEncoding::Png => ImageFormat::Png,
    }
}

/// Returns (height, width, channels) of an image shaped tensor.
fn image_dims(tensor: &Tensor) -> RldsResult<(u32, u32, usize)> {
    let shape = tensor.shape();
    let (height, width, channels) = match shape {
        [h, w] => (*h, *w, 1),
        [h, w, c] => (*h, *w, *c),
        _ => {
            return Err(RldsDataError::ShapeMismatch {
                key: "image".to_string(),
                expected: "(height, width) or (height, width, channels)".to_string(),
                actual: format_dims(shape),
            })
        }
    };
    let to_u32 = |v: usize| {
        u32::try_from(v).map_err(|_| RldsDataError::Codec(format!("Image dimension {} is too large!", v)))
    };
    Ok((to_u32(height)?, to_u32(width)?, channels))
}

fn raw_u8(array: &ArrayD<u8>) -> Vec<u8> {
    array.iter().copied().collect()
}

/// Compresses an image value with the given encoding.
pub fn encode_image(tensor: &Tensor, encoding: ImageEncoding) -> RldsResult<Vec<u8>> {
    let (height, width, channels) = image_dims(tensor)?;
    let buffer_error = || RldsDataError::InternalError("Pixel buffer does not match image dimensions".to_string());

    let dynamic_img = match (tensor, channels) {
        (Tensor::U8(array), 1) => {
            DynamicImage::ImageLuma8(ImageBuffer::from_raw(width, height, raw_u8(array)).ok_or_else(buffer_error)?)
        }
        (Tensor::U8(array), 2) => {
            DynamicImage::ImageLumaA8(ImageBuffer::from_raw(width, height, raw_u8(array)).ok_or_else(buffer_error)?)
        }
        (Tensor::U8(array), 3) => {
            DynamicImage::ImageRgb8(ImageBuffer::from_raw(width, height, raw_u8(array)).ok_or_else(buffer_error)?)
        }
        (Tensor::U8(array), 4) => {
            DynamicImage::ImageRgba8(ImageBuffer::from_raw(width, height, raw_u8(array)).ok_or_else(buffer_error)?)
        }
        (Tensor::U16(array), 1) => {
            let buffer: ImageBuffer<Luma<u16>, Vec<u16>> =
                ImageBuffer::from_raw(width, height, array.iter().copied().collect()).ok_or_else(buffer_error)?;
            DynamicImage::ImageLuma16(buffer)
        }
        _ => {
            return Err(RldsDataError::Codec(format!(
                "Cannot encode a {} image with {} channels!",
                tensor.dtype(),
                channels
            )))
        }
    };

    if encoding == ImageEncoding::Jpeg
        && !matches!(dynamic_img, DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_))
    {
        return Err(RldsDataError::Codec(
            "JPEG only supports uint8 images with 1 or 3 channels!".to_string(),
        ));
    }

    let mut buffer = Vec::new();
    dynamic_img
        .write_to(&mut std::io::Cursor::new(&mut buffer), image_format(encoding))
        .map_err(|e| RldsDataError::Codec(format!("Failed to encode {}: {}", encoding, e)))?;
    Ok(buffer)
}

/// Decodes compressed bytes into a tensor of the `declared` shape.
///
/// Single channel images decode to (height, width) when `declared` has rank 2 and
/// to (height, width, 1) otherwise. A result that does not match `declared` is a
/// `ShapeMismatch`.
pub fn decode_image(bytes: &[u8], encoding: ImageEncoding, declared: &Shape) -> RldsResult<Tensor> {
    let img = image::load_from_memory_with_format(bytes, image_format(encoding))
        .map_err(|e| RldsDataError::Codec(format!("Failed to decode {}: {}", encoding, e)))?;
    let (width, height) = (img.width() as usize, img.height() as usize);
    let dims = |channels: usize| {
        if channels == 1 && declared.rank() == 2 {
            IxDyn(&[height, width])
        } else {
            IxDyn(&[height, width, channels])
        }
    };
    let shape_error = |e: ndarray::ShapeError| RldsDataError::InternalError(e.to_string());

    let tensor = match img {
        DynamicImage::ImageLuma8(buffer) => {
            Tensor::U8(ArrayD::from_shape_vec(dims(1), buffer.into_raw()).map_err(shape_error)?)
        }
        DynamicImage::ImageLumaA8(buffer) => {
            Tensor::U8(ArrayD::from_shape_vec(dims(2), buffer.into_raw()).map_err(shape_error)?)
        }
        DynamicImage::ImageRgba8(buffer) => {
            Tensor::U8(ArrayD::from_shape_vec(dims(4), buffer.into_raw()).map_err(shape_error)?)
        }
        DynamicImage::ImageLuma16(buffer) => {
            Tensor::U16(ArrayD::from_shape_vec(dims(1), buffer.into_raw()).map_err(shape_error)?)
        }
        other => Tensor::U8(ArrayD::from_shape_vec(dims(3), other.to_rgb8().into_raw()).map_err(shape_error)?),
    };

    if !declared.matches(tensor.shape()) {
        return Err(RldsDataError::ShapeMismatch {
            key: "image".to_string(),
            expected: declared.to_string(),
            actual: format_dims(tensor.shape()),
        });
    }
    Ok(tensor)
}
