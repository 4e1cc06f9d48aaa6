use crate::image_ops::resize_spatial;
use crate::mod_function::{mod_obs_features, ModFunction};
use image::imageops::FilterType;
use rlds_structures::{
    DType, Dataset, Feature, FeatureDescriptor, FeatureKind, FeaturesDict, ImageEncoding, RldsDataError, RldsResult,
    Shape, Tensor, Value,
};
use std::sync::Arc;
use tracing::{debug, trace};

/// Downsizes image and depth observations to `MAX_RES` x `MAX_RES`.
///
/// An observation qualifies when it has at least two axes and both leading axes
/// are at least `MIN_SPATIAL_DIM` long. The same rule is applied to declared
/// shapes in [`ModFunction::mod_features`] and to runtime shapes in
/// [`ModFunction::mod_dataset`]. A declared shape whose variable leading axes
/// could go either way is rejected with `UnsupportedValue`, since the schema
/// cannot describe both outcomes.
///
/// Colour images become JPEG encoded `uint8` features. Keys containing `"depth"`
/// keep their dtype and are PNG encoded when they are image features.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResizeAndJpegEncode;

impl ResizeAndJpegEncode {
    pub const NAME: &'static str = "resize_and_jpeg_encode";
    pub const MAX_RES: usize = 256;
    pub const MIN_SPATIAL_DIM: usize = 64;
    const DEPTH_MARKER: &'static str = "depth";

    fn is_depth(key: &str) -> bool {
        key.contains(Self::DEPTH_MARKER)
    }

    /// Qualifying rule for declared shapes.
    pub fn qualifies_declared(shape: &Shape) -> bool {
        shape.rank() >= 2
            && shape.dim(0).is_some_and(|d| d >= Self::MIN_SPATIAL_DIM)
            && shape.dim(1).is_some_and(|d| d >= Self::MIN_SPATIAL_DIM)
    }

    /// True when a variable leading axis decides whether a declared shape qualifies.
    pub fn undecided_declared(shape: &Shape) -> bool {
        if shape.rank() < 2 {
            return false;
        }
        let leading = &shape.dims()[..2];
        leading.iter().any(Option::is_none)
            && leading.iter().flatten().all(|d| *d >= Self::MIN_SPATIAL_DIM)
    }

    /// Qualifying rule for runtime shapes.
    pub fn qualifies_runtime(shape: &[usize]) -> bool {
        shape.len() >= 2 && shape[0] >= Self::MIN_SPATIAL_DIM && shape[1] >= Self::MIN_SPATIAL_DIM
    }

    fn resized_descriptor(key: &str, descriptor: &FeatureDescriptor) -> FeatureDescriptor {
        let mut dims = vec![Some(Self::MAX_RES), Some(Self::MAX_RES)];
        dims.extend_from_slice(&descriptor.shape.dims()[2..]);
        let shape = Shape::new(dims);

        match descriptor.kind {
            FeatureKind::Image { .. } => {
                let encoding = if Self::is_depth(key) {
                    ImageEncoding::Png
                } else {
                    ImageEncoding::Jpeg
                };
                FeatureDescriptor::image(shape, descriptor.dtype, encoding, descriptor.doc.clone())
            }
            FeatureKind::Tensor => FeatureDescriptor::tensor(shape, descriptor.dtype, descriptor.doc.clone()),
        }
    }

    /// Resamples one qualifying observation value.
    fn resize_value(key: &str, tensor: &Tensor) -> RldsResult<Tensor> {
        let size = Self::MAX_RES;
        if Self::is_depth(key) {
            let resized = resize_spatial(&tensor.to_f32(key)?, size, size, FilterType::Triangle, key)?;
            Tensor::cast_from_f32(resized, tensor.dtype(), key)
        } else {
            // the declared dtype is kept, so only uint8 sources can become uint8 output
            if tensor.dtype() != DType::U8 {
                return Err(RldsDataError::DtypeMismatch {
                    key: key.to_string(),
                    expected: DType::U8,
                    actual: tensor.dtype(),
                });
            }
            let resized = resize_spatial(&tensor.to_f32(key)?, size, size, FilterType::Lanczos3, key)?;
            Tensor::cast_from_f32(resized, DType::U8, key)
        }
    }
}

impl ModFunction for ResizeAndJpegEncode {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn mod_features(&self, features: &FeaturesDict) -> RldsResult<FeaturesDict> {
        mod_obs_features(features, |key, feature| match &**feature {
            Feature::Leaf(descriptor) if Self::qualifies_declared(&descriptor.shape) => {
                let resized = Self::resized_descriptor(key, descriptor);
                debug!(
                    "Resizing observation '{}' from {} to {} ({:?})",
                    key, descriptor.shape, resized.shape, resized.encoding()
                );
                Ok(Arc::new(Feature::Leaf(resized)))
            }
            Feature::Leaf(descriptor) if Self::undecided_declared(&descriptor.shape) => {
                Err(RldsDataError::unsupported(
                    key,
                    format!("variable leading axes in {} leave the output size undecided", descriptor.shape),
                ))
            }
            _ => Ok(Arc::clone(feature)),
        })
    }

    fn mod_dataset<'a>(&self, dataset: Dataset<'a>) -> Dataset<'a> {
        dataset.map_steps(|mut step| {
            let observation = step.observation_mut()?;
            for (key, value) in observation.iter_mut() {
                let Value::Tensor(tensor) = value else {
                    continue;
                };
                if !Self::qualifies_runtime(tensor.shape()) {
                    continue;
                }
                trace!("Resampling '{}' of shape {:?}", key, tensor.shape());
                *tensor = Self::resize_value(key, tensor)?;
            }
            Ok(step)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlds_structures::{OBSERVATION_KEY, STEPS_KEY};

    #[test]
    fn test_qualifying_rule_needs_both_axes() {
        assert!(ResizeAndJpegEncode::qualifies_declared(&Shape::fixed(&[64, 64])));
        assert!(ResizeAndJpegEncode::qualifies_declared(&Shape::fixed(&[480, 640, 3])));
        assert!(!ResizeAndJpegEncode::qualifies_declared(&Shape::fixed(&[480, 7])));
        assert!(!ResizeAndJpegEncode::qualifies_declared(&Shape::fixed(&[100])));
        assert!(!ResizeAndJpegEncode::qualifies_declared(&Shape::new(vec![None, Some(128)])));

        assert!(ResizeAndJpegEncode::qualifies_runtime(&[64, 64]));
        assert!(!ResizeAndJpegEncode::qualifies_runtime(&[480, 7]));
        assert!(!ResizeAndJpegEncode::qualifies_runtime(&[7, 480, 3]));
    }

    #[test]
    fn test_undecided_declared_shapes() {
        assert!(ResizeAndJpegEncode::undecided_declared(&Shape::new(vec![None, Some(128), Some(3)])));
        assert!(ResizeAndJpegEncode::undecided_declared(&Shape::new(vec![None, None])));
        assert!(!ResizeAndJpegEncode::undecided_declared(&Shape::new(vec![None, Some(7)])));
        assert!(!ResizeAndJpegEncode::undecided_declared(&Shape::new(vec![None])));
        assert!(!ResizeAndJpegEncode::undecided_declared(&Shape::fixed(&[128, 128, 3])));
    }

    #[test]
    fn test_variable_leading_axis_is_rejected_in_features() {
        let image = FeatureDescriptor::image(
            Shape::new(vec![None, Some(128), Some(3)]),
            DType::U8,
            ImageEncoding::Png,
            None,
        );
        let observation = FeaturesDict::from_entries([("image", Feature::from(image))]);
        let steps = FeaturesDict::from_entries([(OBSERVATION_KEY, Feature::Dict(observation))]);
        let features = FeaturesDict::from_entries([(STEPS_KEY, Feature::Sequence(steps))]);

        match ResizeAndJpegEncode.mod_features(&features) {
            Err(RldsDataError::UnsupportedValue { key, .. }) => assert_eq!(key, "image"),
            other => panic!("expected UnsupportedValue, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_axes_survive_in_declared_shape() {
        let descriptor = FeatureDescriptor::tensor(Shape::fixed(&[128, 96, 2, 5]), DType::F32, None);
        let resized = ResizeAndJpegEncode::resized_descriptor("point_cloud", &descriptor);
        assert_eq!(resized.shape, Shape::fixed(&[256, 256, 2, 5]));
    }

    #[test]
    fn test_non_depth_float_values_fail_loudly() {
        let tensor = Tensor::zeros(DType::F32, &[128, 128, 3]);
        assert!(matches!(
            ResizeAndJpegEncode::resize_value("image", &tensor),
            Err(RldsDataError::DtypeMismatch { expected: DType::U8, actual: DType::F32, .. })
        ));
    }

    #[test]
    fn test_depth_keeps_dtype() {
        let tensor = Tensor::zeros(DType::U16, &[100, 100]);
        let resized = ResizeAndJpegEncode::resize_value("depth", &tensor).unwrap();
        assert_eq!(resized.dtype(), DType::U16);
        assert_eq!(resized.shape(), &[256, 256]);
    }
}
