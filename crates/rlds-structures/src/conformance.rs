//! Checks that episode records match the schema that claims to describe them.

use crate::shape::format_dims;
use crate::{
    Episode, Feature, FeatureDescriptor, FeaturesDict, Record, RldsDataError, RldsResult, Step, Tensor, Value, STEPS_KEY,
};

/// Verifies an episode against a full episode schema.
///
/// Episode-level keys must equal the schema's keys other than `"steps"`, and every
/// step must conform to the per-step schema.
pub fn check_episode(features: &FeaturesDict, episode: &Episode) -> RldsResult<()> {
    let steps_schema = features.steps()?;

    for (key, feature) in features.iter().filter(|(key, _)| key.as_str() != STEPS_KEY) {
        let value = episode
            .metadata
            .get(key)
            .ok_or_else(|| RldsDataError::missing_key(key.clone()))?;
        check_value(key, feature, value)?;
    }
    for key in episode.metadata.keys() {
        if key == STEPS_KEY || !features.contains_key(key) {
            return Err(RldsDataError::unsupported(key.clone(), "not declared in the feature schema"));
        }
    }

    for (index, step) in episode.steps.iter().enumerate() {
        check_record(&format!("{}[{}]", STEPS_KEY, index), steps_schema, &step.0)?;
    }
    Ok(())
}

/// Verifies a single step against the per-step schema.
pub fn check_step(steps_schema: &FeaturesDict, step: &Step) -> RldsResult<()> {
    check_record(STEPS_KEY, steps_schema, &step.0)
}

fn check_record(path: &str, schema: &FeaturesDict, record: &Record) -> RldsResult<()> {
    for (key, feature) in schema.iter() {
        let child_path = format!("{}/{}", path, key);
        let value = record
            .get(key)
            .ok_or_else(|| RldsDataError::missing_key(child_path.clone()))?;
        check_value(&child_path, feature, value)?;
    }
    if let Some(extra) = record.keys().find(|key| !schema.contains_key(key)) {
        return Err(RldsDataError::unsupported(
            format!("{}/{}", path, extra),
            "not declared in the feature schema",
        ));
    }
    Ok(())
}

fn check_value(path: &str, feature: &Feature, value: &Value) -> RldsResult<()> {
    match (feature, value) {
        (Feature::Leaf(descriptor), Value::Tensor(tensor)) => check_tensor(path, descriptor, tensor),
        (Feature::Dict(schema), Value::Dict(record)) => check_record(path, schema, record),
        (Feature::Sequence(_), _) => Err(RldsDataError::unsupported(
            path,
            "nested sequences are only allowed under the episode's steps",
        )),
        _ => Err(RldsDataError::unsupported(
            path,
            "value kind does not match the declared feature",
        )),
    }
}

fn check_tensor(path: &str, descriptor: &FeatureDescriptor, tensor: &Tensor) -> RldsResult<()> {
    if descriptor.dtype != tensor.dtype() {
        return Err(RldsDataError::DtypeMismatch {
            key: path.to_string(),
            expected: descriptor.dtype,
            actual: tensor.dtype(),
        });
    }
    if !descriptor.shape.matches(tensor.shape()) {
        return Err(RldsDataError::ShapeMismatch {
            key: path.to_string(),
            expected: descriptor.shape.to_string(),
            actual: format_dims(tensor.shape()),
        });
    }
    Ok(())
}
