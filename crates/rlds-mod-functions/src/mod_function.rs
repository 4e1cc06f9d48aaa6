use rlds_structures::{Dataset, Feature, FeaturesDict, RldsResult, OBSERVATION_KEY, STEPS_KEY};
use std::fmt::Debug;
use std::sync::Arc;

/// A named transform over a dataset and the schema describing it.
///
/// `mod_features` and `mod_dataset` must agree: for any schema `S` and dataset
/// `D` conforming to it, `mod_dataset(D)` conforms to `mod_features(S)`.
/// Implementations hold no mutable state and must not evaluate the dataset;
/// all per-episode work is expressed through the lazy [`Dataset`] combinators.
pub trait ModFunction: Debug + Send + Sync {
    /// Identifier the function is registered under.
    fn name(&self) -> &'static str;

    /// Returns the schema the modified dataset will yield. Never mutates the input.
    fn mod_features(&self, features: &FeaturesDict) -> RldsResult<FeaturesDict>;

    /// Wraps the dataset in the lazy transform matching [`ModFunction::mod_features`].
    fn mod_dataset<'a>(&self, dataset: Dataset<'a>) -> Dataset<'a>;
}

/// Rewrites only the `steps/observation` entries of a schema.
///
/// `obs_feature_mod` is called once per observation key, in order, and its
/// result replaces that entry. Every other entry, at any level, is shared
/// with the input rather than copied. Errors from `obs_feature_mod` and a
/// missing `steps` or `observation` entry are returned unchanged.
pub fn mod_obs_features<F>(features: &FeaturesDict, mut obs_feature_mod: F) -> RldsResult<FeaturesDict>
where
    F: FnMut(&str, &Arc<Feature>) -> RldsResult<Arc<Feature>>,
{
    let steps = features.steps()?;
    let observation = features.observation()?;

    let mut new_observation = FeaturesDict::new();
    for (key, feature) in observation.iter() {
        new_observation.insert_shared(key.clone(), obs_feature_mod(key.as_str(), feature)?);
    }

    let mut new_steps = FeaturesDict::new();
    for (key, feature) in steps.iter() {
        if key == OBSERVATION_KEY {
            new_steps.insert(key.clone(), Feature::Dict(std::mem::take(&mut new_observation)));
        } else {
            new_steps.insert_shared(key.clone(), Arc::clone(feature));
        }
    }

    let mut new_features = FeaturesDict::new();
    for (key, feature) in features.iter() {
        if key == STEPS_KEY {
            new_features.insert(key.clone(), Feature::Sequence(std::mem::take(&mut new_steps)));
        } else {
            new_features.insert_shared(key.clone(), Arc::clone(feature));
        }
    }
    Ok(new_features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlds_structures::{DType, FeatureDescriptor, RldsDataError, Shape};

    fn leaf(dims: &[usize]) -> Feature {
        Feature::Leaf(FeatureDescriptor::tensor(Shape::fixed(dims), DType::F32, None))
    }

    fn schema() -> FeaturesDict {
        let observation = FeaturesDict::from_entries([("wrist_image", leaf(&[128, 128, 3])), ("state", leaf(&[7]))]);
        let steps = FeaturesDict::from_entries([
            ("action", leaf(&[7])),
            ("observation", Feature::Dict(observation)),
            ("reward", leaf(&[])),
        ]);
        FeaturesDict::from_entries([("episode_metadata", leaf(&[1])), ("steps", Feature::Sequence(steps))])
    }

    #[test]
    fn test_identity_rewrite_shares_untouched_entries() {
        let original = schema();
        let rewritten = mod_obs_features(&original, |_, feature| Ok(Arc::clone(feature))).unwrap();
        assert_eq!(rewritten, original);

        let original_steps = original.steps().unwrap();
        let rewritten_steps = rewritten.steps().unwrap();
        assert!(Arc::ptr_eq(original_steps.get("action").unwrap(), rewritten_steps.get("action").unwrap()));
        assert!(Arc::ptr_eq(
            original.get("episode_metadata").unwrap(),
            rewritten.get("episode_metadata").unwrap()
        ));
    }

    #[test]
    fn test_key_order_is_preserved_at_every_level() {
        let rewritten = mod_obs_features(&schema(), |_, feature| Ok(Arc::clone(feature))).unwrap();
        assert_eq!(rewritten.keys().collect::<Vec<_>>(), vec!["episode_metadata", "steps"]);
        assert_eq!(
            rewritten.steps().unwrap().keys().collect::<Vec<_>>(),
            vec!["action", "observation", "reward"]
        );
        assert_eq!(
            rewritten.observation().unwrap().keys().collect::<Vec<_>>(),
            vec!["wrist_image", "state"]
        );
    }

    #[test]
    fn test_rewrite_errors_propagate() {
        let result = mod_obs_features(&schema(), |key, _| {
            Err(RldsDataError::unsupported(key, "rejected"))
        });
        match result {
            Err(RldsDataError::UnsupportedValue { key, .. }) => assert_eq!(key, "wrist_image"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_missing_observation_fails() {
        let malformed = FeaturesDict::from_entries([("steps", Feature::Sequence(FeaturesDict::new()))]);
        assert!(matches!(
            mod_obs_features(&malformed, |_, feature| Ok(Arc::clone(feature))),
            Err(RldsDataError::MissingKey { .. })
        ));
    }
}
