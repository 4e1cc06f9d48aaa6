use crate::mod_function::ModFunction;
use crate::registry::ModFunctionRegistry;
use rlds_structures::conformance::check_episode;
use rlds_structures::{Dataset, FeaturesDict, RldsResult};
use std::sync::Arc;
use tracing::{debug, info};

/// An ordered chain of mod functions resolved from a registry.
///
/// Every stage sees the output of the stage before it, for the schema as well as
/// for the dataset. An empty chain is the identity.
#[derive(Debug, Clone)]
pub struct ModPipeline {
    mod_functions: Vec<Arc<dyn ModFunction>>,
    validate_output: bool,
}

impl ModPipeline {
    //region Construction

    /// Resolves `names` against `registry`, in order. Names may repeat.
    pub fn from_names<S: AsRef<str>>(registry: &ModFunctionRegistry, names: &[S]) -> RldsResult<ModPipeline> {
        let mod_functions = names
            .iter()
            .map(|name| registry.get(name.as_ref()))
            .collect::<RldsResult<Vec<_>>>()?;
        let pipeline = ModPipeline {
            mod_functions,
            validate_output: false,
        };
        info!("Built mod pipeline [{}]", pipeline.names().join(", "));
        Ok(pipeline)
    }

    /// When set, [`ModPipeline::apply`] checks every output episode against the final schema.
    pub fn with_output_validation(mut self, validate_output: bool) -> ModPipeline {
        self.validate_output = validate_output;
        self
    }

    //endregion

    pub fn names(&self) -> Vec<&'static str> {
        self.mod_functions.iter().map(|mod_function| mod_function.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.mod_functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mod_functions.is_empty()
    }

    pub fn validates_output(&self) -> bool {
        self.validate_output
    }

    //region Application

    pub fn apply_features(&self, features: &FeaturesDict) -> RldsResult<FeaturesDict> {
        let mut current = features.clone();
        for mod_function in &self.mod_functions {
            debug!("Applying '{}' to features", mod_function.name());
            current = mod_function.mod_features(&current)?;
        }
        Ok(current)
    }

    /// Chains every stage's lazy dataset transform. Nothing runs until the result is pulled.
    pub fn apply_dataset<'a>(&self, dataset: Dataset<'a>) -> Dataset<'a> {
        self.mod_functions.iter().fold(dataset, |dataset, mod_function| {
            debug!("Applying '{}' to dataset", mod_function.name());
            mod_function.mod_dataset(dataset)
        })
    }

    /// Transforms the schema and the dataset together.
    ///
    /// With output validation enabled, every episode pulled from the returned
    /// dataset is checked against the returned schema and a violation surfaces as
    /// that item's error.
    pub fn apply<'a>(&self, features: &FeaturesDict, dataset: Dataset<'a>) -> RldsResult<(FeaturesDict, Dataset<'a>)> {
        let output_features = self.apply_features(features)?;
        let mut output_dataset = self.apply_dataset(dataset);
        if self.validate_output {
            let schema = output_features.clone();
            output_dataset = output_dataset.map(move |episode| {
                check_episode(&schema, &episode)?;
                Ok(episode)
            });
        }
        Ok((output_features, output_dataset))
    }

    //endregion
}

#[cfg(test)]
mod tests {
    use super::*;
    use rlds_structures::RldsDataError;

    #[test]
    fn test_unknown_name_fails_construction() {
        let registry = ModFunctionRegistry::builtin();
        let result = ModPipeline::from_names(&registry, &["filter_success", "blur"]);
        assert!(matches!(result, Err(RldsDataError::UnknownModFunction(name)) if name == "blur"));
    }

    #[test]
    fn test_names_keep_order_and_repeats() {
        let registry = ModFunctionRegistry::builtin();
        let pipeline =
            ModPipeline::from_names(&registry, &["flip_image_channels", "filter_success", "flip_image_channels"])
                .unwrap();
        assert_eq!(
            pipeline.names(),
            vec!["flip_image_channels", "filter_success", "flip_image_channels"]
        );
        assert!(!pipeline.validates_output());
    }

    #[test]
    fn test_empty_pipeline_is_identity_on_features() {
        let registry = ModFunctionRegistry::builtin();
        let pipeline = ModPipeline::from_names::<&str>(&registry, &[]).unwrap();
        assert!(pipeline.is_empty());
        let features = FeaturesDict::new();
        assert_eq!(pipeline.apply_features(&features).unwrap(), features);
    }
}
