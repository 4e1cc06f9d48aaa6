use crate::mod_function::ModFunction;
use rlds_structures::{Dataset, FeaturesDict, RldsResult};

/// Keeps only the episodes whose episode-level `success` flag is set.
///
/// The schema is unchanged, so `success` stays in the output records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterSuccess;

impl FilterSuccess {
    pub const NAME: &'static str = "filter_success";
}

impl ModFunction for FilterSuccess {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn mod_features(&self, features: &FeaturesDict) -> RldsResult<FeaturesDict> {
        Ok(features.clone()) // no feature changes
    }

    fn mod_dataset<'a>(&self, dataset: Dataset<'a>) -> Dataset<'a> {
        dataset.filter(|episode| episode.success())
    }
}
