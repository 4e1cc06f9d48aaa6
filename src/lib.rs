//! # rlds-dataset-mod
//!
//! Named, composable transforms ("mod functions") for RLDS-style robot-learning
//! datasets. Each mod function states how it changes a dataset's feature schema
//! and lazily rewrites the episodes to match, so a preparation pipeline can chain
//! resizing, success filtering and channel flips by name.
//!
//! ## Crates
//!
//! - [`structures`]: feature schemas, tensors, episode records, lazy datasets
//! - [`mod_functions`]: the `ModFunction` trait, built-ins, registry and pipeline
//! - [`config`]: `rlds_mod.toml` loading with environment and CLI overrides
//! - [`observability`]: per-crate debug flags and logging setup
//!
//! ## Usage
//!
//! ```rust
//! use rlds_dataset_mod::prelude::*;
//!
//! let registry = ModFunctionRegistry::builtin();
//! let pipeline = ModPipeline::from_names(&registry, &["filter_success", "flip_image_channels"])?;
//! let (_features, dataset) = pipeline.apply(&FeaturesDict::from_json_str(r#"{
//!     "success": {"leaf": {"kind": "tensor", "shape": [], "dtype": "bool"}},
//!     "steps": {"sequence": {"observation": {"dict": {}}}}
//! }"#)?, Dataset::empty())?;
//! assert_eq!(dataset.collect_episodes()?.len(), 0);
//! # Ok::<(), RldsDataError>(())
//! ```

pub use rlds_config as config;
pub use rlds_mod_functions as mod_functions;
pub use rlds_observability as observability;
pub use rlds_structures as structures;

mod preview;

pub use preview::{pipeline_from_config, transform_features_file};

/// Commonly used types
pub mod prelude {
    pub use rlds_mod_functions::{
        FilterSuccess, FlipImageChannels, FlipKeyPreset, ModFunction, ModFunctionKind, ModFunctionRegistry,
        ModPipeline, ResizeAndJpegEncode,
    };
    pub use rlds_structures::conformance::check_episode;
    pub use rlds_structures::{
        DType, Dataset, Episode, Feature, FeatureDescriptor, FeatureKind, FeaturesDict, ImageEncoding, Record,
        RldsDataError, RldsResult, Shape, Step, Tensor, Value,
    };
}
