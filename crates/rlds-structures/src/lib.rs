//! Core data types for modifying RLDS-style episodic datasets.
//!
//! - **[`FeaturesDict`]** - Nested, ordered feature schema of one episode
//! - **[`Tensor`]** - Dynamically shaped values of the supported dtypes
//! - **[`Episode`]** / **[`Step`]** - Records a conforming dataset yields
//! - **[`Dataset`]** - Lazy stream of episodes with map/filter combinators
//!
//! Conformance checks and the image codec live in [`conformance`] and [`codec`].

pub mod codec;
pub mod conformance;
mod dataset;
mod dtype;
mod error;
mod features;
mod record;
mod shape;
mod tensor;

pub use dataset::{Dataset, EpisodeStream};
pub use dtype::DType;
pub use error::{RldsDataError, RldsResult};
pub use features::{Feature, FeatureDescriptor, FeatureKind, FeaturesDict, ImageEncoding};
pub use record::{Episode, Record, Step, Value};
pub use shape::{format_dims, Shape};
pub use tensor::Tensor;

/// Key of the per-step sequence in an episode schema
pub const STEPS_KEY: &str = "steps";
/// Key of the sensor sub-record in a step
pub const OBSERVATION_KEY: &str = "observation";
/// Key of the episode-level success flag
pub const SUCCESS_KEY: &str = "success";
