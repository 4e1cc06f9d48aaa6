//! Named transforms over RLDS feature schemas and episode datasets.
//!
//! A [`ModFunction`] rewrites a schema with [`ModFunction::mod_features`] and the
//! matching dataset with [`ModFunction::mod_dataset`], so that a conforming dataset
//! stays conforming. Built-ins are looked up by name in a [`ModFunctionRegistry`]
//! and chained with a [`ModPipeline`].
//!
//! ```
//! use rlds_mod_functions::{ModFunctionRegistry, ModPipeline};
//!
//! let registry = ModFunctionRegistry::builtin();
//! let pipeline = ModPipeline::from_names(&registry, &["resize_and_jpeg_encode", "filter_success"]).unwrap();
//! assert_eq!(pipeline.len(), 2);
//! ```

pub mod image_ops;
mod mod_function;
pub mod mod_functions;
mod pipeline;
mod registry;

pub use mod_function::{mod_obs_features, ModFunction};
pub use mod_functions::{FilterSuccess, FlipImageChannels, FlipKeyPreset, ResizeAndJpegEncode};
pub use pipeline::ModPipeline;
pub use registry::{ModFunctionKind, ModFunctionRegistry};
