use crate::mod_function::ModFunction;
use rlds_structures::{Dataset, FeaturesDict, RldsDataError, RldsResult, Value};

/// Which observation keys a [`FlipImageChannels`] instance rewrites.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FlipKeyPreset {
    /// The main camera
    Image,
    /// Wrist and hand mounted cameras
    WristImage,
}

impl FlipKeyPreset {
    pub fn keys(&self) -> &'static [&'static str] {
        match self {
            FlipKeyPreset::Image => &["image"],
            FlipKeyPreset::WristImage => &["wrist_image", "hand_image"],
        }
    }
}

/// Reverses the channel axis (RGB <-> BGR) of the preset's observation keys.
///
/// Keys the observation does not contain are skipped. Shapes and dtypes do not
/// change, so the schema passes through untouched.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
pub struct FlipImageChannels {
    preset: FlipKeyPreset,
}

impl FlipImageChannels {
    pub const NAME: &'static str = "flip_image_channels";
    pub const WRIST_NAME: &'static str = "flip_wrist_image_channels";

    pub const fn new(preset: FlipKeyPreset) -> FlipImageChannels {
        FlipImageChannels { preset }
    }

    pub const fn image() -> FlipImageChannels {
        FlipImageChannels::new(FlipKeyPreset::Image)
    }

    pub const fn wrist_image() -> FlipImageChannels {
        FlipImageChannels::new(FlipKeyPreset::WristImage)
    }

    pub fn preset(&self) -> FlipKeyPreset {
        self.preset
    }

    pub fn keys(&self) -> &'static [&'static str] {
        self.preset.keys()
    }
}

impl ModFunction for FlipImageChannels {
    fn name(&self) -> &'static str {
        match self.preset {
            FlipKeyPreset::Image => Self::NAME,
            FlipKeyPreset::WristImage => Self::WRIST_NAME,
        }
    }

    fn mod_features(&self, features: &FeaturesDict) -> RldsResult<FeaturesDict> {
        Ok(features.clone()) // no feature changes
    }

    fn mod_dataset<'a>(&self, dataset: Dataset<'a>) -> Dataset<'a> {
        let keys = self.keys();
        dataset.map_steps(move |mut step| {
            let observation = step.observation_mut()?;
            for key in keys {
                if let Some(value) = observation.get_mut(*key) {
                    let flipped = value
                        .as_tensor()
                        .ok_or_else(|| RldsDataError::unsupported(*key, "expected an image tensor, found a record"))?
                        .reverse_last_axis(key)?;
                    *value = Value::Tensor(flipped);
                }
            }
            Ok(step)
        })
    }
}
