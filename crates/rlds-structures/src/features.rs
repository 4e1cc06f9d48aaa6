//! Feature schema describing the records an episodic dataset yields.
//!
//! A schema is a [`FeaturesDict`] whose `"steps"` entry is a [`Feature::Sequence`]
//! holding the per-step schema, which in turn holds an `"observation"`
//! [`Feature::Dict`] keyed by sensor name. Entries are stored as `Arc<Feature>` so
//! rewrites can pass untouched entries through without copying them.

use crate::{DType, RldsDataError, RldsResult, Shape, OBSERVATION_KEY, STEPS_KEY};
use indexmap::IndexMap;
use std::fmt::Display;
use std::sync::Arc;

//region Descriptors

/// Compression applied to image features when a dataset is written out.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageEncoding {
    Jpeg,
    Png,
}

impl Display for ImageEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ImageEncoding::Jpeg => write!(f, "jpeg"),
            ImageEncoding::Png => write!(f, "png"),
        }
    }
}

/// Semantic kind of a leaf feature.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureKind {
    Image { encoding: ImageEncoding },
    Tensor,
}

/// Metadata describing one leaf field: kind, shape, dtype and documentation.
#[derive(Debug, PartialEq, Clone, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FeatureDescriptor {
    #[serde(flatten)]
    pub kind: FeatureKind,
    pub shape: Shape,
    pub dtype: DType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl FeatureDescriptor {
    pub fn image(shape: Shape, dtype: DType, encoding: ImageEncoding, doc: Option<String>) -> Self {
        FeatureDescriptor {
            kind: FeatureKind::Image { encoding },
            shape,
            dtype,
            doc,
        }
    }

    pub fn tensor(shape: Shape, dtype: DType, doc: Option<String>) -> Self {
        FeatureDescriptor {
            kind: FeatureKind::Tensor,
            shape,
            dtype,
            doc,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, FeatureKind::Image { .. })
    }

    /// Encoding of an image feature, `None` for plain tensors.
    pub fn encoding(&self) -> Option<ImageEncoding> {
        match self.kind {
            FeatureKind::Image { encoding } => Some(encoding),
            FeatureKind::Tensor => None,
        }
    }
}

//endregion

//region Feature tree

/// A node of the feature schema.
#[derive(Debug, PartialEq, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Leaf(FeatureDescriptor),
    Dict(FeaturesDict),
    /// Variable-length sequence of records, used for an episode's steps
    Sequence(FeaturesDict),
}

impl Feature {
    pub fn as_leaf(&self) -> Option<&FeatureDescriptor> {
        match self {
            Feature::Leaf(descriptor) => Some(descriptor),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&FeaturesDict> {
        match self {
            Feature::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&FeaturesDict> {
        match self {
            Feature::Sequence(dict) => Some(dict),
            _ => None,
        }
    }
}

impl From<FeatureDescriptor> for Feature {
    fn from(value: FeatureDescriptor) -> Self {
        Feature::Leaf(value)
    }
}

/// Ordered mapping from key to feature.
///
/// Equality is structural and ignores key order; use [`FeaturesDict::keys`] when
/// order matters.
#[derive(Debug, PartialEq, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct FeaturesDict(IndexMap<String, Arc<Feature>>);

impl FeaturesDict {
    pub fn new() -> FeaturesDict {
        FeaturesDict(IndexMap::new())
    }

    pub fn from_entries<K, I>(entries: I) -> FeaturesDict
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Feature)>,
    {
        FeaturesDict(
            entries
                .into_iter()
                .map(|(key, feature)| (key.into(), Arc::new(feature)))
                .collect(),
        )
    }

    pub fn insert(&mut self, key: impl Into<String>, feature: impl Into<Feature>) {
        self.0.insert(key.into(), Arc::new(feature.into()));
    }

    /// Inserts an already shared feature without copying it.
    pub fn insert_shared(&mut self, key: impl Into<String>, feature: Arc<Feature>) {
        self.0.insert(key.into(), feature);
    }

    pub fn get(&self, key: &str) -> Option<&Arc<Feature>> {
        self.0.get(key)
    }

    /// Like [`FeaturesDict::get`], failing with [`RldsDataError::MissingKey`].
    pub fn require(&self, key: &str) -> RldsResult<&Arc<Feature>> {
        self.0.get(key).ok_or_else(|| RldsDataError::missing_key(key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Arc<Feature>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The per-step schema under `"steps"`.
    pub fn steps(&self) -> RldsResult<&FeaturesDict> {
        self.require(STEPS_KEY)?
            .as_sequence()
            .ok_or_else(|| RldsDataError::unsupported(STEPS_KEY, "expected a sequence feature"))
    }

    /// The observation schema under `"steps"/"observation"`.
    pub fn observation(&self) -> RldsResult<&FeaturesDict> {
        let path = format!("{}/{}", STEPS_KEY, OBSERVATION_KEY);
        self.steps()?
            .get(OBSERVATION_KEY)
            .ok_or_else(|| RldsDataError::missing_key(path.clone()))?
            .as_dict()
            .ok_or_else(|| RldsDataError::unsupported(path, "expected a dict feature"))
    }

    pub fn from_json_str(json: &str) -> RldsResult<FeaturesDict> {
        serde_json::from_str(json).map_err(|e| RldsDataError::DeserializationError(e.to_string()))
    }

    pub fn to_json_string_pretty(&self) -> RldsResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| RldsDataError::SerializationError(e.to_string()))
    }
}

impl<K: Into<String>> FromIterator<(K, Feature)> for FeaturesDict {
    fn from_iter<T: IntoIterator<Item = (K, Feature)>>(iter: T) -> Self {
        FeaturesDict::from_entries(iter)
    }
}

//endregion
