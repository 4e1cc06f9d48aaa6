use crate::{RldsDataError, RldsResult, Tensor, OBSERVATION_KEY, SUCCESS_KEY};
use indexmap::IndexMap;

/// Ordered mapping from key to value, mirroring a [`crate::FeaturesDict`].
pub type Record = IndexMap<String, Value>;

/// A record field: either a leaf tensor or a nested record.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Tensor(Tensor),
    Dict(Record),
}

impl Value {
    pub fn as_tensor(&self) -> Option<&Tensor> {
        match self {
            Value::Tensor(tensor) => Some(tensor),
            Value::Dict(_) => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Record> {
        match self {
            Value::Dict(record) => Some(record),
            Value::Tensor(_) => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Dict(record) => Some(record),
            Value::Tensor(_) => None,
        }
    }
}

impl From<Tensor> for Value {
    fn from(value: Tensor) -> Self {
        Value::Tensor(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Dict(value)
    }
}

/// One timestep of an episode.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Step(pub Record);

impl Step {
    pub fn new(fields: Record) -> Step {
        Step(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn observation(&self) -> RldsResult<&Record> {
        self.0
            .get(OBSERVATION_KEY)
            .ok_or_else(|| RldsDataError::missing_key(OBSERVATION_KEY))?
            .as_dict()
            .ok_or_else(|| RldsDataError::unsupported(OBSERVATION_KEY, "expected a nested record"))
    }

    pub fn observation_mut(&mut self) -> RldsResult<&mut Record> {
        self.0
            .get_mut(OBSERVATION_KEY)
            .ok_or_else(|| RldsDataError::missing_key(OBSERVATION_KEY))?
            .as_dict_mut()
            .ok_or_else(|| RldsDataError::unsupported(OBSERVATION_KEY, "expected a nested record"))
    }
}

/// One recorded trajectory: episode-level fields plus its ordered steps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Episode {
    pub metadata: Record,
    pub steps: Vec<Step>,
}

impl Episode {
    pub fn new(metadata: Record, steps: Vec<Step>) -> Episode {
        Episode { metadata, steps }
    }

    /// Reads the episode-level `success` flag.
    pub fn success(&self) -> RldsResult<bool> {
        self.metadata
            .get(SUCCESS_KEY)
            .ok_or_else(|| RldsDataError::missing_key(SUCCESS_KEY))?
            .as_tensor()
            .ok_or_else(|| RldsDataError::unsupported(SUCCESS_KEY, "expected a scalar, found a record"))?
            .to_bool_scalar(SUCCESS_KEY)
    }
}
