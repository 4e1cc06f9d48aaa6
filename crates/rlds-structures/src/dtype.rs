use crate::RldsDataError;
use std::fmt::Display;
use std::str::FromStr;

/// Element datatype of a feature or tensor value.
///
/// Serialized by the names dataset builders use (`"uint8"`, `"float32"`, ...).
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DType {
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "uint8")]
    U8,
    #[serde(rename = "uint16")]
    U16,
    #[serde(rename = "int32")]
    I32,
    #[serde(rename = "int64")]
    I64,
    #[serde(rename = "float32")]
    F32,
    #[serde(rename = "float64")]
    F64,
    #[serde(rename = "string")]
    String,
}

impl DType {
    pub const ALL: [DType; 8] = [
        DType::Bool,
        DType::U8,
        DType::U16,
        DType::I32,
        DType::I64,
        DType::F32,
        DType::F64,
        DType::String,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::U8 => "uint8",
            DType::U16 => "uint16",
            DType::I32 => "int32",
            DType::I64 => "int64",
            DType::F32 => "float32",
            DType::F64 => "float64",
            DType::String => "string",
        }
    }

    /// True for every dtype that can be resampled as continuous data.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, DType::Bool | DType::String)
    }
}

impl Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DType {
    type Err = RldsDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DType::ALL
            .iter()
            .find(|dtype| dtype.name() == s)
            .copied()
            .ok_or_else(|| RldsDataError::BadParameters(format!("Unknown dtype '{}'!", s)))
    }
}
