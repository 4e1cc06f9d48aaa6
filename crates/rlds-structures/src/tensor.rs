use crate::shape::format_dims;
use crate::{DType, RldsDataError, RldsResult};
use ndarray::{ArrayD, Axis, IxDyn};

/// A dynamically shaped value of one of the supported element types.
///
/// Scalars are zero-dimensional arrays.
#[derive(Debug, Clone, PartialEq)]
pub enum Tensor {
    Bool(ArrayD<bool>),
    U8(ArrayD<u8>),
    U16(ArrayD<u16>),
    I32(ArrayD<i32>),
    I64(ArrayD<i64>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
    String(ArrayD<String>),
}

/// Runs `$body` against the array of whichever variant `$tensor` is.
macro_rules! with_array {
    ($tensor:expr, $array:ident => $body:expr) => {
        match $tensor {
            Tensor::Bool($array) => $body,
            Tensor::U8($array) => $body,
            Tensor::U16($array) => $body,
            Tensor::I32($array) => $body,
            Tensor::I64($array) => $body,
            Tensor::F32($array) => $body,
            Tensor::F64($array) => $body,
            Tensor::String($array) => $body,
        }
    };
}

/// Like [`with_array`], rewrapping the resulting array in the same variant.
macro_rules! map_array {
    ($tensor:expr, $array:ident => $body:expr) => {
        match $tensor {
            Tensor::Bool($array) => Tensor::Bool($body),
            Tensor::U8($array) => Tensor::U8($body),
            Tensor::U16($array) => Tensor::U16($body),
            Tensor::I32($array) => Tensor::I32($body),
            Tensor::I64($array) => Tensor::I64($body),
            Tensor::F32($array) => Tensor::F32($body),
            Tensor::F64($array) => Tensor::F64($body),
            Tensor::String($array) => Tensor::String($body),
        }
    };
}

macro_rules! impl_from_array {
    ($($variant:ident => $element:ty),* $(,)?) => {
        $(
            impl From<ArrayD<$element>> for Tensor {
                fn from(value: ArrayD<$element>) -> Self {
                    Tensor::$variant(value)
                }
            }
        )*
    };
}

impl_from_array!(
    Bool => bool,
    U8 => u8,
    U16 => u16,
    I32 => i32,
    I64 => i64,
    F32 => f32,
    F64 => f64,
    String => String,
);

impl Tensor {
    //region Constructors

    pub fn scalar_bool(value: bool) -> Tensor {
        Tensor::Bool(ArrayD::from_elem(IxDyn(&[]), value))
    }

    pub fn scalar_string(value: impl Into<String>) -> Tensor {
        Tensor::String(ArrayD::from_elem(IxDyn(&[]), value.into()))
    }

    /// Zero-filled tensor of the given dtype and shape.
    pub fn zeros(dtype: DType, shape: &[usize]) -> Tensor {
        let dim = IxDyn(shape);
        match dtype {
            DType::Bool => Tensor::Bool(ArrayD::from_elem(dim, false)),
            DType::U8 => Tensor::U8(ArrayD::zeros(dim)),
            DType::U16 => Tensor::U16(ArrayD::zeros(dim)),
            DType::I32 => Tensor::I32(ArrayD::zeros(dim)),
            DType::I64 => Tensor::I64(ArrayD::zeros(dim)),
            DType::F32 => Tensor::F32(ArrayD::zeros(dim)),
            DType::F64 => Tensor::F64(ArrayD::zeros(dim)),
            DType::String => Tensor::String(ArrayD::from_elem(dim, String::new())),
        }
    }

    //endregion

    //region Properties

    pub fn dtype(&self) -> DType {
        match self {
            Tensor::Bool(_) => DType::Bool,
            Tensor::U8(_) => DType::U8,
            Tensor::U16(_) => DType::U16,
            Tensor::I32(_) => DType::I32,
            Tensor::I64(_) => DType::I64,
            Tensor::F32(_) => DType::F32,
            Tensor::F64(_) => DType::F64,
            Tensor::String(_) => DType::String,
        }
    }

    pub fn shape(&self) -> &[usize] {
        with_array!(self, array => array.shape())
    }

    pub fn ndim(&self) -> usize {
        with_array!(self, array => array.ndim())
    }

    pub fn len(&self) -> usize {
        with_array!(self, array => array.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_u8(&self) -> Option<&ArrayD<u8>> {
        match self {
            Tensor::U8(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<&ArrayD<u16>> {
        match self {
            Tensor::U16(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<&ArrayD<f32>> {
        match self {
            Tensor::F32(array) => Some(array),
            _ => None,
        }
    }

    //endregion

    //region Conversions

    /// Reads a single-element value as a boolean. Numeric values are true when non-zero.
    pub fn to_bool_scalar(&self, key: &str) -> RldsResult<bool> {
        if self.len() != 1 {
            return Err(RldsDataError::ShapeMismatch {
                key: key.to_string(),
                expected: "a single element".to_string(),
                actual: format_dims(self.shape()),
            });
        }
        let value = match self {
            Tensor::Bool(a) => a.iter().all(|v| *v),
            Tensor::U8(a) => a.iter().all(|v| *v != 0),
            Tensor::U16(a) => a.iter().all(|v| *v != 0),
            Tensor::I32(a) => a.iter().all(|v| *v != 0),
            Tensor::I64(a) => a.iter().all(|v| *v != 0),
            Tensor::F32(a) => a.iter().all(|v| *v != 0.0),
            Tensor::F64(a) => a.iter().all(|v| *v != 0.0),
            Tensor::String(_) => {
                return Err(RldsDataError::DtypeMismatch {
                    key: key.to_string(),
                    expected: DType::Bool,
                    actual: DType::String,
                })
            }
        };
        Ok(value)
    }

    /// Widens or narrows every element to `f32`.
    pub fn to_f32(&self, key: &str) -> RldsResult<ArrayD<f32>> {
        let array = match self {
            Tensor::Bool(a) => a.mapv(|v| if v { 1.0 } else { 0.0 }),
            Tensor::U8(a) => a.mapv(f32::from),
            Tensor::U16(a) => a.mapv(f32::from),
            Tensor::I32(a) => a.mapv(|v| v as f32),
            Tensor::I64(a) => a.mapv(|v| v as f32),
            Tensor::F32(a) => a.clone(),
            Tensor::F64(a) => a.mapv(|v| v as f32),
            Tensor::String(_) => {
                return Err(RldsDataError::unsupported(key, "string values have no numeric form"))
            }
        };
        Ok(array)
    }

    /// Casts an `f32` array to `dtype`. Integer targets are rounded and saturated.
    pub fn cast_from_f32(array: ArrayD<f32>, dtype: DType, key: &str) -> RldsResult<Tensor> {
        let tensor = match dtype {
            DType::Bool => Tensor::Bool(array.mapv(|v| v != 0.0)),
            DType::U8 => Tensor::U8(array.mapv(|v| v.round() as u8)),
            DType::U16 => Tensor::U16(array.mapv(|v| v.round() as u16)),
            DType::I32 => Tensor::I32(array.mapv(|v| v.round() as i32)),
            DType::I64 => Tensor::I64(array.mapv(|v| v.round() as i64)),
            DType::F32 => Tensor::F32(array),
            DType::F64 => Tensor::F64(array.mapv(f64::from)),
            DType::String => {
                return Err(RldsDataError::unsupported(key, "cannot cast numeric values to string"))
            }
        };
        Ok(tensor)
    }

    /// Returns a copy with the last axis (channel axis) in reverse order.
    pub fn reverse_last_axis(&self, key: &str) -> RldsResult<Tensor> {
        let ndim = self.ndim();
        if ndim == 0 {
            return Err(RldsDataError::ShapeMismatch {
                key: key.to_string(),
                expected: "at least one axis".to_string(),
                actual: format_dims(self.shape()),
            });
        }
        let axis = Axis(ndim - 1);
        Ok(map_array!(self, array => {
            let mut view = array.view();
            view.invert_axis(axis);
            view.to_owned()
        }))
    }

    //endregion
}
