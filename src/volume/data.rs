//! Typed dense voxel storage.
//!
//! Image volumes are usually floating point while label volumes are unsigned
//! integers, so [`VolumeData`] is an enum over `ndarray::ArrayD` of each
//! supported element type. The slicing operations the pipeline needs are
//! dispatched over the variants with a macro; none of them inspect values.

use ndarray::{ArrayD, IxDyn, Slice};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Element type tag of a [`VolumeData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

/// Dense n-dimensional voxel array.
#[derive(Debug, Clone, PartialEq)]
pub enum VolumeData {
    U8(ArrayD<u8>),
    U16(ArrayD<u16>),
    U32(ArrayD<u32>),
    U64(ArrayD<u64>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

/// Apply `$body` to the inner array and rewrap the result in the same variant.
macro_rules! map_data {
    ($data:expr, $arr:ident => $body:expr) => {
        match $data {
            VolumeData::U8($arr) => VolumeData::U8($body),
            VolumeData::U16($arr) => VolumeData::U16($body),
            VolumeData::U32($arr) => VolumeData::U32($body),
            VolumeData::U64($arr) => VolumeData::U64($body),
            VolumeData::F32($arr) => VolumeData::F32($body),
            VolumeData::F64($arr) => VolumeData::F64($body),
        }
    };
}

/// Apply `$body` to the inner array.
macro_rules! with_data {
    ($data:expr, $arr:ident => $body:expr) => {
        match $data {
            VolumeData::U8($arr) => $body,
            VolumeData::U16($arr) => $body,
            VolumeData::U32($arr) => $body,
            VolumeData::U64($arr) => $body,
            VolumeData::F32($arr) => $body,
            VolumeData::F64($arr) => $body,
        }
    };
}

impl VolumeData {
    /// Zero-filled array of the given type and shape.
    pub fn zeros(dtype: DataType, shape: &[usize]) -> Self {
        let shape = IxDyn(shape);
        match dtype {
            DataType::U8 => VolumeData::U8(ArrayD::zeros(shape)),
            DataType::U16 => VolumeData::U16(ArrayD::zeros(shape)),
            DataType::U32 => VolumeData::U32(ArrayD::zeros(shape)),
            DataType::U64 => VolumeData::U64(ArrayD::zeros(shape)),
            DataType::F32 => VolumeData::F32(ArrayD::zeros(shape)),
            DataType::F64 => VolumeData::F64(ArrayD::zeros(shape)),
        }
    }

    pub fn dtype(&self) -> DataType {
        match self {
            VolumeData::U8(_) => DataType::U8,
            VolumeData::U16(_) => DataType::U16,
            VolumeData::U32(_) => DataType::U32,
            VolumeData::U64(_) => DataType::U64,
            VolumeData::F32(_) => DataType::F32,
            VolumeData::F64(_) => DataType::F64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        with_data!(self, a => a.shape())
    }

    pub fn ndim(&self) -> usize {
        with_data!(self, a => a.ndim())
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        with_data!(self, a => a.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Owned copy of the sub-array addressed by `ranges`, one per axis.
    ///
    /// Callers guarantee `ranges.len() == self.ndim()` and that every range
    /// lies within the axis length.
    pub(crate) fn slice_ranges(&self, ranges: &[Range<usize>]) -> VolumeData {
        debug_assert_eq!(ranges.len(), self.ndim());
        map_data!(self, a => a
            .slice_each_axis(|ax| Slice::from(ranges[ax.axis.index()].clone()))
            .to_owned())
    }

    /// Owned copy keeping every `steps[i]`-th element along axis `i`,
    /// starting at index 0.
    ///
    /// Callers guarantee `steps.len() == self.ndim()` and `steps[i] > 0`.
    pub(crate) fn strided(&self, steps: &[usize]) -> VolumeData {
        debug_assert_eq!(steps.len(), self.ndim());
        map_data!(self, a => a
            .slice_each_axis(|ax| Slice::new(0, None, steps[ax.axis.index()] as isize))
            .to_owned())
    }

    /// Borrow the inner array if it holds elements of type `T`.
    pub fn downcast_ref<T: Voxel>(&self) -> Option<&ArrayD<T>> {
        T::from_data(self)
    }
}

/// Element types that can be stored in a [`VolumeData`].
pub trait Voxel: Clone + 'static {
    const DTYPE: DataType;

    fn into_data(array: ArrayD<Self>) -> VolumeData;

    fn from_data(data: &VolumeData) -> Option<&ArrayD<Self>>;
}

macro_rules! impl_voxel {
    ($ty:ty, $variant:ident) => {
        impl Voxel for $ty {
            const DTYPE: DataType = DataType::$variant;

            fn into_data(array: ArrayD<Self>) -> VolumeData {
                VolumeData::$variant(array)
            }

            fn from_data(data: &VolumeData) -> Option<&ArrayD<Self>> {
                match data {
                    VolumeData::$variant(a) => Some(a),
                    _ => None,
                }
            }
        }

        impl From<ArrayD<$ty>> for VolumeData {
            fn from(array: ArrayD<$ty>) -> Self {
                VolumeData::$variant(array)
            }
        }
    };
}

impl_voxel!(u8, U8);
impl_voxel!(u16, U16);
impl_voxel!(u32, U32);
impl_voxel!(u64, U64);
impl_voxel!(f32, F32);
impl_voxel!(f64, F64);
