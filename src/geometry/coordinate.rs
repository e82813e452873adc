//! N-dimensional integer coordinates.
//!
//! `Coordinate` is used for positions, shapes, resolutions and scaling
//! factors alike. Its dimensionality is fixed at construction.
//!
//! Two flavours of arithmetic are offered:
//! - `try_*` methods return [`VolpipeError::DimensionMismatch`] when the
//!   operands disagree on dimensionality. Use these on values that come from
//!   user input or from different volumes.
//! - `std::ops` operators, which panic on a dimensionality mismatch in the same
//!   way `ndarray` panics on incompatible shapes. They are meant for operands
//!   already known to agree (e.g. the offset and shape of one `Roi`).
//!
//! All division rounds toward negative infinity.

use crate::error::{Result, VolpipeError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Index, Mul, Neg, Sub};

/// Immutable n-dimensional integer vector.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coordinate(Vec<i64>);

/// Integer division rounding toward negative infinity.
#[inline]
pub fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

impl Coordinate {
    pub fn new(values: Vec<i64>) -> Self {
        Self(values)
    }

    pub fn from_slice(values: &[i64]) -> Self {
        Self(values.to_vec())
    }

    /// A coordinate with every component set to `value`.
    pub fn splat(value: i64, dims: usize) -> Self {
        Self(vec![value; dims])
    }

    pub fn zeros(dims: usize) -> Self {
        Self::splat(0, dims)
    }

    pub fn ones(dims: usize) -> Self {
        Self::splat(1, dims)
    }

    #[inline]
    pub fn dims(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &i64> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<i64> {
        self.0
    }

    /// Product of all components. An empty coordinate has product 1.
    pub fn product(&self) -> i64 {
        self.0.iter().product()
    }

    pub fn all_non_negative(&self) -> bool {
        self.0.iter().all(|&v| v >= 0)
    }

    pub fn all_positive(&self) -> bool {
        self.0.iter().all(|&v| v > 0)
    }

    /// Fails unless `other` has the same dimensionality as `self`.
    pub fn check_dims(&self, other: &Coordinate) -> Result<()> {
        check_dims(self.dims(), other.dims())
    }

    fn zip_with(&self, other: &Coordinate, f: impl Fn(i64, i64) -> i64) -> Result<Coordinate> {
        self.check_dims(other)?;
        Ok(Coordinate(
            self.0.iter().zip(&other.0).map(|(&a, &b)| f(a, b)).collect(),
        ))
    }

    pub fn try_add(&self, other: &Coordinate) -> Result<Coordinate> {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn try_sub(&self, other: &Coordinate) -> Result<Coordinate> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Componentwise product.
    pub fn try_mul(&self, other: &Coordinate) -> Result<Coordinate> {
        self.zip_with(other, |a, b| a * b)
    }

    /// Componentwise floor division. Zero divisors are rejected.
    pub fn try_div(&self, other: &Coordinate) -> Result<Coordinate> {
        if other.0.contains(&0) {
            return Err(VolpipeError::Configuration(format!(
                "division of {} by {} with zero component",
                self, other
            )));
        }
        self.zip_with(other, floor_div)
    }

    /// Componentwise minimum.
    pub fn try_min(&self, other: &Coordinate) -> Result<Coordinate> {
        self.zip_with(other, i64::min)
    }

    /// Componentwise maximum.
    pub fn try_max(&self, other: &Coordinate) -> Result<Coordinate> {
        self.zip_with(other, i64::max)
    }

    /// True if every component of `self` is `<=` the matching one of `other`.
    /// Coordinates of different dimensionality never compare.
    pub fn all_le(&self, other: &Coordinate) -> bool {
        self.dims() == other.dims() && self.0.iter().zip(&other.0).all(|(a, b)| a <= b)
    }

    /// True if every component of `self` is `<` the matching one of `other`.
    pub fn all_lt(&self, other: &Coordinate) -> bool {
        self.dims() == other.dims() && self.0.iter().zip(&other.0).all(|(a, b)| a < b)
    }

    /// Components as `usize`, or `None` if any is negative.
    pub fn to_usize_vec(&self) -> Option<Vec<usize>> {
        self.0.iter().map(|&v| usize::try_from(v).ok()).collect()
    }

    /// Build from an array shape.
    pub fn from_shape(shape: &[usize]) -> Self {
        Self(shape.iter().map(|&v| v as i64).collect())
    }
}

pub(crate) fn check_dims(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(VolpipeError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", v)?;
        }
        write!(f, ")")
    }
}

impl Index<usize> for Coordinate {
    type Output = i64;

    fn index(&self, index: usize) -> &i64 {
        &self.0[index]
    }
}

impl From<Vec<i64>> for Coordinate {
    fn from(values: Vec<i64>) -> Self {
        Self(values)
    }
}

impl<const N: usize> From<[i64; N]> for Coordinate {
    fn from(values: [i64; N]) -> Self {
        Self(values.to_vec())
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $try_method:ident) => {
        impl $trait<&Coordinate> for &Coordinate {
            type Output = Coordinate;

            /// # Panics
            ///
            /// Panics if the operands differ in dimensionality.
            fn $method(self, rhs: &Coordinate) -> Coordinate {
                match self.$try_method(rhs) {
                    Ok(c) => c,
                    Err(e) => panic!("{}: {} vs {}", e, self, rhs),
                }
            }
        }

        impl $trait<Coordinate> for Coordinate {
            type Output = Coordinate;

            fn $method(self, rhs: Coordinate) -> Coordinate {
                (&self).$method(&rhs)
            }
        }

        impl $trait<&Coordinate> for Coordinate {
            type Output = Coordinate;

            fn $method(self, rhs: &Coordinate) -> Coordinate {
                (&self).$method(rhs)
            }
        }
    };
}

impl_binary_op!(Add, add, try_add);
impl_binary_op!(Sub, sub, try_sub);
impl_binary_op!(Mul, mul, try_mul);
impl_binary_op!(Div, div, try_div);

impl Mul<i64> for &Coordinate {
    type Output = Coordinate;

    fn mul(self, rhs: i64) -> Coordinate {
        Coordinate(self.0.iter().map(|&v| v * rhs).collect())
    }
}

impl Mul<i64> for Coordinate {
    type Output = Coordinate;

    fn mul(self, rhs: i64) -> Coordinate {
        &self * rhs
    }
}

impl Div<i64> for &Coordinate {
    type Output = Coordinate;

    /// # Panics
    ///
    /// Panics on a zero divisor, like integer division.
    fn div(self, rhs: i64) -> Coordinate {
        Coordinate(self.0.iter().map(|&v| floor_div(v, rhs)).collect())
    }
}

impl Div<i64> for Coordinate {
    type Output = Coordinate;

    fn div(self, rhs: i64) -> Coordinate {
        &self / rhs
    }
}

impl Neg for &Coordinate {
    type Output = Coordinate;

    fn neg(self) -> Coordinate {
        Coordinate(self.0.iter().map(|&v| -v).collect())
    }
}

impl Neg for Coordinate {
    type Output = Coordinate;

    fn neg(self) -> Coordinate {
        -&self
    }
}
