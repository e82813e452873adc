//! Scaling factors for ROI scaling and resampling.

use crate::error::{Result, VolpipeError};
use crate::geometry::coordinate::{check_dims, Coordinate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A positive integer scaling factor, either shared by all axes or given per axis.
///
/// Deserializes from a bare number (`2`) or a list of numbers (`[1, 2, 2]`).
/// Anything else (floats, strings, negative values) is rejected by serde before
/// [`ScaleFactor::validate`] ever sees it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScaleFactor {
    Uniform(u32),
    PerAxis(Vec<u32>),
}

impl ScaleFactor {
    pub fn uniform(factor: u32) -> Self {
        ScaleFactor::Uniform(factor)
    }

    pub fn per_axis(factors: impl Into<Vec<u32>>) -> Self {
        ScaleFactor::PerAxis(factors.into())
    }

    /// Reject zero components and empty per-axis lists.
    pub fn validate(&self) -> Result<()> {
        match self {
            ScaleFactor::Uniform(0) => Err(VolpipeError::Configuration(
                "scaling factor must be positive, got 0".to_string(),
            )),
            ScaleFactor::Uniform(_) => Ok(()),
            ScaleFactor::PerAxis(f) if f.is_empty() => Err(VolpipeError::Configuration(
                "per-axis scaling factor must not be empty".to_string(),
            )),
            ScaleFactor::PerAxis(f) if f.contains(&0) => Err(VolpipeError::Configuration(
                format!("scaling factor components must be positive, got {:?}", f),
            )),
            ScaleFactor::PerAxis(_) => Ok(()),
        }
    }

    /// Number of axes this factor is fixed to, if any.
    pub fn dims(&self) -> Option<usize> {
        match self {
            ScaleFactor::Uniform(_) => None,
            ScaleFactor::PerAxis(f) => Some(f.len()),
        }
    }

    /// Expand to a coordinate of `dims` components.
    pub fn resolve(&self, dims: usize) -> Result<Coordinate> {
        match self {
            ScaleFactor::Uniform(f) => Ok(Coordinate::splat(*f as i64, dims)),
            ScaleFactor::PerAxis(f) => {
                check_dims(dims, f.len())?;
                Ok(Coordinate::new(f.iter().map(|&v| v as i64).collect()))
            }
        }
    }

    /// Per-axis steps for strided array slicing.
    pub fn strides(&self, dims: usize) -> Result<Vec<usize>> {
        match self {
            ScaleFactor::Uniform(f) => Ok(vec![*f as usize; dims]),
            ScaleFactor::PerAxis(f) => {
                check_dims(dims, f.len())?;
                Ok(f.iter().map(|&v| v as usize).collect())
            }
        }
    }
}

impl From<u32> for ScaleFactor {
    fn from(factor: u32) -> Self {
        ScaleFactor::Uniform(factor)
    }
}

impl From<Vec<u32>> for ScaleFactor {
    fn from(factors: Vec<u32>) -> Self {
        ScaleFactor::PerAxis(factors)
    }
}

impl<const N: usize> From<[u32; N]> for ScaleFactor {
    fn from(factors: [u32; N]) -> Self {
        ScaleFactor::PerAxis(factors.to_vec())
    }
}

impl fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaleFactor::Uniform(v) => write!(f, "{}", v),
            ScaleFactor::PerAxis(v) => write!(f, "{:?}", v),
        }
    }
}
