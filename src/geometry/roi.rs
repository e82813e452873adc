//! Axis-aligned regions of interest.
//!
//! A [`Roi`] is an `offset` plus a non-negative `shape`, both in voxel units of
//! the volume it describes. ROIs are immutable; every transformation returns a
//! new one.

use crate::error::{Result, VolpipeError};
use crate::geometry::coordinate::Coordinate;
use crate::geometry::factor::ScaleFactor;
use std::fmt;
use std::ops::Range;

/// Axis-aligned box in integer coordinate space.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Roi {
    offset: Coordinate,
    shape: Coordinate,
}

impl Roi {
    /// Create a ROI, checking that offset and shape agree on dimensionality
    /// and that the shape is non-negative.
    pub fn new(offset: Coordinate, shape: Coordinate) -> Result<Self> {
        offset.check_dims(&shape)?;
        if !shape.all_non_negative() {
            return Err(VolpipeError::InvalidRoi(format!(
                "shape {} has negative components",
                shape
            )));
        }
        Ok(Self { offset, shape })
    }

    pub fn from_slices(offset: &[i64], shape: &[i64]) -> Result<Self> {
        Self::new(Coordinate::from_slice(offset), Coordinate::from_slice(shape))
    }

    /// Create a ROI spanning `[begin, end)`.
    pub fn from_bounds(begin: Coordinate, end: Coordinate) -> Result<Self> {
        let shape = end.try_sub(&begin)?;
        Self::new(begin, shape)
    }

    /// ROI at the origin with the given shape.
    pub fn with_shape(shape: Coordinate) -> Result<Self> {
        Self::new(Coordinate::zeros(shape.dims()), shape)
    }

    #[inline]
    pub fn dims(&self) -> usize {
        self.offset.dims()
    }

    #[inline]
    pub fn offset(&self) -> &Coordinate {
        &self.offset
    }

    #[inline]
    pub fn shape(&self) -> &Coordinate {
        &self.shape
    }

    /// First coordinate inside the ROI (same as the offset).
    #[inline]
    pub fn begin(&self) -> &Coordinate {
        &self.offset
    }

    /// First coordinate past the ROI along every axis.
    pub fn end(&self) -> Coordinate {
        &self.offset + &self.shape
    }

    /// `offset + shape / 2`, rounding toward negative infinity.
    pub fn center(&self) -> Coordinate {
        &self.offset + &(&self.shape / 2)
    }

    /// Number of voxels covered.
    pub fn size(&self) -> i64 {
        self.shape.product()
    }

    pub fn is_empty(&self) -> bool {
        self.shape.iter().any(|&s| s == 0)
    }

    /// True iff every coordinate of `other` lies inside `self`.
    ///
    /// ROIs of different dimensionality never contain each other.
    pub fn contains(&self, other: &Roi) -> bool {
        self.dims() == other.dims()
            && self.begin().all_le(other.begin())
            && other.end().all_le(&self.end())
    }

    pub fn contains_point(&self, point: &Coordinate) -> bool {
        self.begin().all_le(point) && point.all_lt(&self.end())
    }

    /// Smallest ROI containing both `self` and `other`.
    pub fn union(&self, other: &Roi) -> Result<Roi> {
        let begin = self.begin().try_min(other.begin())?;
        let end = self.end().try_max(&other.end())?;
        Roi::from_bounds(begin, end)
    }

    /// Overlap of `self` and `other`, or `None` if they share no voxel.
    pub fn intersect(&self, other: &Roi) -> Result<Option<Roi>> {
        let begin = self.begin().try_max(other.begin())?;
        let end = self.end().try_min(&other.end())?;
        if !begin.all_lt(&end) {
            return Ok(None);
        }
        Roi::from_bounds(begin, end).map(Some)
    }

    /// Shift the ROI by `by`.
    pub fn translate(&self, by: &Coordinate) -> Result<Roi> {
        Ok(Roi {
            offset: self.offset.try_add(by)?,
            shape: self.shape.clone(),
        })
    }

    /// Grow by `negative` before the begin and `positive` past the end.
    pub fn grow(&self, negative: &Coordinate, positive: &Coordinate) -> Result<Roi> {
        let offset = self.offset.try_sub(negative)?;
        let shape = self.shape.try_add(negative)?.try_add(positive)?;
        Roi::new(offset, shape)
    }

    /// Multiply offset and shape componentwise by `factor`.
    ///
    /// This does not keep the center in place; see
    /// [`center_preserving_scale`](Self::center_preserving_scale).
    pub fn scale(&self, factor: &ScaleFactor) -> Result<Roi> {
        let f = factor.resolve(self.dims())?;
        Ok(Roi {
            offset: &self.offset * &f,
            shape: &self.shape * &f,
        })
    }

    /// Scale by `factor`, then translate so the result has the same center as
    /// `self`.
    ///
    /// For a downsampled ROI this is the window of the full-resolution volume
    /// that a stride-`factor` decimation reads from.
    pub fn center_preserving_scale(&self, factor: &ScaleFactor) -> Result<Roi> {
        let scaled = self.scale(factor)?;
        let shift = &self.center() - &scaled.center();
        scaled.translate(&shift)
    }

    /// Index ranges of `self` inside an array whose first element sits at
    /// `origin`. `None` if `self` starts before `origin`.
    pub fn index_ranges(&self, origin: &Coordinate) -> Result<Option<Vec<Range<usize>>>> {
        let relative = self.offset.try_sub(origin)?;
        let Some(starts) = relative.to_usize_vec() else {
            return Ok(None);
        };
        let Some(lens) = self.shape.to_usize_vec() else {
            return Ok(None);
        };
        Ok(Some(
            starts
                .into_iter()
                .zip(lens)
                .map(|(start, len)| start..start + len)
                .collect(),
        ))
    }
}

impl fmt::Debug for Roi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Roi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.begin(), self.end())
    }
}
