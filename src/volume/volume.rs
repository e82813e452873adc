//! Materialized volumes.

use crate::error::{Result, VolpipeError};
use crate::geometry::{Coordinate, Roi};
use crate::volume::data::{DataType, VolumeData, Voxel};
use ndarray::ArrayD;

/// A dense array together with the ROI it spans and the physical size of one
/// voxel along each axis.
///
/// `data.shape() == roi.shape()` always holds; ROIs are in voxel units of
/// this volume.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    data: VolumeData,
    roi: Roi,
    resolution: Coordinate,
}

impl Volume {
    /// Create a volume, validating data shape and resolution against the ROI.
    pub fn new(data: VolumeData, roi: Roi, resolution: Coordinate) -> Result<Self> {
        if data.ndim() != roi.dims() {
            return Err(VolpipeError::DimensionMismatch {
                expected: roi.dims(),
                actual: data.ndim(),
            });
        }
        let data_shape = Coordinate::from_shape(data.shape());
        if &data_shape != roi.shape() {
            return Err(VolpipeError::ShapeMismatch {
                context: format!("volume data for {}", roi),
                expected: roi.shape().clone(),
                actual: data_shape,
            });
        }
        roi.offset().check_dims(&resolution)?;
        if !resolution.all_positive() {
            return Err(VolpipeError::Configuration(format!(
                "resolution must be positive, got {}",
                resolution
            )));
        }
        Ok(Self {
            data,
            roi,
            resolution,
        })
    }

    /// Wrap an array whose first element sits at `offset`.
    pub fn from_array<T: Voxel>(
        array: ArrayD<T>,
        offset: Coordinate,
        resolution: Coordinate,
    ) -> Result<Self> {
        let roi = Roi::new(offset, Coordinate::from_shape(array.shape()))?;
        Self::new(T::into_data(array), roi, resolution)
    }

    #[inline]
    pub fn data(&self) -> &VolumeData {
        &self.data
    }

    #[inline]
    pub fn roi(&self) -> &Roi {
        &self.roi
    }

    #[inline]
    pub fn resolution(&self) -> &Coordinate {
        &self.resolution
    }

    pub fn dtype(&self) -> DataType {
        self.data.dtype()
    }

    pub fn into_data(self) -> VolumeData {
        self.data
    }

    /// Borrow the array if it holds elements of type `T`.
    pub fn array<T: Voxel>(&self) -> Option<&ArrayD<T>> {
        self.data.downcast_ref()
    }

    /// Copy out the part of this volume covered by `roi`.
    ///
    /// Fails with `ContainmentViolation` unless `self.roi()` contains `roi`.
    pub fn crop(&self, roi: &Roi) -> Result<Volume> {
        if !self.roi.contains(roi) {
            return Err(VolpipeError::containment("crop", &self.roi, roi));
        }
        let ranges = roi
            .index_ranges(self.roi.offset())?
            .ok_or_else(|| VolpipeError::containment("crop", &self.roi, roi))?;
        Ok(Volume {
            data: self.data.slice_ranges(&ranges),
            roi: roi.clone(),
            resolution: self.resolution.clone(),
        })
    }

    /// Replace this volume by its crop to `roi`. A no-op when the ROI already
    /// matches.
    pub fn crop_in_place(&mut self, roi: &Roi) -> Result<()> {
        if &self.roi == roi {
            return Ok(());
        }
        *self = self.crop(roi)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    fn ramp_volume(offset: [i64; 2], shape: [usize; 2]) -> Volume {
        let n = shape[0] * shape[1];
        let a = ArrayD::from_shape_vec(IxDyn(&shape), (0..n as u32).collect()).unwrap();
        Volume::from_array(a, Coordinate::from(offset), Coordinate::from([1, 1])).unwrap()
    }

    #[test]
    fn test_new_validates_shape() {
        let roi = Roi::from_slices(&[0, 0], &[4, 4]).unwrap();
        let err = Volume::new(
            VolumeData::zeros(DataType::U8, &[4, 3]),
            roi.clone(),
            Coordinate::from([1, 1]),
        )
        .unwrap_err();
        assert!(err.is_shape_mismatch());

        let err = Volume::new(
            VolumeData::zeros(DataType::U8, &[4, 4, 4]),
            roi.clone(),
            Coordinate::from([1, 1]),
        )
        .unwrap_err();
        assert!(err.is_dimension_mismatch());
    }

    #[test]
    fn test_new_validates_resolution() {
        let roi = Roi::from_slices(&[0, 0], &[2, 2]).unwrap();
        let data = VolumeData::zeros(DataType::F32, &[2, 2]);
        assert!(Volume::new(data.clone(), roi.clone(), Coordinate::from([1, 0])).is_err());
        assert!(Volume::new(data, roi, Coordinate::from([1, 1, 1]))
            .unwrap_err()
            .is_dimension_mismatch());
    }

    #[test]
    fn test_crop_uses_relative_offset() {
        let v = ramp_volume([-2, 10], [4, 4]);
        let target = Roi::from_slices(&[-1, 11], &[2, 2]).unwrap();
        let cropped = v.crop(&target).unwrap();
        assert_eq!(cropped.roi(), &target);
        let a = cropped.array::<u32>().unwrap();
        assert_eq!(a.iter().copied().collect::<Vec<_>>(), vec![5, 6, 9, 10]);
    }

    #[test]
    fn test_crop_outside_fails() {
        let v = ramp_volume([0, 0], [4, 4]);
        let target = Roi::from_slices(&[-1, 0], &[2, 2]).unwrap();
        assert!(v.crop(&target).unwrap_err().is_containment_violation());
    }

    #[test]
    fn test_crop_in_place() {
        let mut v = ramp_volume([0, 0], [4, 4]);
        let same = v.roi().clone();
        v.crop_in_place(&same).unwrap();
        assert_eq!(v.roi(), &same);

        let target = Roi::from_slices(&[3, 3], &[1, 1]).unwrap();
        v.crop_in_place(&target).unwrap();
        assert_eq!(v.roi(), &target);
        assert_eq!(v.array::<u32>().unwrap().iter().next(), Some(&15));
    }
}
