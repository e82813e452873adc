//! Test data builders for creating test objects

use ndarray::{ArrayD, Dimension, IxDyn};
use volpipe::{ArraySource, Coordinate, Roi, Volume};

/// Builder for volumes whose voxel values encode their world position.
///
/// With the default `Ramp` fill, the voxel at world position `p` holds
/// `sum(p[i] * 1000^(n-1-i))`, so a decimated output can be checked against
/// the exact positions it must have sampled.
pub struct VolumeBuilder {
    roi: Roi,
    resolution: Coordinate,
    fill: Fill,
}

#[derive(Clone, Copy)]
pub enum Fill {
    Ramp,
    Constant(f64),
}

impl VolumeBuilder {
    pub fn new(roi: Roi) -> Self {
        let dims = roi.dims();
        Self {
            roi,
            resolution: Coordinate::ones(dims),
            fill: Fill::Ramp,
        }
    }

    pub fn resolution(mut self, resolution: &[i64]) -> Self {
        self.resolution = Coordinate::from_slice(resolution);
        self
    }

    pub fn constant(mut self, value: f64) -> Self {
        self.fill = Fill::Constant(value);
        self
    }

    pub fn build(self) -> Volume {
        let shape = self
            .roi
            .shape()
            .to_usize_vec()
            .expect("non-negative test shape");
        let offset = self.roi.offset().clone();
        let fill = self.fill;
        let array = ArrayD::from_shape_fn(IxDyn(&shape), |index| match fill {
            Fill::Constant(v) => v,
            Fill::Ramp => {
                let position: Vec<i64> = (0..index.ndim())
                    .map(|axis| offset[axis] + index[axis] as i64)
                    .collect();
                encode(&position)
            }
        });
        Volume::from_array(array, offset, self.resolution).expect("valid test volume")
    }
}

/// Value a `Ramp` volume stores at world position `position`.
pub fn encode(position: &[i64]) -> f64 {
    position.iter().fold(0.0, |acc, &p| acc * 1000.0 + p as f64)
}

/// Builder for in-memory sources holding ramp volumes.
pub struct SourceBuilder {
    source: ArraySource,
}

impl SourceBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            source: ArraySource::new(name),
        }
    }

    pub fn ramp(mut self, volume_type: &str, roi: Roi) -> Self {
        self.source = self
            .source
            .with_volume(volume_type, VolumeBuilder::new(roi).build());
        self
    }

    pub fn volume(mut self, volume_type: &str, volume: Volume) -> Self {
        self.source = self.source.with_volume(volume_type, volume);
        self
    }

    pub fn build(self) -> ArraySource {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_encodes_position() {
        let roi = Roi::from_slices(&[-2, 3], &[4, 4]).unwrap();
        let volume = VolumeBuilder::new(roi).build();
        let a = volume.array::<f64>().unwrap();
        assert_eq!(a[IxDyn(&[0, 0])], encode(&[-2, 3]));
        assert_eq!(a[IxDyn(&[3, 1])], encode(&[1, 4]));
    }
}
