//! DownSample - strided resampling node.
//!
//! Produces a downsampled copy of an input volume by keeping every `f`-th
//! voxel along each axis (nearest-neighbour decimation, no averaging).
//!
//! # ROI negotiation
//!
//! A request for ROI `r` of the output becomes a request for
//! `r.center_preserving_scale(f)` of the input: the window that, decimated
//! with stride `f`, yields exactly `r.shape()` voxels and shares `r`'s center.
//! If the input is also requested directly (by another consumer or another
//! entry of this node), the two requests are merged by union, and `process`
//! crops the input back down afterwards.
//!
//! ```text
//! request {B: [(0,0,0):(4,4,4)]}    --prepare-->  {A: [(-2,-2,-2):(6,6,6)]}
//! batch   {A: [(-2,-2,-2):(6,6,6)]} --process-->  {B: [(0,0,0):(4,4,4)], res x2}
//! ```

use crate::error::{Result, ResultExt, VolpipeError};
use crate::geometry::{Coordinate, Roi, ScaleFactor};
use crate::pipeline::batch::Batch;
use crate::pipeline::node::BatchFilter;
use crate::pipeline::request::Request;
use crate::volume::{Volume, VolumeType};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One resampling job: downsample `input` by `factor` into `output`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownSampleEntry {
    pub input: VolumeType,
    pub factor: ScaleFactor,
    pub output: VolumeType,
}

impl DownSampleEntry {
    pub fn new(
        input: impl Into<VolumeType>,
        factor: impl Into<ScaleFactor>,
        output: impl Into<VolumeType>,
    ) -> Self {
        Self {
            input: input.into(),
            factor: factor.into(),
            output: output.into(),
        }
    }
}

/// Downsample volumes in a batch by integer factors.
#[derive(Debug, Clone)]
pub struct DownSample {
    entries: Vec<DownSampleEntry>,
}

impl DownSample {
    /// Build the node from its entries.
    ///
    /// Fails with a configuration error if a factor is invalid, an output type
    /// is produced twice, or an output type is also consumed as an input.
    pub fn new(entries: impl IntoIterator<Item = DownSampleEntry>) -> Result<Self> {
        let entries: Vec<_> = entries.into_iter().collect();
        if entries.is_empty() {
            return Err(VolpipeError::Configuration(
                "DownSample needs at least one entry".to_string(),
            ));
        }

        let mut outputs = HashSet::new();
        for entry in &entries {
            entry
                .factor
                .validate()
                .with_context(|| format!("downsampling {} to {}", entry.input, entry.output))?;
            if !outputs.insert(entry.output.clone()) {
                return Err(VolpipeError::Configuration(format!(
                    "output volume type {} is used twice",
                    entry.output
                )));
            }
        }
        if let Some(entry) = entries.iter().find(|e| outputs.contains(&e.input)) {
            return Err(VolpipeError::Configuration(format!(
                "volume type {} is both an input and an output",
                entry.input
            )));
        }

        Ok(Self { entries })
    }

    /// Node with a single entry.
    pub fn single(
        input: impl Into<VolumeType>,
        factor: impl Into<ScaleFactor>,
        output: impl Into<VolumeType>,
    ) -> Result<Self> {
        Self::new([DownSampleEntry::new(input, factor, output)])
    }

    pub fn entries(&self) -> &[DownSampleEntry] {
        &self.entries
    }

    /// Distinct input types, in entry order.
    fn inputs(&self) -> Vec<&VolumeType> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .map(|e| &e.input)
            .filter(|t| seen.insert(*t))
            .collect()
    }
}

impl BatchFilter for DownSample {
    fn name(&self) -> &str {
        "DownSample"
    }

    fn provides(&self) -> Vec<VolumeType> {
        self.entries.iter().map(|e| e.output.clone()).collect()
    }

    fn prepare(&self, request: &mut Request) -> Result<()> {
        for entry in &self.entries {
            let Some(requested) = request.get(&entry.output) else {
                continue;
            };

            tracing::debug!("preparing downsampling of {}", entry.input);

            let scaled = requested
                .center_preserving_scale(&entry.factor)
                .with_context(|| format!("scaling request for {}", entry.output))?;

            tracing::debug!(
                "needed request for {} in {} is {} in {}",
                requested,
                entry.output,
                scaled,
                entry.input
            );

            request.merge(entry.input.clone(), scaled)?;
            request.remove(&entry.output);
        }
        Ok(())
    }

    fn process(&self, batch: &mut Batch, request: &Request) -> Result<()> {
        for entry in &self.entries {
            let Some(requested) = request.get(&entry.output) else {
                continue;
            };

            let scaled = requested
                .center_preserving_scale(&entry.factor)
                .with_context(|| format!("scaling request for {}", entry.output))?;
            let input = batch.require(&entry.input)?;
            if !input.roi().contains(&scaled) {
                return Err(VolpipeError::containment(
                    format!("downsampling {} to {}", entry.input, entry.output),
                    input.roi(),
                    &scaled,
                ));
            }

            tracing::debug!(
                "downsampling {} in {} with factor {}",
                entry.input,
                scaled,
                entry.factor
            );

            let output = decimate(input, &scaled, &entry.factor, requested)
                .with_context(|| format!("downsampling {} to {}", entry.input, entry.output))?;
            batch.insert(entry.output.clone(), output);
        }

        // restore requested rois
        for input in self.inputs() {
            let Some(roi) = request.get(input) else {
                if batch.remove(input).is_some() {
                    tracing::debug!("removing {}, only needed for downsampling", input);
                }
                continue;
            };
            let Some(volume) = batch.get_mut(input) else {
                continue;
            };
            if volume.roi() == roi {
                continue;
            }
            if !volume.roi().contains(roi) {
                return Err(VolpipeError::containment(
                    format!("restoring {}", input),
                    volume.roi(),
                    roi,
                ));
            }
            tracing::debug!(
                "restoring original request roi {} of {} from {}",
                roi,
                input,
                volume.roi()
            );
            volume.crop_in_place(roi)?;
        }
        Ok(())
    }
}

/// Crop `input` to `window` and keep every `factor`-th voxel of it.
///
/// The result must have exactly the shape of `target`, which becomes its ROI;
/// its resolution is the input resolution times `factor`. Fails with
/// `ContainmentViolation` if `window` is not inside the input and with
/// `ShapeMismatch` if `factor` does not evenly divide `window`.
pub fn decimate(
    input: &Volume,
    window: &Roi,
    factor: &ScaleFactor,
    target: &Roi,
) -> Result<Volume> {
    let dims = window.dims();
    let steps = factor.strides(dims)?;
    let resolution = input.resolution().try_mul(&factor.resolve(dims)?)?;

    let cropped = input.crop(window)?;
    let data = cropped.data().strided(&steps);

    let actual = Coordinate::from_shape(data.shape());
    if &actual != target.shape() {
        return Err(VolpipeError::ShapeMismatch {
            context: format!("decimating {} with factor {}", window, factor),
            expected: target.shape().clone(),
            actual,
        });
    }

    tracing::trace!("decimated {} to {}", window, target);
    Volume::new(data, target.clone(), resolution)
}
