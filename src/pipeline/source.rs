//! Batch sources: the upstream end of a pipeline.
//!
//! A source answers the fully prepared request of a traversal with a `Batch`
//! whose volumes contain (at least) the requested ROIs. Reading from storage
//! belongs here, never in nodes.

use crate::error::{Result, VolpipeError};
use crate::geometry::Roi;
use crate::pipeline::batch::Batch;
use crate::pipeline::request::Request;
use crate::volume::{Volume, VolumeType};
use std::collections::HashMap;

/// Upstream provider of batches.
pub trait BatchSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Materialize `request`. Every returned volume must contain the ROI
    /// requested for its type.
    fn provide(&self, request: &Request) -> Result<Batch>;
}

/// In-memory source serving crops of volumes it holds in full.
#[derive(Debug, Clone)]
pub struct ArraySource {
    name: String,
    volumes: HashMap<VolumeType, Volume>,
}

impl ArraySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            volumes: HashMap::new(),
        }
    }

    /// Builder-style insert.
    pub fn with_volume(mut self, volume_type: impl Into<VolumeType>, volume: Volume) -> Self {
        self.insert(volume_type.into(), volume);
        self
    }

    pub fn insert(&mut self, volume_type: VolumeType, volume: Volume) -> Option<Volume> {
        self.volumes.insert(volume_type, volume)
    }

    /// Full extent available for `volume_type`.
    pub fn extent(&self, volume_type: &VolumeType) -> Option<&Roi> {
        self.volumes.get(volume_type).map(Volume::roi)
    }
}

impl BatchSource for ArraySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn provide(&self, request: &Request) -> Result<Batch> {
        let mut batch = Batch::new();
        for (volume_type, roi) in request.iter() {
            let volume = self
                .volumes
                .get(volume_type)
                .ok_or_else(|| VolpipeError::MissingVolume(volume_type.clone()))?;
            if !volume.roi().contains(roi) {
                return Err(VolpipeError::containment(
                    format!("source {} serving {}", self.name, volume_type),
                    volume.roi(),
                    roi,
                ));
            }
            tracing::trace!("{} providing {} in {}", self.name, volume_type, roi);
            batch.insert(volume_type.clone(), volume.crop(roi)?);
        }
        Ok(batch)
    }
}
