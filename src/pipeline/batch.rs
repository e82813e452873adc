//! Batches: the materialized answer to a `Request`.

use crate::error::{Result, VolpipeError};
use crate::pipeline::request::Request;
use crate::volume::{Volume, VolumeType};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_BATCH_ID: AtomicU64 = AtomicU64::new(0);

/// Mapping from volume type to volume, flowing downstream through the chain.
#[derive(Debug, Clone)]
pub struct Batch {
    id: u64,
    volumes: HashMap<VolumeType, Volume>,
}

impl Batch {
    /// Empty batch with a fresh, process-wide unique id.
    pub fn new() -> Self {
        Self {
            id: NEXT_BATCH_ID.fetch_add(1, Ordering::Relaxed),
            volumes: HashMap::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Insert or replace a volume, returning the previous one.
    pub fn insert(&mut self, volume_type: VolumeType, volume: Volume) -> Option<Volume> {
        self.volumes.insert(volume_type, volume)
    }

    pub fn get(&self, volume_type: &VolumeType) -> Option<&Volume> {
        self.volumes.get(volume_type)
    }

    pub fn get_mut(&mut self, volume_type: &VolumeType) -> Option<&mut Volume> {
        self.volumes.get_mut(volume_type)
    }

    /// Like [`get`](Self::get), but a missing volume is an error.
    pub fn require(&self, volume_type: &VolumeType) -> Result<&Volume> {
        self.volumes
            .get(volume_type)
            .ok_or_else(|| VolpipeError::MissingVolume(volume_type.clone()))
    }

    pub fn remove(&mut self, volume_type: &VolumeType) -> Option<Volume> {
        self.volumes.remove(volume_type)
    }

    pub fn contains(&self, volume_type: &VolumeType) -> bool {
        self.volumes.contains_key(volume_type)
    }

    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VolumeType, &Volume)> {
        self.volumes.iter()
    }

    /// Volume types present, in sorted order.
    pub fn volume_types(&self) -> Vec<VolumeType> {
        let mut types: Vec<_> = self.volumes.keys().cloned().collect();
        types.sort();
        types
    }

    /// Check that every requested volume is present with exactly the
    /// requested ROI.
    pub fn verify(&self, request: &Request) -> Result<()> {
        for (volume_type, roi) in request.iter() {
            let volume = self.require(volume_type)?;
            if volume.roi() != roi {
                return Err(VolpipeError::containment(
                    format!("delivered {}", volume_type),
                    volume.roi(),
                    roi,
                ));
            }
        }
        Ok(())
    }

    /// Drop every volume whose type is not part of `request`.
    pub fn retain_requested(&mut self, request: &Request) {
        self.volumes.retain(|volume_type, _| {
            let keep = request.contains(volume_type);
            if !keep {
                tracing::trace!("dropping unrequested volume {}", volume_type);
            }
            keep
        });
    }
}

impl Default for Batch {
    fn default() -> Self {
        Self::new()
    }
}
