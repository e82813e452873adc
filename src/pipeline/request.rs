//! Batch requests: which ROI of which volume type a consumer wants.
//!
//! A `Request` travels upstream through the chain. Every node rewrites it in
//! place during `prepare`, replacing the volume types it produces by the
//! volume types (and ROIs) it needs to produce them.

use crate::error::Result;
use crate::geometry::Roi;
use crate::volume::VolumeType;
use std::collections::HashMap;
use std::fmt;

/// Mapping from volume type to requested ROI.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Request {
    volumes: HashMap<VolumeType, Roi>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, volume_type: impl Into<VolumeType>, roi: Roi) -> Self {
        self.volumes.insert(volume_type.into(), roi);
        self
    }

    /// Insert or replace the ROI for `volume_type`, returning the previous one.
    pub fn insert(&mut self, volume_type: VolumeType, roi: Roi) -> Option<Roi> {
        self.volumes.insert(volume_type, roi)
    }

    pub fn get(&self, volume_type: &VolumeType) -> Option<&Roi> {
        self.volumes.get(volume_type)
    }

    pub fn remove(&mut self, volume_type: &VolumeType) -> Option<Roi> {
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

    pub fn iter(&self) -> impl Iterator<Item = (&VolumeType, &Roi)> {
        self.volumes.iter()
    }

    /// Requested volume types in sorted order.
    pub fn volume_types(&self) -> Vec<VolumeType> {
        let mut types: Vec<_> = self.volumes.keys().cloned().collect();
        types.sort();
        types
    }

    /// Ask for `roi` of `volume_type` in addition to whatever is already
    /// requested: the entry becomes the union of both, or `roi` if absent.
    pub fn merge(&mut self, volume_type: VolumeType, roi: Roi) -> Result<()> {
        match self.volumes.get_mut(&volume_type) {
            Some(existing) => {
                let merged = existing.union(&roi)?;
                tracing::debug!(
                    "merging {} into existing request {} for {} -> {}",
                    roi,
                    existing,
                    volume_type,
                    merged
                );
                *existing = merged;
            }
            None => {
                tracing::debug!("adding {} as new request for {}", roi, volume_type);
                self.volumes.insert(volume_type, roi);
            }
        }
        Ok(())
    }

    /// Bounding box of all requested ROIs, `None` for an empty request.
    pub fn total_roi(&self) -> Result<Option<Roi>> {
        let mut rois = self.volumes.values();
        let Some(first) = rois.next() else {
            return Ok(None);
        };
        rois.try_fold(first.clone(), |acc, roi| acc.union(roi))
            .map(Some)
    }
}

impl FromIterator<(VolumeType, Roi)> for Request {
    fn from_iter<I: IntoIterator<Item = (VolumeType, Roi)>>(iter: I) -> Self {
        Self {
            volumes: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Request {{")?;
        for (i, volume_type) in self.volume_types().iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, " {}: {}", volume_type, self.volumes[volume_type])?;
        }
        write!(f, " }}")
    }
}
