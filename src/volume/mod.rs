//! Volumes and their identifiers.
//!
//! - [`VolumeType`] - names a logical array in requests and batches
//! - [`VolumeData`] - dense typed storage backed by `ndarray`
//! - [`Volume`] - data plus the ROI it spans and its resolution

pub mod data;
pub mod volume_type;
#[allow(clippy::module_inception)]
pub mod volume;

pub use data::{DataType, VolumeData, Voxel};
pub use volume::Volume;
pub use volume_type::VolumeType;
