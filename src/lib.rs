//! # volpipe: ROI-negotiating volume pipelines
//!
//! volpipe assembles batches of n-dimensional volumes (microscopy stacks,
//! label maps, masks) for training and inference. Consumers describe *what
//! region* of *which volume* they need; pipeline nodes rewrite that request on
//! its way to the source and transform the data on its way back.
//!
//! ## Architecture
//!
//! - **Geometry**: integer [`Coordinate`]s, [`Roi`]s and [`ScaleFactor`]s in
//!   world units
//! - **Volumes**: typed ndarray data anchored at a world-space ROI with a
//!   voxel resolution
//! - **Pipeline**: a [`BatchSource`] followed by nodes implementing the
//!   prepare/process contract, with [`DownSample`] as the built-in resampler
//! - **Prefetching**: worker threads and crossbeam channels
//!
//! ## Example
//!
//! ```no_run
//! use volpipe::{
//!     ArraySource, Coordinate, DownSample, PipelineBuilder, Request, Roi, Volume,
//! };
//! use ndarray::ArrayD;
//!
//! fn main() -> volpipe::Result<()> {
//!     let raw = Volume::from_array(
//!         ArrayD::<f32>::zeros(vec![64, 64]),
//!         Coordinate::from([0, 0]),
//!         Coordinate::from([1, 1]),
//!     )?;
//!
//!     let pipeline = PipelineBuilder::new(ArraySource::new("memory").with_volume("raw", raw))
//!         .node(DownSample::single("raw", 2u32, "raw_2")?)
//!         .build()?;
//!
//!     let request = Request::new().with("raw_2", Roi::from_slices(&[16, 16], &[8, 8])?);
//!     let batch = pipeline.request_batch(&request)?;
//!     assert_eq!(batch.len(), 1);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! Resampling jobs and prefetch settings can be loaded from JSON or TOML, see
//! [`config::PipelineConfig`].

pub mod config;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod pipeline;
pub mod volume;

pub use config::{PipelineConfig, PrefetchConfig};
pub use error::{Result, ResultExt, VolpipeError};
pub use geometry::{floor_div, Coordinate, Roi, ScaleFactor};
pub use pipeline::{
    decimate, AnyNode, ArraySource, Batch, BatchFilter, BatchPrefetcher, BatchSource, BuiltinNode,
    DownSample, DownSampleEntry, NodeId, Pipeline, PipelineBuilder, Request,
};
pub use volume::{DataType, Volume, VolumeData, VolumeType, Voxel};
