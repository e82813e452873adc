//! Built-in pipeline node implementations.

pub mod downsample;

pub use downsample::{decimate, DownSample, DownSampleEntry};
