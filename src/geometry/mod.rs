//! Coordinate and ROI algebra.
//!
//! Everything the ROI negotiation needs to reason about space lives here:
//! - [`Coordinate`] - integer vectors for positions, shapes and resolutions
//! - [`Roi`] - axis-aligned boxes with union, intersection, containment and
//!   (center-preserving) scaling
//! - [`ScaleFactor`] - uniform or per-axis positive integer factors
//!
//! Integer division anywhere in this module rounds toward negative infinity,
//! so the center of a ROI with an odd shape is biased toward its begin.

pub mod coordinate;
pub mod factor;
pub mod roi;

pub use coordinate::{floor_div, Coordinate};
pub use factor::ScaleFactor;
pub use roi::Roi;
