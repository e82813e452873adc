//! Error handling for volpipe
//!
//! Every failure in the core is a geometry or contract violation, not a
//! transient resource failure, so nothing here is retried. Errors surface
//! synchronously and fail the traversal that raised them.

use crate::geometry::{Coordinate, Roi};
use crate::volume::VolumeType;
use thiserror::Error;

/// Main error type for volpipe operations
#[derive(Error, Debug)]
pub enum VolpipeError {
    /// Invalid node or pipeline configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Two operands disagree on dimensionality
    #[error("Dimension mismatch: expected {expected} dimensions, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// ROI with negative extent or otherwise malformed bounds
    #[error("Invalid ROI: {0}")]
    InvalidRoi(String),

    /// A ROI that must be covered by another one is not
    #[error("Containment violation in {context}: {outer} does not contain {inner}")]
    ContainmentViolation {
        context: String,
        outer: Roi,
        inner: Roi,
    },

    /// Array shape differs from the shape it is required to have
    #[error("Shape mismatch for {context}: expected {expected}, got {actual}")]
    ShapeMismatch {
        context: String,
        expected: Coordinate,
        actual: Coordinate,
    },

    /// A volume type needed by a node is absent from the batch
    #[error("Volume {0} missing from batch")]
    MissingVolume(VolumeType),

    /// Upstream source failed to materialize a batch
    #[error("Source error: {0}")]
    Source(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<VolpipeError>,
    },
}

impl VolpipeError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        VolpipeError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for a containment failure between two ROIs.
    pub fn containment(context: impl Into<String>, outer: &Roi, inner: &Roi) -> Self {
        VolpipeError::ContainmentViolation {
            context: context.into(),
            outer: outer.clone(),
            inner: inner.clone(),
        }
    }

    /// The innermost error, skipping any `WithContext` layers.
    pub fn root(&self) -> &VolpipeError {
        match self {
            VolpipeError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self.root(), VolpipeError::Configuration(_))
    }

    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self.root(), VolpipeError::DimensionMismatch { .. })
    }

    pub fn is_containment_violation(&self) -> bool {
        matches!(self.root(), VolpipeError::ContainmentViolation { .. })
    }

    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self.root(), VolpipeError::ShapeMismatch { .. })
    }
}

/// Result type alias for volpipe operations
pub type Result<T> = std::result::Result<T, VolpipeError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
