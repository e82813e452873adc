//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use std::time::Duration;
use volpipe::Roi;

/// Create a test timeout duration
pub fn test_timeout() -> Duration {
    Duration::from_secs(5)
}

/// Shorthand for a ROI that is known to be valid
pub fn roi(offset: &[i64], shape: &[i64]) -> Roi {
    Roi::from_slices(offset, shape).expect("valid test ROI")
}
