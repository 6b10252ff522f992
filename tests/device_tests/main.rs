//! Device Tests
//!
//! Memory models, low level controllers and disks.


// =============================================================================
// Helper Functions
// =============================================================================

/// Compare simulated times that were built from many additions
pub fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {}, got {}",
        expected,
        actual
    );
}
