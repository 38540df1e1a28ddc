//! # Currency Ratio
//!
//! How much of a host's exposure (outstanding security patches plus installed
//! packages) is made of outstanding security patches.
//!
//! The value is a fraction in `[0, 1]`, not a percentage, even though the
//! report column is called "Currency Percentage".

/// Compute the currency ratio of a system.
///
/// `patches / (patches + packages)`, or `0.0` when both counts are zero.
#[allow(clippy::float_arithmetic)] // the ratio is the only float in the crate
pub fn currency(patches: usize, packages: usize) -> f64 {
    let total = patches.saturating_add(packages);
    if total == 0 {
        return 0.0;
    }
    patches as f64 / total as f64
}
