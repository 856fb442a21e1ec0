//! Layout options and configuration.

use crate::error::{Error, Result};

/// Options for column segmentation and reading-order resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    /// Minimum gap between consecutive block midpoints, relative to the
    /// page width, for a two-column split
    pub gap_fraction: f64,

    /// Minimum width, relative to a column's width, for a block crossing
    /// the split to be read as full-width
    pub full_width_fraction: f64,

    /// Band above the gap threshold, relative to the page width, inside
    /// which a split is still rejected
    pub tie_tolerance: f64,

    /// Whether to process pages in parallel
    pub parallel: bool,
}

impl LayoutOptions {
    /// Create new layout options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the gap fraction.
    pub fn with_gap_fraction(mut self, fraction: f64) -> Self {
        self.gap_fraction = fraction;
        self
    }

    /// Set the full-width fraction.
    pub fn with_full_width_fraction(mut self, fraction: f64) -> Self {
        self.full_width_fraction = fraction;
        self
    }

    /// Set the near-tie tolerance.
    pub fn with_tie_tolerance(mut self, tolerance: f64) -> Self {
        self.tie_tolerance = tolerance;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check that every fraction is in range.
    pub fn validate(&self) -> Result<()> {
        fn unit(name: &str, v: f64) -> Result<()> {
            if v.is_finite() && v > 0.0 && v <= 1.0 {
                Ok(())
            } else {
                Err(Error::InvalidOptions(format!(
                    "{} must be in (0, 1], got {}",
                    name, v
                )))
            }
        }

        unit("gap_fraction", self.gap_fraction)?;
        unit("full_width_fraction", self.full_width_fraction)?;
        if !(self.tie_tolerance.is_finite() && (0.0..1.0).contains(&self.tie_tolerance)) {
            return Err(Error::InvalidOptions(format!(
                "tie_tolerance must be in [0, 1), got {}",
                self.tie_tolerance
            )));
        }
        Ok(())
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            gap_fraction: 0.15,
            full_width_fraction: 0.8,
            tie_tolerance: 0.001,
            parallel: true,
        }
    }
}
