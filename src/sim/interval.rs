//! Closed 1D intervals used for apertures and visible ranges

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Closed interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Interval centered on `center` reaching `extents` to either side
    pub fn from_center_extent(center: f32, extents: f32) -> Self {
        Self::new(center - extents, center + extents)
    }

    /// Translate both bounds by `delta`
    #[inline]
    pub fn shift(&self, delta: f32) -> Self {
        Self::new(self.min + delta, self.max + delta)
    }

    /// Move both bounds outward by `margin` (inward when negative)
    #[inline]
    pub fn grow(&self, margin: f32) -> Self {
        Self::new(self.min - margin, self.max + margin)
    }

    /// Uniform sample in `[min, max]`
    pub fn random_value<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.min >= self.max {
            return self.min;
        }
        rng.random_range(self.min..=self.max)
    }

    pub fn size(&self) -> f32 {
        self.max - self.min
    }

    pub fn contains(&self, value: f32) -> bool {
        self.min <= value && value <= self.max
    }

    /// `min <= max` and both bounds finite
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}
