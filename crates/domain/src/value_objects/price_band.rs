use serde::{Deserialize, Serialize};

/// Symmetric tolerance band `center ± half_width`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    pub center: f64,
    pub half_width: f64,
}

impl PriceBand {
    /// Band of `±tolerance × center` around `center`.
    #[must_use]
    pub fn around(center: f64, tolerance: f64) -> Self {
        Self {
            center,
            half_width: center * tolerance,
        }
    }

    #[must_use]
    pub fn lower(&self) -> f64 {
        self.center - self.half_width
    }

    #[must_use]
    pub fn upper(&self) -> f64 {
        self.center + self.half_width
    }

    /// Inclusive on both edges.
    #[must_use]
    pub fn contains(&self, price: f64) -> bool {
        (price - self.center).abs() <= self.half_width
    }
}
