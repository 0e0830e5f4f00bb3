//! Grid engine configuration.
//!
//! # Environment Variables
//!
//! - `STOWAGE_BOUNDS_EPSILON`: padding (in cells) applied to bounds
//!   containment checks (default: 0.01)

/// Default padding applied when testing whether a footprint is inside the grid.
pub const DEFAULT_BOUNDS_EPSILON: f32 = 0.01;

/// Smallest accepted padding.
pub const MIN_BOUNDS_EPSILON: f32 = 0.0001;

/// Largest accepted padding. At 0.5 a one-cell item would be judged by its
/// center only.
pub const MAX_BOUNDS_EPSILON: f32 = 0.49;

/// Tunables for [`InventoryGrid`](crate::InventoryGrid).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    /// Inward nudge applied to a footprint's corners before the bounds test.
    pub bounds_epsilon: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            bounds_epsilon: DEFAULT_BOUNDS_EPSILON,
        }
    }
}

impl GridConfig {
    /// Load config from environment variables, falling back to defaults.
    ///
    /// Unparseable values are ignored.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("STOWAGE_BOUNDS_EPSILON")
            && let Ok(epsilon) = val.trim().parse::<f32>()
        {
            config.bounds_epsilon = epsilon;
        }

        config.validated()
    }

    /// Set the bounds padding.
    #[must_use]
    pub fn with_bounds_epsilon(mut self, epsilon: f32) -> Self {
        self.bounds_epsilon = epsilon;
        self
    }

    /// Clamp values to safe ranges.
    ///
    /// A non-finite epsilon falls back to the default.
    ///
    /// ```
    /// use stowage_grid::GridConfig;
    ///
    /// let config = GridConfig::default().with_bounds_epsilon(3.0).validated();
    /// assert_eq!(config.bounds_epsilon, 0.49);
    /// ```
    #[must_use]
    pub fn validated(mut self) -> Self {
        self.bounds_epsilon = if self.bounds_epsilon.is_finite() {
            self.bounds_epsilon
                .clamp(MIN_BOUNDS_EPSILON, MAX_BOUNDS_EPSILON)
        } else {
            DEFAULT_BOUNDS_EPSILON
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_epsilon_is_one_hundredth() {
        assert_eq!(GridConfig::default().bounds_epsilon, 0.01);
    }

    #[test]
    fn validated_clamps_both_ends() {
        let low = GridConfig::default().with_bounds_epsilon(0.0).validated();
        assert_eq!(low.bounds_epsilon, MIN_BOUNDS_EPSILON);
        let high = GridConfig::default().with_bounds_epsilon(1.0).validated();
        assert_eq!(high.bounds_epsilon, MAX_BOUNDS_EPSILON);
    }

    #[test]
    fn validated_replaces_nan() {
        let config = GridConfig::default()
            .with_bounds_epsilon(f32::NAN)
            .validated();
        assert_eq!(config.bounds_epsilon, DEFAULT_BOUNDS_EPSILON);
    }

    #[test]
    fn from_env_without_override_is_default() {
        // The variable is never set by the test suite.
        if std::env::var_os("STOWAGE_BOUNDS_EPSILON").is_none() {
            assert_eq!(GridConfig::from_env(), GridConfig::default());
        }
    }
}
