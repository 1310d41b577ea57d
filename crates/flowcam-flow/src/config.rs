use crate::error::FlowError;

/// Number of pyramid levels of the default filter.
pub const DEFAULT_LEVELS: usize = 3;

/// Default clamp of the flow magnitude, in pixels per frame.
pub const DEFAULT_MAX_FLOW: f32 = 40.0;

/// Default per-level smoothness weights, coarse to fine.
pub const DEFAULT_GAMMA: [f32; DEFAULT_LEVELS] = [500.0, 50.0, 5.0];

/// Default per-level smoothing iterations, coarse to fine.
pub const DEFAULT_SMOOTH_ITERATIONS: [u32; DEFAULT_LEVELS] = [2, 8, 20];

/// Tunables of the pyramidal flow filter.
///
/// The filter is configured once before the capture loop starts. `gamma` and
/// `smooth_iterations` hold one entry per pyramid level.
///
/// # Examples
///
/// ```
/// use flowcam_flow::FlowFilterConfig;
///
/// let config = FlowFilterConfig::default();
/// assert!(config.validate().is_ok());
///
/// let bad = FlowFilterConfig::default().with_gamma(vec![500.0, 50.0]);
/// assert!(bad.validate().is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FlowFilterConfig {
    /// Number of pyramid levels.
    pub levels: usize,
    /// Clamp of the flow magnitude, also used to scale the color encoding.
    pub max_flow: f32,
    /// Smoothness weight of each level.
    pub gamma: Vec<f32>,
    /// Smoothing iterations of each level.
    pub smooth_iterations: Vec<u32>,
}

impl Default for FlowFilterConfig {
    fn default() -> Self {
        Self {
            levels: DEFAULT_LEVELS,
            max_flow: DEFAULT_MAX_FLOW,
            gamma: DEFAULT_GAMMA.to_vec(),
            smooth_iterations: DEFAULT_SMOOTH_ITERATIONS.to_vec(),
        }
    }
}

impl FlowFilterConfig {
    /// Set the number of pyramid levels.
    pub fn with_levels(mut self, levels: usize) -> Self {
        self.levels = levels;
        self
    }

    /// Set the flow magnitude clamp.
    pub fn with_max_flow(mut self, max_flow: f32) -> Self {
        self.max_flow = max_flow;
        self
    }

    /// Set the per-level smoothness weights.
    pub fn with_gamma(mut self, gamma: Vec<f32>) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set the per-level smoothing iterations.
    pub fn with_smooth_iterations(mut self, smooth_iterations: Vec<u32>) -> Self {
        self.smooth_iterations = smooth_iterations;
        self
    }

    /// Check that the tunables are consistent with the pyramid depth.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Config`] if there are no levels, `max_flow` is not
    /// a positive finite number, a per-level sequence does not have one entry
    /// per level, or a weight is negative or not finite.
    pub fn validate(&self) -> Result<(), FlowError> {
        if self.levels == 0 {
            return Err(FlowError::Config(
                "the pyramid needs at least one level".to_string(),
            ));
        }

        if !self.max_flow.is_finite() || self.max_flow <= 0.0 {
            return Err(FlowError::Config(format!(
                "max flow must be positive, got {}",
                self.max_flow
            )));
        }

        if self.gamma.len() != self.levels {
            return Err(FlowError::Config(format!(
                "expected {} gamma values, got {}",
                self.levels,
                self.gamma.len()
            )));
        }

        if self.smooth_iterations.len() != self.levels {
            return Err(FlowError::Config(format!(
                "expected {} smooth iteration values, got {}",
                self.levels,
                self.smooth_iterations.len()
            )));
        }

        if let Some(g) = self.gamma.iter().find(|g| !g.is_finite() || **g < 0.0) {
            return Err(FlowError::Config(format!(
                "gamma values must be finite and non-negative, got {g}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = FlowFilterConfig::default();
        assert_eq!(config.levels, 3);
        assert_eq!(config.max_flow, 40.0);
        assert_eq!(config.gamma, vec![500.0, 50.0, 5.0]);
        assert_eq!(config.smooth_iterations, vec![2, 8, 20]);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn gamma_length_must_match_levels() {
        let config = FlowFilterConfig::default().with_gamma(vec![500.0, 50.0]);
        assert_eq!(
            config.validate(),
            Err(FlowError::Config(
                "expected 3 gamma values, got 2".to_string()
            ))
        );
    }

    #[test]
    fn iterations_length_must_match_levels() {
        let config = FlowFilterConfig::default()
            .with_levels(2)
            .with_gamma(vec![50.0, 5.0]);
        assert!(matches!(config.validate(), Err(FlowError::Config(_))));

        let config = config.with_smooth_iterations(vec![8, 20]);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_degenerate_values() {
        let zero_levels = FlowFilterConfig::default()
            .with_levels(0)
            .with_gamma(vec![])
            .with_smooth_iterations(vec![]);
        assert!(zero_levels.validate().is_err());

        let negative_flow = FlowFilterConfig::default().with_max_flow(-1.0);
        assert!(negative_flow.validate().is_err());

        let nan_gamma = FlowFilterConfig::default().with_gamma(vec![f32::NAN, 1.0, 1.0]);
        assert!(nan_gamma.validate().is_err());
    }
}
