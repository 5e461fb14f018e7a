use super::*;

/// How the hit resolver chooses between prisms at exactly the same distance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TieBreak {
    /// The first prism in input order wins.
    #[default]
    InputOrder,
    /// The prism with the smallest id wins, whatever the input order.
    LowestId,
}

impl TieBreak {
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::InputOrder => "input_order",
            Self::LowestId => "lowest_id",
        }
    }

    #[inline]
    pub fn from_name(name: &str) -> Option<Self> {
        [Self::InputOrder, Self::LowestId]
            .into_iter()
            .find(|t| t.name() == name)
    }

    /// Whether `candidate` should replace `incumbent` when both are equally close.
    #[inline]
    pub(crate) fn prefers(self, candidate: &Prism, incumbent: &Prism) -> bool {
        match self {
            Self::InputOrder => false,
            Self::LowestId => candidate.id < incumbent.id,
        }
    }
}

/// Numeric knobs shared by every entry point.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceConfig {
    /// Half-width (in degrees) of the cone a prism must lie in to be hit.
    pub angle_tolerance: Float,
    /// Step budget of [`trace_one`], or total segment budget of the [`Engine`].
    pub max_iterations: usize,
    /// Fraction of intensity lost per unit of distance traveled. `0.0` disables attenuation.
    pub attenuation_factor: Float,
    /// Rays dimmer than this are dropped.
    pub attenuation_threshold: Float,
    /// Number of decimals the heading is rounded to for loop detection.
    pub heading_precision: u32,
    /// Length of the segment drawn for a ray escaping to infinity.
    pub escape_length: Float,
    /// Prisms this close to the ray's origin are not candidates.
    pub self_hit_epsilon: Float,
    pub tie_break: TieBreak,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            angle_tolerance: 0.01,
            max_iterations: 1000,
            attenuation_factor: 0.0,
            attenuation_threshold: 0.01,
            heading_precision: 6,
            escape_length: 15.0,
            self_hit_epsilon: 1e-9,
            tie_break: TieBreak::InputOrder,
        }
    }
}

impl TraceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn angle_tolerance(mut self, degrees: Float) -> Self {
        self.angle_tolerance = degrees;
        self
    }

    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn attenuation(mut self, factor: Float, threshold: Float) -> Self {
        self.attenuation_factor = factor;
        self.attenuation_threshold = threshold;
        self
    }

    pub fn heading_precision(mut self, decimals: u32) -> Self {
        self.heading_precision = decimals;
        self
    }

    pub fn escape_length(mut self, length: Float) -> Self {
        self.escape_length = length;
        self
    }

    pub fn self_hit_epsilon(mut self, epsilon: Float) -> Self {
        self.self_hit_epsilon = epsilon;
        self
    }

    pub fn tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(PrismError::InvalidConfig(msg.into()));

        if !(self.angle_tolerance.is_finite() && self.angle_tolerance > 0.0) {
            return invalid("angle tolerance must be a positive number of degrees");
        }
        if self.max_iterations == 0 {
            return invalid("max iterations must be positive");
        }
        if !(0.0..1.0).contains(&self.attenuation_factor) {
            return invalid("attenuation factor must lie in [0, 1)");
        }
        if !(0.0..=1.0).contains(&self.attenuation_threshold) {
            return invalid("attenuation threshold must lie in [0, 1]");
        }
        if !(self.escape_length.is_finite() && self.escape_length >= 0.0) {
            return invalid("escape length must be a non-negative number");
        }
        if !(self.self_hit_epsilon.is_finite() && self.self_hit_epsilon >= 0.0) {
            return invalid("self-hit epsilon must be a non-negative number");
        }
        // 10^heading_precision must stay representable as an i64 key
        if self.heading_precision > 12 {
            return invalid("heading precision must be at most 12 decimals");
        }
        Ok(())
    }

    #[inline]
    pub fn attenuation_enabled(&self) -> bool {
        self.attenuation_factor > 0.0
    }

    /// Intensity left after traveling `distance` starting at `intensity`.
    #[inline]
    pub fn attenuate(&self, intensity: Float, distance: Float) -> Float {
        if self.attenuation_enabled() {
            intensity * (1.0 - self.attenuation_factor).powf(distance)
        } else {
            intensity
        }
    }

    /// Length of the terminal segment of a ray escaping with `intensity`.
    #[inline]
    pub fn escape_distance(&self, intensity: Float) -> Float {
        if self.attenuation_enabled() {
            attenuation_distance(
                intensity,
                self.attenuation_factor,
                self.attenuation_threshold,
            )
            .min(self.escape_length)
        } else {
            self.escape_length
        }
    }
}

/// Distance after which a ray of `intensity` decays to `threshold`, never negative.
///
/// `factor` must lie in `(0, 1)`.
#[inline]
pub fn attenuation_distance(intensity: Float, factor: Float, threshold: Float) -> Float {
    // `max` also maps a NaN ratio to 0
    ((threshold / intensity).ln() / (1.0 - factor).ln()).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults() {
        let config = TraceConfig::default();
        assert_eq!(config.angle_tolerance, 0.01);
        assert_eq!(config.max_iterations, 1000);
        assert!(!config.attenuation_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_nonsense() {
        assert!(TraceConfig::new().angle_tolerance(0.0).validate().is_err());
        assert!(TraceConfig::new().angle_tolerance(Float::NAN).validate().is_err());
        assert!(TraceConfig::new().max_iterations(0).validate().is_err());
        assert!(TraceConfig::new().attenuation(1.0, 0.1).validate().is_err());
        assert!(TraceConfig::new().attenuation(0.1, 1.5).validate().is_err());
        assert!(TraceConfig::new().escape_length(-1.0).validate().is_err());
        assert!(TraceConfig::new().heading_precision(13).validate().is_err());
    }

    #[test]
    fn escape_distance_matches_closed_form() {
        let (a, t) = (0.05, 0.1);
        assert_relative_eq!(attenuation_distance(1.0, a, t), t.ln() / (1.0 - a).ln());

        let config = TraceConfig::new().attenuation(a, t).escape_length(1000.0);
        let d = config.escape_distance(1.0);
        assert_relative_eq!(config.attenuate(1.0, d), t, epsilon = 1e-12);
    }

    #[test]
    fn escape_distance_is_clamped() {
        // already below the threshold
        assert_eq!(attenuation_distance(0.05, 0.1, 0.1), 0.0);

        let config = TraceConfig::new().attenuation(0.001, 0.01);
        assert_eq!(config.escape_distance(1.0), config.escape_length);

        let config = TraceConfig::new().attenuation(0.0, 0.01);
        assert_eq!(config.escape_distance(0.5), 15.0);
    }

    #[test]
    fn tie_break_names() {
        assert_eq!(TieBreak::from_name("lowest_id"), Some(TieBreak::LowestId));
        assert_eq!(TieBreak::from_name(TieBreak::InputOrder.name()), Some(TieBreak::InputOrder));
        assert_eq!(TieBreak::from_name("random"), None);
    }
}
