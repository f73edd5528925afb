/// Oscillator parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OscillatorConfig {
    /// Initial value.
    pub start: f32,
    /// Signed increment applied per advance.
    pub step: f32,
    /// Values strictly below this reverse the direction.
    pub lower: f32,
    /// Values at or above this reverse the direction.
    pub upper: f32,
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        Self {
            start: 0.01,
            step: 0.005,
            lower: 0.01,
            upper: 0.8,
        }
    }
}

/// Fixed-increment triangle wave.
///
/// Advances by a constant step per call, independent of wall-clock time. The
/// direction flips once the value leaves `[lower, upper)`, so the value may
/// overshoot either bound by at most one step before turning back.
#[derive(Debug, Clone)]
pub struct Oscillator {
    value: f32,
    step: f32,
    lower: f32,
    upper: f32,
}

impl Oscillator {
    pub fn new(config: OscillatorConfig) -> Self {
        debug_assert!(config.lower < config.upper);
        Self {
            value: config.start,
            step: config.step,
            lower: config.lower,
            upper: config.upper,
        }
    }

    /// Current value, as it will be returned by the next `advance`.
    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Current signed step.
    #[inline]
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Returns the value for this frame, then moves one step.
    pub fn advance(&mut self) -> f32 {
        let current = self.value;

        self.value += self.step;
        if self.value >= self.upper || self.value < self.lower {
            self.step = -self.step;
        }

        current
    }
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new(OscillatorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_returns_value_before_stepping() {
        let mut osc = Oscillator::default();
        assert_eq!(osc.advance(), 0.01);
        assert!((osc.value() - 0.015).abs() < 1e-6);
    }

    #[test]
    fn flips_after_reaching_upper_bound() {
        let mut osc = Oscillator::default();
        let mut flipped_at = None;
        for n in 1..=400 {
            osc.advance();
            if osc.step() < 0.0 {
                flipped_at = Some(n);
                break;
            }
        }

        // (0.8 - 0.01) / 0.005 = 158 steps, give or take f32 rounding.
        let n = flipped_at.expect("step never reversed");
        assert!((157..=159).contains(&n), "flipped after {n} updates");
        assert!(osc.value() >= 0.8);
    }

    #[test]
    fn stays_near_bounds_forever() {
        let cfg = OscillatorConfig::default();
        let mut osc = Oscillator::new(cfg);
        let slack = cfg.step + 1e-4;

        let mut saw_top = false;
        let mut saw_bottom = false;
        for _ in 0..10_000 {
            let v = osc.advance();
            assert!(v >= cfg.lower - slack && v <= cfg.upper + slack, "escaped: {v}");
            saw_top |= v >= cfg.upper - slack;
            saw_bottom |= v <= cfg.lower + slack;
        }
        assert!(saw_top && saw_bottom);
    }

    #[test]
    fn magnitude_of_step_never_changes() {
        let mut osc = Oscillator::default();
        for _ in 0..1000 {
            osc.advance();
            assert_eq!(osc.step().abs(), 0.005);
        }
    }
}
