use std::f64::consts::PI;

/// Low-frequency oscillator phase for the time-varying effects.
///
/// The phase is a monotonically increasing accumulator in radians, advanced
/// by `2*pi*f / sample_rate` once per processed sample. It is never wrapped:
/// cosine periodicity absorbs the magnitude, and precision drift over very
/// long runs is an accepted characteristic of the model. The only reset is
/// on effect switch.
pub struct Lfo {
    phase: f64,
    step: f64,
}

impl Lfo {
    pub fn new(frequency: f64, sample_rate: u32) -> Self {
        Self {
            phase: 0.0,
            step: frequency * 2.0 * PI / sample_rate as f64,
        }
    }

    /// Advances the phase by one sample.
    #[inline]
    pub fn tick(&mut self) {
        self.phase += self.step;
    }

    /// Current phase in radians.
    #[inline]
    pub fn radians(&self) -> f64 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lfo_step_size() {
        let mut lfo = Lfo::new(5.0, 44100);
        assert_eq!(lfo.radians(), 0.0);

        lfo.tick();
        let expected = 5.0 * 2.0 * PI / 44100.0;
        assert!((lfo.radians() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_lfo_full_cycle() {
        // 5 Hz at 44100 Hz returns to the start of its cycle after
        // 44100 / 5 = 8820 samples
        let mut lfo = Lfo::new(5.0, 44100);
        for _ in 0..8820 {
            lfo.tick();
        }

        let envelope = (1.0 + lfo.radians().cos()) / 2.0;
        assert!(
            (envelope - 1.0).abs() < 1e-9,
            "envelope should return to its initial value, got {}",
            envelope
        );
    }

    #[test]
    fn test_lfo_phase_is_monotonic() {
        let mut lfo = Lfo::new(1.0, 44100);
        let mut previous = lfo.radians();

        for _ in 0..100_000 {
            lfo.tick();
            assert!(lfo.radians() > previous);
            previous = lfo.radians();
        }
    }

    #[test]
    fn test_lfo_reset() {
        let mut lfo = Lfo::new(1.0, 44100);
        for _ in 0..1000 {
            lfo.tick();
        }
        lfo.reset();
        assert_eq!(lfo.radians(), 0.0);
    }
}
