use crate::audio::buffers::HistoryBuffer;
use crate::audio::oscillators::Lfo;
use crate::audio::{sec_to_samples, PI};

// Display catalog, in dispatch order. Index == effect id.
pub const EFFECT_CATALOG: [(i32, &str); 9] = [
    (0, "Pass"),
    (1, "Echo"),
    (2, "IIR Echo"),
    (3, "Natural Echo"),
    (4, "Reverb"),
    (5, "Filter Out"),
    (6, "Fuzz"),
    (7, "Flanger"),
    (8, "Tremolo"),
];

// In the recurrences below, `x` is the input history, `y` the output
// history; `x.at(d)` is the input sample d steps before the current one and
// `y.at(d)` the output sample d steps back. The current input is `x.at(0)`.
// Effects only read history; the engine performs the single output write.

/// Ideal three-tap echo: y[n] = (a*x[n] + b*x[n-N] + c*x[n-2N]) / (a+b+c)
pub struct Echo {
    a: f32,
    b: f32,
    c: f32,
    norm: f32,
    n: usize,
}

impl Echo {
    fn new(sample_rate: u32) -> Self {
        let (a, b, c) = (1.0, 0.7, 0.5);
        Self {
            a,
            b,
            c,
            norm: 1.0 / (a + b + c),
            n: sec_to_samples(0.3, sample_rate),
        }
    }

    fn render(&self, x: &HistoryBuffer) -> f32 {
        self.norm * (self.a * x.at(0) + self.b * x.at(self.n) + self.c * x.at(2 * self.n))
    }
}

/// Feedback echo: y[n] = (1 - a^2) * (x[n] + a*y[n-N])
pub struct IirEcho {
    a: f32,
    norm: f32,
    n: usize,
}

impl IirEcho {
    fn new(sample_rate: u32) -> Self {
        let a = 0.7;
        Self {
            a,
            norm: 1.0 - a * a,
            n: sec_to_samples(0.3, sample_rate),
        }
    }

    fn render(&self, x: &HistoryBuffer, y: &HistoryBuffer) -> f32 {
        self.norm * (x.at(0) + self.a * y.at(self.n))
    }
}

/// Echo through a leaky integrator, closer to a real reflection:
/// y[n] = (x[n] - a*x[n-1] + a*y[n-1] + (1-a)*y[n-N]) / (1+a)
pub struct NaturalEcho {
    a: f32,
    norm: f32,
    n: usize,
}

impl NaturalEcho {
    fn new(sample_rate: u32) -> Self {
        let a = 0.7;
        Self {
            a,
            norm: 1.0 / (1.0 + a),
            n: sec_to_samples(0.3, sample_rate),
        }
    }

    fn render(&self, x: &HistoryBuffer, y: &HistoryBuffer) -> f32 {
        self.norm
            * (x.at(0) - self.a * x.at(1) + self.a * y.at(1) + (1.0 - self.a) * y.at(self.n))
    }
}

/// Short allpass-style reverberation: y[n] = -a*x[n] + x[n-N] + a*y[n-N]
pub struct Reverb {
    a: f32,
    n: usize,
}

impl Reverb {
    fn new(sample_rate: u32) -> Self {
        Self {
            a: 0.8,
            n: sec_to_samples(0.02, sample_rate),
        }
    }

    fn render(&self, x: &HistoryBuffer, y: &HistoryBuffer) -> f32 {
        -self.a * x.at(0) + x.at(self.n) + self.a * y.at(self.n)
    }
}

/// Second-order pole/zero filter discarding high frequencies:
/// y[n] = 0.5 * (x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2])
pub struct Biquad {
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    norm: f32,
}

impl Biquad {
    fn new() -> Self {
        // Pole and zero as (magnitude, phase)
        let (pm, pp) = (0.98, 0.1 * PI);
        let (zm, zp) = (0.9, 0.06 * PI);

        Self {
            b1: -2.0 * zm * zp.cos(),
            b2: zm * zm,
            a1: -2.0 * pm * pp.cos(),
            a2: pm * pm,
            norm: 0.5,
        }
    }

    fn render(&self, x: &HistoryBuffer, y: &HistoryBuffer) -> f32 {
        self.norm
            * (x.at(0) + self.b1 * x.at(1) + self.b2 * x.at(2)
                - self.a1 * y.at(1)
                - self.a2 * y.at(2))
    }
}

/// Hard clip followed by gain: y[n] = G * clamp(x[n], -limit, limit).
/// The gain is applied after the clamp with no renormalization, so the
/// output swings up to G times the threshold. That saturation character is
/// the effect.
pub struct Fuzz {
    limit: f32,
    gain: f32,
}

impl Fuzz {
    fn new() -> Self {
        Self {
            limit: 32767.0 * 0.005,
            gain: 5.0,
        }
    }

    fn render(&self, x: &HistoryBuffer) -> f32 {
        self.gain * x.at(0).clamp(-self.limit, self.limit)
    }
}

/// Swept-delay comb: y[n] = 0.5 + x[n] + x[n-d], with d swinging between 0
/// and N*FD under a 1 Hz oscillator. The delay is sampled from the phase
/// before the per-sample advance, so the sweep starts at maximum depth.
/// The constant 0.5 rides on the mix as a DC offset.
pub struct Flanger {
    min_delay: usize,
    depth: usize,
    lfo: Lfo,
}

impl Flanger {
    fn new(sample_rate: u32) -> Self {
        Self {
            min_delay: sec_to_samples(0.002, sample_rate),
            depth: 2,
            lfo: Lfo::new(1.0, sample_rate),
        }
    }

    fn render(&mut self, x: &HistoryBuffer) -> f32 {
        let sweep = (1.0 + self.lfo.radians().cos()) / 2.0;
        let d = ((self.min_delay * self.depth) as f64 * sweep) as usize;
        self.lfo.tick();
        0.5 + x.at(0) + x.at(d)
    }
}

/// Amplitude modulation: y[n] = ((1 + cos(w*n)) / 2) * x[n], 5 Hz
/// oscillator. The phase advances before it is sampled, so the very first
/// envelope value already sits one step into the cycle.
pub struct Tremolo {
    lfo: Lfo,
}

impl Tremolo {
    fn new(sample_rate: u32) -> Self {
        Self {
            lfo: Lfo::new(5.0, sample_rate),
        }
    }

    fn render(&mut self, x: &HistoryBuffer) -> f32 {
        self.lfo.tick();
        let envelope = ((1.0 + self.lfo.radians().cos()) / 2.0) as f32;
        envelope * x.at(0)
    }
}

/// The active transfer function, one variant per catalog entry, each
/// carrying its own precomputed coefficients and oscillator state.
pub enum Effect {
    Pass,
    Echo(Echo),
    IirEcho(IirEcho),
    NaturalEcho(NaturalEcho),
    Reverb(Reverb),
    Biquad(Biquad),
    Fuzz(Fuzz),
    Flanger(Flanger),
    Tremolo(Tremolo),
}

impl Effect {
    /// Builds the effect for `id` with coefficients derived from
    /// `sample_rate`. An id outside the catalog silently resolves to
    /// `Pass`; invalid selection is a permissive default, not an error.
    pub fn from_id(id: i32, sample_rate: u32) -> Self {
        match id {
            1 => Effect::Echo(Echo::new(sample_rate)),
            2 => Effect::IirEcho(IirEcho::new(sample_rate)),
            3 => Effect::NaturalEcho(NaturalEcho::new(sample_rate)),
            4 => Effect::Reverb(Reverb::new(sample_rate)),
            5 => Effect::Biquad(Biquad::new()),
            6 => Effect::Fuzz(Fuzz::new()),
            7 => Effect::Flanger(Flanger::new(sample_rate)),
            8 => Effect::Tremolo(Tremolo::new(sample_rate)),
            _ => Effect::Pass,
        }
    }

    pub fn id(&self) -> i32 {
        match self {
            Effect::Pass => 0,
            Effect::Echo(_) => 1,
            Effect::IirEcho(_) => 2,
            Effect::NaturalEcho(_) => 3,
            Effect::Reverb(_) => 4,
            Effect::Biquad(_) => 5,
            Effect::Fuzz(_) => 6,
            Effect::Flanger(_) => 7,
            Effect::Tremolo(_) => 8,
        }
    }

    pub fn name(&self) -> &'static str {
        EFFECT_CATALOG[self.id() as usize].1
    }

    /// Computes the current output sample from the two histories. Reads
    /// only already-written history; the single output write is the
    /// engine's job.
    pub fn render(&mut self, x: &HistoryBuffer, y: &HistoryBuffer) -> f32 {
        match self {
            Effect::Pass => x.at(0),
            Effect::Echo(e) => e.render(x),
            Effect::IirEcho(e) => e.render(x, y),
            Effect::NaturalEcho(e) => e.render(x, y),
            Effect::Reverb(e) => e.render(x, y),
            Effect::Biquad(e) => e.render(x, y),
            Effect::Fuzz(e) => e.render(x),
            Effect::Flanger(e) => e.render(x),
            Effect::Tremolo(e) => e.render(x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_matches_dispatch() {
        let names = [
            "Pass",
            "Echo",
            "IIR Echo",
            "Natural Echo",
            "Reverb",
            "Filter Out",
            "Fuzz",
            "Flanger",
            "Tremolo",
        ];

        for (i, &(id, name)) in EFFECT_CATALOG.iter().enumerate() {
            assert_eq!(id, i as i32);
            assert_eq!(name, names[i]);

            let effect = Effect::from_id(id, 44100);
            assert_eq!(effect.id(), id);
            assert_eq!(effect.name(), name);
        }
    }

    #[test]
    fn test_invalid_id_resolves_to_pass() {
        for bad_id in [-1, 9, 9999, i32::MIN] {
            let effect = Effect::from_id(bad_id, 44100);
            assert_eq!(effect.id(), 0, "id {} should fall back to Pass", bad_id);
        }
    }

    #[test]
    fn test_biquad_coefficients() {
        let biquad = Biquad::new();

        assert!((biquad.b1 - (-2.0 * 0.9 * (0.06 * PI).cos())).abs() < 1e-6);
        assert!((biquad.b2 - 0.81).abs() < 1e-6);
        assert!((biquad.a1 - (-2.0 * 0.98 * (0.1 * PI).cos())).abs() < 1e-6);
        assert!((biquad.a2 - 0.9604).abs() < 1e-6);
    }

    #[test]
    fn test_fuzz_clamp_boundary() {
        let fuzz = Fuzz::new();
        let limit = 32767.0 * 0.005;
        let mut x = HistoryBuffer::new(8);

        // Exactly at the threshold: gain only, no clipping
        x.write(limit);
        assert_eq!(fuzz.render(&x), 5.0 * limit);
        x.write(-limit);
        assert_eq!(fuzz.render(&x), -5.0 * limit);

        // Beyond it: clamped, not proportional
        x.write(limit * 10.0);
        assert_eq!(fuzz.render(&x), 5.0 * limit);
        x.write(-limit * 10.0);
        assert_eq!(fuzz.render(&x), -5.0 * limit);

        // Inside it: linear with the 5x gain
        x.write(10.0);
        assert_eq!(fuzz.render(&x), 50.0);
    }

    #[test]
    fn test_flanger_initial_delay_is_full_depth() {
        // At phase zero the sweep term is (1 + cos 0)/2 = 1, so the first
        // delay tap sits at N * FD
        let mut flanger = Flanger::new(44100);
        let n = sec_to_samples(0.002, 44100);
        let mut x = HistoryBuffer::new(4 * n);

        let y = flanger.render(&x);
        assert_eq!(y, 0.5); // silence in, DC offset out

        // Put an impulse exactly 2N back and it shows up in the mix
        x.write(1.0);
        x.advance();
        for _ in 0..(2 * n - 1) {
            x.write(0.0);
            x.advance();
        }
        x.write(0.0);

        let mut flanger = Flanger::new(44100);
        let y = flanger.render(&x);
        assert!(
            (y - 1.5).abs() < 1e-6,
            "impulse at full sweep depth should be mixed in, got {}",
            y
        );
    }
}
