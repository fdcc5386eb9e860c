use crate::audio::buffers::HistoryBuffer;
use crate::audio::effects::Effect;
use crate::audio::AudioProcessor;

// Both histories cover this much signal; every effect's deepest lookback
// (2 * 0.3s for the three-tap echo) fits with room to spare.
const HISTORY_SECONDS: f32 = 1.5;

/// Owns the input/output history pair and the active effect, and runs the
/// per-sample processing step.
///
/// `process` is the real-time contract the rest of the system depends on:
/// O(1) work, no heap allocation, no blocking, no I/O. Effect selection and
/// processing are not meant to be called concurrently; the audio glue
/// serializes them at block boundaries.
pub struct EffectEngine {
    input: HistoryBuffer,
    output: HistoryBuffer,
    effect: Effect,
    sample_rate: u32,
}

impl EffectEngine {
    pub fn new(sample_rate: u32) -> Self {
        let span = (HISTORY_SECONDS * sample_rate as f32) as usize;

        Self {
            input: HistoryBuffer::new(span),
            output: HistoryBuffer::new(span),
            effect: Effect::Pass,
            sample_rate,
        }
    }

    /// Runs one sample through the active effect.
    ///
    /// Writes the input at the cursor, renders the effect against the two
    /// histories, records the result in the output history, then advances
    /// both cursors together. Output sample n therefore depends only on
    /// inputs 0..=n and outputs 0..n.
    pub fn process(&mut self, sample: f32) -> f32 {
        self.input.write(sample);

        let y = self.effect.render(&self.input, &self.output);

        self.output.write(y);
        self.input.advance();
        self.output.advance();

        y
    }

    /// Switches the active effect. Ids outside the catalog fall back to
    /// Pass. Both histories and any oscillator phase are rebuilt from
    /// scratch so the new effect starts from silence instead of chewing on
    /// the previous effect's tail.
    pub fn select_effect(&mut self, id: i32) {
        self.effect = Effect::from_id(id, self.sample_rate);
        self.input.reset();
        self.output.reset();

        tracing::info!(
            id = self.effect.id(),
            name = self.effect.name(),
            "effect selected"
        );
    }

    pub fn current_effect(&self) -> i32 {
        self.effect.id()
    }

    pub fn effect_name(&self) -> &'static str {
        self.effect.name()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl AudioProcessor for EffectEngine {
    fn process(&mut self, input: f32) -> f32 {
        EffectEngine::process(self, input)
    }

    /// Rebuilds coefficients and histories for the new rate. Keeps the
    /// currently selected effect.
    fn set_sample_rate(&mut self, sample_rate: u32) {
        let id = self.effect.id();
        let span = (HISTORY_SECONDS * sample_rate as f32) as usize;

        self.sample_rate = sample_rate;
        self.input = HistoryBuffer::new(span);
        self.output = HistoryBuffer::new(span);
        self.effect = Effect::from_id(id, sample_rate);
    }
}
