/// Fixed-capacity circular store of recent samples.
///
/// The engine keeps two of these, one for input history and one for output
/// history. `pos` is the slot of the most recently written sample; looking
/// `k` samples into the past is `(pos + len - k) & mask`, so lookback never
/// goes through negative arithmetic.
pub struct HistoryBuffer {
    buffer: Vec<f32>,
    pos: usize,
    mask: usize, // Fast modulo with power-of-2 sizes
}

impl HistoryBuffer {
    /// Allocates a buffer covering at least `span_samples` of history.
    ///
    /// The backing storage is rounded up to the next power of two so
    /// wraparound is a single mask. Allocation happens here only; every
    /// other operation is O(1) and allocation-free.
    pub fn new(span_samples: usize) -> Self {
        let size = span_samples.max(1).next_power_of_two();

        Self {
            buffer: vec![0.0; size],
            pos: 0,
            mask: size - 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Stores `sample` at the current position. Does not advance; the
    /// engine advances both of its buffers together after the active
    /// effect has read everything it needs.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.pos] = sample;
    }

    /// Returns the sample written `samples_ago` steps before the current
    /// position. `at(0)` is the sample most recently written.
    ///
    /// Effects declare their lookback at construction; anything past the
    /// capacity is a programming error, not a runtime condition.
    #[inline]
    pub fn at(&self, samples_ago: usize) -> f32 {
        debug_assert!(
            samples_ago <= self.buffer.len(),
            "Lookback must be less than or equal to buffer size"
        );
        self.buffer[(self.pos + self.buffer.len() - samples_ago) & self.mask]
    }

    /// Moves the cursor to the next slot, wrapping at capacity.
    #[inline]
    pub fn advance(&mut self) {
        self.pos = (self.pos + 1) & self.mask;
    }

    /// Zero-fills the history and returns the cursor to the start. Called
    /// on every effect switch so stale history never bleeds into the new
    /// effect.
    pub fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_buffer_lookback() {
        let mut buffer = HistoryBuffer::new(64);

        // Zero-initialized: every lookback starts silent
        assert_eq!(buffer.at(0), 0.0);
        assert_eq!(buffer.at(63), 0.0);

        buffer.write(1.0);
        assert_eq!(buffer.at(0), 1.0);
        buffer.advance();

        for _ in 0..9 {
            buffer.write(0.0);
            buffer.advance();
        }
        buffer.write(0.5);

        assert_eq!(buffer.at(0), 0.5);
        let delayed = buffer.at(10);
        assert!(
            (delayed - 1.0).abs() < 1e-6,
            "Expected 1.0 ten samples back, got {}",
            delayed
        );
    }

    #[test]
    fn test_history_buffer_wraparound() {
        let mut buffer = HistoryBuffer::new(16);
        let capacity = buffer.capacity();

        // Run well past capacity so the cursor wraps several times
        for i in 0..(capacity * 3) {
            buffer.write(i as f32);
            buffer.advance();
        }

        // A full-capacity lookback wraps cleanly back onto the cursor slot
        assert_eq!(buffer.at(capacity), buffer.at(0));

        // Every in-window lookback lands on the value written that many
        // steps ago (at(k) is relative to the last written slot, one behind
        // the cursor after the final advance)
        for k in 1..=capacity {
            let expected = (capacity * 3 - k) as f32;
            assert_eq!(buffer.at(k), expected, "lookback {} mismatched", k);
        }
    }

    #[test]
    fn test_history_buffer_reset() {
        let mut buffer = HistoryBuffer::new(32);

        for i in 0..20 {
            buffer.write(i as f32 * 0.1);
            buffer.advance();
        }
        buffer.reset();

        for k in 0..buffer.capacity() {
            assert_eq!(buffer.at(k), 0.0, "slot {} not cleared by reset", k);
        }
    }

    #[test]
    fn test_capacity_rounds_up_to_power_of_two() {
        let buffer = HistoryBuffer::new(66150); // 1.5s @ 44.1kHz
        assert_eq!(buffer.capacity(), 131072);
        assert!(buffer.capacity() >= 66150);
    }
}
