pub mod buffers;
pub mod effects;
pub mod engine;
pub mod oscillators;

pub const PI: f32 = std::f32::consts::PI;

/// Converts a time span to a whole number of samples at the given rate.
/// Delay taps are never shorter than one sample.
pub fn sec_to_samples(seconds: f32, sample_rate: u32) -> usize {
    ((seconds * sample_rate as f32).round() as usize).max(1)
}

/// Basic trait for processors that map one input sample to one output sample
pub trait AudioProcessor {
    fn process(&mut self, input: f32) -> f32;
    fn set_sample_rate(&mut self, sample_rate: u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sec_to_samples() {
        assert_eq!(sec_to_samples(0.3, 44100), 13230);
        assert_eq!(sec_to_samples(0.02, 44100), 882);
        assert_eq!(sec_to_samples(0.002, 44100), 88);
        assert_eq!(sec_to_samples(0.3, 1000), 300);

        // Never collapses to a zero-length tap
        assert_eq!(sec_to_samples(0.00001, 8000), 1);
    }
}
