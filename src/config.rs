use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

/// Runtime configuration for the audio pipe.
///
/// Loaded once at startup from `fxpipe.json` when the file exists, defaults
/// otherwise. Device indices refer to the enumeration order printed by the
/// device listing; a negative index means the host default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipeConfig {
    pub sample_rate: u32,
    pub frames_per_buffer: u32,
    pub input_device: i32,
    pub output_device: i32,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            frames_per_buffer: 4,
            input_device: -1,
            output_device: -1,
        }
    }
}

impl PipeConfig {
    /// Reads the config file at `path`, falling back to defaults when the
    /// file is absent. A present-but-malformed file is an error; silently
    /// ignoring it would mask typos.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        anyhow::ensure!(config.sample_rate > 0, "sample_rate must be positive");
        anyhow::ensure!(
            config.frames_per_buffer > 0,
            "frames_per_buffer must be positive"
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipeConfig::default();
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.frames_per_buffer, 4);
        assert_eq!(config.input_device, -1);
        assert_eq!(config.output_device, -1);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: PipeConfig = serde_json::from_str(r#"{"sample_rate": 48000}"#).unwrap();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.frames_per_buffer, 4);
    }

    #[test]
    fn test_missing_file_is_defaults() {
        let config = PipeConfig::load(Path::new("/nonexistent/fxpipe.json")).unwrap();
        assert_eq!(config.sample_rate, 44100);
    }
}
