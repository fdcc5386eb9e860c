//! Real-time audio effects pipe.
//!
//! Captured samples run one at a time through an [`audio::engine::EffectEngine`]
//! holding a pair of circular history buffers and one of nine selectable
//! effects, then go straight back out to the playback device. The engine is
//! pure sample-in/sample-out and can be driven without any hardware; the
//! cpal glue in [`audio_io`] is the only module that touches devices.

pub mod audio;
pub mod audio_io;
pub mod commands;
pub mod config;
