use std::sync::{Arc, Mutex};

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, FromSample, Sample, SampleRate, SizedSample, StreamConfig};
use crossbeam::queue::ArrayQueue;

use crate::audio::engine::EffectEngine;
use crate::commands::{AudioCommand, AudioCommandReceiver};
use crate::config::PipeConfig;

// The engine works in raw 16-bit PCM units (the fuzz threshold is defined
// against full-scale 32767); cpal hands us normalized floats regardless of
// the device format, so the glue scales in and back out.
const PCM_SCALE: f32 = 32767.0;

/// Duplex audio glue: one capture stream, one playback stream, and a
/// bounded lock-free ring of processed mono samples between them.
///
/// All per-sample work happens inside the capture callback; the playback
/// callback only pops finished samples. Neither callback allocates or
/// blocks. An empty ring plays silence (an underrun is the hardware
/// layer's artifact, never a panic here).
pub struct AudioPipe {
    input_stream: cpal::Stream,
    output_stream: cpal::Stream,
}

impl AudioPipe {
    pub fn new(
        engine: Arc<Mutex<EffectEngine>>,
        commands: AudioCommandReceiver,
        config: &PipeConfig,
    ) -> anyhow::Result<Self> {
        let host = cpal::default_host();

        let input_device = pick_device(
            host.default_input_device(),
            host.input_devices().ok(),
            config.input_device,
        )
        .context("no input device available")?;
        let output_device = pick_device(
            host.default_output_device(),
            host.output_devices().ok(),
            config.output_device,
        )
        .context("no output device available")?;

        tracing::info!(
            input = input_device.name().as_deref().unwrap_or("<unknown>"),
            output = output_device.name().as_deref().unwrap_or("<unknown>"),
            sample_rate = config.sample_rate,
            frames_per_buffer = config.frames_per_buffer,
            "opening audio pipe"
        );

        // Enough room for several hardware blocks of slack between the two
        // callbacks; seeded half full of silence so playback does not
        // underrun before the first processed block lands.
        let ring = Arc::new(ArrayQueue::<f32>::new(
            (config.frames_per_buffer as usize * 8).max(1024),
        ));
        for _ in 0..ring.capacity() / 2 {
            let _ = ring.push(0.0);
        }

        let input_format = input_device
            .default_input_config()
            .context("no default input config")?
            .sample_format();
        let input_config = StreamConfig {
            channels: input_device
                .default_input_config()
                .map(|c| c.channels())
                .unwrap_or(1),
            sample_rate: SampleRate(config.sample_rate),
            buffer_size: BufferSize::Fixed(config.frames_per_buffer),
        };

        let output_format = output_device
            .default_output_config()
            .context("no default output config")?
            .sample_format();
        let output_config = StreamConfig {
            channels: output_device
                .default_output_config()
                .map(|c| c.channels())
                .unwrap_or(1),
            sample_rate: SampleRate(config.sample_rate),
            buffer_size: BufferSize::Fixed(config.frames_per_buffer),
        };

        let input_stream = match input_format {
            cpal::SampleFormat::F32 => Self::capture::<f32>(
                &input_device,
                &input_config,
                engine,
                commands,
                Arc::clone(&ring),
            )?,
            cpal::SampleFormat::I16 => Self::capture::<i16>(
                &input_device,
                &input_config,
                engine,
                commands,
                Arc::clone(&ring),
            )?,
            cpal::SampleFormat::U16 => Self::capture::<u16>(
                &input_device,
                &input_config,
                engine,
                commands,
                Arc::clone(&ring),
            )?,
            other => anyhow::bail!("unsupported input sample format {:?}", other),
        };

        let output_stream = match output_format {
            cpal::SampleFormat::F32 => Self::playback::<f32>(&output_device, &output_config, ring)?,
            cpal::SampleFormat::I16 => Self::playback::<i16>(&output_device, &output_config, ring)?,
            cpal::SampleFormat::U16 => Self::playback::<u16>(&output_device, &output_config, ring)?,
            other => anyhow::bail!("unsupported output sample format {:?}", other),
        };

        Ok(AudioPipe {
            input_stream,
            output_stream,
        })
    }

    /// Starts both streams. Processing runs until `stop` or drop.
    pub fn start(&self) -> anyhow::Result<()> {
        self.input_stream.play()?;
        self.output_stream.play()?;
        tracing::info!("audio pipe started");
        Ok(())
    }

    /// Pauses both streams. The pipe can be started again afterwards.
    pub fn stop(&self) -> anyhow::Result<()> {
        self.input_stream.pause()?;
        self.output_stream.pause()?;
        tracing::info!("audio pipe stopped");
        Ok(())
    }

    fn capture<T>(
        device: &cpal::Device,
        config: &StreamConfig,
        engine: Arc<Mutex<EffectEngine>>,
        commands: AudioCommandReceiver,
        ring: Arc<ArrayQueue<f32>>,
    ) -> Result<cpal::Stream, cpal::BuildStreamError>
    where
        T: SizedSample,
        f32: FromSample<T>,
    {
        let channels = config.channels as usize;

        device.build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                if let Ok(mut engine) = engine.try_lock() {
                    commands.process_commands(|command| match command {
                        AudioCommand::SelectEffect(id) => engine.select_effect(id),
                    });

                    for frame in data.chunks(channels) {
                        // Mono reduction: the effect set operates on a
                        // single stream
                        let mut mono = 0.0f32;
                        for &sample in frame {
                            mono += f32::from_sample(sample);
                        }
                        mono /= channels as f32;

                        let y = engine.process(mono * PCM_SCALE) / PCM_SCALE;

                        // A full ring means playback has fallen behind;
                        // dropping the sample is the bounded-time option
                        let _ = ring.push(y);
                    }
                } else {
                    for _ in 0..data.len() / channels {
                        let _ = ring.push(0.0);
                    }
                }
            },
            |err| tracing::error!("audio input stream error: {}", err),
            None,
        )
    }

    fn playback<T>(
        device: &cpal::Device,
        config: &StreamConfig,
        ring: Arc<ArrayQueue<f32>>,
    ) -> Result<cpal::Stream, cpal::BuildStreamError>
    where
        T: SizedSample + FromSample<f32>,
    {
        let channels = config.channels as usize;

        device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let sample = ring.pop().unwrap_or(0.0);

                    // Limiting and NaN protection at the wire; the fixed
                    // width format cannot carry more than full scale
                    let sample = if sample.is_finite() {
                        sample.clamp(-1.0, 1.0)
                    } else {
                        0.0
                    };

                    for out in frame.iter_mut() {
                        *out = T::from_sample(sample);
                    }
                }
            },
            |err| tracing::error!("audio output stream error: {}", err),
            None,
        )
    }
}

/// Resolves a configured device index against the enumeration order, with
/// the host default for negative or out-of-range indices (invalid selection
/// keeps the default rather than failing).
fn pick_device<I>(default: Option<cpal::Device>, devices: Option<I>, index: i32) -> Option<cpal::Device>
where
    I: Iterator<Item = cpal::Device>,
{
    if index < 0 {
        return default;
    }

    match devices.and_then(|mut devices| devices.nth(index as usize)) {
        Some(device) => Some(device),
        None => {
            tracing::warn!(index, "invalid device index, using host default");
            default
        }
    }
}

/// Prints every device the default host exposes, with direction and
/// default-device markers.
pub fn list_devices() -> anyhow::Result<()> {
    let host = cpal::default_host();

    let default_in = host.default_input_device().and_then(|d| d.name().ok());
    let default_out = host.default_output_device().and_then(|d| d.name().ok());

    println!("Devices:");
    for (i, device) in host.devices()?.enumerate() {
        let name = device.name().unwrap_or_else(|_| "<unknown>".to_string());

        let has_input = device
            .supported_input_configs()
            .map(|mut c| c.next().is_some())
            .unwrap_or(false);
        let has_output = device
            .supported_output_configs()
            .map(|mut c| c.next().is_some())
            .unwrap_or(false);
        let direction = match (has_input, has_output) {
            (true, false) => "input",
            (false, true) => "output",
            _ => "duplex",
        };

        let is_default = Some(&name) == default_in.as_ref() || Some(&name) == default_out.as_ref();
        if is_default {
            println!("{}: ({}) {} --default--", i, direction, name);
        } else {
            println!("{}: ({}) {}", i, direction, name);
        }
    }

    Ok(())
}

/// Prints the capabilities of the device at `index` in enumeration order.
pub fn device_info(index: usize) -> anyhow::Result<()> {
    let host = cpal::default_host();
    let device = host
        .devices()?
        .nth(index)
        .with_context(|| format!("no device at index {}", index))?;

    println!("\nDevice: ({})", index);
    println!("{}", device.name().unwrap_or_else(|_| "<unknown>".to_string()));

    if let Ok(config) = device.default_input_config() {
        println!("Input channels: {}", config.channels());
        println!("Default input rate (Hz): {}", config.sample_rate().0);
    }
    if let Ok(config) = device.default_output_config() {
        println!("Output channels: {}", config.channels());
        println!("Default output rate (Hz): {}", config.sample_rate().0);
    }

    Ok(())
}
