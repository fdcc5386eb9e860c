use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use fxpipe::audio::effects::EFFECT_CATALOG;
use fxpipe::audio::engine::EffectEngine;
use fxpipe::audio_io::{self, AudioPipe};
use fxpipe::commands::{AudioCommand, AudioCommandQueue};
use fxpipe::config::PipeConfig;

fn print_menu() {
    println!("-----------------------------");
    println!("Simple Audio Effects:");
    println!("-----------------------------");

    let options = EFFECT_CATALOG
        .iter()
        .map(|(id, name)| format!("{}:{}", id, name))
        .collect::<Vec<_>>()
        .join(", ");
    println!("{}", options);
    println!("Enter a number to switch effects, q to quit");
}

/// Anything that does not parse as a number falls back to Pass, the same
/// permissive default the engine applies to out-of-range ids.
fn parse_selection(line: &str) -> i32 {
    line.trim().parse().unwrap_or(0)
}

/// The catalog entry the engine will report after applying `id` (invalid
/// ids resolve to Pass).
fn resolved_entry(id: i32) -> (i32, &'static str) {
    if id >= 0 {
        if let Some(&entry) = EFFECT_CATALOG.get(id as usize) {
            return entry;
        }
    }
    EFFECT_CATALOG[0]
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = PipeConfig::load(Path::new("fxpipe.json"))?;

    audio_io::list_devices()?;
    if config.input_device >= 0 {
        audio_io::device_info(config.input_device as usize)?;
    }
    if config.output_device >= 0 {
        audio_io::device_info(config.output_device as usize)?;
    }

    print_menu();

    print!("\nSelect an effect: ");
    io::stdout().flush()?;

    let stdin = io::stdin();
    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    let selection = parse_selection(&line);

    let engine = Arc::new(Mutex::new(EffectEngine::new(config.sample_rate)));
    {
        let mut engine = engine.lock().expect("engine lock poisoned");
        engine.select_effect(selection);
        println!("{}: {}", engine.current_effect(), engine.effect_name());
    }

    let commands = AudioCommandQueue::new();
    let pipe = AudioPipe::new(Arc::clone(&engine), commands.receiver(), &config)?;
    pipe.start()?;

    // Live re-selection: the console thread only pushes onto the lock-free
    // queue; the audio callback applies it at the next block boundary.
    let sender = commands.sender();
    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("q") {
            break;
        }

        let id = parse_selection(trimmed);
        sender.send(AudioCommand::SelectEffect(id));

        let (resolved_id, name) = resolved_entry(id);
        println!("{}: {}", resolved_id, name);
    }

    pipe.stop()?;
    Ok(())
}
