use crossbeam::queue::SegQueue;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub enum AudioCommand {
    /// Switch the active effect. Out-of-catalog ids resolve to Pass inside
    /// the engine; the queue does not validate.
    SelectEffect(i32),
}

/// Lock-free command queue for control -> audio communication.
/// Uses a multiple-producer, single-consumer queue from crossbeam.
pub struct AudioCommandQueue {
    queue: Arc<SegQueue<AudioCommand>>,
}

impl AudioCommandQueue {
    pub fn new() -> Self {
        Self {
            queue: Arc::new(SegQueue::new()),
        }
    }

    /// Get a handle for sending commands (for the console thread)
    pub fn sender(&self) -> AudioCommandSender {
        AudioCommandSender {
            queue: Arc::clone(&self.queue),
        }
    }

    /// Get a handle for receiving commands (for the audio thread)
    pub fn receiver(&self) -> AudioCommandReceiver {
        AudioCommandReceiver {
            queue: Arc::clone(&self.queue),
        }
    }
}

/// Sender handle for the console thread
#[derive(Clone)]
pub struct AudioCommandSender {
    queue: Arc<SegQueue<AudioCommand>>,
}

impl AudioCommandSender {
    /// Send a command to the audio thread (non-blocking)
    pub fn send(&self, command: AudioCommand) {
        self.queue.push(command);
    }
}

/// Receiver handle for the audio thread
pub struct AudioCommandReceiver {
    queue: Arc<SegQueue<AudioCommand>>,
}

impl AudioCommandReceiver {
    /// Process pending commands at the start of an audio block.
    /// Capped per block so command bursts cannot eat the frame budget.
    pub fn process_commands<F>(&self, mut apply_command: F)
    where
        F: FnMut(AudioCommand),
    {
        for _ in 0..64 {
            if let Some(command) = self.queue.pop() {
                apply_command(command);
            } else {
                break;
            }
        }
    }

    /// Check if there are pending commands
    pub fn has_commands(&self) -> bool {
        !self.queue.is_empty()
    }
}

impl Default for AudioCommandQueue {
    fn default() -> Self {
        Self::new()
    }
}
