//! Chunk hand-off over a channel.
//!
//! The segmenter's `consume` must return promptly; anything slow on the
//! receiving end (transcription, network) belongs on its own thread.
//! [`ChunkSender`] is the decoupling point: each forwarded span is cloned
//! into an owned [`Chunk`] and sent over a `crossbeam-channel`, and
//! `finalize` drops the sender so the receiver observes end-of-stream as a
//! normal channel disconnect.

use crossbeam_channel::Sender;
use tracing::debug;

use crate::error::{Result, UttercutError};
use crate::processor::{SampleProcessor, StreamFormat};

/// An owned, self-describing span of mono samples.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Mono f32 samples in [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl Chunk {
    /// Duration of this chunk in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

/// A [`SampleProcessor`] that forwards every span over a channel.
///
/// Errors are synchronous: a disconnected receiver fails the `consume`
/// that hits it (`UttercutError::ChannelClosed`).
pub struct ChunkSender {
    tx: Option<Sender<Chunk>>,
    sample_rate: u32,
}

impl ChunkSender {
    /// Wrap an unbounded (or suitably deep bounded) sender. A shallow
    /// bounded channel would block `consume` and stall the producer.
    pub fn new(tx: Sender<Chunk>) -> Self {
        Self {
            tx: Some(tx),
            sample_rate: 0,
        }
    }

    fn sender(&self) -> Result<&Sender<Chunk>> {
        self.tx.as_ref().ok_or_else(|| {
            UttercutError::InvariantViolation("chunk sender used after finalize()".into())
        })
    }
}

impl SampleProcessor for ChunkSender {
    fn configure(&mut self, format: StreamFormat) -> Result<()> {
        if format.channels != 1 {
            return Err(UttercutError::UnsupportedChannelCount(format.channels));
        }
        self.sample_rate = format.sample_rate;
        Ok(())
    }

    fn consume(&mut self, samples: &[f32]) -> Result<()> {
        let chunk = Chunk {
            samples: samples.to_vec(),
            sample_rate: self.sample_rate,
        };
        self.sender()?
            .send(chunk)
            .map_err(|_| UttercutError::ChannelClosed)
    }

    fn finalize(&mut self) -> Result<()> {
        debug!("chunk sender closing channel");
        self.tx = None;
        Ok(())
    }
}
