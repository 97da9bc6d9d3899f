//! The `SampleProcessor` contract — the capability every consumer of raw
//! audio spans implements.
//!
//! ## Call protocol
//!
//! Per stream lifetime, in strict order:
//!
//! 1. `configure(format)` — exactly once, before any data.
//! 2. `consume(samples)` — zero or more times, with non-overlapping,
//!    time-ordered spans (any length, including empty).
//! 3. `finalize()` — exactly once; retained state is flushed or dropped.
//!
//! The engine is single-producer and synchronous: no processor in this
//! crate locks internally, and no two calls may run concurrently against
//! the same instance.

pub mod channel;
pub mod fanout;
pub mod wav;

use std::time::Duration;

use crate::error::Result;

/// Immutable description of a sample stream, established once per stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    /// Sample rate in Hz (e.g. 16000, 44100, 48000).
    pub sample_rate: u32,
    /// Interleaved channel count. The engine components accept only 1.
    pub channels: u16,
}

impl StreamFormat {
    /// A single-channel format at the given rate.
    pub fn mono(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: 1,
        }
    }

    /// Number of samples (per channel) covering `duration` at this rate.
    pub fn sample_count(&self, duration: Duration) -> usize {
        (duration.as_millis() * u128::from(self.sample_rate) / 1000) as usize
    }
}

/// Polymorphic consumer of raw audio spans.
///
/// Implementors may be stateful (buffers, silence clocks, open files).
/// Errors propagate synchronously through `?`; an implementation that does
/// its real work asynchronously must accept the span promptly and report
/// failures on its own channel instead.
pub trait SampleProcessor: Send {
    /// Accept the stream format. Must be called exactly once, first.
    ///
    /// # Errors
    /// `UttercutError::UnsupportedChannelCount` if the format declares more
    /// than one channel (engine components are mono-only).
    fn configure(&mut self, format: StreamFormat) -> Result<()>;

    /// Accept the next span of samples, amplitude domain [-1.0, 1.0].
    fn consume(&mut self, samples: &[f32]) -> Result<()>;

    /// End of stream. Flush or drop any retained state.
    fn finalize(&mut self) -> Result<()>;
}

impl<P: SampleProcessor + ?Sized> SampleProcessor for Box<P> {
    fn configure(&mut self, format: StreamFormat) -> Result<()> {
        (**self).configure(format)
    }

    fn consume(&mut self, samples: &[f32]) -> Result<()> {
        (**self).consume(samples)
    }

    fn finalize(&mut self) -> Result<()> {
        (**self).finalize()
    }
}
