//! Voice-activity hysteresis detector.
//!
//! A non-buffering [`SampleProcessor`] that classifies each incoming span
//! by loudness and reports *transitions* between silence and voice, with
//! hysteresis: voice is left only after `min_silence` of uninterrupted
//! quiet, so short pauses between words do not flap the signal.
//!
//! Transitions are returned as a [`SilenceTransition`] from [`SilenceDetector::update`]
//! and additionally delivered to optional registered hooks; either way a
//! transition fires at most once per state change.
//!
//! The silence clock is logical, derived from the number of consumed
//! samples at the configured rate. Wall-clock timing would only agree with
//! it when audio arrives at real-time pace; sample-derived time stays
//! correct (and deterministic under test) regardless of delivery cadence.

use std::time::Duration;

use tracing::debug;

use crate::error::{Result, UttercutError};
use crate::loudness::block_db;
use crate::processor::{SampleProcessor, StreamFormat};

/// Outcome of feeding one span to the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SilenceTransition {
    /// State unchanged.
    None,
    /// The stream just crossed into silence.
    EnteredSilence,
    /// Voice resumed after a silent stretch.
    ExitedSilence,
}

/// Tuning parameters for [`SilenceDetector`].
#[derive(Debug, Clone)]
pub struct SilenceConfig {
    /// Spans below this loudness count as silent. Default: 35 dB.
    pub threshold_db: f32,
    /// Quiet time required before the silent state is entered.
    /// Default: 600 ms.
    pub min_silence: Duration,
}

impl Default for SilenceConfig {
    fn default() -> Self {
        Self {
            threshold_db: 35.0,
            min_silence: Duration::from_millis(600),
        }
    }
}

type Hook = Box<dyn FnMut() + Send>;

/// Hysteresis silence/voice signal over a single stream. No buffering; each
/// span is classified as a whole and forgotten.
pub struct SilenceDetector {
    config: SilenceConfig,
    is_silent: bool,
    /// Total samples consumed — the logical clock.
    samples_seen: u64,
    /// Clock position of the most recent loud span (stream origin until
    /// the first one).
    last_loud_at: u64,
    /// Set at configure: `min_silence` expressed in samples.
    min_silence_samples: Option<u64>,
    on_enter: Option<Hook>,
    on_exit: Option<Hook>,
}

impl SilenceDetector {
    pub fn new(config: SilenceConfig) -> Self {
        Self {
            config,
            is_silent: false,
            samples_seen: 0,
            last_loud_at: 0,
            min_silence_samples: None,
            on_enter: None,
            on_exit: None,
        }
    }

    /// Register a hook invoked once per silence entry.
    pub fn on_silence_enter(&mut self, hook: impl FnMut() + Send + 'static) {
        self.on_enter = Some(Box::new(hook));
    }

    /// Register a hook invoked once per silence exit.
    pub fn on_silence_exit(&mut self, hook: impl FnMut() + Send + 'static) {
        self.on_exit = Some(Box::new(hook));
    }

    /// Current state (false until the first silence entry).
    pub fn is_silent(&self) -> bool {
        self.is_silent
    }

    /// Classify one span and report any state transition. Requires a prior
    /// `configure`.
    pub fn update(&mut self, samples: &[f32]) -> Result<SilenceTransition> {
        let min_silence_samples = self.min_silence_samples.ok_or_else(|| {
            UttercutError::InvariantViolation("silence detector used before configure()".into())
        })?;

        self.samples_seen += samples.len() as u64;
        let db = block_db(samples);

        let transition = if db < self.config.threshold_db {
            let quiet_for = self.samples_seen - self.last_loud_at;
            if !self.is_silent && quiet_for >= min_silence_samples {
                self.is_silent = true;
                debug!(db, "entered silence");
                if let Some(hook) = self.on_enter.as_mut() {
                    hook();
                }
                SilenceTransition::EnteredSilence
            } else {
                SilenceTransition::None
            }
        } else {
            let was_silent = self.is_silent;
            self.is_silent = false;
            self.last_loud_at = self.samples_seen;
            if was_silent {
                debug!(db, "exited silence");
                if let Some(hook) = self.on_exit.as_mut() {
                    hook();
                }
                SilenceTransition::ExitedSilence
            } else {
                SilenceTransition::None
            }
        };

        Ok(transition)
    }
}

impl SampleProcessor for SilenceDetector {
    fn configure(&mut self, format: StreamFormat) -> Result<()> {
        if format.channels != 1 {
            return Err(UttercutError::UnsupportedChannelCount(format.channels));
        }
        self.min_silence_samples = Some(format.sample_count(self.config.min_silence) as u64);
        self.is_silent = false;
        self.samples_seen = 0;
        self.last_loud_at = 0;
        Ok(())
    }

    fn consume(&mut self, samples: &[f32]) -> Result<()> {
        self.update(samples).map(|_| ())
    }

    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }
}
