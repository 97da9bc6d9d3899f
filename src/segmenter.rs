//! Adaptive chunking segmenter — the core state machine.
//!
//! ## Algorithm
//!
//! ```text
//! AwaitingSpeech ── first loud block in span ──► Accumulating
//!       ▲                                            │
//!       │   trailing-silence cut (flush everything)  │
//!       ├────────────────────────────────────────────┤
//!       │   forced cut at quietest point             │
//!       └────────────────────────────────────────────┘
//! ```
//!
//! While `AwaitingSpeech`, incoming spans are scanned block by block and
//! everything before the first loud block is discarded — a chunk never
//! starts with silence. While `Accumulating`, spans are appended to a
//! pending buffer and a loudness value is computed per completed block.
//! A chunk is closed either when the newest `min_silence_blocks` blocks are
//! all quiet (flush everything, trailing silence included), or when the
//! buffer reaches `desired_chunk_blocks` (flush up to the block whose
//! 3-point loudness average is lowest, so the forced cut lands between
//! words rather than inside one).
//!
//! The whole component is synchronous and allocation happens only on buffer
//! growth, which is clamped: exceeding four times the desired chunk size is
//! an [`UttercutError::InvariantViolation`], not unbounded memory use.

use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, UttercutError};
use crate::loudness::block_db;
use crate::processor::{SampleProcessor, StreamFormat};

/// Tuning parameters for [`UtteranceSegmenter`]. Set once, before
/// `configure`.
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Analysis block size. Default: 100 ms.
    pub resolution: Duration,
    /// Blocks below this loudness count as silent. Default: 30 dB.
    pub silence_threshold_db: f32,
    /// How much trailing silence closes a chunk. Default: 600 ms.
    pub min_silence: Duration,
    /// A chunk is never cut shorter than this. Default: 2 s.
    pub min_chunk: Duration,
    /// Reaching this duration forces a cut. Default: 6 s.
    pub desired_chunk: Duration,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            resolution: Duration::from_millis(100),
            silence_threshold_db: 30.0,
            min_silence: Duration::from_millis(600),
            min_chunk: Duration::from_secs(2),
            desired_chunk: Duration::from_secs(6),
        }
    }
}

/// Block quantities derived from the config at `configure` time.
#[derive(Debug, Clone, Copy)]
struct Derived {
    samples_per_block: usize,
    min_silence_blocks: usize,
    min_chunk_blocks: usize,
    desired_chunk_blocks: usize,
    /// Hard cap on buffered samples (desired chunk plus slack).
    max_buffered_samples: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No committed audio; leading silence is being discarded.
    AwaitingSpeech,
    /// Buffering toward a cut decision.
    Accumulating,
}

/// Stateful, buffering segmenter that forwards one block-aligned chunk per
/// utterance to its downstream processor.
///
/// `finalize` does not flush a partial trailing chunk — tail audio that
/// never met a cut condition is dropped with the stream. This is the
/// intended boundary behavior, not a leak.
pub struct UtteranceSegmenter<P: SampleProcessor> {
    config: SegmenterConfig,
    downstream: P,
    state: State,
    /// Not-yet-dispatched samples; evicted from the front on each flush.
    pending: Vec<f32>,
    /// Loudness per completed block within `pending`. Invariant:
    /// `block_db.len() == pending.len() / samples_per_block` (integer div).
    block_db: Vec<f32>,
    derived: Option<Derived>,
}

impl<P: SampleProcessor> UtteranceSegmenter<P> {
    pub fn new(downstream: P, config: SegmenterConfig) -> Self {
        Self {
            config,
            downstream,
            state: State::AwaitingSpeech,
            pending: Vec::new(),
            block_db: Vec::new(),
            derived: None,
        }
    }

    /// Consume the segmenter and hand back its downstream processor.
    pub fn into_inner(self) -> P {
        self.downstream
    }

    /// Number of fully analysed blocks currently buffered.
    pub fn buffered_blocks(&self) -> usize {
        self.block_db.len()
    }

    /// Skip past leading silent blocks in an uncommitted span. Returns the
    /// suffix starting at the first loud block, or an empty slice if every
    /// block (including a short trailing one) is quiet.
    fn trim_leading_silence<'a>(&self, d: &Derived, samples: &'a [f32]) -> &'a [f32] {
        let mut offset = 0;
        while offset < samples.len() {
            let end = (offset + d.samples_per_block).min(samples.len());
            if block_db(&samples[offset..end]) >= self.config.silence_threshold_db {
                return &samples[offset..];
            }
            offset += d.samples_per_block;
        }
        &[]
    }

    /// True when the newest `min_silence_blocks` blocks are all quiet.
    fn tail_is_silent(&self, d: &Derived) -> bool {
        let blocks = self.block_db.len();
        if blocks <= d.min_silence_blocks {
            return false;
        }
        self.block_db[blocks - d.min_silence_blocks..]
            .iter()
            .all(|&db| db < self.config.silence_threshold_db)
    }

    /// Pick the forced-cut point: the index `i` in
    /// `[min_chunk_blocks, blocks)` minimizing the 3-point moving average
    /// of loudness, with the silence threshold standing in for neighbours
    /// outside the analysed range. The backward scan with a strict `<`
    /// makes the earliest index win among equal minima.
    fn quietest_cut(&self, d: &Derived) -> usize {
        let blocks = self.block_db.len();
        let threshold = self.config.silence_threshold_db;

        let mut best = blocks;
        let mut best_avg = f32::INFINITY;
        for i in (d.min_chunk_blocks..blocks).rev() {
            let prev = if i > 0 { self.block_db[i - 1] } else { threshold };
            let next = if i + 1 < blocks {
                self.block_db[i + 1]
            } else {
                threshold
            };
            let avg = (prev + self.block_db[i] + next) / 3.0;
            if avg < best_avg {
                best_avg = avg;
                best = i;
            }
        }
        best
    }

    /// Forward the first `blocks` blocks downstream and evict them.
    fn flush(&mut self, d: &Derived, blocks: usize) -> Result<()> {
        let sample_count = blocks * d.samples_per_block;
        if sample_count > self.pending.len() {
            return Err(UttercutError::InvariantViolation(format!(
                "flushing {sample_count} samples but only {} are buffered",
                self.pending.len()
            )));
        }

        debug!(blocks, samples = sample_count, "forwarding chunk");
        self.downstream.consume(&self.pending[..sample_count])?;

        self.pending.drain(..sample_count);
        self.block_db.drain(..blocks);
        self.state = State::AwaitingSpeech;
        Ok(())
    }

    fn derived(&self) -> Result<Derived> {
        self.derived.ok_or_else(|| {
            UttercutError::InvariantViolation("segmenter used before configure()".into())
        })
    }
}

impl<P: SampleProcessor> SampleProcessor for UtteranceSegmenter<P> {
    fn configure(&mut self, format: StreamFormat) -> Result<()> {
        if format.channels != 1 {
            return Err(UttercutError::UnsupportedChannelCount(format.channels));
        }

        let samples_per_block = format.sample_count(self.config.resolution);
        if samples_per_block == 0 {
            return Err(UttercutError::Configuration(format!(
                "resolution {:?} yields an empty analysis block at {} Hz",
                self.config.resolution, format.sample_rate
            )));
        }

        // Same rounding rule for every duration-derived block count.
        let blocks_for = |duration: Duration| -> usize {
            (format.sample_count(duration) as f64 / samples_per_block as f64 + 0.5) as usize
        };

        let min_silence_blocks = blocks_for(self.config.min_silence);
        let min_chunk_blocks = blocks_for(self.config.min_chunk);
        let desired_chunk_blocks = blocks_for(self.config.desired_chunk);

        let derived = Derived {
            samples_per_block,
            min_silence_blocks,
            min_chunk_blocks,
            desired_chunk_blocks,
            max_buffered_samples: desired_chunk_blocks.max(1) * samples_per_block * 4,
        };
        info!(
            samples_per_block,
            min_silence_blocks, min_chunk_blocks, desired_chunk_blocks, "segmenter configured"
        );

        self.pending = Vec::with_capacity(desired_chunk_blocks * samples_per_block * 2);
        self.block_db = Vec::with_capacity(desired_chunk_blocks * 5);
        self.state = State::AwaitingSpeech;
        self.derived = Some(derived);

        self.downstream.configure(format)
    }

    fn consume(&mut self, samples: &[f32]) -> Result<()> {
        let d = self.derived()?;

        let mut samples = samples;
        if self.state == State::AwaitingSpeech {
            samples = self.trim_leading_silence(&d, samples);
            if samples.is_empty() {
                return Ok(());
            }
            self.state = State::Accumulating;
        }

        if self.pending.len() + samples.len() > d.max_buffered_samples {
            return Err(UttercutError::InvariantViolation(format!(
                "pending buffer would grow to {} samples (cap {})",
                self.pending.len() + samples.len(),
                d.max_buffered_samples
            )));
        }
        self.pending.extend_from_slice(samples);

        while (self.block_db.len() + 1) * d.samples_per_block <= self.pending.len() {
            let start = self.block_db.len() * d.samples_per_block;
            self.block_db
                .push(block_db(&self.pending[start..start + d.samples_per_block]));
        }

        // A single span may complete several chunks; keep cutting until no
        // condition fires so the buffer never ends a call above the desired
        // chunk size.
        loop {
            let blocks = self.block_db.len();
            if blocks > d.min_chunk_blocks && self.tail_is_silent(&d) {
                debug!(blocks, "trailing-silence cut");
                self.flush(&d, blocks)?;
            } else if blocks >= d.desired_chunk_blocks {
                let cut = self.quietest_cut(&d);
                if cut == 0 {
                    break;
                }
                debug!(blocks, cut, "forced cut at quietest point");
                self.flush(&d, cut)?;
            } else {
                break;
            }
        }

        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        // Any unflushed tail is dropped with the stream, by contract.
        self.downstream.finalize()
    }
}
