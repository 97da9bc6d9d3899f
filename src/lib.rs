//! # uttercut
//!
//! Streaming utterance segmentation for live mono PCM audio.
//!
//! ## Architecture
//!
//! ```text
//! capture source → Fanout ─┬─► UtteranceSegmenter ─► downstream SampleProcessor
//!                          │         (chunk per utterance)
//!                          └─► SilenceDetector (enter/exit notifications)
//! ```
//!
//! The engine decides, sample by sample and without ever seeing the whole
//! recording, where to cut a continuous stream into utterance chunks:
//! leading silence is discarded, a chunk is closed once enough trailing
//! silence is observed, and a chunk that reaches the desired duration with
//! no silence gap is force-cut at the locally quietest point.
//!
//! All components are synchronous and perform no internal locking; the
//! caller serializes `consume` calls (single producer, in-order spans).
//! Slow downstream work belongs behind [`ChunkSender`], never inside a
//! processor's `consume`.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod error;
pub mod loudness;
pub mod processor;
pub mod segmenter;
pub mod silence;

// Convenience re-exports for downstream crates
pub use error::{Result, UttercutError};
pub use processor::channel::{Chunk, ChunkSender};
pub use processor::fanout::Fanout;
pub use processor::wav::WavFileSink;
pub use processor::{SampleProcessor, StreamFormat};
pub use segmenter::{SegmenterConfig, UtteranceSegmenter};
pub use silence::{SilenceConfig, SilenceDetector, SilenceTransition};
