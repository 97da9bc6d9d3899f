//! WAV file sink.
//!
//! Writes incoming spans as 16-bit PCM via `hound`. Two modes:
//!
//! - **Continuous**: one file for the whole stream, closed at `finalize`.
//! - **Per chunk**: one numbered file per `consume` call (`out.1.wav`,
//!   `out.2.wav`, …). Placed downstream of the segmenter this captures one
//!   WAV per utterance, which is the handiest way to audit cut decisions
//!   by ear.

use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::debug;

use crate::error::{Result, UttercutError};
use crate::processor::{SampleProcessor, StreamFormat};

type FileWriter = WavWriter<std::io::BufWriter<std::fs::File>>;

/// A [`SampleProcessor`] that persists the stream as WAV.
///
/// Failures (disk full, unwritable path) propagate synchronously from the
/// call that hit them.
pub struct WavFileSink {
    path: PathBuf,
    per_chunk: bool,
    /// 1-based suffix for per-chunk files.
    counter: u32,
    spec: Option<WavSpec>,
    writer: Option<FileWriter>,
}

impl WavFileSink {
    /// Write the whole stream into one file at `path`.
    pub fn create(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            per_chunk: false,
            counter: 1,
            spec: None,
            writer: None,
        }
    }

    /// Write each consumed span to its own numbered file, derived from
    /// `path` by inserting a counter before the extension.
    pub fn per_chunk(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            per_chunk: true,
            counter: 1,
            spec: None,
            writer: None,
        }
    }

    fn numbered_path(&self, n: u32) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = self
            .path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "wav".into());
        self.path
            .with_file_name(format!("{stem}.{n}.{ext}"))
    }

    fn spec(&self) -> Result<WavSpec> {
        self.spec.ok_or_else(|| {
            UttercutError::InvariantViolation("wav sink used before configure()".into())
        })
    }

    fn write_all(writer: &mut FileWriter, samples: &[f32]) -> Result<()> {
        for &sample in samples {
            let value = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
            writer.write_sample(value)?;
        }
        Ok(())
    }

    fn open(path: &Path, spec: WavSpec) -> Result<FileWriter> {
        debug!(?path, "opening wav file");
        Ok(WavWriter::create(path, spec)?)
    }
}

impl SampleProcessor for WavFileSink {
    fn configure(&mut self, format: StreamFormat) -> Result<()> {
        if format.channels != 1 {
            return Err(UttercutError::UnsupportedChannelCount(format.channels));
        }
        let spec = WavSpec {
            channels: format.channels,
            sample_rate: format.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        self.spec = Some(spec);
        self.counter = 1;

        if !self.per_chunk {
            self.writer = Some(Self::open(&self.path, spec)?);
        }
        Ok(())
    }

    fn consume(&mut self, samples: &[f32]) -> Result<()> {
        if self.per_chunk {
            let path = self.numbered_path(self.counter);
            self.counter += 1;
            let mut writer = Self::open(&path, self.spec()?)?;
            Self::write_all(&mut writer, samples)?;
            writer.finalize()?;
        } else {
            let writer = self.writer.as_mut().ok_or_else(|| {
                UttercutError::InvariantViolation("wav sink used before configure()".into())
            })?;
            Self::write_all(writer, samples)?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.take() {
            writer.finalize()?;
        }
        Ok(())
    }
}
