//! Fan-out dispatcher: one stream, N independent consumers.

use tracing::debug;

use crate::error::Result;
use crate::processor::{SampleProcessor, StreamFormat};

/// Broadcasts every `configure`/`consume`/`finalize` call to an ordered
/// list of processors.
///
/// Calls are made in list order and the first error propagates, leaving
/// later processors un-invoked for that call. There is no isolation
/// between members — a consumer that must not take the others down has to
/// catch its own failures.
pub struct Fanout {
    processors: Vec<Box<dyn SampleProcessor>>,
}

impl Fanout {
    pub fn new(processors: Vec<Box<dyn SampleProcessor>>) -> Self {
        Self { processors }
    }

    /// Append another consumer. Only meaningful before `configure`.
    pub fn push(&mut self, processor: Box<dyn SampleProcessor>) {
        self.processors.push(processor);
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

impl SampleProcessor for Fanout {
    fn configure(&mut self, format: StreamFormat) -> Result<()> {
        debug!(consumers = self.processors.len(), "configuring fan-out");
        for processor in &mut self.processors {
            processor.configure(format)?;
        }
        Ok(())
    }

    fn consume(&mut self, samples: &[f32]) -> Result<()> {
        for processor in &mut self.processors {
            processor.consume(samples)?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        for processor in &mut self.processors {
            processor.finalize()?;
        }
        Ok(())
    }
}
