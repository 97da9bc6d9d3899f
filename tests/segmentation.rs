//! End-to-end segmentation scenarios at 16 kHz / 100 ms resolution.
//!
//! Derived parameters with the default config: 1600 samples per block,
//! min_silence = 6 blocks, min_chunk = 20 blocks, desired_chunk = 60 blocks.

use std::sync::Arc;

use crossbeam_channel::unbounded;
use parking_lot::Mutex;
use uttercut::{
    Chunk, ChunkSender, Fanout, Result, SampleProcessor, SegmenterConfig, SilenceConfig,
    SilenceDetector, StreamFormat, UtteranceSegmenter,
};

const SPB: usize = 1600;

#[derive(Clone, Default)]
struct CollectingSink {
    chunks: Arc<Mutex<Vec<Vec<f32>>>>,
}

impl SampleProcessor for CollectingSink {
    fn configure(&mut self, _format: StreamFormat) -> Result<()> {
        Ok(())
    }

    fn consume(&mut self, samples: &[f32]) -> Result<()> {
        self.chunks.lock().push(samples.to_vec());
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        Ok(())
    }
}

fn feed_blocks(seg: &mut impl SampleProcessor, amplitude: f32, blocks: usize) {
    let block = vec![amplitude; SPB];
    for _ in 0..blocks {
        seg.consume(&block).unwrap();
    }
}

#[test]
fn long_silence_then_speech_then_forced_cut() {
    let sink = CollectingSink::default();
    let mut seg = UtteranceSegmenter::new(sink.clone(), SegmenterConfig::default());
    seg.configure(StreamFormat::mono(16_000)).unwrap();

    // Phase 1: 8000 blocks of pure silence — nothing forwarded, nothing buffered.
    feed_blocks(&mut seg, 0.0, 8000);
    assert!(sink.chunks.lock().is_empty());
    assert_eq!(seg.buffered_blocks(), 0);

    // Phase 2: 25 loud blocks then 6 silent ones — exactly one chunk of
    // 31 blocks (trailing silence included) and the buffer drains.
    feed_blocks(&mut seg, 0.5, 25);
    feed_blocks(&mut seg, 0.0, 6);
    assert_eq!(
        sink.chunks.lock().iter().map(Vec::len).collect::<Vec<_>>(),
        vec![31 * SPB]
    );
    assert_eq!(seg.buffered_blocks(), 0);

    // Phase 3: 70 loud blocks with no gap — exactly one forced cut of at
    // most 60 blocks, remainder retained.
    feed_blocks(&mut seg, 0.5, 70);
    let lens: Vec<usize> = sink.chunks.lock().iter().map(Vec::len).collect();
    assert_eq!(lens.len(), 2);
    assert!(lens[1] <= 60 * SPB);
    assert_eq!(seg.buffered_blocks() * SPB + lens[1], 70 * SPB);

    seg.finalize().unwrap();
}

#[test]
fn buffered_blocks_stay_bounded_for_any_block_feed() {
    let sink = CollectingSink::default();
    let mut seg = UtteranceSegmenter::new(sink, SegmenterConfig::default());
    seg.configure(StreamFormat::mono(16_000)).unwrap();

    // Pseudo-random mixture of loud and quiet blocks.
    let mut state = 0x2545_f491u32;
    for _ in 0..2000 {
        state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        let amplitude = if state % 5 == 0 { 0.0 } else { 0.4 };
        seg.consume(&vec![amplitude; SPB]).unwrap();
        assert!(seg.buffered_blocks() <= 60, "buffer exceeded desired size");
    }
}

#[test]
fn every_forwarded_chunk_meets_the_minimum_size() {
    let sink = CollectingSink::default();
    let mut seg = UtteranceSegmenter::new(sink.clone(), SegmenterConfig::default());
    seg.configure(StreamFormat::mono(16_000)).unwrap();

    for _ in 0..10 {
        feed_blocks(&mut seg, 0.5, 23);
        feed_blocks(&mut seg, 0.0, 8);
    }
    let chunks = sink.chunks.lock();
    assert!(!chunks.is_empty());
    for chunk in chunks.iter() {
        assert!(chunk.len() >= 20 * SPB);
        assert_eq!(chunk.len() % SPB, 0, "chunks are block-aligned");
    }
}

#[test]
fn fanout_drives_segmenter_and_silence_detector_together() {
    let (tx, rx) = unbounded::<Chunk>();
    let segmenter = UtteranceSegmenter::new(ChunkSender::new(tx), SegmenterConfig::default());

    let entered = Arc::new(Mutex::new(0u32));
    let mut detector = SilenceDetector::new(SilenceConfig::default());
    {
        let entered = Arc::clone(&entered);
        detector.on_silence_enter(move || *entered.lock() += 1);
    }

    let mut fanout = Fanout::new(vec![Box::new(segmenter), Box::new(detector)]);
    fanout.configure(StreamFormat::mono(16_000)).unwrap();

    // One utterance followed by a long pause.
    feed_blocks(&mut fanout, 0.5, 25);
    feed_blocks(&mut fanout, 0.0, 12);
    fanout.finalize().unwrap();

    // The segmenter produced one utterance chunk...
    let chunks: Vec<Chunk> = rx.iter().collect();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].samples.len(), 31 * SPB);
    assert_eq!(chunks[0].sample_rate, 16_000);

    // ...and the detector reported the pause exactly once.
    assert_eq!(*entered.lock(), 1);
}
