//! Block loudness estimation: RMS amplitude expressed in decibels.
//!
//! Samples are scaled to the 16-bit integer reference range before the RMS
//! is taken, so thresholds line up with the dBFS-style figures common in
//! speech tooling (a 0.5-amplitude tone lands around 84 dB, a quiet room
//! well under 30 dB).

/// Full-scale reference for float samples, matching `i16::MAX`.
const PCM16_FULL_SCALE: f64 = 32767.0;

/// Loudness of one analysis block in decibels.
///
/// Computes `20 * log10(rms)` where `rms` is the root-mean-square of the
/// samples scaled by [`i16::MAX`]. Pure and O(n).
///
/// An all-zero (or empty) block yields `f32::NEG_INFINITY`, which every
/// comparison against a finite threshold treats as silent.
pub fn block_db(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return f32::NEG_INFINITY;
    }

    let sum_sq: f64 = samples
        .iter()
        .map(|&s| {
            let scaled = f64::from(s) * PCM16_FULL_SCALE;
            scaled * scaled
        })
        .sum();
    let rms = (sum_sq / samples.len() as f64).sqrt();

    (20.0 * rms.log10()) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn all_zero_block_is_negative_infinity() {
        let db = block_db(&[0.0; 1600]);
        assert_eq!(db, f32::NEG_INFINITY);
        assert!(db < 30.0, "negative infinity must compare below any threshold");
    }

    #[test]
    fn empty_block_is_negative_infinity() {
        assert_eq!(block_db(&[]), f32::NEG_INFINITY);
    }

    #[test]
    fn constant_half_amplitude_block() {
        // RMS of a constant 0.5 signal is 0.5 * 32767 = 16383.5
        // 20 * log10(16383.5) ≈ 84.288 dB
        let db = block_db(&[0.5; 1600]);
        assert_relative_eq!(db, 84.288, epsilon = 1e-2);
    }

    #[test]
    fn square_wave_matches_constant_of_same_magnitude() {
        let square: Vec<f32> = (0..256)
            .map(|i| if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect();
        assert_relative_eq!(block_db(&square), block_db(&[0.5; 256]), epsilon = 1e-4);
    }

    #[test]
    fn louder_signal_has_higher_db() {
        assert!(block_db(&[0.5; 160]) > block_db(&[0.05; 160]));
    }
}
