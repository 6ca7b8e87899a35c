//! Conversion between wall-clock seconds and ticks.
//!
//! Rounding is round-half-to-even everywhere in this module, both for
//! seconds-to-ticks and for tick grid rescaling.

use crate::error::{MergeError, MergeResult};

/// Resolution of every merged output file, in ticks per beat.
pub const OUTPUT_RESOLUTION: u16 = 384;

/// Converts `seconds` at `tempo_us_per_beat` into ticks of a
/// `ticks_per_beat` grid.
///
/// Computes `round(seconds * 1_000_000 / tempo * ticks_per_beat)`, rounding
/// halves to even.
pub fn to_ticks(seconds: f64, tempo_us_per_beat: u32, ticks_per_beat: u16) -> MergeResult<u64> {
    if tempo_us_per_beat == 0 {
        return Err(MergeError::InvalidTempo {
            tempo: tempo_us_per_beat,
        });
    }
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(MergeError::InvalidDuration { seconds });
    }

    let ticks = (seconds * 1_000_000.0 / f64::from(tempo_us_per_beat)
        * f64::from(ticks_per_beat))
    .round_ties_even();

    if ticks > u64::from(u32::MAX) as f64 {
        return Err(MergeError::InvalidDuration { seconds });
    }
    Ok(ticks as u64)
}

/// Maps an absolute tick position from one resolution onto another.
pub(crate) fn rescale_ticks(ticks: u64, from: u16, to: u16) -> u64 {
    if from == to || from == 0 {
        return ticks;
    }
    let numerator = u128::from(ticks) * u128::from(to);
    let denominator = u128::from(from);
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;

    let twice = remainder * 2;
    let rounded = if twice > denominator || (twice == denominator && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    };
    rounded as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tempo::DEFAULT_TEMPO;

    #[test]
    fn test_default_gap_and_tail() {
        assert_eq!(to_ticks(2.0, DEFAULT_TEMPO, OUTPUT_RESOLUTION).unwrap(), 1536);
        assert_eq!(to_ticks(1.0, DEFAULT_TEMPO, OUTPUT_RESOLUTION).unwrap(), 768);
        assert_eq!(to_ticks(0.0, DEFAULT_TEMPO, OUTPUT_RESOLUTION).unwrap(), 0);
    }

    #[test]
    fn test_slower_tempo_gives_fewer_ticks() {
        // 1 beat per second.
        assert_eq!(to_ticks(2.0, 1_000_000, OUTPUT_RESOLUTION).unwrap(), 768);
    }

    #[test]
    fn test_rounds_half_to_even() {
        // 0.25 s at 120 BPM with 1 tick per beat is exactly 0.5 ticks.
        assert_eq!(to_ticks(0.25, DEFAULT_TEMPO, 1).unwrap(), 0);
        // 0.75 s is exactly 1.5 ticks.
        assert_eq!(to_ticks(0.75, DEFAULT_TEMPO, 1).unwrap(), 2);
        assert_eq!(to_ticks(1.25, DEFAULT_TEMPO, 1).unwrap(), 2);
        assert_eq!(to_ticks(0.3, DEFAULT_TEMPO, 1).unwrap(), 1);
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        assert!(matches!(
            to_ticks(1.0, 0, OUTPUT_RESOLUTION),
            Err(MergeError::InvalidTempo { tempo: 0 })
        ));
        assert!(matches!(
            to_ticks(-1.0, DEFAULT_TEMPO, OUTPUT_RESOLUTION),
            Err(MergeError::InvalidDuration { .. })
        ));
        assert!(matches!(
            to_ticks(f64::NAN, DEFAULT_TEMPO, OUTPUT_RESOLUTION),
            Err(MergeError::InvalidDuration { .. })
        ));
        assert!(matches!(
            to_ticks(f64::INFINITY, DEFAULT_TEMPO, OUTPUT_RESOLUTION),
            Err(MergeError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn test_rescale_ticks() {
        assert_eq!(rescale_ticks(480, 480, 384), 384);
        assert_eq!(rescale_ticks(960, 480, 384), 768);
        assert_eq!(rescale_ticks(96, 96, 384), 384);
        assert_eq!(rescale_ticks(1234, 384, 384), 1234);
        // 1 * 384 / 480 = 0.8
        assert_eq!(rescale_ticks(1, 480, 384), 1);
        // 1 * 1 / 2 = 0.5 -> 0, 3 * 1 / 2 = 1.5 -> 2
        assert_eq!(rescale_ticks(1, 2, 1), 0);
        assert_eq!(rescale_ticks(3, 2, 1), 2);
    }
}
