//! Public sampling of sifted bits.
//!
//! With sampling on, every kept position is disclosed with probability
//! `sample_rate`. Disclosed bits are compared in the clear, counted, and
//! removed from both keys. Once enough bits have been compared, a cumulative
//! disagreement rate above the threshold ends the run.

use rand::Rng;
use tracing::{debug, warn};

use crate::error::{ProtocolError, ProtocolResult};
use crate::sifting::SiftedRound;

/// Compared bits required before the abort rule applies.
pub const MIN_COMPARED_BITS: usize = 16;

/// Running totals of the public comparison.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SamplingStats {
    /// Bits disclosed and compared so far.
    pub compared: usize,
    /// Compared bits on which Alice and Bob disagreed.
    pub disagreements: usize,
}

impl SamplingStats {
    /// Disagreement rate, `0.0` before anything is compared.
    pub fn rate(&self) -> f64 {
        if self.compared == 0 {
            0.0
        } else {
            self.disagreements as f64 / self.compared as f64
        }
    }
}

/// Eavesdropper check over publicly compared bits.
#[derive(Debug, Clone)]
pub struct DisagreementCheck {
    sample_rate: f64,
    threshold: f64,
    stats: SamplingStats,
}

impl DisagreementCheck {
    /// Create a check; both rates must lie in `[0, 1]`.
    pub fn new(sample_rate: f64, threshold: f64) -> ProtocolResult<Self> {
        for (name, value) in [("sample_rate", sample_rate), ("abort_threshold", threshold)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ProtocolError::InvalidParameter {
                    name,
                    reason: format!("{value} is outside [0, 1]"),
                });
            }
        }
        Ok(Self {
            sample_rate,
            threshold,
            stats: SamplingStats::default(),
        })
    }

    /// Totals so far.
    pub fn stats(&self) -> SamplingStats {
        self.stats
    }

    /// Disclose a random subset of `round`, compare it, and return the rest.
    ///
    /// Fails with [`ProtocolError::EavesdropperDetected`] once at least
    /// [`MIN_COMPARED_BITS`] have been compared and the cumulative rate is
    /// above the threshold.
    pub fn screen<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        mut round: SiftedRound,
    ) -> ProtocolResult<SiftedRound> {
        let mut alice = Vec::with_capacity(round.alice.len());
        let mut bob = Vec::with_capacity(round.bob.len());

        for (&a, &b) in round.alice.iter().zip(&round.bob) {
            if rng.gen_bool(self.sample_rate) {
                self.stats.compared += 1;
                if a != b {
                    self.stats.disagreements += 1;
                }
                round.disclosed += 1;
            } else {
                alice.push(a);
                bob.push(b);
            }
        }
        round.alice = alice;
        round.bob = bob;

        debug!(
            disclosed = round.disclosed,
            compared = self.stats.compared,
            disagreements = self.stats.disagreements,
            "public sampling"
        );

        let rate = self.stats.rate();
        if self.stats.compared >= MIN_COMPARED_BITS && rate > self.threshold {
            warn!(rate, threshold = self.threshold, "disagreement above threshold");
            return Err(ProtocolError::EavesdropperDetected {
                rate,
                threshold: self.threshold,
                compared: self.stats.compared,
            });
        }

        Ok(round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn round(alice: Vec<bool>, bob: Vec<bool>) -> SiftedRound {
        SiftedRound {
            keep_mask: vec![true; alice.len()],
            alice,
            bob,
            disclosed: 0,
        }
    }

    #[test]
    fn test_full_disclosure_consumes_round() {
        let mut check = DisagreementCheck::new(1.0, 0.11).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let out = check
            .screen(&mut rng, round(vec![true; 10], vec![true; 10]))
            .unwrap();

        assert!(out.is_empty());
        assert_eq!(out.disclosed, 10);
        assert_eq!(check.stats().compared, 10);
        assert_eq!(check.stats().rate(), 0.0);
    }

    #[test]
    fn test_zero_rate_discloses_nothing() {
        let mut check = DisagreementCheck::new(0.0, 0.11).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let input = round(vec![true, false], vec![false, false]);
        let out = check.screen(&mut rng, input.clone()).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn test_abort_waits_for_enough_samples() {
        let mut check = DisagreementCheck::new(1.0, 0.11).unwrap();
        let mut rng = StdRng::seed_from_u64(2);

        // 8 compared, all disagree: below the minimum sample, no abort yet.
        check
            .screen(&mut rng, round(vec![true; 8], vec![false; 8]))
            .unwrap();
        assert_eq!(check.stats().disagreements, 8);

        let err = check
            .screen(&mut rng, round(vec![true; 8], vec![false; 8]))
            .unwrap_err();
        match err {
            ProtocolError::EavesdropperDetected {
                rate, compared, ..
            } => {
                assert_eq!(compared, 16);
                assert!((rate - 1.0).abs() < 1e-12);
            }
            other => panic!("expected EavesdropperDetected, got {other:?}"),
        }
    }

    #[test]
    fn test_rate_at_threshold_passes() {
        let mut check = DisagreementCheck::new(1.0, 0.25).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let mut bob = vec![true; 16];
        for b in bob.iter_mut().take(4) {
            *b = false;
        }
        assert!(check.screen(&mut rng, round(vec![true; 16], bob)).is_ok());
        assert!((check.stats().rate() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_rates_validated() {
        assert!(DisagreementCheck::new(-0.1, 0.11).is_err());
        assert!(DisagreementCheck::new(0.1, 1.5).is_err());
    }
}
