//! Basis sifting.

use crate::backend::Outcome;
use crate::error::{ProtocolError, ProtocolResult};

/// The part of one round both parties keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiftedRound {
    /// `true` where Alice and Bob used the same basis.
    pub keep_mask: Vec<bool>,
    /// Alice's kept bits, in round order.
    pub alice: Vec<bool>,
    /// Bob's kept bits, complemented, in round order.
    pub bob: Vec<bool>,
    /// Kept bits disclosed for public comparison and dropped from the key.
    pub disclosed: usize,
}

impl SiftedRound {
    /// Number of positions where the bases agreed.
    pub fn agreed(&self) -> usize {
        self.keep_mask.iter().filter(|&&k| k).count()
    }

    /// Number of bits that go into the key.
    pub fn len(&self) -> usize {
        self.alice.len()
    }

    /// Check whether nothing survived sifting.
    pub fn is_empty(&self) -> bool {
        self.alice.is_empty()
    }

    /// Number of kept positions where Alice and corrected Bob disagree.
    pub fn disagreements(&self) -> usize {
        self.alice
            .iter()
            .zip(&self.bob)
            .filter(|(a, b)| a != b)
            .count()
    }
}

/// Keep the positions where the bases agree.
///
/// Alice's bits are kept as measured; Bob's are complemented to undo the
/// singlet anti-correlation. Fails when the base sequences differ in length
/// or the outcome does not hold exactly `2N` bits.
pub fn sift(alice_bases: &[bool], bob_bases: &[bool], outcome: &Outcome) -> ProtocolResult<SiftedRound> {
    if alice_bases.len() != bob_bases.len() {
        return Err(ProtocolError::LengthMismatch {
            what: "Alice bases vs. Bob bases",
            left: alice_bases.len(),
            right: bob_bases.len(),
        });
    }
    let (alice_bits, bob_bits) = outcome.split(alice_bases.len())?;

    let keep_mask: Vec<bool> = alice_bases
        .iter()
        .zip(bob_bases)
        .map(|(a, b)| a == b)
        .collect();

    let kept = |bits: &[bool], invert: bool| -> Vec<bool> {
        bits.iter()
            .zip(&keep_mask)
            .filter(|&(_, &keep)| keep)
            .map(|(&bit, _)| bit ^ invert)
            .collect()
    };
    let alice = kept(alice_bits, false);
    let bob = kept(bob_bits, true);

    Ok(SiftedRound {
        keep_mask,
        alice,
        bob,
        disclosed: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(s: &str) -> Outcome {
        Outcome::from_bitstring(s).unwrap()
    }

    #[test]
    fn test_sift_keeps_agreeing_positions() {
        // Alice 1 0 1, Bob 0 1 1 (raw)
        let round = sift(
            &[false, true, true],
            &[false, false, true],
            &outcome("101011"),
        )
        .unwrap();

        assert_eq!(round.keep_mask, vec![true, false, true]);
        assert_eq!(round.agreed(), 2);
        assert_eq!(round.alice, vec![true, true]);
        assert_eq!(round.bob, vec![true, false]);
        assert_eq!(round.disagreements(), 1);
    }

    #[test]
    fn test_anticorrelated_outcome_sifts_to_equal_keys() {
        let round = sift(&[true, false], &[true, false], &outcome("0110")).unwrap();
        assert_eq!(round.alice, vec![false, true]);
        assert_eq!(round.alice, round.bob);
    }

    #[test]
    fn test_no_agreement_keeps_nothing() {
        let round = sift(&[true, false], &[false, true], &outcome("0000")).unwrap();
        assert!(round.is_empty());
        assert_eq!(round.agreed(), 0);
    }

    #[test]
    fn test_outcome_length_violation() {
        assert!(matches!(
            sift(&[true, false], &[true, false], &outcome("011")),
            Err(ProtocolError::OutcomeLength {
                expected: 4,
                got: 3
            })
        ));
    }

    #[test]
    fn test_base_length_violation() {
        assert!(matches!(
            sift(&[true], &[true, false], &outcome("0110")),
            Err(ProtocolError::LengthMismatch { .. })
        ));
    }
}
