//! Property-based tests for bit packing, the pad, and sifting.

use e91_protocol::bits::{pack_bits, unpack_bits};
use e91_protocol::{Outcome, sift, xor_bytes};
use proptest::prelude::*;

/// Bases for both parties and a `2N`-bit outcome.
fn arb_round() -> impl Strategy<Value = (Vec<bool>, Vec<bool>, Vec<bool>)> {
    (1_usize..=16).prop_flat_map(|n| {
        (
            prop::collection::vec(any::<bool>(), n),
            prop::collection::vec(any::<bool>(), n),
            prop::collection::vec(any::<bool>(), 2 * n),
        )
    })
}

proptest! {
    #[test]
    fn pack_then_unpack_preserves_bits(bits in prop::collection::vec(any::<bool>(), 0..200)) {
        let bytes = pack_bits(&bits);
        prop_assert_eq!(bytes.len(), bits.len().div_ceil(8));
        prop_assert_eq!(unpack_bits(&bytes, bits.len()).unwrap(), bits);
    }

    #[test]
    fn xor_twice_is_identity(
        (data, key) in (0_usize..128).prop_flat_map(|n| (
            prop::collection::vec(any::<u8>(), n),
            prop::collection::vec(any::<u8>(), n),
        ))
    ) {
        let ciphertext = xor_bytes(&data, &key).unwrap();
        prop_assert_eq!(xor_bytes(&ciphertext, &key).unwrap(), data);
    }

    #[test]
    fn sifted_length_matches_agreeing_bases((alice, bob, bits) in arb_round()) {
        let round = sift(&alice, &bob, &Outcome::new(bits)).unwrap();
        let agreeing = alice.iter().zip(&bob).filter(|(a, b)| a == b).count();

        prop_assert_eq!(round.keep_mask.len(), alice.len());
        prop_assert_eq!(round.agreed(), agreeing);
        prop_assert_eq!(round.alice.len(), agreeing);
        prop_assert_eq!(round.bob.len(), agreeing);
    }

    #[test]
    fn anticorrelated_outcomes_sift_to_equal_keys((alice, bob, bits) in arb_round()) {
        // Force Bob's half to the complement of Alice's.
        let n = alice.len();
        let mut bits = bits;
        for i in 0..n {
            bits[n + i] = !bits[i];
        }
        let round = sift(&alice, &bob, &Outcome::new(bits)).unwrap();
        prop_assert_eq!(round.disagreements(), 0);
        prop_assert_eq!(round.alice, round.bob);
    }
}
