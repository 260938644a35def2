//! Bit blocks and byte packing.
//!
//! Keys are handled as `Vec<bool>` until they are finalized. Packing is
//! most-significant-bit first; a trailing partial byte keeps its bits in the
//! high positions and zero-fills the rest.

use rand::Rng;

use crate::error::{ProtocolError, ProtocolResult};

/// Draw `n` independent, uniformly random bits.
pub fn random_bits<R: Rng + ?Sized>(rng: &mut R, n: usize) -> Vec<bool> {
    (0..n).map(|_| rng.r#gen::<bool>()).collect()
}

/// Pack bits into bytes, MSB first.
pub fn pack_bits(bits: &[bool]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |byte, (i, &bit)| byte | (u8::from(bit) << (7 - i)))
        })
        .collect()
}

/// Unpack the first `len` bits of `bytes`.
///
/// Exact inverse of [`pack_bits`] when `len` is the original bit count.
pub fn unpack_bits(bytes: &[u8], len: usize) -> ProtocolResult<Vec<bool>> {
    let available = bytes.len() * 8;
    if len > available {
        return Err(ProtocolError::LengthMismatch {
            what: "unpack bit count vs. available bits",
            left: len,
            right: available,
        });
    }
    Ok((0..len)
        .map(|i| (bytes[i / 8] >> (7 - i % 8)) & 1 == 1)
        .collect())
}

/// Render bytes as lowercase hex.
pub fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut s, b| {
        let _ = write!(s, "{b:02x}");
        s
    })
}

/// Render bits as a `0`/`1` string.
pub fn to_bitstring(bits: &[bool]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_pack_msb_first() {
        let bits = [true, false, false, false, false, false, false, true];
        assert_eq!(pack_bits(&bits), vec![0x81]);
    }

    #[test]
    fn test_pack_partial_byte_is_left_aligned() {
        // 1 0 1 -> 1010_0000
        assert_eq!(pack_bits(&[true, false, true]), vec![0xa0]);
        assert_eq!(pack_bits(&[]), Vec::<u8>::new());
    }

    #[test]
    fn test_unpack_rejects_overlong_request() {
        assert!(matches!(
            unpack_bits(&[0xff], 9),
            Err(ProtocolError::LengthMismatch { left: 9, right: 8, .. })
        ));
    }

    #[test]
    fn test_random_bits_length_and_mix() {
        let mut rng = StdRng::seed_from_u64(9);
        let bits = random_bits(&mut rng, 1000);
        assert_eq!(bits.len(), 1000);
        let ones = bits.iter().filter(|&&b| b).count();
        assert!((350..650).contains(&ones));
    }

    #[test]
    fn test_hex_and_bitstring() {
        assert_eq!(to_hex(&[0x00, 0xa5, 0xff]), "00a5ff");
        assert_eq!(to_bitstring(&[true, false, true]), "101");
    }
}
