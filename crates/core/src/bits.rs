//! Conversions between bytes, integers, bit sequences and `"0101"` strings.
//!
//! Paths through the tree are plain `Vec<Bit>` (`false` = left/0,
//! `true` = right/1). The string forms exist for logging and for stating
//! expected codes in tests.

/// A single branch decision or stream bit.
pub type Bit = bool;

/// Render bits as a string of `'0'` and `'1'`.
pub fn to_bit_string(bits: &[Bit]) -> String {
    bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
}

/// Interpret up to 64 bits, most significant first, as an unsigned integer.
pub fn bits_to_u64(bits: &[Bit]) -> u64 {
    debug_assert!(bits.len() <= 64);
    bits.iter().fold(0u64, |acc, &b| (acc << 1) | b as u64)
}

/// The low `width` bits of `value`, most significant first.
pub fn u64_to_bits(value: u64, width: usize) -> Vec<Bit> {
    debug_assert!(width <= 64);
    (0..width).rev().map(|i| (value >> i) & 1 == 1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_strings() {
        assert_eq!(to_bit_string(&[true, false, false, true]), "1001");
        assert_eq!(to_bit_string(&[]), "");
    }

    #[test]
    fn test_fixed_width_integers() {
        assert_eq!(to_bit_string(&u64_to_bits(1, 4)), "0001");
        assert_eq!(to_bit_string(&u64_to_bits(15, 4)), "1111");
        // Higher bits beyond the width are dropped
        assert_eq!(to_bit_string(&u64_to_bits(0x13, 4)), "0011");
        assert_eq!(to_bit_string(&u64_to_bits(0x41, 8)), "01000001");
        assert_eq!(bits_to_u64(&[true, true, false, false]), 12);
        assert_eq!(bits_to_u64(&[]), 0);
    }

    #[test]
    fn test_header_widths_round_trip() {
        for size in 0..16u64 {
            assert_eq!(bits_to_u64(&u64_to_bits(size, 4)), size);
        }
    }
}
