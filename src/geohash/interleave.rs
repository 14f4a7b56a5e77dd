//! Constant-time bit interleaving ("spread bits") used by the geohash encoder.

const B: [u64; 6] = [
    0x5555_5555_5555_5555,
    0x3333_3333_3333_3333,
    0x0F0F_0F0F_0F0F_0F0F,
    0x00FF_00FF_00FF_00FF,
    0x0000_FFFF_0000_FFFF,
    0x0000_0000_FFFF_FFFF,
];
const S: [u32; 5] = [1, 2, 4, 8, 16];

/// Move the 32 bits of `v` to the even bit positions of a 64-bit word.
#[inline]
fn spread(v: u32) -> u64 {
    let mut x = v as u64;
    x = (x | (x << S[4])) & B[4];
    x = (x | (x << S[3])) & B[3];
    x = (x | (x << S[2])) & B[2];
    x = (x | (x << S[1])) & B[1];
    x = (x | (x << S[0])) & B[0];
    x
}

/// Inverse of [`spread`]: gather the even bit positions of `v` into a 32-bit word.
#[inline]
fn squash(v: u64) -> u32 {
    let mut x = v & B[0];
    x = (x | (x >> S[0])) & B[1];
    x = (x | (x >> S[1])) & B[2];
    x = (x | (x >> S[2])) & B[3];
    x = (x | (x >> S[3])) & B[4];
    x = (x | (x >> S[4])) & B[5];
    x as u32
}

/// Interleave two 32-bit words: bits of `even` land on even positions, bits of `odd` on odd
/// positions (counting from the least significant bit).
#[inline]
pub(crate) fn interleave64(even: u32, odd: u32) -> u64 {
    spread(even) | (spread(odd) << 1)
}

/// Inverse of [`interleave64`]; returns `(even, odd)`.
#[inline]
pub(crate) fn deinterleave64(interleaved: u64) -> (u32, u32) {
    (squash(interleaved), squash(interleaved >> 1))
}

#[cfg(test)]
mod test {
    use super::*;

    fn interleave_naive(even: u32, odd: u32) -> u64 {
        let mut out = 0u64;
        for i in 0..32 {
            out |= (((even >> i) & 1) as u64) << (2 * i);
            out |= (((odd >> i) & 1) as u64) << (2 * i + 1);
        }
        out
    }

    #[test]
    fn matches_per_bit_loop() {
        let samples = [
            (0u32, 0u32),
            (u32::MAX, 0),
            (0, u32::MAX),
            (u32::MAX, u32::MAX),
            (0xDEAD_BEEF, 0x1234_5678),
            (1, 2),
            (0x8000_0001, 0x7FFF_FFFE),
        ];
        for (even, odd) in samples {
            let code = interleave64(even, odd);
            assert_eq!(code, interleave_naive(even, odd));
            assert_eq!(deinterleave64(code), (even, odd));
        }
    }

    #[test]
    fn single_bits() {
        assert_eq!(interleave64(1, 0), 0b01);
        assert_eq!(interleave64(0, 1), 0b10);
        assert_eq!(interleave64(0b11, 0), 0b0101);
    }
}
