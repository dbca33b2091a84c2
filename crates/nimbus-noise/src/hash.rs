const FNV_OFFSET: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// 32-bit xorshift step (12/25/27 triple). Zero is a fixed point.
#[inline]
pub fn xorshift32(value: u32) -> u32 {
    let mut x = value ^ (value >> 12);
    x ^= x << 25;
    x ^ (x >> 27)
}

/// FNV-1a over three lattice coordinates.
#[inline]
pub fn fnv1a3(i: u32, j: u32, k: u32) -> u32 {
    let mut h = FNV_OFFSET;
    for c in [i, j, k] {
        h = (h ^ c).wrapping_mul(FNV_PRIME);
    }
    h
}
