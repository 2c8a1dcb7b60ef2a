use fixed::types::I32F32;

/// Q32.32 fixed-point: 32 integer bits, 32 fractional bits.
pub type Fixed64 = I32F32;

/// Ticks are the atomic unit of substrate time.
pub type Ticks = u64;

/// Exact ratio `num / den` as Fixed64. Returns `None` when `den` is zero.
#[inline]
pub fn ratio(num: u32, den: u32) -> Option<Fixed64> {
    Fixed64::from_num(num).checked_div(Fixed64::from_num(den))
}

/// Convert Fixed64 to f64. Use only for display and reporting.
#[inline]
pub fn fixed64_to_f64(v: Fixed64) -> f64 {
    v.to_num::<f64>()
}
