/// Security expressed in bits, i.e. `-log2` of an error probability.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Bits(f64);

impl Bits {
    /// Converts an error probability into bits of security.
    ///
    /// An error of zero (an underflowed product) saturates to `f64::MAX`,
    /// which is always above any hash cap. An error bound that is infinite,
    /// negative or NaN gives no security and maps to `f64::MIN`.
    pub fn from_error(error: f64) -> Self {
        if error.is_nan() || error < 0.0 {
            return Bits(f64::MIN);
        }
        Bits((-error.log2()).clamp(f64::MIN, f64::MAX))
    }

    /// The largest `k` such that the error is at most `2^-k`, capped at `cap`.
    ///
    /// The result is negative when the error exceeds one.
    #[allow(clippy::cast_possible_truncation)]
    pub fn level(self, cap: usize) -> i64 {
        self.0.min(cap as f64).floor() as i64
    }
}
