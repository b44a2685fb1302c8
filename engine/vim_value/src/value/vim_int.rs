//! 32-bit Vim Number that prevents unchecked arithmetic.
//!
//! `VimInt` wraps `i32` and intentionally does NOT implement `Add`, `Sub`,
//! `Mul`, `Div`, `Rem`, `Neg`, `Shl` or `Shr`. Vim numbers wrap on overflow
//! and have their own division-by-zero results, so every operation goes
//! through a named method that spells out which rule applies.

use std::fmt;

/// A Vim Number: 32-bit two's complement with wrapping arithmetic.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[repr(transparent)]
pub struct VimInt(i32);

impl VimInt {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1);
    pub const MIN: Self = Self(i32::MIN);
    pub const MAX: Self = Self(i32::MAX);

    #[inline]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Clamp a wider integer into range, as Vim does when parsing numbers.
    #[inline]
    pub fn saturating_from_i64(value: i64) -> Self {
        Self(i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX }))
    }

    /// Truncate toward zero and saturate, as `float2nr()` does. NaN maps to 0.
    #[inline]
    pub fn saturating_from_f64(value: f64) -> Self {
        if value.is_nan() {
            Self::ZERO
        } else if value >= f64::from(i32::MAX) {
            Self::MAX
        } else if value <= f64::from(i32::MIN) {
            Self::MIN
        } else {
            #[expect(clippy::cast_possible_truncation, reason = "range checked above")]
            Self(value.trunc() as i32)
        }
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn to_i64(self) -> i64 {
        i64::from(self.0)
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        f64::from(self.0)
    }

    #[inline]
    #[must_use]
    pub const fn wrapping_add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }

    #[inline]
    #[must_use]
    pub const fn wrapping_sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }

    #[inline]
    #[must_use]
    pub const fn wrapping_mul(self, rhs: Self) -> Self {
        Self(self.0.wrapping_mul(rhs.0))
    }

    #[inline]
    #[must_use]
    pub const fn wrapping_neg(self) -> Self {
        Self(self.0.wrapping_neg())
    }

    /// Division with Vim's zero-divisor results: `0x7fffffff` for a
    /// positive dividend, `-0x7fffffff` for a negative one and
    /// `-0x80000000` for `0 / 0`.
    #[must_use]
    pub const fn vim_div(self, rhs: Self) -> Self {
        if rhs.0 == 0 {
            if self.0 == 0 {
                Self(i32::MIN)
            } else if self.0 < 0 {
                Self(-i32::MAX)
            } else {
                Self(i32::MAX)
            }
        } else {
            Self(self.0.wrapping_div(rhs.0))
        }
    }

    /// Remainder; a zero divisor yields 0.
    #[must_use]
    pub const fn vim_rem(self, rhs: Self) -> Self {
        if rhs.0 == 0 {
            Self::ZERO
        } else {
            Self(self.0.wrapping_rem(rhs.0))
        }
    }

    /// Left shift by a non-negative amount; 32 or more clears every bit.
    #[must_use]
    pub const fn shift_left(self, amount: u32) -> Self {
        if amount >= 32 {
            Self::ZERO
        } else {
            Self(self.0 << amount)
        }
    }

    /// Arithmetic right shift by a non-negative amount; 32 or more leaves
    /// only the sign (0 or -1).
    #[must_use]
    pub const fn shift_right(self, amount: u32) -> Self {
        if amount >= 32 {
            if self.0 < 0 {
                Self(-1)
            } else {
                Self::ZERO
            }
        } else {
            Self(self.0 >> amount)
        }
    }

    #[inline]
    #[must_use]
    pub const fn bit_and(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }

    #[inline]
    #[must_use]
    pub const fn bit_or(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }

    #[inline]
    #[must_use]
    pub const fn bit_xor(self, rhs: Self) -> Self {
        Self(self.0 ^ rhs.0)
    }

    #[inline]
    #[must_use]
    pub const fn bit_not(self) -> Self {
        Self(!self.0)
    }

    /// Absolute value; `abs(-0x80000000)` saturates like Vim.
    #[inline]
    #[must_use]
    pub const fn saturating_abs(self) -> Self {
        Self(self.0.saturating_abs())
    }
}

impl From<i32> for VimInt {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl From<bool> for VimInt {
    fn from(value: bool) -> Self {
        Self(i32::from(value))
    }
}

impl fmt::Debug for VimInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for VimInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addition_wraps() {
        assert_eq!(VimInt::MAX.wrapping_add(VimInt::ONE), VimInt::MIN);
        assert_eq!(VimInt::MIN.wrapping_sub(VimInt::ONE), VimInt::MAX);
    }

    #[test]
    fn division_by_zero_follows_vim() {
        assert_eq!(VimInt::new(5).vim_div(VimInt::ZERO), VimInt::new(0x7fff_ffff));
        assert_eq!(VimInt::new(-5).vim_div(VimInt::ZERO), VimInt::new(-0x7fff_ffff));
        assert_eq!(VimInt::ZERO.vim_div(VimInt::ZERO), VimInt::MIN);
        assert_eq!(VimInt::new(7).vim_rem(VimInt::ZERO), VimInt::ZERO);
        assert_eq!(VimInt::MIN.vim_div(VimInt::new(-1)), VimInt::MIN);
    }

    #[test]
    fn shifts_saturate_at_width() {
        assert_eq!(VimInt::ONE.shift_left(31), VimInt::MIN);
        assert_eq!(VimInt::ONE.shift_left(32), VimInt::ZERO);
        assert_eq!(VimInt::new(-8).shift_right(1), VimInt::new(-4));
        assert_eq!(VimInt::new(-8).shift_right(40), VimInt::new(-1));
        assert_eq!(VimInt::new(8).shift_right(40), VimInt::ZERO);
    }

    #[test]
    fn saturating_conversions() {
        assert_eq!(VimInt::saturating_from_i64(1 << 40), VimInt::MAX);
        assert_eq!(VimInt::saturating_from_i64(-(1 << 40)), VimInt::MIN);
        assert_eq!(VimInt::saturating_from_f64(3.9), VimInt::new(3));
        assert_eq!(VimInt::saturating_from_f64(-3.9), VimInt::new(-3));
        assert_eq!(VimInt::saturating_from_f64(1e20), VimInt::MAX);
        assert_eq!(VimInt::saturating_from_f64(f64::NAN), VimInt::ZERO);
    }

    mod proptest_wrapping {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn add_matches_i32_wrapping(a in any::<i32>(), b in any::<i32>()) {
                prop_assert_eq!(
                    VimInt::new(a).wrapping_add(VimInt::new(b)),
                    VimInt::new(a.wrapping_add(b))
                );
            }

            #[test]
            fn shift_left_then_right_keeps_low_bits(a in 0i32..0x7fff, n in 0u32..16) {
                prop_assert_eq!(VimInt::new(a).shift_left(n).shift_right(n), VimInt::new(a));
            }
        }
    }
}
