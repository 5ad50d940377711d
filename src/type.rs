use std::cmp::Ordering;
use std::fmt::Debug;

use num_traits::{Bounded, Num, NumCast, ToPrimitive};

/// A trait for types that can be used for indexed coordinates.
///
/// This trait is sealed and cannot be implemented for external types. Every coordinate type must
/// be able to offset a query point by a distance without overflowing, which is provided here for
/// each of the primitive numeric types.
pub trait IndexableNum:
    private::Sealed + Num + NumCast + ToPrimitive + PartialOrd + Copy + Debug + Send + Sync + Bounded
{
    /// Subtract `rhs`, clamping at the lower bound of the type for integers.
    fn saturating_sub(self, rhs: Self) -> Self;

    /// Add `rhs`, clamping at the upper bound of the type for integers.
    fn saturating_add(self, rhs: Self) -> Self;

    /// Total-ish ordering used for sorting. Incomparable values (NaN) compare as equal.
    #[inline]
    fn axis_cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

macro_rules! impl_int {
    ($($t:ty),*) => {
        $(
            impl IndexableNum for $t {
                #[inline]
                fn saturating_sub(self, rhs: Self) -> Self {
                    <$t>::saturating_sub(self, rhs)
                }

                #[inline]
                fn saturating_add(self, rhs: Self) -> Self {
                    <$t>::saturating_add(self, rhs)
                }
            }
        )*
    };
}

macro_rules! impl_float {
    ($($t:ty),*) => {
        $(
            impl IndexableNum for $t {
                #[inline]
                fn saturating_sub(self, rhs: Self) -> Self {
                    self - rhs
                }

                #[inline]
                fn saturating_add(self, rhs: Self) -> Self {
                    self + rhs
                }
            }
        )*
    };
}

impl_int!(i8, u8, i16, u16, i32, u32, i64, u64);
impl_float!(f32, f64);

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for i8 {}
    impl Sealed for u8 {}
    impl Sealed for i16 {}
    impl Sealed for u16 {}
    impl Sealed for i32 {}
    impl Sealed for u32 {}
    impl Sealed for i64 {}
    impl Sealed for u64 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}
