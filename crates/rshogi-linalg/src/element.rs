//! ベクトル・行列の要素型
//!
//! 浮動小数点（`f32` / `f64`）と整数スコア型（`i16` / `i32` / `i64`）を同じ
//! [`Element`] トレイトで扱う。スライス単位の演算はトレイトのデフォルト実装
//! （スカラーループ）で提供し、`f32` だけが [`crate::simd`] のカーネルで上書きする。
//! `Vector` 側はどの要素型でも同じメソッドを呼ぶだけでよい。

use std::fmt;

use num_traits::{AsPrimitive, NumAssign, Signed};

use crate::simd::{self, Kernel, NativeKernel};

/// ベクトル・行列の要素型
pub trait Element:
    Copy
    + Default
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Signed
    + NumAssign
    + AsPrimitive<f64>
    + Send
    + Sync
    + 'static
{
    /// `fma` / `dot` が要求する長さの単位
    ///
    /// SIMD で処理する型ではレーン幅、それ以外は 1。
    const LANES: usize = 1;

    /// f64 からの変換（整数型は 0 方向へ切り捨て、範囲外は飽和）
    fn from_f64(v: f64) -> Self;

    /// 整数型なら `i64` として返す（浮動小数点型は `None`）
    #[inline(always)]
    fn to_exact_i64(self) -> Option<i64> {
        None
    }

    /// `i64` から損失なく変換できれば返す（浮動小数点型は `None`）
    #[inline(always)]
    fn from_exact_i64(_v: i64) -> Option<Self> {
        None
    }

    #[inline]
    fn add_assign_slice(dst: &mut [Self], src: &[Self]) {
        for (d, &s) in dst.iter_mut().zip(src) {
            *d += s;
        }
    }

    #[inline]
    fn mul_assign_slice(dst: &mut [Self], src: &[Self]) {
        for (d, &s) in dst.iter_mut().zip(src) {
            *d *= s;
        }
    }

    #[inline]
    fn relu_slice(dst: &mut [Self]) {
        for d in dst {
            *d = rectify(*d);
        }
    }

    /// `dst[i] += a[i] * b`
    #[inline]
    fn fma_scalar_slice(dst: &mut [Self], a: &[Self], b: Self) {
        for (d, &x) in dst.iter_mut().zip(a) {
            *d += x * b;
        }
    }

    /// `dst[i] += a[i] * b[i]`
    #[inline]
    fn fma_slice(dst: &mut [Self], a: &[Self], b: &[Self]) {
        for ((d, &x), &y) in dst.iter_mut().zip(a).zip(b) {
            *d += x * y;
        }
    }

    #[inline]
    fn dot_slice(a: &[Self], b: &[Self]) -> Self {
        let mut sum = Self::zero();
        for (&x, &y) in a.iter().zip(b) {
            sum += x * y;
        }
        sum
    }
}

/// `mul_scalar` / `div_scalar` に渡せる任意の数値型スカラー
pub trait ScalarFactor: Copy + AsPrimitive<f64> {
    /// 整数なら `i64` として返す（浮動小数点や `i64` に収まらない値は `None`）
    fn integer_value(self) -> Option<i64>;
}

macro_rules! impl_integer_factor {
    ($($t:ty),* $(,)?) => {
        $(
            impl ScalarFactor for $t {
                #[inline(always)]
                fn integer_value(self) -> Option<i64> {
                    i64::try_from(self).ok()
                }
            }
        )*
    };
}

impl_integer_factor!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl ScalarFactor for f32 {
    #[inline(always)]
    fn integer_value(self) -> Option<i64> {
        None
    }
}

impl ScalarFactor for f64 {
    #[inline(always)]
    fn integer_value(self) -> Option<i64> {
        None
    }
}

/// 要素・スカラーがともに整数なら `i64` で厳密に計算する
///
/// 演算が `None`（オーバーフロー・ゼロ除算）を返した場合や
/// 結果が要素型に収まらない場合も `None`。
#[inline]
fn exact_integer_op<T: Element, S: ScalarFactor>(
    x: T,
    rhs: S,
    op: fn(i64, i64) -> Option<i64>,
) -> Option<T> {
    T::from_exact_i64(op(x.to_exact_i64()?, rhs.integer_value()?)?)
}

/// `x * rhs`（整数同士は厳密、それ以外は f64 で計算して `T` に戻す）
#[inline]
pub(crate) fn scale_mul<T: Element, S: ScalarFactor>(x: T, rhs: S) -> T {
    exact_integer_op(x, rhs, i64::checked_mul).unwrap_or_else(|| {
        let lhs: f64 = x.as_();
        let rhs: f64 = rhs.as_();
        T::from_f64(lhs * rhs)
    })
}

/// `x / rhs`（整数同士は 0 方向へ切り捨てる厳密な除算）
#[inline]
pub(crate) fn scale_div<T: Element, S: ScalarFactor>(x: T, rhs: S) -> T {
    exact_integer_op(x, rhs, i64::checked_div).unwrap_or_else(|| {
        let lhs: f64 = x.as_();
        let rhs: f64 = rhs.as_();
        T::from_f64(lhs / rhs)
    })
}

/// `max(x, 0)`
#[inline(always)]
pub(crate) fn rectify<T: Element>(x: T) -> T {
    if x > T::zero() { x } else { T::zero() }
}

macro_rules! impl_integer_element {
    ($($t:ty),* $(,)?) => {
        $(
            impl Element for $t {
                #[inline(always)]
                fn from_f64(v: f64) -> Self {
                    v as $t
                }

                #[inline(always)]
                fn to_exact_i64(self) -> Option<i64> {
                    Some(i64::from(self))
                }

                #[inline(always)]
                fn from_exact_i64(v: i64) -> Option<Self> {
                    <$t>::try_from(v).ok()
                }
            }
        )*
    };
}

impl_integer_element!(i16, i32, i64);

impl Element for f64 {
    #[inline(always)]
    fn from_f64(v: f64) -> Self {
        v
    }
}

impl Element for f32 {
    const LANES: usize = NativeKernel::LANES;

    #[inline(always)]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn add_assign_slice(dst: &mut [f32], src: &[f32]) {
        simd::add_assign::<NativeKernel>(dst, src);
    }

    #[inline]
    fn mul_assign_slice(dst: &mut [f32], src: &[f32]) {
        simd::mul_assign::<NativeKernel>(dst, src);
    }

    #[inline]
    fn relu_slice(dst: &mut [f32]) {
        simd::relu::<NativeKernel>(dst);
    }

    #[inline]
    fn fma_scalar_slice(dst: &mut [f32], a: &[f32], b: f32) {
        simd::fma_scalar::<NativeKernel>(dst, a, b);
    }

    #[inline]
    fn fma_slice(dst: &mut [f32], a: &[f32], b: &[f32]) {
        simd::fma::<NativeKernel>(dst, a, b);
    }

    #[inline]
    fn dot_slice(a: &[f32], b: &[f32]) -> f32 {
        simd::dot::<NativeKernel>(a, b)
    }
}
