//! 固定長ベクトル
//!
//! 評価関数の特徴量や局面フェーズ係数を保持する値型。
//! 長さ `N` はコンパイル時定数で、生成後に変わることはない。
//!
//! - 要素ごとの四則演算（ベクトル同士・スカラー）
//! - 集約: `sum` / `norm_l1` / `norm_l2` / `squared_distance` / `dot`
//! - 活性化関数: `relu` / `ns_prelu` / `sigmoid`
//! - 積和: `fma_scalar` / `fma_vector`
//! - CReLU による倍長化（`crelu_from`）
//!
//! 破壊的メソッドは `&mut Self` を返すので連鎖できる:
//!
//! ```
//! use rshogi_linalg::Vector;
//!
//! let mut v = Vector::<f64, 4>::from([-1.0, 2.0, -3.0, 4.0]);
//! v.relu().fma_scalar(&Vector::splat(1.0), 0.5);
//! assert_eq!(v, Vector::from([0.5, 2.5, 0.5, 4.5]));
//! ```
//!
//! `f32` の `+=` / `*=` / `relu` / `fma_*` / `dot` は [`crate::simd`] のカーネルで処理される。

use std::fmt;
use std::ops::{
    Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign,
};

use num_traits::Float;

use crate::element::{Element, ScalarFactor, rectify, scale_div, scale_mul};

/// 固定長ベクトル
#[derive(Clone, Copy, PartialEq)]
#[repr(transparent)]
pub struct Vector<T, const N: usize> {
    values: [T; N],
}

impl<T: Element, const N: usize> Vector<T, N> {
    /// ゼロベクトル
    #[inline]
    pub fn zeros() -> Self {
        Self { values: [T::zero(); N] }
    }

    /// 全要素を `value` で埋めたベクトル
    #[inline]
    pub fn splat(value: T) -> Self {
        Self { values: [value; N] }
    }

    /// CReLU による倍長化
    ///
    /// 前半 `M` 要素に `max(x, 0)`、後半 `M` 要素に `max(-x, 0)` を格納する。
    /// `N == 2 * M` でなければコンパイルエラーになる。
    ///
    /// ```
    /// use rshogi_linalg::Vector;
    ///
    /// let v = Vector::<f32, 2>::from([-1.0, 3.0]);
    /// let doubled = Vector::<f32, 4>::crelu_from(&v);
    /// assert_eq!(doubled, Vector::from([0.0, 3.0, 1.0, 0.0]));
    /// ```
    ///
    /// ```compile_fail
    /// use rshogi_linalg::Vector;
    ///
    /// let v = Vector::<f32, 2>::from([-1.0, 3.0]);
    /// let _ = Vector::<f32, 3>::crelu_from(&v);
    /// ```
    #[inline]
    pub fn crelu_from<const M: usize>(half: &Vector<T, M>) -> Self {
        const { assert!(N == 2 * M, "CReLU destination length must be exactly twice the source length") };
        let mut out = Self::zeros();
        for (i, &x) in half.values.iter().enumerate() {
            out.values[i] = rectify(x);
            out.values[i + M] = rectify(-x);
        }
        out
    }

    /// 要素数
    #[inline]
    pub const fn len(&self) -> usize {
        N
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.values
    }

    #[inline]
    pub fn as_array(&self) -> &[T; N] {
        &self.values
    }

    #[inline]
    pub fn into_array(self) -> [T; N] {
        self.values
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.values.iter()
    }

    /// 要素ごとに変換した新しいベクトル（要素型の変換にも使う）
    #[inline]
    pub fn map<U>(&self, f: impl FnMut(T) -> U) -> Vector<U, N> {
        Vector { values: self.values.map(f) }
    }

    // ------------------------------------------------------------------
    // 集約
    // ------------------------------------------------------------------

    /// 要素の総和
    #[inline]
    pub fn sum(&self) -> T {
        let mut total = T::zero();
        for &x in &self.values {
            total += x;
        }
        total
    }

    /// L1ノルム（絶対値の総和）
    #[inline]
    pub fn norm_l1(&self) -> T {
        let mut total = T::zero();
        for &x in &self.values {
            total += x.abs();
        }
        total
    }

    /// 要素ごとの差の二乗和
    #[inline]
    pub fn squared_distance(&self, other: &Self) -> T {
        let mut total = T::zero();
        for (&x, &y) in self.values.iter().zip(&other.values) {
            let d = x - y;
            total += d * d;
        }
        total
    }

    /// 内積
    ///
    /// SIMD 経路では `N` がレーン幅の倍数でなければコンパイルエラーになる。
    ///
    #[cfg_attr(
        all(not(feature = "scalar-only"), any(all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "sse"), all(target_arch = "aarch64", target_feature = "neon"))),
        doc = "```compile_fail"
    )]
    #[cfg_attr(
        not(all(not(feature = "scalar-only"), any(all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "sse"), all(target_arch = "aarch64", target_feature = "neon")))),
        doc = "```ignore"
    )]
    /// use rshogi_linalg::Vector;
    ///
    /// let v = Vector::<f32, 3>::splat(1.0);
    /// let _ = v.dot(&v);
    /// ```
    #[inline]
    pub fn dot(&self, other: &Self) -> T {
        const { assert!(N % T::LANES == 0, "dot requires a length that is a multiple of the SIMD lane width") };
        T::dot_slice(&self.values, &other.values)
    }

    /// 要素型の異なるベクトルとの内積
    ///
    /// 右辺の各要素を `T` に変換し、`T` で累積する。
    /// 低精度の入力（`i32` スコア等）を高精度（`f64`）で集計するのに使う。
    /// 常にスカラー経路で処理するため長さの制約はない。
    #[inline]
    pub fn dot_with<U: Copy + Into<T>>(&self, other: &Vector<U, N>) -> T {
        let mut total = T::zero();
        for (&x, &y) in self.values.iter().zip(&other.values) {
            total += x * y.into();
        }
        total
    }

    // ------------------------------------------------------------------
    // 活性化関数・積和（破壊的、連鎖可能）
    // ------------------------------------------------------------------

    /// `x = max(x, 0)`
    #[inline]
    pub fn relu(&mut self) -> &mut Self {
        T::relu_slice(&mut self.values);
        self
    }

    /// 非標準 PReLU: `x = max(x, x * alpha)`
    ///
    /// `alpha` の各要素が `[0, 1]` にあることが前提。範囲外の値は検査しないが、
    /// その場合は PReLU としての結果にならない（max が逆側の分岐を選ぶ）。
    #[inline]
    pub fn ns_prelu(&mut self, alpha: &Self) -> &mut Self {
        self.ns_prelu_array(&alpha.values)
    }

    /// 配列で係数を渡す版の [`Self::ns_prelu`]
    #[inline]
    pub fn ns_prelu_array(&mut self, alpha: &[T; N]) -> &mut Self {
        for (x, &a) in self.values.iter_mut().zip(alpha) {
            let leaked = *x * a;
            if leaked > *x {
                *x = leaked;
            }
        }
        self
    }

    /// `self[i] += a[i] * b`
    ///
    /// SIMD 経路では `N` がレーン幅の倍数でなければコンパイルエラーになる。
    ///
    #[cfg_attr(
        all(not(feature = "scalar-only"), any(all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "sse"), all(target_arch = "aarch64", target_feature = "neon"))),
        doc = "```compile_fail"
    )]
    #[cfg_attr(
        not(all(not(feature = "scalar-only"), any(all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "sse"), all(target_arch = "aarch64", target_feature = "neon")))),
        doc = "```ignore"
    )]
    /// use rshogi_linalg::Vector;
    ///
    /// let mut acc = Vector::<f32, 3>::zeros();
    /// acc.fma_scalar(&Vector::splat(1.0), 2.0);
    /// ```
    #[inline]
    pub fn fma_scalar(&mut self, a: &Self, b: T) -> &mut Self {
        const { assert!(N % T::LANES == 0, "fma requires a length that is a multiple of the SIMD lane width") };
        T::fma_scalar_slice(&mut self.values, &a.values, b);
        self
    }

    /// `self[i] += a[i] * b[i]`
    ///
    /// SIMD 経路では `N` がレーン幅の倍数でなければコンパイルエラーになる。
    #[inline]
    pub fn fma_vector(&mut self, a: &Self, b: &Self) -> &mut Self {
        const { assert!(N % T::LANES == 0, "fma requires a length that is a multiple of the SIMD lane width") };
        T::fma_slice(&mut self.values, &a.values, &b.values);
        self
    }

    // ------------------------------------------------------------------
    // 型の異なるスカラーとの乗除算
    // ------------------------------------------------------------------

    /// 任意の数値型スカラーで乗算する
    ///
    /// 要素・スカラーがともに整数なら `i64` で厳密に計算する。
    /// それ以外は f64 で計算して `T` に戻す（整数型は 0 方向へ切り捨て、範囲外は飽和）。
    #[inline]
    pub fn mul_scalar<S: ScalarFactor>(&mut self, rhs: S) -> &mut Self {
        for x in &mut self.values {
            *x = scale_mul(*x, rhs);
        }
        self
    }

    /// 任意の数値型スカラーで除算する
    ///
    /// 丸めは [`Self::mul_scalar`] と同じ。整数同士の除算は 0 方向へ切り捨てる。
    #[inline]
    pub fn div_scalar<S: ScalarFactor>(&mut self, rhs: S) -> &mut Self {
        for x in &mut self.values {
            *x = scale_div(*x, rhs);
        }
        self
    }
}

impl<T: Element + Float, const N: usize> Vector<T, N> {
    /// L2ノルム
    #[inline]
    pub fn norm_l2(&self) -> T {
        let mut total = T::zero();
        for &x in &self.values {
            total += x * x;
        }
        total.sqrt()
    }

    /// `x = 1 / (1 + e^-x)`
    #[inline]
    pub fn sigmoid(&mut self) -> &mut Self {
        for x in &mut self.values {
            *x = T::one() / (T::one() + (-*x).exp());
        }
        self
    }

    /// 要素ごとの平方根
    #[inline]
    pub fn sqrt(&self) -> Self {
        self.map(Float::sqrt)
    }
}

/// 要素ごとの差の二乗を並べたベクトル
#[inline]
pub fn squared_differences<T: Element, const N: usize>(
    a: &Vector<T, N>,
    b: &Vector<T, N>,
) -> Vector<T, N> {
    let mut out = *a;
    out -= b;
    let diff = out;
    out *= &diff;
    out
}

impl<T: Element, const N: usize> Default for Vector<T, N> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<T, const N: usize> From<[T; N]> for Vector<T, N> {
    #[inline]
    fn from(values: [T; N]) -> Self {
        Self { values }
    }
}

impl<T, const N: usize> From<Vector<T, N>> for [T; N] {
    #[inline]
    fn from(v: Vector<T, N>) -> Self {
        v.values
    }
}

impl<T, const N: usize> Index<usize> for Vector<T, N> {
    type Output = T;

    #[inline]
    fn index(&self, idx: usize) -> &T {
        &self.values[idx]
    }
}

impl<T, const N: usize> IndexMut<usize> for Vector<T, N> {
    #[inline]
    fn index_mut(&mut self, idx: usize) -> &mut T {
        &mut self.values[idx]
    }
}

impl<'a, T, const N: usize> IntoIterator for &'a Vector<T, N> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

// ----------------------------------------------------------------------
// 演算子
// ----------------------------------------------------------------------

impl<T: Element, const N: usize> AddAssign<&Vector<T, N>> for Vector<T, N> {
    #[inline]
    fn add_assign(&mut self, rhs: &Self) {
        T::add_assign_slice(&mut self.values, &rhs.values);
    }
}

impl<T: Element, const N: usize> SubAssign<&Vector<T, N>> for Vector<T, N> {
    #[inline]
    fn sub_assign(&mut self, rhs: &Self) {
        for (x, &y) in self.values.iter_mut().zip(&rhs.values) {
            *x -= y;
        }
    }
}

impl<T: Element, const N: usize> MulAssign<&Vector<T, N>> for Vector<T, N> {
    #[inline]
    fn mul_assign(&mut self, rhs: &Self) {
        T::mul_assign_slice(&mut self.values, &rhs.values);
    }
}

impl<T: Element, const N: usize> DivAssign<&Vector<T, N>> for Vector<T, N> {
    #[inline]
    fn div_assign(&mut self, rhs: &Self) {
        for (x, &y) in self.values.iter_mut().zip(&rhs.values) {
            *x /= y;
        }
    }
}

/// 値渡し版の複合代入と二項演算子を参照渡し版から導出する
macro_rules! impl_vector_binop {
    ($($op:ident :: $method:ident, $op_assign:ident :: $method_assign:ident;)*) => {
        $(
            impl<T: Element, const N: usize> $op_assign<Vector<T, N>> for Vector<T, N> {
                #[inline]
                fn $method_assign(&mut self, rhs: Self) {
                    $op_assign::$method_assign(self, &rhs);
                }
            }

            impl<T: Element, const N: usize> $op<&Vector<T, N>> for Vector<T, N> {
                type Output = Self;

                #[inline]
                fn $method(mut self, rhs: &Self) -> Self {
                    $op_assign::$method_assign(&mut self, rhs);
                    self
                }
            }

            impl<T: Element, const N: usize> $op<Vector<T, N>> for Vector<T, N> {
                type Output = Self;

                #[inline]
                fn $method(mut self, rhs: Self) -> Self {
                    $op_assign::$method_assign(&mut self, &rhs);
                    self
                }
            }
        )*
    };
}

impl_vector_binop! {
    Add::add, AddAssign::add_assign;
    Sub::sub, SubAssign::sub_assign;
    Mul::mul, MulAssign::mul_assign;
    Div::div, DivAssign::div_assign;
}

impl<T: Element, const N: usize> MulAssign<T> for Vector<T, N> {
    #[inline]
    fn mul_assign(&mut self, rhs: T) {
        for x in &mut self.values {
            *x *= rhs;
        }
    }
}

impl<T: Element, const N: usize> DivAssign<T> for Vector<T, N> {
    #[inline]
    fn div_assign(&mut self, rhs: T) {
        for x in &mut self.values {
            *x /= rhs;
        }
    }
}

impl<T: Element, const N: usize> Mul<T> for Vector<T, N> {
    type Output = Self;

    #[inline]
    fn mul(mut self, rhs: T) -> Self {
        self *= rhs;
        self
    }
}

impl<T: Element, const N: usize> Div<T> for Vector<T, N> {
    type Output = Self;

    #[inline]
    fn div(mut self, rhs: T) -> Self {
        self /= rhs;
        self
    }
}

/// `scalar * vector`（左辺スカラー）
macro_rules! impl_scalar_lhs_mul {
    ($($t:ty),* $(,)?) => {
        $(
            impl<const N: usize> Mul<Vector<$t, N>> for $t {
                type Output = Vector<$t, N>;

                #[inline]
                fn mul(self, rhs: Vector<$t, N>) -> Vector<$t, N> {
                    rhs * self
                }
            }
        )*
    };
}

impl_scalar_lhs_mul!(i16, i32, i64, f32, f64);

impl<T: Element, const N: usize> Neg for Vector<T, N> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        self.map(|x| -x)
    }
}

// ----------------------------------------------------------------------
// 表示: "(a,b,c)"
// ----------------------------------------------------------------------

impl<T: fmt::Display, const N: usize> fmt::Display for Vector<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, x) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{x}")?;
        }
        write!(f, ")")
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for Vector<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, x) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{x:?}")?;
        }
        write!(f, ")")
    }
}
