//! レジスタ常駐ベクトル
//!
//! f32 ベクトルを SIMD レジスタの配列として保持し、積和を繰り返す間
//! メモリへの load/store を挟まないようにする。差分評価のアキュムレータのように
//! 同じベクトルへ何度も `fma` を重ねる用途向け。
//!
//! [`Vector`] との変換は [`PackedVector::load`] / [`PackedVector::store`] で
//! 明示的に行う。長さは `REGS * K::LANES` で、一致しない `N` はコンパイルエラー。

use std::fmt;
use std::ops::AddAssign;

use crate::simd::{Kernel, NativeKernel};
use crate::vector::Vector;

/// レジスタ `REGS` 本分の f32 ベクトル（長さ `REGS * K::LANES`）
pub struct PackedVector<K: Kernel, const REGS: usize> {
    regs: [K::Register; REGS],
}

/// ビルド時に選択されたバックエンドのレジスタ常駐ベクトル
pub type NativePackedVector<const REGS: usize> = PackedVector<NativeKernel, REGS>;

impl<K: Kernel, const REGS: usize> PackedVector<K, REGS> {
    /// 要素数
    pub const LEN: usize = REGS * K::LANES;

    #[inline]
    pub fn zeros() -> Self {
        Self { regs: [K::zero(); REGS] }
    }

    /// スカラー形式のベクトルをレジスタへ読み込む
    ///
    /// `N != REGS * K::LANES` はコンパイルエラー:
    ///
    /// ```compile_fail
    /// use rshogi_linalg::{PackedVector, Vector, simd::Scalar};
    ///
    /// let _ = PackedVector::<Scalar, 2>::load(&Vector::<f32, 3>::zeros());
    /// ```
    #[inline]
    pub fn load<const N: usize>(v: &Vector<f32, N>) -> Self {
        const { assert!(N == REGS * K::LANES, "packed length must equal REGS * LANES") };
        let src = v.as_slice();
        let mut regs = [K::zero(); REGS];
        for (i, reg) in regs.iter_mut().enumerate() {
            *reg = K::load(&src[i * K::LANES..]);
        }
        Self { regs }
    }

    /// レジスタの内容をスカラー形式のベクトルへ書き出す
    #[inline]
    pub fn store<const N: usize>(&self) -> Vector<f32, N> {
        const { assert!(N == REGS * K::LANES, "packed length must equal REGS * LANES") };
        let mut out = Vector::zeros();
        let dst = out.as_mut_slice();
        for (i, &reg) in self.regs.iter().enumerate() {
            K::store(&mut dst[i * K::LANES..], reg);
        }
        out
    }

    #[inline]
    pub fn relu(&mut self) -> &mut Self {
        let zero = K::zero();
        for reg in &mut self.regs {
            *reg = K::max(*reg, zero);
        }
        self
    }

    /// `self += a * b`（`a` はスカラー形式、レジスタへ読みながら積和する）
    #[inline]
    pub fn fma_scalar<const N: usize>(&mut self, a: &Vector<f32, N>, b: f32) -> &mut Self {
        const { assert!(N == REGS * K::LANES, "packed length must equal REGS * LANES") };
        let vb = K::splat(b);
        let src = a.as_slice();
        for (i, reg) in self.regs.iter_mut().enumerate() {
            *reg = K::fmadd(K::load(&src[i * K::LANES..]), vb, *reg);
        }
        self
    }

    /// `self += a * b`（`a` もレジスタ常駐）
    #[inline]
    pub fn fma_packed(&mut self, a: &Self, b: f32) -> &mut Self {
        let vb = K::splat(b);
        for (reg, &va) in self.regs.iter_mut().zip(&a.regs) {
            *reg = K::fmadd(va, vb, *reg);
        }
        self
    }

    /// 内積（レジスタごとに積和してから1回だけ水平加算する）
    #[inline]
    pub fn dot(&self, other: &Self) -> f32 {
        let mut acc = K::zero();
        for (&a, &b) in self.regs.iter().zip(&other.regs) {
            acc = K::fmadd(a, b, acc);
        }
        K::hsum(acc)
    }

    fn lanes(&self) -> Vec<f32> {
        let mut out = vec![0.0; Self::LEN];
        for (chunk, &reg) in out.chunks_exact_mut(K::LANES).zip(&self.regs) {
            K::store(chunk, reg);
        }
        out
    }
}

impl<K: Kernel, const REGS: usize> Clone for PackedVector<K, REGS> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: Kernel, const REGS: usize> Copy for PackedVector<K, REGS> {}

impl<K: Kernel, const REGS: usize> Default for PackedVector<K, REGS> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<K: Kernel, const REGS: usize> AddAssign<&PackedVector<K, REGS>> for PackedVector<K, REGS> {
    #[inline]
    fn add_assign(&mut self, rhs: &Self) {
        for (reg, &other) in self.regs.iter_mut().zip(&rhs.regs) {
            *reg = K::add(*reg, other);
        }
    }
}

impl<K: Kernel, const REGS: usize> AddAssign for PackedVector<K, REGS> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self += &rhs;
    }
}

impl<K: Kernel, const REGS: usize> fmt::Debug for PackedVector<K, REGS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", K::NAME)?;
        for (i, v) in self.lanes().iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{v}")?;
        }
        f.write_str(")")
    }
}
