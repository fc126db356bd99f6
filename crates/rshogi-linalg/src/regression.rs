//! 重み付き最小二乗の正規方程式
//!
//! 特徴ベクトル `x`、目的値 `y`、重み `w` のサンプルを逐次加算し、
//! `XᵀWX` と `XᵀWy` を保持する。サンプル本体は保持しないので、
//! 大きな教師データでも次元 `N` に比例したメモリしか使わない。
//! スレッドごとに別々に集計して [`NormalEquations::merge`] で合算できる。

use crate::cofactor::symmetric_inverse_with_tolerance;
use crate::error::LinalgResult;
use crate::matrix::SquareMatrix;
use crate::vector::Vector;

/// 正規方程式 `(XᵀWX + λI) β = XᵀWy` のアキュムレータ
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalEquations<const N: usize> {
    xtx: SquareMatrix<f64, N>,
    xty: Vector<f64, N>,
    samples: usize,
}

impl<const N: usize> NormalEquations<N> {
    pub fn new() -> Self {
        Self {
            xtx: SquareMatrix::zeros(),
            xty: Vector::zeros(),
            samples: 0,
        }
    }

    /// サンプルを1件加算する
    ///
    /// `weight` は非負であること（検査しない）。
    pub fn add_sample(&mut self, features: &Vector<f64, N>, target: f64, weight: f64) {
        for i in 0..N {
            self.xtx[i].fma_scalar(features, features[i] * weight);
        }
        self.xty.fma_scalar(features, target * weight);
        self.samples += 1;
    }

    /// 別のアキュムレータの内容を合算する
    pub fn merge(&mut self, other: &Self) {
        self.xtx += &other.xtx;
        self.xty += &other.xty;
        self.samples += other.samples;
    }

    #[inline]
    pub fn sample_count(&self) -> usize {
        self.samples
    }

    /// `XᵀWX`
    #[inline]
    pub fn gram(&self) -> &SquareMatrix<f64, N> {
        &self.xtx
    }

    /// `XᵀWy`
    #[inline]
    pub fn moment(&self) -> &Vector<f64, N> {
        &self.xty
    }

    /// 係数 `β` を解く
    ///
    /// `ridge` は対角に加える L2 正則化項（0 なら通常の最小二乗）。
    ///
    /// # Errors
    ///
    /// 係数行列の行列式が `tolerance` 以下なら [`crate::LinalgError::SingularMatrix`]。
    /// サンプルが無い場合や特徴が線形従属な場合に起きる。
    pub fn solve(&self, ridge: f64, tolerance: f64) -> LinalgResult<Vector<f64, N>> {
        let mut system = self.xtx;
        for i in 0..N {
            system[i][i] += ridge;
        }
        let inv = symmetric_inverse_with_tolerance(&system, tolerance)?;
        Ok(inv.mul_vector(&self.xty))
    }
}

impl<const N: usize> Default for NormalEquations<N> {
    fn default() -> Self {
        Self::new()
    }
}
