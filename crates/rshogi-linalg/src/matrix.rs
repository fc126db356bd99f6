//! 正方行列
//!
//! `N` 本の長さ `N` の [`Vector`] を行として保持する。要素 `(i, j)` は i 行 j 列。
//! 主な用途はパラメータ調整時の正規方程式（`XᵀX`）の組み立てと解法。

use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul};

use crate::element::{Element, ScalarFactor};
use crate::vector::Vector;

/// 正方行列（行ベクトルの配列）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquareMatrix<T, const N: usize> {
    rows: [Vector<T, N>; N],
}

impl<T: Element, const N: usize> SquareMatrix<T, N> {
    /// ゼロ行列
    #[inline]
    pub fn zeros() -> Self {
        Self { rows: [Vector::zeros(); N] }
    }

    /// 全要素を `value` で埋めた行列
    #[inline]
    pub fn splat(value: T) -> Self {
        Self { rows: [Vector::splat(value); N] }
    }

    /// 単位行列
    pub fn identity() -> Self {
        let mut m = Self::zeros();
        for i in 0..N {
            m.rows[i][i] = T::one();
        }
        m
    }

    /// 行ベクトルから生成
    #[inline]
    pub fn from_rows(rows: [Vector<T, N>; N]) -> Self {
        Self { rows }
    }

    /// 2次元配列（行優先）から生成
    #[inline]
    pub fn from_array(values: [[T; N]; N]) -> Self {
        Self { rows: values.map(Vector::from) }
    }

    /// 2次元配列（行優先）に変換
    #[inline]
    pub fn to_array(&self) -> [[T; N]; N] {
        self.rows.map(Vector::into_array)
    }

    #[inline]
    pub fn rows(&self) -> &[Vector<T, N>; N] {
        &self.rows
    }

    /// 要素 `(row, col)`
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.rows[row][col]
    }

    /// 転置行列を新しく返す（`self` は変更しない）
    pub fn transpose(&self) -> Self {
        let mut out = Self::zeros();
        for i in 0..N {
            for j in 0..N {
                out.rows[i][j] = self.rows[j][i];
            }
        }
        out
    }

    /// 行列・ベクトル積
    ///
    /// 各行と `v` の内積を並べたベクトルを返す。右辺の要素型は `T` に変換して累積する
    /// （例: `f64` 行列 × `i32` スコアベクトル）。
    #[inline]
    pub fn mul_vector<U: Copy + Into<T>>(&self, v: &Vector<U, N>) -> Vector<T, N> {
        let mut out = Vector::zeros();
        for (i, row) in self.rows.iter().enumerate() {
            out[i] = row.dot_with(v);
        }
        out
    }

    /// 行列積 `self * other`
    ///
    /// 右辺を転置して各行を行列・ベクトル積で処理し、結果を転置して戻す。
    /// `result[k][i] = Σ_j self[k][j] * other[j][i]` と同値。
    pub fn mul_matrix(&self, other: &Self) -> Self {
        let other_t = other.transpose();
        let mut product_t = Self::zeros();
        for (i, column) in other_t.rows.iter().enumerate() {
            product_t.rows[i] = self.mul_vector(column);
        }
        product_t.transpose()
    }

    /// 任意の数値型スカラーで除算する（丸めは [`Vector::div_scalar`] と同じ）
    pub fn div_scalar<S: ScalarFactor>(&mut self, rhs: S) -> &mut Self {
        for row in &mut self.rows {
            row.div_scalar(rhs);
        }
        self
    }
}

impl<T: Element, const N: usize> Default for SquareMatrix<T, N> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<T: Element, const N: usize> From<[[T; N]; N]> for SquareMatrix<T, N> {
    fn from(values: [[T; N]; N]) -> Self {
        Self::from_array(values)
    }
}

impl<T, const N: usize> Index<usize> for SquareMatrix<T, N> {
    type Output = Vector<T, N>;

    #[inline]
    fn index(&self, row: usize) -> &Vector<T, N> {
        &self.rows[row]
    }
}

impl<T, const N: usize> IndexMut<usize> for SquareMatrix<T, N> {
    #[inline]
    fn index_mut(&mut self, row: usize) -> &mut Vector<T, N> {
        &mut self.rows[row]
    }
}

impl<T: Element, const N: usize> AddAssign<&SquareMatrix<T, N>> for SquareMatrix<T, N> {
    #[inline]
    fn add_assign(&mut self, rhs: &Self) {
        for (row, other) in self.rows.iter_mut().zip(&rhs.rows) {
            *row += other;
        }
    }
}

impl<T: Element, const N: usize> AddAssign for SquareMatrix<T, N> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self += &rhs;
    }
}

impl<T: Element, const N: usize> Add for SquareMatrix<T, N> {
    type Output = Self;

    #[inline]
    fn add(mut self, rhs: Self) -> Self {
        self += &rhs;
        self
    }
}

impl<T: Element, const N: usize> DivAssign<T> for SquareMatrix<T, N> {
    #[inline]
    fn div_assign(&mut self, rhs: T) {
        for row in &mut self.rows {
            *row /= rhs;
        }
    }
}

impl<T: Element, const N: usize> Div<T> for SquareMatrix<T, N> {
    type Output = Self;

    #[inline]
    fn div(mut self, rhs: T) -> Self {
        self /= rhs;
        self
    }
}

impl<T: Element, const N: usize> Mul<Vector<T, N>> for SquareMatrix<T, N> {
    type Output = Vector<T, N>;

    #[inline]
    fn mul(self, rhs: Vector<T, N>) -> Vector<T, N> {
        self.mul_vector(&rhs)
    }
}

impl<T: Element, const N: usize> Mul<&Vector<T, N>> for &SquareMatrix<T, N> {
    type Output = Vector<T, N>;

    #[inline]
    fn mul(self, rhs: &Vector<T, N>) -> Vector<T, N> {
        self.mul_vector(rhs)
    }
}

impl<T: Element, const N: usize> Mul for SquareMatrix<T, N> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        self.mul_matrix(&rhs)
    }
}

impl<T: Element, const N: usize> Mul for &SquareMatrix<T, N> {
    type Output = SquareMatrix<T, N>;

    #[inline]
    fn mul(self, rhs: Self) -> SquareMatrix<T, N> {
        self.mul_matrix(rhs)
    }
}

/// 1行ずつ改行して表示
impl<T: fmt::Display, const N: usize> fmt::Display for SquareMatrix<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}
