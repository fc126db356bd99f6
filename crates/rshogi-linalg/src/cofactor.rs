//! 余因子展開による行列式・逆行列
//!
//! 1列目に沿ったラプラス展開を再帰的に行う。計算量は O(N!) なので、
//! 局面フェーズ係数（N=4）のような小さい固定次元専用であり、
//! [`MAX_COFACTOR_DIM`] を超える次元はコンパイルエラーにしている。
//!
//! 小行列は `[[T; N]; N]` の左上 `dim × dim` 部分に詰めて保持する
//! （次元 `N - 1` の型をコンパイル時に作らずに済むように）。

use num_traits::{AsPrimitive, Float};

use crate::element::Element;
use crate::error::{LinalgError, LinalgResult};
use crate::matrix::SquareMatrix;

/// 余因子展開で扱う最大次元（8! = 40320 項）
pub const MAX_COFACTOR_DIM: usize = 8;

/// 特異判定の既定の許容誤差（`|det| <= tolerance` を特異とみなす）
pub const DEFAULT_SINGULAR_TOLERANCE: f64 = 1e-12;

/// 左上 `dim × dim` 部分から `skip_row` 行と `skip_col` 列を除いた小行列
fn minor<T: Element, const N: usize>(
    m: &[[T; N]; N],
    dim: usize,
    skip_row: usize,
    skip_col: usize,
) -> [[T; N]; N] {
    let mut out = [[T::zero(); N]; N];
    for (dst_row, src_row) in (0..dim).filter(|&u| u != skip_row).enumerate() {
        for (dst_col, src_col) in (0..dim).filter(|&v| v != skip_col).enumerate() {
            out[dst_row][dst_col] = m[src_row][src_col];
        }
    }
    out
}

/// 左上 `dim × dim` 部分の行列式（1列目に沿ったラプラス展開）
///
/// `dim == 0` は空行列として 1 を返す（1×1 行列の余因子に使う）。
fn laplace<T: Element, const N: usize>(m: &[[T; N]; N], dim: usize) -> T {
    match dim {
        0 => T::one(),
        1 => m[0][0],
        _ => {
            let mut det = T::zero();
            for i in 0..dim {
                let term = m[i][0] * laplace(&minor(m, dim, i, 0), dim - 1);
                if i % 2 == 1 {
                    det -= term;
                } else {
                    det += term;
                }
            }
            det
        }
    }
}

/// 余因子 `(-1)^(i+j) * det(minor(i, j))`
fn cofactor<T: Element, const N: usize>(m: &[[T; N]; N], row: usize, col: usize) -> T {
    let det = laplace(&minor(m, N, row, col), N - 1);
    if (row + col) % 2 == 1 { -det } else { det }
}

/// 行列式
///
/// `N` は 1 以上 [`MAX_COFACTOR_DIM`] 以下（範囲外はコンパイルエラー）。
pub fn determinant<T: Element, const N: usize>(mat: &SquareMatrix<T, N>) -> T {
    const {
        assert!(
            N >= 1 && N <= MAX_COFACTOR_DIM,
            "cofactor expansion is only for small fixed dimensions"
        )
    };
    laplace(&mat.to_array(), N)
}

/// 対称行列の逆行列（許容誤差は [`DEFAULT_SINGULAR_TOLERANCE`]）
///
/// 詳細は [`symmetric_inverse_with_tolerance`] を参照。
pub fn symmetric_inverse<T: Element + Float, const N: usize>(
    mat: &SquareMatrix<T, N>,
) -> LinalgResult<SquareMatrix<T, N>> {
    symmetric_inverse_with_tolerance(mat, DEFAULT_SINGULAR_TOLERANCE)
}

/// 対称行列の逆行列（余因子行列の転置 / 行列式）
///
/// 呼び出し側が対称（正定値または半正定値）であると分かっている行列専用。
/// 対称性は検査しない。正規方程式の係数行列 `XᵀX` が典型的な入力。
///
/// 余因子行列を作ったあと、上三角と下三角をその場で入れ替えて随伴行列にする。
///
/// # Errors
///
/// `|det| <= tolerance`、行列式が有限でない、または除算結果に NaN/Inf が
/// 含まれる場合は [`LinalgError::SingularMatrix`] を返す（NaN/Inf を含む行列は返さない）。
pub fn symmetric_inverse_with_tolerance<T: Element + Float, const N: usize>(
    mat: &SquareMatrix<T, N>,
    tolerance: f64,
) -> LinalgResult<SquareMatrix<T, N>> {
    const {
        assert!(
            N >= 1 && N <= MAX_COFACTOR_DIM,
            "cofactor expansion is only for small fixed dimensions"
        )
    };

    let m = mat.to_array();
    let det = laplace(&m, N);
    let det_f64: f64 = det.as_();
    if !det_f64.is_finite() || det_f64.abs() <= tolerance {
        return Err(singular::<N>(det_f64, tolerance));
    }

    let mut adj = [[T::zero(); N]; N];
    for (i, row) in adj.iter_mut().enumerate() {
        for (j, value) in row.iter_mut().enumerate() {
            *value = cofactor(&m, i, j);
        }
    }
    // 余因子行列 → 随伴行列（転置）
    for i in 0..N {
        for j in (i + 1)..N {
            let upper = adj[i][j];
            adj[i][j] = adj[j][i];
            adj[j][i] = upper;
        }
    }

    let mut inv = SquareMatrix::from_array(adj);
    inv /= det;
    // 行列式が有限でも「余因子 / det」がオーバーフローしうる
    if !inv.rows().iter().all(|row| row.iter().all(|x| x.is_finite())) {
        return Err(singular::<N>(det_f64, tolerance));
    }
    Ok(inv)
}

fn singular<const N: usize>(determinant: f64, tolerance: f64) -> LinalgError {
    log::debug!(
        "symmetric_inverse: singular {N}x{N} matrix (det={determinant:e}, tolerance={tolerance:e})"
    );
    LinalgError::SingularMatrix {
        determinant,
        tolerance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Vector;

    fn assert_close<const N: usize>(a: &SquareMatrix<f64, N>, b: &SquareMatrix<f64, N>, eps: f64) {
        for i in 0..N {
            for j in 0..N {
                assert!(
                    (a.get(i, j) - b.get(i, j)).abs() < eps,
                    "mismatch at ({i},{j}): {} vs {}",
                    a.get(i, j),
                    b.get(i, j)
                );
            }
        }
    }

    #[test]
    fn test_determinant_small() {
        assert_eq!(determinant(&SquareMatrix::from([[5.0]])), 5.0);
        assert_eq!(determinant(&SquareMatrix::from([[2.0, 0.0], [0.0, 3.0]])), 6.0);
        assert_eq!(determinant(&SquareMatrix::from([[1, 2], [3, 4]])), -2);
        assert_eq!(
            determinant(&SquareMatrix::from([[2, -3, 1], [2, 0, -1], [1, 4, 5]])),
            49
        );
    }

    #[test]
    fn test_determinant_diagonal() {
        let mut m = SquareMatrix::<f64, 5>::zeros();
        let diag = [2.0, -1.5, 3.0, 0.5, 4.0];
        for (i, &d) in diag.iter().enumerate() {
            m[i][i] = d;
        }
        let expected: f64 = diag.iter().product();
        assert!((determinant(&m) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_determinant_sign_from_row_swap() {
        let m = SquareMatrix::from([[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        assert_eq!(determinant(&m), -1.0);
    }

    #[test]
    fn test_inverse_diagonal_2x2() {
        let m = SquareMatrix::from([[2.0, 0.0], [0.0, 3.0]]);
        let inv = symmetric_inverse(&m).unwrap();
        assert_close(&inv, &SquareMatrix::from([[0.5, 0.0], [0.0, 1.0 / 3.0]]), 1e-15);
    }

    #[test]
    fn test_inverse_1x1() {
        let inv = symmetric_inverse(&SquareMatrix::from([[5.0]])).unwrap();
        assert!((inv.get(0, 0) - 0.2).abs() < 1e-15);
    }

    #[test]
    fn test_inverse_symmetric_4x4() {
        let m = SquareMatrix::from([
            [4.0, 1.0, 0.5, 0.0],
            [1.0, 3.0, 0.25, 0.5],
            [0.5, 0.25, 2.0, 0.1],
            [0.0, 0.5, 0.1, 1.5],
        ]);
        let inv = symmetric_inverse(&m).unwrap();
        assert_close(&(m * inv), &SquareMatrix::identity(), 1e-12);
        assert_close(&(inv * m), &SquareMatrix::identity(), 1e-12);
        // 対称行列の逆行列は対称
        assert_close(&inv, &inv.transpose(), 1e-12);
    }

    #[test]
    fn test_inverse_f32() {
        let m = SquareMatrix::<f32, 2>::from([[4.0, 2.0], [2.0, 3.0]]);
        let inv = symmetric_inverse(&m).unwrap();
        let id = m * inv;
        assert!((id.get(0, 0) - 1.0).abs() < 1e-6);
        assert!(id.get(0, 1).abs() < 1e-6);
    }

    #[test]
    fn test_singular_matrix_is_error() {
        let m = SquareMatrix::from([[1.0, 2.0], [2.0, 4.0]]);
        let err = symmetric_inverse(&m).unwrap_err();
        assert!(matches!(err, LinalgError::SingularMatrix { determinant, .. } if determinant == 0.0));

        let zero = SquareMatrix::<f64, 3>::zeros();
        assert!(symmetric_inverse(&zero).is_err());
    }

    #[test]
    fn test_near_singular_respects_tolerance() {
        let m = SquareMatrix::from([[1e-8, 0.0], [0.0, 1e-8]]);
        // det = 1e-16 は既定の許容誤差では特異
        assert!(symmetric_inverse(&m).is_err());
        // 許容誤差を下げれば解ける
        let inv = symmetric_inverse_with_tolerance(&m, 1e-20).unwrap();
        assert!((inv.get(0, 0) - 1e8).abs() < 1e-4);
    }

    #[test]
    fn test_non_finite_determinant_is_error() {
        let m = SquareMatrix::from([[f64::NAN, 0.0], [0.0, 1.0]]);
        assert!(symmetric_inverse(&m).is_err());
    }

    #[test]
    fn test_overflowing_inverse_is_error() {
        // det = 0.1 は許容誤差より大きいが、1 / 1e-309 は f64 で表せない
        let m = SquareMatrix::<f64, 2>::from([[1e-309, 0.0], [0.0, 1e308]]);
        let err = symmetric_inverse(&m).unwrap_err();
        assert!(matches!(err, LinalgError::SingularMatrix { determinant, .. } if determinant > 0.0));
    }

    #[test]
    fn test_inverse_solves_system() {
        let m = SquareMatrix::from([[2.0, 1.0], [1.0, 3.0]]);
        let b = Vector::from([3.0, 5.0]);
        let x = symmetric_inverse(&m).unwrap() * b;
        // 2x + y = 3, x + 3y = 5 → x = 0.8, y = 1.4
        assert!((x[0] - 0.8).abs() < 1e-12);
        assert!((x[1] - 1.4).abs() < 1e-12);
    }
}
