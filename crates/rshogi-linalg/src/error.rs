//! 線形代数演算のエラー型
//!
//! 長さの不一致やレーン幅の制約違反はコンパイル時に検出されるため、
//! 実行時のエラーはデータに依存するもの（特異行列）だけ。

/// 線形代数演算のエラー
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum LinalgError {
    /// 行列式がゼロ（または許容誤差以下）で逆行列が存在しない
    #[error("Singular matrix: |determinant| = {determinant:e} <= tolerance {tolerance:e}")]
    SingularMatrix { determinant: f64, tolerance: f64 },
}

/// 線形代数演算の Result 型
pub type LinalgResult<T> = Result<T, LinalgError>;
