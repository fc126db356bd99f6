//! 評価関数・パラメータ調整用の固定長ベクトル／小行列演算
//!
//! - [`Vector`]: 長さをコンパイル時に固定した数値ベクトル（要素ごとの演算・縮約・活性化・積和）
//! - [`simd`]: f32 用の SIMD カーネル（AVX / SSE / NEON / スカラー）。ビルド時に選択
//! - [`PackedVector`]: レジスタ常駐のアキュムレータ
//! - [`SquareMatrix`]: 行ベクトルで構成した正方行列
//! - [`determinant`] / [`symmetric_inverse`]: 余因子展開による行列式・逆行列（小次元専用）
//! - [`NormalEquations`]: 重み付き最小二乗の正規方程式
//!
//! すべて値型で、ヒープもグローバルな可変状態も持たない。インスタンスを共有しない限り
//! 複数スレッドから同期なしで使える。
//!
//! ```
//! use rshogi_linalg::{PhaseMatrix, PhaseVector, symmetric_inverse};
//!
//! let m = PhaseMatrix::from([
//!     [4.0, 1.0, 0.0, 0.0],
//!     [1.0, 3.0, 0.0, 0.0],
//!     [0.0, 0.0, 2.0, 0.0],
//!     [0.0, 0.0, 0.0, 1.0],
//! ]);
//! let b = PhaseVector::from([1.0, 2.0, 3.0, 4.0]);
//! let x = symmetric_inverse(&m)? * b;
//! assert!((m * x - b).norm_l2() < 1e-12);
//! # Ok::<(), rshogi_linalg::LinalgError>(())
//! ```

pub mod cofactor;
pub mod element;
pub mod error;
pub mod matrix;
pub mod packed;
pub mod regression;
pub mod simd;
pub mod vector;

pub use cofactor::{
    DEFAULT_SINGULAR_TOLERANCE, MAX_COFACTOR_DIM, determinant, symmetric_inverse,
    symmetric_inverse_with_tolerance,
};
pub use element::{Element, ScalarFactor};
pub use error::{LinalgError, LinalgResult};
pub use matrix::SquareMatrix;
pub use packed::{NativePackedVector, PackedVector};
pub use regression::NormalEquations;
pub use vector::{Vector, squared_differences};

/// 局面フェーズ係数ベクトルの長さ
pub const PHASE_VEC_LENGTH: usize = 4;

/// 局面フェーズ係数ベクトル
pub type PhaseVector = Vector<f64, PHASE_VEC_LENGTH>;

/// フェーズ係数の正規方程式用の行列
pub type PhaseMatrix = SquareMatrix<f64, PHASE_VEC_LENGTH>;
