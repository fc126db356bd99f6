use super::Kernel;

/// スカラー経路（f32×1）
///
/// SIMD 非対応環境および `scalar-only` ビルドで使用する。
/// 各バックエンドの結果を照合する基準実装でもある。
#[derive(Debug, Clone, Copy)]
pub struct Scalar;

impl Kernel for Scalar {
    type Register = f32;

    const LANES: usize = 1;
    const NAME: &'static str = "scalar";

    #[inline(always)]
    fn zero() -> f32 {
        0.0
    }

    #[inline(always)]
    fn splat(v: f32) -> f32 {
        v
    }

    #[inline(always)]
    fn load(src: &[f32]) -> f32 {
        src[0]
    }

    #[inline(always)]
    fn store(dst: &mut [f32], v: f32) {
        dst[0] = v;
    }

    #[inline(always)]
    fn add(a: f32, b: f32) -> f32 {
        a + b
    }

    #[inline(always)]
    fn mul(a: f32, b: f32) -> f32 {
        a * b
    }

    /// `maxps` と同じく、比較不能（NaN）の場合は `b` を返す
    #[inline(always)]
    fn max(a: f32, b: f32) -> f32 {
        if a > b { a } else { b }
    }

    #[inline(always)]
    fn fmadd(a: f32, b: f32, c: f32) -> f32 {
        a * b + c
    }

    #[inline(always)]
    fn hsum(v: f32) -> f32 {
        v
    }
}
