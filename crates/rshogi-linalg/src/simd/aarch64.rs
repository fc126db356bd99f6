use core::arch::aarch64::*;

use super::Kernel;

/// AArch64 NEON 経路（f32×4）
#[cfg(target_feature = "neon")]
#[derive(Debug, Clone, Copy)]
pub struct Neon;

#[cfg(target_feature = "neon")]
impl Kernel for Neon {
    type Register = float32x4_t;

    const LANES: usize = 4;
    const NAME: &'static str = "neon";

    #[inline(always)]
    fn zero() -> float32x4_t {
        // SAFETY: target_feature = "neon" でビルドされている
        unsafe { vdupq_n_f32(0.0) }
    }

    #[inline(always)]
    fn splat(v: f32) -> float32x4_t {
        // SAFETY: レジスタ間演算のみ、neon はビルド時に有効
        unsafe { vdupq_n_f32(v) }
    }

    #[inline(always)]
    fn load(src: &[f32]) -> float32x4_t {
        let src = &src[..4];
        // SAFETY: 4要素の読み込み範囲はスライスで保証済み
        unsafe { vld1q_f32(src.as_ptr()) }
    }

    #[inline(always)]
    fn store(dst: &mut [f32], v: float32x4_t) {
        let dst = &mut dst[..4];
        // SAFETY: 同上
        unsafe { vst1q_f32(dst.as_mut_ptr(), v) }
    }

    #[inline(always)]
    fn add(a: float32x4_t, b: float32x4_t) -> float32x4_t {
        // SAFETY: レジスタ間演算のみ、neon はビルド時に有効
        unsafe { vaddq_f32(a, b) }
    }

    #[inline(always)]
    fn mul(a: float32x4_t, b: float32x4_t) -> float32x4_t {
        // SAFETY: レジスタ間演算のみ、neon はビルド時に有効
        unsafe { vmulq_f32(a, b) }
    }

    /// `a > b` なら `a`、それ以外（NaN を含む）は `b`
    ///
    /// `vmaxq_f32` は NaN を伝播するため、比較とビット選択で他のバックエンドに揃える。
    #[inline(always)]
    fn max(a: float32x4_t, b: float32x4_t) -> float32x4_t {
        // SAFETY: レジスタ間演算のみ、neon はビルド時に有効
        unsafe { vbslq_f32(vcgtq_f32(a, b), a, b) }
    }

    /// `vmlaq_f32` は非融合（mul + add）
    #[inline(always)]
    fn fmadd(a: float32x4_t, b: float32x4_t, c: float32x4_t) -> float32x4_t {
        // SAFETY: レジスタ間演算のみ、neon はビルド時に有効
        unsafe { vmlaq_f32(c, a, b) }
    }

    /// NEONでの水平加算（f32×4 → f32）
    ///
    /// ペア加算 (vpaddq) を2回: [a+b, c+d, a+b, c+d] → [a+b+c+d, ...] のレーン0を取り出す
    #[inline(always)]
    fn hsum(v: float32x4_t) -> f32 {
        // SAFETY: レジスタ間演算のみ、neon はビルド時に有効
        unsafe {
            let pair = vpaddq_f32(v, v);
            let quad = vpaddq_f32(pair, pair);
            vgetq_lane_f32::<0>(quad)
        }
    }
}
