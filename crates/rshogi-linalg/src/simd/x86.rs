#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use super::Kernel;

/// SSE 経路（f32×4）
#[cfg(target_feature = "sse")]
#[derive(Debug, Clone, Copy)]
pub struct Sse;

#[cfg(target_feature = "sse")]
impl Kernel for Sse {
    type Register = __m128;

    const LANES: usize = 4;
    const NAME: &'static str = "sse";

    #[inline(always)]
    fn zero() -> __m128 {
        // SAFETY: target_feature = "sse" でビルドされている
        unsafe { _mm_setzero_ps() }
    }

    #[inline(always)]
    fn splat(v: f32) -> __m128 {
        // SAFETY: 同上
        unsafe { _mm_set1_ps(v) }
    }

    #[inline(always)]
    fn load(src: &[f32]) -> __m128 {
        let src = &src[..4];
        // SAFETY: 4要素の読み込み範囲はスライスで保証済み、loadu なのでアライメント不要
        unsafe { _mm_loadu_ps(src.as_ptr()) }
    }

    #[inline(always)]
    fn store(dst: &mut [f32], v: __m128) {
        let dst = &mut dst[..4];
        // SAFETY: 同上
        unsafe { _mm_storeu_ps(dst.as_mut_ptr(), v) }
    }

    #[inline(always)]
    fn add(a: __m128, b: __m128) -> __m128 {
        // SAFETY: レジスタ間演算のみ、sse はビルド時に有効
        unsafe { _mm_add_ps(a, b) }
    }

    #[inline(always)]
    fn mul(a: __m128, b: __m128) -> __m128 {
        // SAFETY: レジスタ間演算のみ、sse はビルド時に有効
        unsafe { _mm_mul_ps(a, b) }
    }

    #[inline(always)]
    fn max(a: __m128, b: __m128) -> __m128 {
        // SAFETY: レジスタ間演算のみ、sse はビルド時に有効
        unsafe { _mm_max_ps(a, b) }
    }

    /// SSE には FMA 命令がないため mul + add
    #[inline(always)]
    fn fmadd(a: __m128, b: __m128, c: __m128) -> __m128 {
        // SAFETY: レジスタ間演算のみ、sse はビルド時に有効
        unsafe { _mm_add_ps(_mm_mul_ps(a, b), c) }
    }

    /// SSEでの水平加算（f32×4 → f32）
    ///
    /// 1. 隣接ペアを入れ替えたシャッフル (2,3,0,1) と加算: [a+b, a+b, c+d, c+d]
    /// 2. 上位64bitを下位へ移動 (movehl) して下位要素のみ加算 (add_ss)
    #[inline(always)]
    fn hsum(v: __m128) -> f32 {
        // SAFETY: レジスタ間演算のみ、sse はビルド時に有効
        unsafe {
            let shuf = _mm_shuffle_ps::<0b10_11_00_01>(v, v);
            let sums = _mm_add_ps(v, shuf);
            let shuf = _mm_movehl_ps(shuf, sums);
            let sums = _mm_add_ss(sums, shuf);
            _mm_cvtss_f32(sums)
        }
    }
}

/// AVX 経路（f32×8）
#[cfg(target_feature = "avx")]
#[derive(Debug, Clone, Copy)]
pub struct Avx;

#[cfg(target_feature = "avx")]
impl Kernel for Avx {
    type Register = __m256;

    const LANES: usize = 8;
    const NAME: &'static str = "avx";

    #[inline(always)]
    fn zero() -> __m256 {
        // SAFETY: target_feature = "avx" でビルドされている
        unsafe { _mm256_setzero_ps() }
    }

    #[inline(always)]
    fn splat(v: f32) -> __m256 {
        // SAFETY: 同上
        unsafe { _mm256_set1_ps(v) }
    }

    #[inline(always)]
    fn load(src: &[f32]) -> __m256 {
        let src = &src[..8];
        // SAFETY: 8要素の読み込み範囲はスライスで保証済み、loadu なのでアライメント不要
        unsafe { _mm256_loadu_ps(src.as_ptr()) }
    }

    #[inline(always)]
    fn store(dst: &mut [f32], v: __m256) {
        let dst = &mut dst[..8];
        // SAFETY: 同上
        unsafe { _mm256_storeu_ps(dst.as_mut_ptr(), v) }
    }

    #[inline(always)]
    fn add(a: __m256, b: __m256) -> __m256 {
        // SAFETY: レジスタ間演算のみ、avx はビルド時に有効
        unsafe { _mm256_add_ps(a, b) }
    }

    #[inline(always)]
    fn mul(a: __m256, b: __m256) -> __m256 {
        // SAFETY: レジスタ間演算のみ、avx はビルド時に有効
        unsafe { _mm256_mul_ps(a, b) }
    }

    #[inline(always)]
    fn max(a: __m256, b: __m256) -> __m256 {
        // SAFETY: レジスタ間演算のみ、avx はビルド時に有効
        unsafe { _mm256_max_ps(a, b) }
    }

    /// FMA 命令が有効なら融合積和、なければ mul + add
    #[inline(always)]
    fn fmadd(a: __m256, b: __m256, c: __m256) -> __m256 {
        // SAFETY: レジスタ間演算のみ、avx (と fma) はビルド時に有効
        #[cfg(target_feature = "fma")]
        let v = unsafe { _mm256_fmadd_ps(a, b, c) };
        // SAFETY: レジスタ間演算のみ、avx はビルド時に有効
        #[cfg(not(target_feature = "fma"))]
        let v = unsafe { _mm256_add_ps(_mm256_mul_ps(a, b), c) };
        v
    }

    /// AVXでの水平加算（f32×8 → f32）
    ///
    /// 1. 上位128bitと下位128bitを加算 (extractf128 + castps256_ps128)
    /// 2. 上位64bitを下位へ移動 (movehl) して加算
    /// 3. 要素1を要素0へシャッフル (0x1) して下位要素のみ加算 (add_ss)
    #[inline(always)]
    fn hsum(v: __m256) -> f32 {
        // SAFETY: レジスタ間演算のみ、avx はビルド時に有効
        unsafe {
            let hi_quad = _mm256_extractf128_ps::<1>(v);
            let lo_quad = _mm256_castps256_ps128(v);
            let sum_quad = _mm_add_ps(lo_quad, hi_quad);

            let hi_dual = _mm_movehl_ps(sum_quad, sum_quad);
            let sum_dual = _mm_add_ps(sum_quad, hi_dual);

            let hi = _mm_shuffle_ps::<0x1>(sum_dual, sum_dual);
            let sum = _mm_add_ss(sum_dual, hi);
            _mm_cvtss_f32(sum)
        }
    }
}
