//! f32 SIMD カーネル
//!
//! レジスタ幅ごとの基本命令（load/store/加算/乗算/max/積和/水平加算）を
//! [`Kernel`] トレイトとして抽象化し、スライス単位の演算はここで一度だけ記述する。
//!
//! 使用するバックエンドはビルド時の `target_feature` で決まる（実行時検出はしない）:
//! 1. AVX: f32×8
//! 2. SSE: f32×4
//! 3. NEON (aarch64): f32×4
//! 4. スカラー: f32×1
//!
//! `scalar-only` フィーチャ有効時は常にスカラー経路になる。
//! どのバックエンドが選ばれても呼び出し側のコードは変わらない。
//!
//! AVX を使う場合は `RUSTFLAGS="-C target-cpu=native"` 等でビルドする。

mod scalar;

#[cfg(target_arch = "aarch64")]
mod aarch64;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod x86;

pub use scalar::Scalar;

#[cfg(all(target_arch = "aarch64", target_feature = "neon"))]
pub use aarch64::Neon;
#[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "avx"))]
pub use x86::Avx;
#[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "sse"))]
pub use x86::Sse;

/// SIMD レジスタ1本分の基本演算
///
/// `load` / `store` は先頭 `LANES` 要素だけを読み書きする。
/// スライスが `LANES` より短い場合は panic する（未定義動作にはしない）。
pub trait Kernel: Copy + Send + Sync + 'static {
    /// レジスタ型（スカラー経路では `f32` そのもの）
    type Register: Copy;

    /// 1レジスタあたりの f32 要素数
    const LANES: usize;

    /// バックエンド名（ログ・ベンチマーク表示用）
    const NAME: &'static str;

    fn zero() -> Self::Register;
    fn splat(v: f32) -> Self::Register;
    fn load(src: &[f32]) -> Self::Register;
    fn store(dst: &mut [f32], v: Self::Register);
    fn add(a: Self::Register, b: Self::Register) -> Self::Register;
    fn mul(a: Self::Register, b: Self::Register) -> Self::Register;

    /// レーンごとに `a > b` なら `a`、それ以外は `b`（比較不能な NaN は `b`）
    fn max(a: Self::Register, b: Self::Register) -> Self::Register;

    /// `a * b + c`
    fn fmadd(a: Self::Register, b: Self::Register, c: Self::Register) -> Self::Register;

    /// 全レーンの総和
    fn hsum(v: Self::Register) -> f32;
}

#[cfg(all(
    not(feature = "scalar-only"),
    any(target_arch = "x86", target_arch = "x86_64"),
    target_feature = "avx"
))]
pub type NativeKernel = Avx;

#[cfg(all(
    not(feature = "scalar-only"),
    any(target_arch = "x86", target_arch = "x86_64"),
    target_feature = "sse",
    not(target_feature = "avx")
))]
pub type NativeKernel = Sse;

#[cfg(all(
    not(feature = "scalar-only"),
    target_arch = "aarch64",
    target_feature = "neon"
))]
pub type NativeKernel = Neon;

#[cfg(any(
    feature = "scalar-only",
    not(any(
        all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "sse"),
        all(target_arch = "aarch64", target_feature = "neon")
    ))
))]
pub type NativeKernel = Scalar;

/// ビルド時に選択されたバックエンドのレーン幅
pub const LANES: usize = NativeKernel::LANES;

/// ビルド時に選択されたバックエンド名
#[inline]
pub fn backend_name() -> &'static str {
    NativeKernel::NAME
}

/// 2本のスライスに対するレーン単位の二項演算
///
/// 本体は `K::LANES` 要素ずつレジスタで処理し、端数はスカラーで処理する。
#[inline(always)]
fn zip_lanes<K: Kernel>(
    dst: &mut [f32],
    src: &[f32],
    op: impl Fn(K::Register, K::Register) -> K::Register,
    tail: impl Fn(f32, f32) -> f32,
) {
    debug_assert_eq!(dst.len(), src.len());
    let body = dst.len() / K::LANES * K::LANES;
    let (dst_body, dst_tail) = dst.split_at_mut(body);
    let (src_body, src_tail) = src.split_at(body);

    for (d, s) in dst_body.chunks_exact_mut(K::LANES).zip(src_body.chunks_exact(K::LANES)) {
        let v = op(K::load(d), K::load(s));
        K::store(d, v);
    }
    for (d, &s) in dst_tail.iter_mut().zip(src_tail) {
        *d = tail(*d, s);
    }
}

/// `dst[i] += src[i]`
#[inline]
pub fn add_assign<K: Kernel>(dst: &mut [f32], src: &[f32]) {
    zip_lanes::<K>(dst, src, K::add, |d, s| d + s);
}

/// `dst[i] *= src[i]`
#[inline]
pub fn mul_assign<K: Kernel>(dst: &mut [f32], src: &[f32]) {
    zip_lanes::<K>(dst, src, K::mul, |d, s| d * s);
}

/// `dst[i] = max(dst[i], 0)`
#[inline]
pub fn relu<K: Kernel>(dst: &mut [f32]) {
    let zero = K::zero();
    let body = dst.len() / K::LANES * K::LANES;
    let (dst_body, dst_tail) = dst.split_at_mut(body);

    for d in dst_body.chunks_exact_mut(K::LANES) {
        let v = K::max(K::load(d), zero);
        K::store(d, v);
    }
    for d in dst_tail {
        *d = if *d > 0.0 { *d } else { 0.0 };
    }
}

/// `dst[i] += a[i] * b`
#[inline]
pub fn fma_scalar<K: Kernel>(dst: &mut [f32], a: &[f32], b: f32) {
    let vb = K::splat(b);
    zip_lanes::<K>(dst, a, |d, va| K::fmadd(va, vb, d), |d, x| d + x * b);
}

/// `dst[i] += a[i] * b[i]`
#[inline]
pub fn fma<K: Kernel>(dst: &mut [f32], a: &[f32], b: &[f32]) {
    debug_assert_eq!(dst.len(), a.len());
    debug_assert_eq!(dst.len(), b.len());
    let body = dst.len() / K::LANES * K::LANES;

    for ((d, x), y) in dst[..body]
        .chunks_exact_mut(K::LANES)
        .zip(a[..body].chunks_exact(K::LANES))
        .zip(b[..body].chunks_exact(K::LANES))
    {
        let v = K::fmadd(K::load(x), K::load(y), K::load(d));
        K::store(d, v);
    }
    for i in body..dst.len() {
        dst[i] += a[i] * b[i];
    }
}

/// 内積 `Σ a[i] * b[i]`
///
/// レーンごとの部分和を1本のレジスタに積和し、最後に [`Kernel::hsum`] で畳み込む。
/// 加算順序がスカラー版と異なるため、結果はビット一致しない（誤差は丸め程度）。
#[inline]
pub fn dot<K: Kernel>(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let body = a.len() / K::LANES * K::LANES;

    let mut acc = K::zero();
    for (x, y) in a[..body].chunks_exact(K::LANES).zip(b[..body].chunks_exact(K::LANES)) {
        acc = K::fmadd(K::load(x), K::load(y), acc);
    }
    let mut sum = K::hsum(acc);
    for (x, y) in a[body..].iter().zip(&b[body..]) {
        sum += x * y;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(len: usize, seed: f32) -> Vec<f32> {
        (0..len).map(|i| ((i as f32 + seed) * 0.37).sin()).collect()
    }

    fn check_kernel<K: Kernel>() {
        // 端数処理も通るよう LANES の倍数でない長さを含める
        for len in [0usize, 1, 3, 4, 7, 8, 13, 16, 33] {
            let a = sample(len, 1.0);
            let b = sample(len, 5.0);

            let mut got = a.clone();
            add_assign::<K>(&mut got, &b);
            for i in 0..len {
                assert_eq!(got[i], a[i] + b[i], "{} add len={len} i={i}", K::NAME);
            }

            let mut got = a.clone();
            mul_assign::<K>(&mut got, &b);
            for i in 0..len {
                assert_eq!(got[i], a[i] * b[i], "{} mul len={len} i={i}", K::NAME);
            }

            let mut got = a.clone();
            relu::<K>(&mut got);
            for i in 0..len {
                assert_eq!(got[i], a[i].max(0.0), "{} relu len={len} i={i}", K::NAME);
            }

            let mut got = vec![0.5f32; len];
            fma_scalar::<K>(&mut got, &a, 0.25);
            for i in 0..len {
                assert!((got[i] - (0.5 + a[i] * 0.25)).abs() < 1e-6, "{} fma_scalar", K::NAME);
            }

            let mut got = vec![0.5f32; len];
            fma::<K>(&mut got, &a, &b);
            for i in 0..len {
                assert!((got[i] - (0.5 + a[i] * b[i])).abs() < 1e-6, "{} fma", K::NAME);
            }

            let expected: f32 = a.iter().zip(&b).map(|(x, y)| x * y).sum();
            let got = dot::<K>(&a, &b);
            assert!((got - expected).abs() < 1e-4, "{} dot len={len}: {got} vs {expected}", K::NAME);
        }

        // NaN はレジスタ部分でも端数部分でも 0 になる
        let mut nan = vec![f32::NAN; 2 * K::LANES + 1];
        relu::<K>(&mut nan);
        assert!(nan.iter().all(|&x| x == 0.0), "{} relu(NaN): {nan:?}", K::NAME);
    }

    #[test]
    fn test_scalar_kernel() {
        check_kernel::<Scalar>();
    }

    #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "sse"))]
    #[test]
    fn test_sse_kernel() {
        check_kernel::<Sse>();
    }

    #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "avx"))]
    #[test]
    fn test_avx_kernel() {
        check_kernel::<Avx>();
    }

    #[cfg(all(target_arch = "aarch64", target_feature = "neon"))]
    #[test]
    fn test_neon_kernel() {
        check_kernel::<Neon>();
    }

    #[test]
    fn test_native_lanes() {
        assert_eq!(LANES, NativeKernel::LANES);
        assert!(matches!(LANES, 1 | 4 | 8));
        assert!(!backend_name().is_empty());
    }

    #[test]
    fn test_dot_exact_on_small_integers() {
        // 小さい整数同士なら加算順序に依らず厳密に一致する
        let v: Vec<f32> = (1..=16).map(|i| i as f32).collect();
        let ones = vec![1.0f32; 16];
        assert_eq!(dot::<NativeKernel>(&v, &ones), 136.0);
    }
}
