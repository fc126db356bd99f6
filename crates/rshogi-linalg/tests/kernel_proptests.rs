//! SIMD バックエンドとスカラー経路の一致、およびベクトル演算の代数的性質

use proptest::prelude::*;
use rshogi_linalg::Vector;
use rshogi_linalg::simd::{self, Kernel, NativeKernel, Scalar};

// 16 要素はどのレーン幅（1/4/8）でも割り切れる
const LEN: usize = 16;

fn arb_f32s() -> impl Strategy<Value = [f32; LEN]> {
    prop::array::uniform16(-10.0f32..10.0)
}

fn arb_f64s() -> impl Strategy<Value = [f64; LEN]> {
    prop::array::uniform16(-1.0e3f64..1.0e3)
}

/// 加算順序の違いを許容する誤差（項の絶対値和に比例）
fn dot_tolerance(a: &[f32], b: &[f32]) -> f32 {
    let magnitude: f32 = a.iter().zip(b).map(|(x, y)| (x * y).abs()).sum();
    1e-5 * (1.0 + magnitude)
}

fn check_dot_against_scalar<K: Kernel>(a: &[f32], b: &[f32]) -> Result<(), TestCaseError> {
    let reference = simd::dot::<Scalar>(a, b);
    let got = simd::dot::<K>(a, b);
    prop_assert!(
        (got - reference).abs() <= dot_tolerance(a, b),
        "{}: {} vs scalar {}",
        K::NAME,
        got,
        reference
    );
    Ok(())
}

fn check_fma_against_scalar<K: Kernel>(
    acc: &[f32],
    a: &[f32],
    b: &[f32],
) -> Result<(), TestCaseError> {
    let mut expected = acc.to_vec();
    simd::fma::<Scalar>(&mut expected, a, b);
    let mut got = acc.to_vec();
    simd::fma::<K>(&mut got, a, b);
    for i in 0..acc.len() {
        // 融合積和と非融合の差は 1 丸め分
        let tol = 1e-5 * (1.0 + expected[i].abs() + (a[i] * b[i]).abs());
        prop_assert!((got[i] - expected[i]).abs() <= tol, "{} fma[{}]", K::NAME, i);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_native_dot_matches_scalar(a in arb_f32s(), b in arb_f32s()) {
        check_dot_against_scalar::<NativeKernel>(&a, &b)?;

        // Vector::dot はネイティブカーネルを通る
        let via_vector = Vector::from(a).dot(&Vector::from(b));
        let reference = simd::dot::<Scalar>(&a, &b);
        prop_assert!((via_vector - reference).abs() <= dot_tolerance(&a, &b));
    }

    #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "sse"))]
    #[test]
    fn prop_sse_matches_scalar(acc in arb_f32s(), a in arb_f32s(), b in arb_f32s()) {
        check_dot_against_scalar::<simd::Sse>(&a, &b)?;
        check_fma_against_scalar::<simd::Sse>(&acc, &a, &b)?;
    }

    #[cfg(all(any(target_arch = "x86", target_arch = "x86_64"), target_feature = "avx"))]
    #[test]
    fn prop_avx_matches_scalar(acc in arb_f32s(), a in arb_f32s(), b in arb_f32s()) {
        check_dot_against_scalar::<simd::Avx>(&a, &b)?;
        check_fma_against_scalar::<simd::Avx>(&acc, &a, &b)?;
    }

    #[cfg(all(target_arch = "aarch64", target_feature = "neon"))]
    #[test]
    fn prop_neon_matches_scalar(acc in arb_f32s(), a in arb_f32s(), b in arb_f32s()) {
        check_dot_against_scalar::<simd::Neon>(&a, &b)?;
        check_fma_against_scalar::<simd::Neon>(&acc, &a, &b)?;
    }

    #[test]
    fn prop_native_fma_matches_scalar(acc in arb_f32s(), a in arb_f32s(), b in arb_f32s()) {
        check_fma_against_scalar::<NativeKernel>(&acc, &a, &b)?;
    }

    #[test]
    fn prop_add_then_sub_roundtrips(a in arb_f64s(), b in arb_f64s()) {
        let va = Vector::from(a);
        let vb = Vector::from(b);
        let back = (va + vb) - vb;
        for i in 0..LEN {
            prop_assert!((back[i] - a[i]).abs() <= 1e-12 * (1.0 + a[i].abs() + b[i].abs()));
        }
    }

    #[test]
    fn prop_add_then_sub_roundtrips_f32(a in arb_f32s(), b in arb_f32s()) {
        let back = (Vector::from(a) + Vector::from(b)) - Vector::from(b);
        for i in 0..LEN {
            prop_assert!((back[i] - a[i]).abs() <= 1e-5 * (1.0 + a[i].abs() + b[i].abs()));
        }
    }

    #[test]
    fn prop_relu_is_elementwise_max(a in arb_f32s()) {
        let mut v = Vector::from(a);
        v.relu();
        for i in 0..LEN {
            prop_assert_eq!(v[i], a[i].max(0.0));
        }

        let mut w = Vector::<f64, LEN>::from(a.map(f64::from));
        w.relu();
        for i in 0..LEN {
            prop_assert_eq!(w[i], f64::from(a[i]).max(0.0));
        }
    }

    #[test]
    fn prop_sigmoid_in_open_unit_interval(a in prop::array::uniform16(-30.0f64..30.0)) {
        let mut v = Vector::from(a);
        v.sigmoid();
        for i in 0..LEN {
            prop_assert!(v[i] > 0.0 && v[i] < 1.0, "sigmoid({}) = {}", a[i], v[i]);
        }
    }

    #[test]
    fn prop_crelu_splits_sign(a in prop::array::uniform8(-10.0f32..10.0)) {
        let doubled = Vector::<f32, LEN>::crelu_from(&Vector::from(a));
        for i in 0..8 {
            prop_assert_eq!(doubled[i], a[i].max(0.0));
            prop_assert_eq!(doubled[i + 8], (-a[i]).max(0.0));
            // 元の値は正負チャネルの差で復元できる
            prop_assert_eq!(doubled[i] - doubled[i + 8], a[i]);
        }
    }

    #[test]
    fn prop_squared_distance_matches_differences(a in arb_f64s(), b in arb_f64s()) {
        let va = Vector::from(a);
        let vb = Vector::from(b);
        let total = rshogi_linalg::squared_differences(&va, &vb).sum();
        let dist = va.squared_distance(&vb);
        prop_assert!((total - dist).abs() <= 1e-9 * (1.0 + dist));
    }
}

#[test]
fn sigmoid_of_zero_is_exactly_half() {
    let mut v = Vector::<f32, LEN>::zeros();
    v.sigmoid();
    assert!(v.iter().all(|&x| x == 0.5));

    let mut w = Vector::<f64, 3>::zeros();
    w.sigmoid();
    assert_eq!(w, Vector::splat(0.5));
}
