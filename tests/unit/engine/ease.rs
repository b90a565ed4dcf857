use super::*;

#[test]
fn endpoints_are_exact() {
    for ease in [Ease::Linear, Ease::InOutCubic] {
        assert_eq!(ease.apply(0.0), 0.0);
        assert_eq!(ease.apply(1.0), 1.0);
    }
}

#[test]
fn input_is_clamped() {
    assert_eq!(Ease::InOutCubic.apply(-3.0), 0.0);
    assert_eq!(Ease::InOutCubic.apply(42.0), 1.0);
}

#[test]
fn in_out_cubic_matches_closed_form() {
    // 4t^3 below the midpoint, 1 - (-2t+2)^3 / 2 above.
    assert!((Ease::InOutCubic.apply(0.25) - 0.0625).abs() < 1e-12);
    assert_eq!(Ease::InOutCubic.apply(0.5), 0.5);
    assert!((Ease::InOutCubic.apply(0.75) - 0.9375).abs() < 1e-12);
}

#[test]
fn in_out_cubic_is_monotonic() {
    let mut prev = 0.0;
    for i in 1..=100 {
        let v = Ease::InOutCubic.apply(f64::from(i) / 100.0);
        assert!(v >= prev);
        prev = v;
    }
}
