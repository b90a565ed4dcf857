use super::*;
use crate::foundation::core::Canvas;

fn canvas() -> Canvas {
    Canvas {
        width: 1280,
        height: 720,
    }
}

#[test]
fn parser_accepts_known_spellings_only() {
    assert_eq!(parse_transition("fade").unwrap(), TransitionKind::Fade);
    assert_eq!(parse_transition("crossfade").unwrap(), TransitionKind::Fade);
    assert_eq!(
        parse_transition(" Vertical-Slide ").unwrap(),
        TransitionKind::VerticalSlide
    );
    assert_eq!(parse_transition("vslide").unwrap(), TransitionKind::VerticalSlide);
    assert!(parse_transition("").is_err());
    assert!(parse_transition("wipe").is_err());
}

#[test]
fn easing_assignment_is_fixed_per_kind() {
    assert!(matches!(TransitionKind::Fade.ease(), Ease::Linear));
    assert!(matches!(TransitionKind::Slide.ease(), Ease::Linear));
    assert!(matches!(TransitionKind::VerticalSlide.ease(), Ease::Linear));
    assert!(matches!(TransitionKind::Zoom.ease(), Ease::InOutCubic));
    assert!(matches!(TransitionKind::Rotate.ease(), Ease::InOutCubic));
    assert!(matches!(TransitionKind::Flip.ease(), Ease::InOutCubic));
}

#[test]
fn at_progress_zero_only_image_a_contributes() {
    for kind in [
        TransitionKind::Fade,
        TransitionKind::Zoom,
        TransitionKind::Rotate,
    ] {
        let ops = transition_ops(kind, 0.0, canvas());
        assert_eq!(ops[0].slot, Slot::A);
        assert_eq!(ops[0].opacity, 1.0);
        assert_eq!(ops[1].slot, Slot::B);
        assert_eq!(ops[1].opacity, 0.0);
    }

    // Both slides park B exactly one canvas length away.
    let ops = transition_ops(TransitionKind::Slide, 0.0, canvas());
    assert_eq!(ops[1].transform, kurbo::Affine::translate((1280.0, 0.0)));
    let ops = transition_ops(TransitionKind::VerticalSlide, 0.0, canvas());
    assert_eq!(ops[1].transform, kurbo::Affine::translate((0.0, 720.0)));
}

#[test]
fn at_progress_one_image_b_lands_fully() {
    let ops = transition_ops(TransitionKind::Fade, 1.0, canvas());
    assert_eq!(ops[1].slot, Slot::B);
    assert_eq!(ops[1].opacity, 1.0);

    let ops = transition_ops(TransitionKind::Slide, 1.0, canvas());
    assert_eq!(ops[1].transform, kurbo::Affine::IDENTITY);

    let ops = transition_ops(TransitionKind::VerticalSlide, 1.0, canvas());
    assert_eq!(ops[1].transform, kurbo::Affine::IDENTITY);

    // Rotate completes a full turn, so the transform is identity again.
    let ops = transition_ops(TransitionKind::Rotate, 1.0, canvas());
    let coeffs = ops[1].transform.as_coeffs();
    let identity = kurbo::Affine::IDENTITY.as_coeffs();
    for (a, b) in coeffs.iter().zip(identity.iter()) {
        assert!((a - b).abs() < 1e-9);
    }
}

#[test]
fn zoom_scales_twenty_percent_about_center() {
    let ops = transition_ops(TransitionKind::Zoom, 1.0, canvas());
    let coeffs = ops[1].transform.as_coeffs();
    assert!((coeffs[0] - 1.2).abs() < 1e-12);
    assert!((coeffs[3] - 1.2).abs() < 1e-12);
    // Centered: the canvas midpoint is a fixed point of the transform.
    let mid = kurbo::Point::new(640.0, 360.0);
    let moved = ops[1].transform * mid;
    assert!((moved - mid).hypot() < 1e-9);
}

#[test]
fn flip_swaps_slots_at_the_midpoint() {
    // Before the midpoint A shrinks toward edge-on.
    let ops = transition_ops(TransitionKind::Flip, 0.25, canvas());
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].slot, Slot::A);
    assert!(ops[0].transform.as_coeffs()[0] > 0.0);

    // Exactly at the midpoint the x-scale is cos(pi/2) = 0.
    let ops = transition_ops(TransitionKind::Flip, 0.5, canvas());
    assert_eq!(ops[0].slot, Slot::A);
    assert!(ops[0].transform.as_coeffs()[0].abs() < 1e-12);

    // Past it B unfolds mirrored (negative x-scale).
    let ops = transition_ops(TransitionKind::Flip, 0.75, canvas());
    assert_eq!(ops[0].slot, Slot::B);
    assert!(ops[0].transform.as_coeffs()[0] < 0.0);

    // At the end B is flat with x-scale cos(pi) = -1.
    let ops = transition_ops(TransitionKind::Flip, 1.0, canvas());
    assert_eq!(ops[0].slot, Slot::B);
    assert!((ops[0].transform.as_coeffs()[0] + 1.0).abs() < 1e-12);
}

#[test]
fn out_of_range_progress_is_clamped() {
    let low = transition_ops(TransitionKind::Fade, -1.0, canvas());
    let zero = transition_ops(TransitionKind::Fade, 0.0, canvas());
    assert_eq!(low, zero);

    let high = transition_ops(TransitionKind::Slide, 7.0, canvas());
    let one = transition_ops(TransitionKind::Slide, 1.0, canvas());
    assert_eq!(high, one);
}
