use super::*;

fn solid_image(width: u32, height: u32, rgba: [u8; 4]) -> SourceImage {
    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for _ in 0..width * height {
        data.extend_from_slice(&rgba);
    }
    SourceImage::from_rgba8_premul(width, height, data).unwrap()
}

#[test]
fn cover_scaling_is_uniform_and_centered() {
    let square = Canvas {
        width: 720,
        height: 720,
    };
    // Twice-as-wide source: no upscale needed, crop 360 px off each side.
    let coeffs = cover_affine(square, 1440, 720).as_coeffs();
    assert_eq!(coeffs, [1.0, 0.0, 0.0, 1.0, -360.0, 0.0]);

    // Small square source into a widescreen canvas: scale by width, crop
    // the vertical overflow evenly.
    let wide = Canvas {
        width: 1280,
        height: 720,
    };
    let coeffs = cover_affine(wide, 640, 640).as_coeffs();
    assert_eq!(coeffs, [2.0, 0.0, 0.0, 2.0, 0.0, -280.0]);
}

#[test]
fn cover_never_stretches() {
    let canvas = Canvas {
        width: 1280,
        height: 720,
    };
    let coeffs = cover_affine(canvas, 333, 777).as_coeffs();
    assert_eq!(coeffs[0], coeffs[3]);
    assert_eq!(coeffs[1], 0.0);
    assert_eq!(coeffs[2], 0.0);
}

#[test]
fn opaque_draw_covers_the_cleared_canvas() {
    let canvas = Canvas {
        width: 2,
        height: 2,
    };
    let mut compositor = Compositor::new(canvas).unwrap();
    compositor.clear([0, 0, 0, 255]);
    let red = solid_image(2, 2, [255, 0, 0, 255]);
    compositor.draw_image(&red, Affine::IDENTITY, 1.0).unwrap();

    let frame = compositor.frame();
    assert!(frame.premultiplied);
    for px in frame.data.chunks_exact(4) {
        assert_eq!(px, [255, 0, 0, 255]);
    }
}

#[test]
fn half_opacity_blends_over_black() {
    let canvas = Canvas {
        width: 2,
        height: 2,
    };
    let mut compositor = Compositor::new(canvas).unwrap();
    compositor.clear([0, 0, 0, 255]);
    let red = solid_image(2, 2, [255, 0, 0, 255]);
    compositor.draw_image(&red, Affine::IDENTITY, 0.5).unwrap();

    let frame = compositor.frame();
    for px in frame.data.chunks_exact(4) {
        assert_eq!(px[0], 128);
        assert_eq!(px[1], 0);
        assert_eq!(px[2], 0);
        assert_eq!(px[3], 255);
    }
}

#[test]
fn degenerate_transform_draws_nothing() {
    let canvas = Canvas {
        width: 2,
        height: 2,
    };
    let mut compositor = Compositor::new(canvas).unwrap();
    compositor.clear([0, 0, 0, 255]);
    let red = solid_image(2, 2, [255, 0, 0, 255]);

    // Zero x-scale, the edge-on midpoint of a flip.
    compositor
        .draw_image(&red, Affine::scale_non_uniform(0.0, 1.0), 1.0)
        .unwrap();

    let frame = compositor.frame();
    for px in frame.data.chunks_exact(4) {
        assert_eq!(px, [0, 0, 0, 255]);
    }
}

#[test]
fn zero_canvas_is_rejected() {
    assert!(
        Compositor::new(Canvas {
            width: 0,
            height: 720
        })
        .is_err()
    );
}

#[test]
fn over_is_a_no_op_at_zero_source_alpha() {
    let dst = [10, 20, 30, 255];
    assert_eq!(over(dst, [255, 255, 255, 0], 1.0), dst);
    assert_eq!(over(dst, [255, 255, 255, 255], 0.0), dst);
}
