use super::*;

#[test]
fn fps_rejects_zero_components() {
    assert!(Fps::new(30, 0).is_err());
    assert!(Fps::new(0, 1).is_err());
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.as_f64(), 30.0);
    assert!((fps.frame_interval_ms() - 33.333_333).abs() < 1e-3);
    assert_eq!(fps.frames_to_secs(90), 3.0);
}

#[test]
fn aspect_table_is_fixed() {
    assert_eq!(
        AspectRatio::Widescreen.output_canvas(),
        Canvas {
            width: 1280,
            height: 720
        }
    );
    assert_eq!(
        AspectRatio::Portrait.output_canvas(),
        Canvas {
            width: 720,
            height: 1280
        }
    );
    assert_eq!(
        AspectRatio::Square.output_canvas(),
        Canvas {
            width: 720,
            height: 720
        }
    );
}

#[test]
fn aspect_parser_accepts_ratio_and_word_forms() {
    assert_eq!(parse_aspect_ratio("16:9").unwrap(), AspectRatio::Widescreen);
    assert_eq!(parse_aspect_ratio(" Portrait ").unwrap(), AspectRatio::Portrait);
    assert_eq!(parse_aspect_ratio("1:1").unwrap(), AspectRatio::Square);
    assert!(parse_aspect_ratio("4:3").is_err());
}

#[test]
fn canvas_pixel_bytes_is_rgba8() {
    let canvas = Canvas {
        width: 1280,
        height: 720,
    };
    assert_eq!(canvas.pixel_bytes(), 1280 * 720 * 4);
}
