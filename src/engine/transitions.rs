use kurbo::Affine;

use crate::{
    engine::ease::Ease,
    foundation::core::Canvas,
    foundation::error::{SlidecastError, SlidecastResult},
};

/// One of the six visual effects blending two images.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionKind {
    Fade,
    Slide,
    VerticalSlide,
    Zoom,
    Rotate,
    Flip,
}

pub fn parse_transition(kind: &str) -> SlidecastResult<TransitionKind> {
    let kind = kind.trim().to_ascii_lowercase();
    if kind.is_empty() {
        return Err(SlidecastError::validation("transition kind must be non-empty"));
    }

    match kind.as_str() {
        "fade" | "crossfade" => Ok(TransitionKind::Fade),
        "slide" => Ok(TransitionKind::Slide),
        "vertical-slide" | "vertical_slide" | "vslide" | "slide-up" => {
            Ok(TransitionKind::VerticalSlide)
        }
        "zoom" => Ok(TransitionKind::Zoom),
        "rotate" => Ok(TransitionKind::Rotate),
        "flip" => Ok(TransitionKind::Flip),
        _ => Err(SlidecastError::validation(format!(
            "unknown transition kind '{kind}'"
        ))),
    }
}

impl TransitionKind {
    /// Fade and both slides advance linearly in wall-clock time; the
    /// remaining effects run through cubic ease-in-out.
    pub fn ease(self) -> Ease {
        match self {
            Self::Fade | Self::Slide | Self::VerticalSlide => Ease::Linear,
            Self::Zoom | Self::Rotate | Self::Flip => Ease::InOutCubic,
        }
    }
}

/// Which of the two cycle images an op samples from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    A,
    B,
}

/// One deterministic draw instruction for the compositor. The transform is in
/// output-canvas coordinates and composes on top of the cover scaling applied
/// per image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawOp {
    pub slot: Slot,
    pub transform: Affine,
    pub opacity: f32,
}

impl DrawOp {
    fn opaque(slot: Slot, transform: Affine) -> Self {
        Self {
            slot,
            transform,
            opacity: 1.0,
        }
    }
}

fn about_center(canvas: Canvas, inner: Affine) -> Affine {
    let center = kurbo::Vec2::new(
        f64::from(canvas.width) / 2.0,
        f64::from(canvas.height) / 2.0,
    );
    Affine::translate(center) * inner * Affine::translate(-center)
}

/// Pure transition contract: at `progress=0` only image A is visible, at
/// `progress=1` only image B is (flip excepted, which swaps discretely at
/// 0.5 -- that discontinuity is the defined behavior of the effect).
pub fn transition_ops(kind: TransitionKind, progress: f64, canvas: Canvas) -> Vec<DrawOp> {
    let p = progress.clamp(0.0, 1.0);
    let t = kind.ease().apply(p);
    let w = f64::from(canvas.width);
    let h = f64::from(canvas.height);

    match kind {
        TransitionKind::Fade => vec![
            DrawOp::opaque(Slot::A, Affine::IDENTITY),
            DrawOp {
                slot: Slot::B,
                transform: Affine::IDENTITY,
                opacity: t as f32,
            },
        ],
        TransitionKind::Slide => vec![
            DrawOp::opaque(Slot::A, Affine::IDENTITY),
            DrawOp::opaque(Slot::B, Affine::translate((w * (1.0 - t), 0.0))),
        ],
        TransitionKind::VerticalSlide => vec![
            DrawOp::opaque(Slot::A, Affine::IDENTITY),
            DrawOp::opaque(Slot::B, Affine::translate((0.0, h * (1.0 - t)))),
        ],
        TransitionKind::Zoom => vec![
            DrawOp::opaque(Slot::A, Affine::IDENTITY),
            DrawOp {
                slot: Slot::B,
                transform: about_center(canvas, Affine::scale(1.0 + 0.2 * t)),
                opacity: t as f32,
            },
        ],
        TransitionKind::Rotate => vec![
            DrawOp::opaque(Slot::A, Affine::IDENTITY),
            DrawOp {
                slot: Slot::B,
                transform: about_center(canvas, Affine::rotate(std::f64::consts::TAU * t)),
                opacity: t as f32,
            },
        ],
        TransitionKind::Flip => {
            // flip_scale >= 0 shows A edge-on to flat; past the half-way
            // point B appears mirrored (negative x-scale) and unfolds.
            let flip_scale = (std::f64::consts::PI * t).cos();
            let slot = if flip_scale >= 0.0 { Slot::A } else { Slot::B };
            vec![DrawOp::opaque(
                slot,
                about_center(canvas, Affine::scale_non_uniform(flip_scale, 1.0)),
            )]
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/transitions.rs"]
mod tests;
