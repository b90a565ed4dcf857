use crate::foundation::error::{SlidecastError, SlidecastResult};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32, // must be > 0
}

impl Fps {
    pub fn new(num: u32, den: u32) -> SlidecastResult<Self> {
        if den == 0 {
            return Err(SlidecastError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(SlidecastError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of a single frame in milliseconds.
    pub fn frame_interval_ms(self) -> f64 {
        1000.0 * f64::from(self.den) / f64::from(self.num)
    }

    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * f64::from(self.den) / f64::from(self.num)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Canvas {
    pub fn pixel_bytes(self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Output geometry is chosen from a fixed table, never free-form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatio {
    /// 16:9 landscape.
    Widescreen,
    /// 9:16 portrait.
    Portrait,
    /// 1:1 square.
    Square,
}

impl AspectRatio {
    pub fn output_canvas(self) -> Canvas {
        match self {
            Self::Widescreen => Canvas {
                width: 1280,
                height: 720,
            },
            Self::Portrait => Canvas {
                width: 720,
                height: 1280,
            },
            Self::Square => Canvas {
                width: 720,
                height: 720,
            },
        }
    }
}

pub fn parse_aspect_ratio(s: &str) -> SlidecastResult<AspectRatio> {
    match s.trim().to_ascii_lowercase().as_str() {
        "16:9" | "widescreen" | "landscape" => Ok(AspectRatio::Widescreen),
        "9:16" | "portrait" | "vertical" => Ok(AspectRatio::Portrait),
        "1:1" | "square" => Ok(AspectRatio::Square),
        other => Err(SlidecastError::validation(format!(
            "unknown aspect ratio '{other}'"
        ))),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
