use std::path::PathBuf;

use crate::{
    assets::media::is_audio_path,
    engine::transitions::TransitionKind,
    foundation::core::{AspectRatio, Fps},
    foundation::error::{SlidecastError, SlidecastResult},
};

/// Per-image display time, default for the consolidated behavior.
pub const DEFAULT_DISPLAY_MS: u32 = 3000;
/// Per-transition time, default for the consolidated behavior.
pub const DEFAULT_TRANSITION_MS: u32 = 500;
/// Generated video bitrate in kbit/s.
pub const DEFAULT_BITRATE_KBPS: u32 = 2500;
/// Target frame rate for generated video.
pub const DEFAULT_FPS: u32 = 30;

/// Timing of one cycle: an image's display window plus the following
/// transition window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Timing {
    pub display_ms: u32,
    pub transition_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            display_ms: DEFAULT_DISPLAY_MS,
            transition_ms: DEFAULT_TRANSITION_MS,
        }
    }
}

impl Timing {
    pub fn cycle_ms(self) -> u64 {
        u64::from(self.display_ms) + u64::from(self.transition_ms)
    }
}

/// One render job's immutable parameters: the ordered image sources, an
/// optional background audio file, and the output geometry/timing.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Slideshow {
    pub images: Vec<PathBuf>,
    pub audio: Option<PathBuf>,
    pub transition: TransitionKind,
    pub aspect: AspectRatio,
    #[serde(default)]
    pub timing: Timing,
    pub fps: Fps,
    pub bitrate_kbps: u32,
}

impl Slideshow {
    pub fn new(
        images: Vec<PathBuf>,
        transition: TransitionKind,
        aspect: AspectRatio,
    ) -> SlidecastResult<Self> {
        let slideshow = Self {
            images,
            audio: None,
            transition,
            aspect,
            timing: Timing::default(),
            fps: Fps::new(DEFAULT_FPS, 1)?,
            bitrate_kbps: DEFAULT_BITRATE_KBPS,
        };
        slideshow.validate()?;
        Ok(slideshow)
    }

    pub fn with_audio(mut self, audio: impl Into<PathBuf>) -> Self {
        self.audio = Some(audio.into());
        self
    }

    /// Boundary validation: rejected before any resource is allocated.
    pub fn validate(&self) -> SlidecastResult<()> {
        if self.images.is_empty() {
            return Err(SlidecastError::validation(
                "slideshow requires at least one image",
            ));
        }
        if self.timing.display_ms == 0 || self.timing.transition_ms == 0 {
            return Err(SlidecastError::validation(
                "display and transition durations must be > 0",
            ));
        }
        if self.bitrate_kbps == 0 {
            return Err(SlidecastError::validation("bitrate must be > 0"));
        }
        if let Some(audio) = &self.audio
            && !is_audio_path(audio)
        {
            return Err(SlidecastError::validation(format!(
                "'{}' is not an audio file",
                audio.display()
            )));
        }
        Ok(())
    }
}
