//! Slidecast turns a list of still images into a finished slideshow video.
//!
//! # Pipeline overview
//!
//! 1. **Schedule**: `Slideshow + FrameIndex -> FramePlan` (which image pair is
//!    visible and how far a transition has progressed)
//! 2. **Composite**: `FramePlan -> FrameRgba` (CPU compositing with uniform
//!    cover scaling and one of six timed transitions)
//! 3. **Capture**: stream frames to the system `ffmpeg` binary, collecting the
//!    WebM/VP8 output as ordered chunks finalized into one artifact
//! 4. **Remux** (optional): copy the video track and mux a background audio
//!    file into an MP4 alongside AAC audio
//!
//! A separate trim pipeline re-encodes a time window of an existing video into
//! a fresh WebM artifact and rebinds the originating video slot to it.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: scheduling and transition math are pure and
//!   stable for a given input; frame count derives from timing, never from
//!   wall-clock sampling.
//! - **No codec linking**: encode, probe, and decode drive the system `ffmpeg`
//!   and `ffprobe` binaries.
//! - **Premultiplied RGBA8** end-to-end: the compositor works on premultiplied
//!   pixels and flattens only at the rawvideo boundary.
#![forbid(unsafe_code)]

mod assets;
mod capture;
mod composition;
mod engine;
mod foundation;
mod remux;
mod render;
mod trim;

pub use assets::image::{SourceImage, decode_image, load_images};
pub use assets::media::{FrameReader, VideoSourceInfo, is_audio_path, probe_video};
pub use capture::encoder::{EncodeConfig, FfmpegEncoder, is_ffmpeg_on_path};
pub use capture::pipeline::{CapturePipeline, EncodedArtifact, MediaContainer};
pub use composition::model::{
    DEFAULT_BITRATE_KBPS, DEFAULT_DISPLAY_MS, DEFAULT_FPS, DEFAULT_TRANSITION_MS, Slideshow,
    Timing,
};
pub use engine::compositor::{Compositor, FrameRgba, cover_affine};
pub use engine::ease::Ease;
pub use engine::scheduler::{FramePlan, FrameScheduler};
pub use engine::transitions::{DrawOp, Slot, TransitionKind, parse_transition, transition_ops};
pub use foundation::core::{AspectRatio, Canvas, Fps, FrameIndex, parse_aspect_ratio};
pub use foundation::error::{SlidecastError, SlidecastResult};
pub use remux::adapter::{AUDIO_BITRATE_KBPS, remux_with_audio};
pub use render::job::{CancelToken, RenderProgress, RenderStage, render_slideshow};
pub use trim::pipeline::{TrimPipeline, TrimState, TrimWindow};
pub use trim::source::{TransientSource, VideoSlot};
