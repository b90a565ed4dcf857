use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    assets::image::{SourceImage, load_images},
    capture::encoder::{EncodeConfig, FfmpegEncoder},
    capture::pipeline::{CapturePipeline, EncodedArtifact, MediaContainer},
    composition::model::Slideshow,
    engine::compositor::Compositor,
    engine::scheduler::{FramePlan, FrameScheduler},
    engine::transitions::{Slot, transition_ops},
    foundation::core::Fps,
    foundation::error::{SlidecastError, SlidecastResult},
    remux::adapter::remux_with_audio,
};

/// Cooperative cancellation, checked once per scheduler tick.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderStage {
    /// Compositing and encoding the video track.
    Compositing,
    /// Muxing the background audio into the final container.
    Muxing,
}

/// Progress report: percent is monotonic non-decreasing within a stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderProgress {
    pub stage: RenderStage,
    pub percent: u32,
}

/// Render a slideshow end to end: validate, decode every image up front,
/// drive the scheduler/compositor/encoder loop, finalize the WebM artifact,
/// and remux background audio when present.
///
/// The compositor surface is created here and owned for the whole job; no
/// two jobs share one.
#[tracing::instrument(skip_all, fields(images = show.images.len(), transition = ?show.transition))]
pub fn render_slideshow(
    show: &Slideshow,
    progress: &mut dyn FnMut(RenderProgress),
    cancel: &CancelToken,
) -> SlidecastResult<EncodedArtifact> {
    show.validate()?;

    let images = load_images(&show.images)?;
    let canvas = show.aspect.output_canvas();
    let scheduler = FrameScheduler::new(images.len(), show.timing, show.fps)?;
    let total_frames = scheduler.total_frames();
    tracing::info!(total_frames, width = canvas.width, height = canvas.height, "render job start");

    let mut compositor = Compositor::new(canvas)?;
    let mut pipeline = CapturePipeline::start(
        MediaContainer::WebmVp8,
        Some("slideshow.webm".to_string()),
    );
    let mut encoder = FfmpegEncoder::new(
        EncodeConfig {
            width: canvas.width,
            height: canvas.height,
            fps: encode_fps(show.fps),
            bitrate_kbps: show.bitrate_kbps,
        },
        [0, 0, 0, 255],
    )?;

    let ticks = run_ticks(
        show,
        &images,
        scheduler,
        &mut compositor,
        &mut encoder,
        &mut pipeline,
        progress,
        cancel,
    );
    if let Err(e) = ticks {
        encoder.abort();
        pipeline.fail();
        return Err(e);
    }

    if let Err(e) = encoder.finish(&mut pipeline) {
        pipeline.fail();
        return Err(e);
    }
    pipeline.stop();
    let artifact = pipeline
        .take_artifact()
        .ok_or_else(|| SlidecastError::capture("capture finalized without an artifact"))?;
    if artifact.is_empty() {
        return Err(SlidecastError::capture("capture produced an empty artifact"));
    }
    tracing::info!(bytes = artifact.len(), "capture finalized");

    match &show.audio {
        None => Ok(artifact),
        Some(audio) => remux_with_audio(&artifact, audio, &mut |pct| {
            progress(RenderProgress {
                stage: RenderStage::Muxing,
                percent: pct,
            });
        }),
    }
}

/// Integer rate for the rawvideo pipe, rounded to the nearest whole frame.
fn encode_fps(fps: Fps) -> u32 {
    fps.as_f64().round().max(1.0) as u32
}

#[allow(clippy::too_many_arguments)]
fn run_ticks(
    show: &Slideshow,
    images: &[SourceImage],
    scheduler: FrameScheduler,
    compositor: &mut Compositor,
    encoder: &mut FfmpegEncoder,
    pipeline: &mut CapturePipeline,
    progress: &mut dyn FnMut(RenderProgress),
    cancel: &CancelToken,
) -> SlidecastResult<()> {
    let total = scheduler.total_frames().max(1);
    let mut last_pct = 0u32;

    for plan in scheduler {
        if cancel.is_cancelled() {
            return Err(SlidecastError::Cancelled);
        }

        draw_frame(compositor, images, show, &plan)?;
        encoder.encode_frame(&compositor.frame())?;
        encoder.drain_chunks(pipeline)?;

        let pct = (((plan.frame.0 + 1) * 100) / total).min(100) as u32;
        if pct > last_pct {
            last_pct = pct;
            progress(RenderProgress {
                stage: RenderStage::Compositing,
                percent: pct,
            });
        }
    }
    Ok(())
}

fn draw_frame(
    compositor: &mut Compositor,
    images: &[SourceImage],
    show: &Slideshow,
    plan: &FramePlan,
) -> SlidecastResult<()> {
    compositor.clear([0, 0, 0, 255]);

    match plan.progress {
        None => {
            compositor.draw_image(&images[plan.image_a], kurbo::Affine::IDENTITY, 1.0)?;
        }
        Some(progress) => {
            for op in transition_ops(show.transition, progress, compositor.canvas()) {
                let image = match op.slot {
                    Slot::A => &images[plan.image_a],
                    Slot::B => &images[plan.image_b],
                };
                compositor.draw_image(image, op.transform, op.opacity)?;
            }
        }
    }
    Ok(())
}
