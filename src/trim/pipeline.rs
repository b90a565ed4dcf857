use std::{path::Path, process::Command};

use crate::{
    assets::media::{FrameReader, VideoSourceInfo, probe_video},
    capture::encoder::{EncodeConfig, FfmpegEncoder},
    capture::pipeline::{CapturePipeline, EncodedArtifact, MediaContainer},
    composition::model::DEFAULT_BITRATE_KBPS,
    engine::compositor::FrameRgba,
    foundation::error::{SlidecastError, SlidecastResult},
    remux::adapter::WorkspaceGuard,
    trim::source::VideoSlot,
};

/// Re-encode fps when the source rate is unknown or degenerate.
const FALLBACK_FPS: u32 = 30;
/// Opus bitrate for the trimmed audio track, in kbit/s.
const TRIM_AUDIO_BITRATE_KBPS: u32 = 128;

/// Half-open selection over the source timeline, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrimWindow {
    pub start_sec: f64,
    pub end_sec: f64,
}

impl TrimWindow {
    pub fn validate(&self, duration_sec: f64) -> SlidecastResult<()> {
        if !(self.start_sec.is_finite() && self.end_sec.is_finite()) {
            return Err(SlidecastError::validation(
                "trim window bounds must be finite",
            ));
        }
        if self.start_sec < 0.0 {
            return Err(SlidecastError::validation("trim start must be >= 0"));
        }
        if self.start_sec >= self.end_sec {
            return Err(SlidecastError::validation(
                "trim start must be strictly before trim end",
            ));
        }
        if self.end_sec > duration_sec {
            return Err(SlidecastError::validation(format!(
                "trim end {:.3}s exceeds source duration {:.3}s",
                self.end_sec, duration_sec
            )));
        }
        Ok(())
    }

    pub fn duration_sec(&self) -> f64 {
        self.end_sec - self.start_sec
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrimState {
    Idle,
    RangeSelected,
    Recording,
    Finalizing,
    /// Terminal. The slot is bound to the trimmed output.
    Done,
    /// Terminal. The slot keeps its previous source.
    Failed,
}

impl TrimState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// One trim job over one video slot.
///
/// Opening probes the source and lands in `RangeSelected` with the window
/// defaulted to the full duration. `confirm` runs the decode/re-encode pass
/// through `Recording` and `Finalizing` into `Done`, rebinding the slot, or
/// into `Failed` with the slot untouched. Both outcomes are terminal.
pub struct TrimPipeline {
    state: TrimState,
    source: VideoSourceInfo,
    slot: VideoSlot,
    window: TrimWindow,
}

impl TrimPipeline {
    #[tracing::instrument(skip_all, fields(source = %source_path.display()))]
    pub fn open(source_path: &Path) -> SlidecastResult<Self> {
        let source = probe_video(source_path)?;
        if !source.duration_sec.is_finite() || source.duration_sec <= 0.0 {
            return Err(SlidecastError::validation(format!(
                "source '{}' has no usable duration; cannot select a trim range",
                source_path.display()
            )));
        }
        tracing::debug!(
            duration_sec = source.duration_sec,
            width = source.width,
            height = source.height,
            "trim source probed"
        );

        let window = TrimWindow {
            start_sec: 0.0,
            end_sec: source.duration_sec,
        };
        Ok(Self {
            state: TrimState::RangeSelected,
            slot: VideoSlot::new(source_path, source.duration_sec),
            source,
            window,
        })
    }

    pub fn state(&self) -> TrimState {
        self.state
    }

    pub fn window(&self) -> TrimWindow {
        self.window
    }

    pub fn slot(&self) -> &VideoSlot {
        &self.slot
    }

    /// Adjust the selection. Only legal before recording starts.
    pub fn set_window(&mut self, window: TrimWindow) -> SlidecastResult<()> {
        if self.state != TrimState::RangeSelected {
            return Err(SlidecastError::validation(
                "trim window can only change while a range is being selected",
            ));
        }
        window.validate(self.source.duration_sec)?;
        self.window = window;
        Ok(())
    }

    /// Dismiss the job without trimming. Refused mid-recording (the capture
    /// must run to completion or failure once started) and in the terminal
    /// states, which never transition again.
    pub fn cancel(&mut self) -> SlidecastResult<()> {
        match self.state {
            TrimState::Idle | TrimState::RangeSelected => {
                self.state = TrimState::Idle;
                Ok(())
            }
            TrimState::Recording | TrimState::Finalizing => Err(SlidecastError::validation(
                "cannot dismiss a trim while it is recording",
            )),
            TrimState::Done | TrimState::Failed => Err(SlidecastError::validation(
                "trim job already finished; open a new one to trim again",
            )),
        }
    }

    /// Run the trim: decode the selected window, re-encode it, and rebind the
    /// slot to the result. Progress is reported as 0..=100, monotonic.
    #[tracing::instrument(skip_all, fields(start = self.window.start_sec, end = self.window.end_sec))]
    pub fn confirm(&mut self, progress: &mut dyn FnMut(u32)) -> SlidecastResult<()> {
        if self.state != TrimState::RangeSelected {
            return Err(SlidecastError::validation(
                "trim can only be confirmed from the range-selection state",
            ));
        }
        self.window.validate(self.source.duration_sec)?;

        self.state = TrimState::Recording;
        match self.record(progress) {
            Ok(artifact) => {
                if let Err(e) = self
                    .slot
                    .bind_artifact(&artifact, self.window.duration_sec())
                {
                    self.state = TrimState::Failed;
                    return Err(e);
                }
                self.state = TrimState::Done;
                tracing::info!(bytes = artifact.len(), "trim finalized");
                Ok(())
            }
            Err(e) => {
                self.state = TrimState::Failed;
                Err(e)
            }
        }
    }

    fn record(&mut self, progress: &mut dyn FnMut(u32)) -> SlidecastResult<EncodedArtifact> {
        let out_fps = recode_fps(&self.source);
        let mut reader = FrameReader::open(
            &self.source,
            self.window.start_sec,
            self.window.end_sec,
            out_fps,
        )?;
        let mut pipeline =
            CapturePipeline::start(MediaContainer::WebmVp8, Some("trimmed.webm".to_string()));
        let encoder = FfmpegEncoder::new(
            EncodeConfig {
                width: reader.width,
                height: reader.height,
                fps: out_fps,
                bitrate_kbps: DEFAULT_BITRATE_KBPS,
            },
            [0, 0, 0, 255],
        );
        let mut encoder = match encoder {
            Ok(enc) => enc,
            Err(e) => {
                pipeline.fail();
                return Err(e);
            }
        };

        if let Err(e) = self.pump_frames(&mut reader, &mut encoder, &mut pipeline, out_fps, progress)
        {
            encoder.abort();
            pipeline.fail();
            return Err(e);
        }

        self.state = TrimState::Finalizing;
        if let Err(e) = reader.finish() {
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
            .ok_or_else(|| SlidecastError::capture("trim finalized without an artifact"))?;
        if artifact.is_empty() {
            return Err(SlidecastError::capture("trim produced an empty artifact"));
        }
        let artifact = if self.source.has_audio {
            self.mux_audio_window(&artifact)?
        } else {
            artifact
        };
        progress(100);
        Ok(artifact)
    }

    /// Carry the selected audio window into the trimmed container: the VP8
    /// stream is copied, the source audio over the same `[start, end)` range
    /// is encoded to Opus, and the output is truncated to the shorter stream.
    fn mux_audio_window(&self, video: &EncodedArtifact) -> SlidecastResult<EncodedArtifact> {
        let workspace = WorkspaceGuard::create("trim_mux")?;
        let video_in = workspace.path().join("video.webm");
        video.write_to(&video_in)?;

        let out = Command::new("ffmpeg")
            .current_dir(workspace.path())
            .args(["-y", "-loglevel", "error", "-nostats"])
            .args(["-i", "video.webm"])
            .args(["-ss", &format!("{:.6}", self.window.start_sec)])
            .arg("-i")
            .arg(&self.source.source_path)
            .args([
                "-t",
                &format!("{:.6}", self.window.duration_sec()),
                "-c:v",
                "copy",
                "-c:a",
                "libopus",
                "-b:a",
                &format!("{TRIM_AUDIO_BITRATE_KBPS}k"),
                "-shortest",
                "-map",
                "0:v:0",
                "-map",
                "1:a:0",
                "-f",
                "webm",
                "output.webm",
            ])
            .output()
            .map_err(|e| {
                SlidecastError::remux(format!("failed to run ffmpeg for trim audio mux: {e}"))
            })?;
        if !out.status.success() {
            return Err(SlidecastError::remux(format!(
                "trim audio mux exited with status {}: {}",
                out.status,
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }

        let bytes = std::fs::read(workspace.path().join("output.webm"))
            .map_err(|e| SlidecastError::remux(format!("trim audio mux produced no output: {e}")))?;
        if bytes.is_empty() {
            return Err(SlidecastError::remux("trim audio mux output is empty"));
        }
        tracing::debug!(bytes = bytes.len(), "trim audio window muxed");
        Ok(EncodedArtifact {
            bytes,
            container: MediaContainer::WebmVp8,
            filename: video.filename.clone(),
        })
    }

    /// Copy frames until the decode stream ends or playback time crosses the
    /// window end, whichever fires first. Either trigger stops the capture;
    /// finalization still happens exactly once.
    fn pump_frames(
        &self,
        reader: &mut FrameReader,
        encoder: &mut FfmpegEncoder,
        pipeline: &mut CapturePipeline,
        out_fps: u32,
        progress: &mut dyn FnMut(u32),
    ) -> SlidecastResult<()> {
        let window_sec = self.window.duration_sec();
        let mut frames = 0u64;
        let mut last_pct = 0u32;

        loop {
            let elapsed_sec = frames as f64 / f64::from(out_fps);
            if elapsed_sec >= window_sec {
                break;
            }
            let Some(raw) = reader.next_frame()? else {
                break;
            };
            encoder.encode_frame(&FrameRgba {
                width: reader.width,
                height: reader.height,
                data: raw,
                premultiplied: false,
            })?;
            encoder.drain_chunks(pipeline)?;
            frames += 1;

            let pct = ((elapsed_sec / window_sec) * 100.0).clamp(0.0, 100.0) as u32;
            if pct > last_pct {
                last_pct = pct;
                progress(pct);
            }
        }
        Ok(())
    }
}

/// Integer re-encode rate: the source rate rounded to the nearest whole
/// frame, falling back when the probe gave nothing usable.
fn recode_fps(source: &VideoSourceInfo) -> u32 {
    let fps = source.source_fps();
    if fps.is_finite() && fps >= 1.0 {
        fps.round() as u32
    } else {
        FALLBACK_FPS
    }
}

#[cfg(test)]
#[path = "../../tests/unit/trim/pipeline.rs"]
mod tests;
