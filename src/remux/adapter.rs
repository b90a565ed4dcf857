use std::{
    io::{BufRead, BufReader, Read},
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::Context;

use crate::{
    assets::media::is_audio_path,
    capture::pipeline::{EncodedArtifact, MediaContainer},
    foundation::error::{SlidecastError, SlidecastResult},
};

/// AAC bitrate used for the remuxed audio track, in kbit/s.
pub const AUDIO_BITRATE_KBPS: u32 = 192;

/// Scratch workspace for one ffmpeg invocation. Created fresh per call and
/// torn down unconditionally, success or failure.
pub(crate) struct WorkspaceGuard(PathBuf);

impl WorkspaceGuard {
    pub(crate) fn create(tag: &str) -> SlidecastResult<Self> {
        let dir = std::env::temp_dir().join(format!(
            "slidecast_{tag}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        ));
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create remux workspace '{}'", dir.display()))?;
        Ok(Self(dir))
    }

    pub(crate) fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for WorkspaceGuard {
    fn drop(&mut self) {
        // Best-effort; never masks the originating error.
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

/// Mux a captured video artifact with a background audio file into MP4.
///
/// The video stream is copied unmodified, the audio stream is encoded to AAC
/// at 192 kbit/s, and the output is truncated to the shorter input. Progress
/// is forwarded as a monotonic non-decreasing 0-100 integer.
#[tracing::instrument(skip(video, progress), fields(audio = %audio_path.display()))]
pub fn remux_with_audio(
    video: &EncodedArtifact,
    audio_path: &Path,
    progress: &mut dyn FnMut(u32),
) -> SlidecastResult<EncodedArtifact> {
    if !is_audio_path(audio_path) {
        return Err(SlidecastError::validation(format!(
            "'{}' is not an audio file",
            audio_path.display()
        )));
    }
    if video.is_empty() {
        return Err(SlidecastError::validation("video artifact is empty"));
    }

    let workspace = WorkspaceGuard::create("remux")?;
    let video_name = format!("video.{}", video.container.extension());
    let audio_ext = audio_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("mp3");
    let audio_name = format!("audio.{audio_ext}");

    let video_in = workspace.path().join(&video_name);
    let audio_in = workspace.path().join(&audio_name);
    let output = workspace.path().join("output.mp4");

    video.write_to(&video_in)?;
    std::fs::copy(audio_path, &audio_in)
        .with_context(|| format!("failed to stage audio file '{}'", audio_path.display()))?;

    let video_duration_sec = probe_duration_sec(&video_in);
    tracing::debug!(?video_duration_sec, "remux inputs staged");

    let mut child = Command::new("ffmpeg")
        .current_dir(workspace.path())
        .args(["-y", "-loglevel", "error", "-nostats"])
        .args(["-i", &video_name, "-i", &audio_name])
        .args([
            "-c:v",
            "copy",
            "-c:a",
            "aac",
            "-b:a",
            &format!("{AUDIO_BITRATE_KBPS}k"),
            "-shortest",
            "-map",
            "0:v:0",
            "-map",
            "1:a:0",
            "-progress",
            "pipe:1",
            "output.mp4",
        ])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| SlidecastError::remux(format!("failed to spawn ffmpeg for remux: {e}")))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| SlidecastError::remux("failed to open remux progress stream"))?;
    // stderr is drained off-thread; a full pipe would stall the child.
    let stderr_reader = child.stderr.take().map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = String::new();
            let _ = pipe.read_to_string(&mut buf);
            buf
        })
    });
    forward_progress(stdout, video_duration_sec, progress);

    let status = child
        .wait()
        .map_err(|e| SlidecastError::remux(format!("failed to wait for ffmpeg remux: {e}")))?;
    let stderr = stderr_reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    if !status.success() {
        return Err(SlidecastError::remux(format!(
            "ffmpeg remux exited with status {status}: {}",
            stderr.trim()
        )));
    }

    let bytes = std::fs::read(&output)
        .map_err(|e| SlidecastError::remux(format!("remux produced no output file: {e}")))?;
    if bytes.is_empty() {
        return Err(SlidecastError::remux("remux output file is empty"));
    }

    progress(100);
    tracing::info!(bytes = bytes.len(), "remux complete");
    Ok(EncodedArtifact {
        bytes,
        container: MediaContainer::Mp4,
        filename: video
            .filename
            .as_ref()
            .map(|name| format!("{}.mp4", name.trim_end_matches(".webm"))),
    })
}

/// Parse ffmpeg's `-progress` key/value stream into clamped, monotonic
/// percentages. `out_time_ms` is microseconds despite the name; newer builds
/// also emit `out_time_us`.
fn forward_progress(
    stdout: impl Read,
    total_duration_sec: Option<f64>,
    progress: &mut dyn FnMut(u32),
) {
    let Some(total) = total_duration_sec.filter(|d| d.is_finite() && *d > 0.0) else {
        return;
    };

    let mut last = 0u32;
    for line in BufReader::new(stdout).lines() {
        let Ok(line) = line else { break };
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let out_time_us = match key {
            "out_time_us" | "out_time_ms" => value.trim().parse::<i64>().ok(),
            _ => None,
        };
        if let Some(us) = out_time_us {
            let fraction = ((us.max(0) as f64) / 1_000_000.0 / total).clamp(0.0, 1.0);
            let pct = ((fraction * 100.0).floor() as u32).min(100).max(last);
            if pct > last {
                last = pct;
                progress(pct);
            }
        }
    }
}

fn probe_duration_sec(path: &Path) -> Option<f64> {
    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    String::from_utf8_lossy(&out.stdout).trim().parse::<f64>().ok()
}
