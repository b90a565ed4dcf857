use std::{
    io::Read,
    path::{Path, PathBuf},
    process::{Child, ChildStdout, Command, Stdio},
};

use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Extensions accepted for the background-audio slot.
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "aac", "m4a", "wav", "ogg", "oga", "opus", "flac"];

/// Media-type gate for the audio slot, checked before any resource is
/// allocated.
pub fn is_audio_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[derive(Clone, Debug)]
pub struct VideoSourceInfo {
    pub source_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps_num: u32,
    pub fps_den: u32,
    pub duration_sec: f64,
    pub has_audio: bool,
}

impl VideoSourceInfo {
    pub fn source_fps(&self) -> f64 {
        if self.fps_den == 0 {
            0.0
        } else {
            f64::from(self.fps_num) / f64::from(self.fps_den)
        }
    }

    /// Output dimensions for re-encoding, even-floored for yuv420p.
    pub fn even_dimensions(&self) -> (u32, u32) {
        ((self.width / 2) * 2, (self.height / 2) * 2)
    }
}

pub fn probe_video(source_path: &Path) -> SlidecastResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| SlidecastError::capture(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(SlidecastError::capture(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| SlidecastError::capture(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| SlidecastError::capture("no video stream found"))?;
    let width = video_stream
        .width
        .ok_or_else(|| SlidecastError::capture("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| SlidecastError::capture("missing video height from ffprobe"))?;

    let (fps_num, fps_den) = parse_ff_ratio(video_stream.r_frame_rate.as_deref().unwrap_or("0/1"))
        .ok_or_else(|| SlidecastError::capture("invalid video r_frame_rate"))?;
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);
    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        fps_num,
        fps_den,
        duration_sec,
        has_audio,
    })
}

/// Sequential RGBA frame stream over one time window of an existing video.
///
/// Frames are produced in presentation order by a single ffmpeg decode child;
/// the stream ends when the window is exhausted.
pub struct FrameReader {
    child: Child,
    stdout: ChildStdout,
    frame_len: usize,
    pub width: u32,
    pub height: u32,
}

impl FrameReader {
    pub fn open(
        source: &VideoSourceInfo,
        start_sec: f64,
        end_sec: f64,
        out_fps: u32,
    ) -> SlidecastResult<Self> {
        if !(start_sec.is_finite() && end_sec.is_finite()) || start_sec >= end_sec {
            return Err(SlidecastError::validation(
                "frame window must be finite with start < end",
            ));
        }
        if out_fps == 0 {
            return Err(SlidecastError::validation("frame window fps must be > 0"));
        }

        let (width, height) = source.even_dimensions();
        if width == 0 || height == 0 {
            return Err(SlidecastError::validation(
                "source dimensions too small to re-encode",
            ));
        }

        let mut child = Command::new("ffmpeg")
            .args(["-v", "error", "-ss", &format!("{start_sec:.6}")])
            .arg("-i")
            .arg(&source.source_path)
            .args([
                "-t",
                &format!("{:.6}", end_sec - start_sec),
                "-vf",
                &format!("scale={width}:{height}"),
                "-r",
                &out_fps.to_string(),
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SlidecastError::capture(format!("failed to spawn ffmpeg decode: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SlidecastError::capture("failed to open ffmpeg decode stdout"))?;

        Ok(Self {
            child,
            stdout,
            frame_len: width as usize * height as usize * 4,
            width,
            height,
        })
    }

    /// Read the next frame, or `None` once the window is exhausted.
    pub fn next_frame(&mut self) -> SlidecastResult<Option<Vec<u8>>> {
        let mut buf = vec![0u8; self.frame_len];
        let mut filled = 0usize;
        while filled < buf.len() {
            match self.stdout.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(SlidecastError::capture(format!(
                        "failed reading decoded frame: {e}"
                    )));
                }
            }
        }
        if filled == 0 {
            return Ok(None);
        }
        if filled != buf.len() {
            return Err(SlidecastError::capture(
                "decode stream ended mid-frame (truncated source window)",
            ));
        }
        Ok(Some(buf))
    }

    /// Wait for the decode child and surface any decoder error.
    pub fn finish(mut self) -> SlidecastResult<()> {
        drop(self.stdout);
        let output = self
            .child
            .wait_with_output()
            .map_err(|e| SlidecastError::capture(format!("failed to wait for ffmpeg decode: {e}")))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SlidecastError::capture(format!(
                "ffmpeg decode exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.split('/');
    let a = parts.next()?.parse::<u32>().ok()?;
    let b = parts.next()?.parse::<u32>().ok()?;
    if b == 0 {
        return None;
    }
    Some((a, b))
}
