use std::{
    io::Read,
    process::{Child, ChildStdin, Command, Stdio},
    sync::mpsc,
    thread,
};

use crate::{
    capture::pipeline::{CapturePipeline, MediaContainer},
    engine::compositor::FrameRgba,
    foundation::error::{SlidecastError, SlidecastResult},
    foundation::math::mul_div255_u16,
};

const CHUNK_BYTES: usize = 64 * 1024;

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub bitrate_kbps: u32,
}

impl EncodeConfig {
    pub fn validate(&self) -> SlidecastResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SlidecastError::validation(
                "encode width/height must be non-zero",
            ));
        }
        if !self.width.is_multiple_of(2) || !self.height.is_multiple_of(2) {
            // yuv420p output needs even dimensions.
            return Err(SlidecastError::validation(
                "encode width/height must be even (required for yuv420p output)",
            ));
        }
        if self.fps == 0 {
            return Err(SlidecastError::validation("encode fps must be non-zero"));
        }
        if self.bitrate_kbps == 0 {
            return Err(SlidecastError::validation("encode bitrate must be non-zero"));
        }
        Ok(())
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Live encode session: raw RGBA frames in, ordered WebM/VP8 chunks out.
///
/// We intentionally drive the system `ffmpeg` binary rather than linking
/// codec libraries, so there are no native dev header/lib requirements.
/// A reader thread chunks the encoder's stdout; chunk order is the encoder's
/// own delivery order and is never reordered downstream.
pub struct FfmpegEncoder {
    cfg: EncodeConfig,
    bg_rgba: [u8; 4],
    child: Child,
    stdin: Option<ChildStdin>,
    chunk_rx: mpsc::Receiver<Vec<u8>>,
    reader: Option<thread::JoinHandle<std::io::Result<()>>>,
    stderr_reader: Option<thread::JoinHandle<String>>,
    scratch: Vec<u8>,
}

impl FfmpegEncoder {
    pub fn new(cfg: EncodeConfig, bg_rgba: [u8; 4]) -> SlidecastResult<Self> {
        cfg.validate()?;

        if !is_ffmpeg_on_path() {
            return Err(SlidecastError::capture(
                "ffmpeg is required for video capture, but was not found on PATH",
            ));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &cfg.fps.to_string(),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libvpx",
            "-b:v",
            &format!("{}k", cfg.bitrate_kbps),
            "-pix_fmt",
            "yuv420p",
            "-f",
            "webm",
            "pipe:1",
        ]);

        let mut child = cmd.spawn().map_err(|e| {
            SlidecastError::capture(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SlidecastError::capture("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| SlidecastError::capture("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| SlidecastError::capture("failed to open ffmpeg stderr (unexpected)"))?;

        // stderr is drained off-thread; a full pipe would stall the child.
        let stderr_reader = thread::spawn(move || {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf);
            buf
        });

        let (chunk_tx, chunk_rx) = mpsc::channel::<Vec<u8>>();
        let reader = thread::spawn(move || -> std::io::Result<()> {
            let mut buf = vec![0u8; CHUNK_BYTES];
            loop {
                let n = stdout.read(&mut buf)?;
                if n == 0 {
                    return Ok(());
                }
                if chunk_tx.send(buf[..n].to_vec()).is_err() {
                    // Receiver dropped; the session is being torn down.
                    return Ok(());
                }
            }
        });

        Ok(Self {
            scratch: vec![0u8; (cfg.width * cfg.height * 4) as usize],
            cfg,
            bg_rgba,
            child,
            stdin: Some(stdin),
            chunk_rx,
            reader: Some(reader),
            stderr_reader: Some(stderr_reader),
        })
    }

    pub fn container(&self) -> MediaContainer {
        MediaContainer::WebmVp8
    }

    pub fn encode_frame(&mut self, frame: &FrameRgba) -> SlidecastResult<()> {
        if frame.width != self.cfg.width || frame.height != self.cfg.height {
            return Err(SlidecastError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.cfg.width, self.cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(SlidecastError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_to_opaque_rgba8(
            &mut self.scratch,
            &frame.data,
            frame.premultiplied,
            self.bg_rgba,
        )?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(SlidecastError::capture("encode session is already finished"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            SlidecastError::capture(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;

        Ok(())
    }

    /// Forward every chunk delivered so far, preserving arrival order.
    pub fn drain_chunks(&mut self, sink: &mut CapturePipeline) -> SlidecastResult<()> {
        while let Ok(chunk) = self.chunk_rx.try_recv() {
            sink.push_chunk(chunk)?;
        }
        Ok(())
    }

    /// Close the session: flush the encoder, forward the remaining chunks,
    /// and surface any encoder failure instead of finalizing partial output.
    pub fn finish(mut self, sink: &mut CapturePipeline) -> SlidecastResult<()> {
        drop(self.stdin.take());

        let reader_result = match self.reader.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| SlidecastError::capture("encoder reader thread panicked"))?,
            None => Ok(()),
        };

        let status = self
            .child
            .wait()
            .map_err(|e| SlidecastError::capture(format!("failed to wait for ffmpeg: {e}")))?;

        let stderr = match self.stderr_reader.take() {
            Some(handle) => handle.join().unwrap_or_default(),
            None => String::new(),
        };
        if !status.success() {
            return Err(SlidecastError::capture(format!(
                "ffmpeg exited with status {status}: {}",
                stderr.trim()
            )));
        }
        reader_result
            .map_err(|e| SlidecastError::capture(format!("failed reading encoder output: {e}")))?;

        while let Ok(chunk) = self.chunk_rx.try_recv() {
            sink.push_chunk(chunk)?;
        }
        Ok(())
    }

    /// Tear the session down without finalizing. Used on failure and
    /// cancellation paths; best-effort, never masks the originating error.
    pub fn abort(mut self) {
        drop(self.stdin.take());
        let _ = self.child.kill();
        let _ = self.child.wait();
        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.stderr_reader.take() {
            let _ = handle.join();
        }
    }
}

/// Flatten RGBA (premultiplied or straight) over an opaque background for the
/// rawvideo pipe.
fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> SlidecastResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(SlidecastError::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = u16::from(bg_rgba[0]);
    let bg_g = u16::from(bg_rgba[1]);
    let bg_b = u16::from(bg_rgba[2]);

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = u16::from(s[3]);
        if a == 255 {
            d.copy_from_slice(s);
            d[3] = 255;
            continue;
        }

        let inv = 255u16 - a;

        let (r, g, b) = if src_is_premul {
            (
                u16::from(s[0]) + mul_div255_u16(bg_r, inv),
                u16::from(s[1]) + mul_div255_u16(bg_g, inv),
                u16::from(s[2]) + mul_div255_u16(bg_b, inv),
            )
        } else {
            (
                mul_div255_u16(u16::from(s[0]), a) + mul_div255_u16(bg_r, inv),
                mul_div255_u16(u16::from(s[1]), a) + mul_div255_u16(bg_g, inv),
                mul_div255_u16(u16::from(s[2]), a) + mul_div255_u16(bg_b, inv),
            )
        };

        d[0] = r.min(255) as u8;
        d[1] = g.min(255) as u8;
        d[2] = b.min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}
