use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{SlidecastError, SlidecastResult};

/// Container/codec pairing an artifact is tagged with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MediaContainer {
    /// WebM, VP8 video. Used for generated video and trim output.
    WebmVp8,
    /// MP4 after audio remux (video copied, AAC audio).
    Mp4,
}

impl MediaContainer {
    pub fn extension(self) -> &'static str {
        match self {
            Self::WebmVp8 => "webm",
            Self::Mp4 => "mp4",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::WebmVp8 => "video/webm;codecs=vp8",
            Self::Mp4 => "video/mp4",
        }
    }
}

/// A finalized, immutable encoded media payload.
#[derive(Clone, Debug)]
pub struct EncodedArtifact {
    pub bytes: Vec<u8>,
    pub container: MediaContainer,
    pub filename: Option<String>,
}

impl EncodedArtifact {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn write_to(&self, path: &Path) -> SlidecastResult<()> {
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("failed to write artifact to '{}'", path.display()))?;
        Ok(())
    }
}

enum CaptureState {
    /// Chunks accumulate in arrival order.
    Recording(Vec<Vec<u8>>),
    /// Finalized exactly once; the artifact is handed out at most once.
    Finalized(Option<EncodedArtifact>),
    Failed,
}

/// Accumulates encoded chunks for one job and assembles them into a single
/// artifact on stop.
///
/// `stop` may be invoked from more than one trigger (scheduler completion,
/// trim boundary crossing); only the first transition finalizes. A failed
/// pipeline discards its partial buffer rather than finalizing it.
pub struct CapturePipeline {
    container: MediaContainer,
    filename: Option<String>,
    state: CaptureState,
}

impl CapturePipeline {
    pub fn start(container: MediaContainer, filename: Option<String>) -> Self {
        Self {
            container,
            filename,
            state: CaptureState::Recording(Vec::new()),
        }
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, CaptureState::Recording(_))
    }

    pub fn chunk_count(&self) -> usize {
        match &self.state {
            CaptureState::Recording(chunks) => chunks.len(),
            _ => 0,
        }
    }

    /// Append one chunk; arrival order is preserved verbatim.
    pub fn push_chunk(&mut self, bytes: Vec<u8>) -> SlidecastResult<()> {
        match &mut self.state {
            CaptureState::Recording(chunks) => {
                if !bytes.is_empty() {
                    chunks.push(bytes);
                }
                Ok(())
            }
            _ => Err(SlidecastError::capture(
                "chunk delivered after the capture session ended",
            )),
        }
    }

    /// End the session. Idempotent: the first call finalizes, later calls
    /// are no-ops and never duplicate or corrupt the artifact.
    pub fn stop(&mut self) {
        if let CaptureState::Recording(chunks) = &mut self.state {
            let total: usize = chunks.iter().map(Vec::len).sum();
            let mut bytes = Vec::with_capacity(total);
            for chunk in chunks.drain(..) {
                bytes.extend_from_slice(&chunk);
            }
            self.state = CaptureState::Finalized(Some(EncodedArtifact {
                bytes,
                container: self.container,
                filename: self.filename.clone(),
            }));
        }
    }

    /// Abort the session, discarding any partial buffer.
    pub fn fail(&mut self) {
        self.state = CaptureState::Failed;
    }

    /// Hand the finalized artifact to its new owner. Returns `Some` exactly
    /// once per job.
    pub fn take_artifact(&mut self) -> Option<EncodedArtifact> {
        match &mut self.state {
            CaptureState::Finalized(artifact) => artifact.take(),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/pipeline.rs"]
mod tests;
