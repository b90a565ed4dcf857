use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    capture::pipeline::EncodedArtifact,
    foundation::error::SlidecastResult,
};

/// A revocable handle standing in for an artifact's bytes: a temp file that
/// is deleted exactly once, on revocation or drop, whichever comes first.
#[derive(Debug)]
pub struct TransientSource {
    path: PathBuf,
    revoked: bool,
}

impl TransientSource {
    pub fn create(artifact: &EncodedArtifact) -> SlidecastResult<Self> {
        let path = std::env::temp_dir().join(format!(
            "slidecast_src_{}_{}.{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0),
            artifact.container.extension()
        ));
        std::fs::write(&path, &artifact.bytes)
            .with_context(|| format!("failed to write transient source '{}'", path.display()))?;
        Ok(Self {
            path,
            revoked: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_live(&self) -> bool {
        !self.revoked
    }

    /// Release the underlying file. Idempotent; best-effort removal.
    pub fn revoke(&mut self) {
        if !self.revoked {
            let _ = std::fs::remove_file(&self.path);
            self.revoked = true;
        }
    }
}

impl Drop for TransientSource {
    fn drop(&mut self) {
        self.revoke();
    }
}

/// The playable source binding of one video element: the original file plus
/// at most one live transient source at a time.
#[derive(Debug)]
pub struct VideoSlot {
    origin: PathBuf,
    transient: Option<TransientSource>,
    duration_sec: f64,
    position_sec: f64,
}

impl VideoSlot {
    pub fn new(origin: impl Into<PathBuf>, duration_sec: f64) -> Self {
        Self {
            origin: origin.into(),
            transient: None,
            duration_sec,
            position_sec: 0.0,
        }
    }

    /// The currently playable source path.
    pub fn current_source(&self) -> &Path {
        self.transient
            .as_ref()
            .map(TransientSource::path)
            .unwrap_or(&self.origin)
    }

    pub fn duration_sec(&self) -> f64 {
        self.duration_sec
    }

    pub fn position_sec(&self) -> f64 {
        self.position_sec
    }

    pub fn has_transient(&self) -> bool {
        self.transient.as_ref().is_some_and(TransientSource::is_live)
    }

    /// Rebind to a freshly trimmed artifact: the previous transient source
    /// (if any) is revoked first, then the new one becomes current, the
    /// duration is updated, and playback position resets to 0.
    pub fn bind_artifact(
        &mut self,
        artifact: &EncodedArtifact,
        duration_sec: f64,
    ) -> SlidecastResult<()> {
        let fresh = TransientSource::create(artifact)?;
        if let Some(mut previous) = self.transient.take() {
            previous.revoke();
        }
        self.transient = Some(fresh);
        self.duration_sec = duration_sec;
        self.position_sec = 0.0;
        Ok(())
    }
}
