//! Per-request scratch area: the single owner of every temporary artifact.
//!
//! ## Why a scoped context instead of a shared temp directory?
//!
//! Every verification request creates files (the staged upload, one PNG per
//! rendered page) that must be gone by the time the response is finalised —
//! on success, on "nothing found", and on any error in between. Scattering
//! `remove_file` calls across branches is exactly how files leak on the one
//! branch nobody anticipated. Instead, each request owns a
//! [`ScratchContext`]: a uniquely-named directory that holds all of the
//! request's artifacts and is removed in one place.
//!
//! Removal happens twice over, deliberately:
//!
//! * [`ScratchContext::dispose`] — the explicit call on the orchestrator's
//!   single exit path, so cleanup failures can be logged.
//! * `Drop` — the [`TempDir`] inside removes the directory when the context
//!   is dropped, which covers cancellation: if the client disconnects and
//!   the request future is dropped mid-pipeline, the artifacts still go.
//!
//! Scratch directories never collide across concurrent requests: the
//! directory name embeds a fresh UUID, and artifact names are derived from
//! that same id.

use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};
use uuid::Uuid;

/// The set of temporary artifacts owned by one verification request.
pub struct ScratchContext {
    request_id: Uuid,
    dir: TempDir,
}

impl ScratchContext {
    /// Create a fresh scratch directory for one request.
    ///
    /// When `root` is `None` the system temp directory is used. The
    /// directory name embeds the request id, keeping concurrent requests'
    /// artifacts disjoint on disk.
    pub fn create(root: Option<&Path>) -> io::Result<Self> {
        let request_id = Uuid::new_v4();
        let prefix = format!("certiscan-{request_id}-");
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);

        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };

        debug!(request_id = %request_id, path = %dir.path().display(), "Created scratch area");

        Ok(Self { request_id, dir })
    }

    /// Unique id of the owning request; also used to derive artifact names.
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// The scratch directory all artifacts live under.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path at which the original upload is staged, keeping the caller's
    /// extension so the renderer and decoder see the format they expect.
    pub fn upload_path(&self, original_filename: &str) -> PathBuf {
        let ext = Path::new(original_filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .unwrap_or_default();
        self.path().join(format!("upload-{}{}", self.request_id, ext))
    }

    /// Remove the scratch directory and everything in it.
    ///
    /// Failures are logged and swallowed: a file that is already gone or a
    /// permission hiccup during cleanup must never mask the verification
    /// outcome the request already produced.
    pub fn dispose(self) {
        let Self { request_id, dir } = self;
        let path = dir.path().to_path_buf();
        match dir.close() {
            Ok(()) => debug!(request_id = %request_id, "Scratch area removed"),
            Err(e) => warn!(
                request_id = %request_id,
                path = %path.display(),
                error = %e,
                "Failed to remove scratch area"
            ),
        }
    }
}
