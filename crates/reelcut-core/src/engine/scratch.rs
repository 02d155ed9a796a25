use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use uuid::Uuid;

/// Scratch files of one engine operation, removed when the set is dropped.
///
/// Dropping happens on success, on error and when the operation future is
/// cancelled, so no exit path leaves files behind.
pub struct ScratchSet {
    dir: PathBuf,
    prefix: String,
    extension: String,
    paths: Vec<PathBuf>,
}

impl ScratchSet {
    pub fn new(dir: &Path, extension: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            prefix: Uuid::new_v4().simple().to_string(),
            extension: extension.to_string(),
            paths: Vec::new(),
        }
    }

    /// Reserve a media file path, e.g. `<job>-clip-0.mp4`.
    pub fn media(&mut self, name: &str) -> PathBuf {
        let path = self
            .dir
            .join(format!("{}-{}.{}", self.prefix, name, self.extension));
        self.track(path)
    }

    /// Reserve a path with an explicit file name suffix, e.g. `<job>-concat.txt`.
    pub fn file(&mut self, name: &str) -> PathBuf {
        let path = self.dir.join(format!("{}-{}", self.prefix, name));
        self.track(path)
    }

    fn track(&mut self, path: PathBuf) -> PathBuf {
        self.paths.push(path.clone());
        path
    }
}

impl Drop for ScratchSet {
    fn drop(&mut self) {
        for path in &self.paths {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove scratch file");
                }
            }
        }
    }
}
