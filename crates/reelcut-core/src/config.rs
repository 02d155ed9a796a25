use std::path::PathBuf;

pub const FFMPEG_ENV_VAR: &str = "REELCUT_FFMPEG";
pub const SCRATCH_DIR_ENV_VAR: &str = "REELCUT_SCRATCH_DIR";

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// ffmpeg binary, resolved through `PATH` when relative.
    pub ffmpeg_path: PathBuf,
    /// Where per-operation scratch files are written.
    pub scratch_dir: PathBuf,
    /// Container extension used for scratch media files.
    pub container: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            scratch_dir: get_scratch_root(),
            container: "mp4".to_string(),
        }
    }
}

impl EngineConfig {
    /// Defaults, overridden by `REELCUT_FFMPEG` and `REELCUT_SCRATCH_DIR`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var(FFMPEG_ENV_VAR) {
            config.ffmpeg_path = PathBuf::from(path);
        }
        if let Ok(dir) = std::env::var(SCRATCH_DIR_ENV_VAR) {
            config.scratch_dir = PathBuf::from(dir);
        }
        config
    }
}

pub fn get_scratch_root() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("reelcut")
        .join("scratch")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scratch_dir_is_namespaced() {
        let config = EngineConfig::default();
        assert!(config.scratch_dir.ends_with("reelcut/scratch"));
        assert_eq!(config.container, "mp4");
    }
}
