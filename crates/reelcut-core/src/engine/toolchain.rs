use std::{ffi::OsString, io, path::PathBuf, process::Stdio};

use tokio::{
    io::{AsyncBufReadExt, AsyncReadExt, BufReader},
    process::Command,
};

/// Result of one toolchain invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub success: bool,
    pub stderr: String,
}

/// The external media toolchain the engine drives.
///
/// `run` receives ffmpeg-style arguments and reports how far it got as a ratio
/// of `expected_secs` of output media.
pub trait Toolchain: Send + Sync {
    /// Check the toolchain is usable, returning a version banner.
    async fn probe(&self) -> io::Result<String>;

    async fn run(
        &self,
        args: &[OsString],
        expected_secs: f64,
        on_progress: &mut (dyn FnMut(f64) + Send),
    ) -> io::Result<ToolOutput>;
}

pub struct FfmpegToolchain {
    binary: PathBuf,
}

impl FfmpegToolchain {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Toolchain for FfmpegToolchain {
    async fn probe(&self) -> io::Result<String> {
        let output = Command::new(&self.binary).arg("-version").output().await?;

        if !output.status.success() {
            return Err(io::Error::other(format!(
                "{} -version exited with {}",
                self.binary.display(),
                output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().to_string())
    }

    async fn run(
        &self,
        args: &[OsString],
        expected_secs: f64,
        on_progress: &mut (dyn FnMut(f64) + Send),
    ) -> io::Result<ToolOutput> {
        tracing::debug!(binary = %self.binary.display(), ?args, "running ffmpeg");

        let mut child = Command::new(&self.binary)
            .args(["-hide_banner", "-nostdin", "-nostats", "-progress", "pipe:1", "-y"])
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("ffmpeg stdout was not captured"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("ffmpeg stderr was not captured"))?;

        let read_progress = async {
            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines.next_line().await? {
                if let Some(secs) = parse_progress_line(&line)
                    && expected_secs > 0.0
                {
                    on_progress(secs / expected_secs);
                }
            }
            Ok::<_, io::Error>(())
        };
        let read_stderr = async {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf).await.map(|_| buf)
        };

        let (progress, stderr) = tokio::join!(read_progress, read_stderr);
        progress?;
        let stderr = stderr?;
        let status = child.wait().await?;

        Ok(ToolOutput {
            success: status.success(),
            stderr: String::from_utf8_lossy(&stderr).to_string(),
        })
    }
}

/// Seconds of output written, from a `-progress` key/value line.
///
/// `out_time_ms` is in microseconds as well, despite its name.
fn parse_progress_line(line: &str) -> Option<f64> {
    let (key, value) = line.trim().split_once('=')?;
    match key {
        "out_time_us" | "out_time_ms" => value.parse::<u64>().ok().map(|us| us as f64 / 1e6),
        _ => None,
    }
}
