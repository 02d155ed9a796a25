//! Trim and concatenate media through an external toolchain.
//!
//! One [`MediaEngine`] serves one editing session. It must be [`load`]ed before
//! use and runs a single operation at a time; a second call while one is in
//! flight is rejected with [`ReelcutError::Busy`].
//!
//! [`load`]: MediaEngine::load

pub mod progress;
pub mod scratch;
pub mod toolchain;

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    sync::atomic::{AtomicBool, Ordering},
};

use tokio::{
    fs,
    sync::{Mutex, MutexGuard, OnceCell, watch},
};

pub use progress::{JobPhase, ProcessingJob, ProgressTracker};
pub use scratch::ScratchSet;
pub use toolchain::{FfmpegToolchain, ToolOutput, Toolchain};

use crate::{
    config::EngineConfig,
    edit_plan::EditPlan,
    error::{ReelcutError, Result},
    highlights::ClipRange,
};

/// Share of a concatenation spent extracting clips; the join gets the rest.
const CLIP_EXTRACTION_SHARE: f64 = 50.0;
const TRIM_INPUT_WRITTEN: f64 = 10.0;
const TOOLCHAIN_DONE: f64 = 95.0;
const STDERR_TAIL_LINES: usize = 10;

/// A binary media payload and its duration in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaAsset {
    pub data: Vec<u8>,
    pub duration: f64,
}

impl MediaAsset {
    pub fn new(data: Vec<u8>, duration: f64) -> Self {
        Self { data, duration }
    }

    pub async fn from_file(path: &Path, duration: f64) -> Result<Self> {
        let data = fs::read(path).await?;
        Ok(Self { data, duration })
    }

    pub async fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.data).await?;
        Ok(())
    }
}

enum Bound {
    Until(f64),
    For(f64),
}

pub struct MediaEngine<T: Toolchain = FfmpegToolchain> {
    config: EngineConfig,
    toolchain: T,
    version: OnceCell<String>,
    loading: AtomicBool,
    busy: Mutex<()>,
    progress: ProgressTracker,
}

impl MediaEngine<FfmpegToolchain> {
    pub fn new(config: EngineConfig) -> Self {
        let toolchain = FfmpegToolchain::new(config.ffmpeg_path.clone());
        Self::with_toolchain(config, toolchain)
    }
}

impl<T: Toolchain> MediaEngine<T> {
    pub fn with_toolchain(config: EngineConfig, toolchain: T) -> Self {
        Self {
            config,
            toolchain,
            version: OnceCell::new(),
            loading: AtomicBool::new(false),
            busy: Mutex::new(()),
            progress: ProgressTracker::new(),
        }
    }

    pub fn toolchain(&self) -> &T {
        &self.toolchain
    }

    pub fn is_loaded(&self) -> bool {
        self.version.initialized()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Toolchain version banner, once loaded.
    pub fn version(&self) -> Option<&str> {
        self.version.get().map(String::as_str)
    }

    pub fn subscribe(&self) -> watch::Receiver<ProcessingJob> {
        self.progress.subscribe()
    }

    pub fn progress_percent(&self) -> f64 {
        self.progress.current().progress_percent
    }

    /// Initialize the toolchain. Idempotent; concurrent callers share the
    /// first caller's initialization.
    pub async fn load(&self) -> Result<()> {
        self.version
            .get_or_try_init(|| async {
                let _flag = LoadingFlag::raise(&self.loading);
                self.progress.reset(JobPhase::Loading);

                match self.initialize().await {
                    Ok(version) => {
                        tracing::info!(version = version.as_str(), "media toolchain loaded");
                        self.progress.set_phase(JobPhase::Idle);
                        Ok(version)
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "media toolchain failed to load");
                        self.progress.fail();
                        Err(e)
                    }
                }
            })
            .await?;
        Ok(())
    }

    async fn initialize(&self) -> Result<String> {
        fs::create_dir_all(&self.config.scratch_dir)
            .await
            .map_err(|e| {
                ReelcutError::processing(
                    "load",
                    format!(
                        "cannot create scratch dir {}: {e}",
                        self.config.scratch_dir.display()
                    ),
                )
            })?;

        self.toolchain
            .probe()
            .await
            .map_err(|e| ReelcutError::processing("load", e.to_string()))
    }

    /// Cut `[start, end]` out of `asset` without re-encoding.
    pub async fn trim(&self, asset: &MediaAsset, start: f64, end: f64) -> Result<MediaAsset> {
        const OP: &str = "trim";
        validate_range(OP, start, end, asset.duration)?;

        let _busy = self.begin(OP)?;
        tracing::info!(start, end, "trimming media");
        let result = self.run_trim(asset, start, end).await;
        self.settle(OP, result)
    }

    async fn run_trim(&self, asset: &MediaAsset, start: f64, end: f64) -> Result<MediaAsset> {
        const OP: &str = "trim";
        let mut scratch = ScratchSet::new(&self.config.scratch_dir, &self.config.container);
        let input = scratch.media("input");
        let output = scratch.media("output");

        write_scratch(OP, &input, &asset.data).await?;
        self.progress.advance(TRIM_INPUT_WRITTEN);

        let args = extract_args(&input, start, Bound::Until(end), &output);
        self.invoke(OP, "extracting range", &args, end - start, TRIM_INPUT_WRITTEN, TOOLCHAIN_DONE)
            .await?;

        let data = read_scratch(OP, &output).await?;
        Ok(MediaAsset {
            data,
            duration: end - start,
        })
    }

    /// Extract every clip and join them in order without re-encoding.
    ///
    /// The result's duration is the sum of the clip durations.
    pub async fn concatenate(&self, asset: &MediaAsset, clips: &[ClipRange]) -> Result<MediaAsset> {
        const OP: &str = "concatenate";
        if clips.is_empty() {
            return Err(ReelcutError::validation("concatenate needs at least one clip"));
        }
        for clip in clips {
            validate_range(OP, clip.start, clip.end, asset.duration)?;
        }

        let _busy = self.begin(OP)?;
        tracing::info!(clips = clips.len(), "concatenating media");
        let result = self.run_concatenate(asset, clips).await;
        self.settle(OP, result)
    }

    async fn run_concatenate(&self, asset: &MediaAsset, clips: &[ClipRange]) -> Result<MediaAsset> {
        const OP: &str = "concatenate";
        let mut scratch = ScratchSet::new(&self.config.scratch_dir, &self.config.container);
        let input = scratch.media("input");
        write_scratch(OP, &input, &asset.data).await?;

        let count = clips.len() as f64;
        let mut parts = Vec::with_capacity(clips.len());
        for (i, clip) in clips.iter().enumerate() {
            let part = scratch.media(&format!("clip-{i}"));
            let args = extract_args(&input, clip.start, Bound::For(clip.duration()), &part);
            let from = CLIP_EXTRACTION_SHARE * i as f64 / count;
            let to = CLIP_EXTRACTION_SHARE * (i + 1) as f64 / count;

            self.invoke(OP, &format!("extracting clip {i}"), &args, clip.duration(), from, to)
                .await?;
            parts.push(part);
        }

        let manifest = scratch.file("concat.txt");
        write_scratch(OP, &manifest, concat_manifest(&parts).as_bytes()).await?;

        let output = scratch.media("output");
        let total: f64 = clips.iter().map(ClipRange::duration).sum();
        let args = concat_args(&manifest, &output);
        self.invoke(OP, "joining clips", &args, total, CLIP_EXTRACTION_SHARE, TOOLCHAIN_DONE)
            .await?;

        let data = read_scratch(OP, &output).await?;
        Ok(MediaAsset {
            data,
            duration: total,
        })
    }

    /// Execute an edit plan: a plain trim when it keeps one contiguous
    /// segment, otherwise a concatenation of the kept segments.
    pub async fn render(&self, asset: &MediaAsset, plan: &EditPlan) -> Result<MediaAsset> {
        let segments = plan.segments();
        match segments.as_slice() {
            [] => Err(ReelcutError::validation("edit plan keeps nothing of the video")),
            [only] => self.trim(asset, only.start, only.end).await,
            _ => self.concatenate(asset, &segments).await,
        }
    }

    fn begin(&self, operation: &'static str) -> Result<MutexGuard<'_, ()>> {
        if !self.is_loaded() {
            return Err(ReelcutError::NotLoaded { operation });
        }
        let guard = self
            .busy
            .try_lock()
            .map_err(|_| ReelcutError::Busy { operation })?;
        self.progress.reset(JobPhase::Processing);
        Ok(guard)
    }

    fn settle(&self, operation: &'static str, result: Result<MediaAsset>) -> Result<MediaAsset> {
        match &result {
            Ok(asset) => {
                tracing::info!(operation, duration = asset.duration, bytes = asset.data.len(), "media ready");
                self.progress.finish();
            }
            Err(e) => {
                tracing::error!(operation, error = %e, "media operation failed");
                self.progress.fail();
            }
        }
        result
    }

    async fn invoke(
        &self,
        operation: &'static str,
        step: &str,
        args: &[OsString],
        expected_secs: f64,
        from: f64,
        to: f64,
    ) -> Result<()> {
        let progress = &self.progress;
        let mut on_progress = |ratio: f64| progress.advance_within(from, to, ratio);

        let output = self
            .toolchain
            .run(args, expected_secs, &mut on_progress)
            .await
            .map_err(|e| ReelcutError::processing(operation, format!("{step}: {e}")))?;

        if !output.success {
            return Err(ReelcutError::processing(
                operation,
                format!("{step}: {}", stderr_tail(&output.stderr)),
            ));
        }

        progress.advance(to);
        Ok(())
    }
}

/// Clears the loading flag however initialization ends.
struct LoadingFlag<'a>(&'a AtomicBool);

impl<'a> LoadingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// A range must be non-empty and, when the asset's duration is known, end
/// within it.
fn validate_range(operation: &str, start: f64, end: f64, duration: f64) -> Result<()> {
    if !start.is_finite() || !end.is_finite() || start < 0.0 || end <= start {
        return Err(ReelcutError::validation(format!(
            "{operation}: invalid range [{start}, {end}]"
        )));
    }
    let known = duration.is_finite() && duration > 0.0;
    if known && end > duration {
        return Err(ReelcutError::validation(format!(
            "{operation}: range [{start}, {end}] ends after the media ({duration}s)"
        )));
    }
    Ok(())
}

async fn write_scratch(operation: &'static str, path: &Path, data: &[u8]) -> Result<()> {
    fs::write(path, data).await.map_err(|e| {
        ReelcutError::processing(operation, format!("writing {}: {e}", path.display()))
    })
}

async fn read_scratch(operation: &'static str, path: &Path) -> Result<Vec<u8>> {
    fs::read(path).await.map_err(|e| {
        ReelcutError::processing(operation, format!("reading {}: {e}", path.display()))
    })
}

fn seconds_arg(secs: f64) -> String {
    format!("{:.3}", secs)
}

fn extract_args(input: &Path, start: f64, bound: Bound, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-i".into(),
        input.into(),
        "-ss".into(),
        seconds_arg(start).into(),
    ];
    match bound {
        Bound::Until(end) => {
            args.push("-to".into());
            args.push(seconds_arg(end).into());
        }
        Bound::For(duration) => {
            args.push("-t".into());
            args.push(seconds_arg(duration).into());
        }
    }
    for arg in ["-c", "copy", "-avoid_negative_ts", "make_zero"] {
        args.push(arg.into());
    }
    args.push(output.into());
    args
}

fn concat_args(manifest: &Path, output: &Path) -> Vec<OsString> {
    vec![
        "-f".into(),
        "concat".into(),
        "-safe".into(),
        "0".into(),
        "-i".into(),
        manifest.into(),
        "-c".into(),
        "copy".into(),
        output.into(),
    ]
}

/// Concat demuxer manifest, one `file '<name>'` line per part.
///
/// The demuxer resolves relative entries against the manifest's directory,
/// so parts are listed by file name and must sit next to the manifest.
pub fn concat_manifest(parts: &[PathBuf]) -> String {
    parts
        .iter()
        .map(|p| {
            let name = p.file_name().unwrap_or(p.as_os_str()).to_string_lossy();
            format!("file '{}'", name.replace('\'', r"'\''"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return "toolchain exited with a failure status".to_string();
    }
    lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n")
}
