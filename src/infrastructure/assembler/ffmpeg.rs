use super::{AssemblyError, AudioAssembler};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Concat-demuxer input list written next to the fragments
pub const MANIFEST_FILE: &str = "filelist.txt";

/// Lossless concatenation through ffmpeg's concat demuxer (`-c copy`)
pub struct FfmpegAssembler {
    ffmpeg_path: PathBuf,
    manifest_dir: PathBuf,
}

impl FfmpegAssembler {
    pub fn new(ffmpeg_path: impl Into<PathBuf>, manifest_dir: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            manifest_dir: manifest_dir.into(),
        }
    }

    /// One `file '<path>'` line per fragment. ffmpeg wants forward slashes and
    /// single quotes escaped as `'\''`.
    fn manifest_contents(fragments: &[PathBuf]) -> String {
        fragments
            .iter()
            .map(|path| {
                let safe_path = path
                    .to_string_lossy()
                    .replace('\\', "/")
                    .replace('\'', r"'\''");
                format!("file '{}'\n", safe_path)
            })
            .collect()
    }
}

#[async_trait]
impl AudioAssembler for FfmpegAssembler {
    async fn assemble(&self, fragments: &[PathBuf], output: &Path) -> Result<(), AssemblyError> {
        let start_time = std::time::Instant::now();

        let manifest_path = std::path::absolute(self.manifest_dir.join(MANIFEST_FILE))?;
        tokio::fs::write(&manifest_path, Self::manifest_contents(fragments)).await?;
        let output = std::path::absolute(output)?;

        tracing::info!(
            ffmpeg = %self.ffmpeg_path.display(),
            fragment_count = fragments.len(),
            manifest = %manifest_path.display(),
            output = %output.display(),
            "Concatenating audio fragments with ffmpeg"
        );

        let result = tokio::process::Command::new(&self.ffmpeg_path)
            .args(["-y", "-loglevel", "error", "-f", "concat", "-safe", "0", "-i"])
            .arg(&manifest_path)
            .args(["-c", "copy"])
            .arg(&output)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => AssemblyError::ToolNotFound(self.ffmpeg_path.clone()),
                _ => AssemblyError::Io(e),
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            tracing::error!(
                status = %result.status,
                stderr = %stderr,
                "ffmpeg concatenation failed"
            );
            return Err(AssemblyError::Failed {
                tool: self.ffmpeg_path.display().to_string(),
                status: result.status.to_string(),
                stderr,
            });
        }

        tracing::info!(
            latency_ms = start_time.elapsed().as_millis(),
            output = %output.display(),
            "Audio fragments concatenated"
        );

        Ok(())
    }
}
