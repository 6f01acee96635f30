use async_trait::async_trait;
use log::{debug, error};
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::app_config::MediaToolConfig;
use crate::errors::MediaToolError;
use super::{ComposeJob, FrameSpec, MediaTool};

// @module: ffmpeg / ffprobe subprocess driver

/// Media tool backed by the ffmpeg command line programs
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl Ffmpeg {
    pub fn new(ffmpeg_path: impl Into<String>, ffprobe_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
        }
    }

    // @creates: Driver from configuration, deriving ffprobe's location when needed
    pub fn from_config(config: &MediaToolConfig) -> Self {
        Self::new(config.ffmpeg_path.clone(), config.resolved_ffprobe_path())
    }

    /// Check that both programs can be started
    pub async fn check_available(&self) -> Result<(), MediaToolError> {
        for tool in [&self.ffmpeg_path, &self.ffprobe_path] {
            run_tool(tool, &["-version".to_string()]).await?;
        }
        Ok(())
    }

    /// Arguments of the duration probe
    pub fn probe_args(path: &Path) -> Vec<String> {
        vec![
            "-v".into(), "error".into(),
            "-show_entries".into(), "format=duration".into(),
            "-of".into(), "default=noprint_wrappers=1:nokey=1".into(),
            path_arg(path),
        ]
    }

    /// Parse ffprobe's duration output
    pub fn parse_duration(stdout: &str) -> Result<f64, MediaToolError> {
        let trimmed = stdout.trim();
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
            _ => Err(MediaToolError::ProbeFailure(format!("unexpected probe output '{}'", trimmed))),
        }
    }

    /// Content of a concat demuxer list file
    pub fn concat_list(inputs: &[PathBuf]) -> String {
        inputs
            .iter()
            .map(|path| {
                let unix = path.to_string_lossy().replace('\\', "/");
                format!("file '{}'\n", unix.replace('\'', "'\\''"))
            })
            .collect()
    }

    pub fn concat_args(list_file: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".into(),
            "-f".into(), "concat".into(),
            "-safe".into(), "0".into(),
            "-i".into(), path_arg(list_file),
            "-c".into(), "copy".into(),
            path_arg(output),
        ]
    }

    pub fn solid_color_args(frame: &FrameSpec, duration: f64, output: &Path) -> Vec<String> {
        vec![
            "-y".into(),
            "-f".into(), "lavfi".into(),
            "-i".into(), format!("color=c={}:s={}x{}:d={:.3}", frame.color, frame.width, frame.height, duration),
            "-pix_fmt".into(), "yuv420p".into(),
            path_arg(output),
        ]
    }

    pub fn fit_clip_args(source: &Path, frame: &FrameSpec, duration: f64, output: &Path) -> Vec<String> {
        let filter = format!(
            "scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h}",
            w = frame.width,
            h = frame.height
        );
        vec![
            "-y".into(),
            "-stream_loop".into(), "-1".into(),
            "-i".into(), path_arg(source),
            "-vf".into(), filter,
            "-t".into(), format!("{:.3}", duration),
            "-c:v".into(), "libx264".into(),
            "-preset".into(), "ultrafast".into(),
            "-pix_fmt".into(), "yuv420p".into(),
            "-an".into(),
            path_arg(output),
        ]
    }

    pub fn compose_args(job: &ComposeJob<'_>) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-y".into(),
            "-i".into(), path_arg(job.video),
            "-i".into(), path_arg(job.audio),
        ];

        if let Some(subtitles) = job.subtitles {
            args.push("-vf".into());
            args.push(format!("ass='{}'", escape_filter_path(subtitles)));
        }

        let tail: [String; 17] = [
            "-map".into(), "0:v".into(),
            "-map".into(), "1:a".into(),
            "-c:v".into(), "libx264".into(),
            "-preset".into(), job.encoding.preset.clone(),
            "-crf".into(), job.encoding.crf.to_string(),
            "-c:a".into(), "aac".into(),
            "-b:a".into(), job.encoding.audio_bitrate.clone(),
            "-t".into(), format!("{:.3}", job.duration),
            "-shortest".into(),
        ];
        args.extend(tail);
        args.push(path_arg(job.output));

        args
    }
}

#[async_trait]
impl MediaTool for Ffmpeg {
    async fn probe_duration(&self, path: &Path) -> Result<f64, MediaToolError> {
        let stdout = run_tool(&self.ffprobe_path, &Self::probe_args(path)).await?;
        Self::parse_duration(&stdout)
    }

    async fn concat_audio(&self, inputs: &[PathBuf], list_file: &Path, output: &Path) -> Result<(), MediaToolError> {
        tokio::fs::write(list_file, Self::concat_list(inputs)).await?;
        run_tool(&self.ffmpeg_path, &Self::concat_args(list_file, output)).await?;
        Ok(())
    }

    async fn solid_color(&self, frame: &FrameSpec, duration: f64, output: &Path) -> Result<(), MediaToolError> {
        run_tool(&self.ffmpeg_path, &Self::solid_color_args(frame, duration, output)).await?;
        Ok(())
    }

    async fn fit_clip(&self, source: &Path, frame: &FrameSpec, duration: f64, output: &Path) -> Result<(), MediaToolError> {
        run_tool(&self.ffmpeg_path, &Self::fit_clip_args(source, frame, duration, output)).await?;
        Ok(())
    }

    async fn compose(&self, job: &ComposeJob<'_>) -> Result<(), MediaToolError> {
        run_tool(&self.ffmpeg_path, &Self::compose_args(job)).await?;
        Ok(())
    }
}

/// Run a tool to completion, returning stdout on success
async fn run_tool(tool: &str, args: &[String]) -> Result<String, MediaToolError> {
    debug!("{} {}", tool, args.join(" "));

    let output = Command::new(tool)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| MediaToolError::Launch {
            tool: tool.to_string(),
            message: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let diagnostic = filter_ffmpeg_stderr(&stderr);
        error!("{} failed: {}", tool, diagnostic);
        return Err(MediaToolError::Failed {
            tool: tool.to_string(),
            status: output.status.code().unwrap_or(-1),
            diagnostic,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Escape a path for use inside a quoted filter argument
pub fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .replace(':', "\\:")
        .replace('\'', "\\'")
}

/// Filter ffmpeg stderr to only show meaningful error lines, stripping the
/// version banner, build configuration, and stream metadata noise.
pub fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "ffprobe version",
        "built with",
        "configuration:",
        "libav",
        "libsw",
        "libpostproc",
        "Input #",
        "Metadata:",
        "Duration:",
        "Stream #",
        "encoder",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .filter(|line| !noise_prefixes.iter().any(|p| line.starts_with(p)))
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
