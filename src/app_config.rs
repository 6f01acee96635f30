use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

/// Application configuration module
/// This module handles the application configuration including loading defaults
/// and validating the settings a generation run is executed with.
/// A run only ever borrows a `Config`, it never mutates it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Directory the finished videos are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Directory searched for background clips
    #[serde(default = "default_background_dir")]
    pub background_dir: PathBuf,

    /// Parent directory for per-run scratch spaces (system temp dir when absent)
    #[serde(default)]
    pub scratch_root: Option<PathBuf>,

    /// Voice edition used when the request does not name one
    #[serde(default = "default_voice")]
    pub default_voice: String,

    /// Translation language code (ISO 639-1)
    #[serde(default = "default_translation_language")]
    pub translation_language: String,

    /// Lookup service settings
    #[serde(default)]
    pub service: ServiceConfig,

    /// External media tool settings
    #[serde(default)]
    pub media: MediaToolConfig,

    /// Final encode settings
    #[serde(default)]
    pub encoding: EncodingConfig,

    /// Duration targets and limits
    #[serde(default)]
    pub duration: DurationConfig,

    /// Output frame settings
    #[serde(default)]
    pub frame: FrameConfig,

    /// Subtitle styles and line limits
    #[serde(default)]
    pub subtitles: SubtitleConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Content and audio lookup service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServiceConfig {
    // @field: Base URL of the lookup API
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Location of the ffmpeg tool suite
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MediaToolConfig {
    // @field: ffmpeg executable
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    // @field: ffprobe executable, derived from ffmpeg_path when empty
    #[serde(default)]
    pub ffprobe_path: Option<String>,
}

impl Default for MediaToolConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: None,
        }
    }
}

impl MediaToolConfig {
    /// Resolve the ffprobe executable, looking next to ffmpeg when it is not configured
    pub fn resolved_ffprobe_path(&self) -> String {
        if let Some(path) = &self.ffprobe_path {
            if !path.trim().is_empty() {
                return path.clone();
            }
        }

        let ffmpeg = PathBuf::from(&self.ffmpeg_path);
        match ffmpeg.file_name().and_then(|name| name.to_str()) {
            Some(name) if name.contains("ffmpeg") => {
                let probe_name = name.replacen("ffmpeg", "ffprobe", 1);
                match ffmpeg.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => {
                        parent.join(probe_name).to_string_lossy().to_string()
                    }
                    _ => probe_name,
                }
            }
            _ => "ffprobe".to_string(),
        }
    }
}

/// Final encode settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EncodingConfig {
    /// x264 speed/quality preset
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Constant rate factor (lower is better quality)
    #[serde(default = "default_crf")]
    pub crf: u8,

    /// AAC bitrate, e.g. "96k"
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            crf: default_crf(),
            audio_bitrate: default_audio_bitrate(),
        }
    }
}

/// Duration targets and limits, in seconds
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DurationConfig {
    /// Length a video should aim for
    #[serde(default = "default_target_secs")]
    pub target_secs: f64,

    /// Length a video must never exceed
    #[serde(default = "default_max_secs")]
    pub max_secs: f64,

    /// Share of `max_secs` audio downloads may fill
    #[serde(default = "default_download_headroom")]
    pub download_headroom: f64,

    /// Duration assumed for a unit whose audio cannot be probed
    #[serde(default = "default_probe_fallback_secs")]
    pub probe_fallback_secs: f64,

    /// Average recitation length of one unit, used to size derived ranges
    #[serde(default = "default_secs_per_unit")]
    pub secs_per_unit: f64,
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self {
            target_secs: default_target_secs(),
            max_secs: default_max_secs(),
            download_headroom: default_download_headroom(),
            probe_fallback_secs: default_probe_fallback_secs(),
            secs_per_unit: default_secs_per_unit(),
        }
    }
}

/// Output frame
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FrameConfig {
    #[serde(default = "default_width")]
    pub width: u32,

    #[serde(default = "default_height")]
    pub height: u32,

    /// Solid background colour as #RRGGBB
    #[serde(default = "default_background_color")]
    pub background_color: String,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            background_color: default_background_color(),
        }
    }
}

/// Display style and line limits of one subtitle lane
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LaneStyle {
    pub font_name: String,
    pub font_size: u32,
    pub bold: bool,
    /// ASS numpad alignment (5 = middle centre, 2 = bottom centre)
    pub alignment: u8,
    pub margin_h: u32,
    pub margin_v: u32,
    pub outline: u32,
    pub shadow: u32,
    pub max_chars_per_line: usize,
    pub max_lines: usize,
}

/// Subtitle configuration for both lanes
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubtitleConfig {
    /// Primary-language text, centred and larger
    #[serde(default = "default_primary_style")]
    pub primary: LaneStyle,

    /// Translated text, lower and smaller
    #[serde(default = "default_translation_style")]
    pub translation: LaneStyle,
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            primary: default_primary_style(),
            translation: default_translation_style(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

const X264_PRESETS: [&str; 10] = [
    "ultrafast", "superfast", "veryfast", "faster", "fast",
    "medium", "slow", "slower", "veryslow", "placebo",
];

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_background_dir() -> PathBuf {
    PathBuf::from("backgrounds")
}

fn default_voice() -> String {
    "ar.alafasy".to_string()
}

fn default_translation_language() -> String {
    "en".to_string()
}

fn default_endpoint() -> String {
    "https://api.alquran.cloud/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_preset() -> String {
    "medium".to_string()
}

fn default_crf() -> u8 {
    32
}

fn default_audio_bitrate() -> String {
    "96k".to_string()
}

fn default_target_secs() -> f64 {
    90.0
}

fn default_max_secs() -> f64 {
    100.0
}

fn default_download_headroom() -> f64 {
    0.95
}

fn default_probe_fallback_secs() -> f64 {
    5.0
}

fn default_secs_per_unit() -> f64 {
    7.0
}

fn default_width() -> u32 {
    1080
}

fn default_height() -> u32 {
    1920
}

fn default_background_color() -> String {
    "#0F5132".to_string()
}

fn default_primary_style() -> LaneStyle {
    LaneStyle {
        font_name: "Arial".to_string(),
        font_size: 80,
        bold: true,
        alignment: 5,
        margin_h: 80,
        margin_v: 450,
        outline: 3,
        shadow: 2,
        max_chars_per_line: 25,
        max_lines: 2,
    }
}

fn default_translation_style() -> LaneStyle {
    LaneStyle {
        font_name: "Arial".to_string(),
        font_size: 56,
        bold: false,
        alignment: 2,
        margin_h: 80,
        margin_v: 220,
        outline: 2,
        shadow: 1,
        max_chars_per_line: 30,
        max_lines: 2,
    }
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::get_language_name(&self.translation_language)?;

        if self.default_voice.trim().is_empty() {
            return Err(anyhow!("A default voice edition is required"));
        }

        if self.service.endpoint.trim().is_empty() {
            return Err(anyhow!("Lookup service endpoint must not be empty"));
        }
        url::Url::parse(&self.service.endpoint)
            .map_err(|e| anyhow!("Invalid lookup service endpoint '{}': {}", self.service.endpoint, e))?;

        if self.media.ffmpeg_path.trim().is_empty() {
            return Err(anyhow!("ffmpeg path must not be empty"));
        }

        let duration = &self.duration;
        if !(duration.target_secs > 0.0) {
            return Err(anyhow!("Target duration must be positive, got {}", duration.target_secs));
        }
        if duration.max_secs < duration.target_secs {
            return Err(anyhow!(
                "Maximum duration ({}) must not be below the target duration ({})",
                duration.max_secs, duration.target_secs
            ));
        }
        if !(duration.download_headroom > 0.0 && duration.download_headroom <= 1.0) {
            return Err(anyhow!("Download headroom must be in (0, 1], got {}", duration.download_headroom));
        }
        if !(duration.probe_fallback_secs > 0.0) || !(duration.secs_per_unit > 0.0) {
            return Err(anyhow!("Probe fallback and per-unit estimate must be positive"));
        }

        if self.encoding.crf > 51 {
            return Err(anyhow!("CRF must be between 0 and 51, got {}", self.encoding.crf));
        }
        if !X264_PRESETS.contains(&self.encoding.preset.as_str()) {
            return Err(anyhow!("Unknown encoding preset: {}", self.encoding.preset));
        }
        if self.encoding.audio_bitrate.trim().is_empty() {
            return Err(anyhow!("Audio bitrate must not be empty"));
        }

        let frame = &self.frame;
        if frame.width == 0 || frame.height == 0 || frame.width % 2 != 0 || frame.height % 2 != 0 {
            return Err(anyhow!("Frame dimensions must be non-zero and even, got {}x{}", frame.width, frame.height));
        }
        if !is_hex_color(&frame.background_color) {
            return Err(anyhow!("Background colour must be #RRGGBB, got {}", frame.background_color));
        }

        for (name, style) in [("primary", &self.subtitles.primary), ("translation", &self.subtitles.translation)] {
            if style.max_chars_per_line == 0 || style.max_lines == 0 {
                return Err(anyhow!("Line limits of the {} subtitle lane must be non-zero", name));
            }
            if style.font_size == 0 {
                return Err(anyhow!("Font size of the {} subtitle lane must be non-zero", name));
            }
        }

        Ok(())
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            output_dir: default_output_dir(),
            background_dir: default_background_dir(),
            scratch_root: None,
            default_voice: default_voice(),
            translation_language: default_translation_language(),
            service: ServiceConfig::default(),
            media: MediaToolConfig::default(),
            encoding: EncodingConfig::default(),
            duration: DurationConfig::default(),
            frame: FrameConfig::default(),
            subtitles: SubtitleConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
