use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use anyhow::{Result, Context, anyhow};
use once_cell::sync::Lazy;
use regex::Regex;
use log::debug;

use crate::app_config::{LaneStyle, SubtitleConfig};
use crate::generation::models::{Chunk, Lane};

// @module: ASS subtitle track building

// @const: ASS timestamp regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2})\.(\d{2})$").unwrap()
});

const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";
const EVENT_FORMAT: &str = "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

// @struct: Single dialogue line
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    // @field: Lane the line is drawn in
    pub lane: Lane,

    // @field: Start time in seconds
    pub start: f64,

    // @field: End time in seconds
    pub end: f64,

    // @field: Display text, may contain newlines
    pub text: String,
}

impl SubtitleEntry {
    // @creates: Validated subtitle entry
    // @validates: Time range and non-empty text
    pub fn new_validated(lane: Lane, start: f64, end: f64, text: &str) -> Result<Self> {
        if !(start.is_finite() && end.is_finite()) || start < 0.0 {
            return Err(anyhow!("Invalid time range: {} -> {}", start, end));
        }
        if end <= start {
            return Err(anyhow!("Invalid time range: end time {} <= start time {}", end, start));
        }

        let trimmed_text = text.trim();
        if trimmed_text.is_empty() {
            return Err(anyhow!("Empty subtitle text at {}", start));
        }

        Ok(SubtitleEntry {
            lane,
            start,
            end,
            text: trimmed_text.to_string(),
        })
    }

    /// Format seconds as an ASS timestamp (H:MM:SS.CC), rounded to the nearest centisecond
    pub fn format_timestamp(seconds: f64) -> String {
        let total_cs = if seconds.is_finite() && seconds > 0.0 {
            (seconds * 100.0).round() as u64
        } else {
            0
        };

        let hours = total_cs / 360_000;
        let minutes = (total_cs % 360_000) / 6_000;
        let secs = (total_cs % 6_000) / 100;
        let centis = total_cs % 100;

        format!("{}:{:02}:{:02}.{:02}", hours, minutes, secs, centis)
    }

    /// Parse an ASS timestamp back to seconds
    pub fn parse_timestamp(timestamp: &str) -> Result<f64> {
        let caps = TIMESTAMP_REGEX
            .captures(timestamp.trim())
            .ok_or_else(|| anyhow!("Invalid timestamp format: {}", timestamp))?;

        let field = |i: usize| -> Result<u64> {
            caps[i].parse::<u64>()
                .with_context(|| format!("Invalid timestamp field in {}", timestamp))
        };
        let (hours, minutes, secs, centis) = (field(1)?, field(2)?, field(3)?, field(4)?);

        if minutes >= 60 || secs >= 60 {
            return Err(anyhow!("Timestamp out of range: {}", timestamp));
        }

        let total_cs = hours * 360_000 + minutes * 6_000 + secs * 100 + centis;
        Ok(total_cs as f64 / 100.0)
    }

    /// Escape text for a Dialogue line
    pub fn escape_text(text: &str) -> String {
        text.replace("\r\n", "\n")
            .replace('\r', "")
            .replace('{', "(")
            .replace('}', ")")
            .replace('\n', "\\N")
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "Dialogue: 0,{},{},{},,0,0,0,,{}",
            Self::format_timestamp(self.start),
            Self::format_timestamp(self.end),
            self.lane.style_name(),
            Self::escape_text(&self.text)
        )
    }
}

/// A complete two-lane subtitle document
#[derive(Debug, Clone)]
pub struct SubtitleTrack {
    /// Frame the styles are laid out for
    pub play_res: (u32, u32),
    /// Style of the primary lane
    pub primary: LaneStyle,
    /// Style of the translation lane
    pub translation: LaneStyle,
    /// Entries in timeline order
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleTrack {
    pub fn new(width: u32, height: u32, styles: &SubtitleConfig) -> Self {
        Self {
            play_res: (width, height),
            primary: styles.primary.clone(),
            translation: styles.translation.clone(),
            entries: Vec::new(),
        }
    }

    /// Build a track from timed chunks, skipping chunks that cannot be shown
    pub fn from_chunks(width: u32, height: u32, styles: &SubtitleConfig, chunks: &[Chunk]) -> Self {
        let mut track = Self::new(width, height, styles);

        for chunk in chunks {
            match SubtitleEntry::new_validated(chunk.lane, chunk.start, chunk.end, &chunk.text) {
                Ok(entry) => track.entries.push(entry),
                Err(e) => debug!("Skipping chunk of unit {}: {}", chunk.unit, e),
            }
        }

        track
    }

    /// Check that no two entries of the same lane overlap
    pub fn validate(&self) -> Result<()> {
        for lane in [Lane::Primary, Lane::Translation] {
            let mut lane_entries: Vec<&SubtitleEntry> = self.entries.iter().filter(|e| e.lane == lane).collect();
            lane_entries.sort_by(|a, b| a.start.total_cmp(&b.start));

            for pair in lane_entries.windows(2) {
                if pair[1].start < pair[0].end {
                    return Err(anyhow!(
                        "Overlapping {} entries: {:.2}-{:.2} and {:.2}-{:.2}",
                        lane.style_name(), pair[0].start, pair[0].end, pair[1].start, pair[1].end
                    ));
                }
            }
        }
        Ok(())
    }

    fn style_line(name: &str, style: &LaneStyle) -> String {
        format!(
            "Style: {},{},{},&H00FFFFFF,&H000000FF,&H00000000,&H80000000,{},0,0,0,100,100,0,0,1,{},{},{},{},{},{},1",
            name,
            style.font_name,
            style.font_size,
            if style.bold { -1 } else { 0 },
            style.outline,
            style.shadow,
            style.alignment,
            style.margin_h,
            style.margin_h,
            style.margin_v
        )
    }

    /// Render the whole document
    pub fn render(&self) -> String {
        let mut out = String::new();

        out.push_str("[Script Info]\n");
        out.push_str("ScriptType: v4.00+\n");
        out.push_str(&format!("PlayResX: {}\n", self.play_res.0));
        out.push_str(&format!("PlayResY: {}\n", self.play_res.1));
        out.push_str("WrapStyle: 0\n");
        out.push_str("ScaledBorderAndShadow: yes\n");
        out.push_str("YCbCr Matrix: None\n\n");

        out.push_str("[V4+ Styles]\n");
        out.push_str(STYLE_FORMAT);
        out.push('\n');
        out.push_str(&Self::style_line(Lane::Primary.style_name(), &self.primary));
        out.push('\n');
        out.push_str(&Self::style_line(Lane::Translation.style_name(), &self.translation));
        out.push_str("\n\n");

        out.push_str("[Events]\n");
        out.push_str(EVENT_FORMAT);
        out.push('\n');
        for entry in &self.entries {
            out.push_str(&entry.to_string());
        }

        out
    }

    /// Write the document to an .ass file
    pub fn write_to_ass<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;
        file.write_all(self.render().as_bytes())
            .with_context(|| format!("Failed to write subtitle file: {}", path.display()))?;

        Ok(())
    }
}
