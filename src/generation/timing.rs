/*!
 * Subtitle timing.
 *
 * Splits each unit's text into screen-sized chunks and spreads them evenly over
 * the unit's audio, one lane per language.
 */

use crate::app_config::LaneStyle;
use super::models::{Chunk, DownloadedUnit, Lane};

/// Line-width and line-count limits of one lane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineLimits {
    /// Characters per line, counted in Unicode scalar values
    pub max_chars: usize,
    /// Lines per chunk
    pub max_lines: usize,
}

impl LineLimits {
    pub fn new(max_chars: usize, max_lines: usize) -> Self {
        Self {
            max_chars: max_chars.max(1),
            max_lines: max_lines.max(1),
        }
    }
}

impl From<&LaneStyle> for LineLimits {
    fn from(style: &LaneStyle) -> Self {
        Self::new(style.max_chars_per_line, style.max_lines)
    }
}

/// Split text into chunks of at most `max_lines` lines, breaking only between words
///
/// A line holds words while the sum of their lengths plus one separator each stays
/// within `max_chars`. A single word longer than a line gets a line to itself.
/// Lines of a chunk are joined with `\n`. Text that fits in one chunk is returned
/// unaltered.
pub fn split_text_smart(text: &str, max_chars: usize, max_lines: usize) -> Vec<String> {
    let limits = LineLimits::new(max_chars, max_lines);

    let mut chunks: Vec<String> = Vec::new();
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_len = 0usize;

    for word in text.split_whitespace() {
        let word_len = word.chars().count() + 1;

        if line_len > 0 && line_len + word_len > limits.max_chars {
            lines.push(std::mem::take(&mut line));
            line_len = 0;

            if lines.len() == limits.max_lines {
                chunks.push(lines.join("\n"));
                lines.clear();
            }
        }

        if line_len > 0 {
            line.push(' ');
        }
        line.push_str(word);
        line_len += word_len;
    }

    if line_len > 0 {
        lines.push(line);
    }
    if !lines.is_empty() {
        chunks.push(lines.join("\n"));
    }

    if chunks.len() <= 1 {
        return vec![text.to_string()];
    }
    chunks
}

fn lane_chunks(text: &str, limits: LineLimits) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    split_text_smart(text, limits.max_chars, limits.max_lines)
}

/// Lay out the chunks of every unit on one timeline
///
/// Units are placed back to back in order. Within a unit the duration is divided
/// evenly over as many slots as the lane with the most chunks needs; a lane with
/// fewer chunks leaves its trailing slots empty. The last slot of a unit ends
/// exactly where the next unit starts.
pub fn allocate(units: &[DownloadedUnit], primary: LineLimits, translation: LineLimits) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut offset = 0.0f64;

    for downloaded in units {
        let duration = downloaded.duration;
        if !(duration.is_finite() && duration > 0.0) {
            continue;
        }

        let primary_chunks = lane_chunks(&downloaded.unit.text, primary);
        let translation_chunks = lane_chunks(&downloaded.unit.translation, translation);
        let slots = primary_chunks.len().max(translation_chunks.len()).max(1);
        let slot = duration / slots as f64;
        let unit_end = offset + duration;

        for index in 0..slots {
            let start = offset + slot * index as f64;
            let end = if index + 1 == slots { unit_end } else { offset + slot * (index + 1) as f64 };

            for (lane, lane_texts) in [(Lane::Primary, &primary_chunks), (Lane::Translation, &translation_chunks)] {
                if let Some(text) = lane_texts.get(index) {
                    chunks.push(Chunk {
                        unit: downloaded.unit.number,
                        lane,
                        text: text.clone(),
                        start,
                        end,
                    });
                }
            }
        }

        offset = unit_end;
    }

    chunks
}

/// Cut a chunk list to `limit` seconds
///
/// Chunks starting at or after the limit are dropped, the one straddling it is shortened.
pub fn clip_to(chunks: Vec<Chunk>, limit: f64) -> Vec<Chunk> {
    chunks
        .into_iter()
        .filter(|chunk| chunk.start < limit)
        .map(|mut chunk| {
            chunk.end = chunk.end.min(limit);
            chunk
        })
        .collect()
}
