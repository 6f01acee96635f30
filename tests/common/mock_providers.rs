/*!
 * Mock collaborators for testing
 *
 * The content provider serves units from an in-memory table and returns each
 * unit's duration as its "audio" bytes. The media tool reads those numbers back
 * when probing and writes small marker files instead of encoding anything, so
 * the whole pipeline runs without network access or ffmpeg.
 */

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use versereel::errors::{MediaToolError, UpstreamError};
use versereel::media::{ComposeJob, Ffmpeg, FrameSpec, MediaTool};
use versereel::providers::{ContentProvider, EditionRecord, UnitResponse};

/// Calls made to the mock content provider
#[derive(Debug, Default)]
pub struct ProviderTracker {
    /// (collection, unit, editions) of every lookup
    pub lookups: Vec<(u32, u32, Vec<String>)>,
    /// Every audio URL fetched
    pub audio_fetches: Vec<String>,
}

/// One unit served by the mock provider
#[derive(Debug, Clone)]
pub struct MockUnit {
    pub text: String,
    pub translation: String,
    /// None when the voice has no recording of this unit
    pub audio: Option<String>,
}

/// In-memory lookup service
#[derive(Debug, Clone, Default)]
pub struct MockContentProvider {
    units: HashMap<u32, MockUnit>,
    statuses: HashMap<u32, u16>,
    parse_errors: HashSet<u32>,
    audio_failures: HashSet<u32>,
    unreachable: bool,
    tracker: Arc<Mutex<ProviderTracker>>,
}

impl MockContentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve units numbered from 1 with the given audio durations
    pub fn with_durations(durations: &[f64]) -> Self {
        let mut provider = Self::new();
        for (i, duration) in durations.iter().enumerate() {
            let number = i as u32 + 1;
            provider = provider.with_unit(
                number,
                &format!("primary text of unit {}", number),
                &format!("translation of unit {}", number),
                &duration.to_string(),
            );
        }
        provider
    }

    /// Serve one unit whose audio bytes are `audio`
    pub fn with_unit(mut self, number: u32, text: &str, translation: &str, audio: &str) -> Self {
        self.units.insert(number, MockUnit {
            text: text.to_string(),
            translation: translation.to_string(),
            audio: Some(audio.to_string()),
        });
        self
    }

    /// Drop the audio reference of a unit
    pub fn without_audio(mut self, number: u32) -> Self {
        if let Some(unit) = self.units.get_mut(&number) {
            unit.audio = None;
        }
        self
    }

    /// Report a status code for a unit instead of its records
    pub fn with_status(mut self, number: u32, code: u16) -> Self {
        self.statuses.insert(number, code);
        self
    }

    /// Fail parsing of a unit's response
    pub fn with_parse_error(mut self, number: u32) -> Self {
        self.parse_errors.insert(number);
        self
    }

    /// Fail the audio download of a unit
    pub fn with_audio_failure(mut self, number: u32) -> Self {
        self.audio_failures.insert(number);
        self
    }

    /// Make every lookup fail as if the service were down
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Get the call tracker
    pub fn tracker(&self) -> Arc<Mutex<ProviderTracker>> {
        self.tracker.clone()
    }

    fn audio_url(number: u32) -> String {
        format!("mock://audio/{}", number)
    }
}

#[async_trait]
impl ContentProvider for MockContentProvider {
    async fn fetch_unit(&self, collection: u32, unit: u32, editions: &[&str]) -> Result<UnitResponse, UpstreamError> {
        self.tracker.lock().unwrap().lookups.push((
            collection,
            unit,
            editions.iter().map(|e| e.to_string()).collect(),
        ));

        if self.unreachable {
            return Err(UpstreamError::ConnectionError("connection refused".to_string()));
        }
        if self.parse_errors.contains(&unit) {
            return Err(UpstreamError::ParseError("invalid edition envelope".to_string()));
        }
        if let Some(code) = self.statuses.get(&unit) {
            return Ok(UnitResponse { code: *code, records: Vec::new() });
        }

        let Some(served) = self.units.get(&unit) else {
            return Ok(UnitResponse { code: 404, records: Vec::new() });
        };

        Ok(UnitResponse {
            code: 200,
            records: vec![
                EditionRecord {
                    edition: editions[0].to_string(),
                    text: served.text.clone(),
                    audio: served.audio.as_ref().map(|_| Self::audio_url(unit)),
                },
                EditionRecord {
                    edition: editions.get(1).map(|e| e.to_string()).unwrap_or_default(),
                    text: served.translation.clone(),
                    audio: None,
                },
            ],
        })
    }

    async fn fetch_audio(&self, url: &str) -> Result<Bytes, UpstreamError> {
        self.tracker.lock().unwrap().audio_fetches.push(url.to_string());

        let number: u32 = url
            .rsplit('/')
            .next()
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| UpstreamError::RequestFailed(format!("bad url {}", url)))?;

        if self.audio_failures.contains(&number) {
            return Err(UpstreamError::ApiError { status_code: 503, message: "audio unavailable".to_string() });
        }

        let audio = self.units.get(&number).and_then(|u| u.audio.clone()).unwrap_or_default();
        Ok(Bytes::from(audio))
    }
}

/// One compose invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeCall {
    pub with_subtitles: bool,
    pub duration: f64,
}

/// Calls made to the mock media tool
#[derive(Debug, Default)]
pub struct MediaTracker {
    pub probes: Vec<PathBuf>,
    pub concat_inputs: Vec<PathBuf>,
    pub solid_colors: Vec<f64>,
    pub fit_clips: Vec<(PathBuf, f64)>,
    pub compose_calls: Vec<ComposeCall>,
    /// Subtitle document content seen by the first compose call
    pub subtitle_document: Option<String>,
}

/// Media tool that writes marker files instead of encoding
#[derive(Debug, Clone, Default)]
pub struct MockMediaTool {
    fail_with_subtitles: bool,
    fail_without_subtitles: bool,
    fail_background: bool,
    corrupt_merge: bool,
    tracker: Arc<Mutex<MediaTracker>>,
}

impl MockMediaTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail compose calls that burn subtitles in
    pub fn failing_with_subtitles(mut self) -> Self {
        self.fail_with_subtitles = true;
        self
    }

    /// Fail compose calls without subtitles
    pub fn failing_without_subtitles(mut self) -> Self {
        self.fail_without_subtitles = true;
        self
    }

    /// Fail background synthesis and clip fitting
    pub fn failing_background(mut self) -> Self {
        self.fail_background = true;
        self
    }

    /// Write an unprobeable merged audio file
    pub fn with_corrupt_merge(mut self) -> Self {
        self.corrupt_merge = true;
        self
    }

    /// Get the call tracker
    pub fn tracker(&self) -> Arc<Mutex<MediaTracker>> {
        self.tracker.clone()
    }

    fn failure(diagnostic: &str) -> MediaToolError {
        MediaToolError::Failed {
            tool: "ffmpeg".to_string(),
            status: 1,
            diagnostic: diagnostic.to_string(),
        }
    }
}

#[async_trait]
impl MediaTool for MockMediaTool {
    async fn probe_duration(&self, path: &Path) -> Result<f64, MediaToolError> {
        self.tracker.lock().unwrap().probes.push(path.to_path_buf());
        let content = tokio::fs::read_to_string(path).await?;
        Ffmpeg::parse_duration(&content)
    }

    async fn concat_audio(&self, inputs: &[PathBuf], list_file: &Path, output: &Path) -> Result<(), MediaToolError> {
        self.tracker.lock().unwrap().concat_inputs.extend(inputs.iter().cloned());
        tokio::fs::write(list_file, Ffmpeg::concat_list(inputs)).await?;

        let mut total = 0.0;
        for input in inputs {
            let content = tokio::fs::read_to_string(input).await?;
            total += content.trim().parse::<f64>().unwrap_or(0.0);
        }

        let merged = if self.corrupt_merge { "corrupt".to_string() } else { total.to_string() };
        tokio::fs::write(output, merged).await?;
        Ok(())
    }

    async fn solid_color(&self, frame: &FrameSpec, duration: f64, output: &Path) -> Result<(), MediaToolError> {
        self.tracker.lock().unwrap().solid_colors.push(duration);
        if self.fail_background {
            return Err(Self::failure("Invalid color"));
        }
        tokio::fs::write(output, format!("solid {} {}x{}", frame.color, frame.width, frame.height)).await?;
        Ok(())
    }

    async fn fit_clip(&self, source: &Path, _frame: &FrameSpec, duration: f64, output: &Path) -> Result<(), MediaToolError> {
        self.tracker.lock().unwrap().fit_clips.push((source.to_path_buf(), duration));
        if self.fail_background {
            return Err(Self::failure("Invalid data found when processing input"));
        }
        tokio::fs::write(output, format!("clip {}", source.display())).await?;
        Ok(())
    }

    async fn compose(&self, job: &ComposeJob<'_>) -> Result<(), MediaToolError> {
        let with_subtitles = job.subtitles.is_some();
        let document = match job.subtitles {
            Some(path) => Some(tokio::fs::read_to_string(path).await?),
            None => None,
        };

        {
            let mut tracker = self.tracker.lock().unwrap();
            tracker.compose_calls.push(ComposeCall { with_subtitles, duration: job.duration });
            if tracker.subtitle_document.is_none() {
                tracker.subtitle_document = document;
            }
        }

        if with_subtitles && self.fail_with_subtitles {
            return Err(Self::failure("No such filter: 'ass'"));
        }
        if !with_subtitles && self.fail_without_subtitles {
            return Err(Self::failure("Conversion failed!"));
        }

        tokio::fs::write(job.output, "composed video").await?;
        Ok(())
    }
}
