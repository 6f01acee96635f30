/*!
 * Data model of a generation run.
 */

use std::fmt;
use std::path::PathBuf;

/// One unit of content as returned by the lookup service
#[derive(Debug, Clone, PartialEq)]
pub struct ContentUnit {
    /// Collection the unit belongs to
    pub collection: u32,
    /// Sequence number within the collection
    pub number: u32,
    /// Primary-language text
    pub text: String,
    /// Translated text
    pub translation: String,
    /// Where the recitation audio can be fetched
    pub audio_url: String,
}

/// A content unit whose audio has been downloaded and measured
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedUnit {
    pub unit: ContentUnit,
    /// Audio artifact inside the run's scratch space
    pub audio_path: PathBuf,
    /// Playable duration in seconds
    pub duration: f64,
    /// False when `duration` is the probe fallback
    pub measured: bool,
}

/// Subtitle row a chunk is shown in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    /// Primary-language text
    Primary,
    /// Translated text
    Translation,
}

impl Lane {
    /// Style name used in the subtitle document
    pub fn style_name(&self) -> &'static str {
        match self {
            Self::Primary => "Primary",
            Self::Translation => "Translation",
        }
    }
}

/// A timed slice of one unit's text
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Owning unit's sequence number
    pub unit: u32,
    pub lane: Lane,
    pub text: String,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
}

/// Inclusive range of units within one collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitRange {
    pub collection: u32,
    pub start: u32,
    pub end: u32,
}

impl UnitRange {
    pub fn new(collection: u32, start: u32, end: u32) -> Self {
        Self { collection, start, end }
    }

    /// Number of units in the range
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

impl fmt::Display for UnitRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}-{}", self.collection, self.start, self.end)
    }
}

/// How the units of a run are chosen
#[derive(Debug, Clone, PartialEq)]
pub enum RangeSelector {
    /// An explicit inclusive range
    Explicit(UnitRange),
    /// A random range sized to the target duration, optionally within a fixed collection
    FromTargetDuration { collection: Option<u32> },
}

/// Where the background visual comes from
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BackgroundSource {
    /// Synthesized solid colour frames
    #[default]
    SolidColor,
    /// A specific clip
    Clip(PathBuf),
    /// A random clip from a directory, solid colour when it holds none
    Library(PathBuf),
}

/// Everything one invocation asks for
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub range: RangeSelector,
    /// Voice edition identifier, e.g. "ar.alafasy"
    pub voice: String,
    /// Translation language code, e.g. "en"
    pub translation_language: String,
    pub background: BackgroundSource,
    /// Output file name; derived from collection, voice and realized range when absent
    pub output_name: Option<String>,
}

impl GenerationRequest {
    /// Request an explicit range over a solid colour background
    pub fn explicit(range: UnitRange, voice: impl Into<String>, translation_language: impl Into<String>) -> Self {
        Self {
            range: RangeSelector::Explicit(range),
            voice: voice.into(),
            translation_language: translation_language.into(),
            background: BackgroundSource::default(),
            output_name: None,
        }
    }

    /// Set the background source
    pub fn with_background(mut self, background: BackgroundSource) -> Self {
        self.background = background;
        self
    }

    /// Set an explicit output file name
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }
}

/// What a completed run produced
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    /// The finished video
    pub output_path: PathBuf,
    /// Length of the video in seconds
    pub duration: f64,
    /// Units actually included, may be shorter than requested
    pub range: UnitRange,
    pub voice: String,
    /// False when the subtitle-less fallback encode was used
    pub subtitles_burned: bool,
}

/// Stages of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Fetching,
    Downloading,
    Merging,
    Timing,
    BackgroundPrep,
    Composing,
    Cleanup,
    Done,
    Cancelled,
    Failed,
}

impl RunStage {
    /// Whether the run cannot leave this stage
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Cancelled | Self::Failed)
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label = match self {
            Self::Fetching => "Fetching content",
            Self::Downloading => "Downloading audio",
            Self::Merging => "Merging audio",
            Self::Timing => "Timing subtitles",
            Self::BackgroundPrep => "Preparing background",
            Self::Composing => "Composing video",
            Self::Cleanup => "Cleaning up",
            Self::Done => "Done",
            Self::Cancelled => "Cancelled",
            Self::Failed => "Failed",
        };
        write!(f, "{}", label)
    }
}

/// How a run ended, when it did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Completed(GenerationResult),
    /// Cancelled at a checkpoint during `stage`
    Cancelled { stage: RunStage },
}

impl GenerationOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// The result of a completed run
    pub fn result(&self) -> Option<&GenerationResult> {
        match self {
            Self::Completed(result) => Some(result),
            Self::Cancelled { .. } => None,
        }
    }
}
