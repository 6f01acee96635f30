/*!
 * Error types for the versereel generation pipeline.
 *
 * Each external collaborator gets its own error enum (the lookup service and the
 * media tool), and `GenerationError` wraps them for the run as a whole. All of them
 * use the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when talking to the content and audio lookup service
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The request could not be sent or the body could not be read
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The service could not be reached at all
    #[error("Service unreachable: {0}")]
    ConnectionError(String),

    /// Error status returned by the service itself
    #[error("Service responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP or payload status code
        status_code: u16,
        /// Error message from the service
        message: String,
    },

    /// The response body did not have the expected shape
    #[error("Failed to parse service response: {0}")]
    ParseError(String),
}

impl UpstreamError {
    /// Whether this error means the service itself is unreachable, as opposed to
    /// a problem with one particular unit
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::ConnectionError(_))
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else if let Some(status) = error.status() {
            Self::ApiError {
                status_code: status.as_u16(),
                message: error.to_string(),
            }
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors raised by the external media tool (ffmpeg / ffprobe)
#[derive(Error, Debug)]
pub enum MediaToolError {
    /// The tool binary could not be started
    #[error("Failed to launch {tool}: {message}")]
    Launch {
        /// Binary that failed to start
        tool: String,
        /// Underlying OS error
        message: String,
    },

    /// The tool ran but exited with a non-zero status
    #[error("{tool} exited with status {status}: {diagnostic}")]
    Failed {
        /// Binary that failed
        tool: String,
        /// Exit code, -1 when killed by a signal
        status: i32,
        /// Filtered stderr output
        diagnostic: String,
    },

    /// A duration probe returned something that is not a duration
    #[error("Duration probe failed: {0}")]
    ProbeFailure(String),

    /// Reading or writing an intermediate artifact failed
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that end a generation run
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The request cannot be satisfied as given
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Every unit of the requested range was skipped
    #[error("No content available for collection {collection}, units {start}-{end}")]
    NoContent {
        /// Collection number
        collection: u32,
        /// First requested unit
        start: u32,
        /// Last requested unit
        end: u32,
    },

    /// Lookup or audio retrieval failure
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Merge or background preparation failure
    #[error("Media tool error: {0}")]
    MediaTool(#[from] MediaToolError),

    /// Final encode failed, including the retry without subtitles
    #[error("Composition failed: {first}; retry without subtitles also failed: {retry}")]
    Composition {
        /// Failure of the attempt with subtitles burned in
        first: MediaToolError,
        /// Failure of the subtitle-less retry
        retry: MediaToolError,
    },

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),
}

impl From<std::io::Error> for GenerationError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
