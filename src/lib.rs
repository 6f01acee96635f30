/*!
 * # versereel
 *
 * A Rust library for generating short vertical recitation videos with
 * burned-in two-lane subtitles.
 *
 * ## Features
 *
 * - Fetch verse text, translation and recitation audio from an
 *   api.alquran.cloud-compatible service
 * - Keep the video within a target duration by budgeting the audio download
 * - Time subtitle chunks to the audio, one lane for the recited text and one
 *   for the translation
 * - Render the video with ffmpeg over a solid colour or a looped background clip
 * - Report progress and stop cleanly at checkpoints when cancelled
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `catalog`: Chapter and voice catalogues
 * - `generation`: The generation pipeline:
 *   - `generation::fetcher`: Content lookup
 *   - `generation::downloader`: Duration-budgeted audio download
 *   - `generation::timing`: Subtitle chunking and timing
 *   - `generation::background`: Background track preparation
 *   - `generation::composer`: Final encode
 *   - `generation::orchestrator`: Stage sequencing, progress and cancellation
 * - `subtitle_processor`: ASS subtitle document building
 * - `media`: External media tool abstraction and the ffmpeg driver
 * - `providers`: Content lookup service clients
 * - `file_utils`: File system operations and per-run scratch space
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities and translation editions
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod catalog;
pub mod errors;
pub mod file_utils;
pub mod generation;
pub mod language_utils;
pub mod media;
pub mod providers;
pub mod subtitle_processor;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{GenerationError, MediaToolError, UpstreamError};
pub use generation::{GenerationOutcome, GenerationRequest, GenerationResult, Pipeline};
pub use subtitle_processor::{SubtitleEntry, SubtitleTrack};
