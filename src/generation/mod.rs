/*!
 * Generation pipeline.
 *
 * A run goes through these stages, each in its own module:
 * - `fetcher`: unit text, translation and audio references from the lookup service
 * - `downloader`: audio retrieval under the duration budget
 * - `timing`: splitting text into timed subtitle chunks
 * - `background`: the visual track
 * - `composer`: the final encode
 *
 * `orchestrator` drives them in order with progress reporting, cancellation
 * checkpoints and scratch space cleanup.
 */

pub mod background;
pub mod budget;
pub mod composer;
pub mod downloader;
pub mod fetcher;
pub mod models;
pub mod orchestrator;
pub mod timing;

pub use budget::TimelineBudget;
pub use models::*;
pub use orchestrator::{resolve_range, NoProgress, Pipeline, Progress, ProgressSink};
