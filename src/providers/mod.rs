/*!
 * Provider implementations for the content and audio lookup service.
 *
 * The pipeline only talks to the service through the [`ContentProvider`] trait:
 * - `alquran`: HTTP client for the api.alquran.cloud edition API
 */

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt::Debug;

use crate::errors::UpstreamError;

/// One edition's record for a unit
#[derive(Debug, Clone, PartialEq)]
pub struct EditionRecord {
    /// Edition identifier the record belongs to
    pub edition: String,
    /// Text of the unit in this edition
    pub text: String,
    /// Audio reference, only present for voice editions that have a recording
    pub audio: Option<String>,
}

/// Response for one unit, in the order the editions were requested
#[derive(Debug, Clone, PartialEq)]
pub struct UnitResponse {
    /// Status code reported by the service
    pub code: u16,
    pub records: Vec<EditionRecord>,
}

impl UnitResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

/// Common trait for content and audio lookup backends
///
/// Implementations must be usable from several runs at once; they carry no
/// per-run state.
#[async_trait]
pub trait ContentProvider: Send + Sync + Debug {
    /// Look up one unit in the given editions
    ///
    /// # Arguments
    /// * `collection` - Collection number
    /// * `unit` - Unit number within the collection
    /// * `editions` - Edition identifiers, voice edition first
    async fn fetch_unit(&self, collection: u32, unit: u32, editions: &[&str]) -> Result<UnitResponse, UpstreamError>;

    /// Retrieve the bytes behind an audio reference
    async fn fetch_audio(&self, url: &str) -> Result<Bytes, UpstreamError>;
}

pub mod alquran;
