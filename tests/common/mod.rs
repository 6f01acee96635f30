/*!
 * Common test utilities for the versereel test suite
 */

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use anyhow::Result;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use versereel::app_config::Config;
use versereel::generation::{Progress, ProgressSink};

// Re-export the mock providers module
pub mod mock_providers;

/// Route log output through the test harness, once per process
pub fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Default configuration with every directory inside `root`
pub fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.output_dir = root.join("output");
    config.background_dir = root.join("backgrounds");
    config.scratch_root = Some(root.join("scratch"));
    config
}

/// Number of entries directly inside a directory, zero when it does not exist
pub fn count_entries(dir: &Path) -> usize {
    fs::read_dir(dir).map(|entries| entries.count()).unwrap_or(0)
}

/// Progress sink that records every update
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub updates: Mutex<Vec<Progress>>,
}

impl RecordingProgress {
    pub fn percents(&self) -> Vec<u8> {
        self.updates.lock().unwrap().iter().map(|p| p.percent).collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn report(&self, progress: Progress) {
        self.updates.lock().unwrap().push(progress);
    }
}

/// Progress sink that cancels a token once a given percentage is reported
#[derive(Debug)]
pub struct CancelAt {
    pub percent: u8,
    pub token: CancellationToken,
}

impl ProgressSink for CancelAt {
    fn report(&self, progress: Progress) {
        if progress.percent == self.percent {
            self.token.cancel();
        }
    }
}
