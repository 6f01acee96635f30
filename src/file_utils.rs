use anyhow::{Result, Context};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

// @module: File and directory utilities

// @const: Extensions accepted as background clips
pub const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "mov", "avi", "mkv"];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Deterministic output file name
    // @params: collection_name, voice_short_name, first and last unit
    pub fn generate_output_name(collection_name: &str, voice_short_name: &str, start: u32, end: u32) -> String {
        let stem = format!("{} - {} - {}-{}", collection_name, voice_short_name, start, end);
        format!("{}.mp4", Self::sanitize_file_name(&stem))
    }

    /// Replace characters that are not allowed in file names
    pub fn sanitize_file_name(name: &str) -> String {
        let cleaned: String = name
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();
        cleaned.trim().trim_matches('.').to_string()
    }

    /// Find video files in a directory tree
    pub fn find_video_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && Self::is_video_file(path) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Whether a path has one of the accepted video extensions
    pub fn is_video_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
    }

    /// Give a file name the `.mp4` extension unless it already names a video file
    pub fn with_video_extension(name: &str) -> String {
        if Self::is_video_file(name) {
            name.to_string()
        } else {
            format!("{}.mp4", name)
        }
    }

    /// First path in `dir` named `file_name` that does not exist yet
    ///
    /// Taken names get a numeric suffix before the extension: "a.mp4", "a (2).mp4", ...
    pub fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
        let candidate = dir.join(file_name);
        if !candidate.exists() {
            return candidate;
        }

        let name = Path::new(file_name);
        let stem = name.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
        let extension = name.extension().map(|e| format!(".{}", e.to_string_lossy())).unwrap_or_default();

        (2..)
            .map(|n| dir.join(format!("{} ({}){}", stem, n, extension)))
            .find(|path| !path.exists())
            .unwrap_or(candidate)
    }

    /// Move a finished file into place
    ///
    /// When a rename crosses file systems the file is copied to a hidden sibling
    /// of `to` and renamed from there, so `to` only ever holds complete content.
    pub fn promote_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if !from.exists() {
            return Err(anyhow::anyhow!("Source file does not exist: {:?}", from));
        }

        if let Some(parent) = to.parent() {
            Self::ensure_dir(parent)?;
        }

        if let Err(e) = fs::rename(from, to) {
            debug!("Rename of {:?} failed ({}), copying instead", from, e);
            Self::copy_into_place(from, to)?;
            fs::remove_file(from)
                .with_context(|| format!("Failed to remove {:?}", from))?;
        }

        Ok(())
    }

    /// Copy `from` to a hidden staging file next to `to`, then rename it onto `to`
    ///
    /// On failure the staging file is removed and `to` is left untouched.
    pub fn copy_into_place(from: &Path, to: &Path) -> Result<()> {
        let staging = Self::staging_path(to)?;

        let result = fs::copy(from, &staging)
            .with_context(|| format!("Failed to copy {:?} to {:?}", from, staging))
            .and_then(|_| {
                fs::rename(&staging, to)
                    .with_context(|| format!("Failed to move {:?} to {:?}", staging, to))
            });

        if result.is_err() && staging.exists() {
            if let Err(e) = fs::remove_file(&staging) {
                warn!("Failed to remove staging file {:?}: {}", staging, e);
            }
        }
        result
    }

    /// Hidden sibling used while copying into `to`
    pub fn staging_path(to: &Path) -> Result<PathBuf> {
        let name = to
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Destination has no file name: {:?}", to))?;
        Ok(to.with_file_name(format!(".{}.part", name.to_string_lossy())))
    }
}

/// Per-run scratch directory
///
/// Every intermediate artifact of a run lives in here. The directory is removed
/// when the value is closed or dropped, whichever comes first.
#[derive(Debug)]
pub struct ScratchSpace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl ScratchSpace {
    /// Create a fresh scratch directory under `root`, or the system temp dir
    pub fn create(root: Option<&Path>) -> Result<Self> {
        let builder_result = match root {
            Some(root) => {
                FileManager::ensure_dir(root)?;
                tempfile::Builder::new().prefix("versereel-").tempdir_in(root)
            }
            None => tempfile::Builder::new().prefix("versereel-").tempdir(),
        };
        let dir = builder_result.context("Failed to create scratch directory")?;
        let path = dir.path().to_path_buf();
        debug!("Scratch space: {:?}", path);

        Ok(Self { dir: Some(dir), path })
    }

    /// Directory of the scratch space
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of an artifact inside the scratch space
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Remove the directory and everything in it
    pub fn close(mut self) -> Result<()> {
        match self.dir.take() {
            Some(dir) => dir
                .close()
                .with_context(|| format!("Failed to remove scratch directory {:?}", self.path)),
            None => Ok(()),
        }
    }
}

impl Drop for ScratchSpace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(e) = dir.close() {
                warn!("Failed to remove scratch directory {:?}: {}", self.path, e);
            }
        }
    }
}
