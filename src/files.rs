//! Markdown file loading and saving.
//!
//! Loading is strict UTF-8: undecodable bytes produce `CoreError::Decode`
//! with no partial content. Saving optionally copies the existing file to a
//! `.bak` sibling first, then writes through a temp file in the same
//! directory and persists it, so a crash mid-write never leaves a truncated
//! document.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::{CoreError, CoreResult};

/// Load a Markdown document as UTF-8 text.
pub fn load_markdown(path: &Path) -> CoreResult<String> {
    let bytes = fs::read(path).map_err(|source| CoreError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    String::from_utf8(bytes).map_err(|source| CoreError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".bak");
    path.with_file_name(name)
}

/// Save `content` to `path`, optionally backing up the existing file first.
pub fn save_markdown(path: &Path, content: &str, create_backup: bool) -> CoreResult<()> {
    if create_backup && path.exists() {
        let backup = backup_path(path);
        fs::copy(path, &backup).map_err(|source| CoreError::FileBackup {
            path: backup.clone(),
            source,
        })?;
        info!("Backed up {} to {}", path.display(), backup.display());
    }

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let write = || -> std::io::Result<()> {
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(path).map_err(|err| err.error)?;
        Ok(())
    };

    write().map_err(|source| CoreError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// A loaded document tracking original against modified content.
#[derive(Debug, Clone)]
pub struct MarkdownDocument {
    path: PathBuf,
    original: String,
    modified: String,
}

impl MarkdownDocument {
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = load_markdown(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            original: content.clone(),
            modified: content,
        })
    }

    pub fn from_content(path: &Path, content: String) -> Self {
        Self {
            path: path.to_path_buf(),
            original: content.clone(),
            modified: content,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.modified
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn set_content(&mut self, content: String) {
        self.modified = content;
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.original != self.modified
    }

    /// Discard modifications, restoring the loaded content.
    pub fn reset(&mut self) {
        self.modified = self.original.clone();
    }

    /// Persist the modified content; the saved text becomes the new
    /// baseline.
    pub fn save(&mut self, create_backup: bool) -> CoreResult<()> {
        save_markdown(&self.path, &self.modified, create_backup)?;
        self.original = self.modified.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_rejects_invalid_utf8_without_partial_results() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.md");
        fs::write(&path, [0x23, 0x20, 0xff, 0xfe, 0x0a]).unwrap();

        let err = load_markdown(&path).unwrap_err();
        assert!(matches!(err, CoreError::Decode { .. }));
    }

    #[test]
    fn save_creates_backup_of_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        fs::write(&path, "old content").unwrap();

        save_markdown(&path, "new content", true).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new content");
        assert_eq!(
            fs::read_to_string(dir.path().join("doc.md.bak")).unwrap(),
            "old content"
        );
    }

    #[test]
    fn save_without_backup_skips_bak_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        fs::write(&path, "old").unwrap();

        save_markdown(&path, "new", false).unwrap();

        assert!(!dir.path().join("doc.md.bak").exists());
    }

    #[test]
    fn document_tracks_unsaved_changes_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        fs::write(&path, "hello 🚀").unwrap();

        let mut doc = MarkdownDocument::load(&path).unwrap();
        assert!(!doc.has_unsaved_changes());

        doc.set_content("hello ![r](r.svg)".to_string());
        assert!(doc.has_unsaved_changes());

        doc.reset();
        assert_eq!(doc.content(), "hello 🚀");

        doc.set_content("changed".to_string());
        doc.save(false).unwrap();
        assert!(!doc.has_unsaved_changes());
        assert_eq!(fs::read_to_string(&path).unwrap(), "changed");
    }
}
