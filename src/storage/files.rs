// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Local resume file store.
//!
//! References handed out by [`FileStore::save`] are single path
//! components (`<uuid>_<sanitized-stem><ext>`), and every operation that
//! accepts a reference re-validates it before touching the filesystem,
//! so a stored or attacker-supplied reference can never escape the root
//! directory.

use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

/// Accepted resume extensions, lowercase with dot.
const ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".doc", ".docx"];

/// Accepted declared content types for uploads.
const ALLOWED_MIME_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Maximum kept length of the sanitized original filename stem.
const MAX_STEM_LEN: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("No filename provided")]
    MissingFilename,

    #[error("File type not allowed. Allowed types: PDF, DOC, DOCX")]
    UnsupportedType,

    #[error("File too large. Maximum size is {max} bytes")]
    TooLarge { max: u64 },

    #[error("Invalid file reference")]
    InvalidPath,

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<FileError> for crate::error::ApiError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::MissingFilename | FileError::UnsupportedType | FileError::TooLarge { .. } => {
                crate::error::ApiError::bad_request(err.to_string())
            }
            FileError::InvalidPath => crate::error::ApiError::bad_request(err.to_string()),
            FileError::NotFound(_) => crate::error::ApiError::not_found("Resume file not found"),
            FileError::Io(io) => {
                tracing::error!(error = %io, "file store operation failed");
                crate::error::ApiError::internal("Internal server error")
            }
        }
    }
}

/// An uploaded resume as extracted from the multipart body.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub filename: String,
    pub content_type: Option<String>,
    /// Size claimed by the client, when present. The actual byte length
    /// is checked independently.
    pub declared_size: Option<u64>,
    pub data: Vec<u8>,
}

/// Lowercase extension (with dot) of a filename, if it has one.
pub fn file_extension(name: &str) -> Option<String> {
    let dot = name.rfind('.')?;
    if dot == 0 || dot == name.len() - 1 {
        return None;
    }
    Some(name[dot..].to_lowercase())
}

/// Resume storage rooted at a single directory.
pub struct FileStore {
    root: PathBuf,
    max_size: u64,
}

impl FileStore {
    /// Create the store, ensuring the root directory exists.
    pub fn new(root: impl Into<PathBuf>, max_size: u64) -> Result<Self, FileError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root, max_size })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate and persist an upload. Returns the opaque reference to
    /// store alongside the lead.
    pub fn save(&self, upload: &ResumeUpload) -> Result<String, FileError> {
        if upload.filename.trim().is_empty() {
            return Err(FileError::MissingFilename);
        }
        let ext = file_extension(&upload.filename).ok_or(FileError::UnsupportedType)?;
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(FileError::UnsupportedType);
        }
        if let Some(content_type) = upload.content_type.as_deref() {
            if !ALLOWED_MIME_TYPES.contains(&content_type) {
                return Err(FileError::UnsupportedType);
            }
        }
        if upload.declared_size.is_some_and(|size| size > self.max_size) {
            return Err(FileError::TooLarge { max: self.max_size });
        }
        // The declared size can be absent or wrong; the body length is
        // the authoritative check.
        if upload.data.len() as u64 > self.max_size {
            return Err(FileError::TooLarge { max: self.max_size });
        }

        let reference = format!(
            "{}_{}{}",
            Uuid::new_v4(),
            sanitize_stem(&upload.filename, &ext),
            ext
        );
        let path = self.root.join(&reference);
        std::fs::write(&path, &upload.data)?;
        Ok(reference)
    }

    /// Resolve a reference to its on-disk path.
    ///
    /// NotFound for a missing file, InvalidPath for anything that would
    /// resolve outside the root.
    pub fn resolve(&self, reference: &str) -> Result<PathBuf, FileError> {
        let path = self.safe_path(reference)?;
        if !path.is_file() {
            return Err(FileError::NotFound(reference.to_string()));
        }
        // canonicalize only works on existing paths, so it runs after
        // the existence check as a second line of defense.
        let canonical = path.canonicalize()?;
        let root = self.root.canonicalize()?;
        if !canonical.starts_with(&root) {
            return Err(FileError::InvalidPath);
        }
        Ok(canonical)
    }

    /// Remove a stored file. Returns false when it was already absent.
    pub fn delete(&self, reference: &str) -> Result<bool, FileError> {
        let path = self.safe_path(reference)?;
        if !path.is_file() {
            return Ok(false);
        }
        std::fs::remove_file(path)?;
        Ok(true)
    }

    /// Non-throwing existence probe. Invalid references read as absent.
    pub fn exists(&self, reference: &str) -> bool {
        self.safe_path(reference)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    /// Size in bytes of a stored file, if present.
    pub fn size(&self, reference: &str) -> Option<u64> {
        let path = self.safe_path(reference).ok()?;
        std::fs::metadata(path).ok().map(|meta| meta.len())
    }

    /// MIME type for a reference, derived from its extension.
    pub fn media_type(reference: &str) -> &'static str {
        match file_extension(reference).as_deref() {
            Some(".pdf") => "application/pdf",
            Some(".doc") => "application/msword",
            Some(".docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            _ => "application/octet-stream",
        }
    }

    /// Join a reference to the root, rejecting anything that is not a
    /// single plain path component.
    fn safe_path(&self, reference: &str) -> Result<PathBuf, FileError> {
        if reference.is_empty() {
            return Err(FileError::InvalidPath);
        }
        let as_path = Path::new(reference);
        let mut components = as_path.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => return Err(FileError::InvalidPath),
        }
        Ok(self.root.join(reference))
    }
}

fn sanitize_stem(filename: &str, ext: &str) -> String {
    let stem = &filename[..filename.len().saturating_sub(ext.len())];
    stem.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .take(MAX_STEM_LEN)
        .collect()
}
