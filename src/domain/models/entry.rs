use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

use crate::domain::models::FileType;

/// What an entry is, with the size measure that applies to it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntryKind {
    Directory { child_count: u64 },
    File { size: u64 },
}

/// A direct child of a listed directory, or a search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Logical path; directories end with `/`
    pub path: String,
    pub name: String,
    #[serde(flatten)]
    pub kind: EntryKind,
    pub last_modified: Option<DateTime<Utc>>,
}

impl Entry {
    pub fn directory(path: impl Into<String>, name: impl Into<String>, child_count: u64) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            kind: EntryKind::Directory { child_count },
            last_modified: None,
        }
    }

    pub fn file(
        path: impl Into<String>,
        name: impl Into<String>,
        size: u64,
        last_modified: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            kind: EntryKind::File { size },
            last_modified,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, EntryKind::Directory { .. })
    }

    /// Direct-child count for directories, byte size for files
    pub fn size(&self) -> u64 {
        match self.kind {
            EntryKind::Directory { child_count } => child_count,
            EntryKind::File { size } => size,
        }
    }

    pub fn file_type(&self) -> FileType {
        if self.is_directory() {
            FileType::Folder
        } else {
            FileType::detect(&self.path)
        }
    }

    fn display_order(&self, other: &Entry) -> Ordering {
        other
            .is_directory()
            .cmp(&self.is_directory())
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.path.cmp(&other.path))
    }
}

/// Directories first, then by name
pub fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(|a, b| a.display_order(b));
}
