use crate::config::MoverConfig;
use crate::events::FileOperation;
use std::fs::{FileType, Metadata};
use std::path::Path;
use std::sync::Arc;

/// What a path currently is on disk, without following symlinks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
	Symlink,
	Directory,
	File,
	/// Sockets, fifos, device nodes
	Other,
}

impl From<FileType> for EntryKind {
	fn from(file_type: FileType) -> Self {
		if file_type.is_symlink() {
			EntryKind::Symlink
		} else if file_type.is_dir() {
			EntryKind::Directory
		} else if file_type.is_file() {
			EntryKind::File
		} else {
			EntryKind::Other
		}
	}
}

impl From<&Metadata> for EntryKind {
	fn from(metadata: &Metadata) -> Self {
		EntryKind::from(metadata.file_type())
	}
}

impl EntryKind {
	/// Classify a path with a non-following stat
	pub fn of(path: &Path) -> std::io::Result<Self> {
		std::fs::symlink_metadata(path).map(|m| EntryKind::from(&m))
	}
}

/// Decides whether an event qualifies for relocation
#[derive(Debug, Clone)]
pub struct EventFilter {
	config: Arc<MoverConfig>,
}

impl EventFilter {
	pub fn new(config: Arc<MoverConfig>) -> Self {
		Self { config }
	}

	/// Cheap check done before any stat call
	pub fn matches_operation(&self, operation: FileOperation) -> bool {
		operation == self.config.operation
	}

	pub fn matches_pattern(&self, path: &Path) -> bool {
		self.config.pattern_matches(&path.to_string_lossy())
	}

	/// Whether an entry of the given kind at `path` should be relocated
	///
	/// Only regular files are ever relocated. Directories are left to the
	/// watch registry and symlinks are skipped whatever the pattern says.
	pub fn qualifies(&self, path: &Path, kind: EntryKind) -> bool {
		match kind {
			EntryKind::File => self.matches_pattern(path),
			EntryKind::Symlink | EntryKind::Directory | EntryKind::Other => false,
		}
	}
}
