use crate::config::MoverConfig;
use crate::error::{MoverError, Result};
use crate::relocation::ownership::apply_ownership_recursive;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Find the topmost ancestor of `path` (itself included) that does not exist
///
/// Returns `None` when `path` already exists as a directory, or as a symlink
/// to one. Any existing component that is not a directory is a structural
/// conflict: a file sits where a directory is needed.
pub fn first_missing_ancestor(path: &Path) -> Result<Option<PathBuf>> {
	let mut missing = None;

	for ancestor in path.ancestors().filter(|a| !a.as_os_str().is_empty()) {
		match fs::metadata(ancestor) {
			Ok(meta) if meta.is_dir() => break,
			Ok(_) => return Err(MoverError::StructuralConflict { path: ancestor.to_path_buf() }),
			Err(e) if e.kind() == ErrorKind::NotFound => missing = Some(ancestor.to_path_buf()),
			Err(e) => return Err(MoverError::io("stat", ancestor, e)),
		}
	}

	Ok(missing)
}

/// Make sure the directory chain up to `path` exists
///
/// When ownership normalization is on, every directory created by this call
/// gets the configured owner, not just the leaf. Concurrent calls creating
/// overlapping chains are fine; a directory that appears in between is
/// accepted and the ownership pass may run twice over the same entries.
pub fn materialize_directory(path: &Path, config: &MoverConfig) -> Result<()> {
	let Some(first_created) = first_missing_ancestor(path)? else {
		return Ok(());
	};

	debug!("Creating directory {}", path.display());
	fs::create_dir_all(path).map_err(|e| MoverError::io("create directory", path, e))?;

	if let Some(ownership) = config.ownership {
		apply_ownership_recursive(&first_created, ownership)?;
	}

	Ok(())
}
