use crate::config::Ownership;
use crate::error::{MoverError, Result};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Change owner and group of a single path, following symlinks
#[cfg(unix)]
pub fn apply_ownership(path: &Path, ownership: Ownership) -> Result<()> {
	use nix::unistd::{chown, Gid, Uid};

	debug!("Chowning {} to {}:{}", path.display(), ownership.uid, ownership.gid);
	chown(path, Some(Uid::from_raw(ownership.uid)), Some(Gid::from_raw(ownership.gid))).map_err(
		|errno| MoverError::Ownership {
			path: path.to_path_buf(),
			uid: ownership.uid,
			gid: ownership.gid,
			source: std::io::Error::from(errno),
		},
	)
}

#[cfg(not(unix))]
pub fn apply_ownership(_path: &Path, _ownership: Ownership) -> Result<()> {
	Err(MoverError::Unsupported { operation: "apply_ownership" })
}

/// Apply ownership to `root` and, when it is a directory, everything below it
///
/// Stops at the first entry that cannot be walked or chowned and returns
/// that error.
pub fn apply_ownership_recursive(root: &Path, ownership: Ownership) -> Result<()> {
	for entry in WalkDir::new(root) {
		let entry = entry.map_err(|e| MoverError::walk(root, e))?;
		apply_ownership(entry.path(), ownership)?;
	}
	Ok(())
}
