use crate::config::MoverConfig;
use crate::error::{MoverError, Result};
use std::path::{Path, PathBuf};

/// Where a source file ends up under the destination root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationPath {
	/// Directory that must exist before the move
	pub directory: PathBuf,
	/// Full path of the relocated file
	pub file: PathBuf,
}

impl DestinationPath {
	/// Reparent `source_path` from the source root onto the destination root
	///
	/// The path relative to the source root is kept, the base name untouched.
	/// A path outside the source root is a caller bug and is reported as
	/// `NotUnderSource`.
	pub fn resolve(source_path: &Path, config: &MoverConfig) -> Result<Self> {
		let not_under_source = || MoverError::NotUnderSource {
			path: source_path.to_path_buf(),
			root: config.source.clone(),
		};

		let relative = source_path.strip_prefix(&config.source).map_err(|_| not_under_source())?;
		let file_name = relative.file_name().ok_or_else(not_under_source)?;

		let directory = match relative.parent() {
			Some(parent) => config.destination.join(parent),
			None => config.destination.clone(),
		};
		let file = directory.join(file_name);

		Ok(Self { directory, file })
	}
}
