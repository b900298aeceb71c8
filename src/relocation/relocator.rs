use crate::config::MoverConfig;
use crate::error::{MoverError, Result};
use crate::relocation::materialize::materialize_directory;
use crate::relocation::ownership::apply_ownership;
use crate::relocation::paths::DestinationPath;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

/// How a relocation attempt ended when nothing went wrong
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelocationOutcome {
	Moved { destination: PathBuf },
	/// The destination existed and overwrite is on
	Replaced { destination: PathBuf },
	/// The destination existed and overwrite is off; nothing was touched
	SkippedExisting { destination: PathBuf },
}

/// Moves qualifying files into the destination tree
#[derive(Debug, Clone)]
pub struct Relocator {
	config: Arc<MoverConfig>,
}

impl Relocator {
	pub fn new(config: Arc<MoverConfig>) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &MoverConfig {
		&self.config
	}

	/// Relocate one file
	///
	/// Each step gates the next: resolve the destination, materialize its
	/// directory, apply the overwrite policy, rename, then chown the moved
	/// file. On any error the file stays where it was, except when only the
	/// final chown fails.
	pub fn relocate(&self, source: &Path) -> Result<RelocationOutcome> {
		let dest = DestinationPath::resolve(source, &self.config)?;

		materialize_directory(&dest.directory, &self.config)?;

		let existed = path_exists(&dest.file)?;
		if existed && !self.config.overwrite {
			return Ok(RelocationOutcome::SkippedExisting { destination: dest.file });
		}

		debug!("Moving {} to {}", source.display(), dest.file.display());
		fs::rename(source, &dest.file).map_err(|e| MoverError::io("rename", source, e))?;

		if let Some(ownership) = self.config.ownership {
			apply_ownership(&dest.file, ownership)?;
		}

		Ok(if existed {
			RelocationOutcome::Replaced { destination: dest.file }
		} else {
			RelocationOutcome::Moved { destination: dest.file }
		})
	}
}

fn path_exists(path: &Path) -> Result<bool> {
	match fs::metadata(path) {
		Ok(_) => Ok(true),
		Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
		Err(e) => Err(MoverError::io("stat", path, e)),
	}
}

/// Log the result of a relocation attempt at the level its outcome deserves
pub fn log_outcome(source: &Path, result: &Result<RelocationOutcome>) {
	match result {
		Ok(RelocationOutcome::Moved { destination }) => {
			info!("Moved {} to {}", source.display(), destination.display());
		}
		Ok(RelocationOutcome::Replaced { destination }) => {
			info!("Moved {} to {} (overwrote existing file)", source.display(), destination.display());
		}
		Ok(RelocationOutcome::SkippedExisting { destination }) => {
			info!("{} already exists, leaving {} in place", destination.display(), source.display());
		}
		Err(e) if e.is_expected() => {
			info!("{} disappeared: {}", source.display(), e);
		}
		Err(e) => {
			error!(category = e.category(), "Failed to relocate {}: {}", source.display(), e);
		}
	}
}
