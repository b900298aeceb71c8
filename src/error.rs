use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while relocating files or maintaining the watch set
///
/// Every variant is contained to the event or sweep item that produced it.
/// Only `start` and config loading surface errors to the caller; the
/// dispatcher and move tasks log them and carry on.
#[derive(Error, Debug)]
pub enum MoverError {
	#[error("IO error: {operation} failed on {} - {source}", .path.display())]
	Io {
		operation: &'static str,
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Notify error: {0}")]
	Notify(#[from] notify::Error),

	#[error("Configuration error: {0}")]
	Config(#[from] toml::de::Error),

	#[error("Invalid pattern {pattern:?}: {source}")]
	InvalidPattern {
		pattern: String,
		#[source]
		source: regex::Error,
	},

	#[error("Invalid operation {value:?} (expected one of CREATE, WRITE, REMOVE, RENAME, CHMOD)")]
	InvalidOperation { value: String },

	#[error("Invalid ownership: {field} = {value} (expected -1 or a non-negative id)")]
	InvalidOwnership { field: &'static str, value: i64 },

	#[error("Invalid path: {path}")]
	InvalidPath { path: String },

	#[error("{} is not under source root {}", .path.display(), .root.display())]
	NotUnderSource { path: PathBuf, root: PathBuf },

	#[error("{} already exists as a file", .path.display())]
	StructuralConflict { path: PathBuf },

	#[error("Failed to chown {} to {uid}:{gid}: {source}", .path.display())]
	Ownership {
		path: PathBuf,
		uid: u32,
		gid: u32,
		#[source]
		source: std::io::Error,
	},

	#[error("Walk error under {}: {source}", .root.display())]
	Walk {
		root: PathBuf,
		#[source]
		source: walkdir::Error,
	},

	#[error("Failed to send stop signal to dispatcher")]
	StopSignal,

	#[error("Unsupported operation: {operation}")]
	Unsupported { operation: &'static str },
}

impl MoverError {
	/// Wrap an I/O error with the operation and path it failed on
	pub fn io(operation: &'static str, path: &Path, source: std::io::Error) -> Self {
		MoverError::Io { operation, path: path.to_path_buf(), source }
	}

	pub fn walk(root: &Path, source: walkdir::Error) -> Self {
		MoverError::Walk { root: root.to_path_buf(), source }
	}

	/// Check if the error is an expected outcome of concurrent filesystem activity
	///
	/// A path vanishing between detection and processing is not a failure, it
	/// just means someone else got there first.
	pub fn is_expected(&self) -> bool {
		match self {
			MoverError::Io { source, .. } | MoverError::Ownership { source, .. } => {
				source.kind() == std::io::ErrorKind::NotFound
			}
			MoverError::Walk { source, .. } => source
				.io_error()
				.is_some_and(|e| e.kind() == std::io::ErrorKind::NotFound),
			_ => false,
		}
	}

	/// Check if this error is related to configuration issues
	pub fn is_configuration_error(&self) -> bool {
		matches!(
			self,
			MoverError::Config(_)
				| MoverError::InvalidPattern { .. }
				| MoverError::InvalidOperation { .. }
				| MoverError::InvalidOwnership { .. }
				| MoverError::InvalidPath { .. }
		)
	}

	/// Get error category for logging
	pub fn category(&self) -> &'static str {
		match self {
			MoverError::Io { .. } => "io",
			MoverError::Notify(_) => "notify",
			MoverError::Config(_) => "configuration",
			MoverError::InvalidPattern { .. } => "configuration",
			MoverError::InvalidOperation { .. } => "configuration",
			MoverError::InvalidOwnership { .. } => "configuration",
			MoverError::InvalidPath { .. } => "configuration",
			MoverError::NotUnderSource { .. } => "path",
			MoverError::StructuralConflict { .. } => "conflict",
			MoverError::Ownership { .. } => "ownership",
			MoverError::Walk { .. } => "walk",
			MoverError::StopSignal => "shutdown",
			MoverError::Unsupported { .. } => "unsupported",
		}
	}
}

pub type Result<T> = std::result::Result<T, MoverError>;

#[cfg(test)]
mod tests {
	use super::*;
	use std::io;

	#[test]
	fn test_error_messages() {
		let io_error = MoverError::io(
			"rename",
			Path::new("/src/a.csv"),
			io::Error::new(io::ErrorKind::PermissionDenied, "access denied"),
		);
		let conflict = MoverError::StructuralConflict { path: PathBuf::from("/dst/a") };
		let invalid_path = MoverError::InvalidPath { path: "/invalid".to_string() };

		assert!(io_error.to_string().contains("rename failed on /src/a.csv"));
		assert!(conflict.to_string().contains("already exists as a file"));
		assert!(invalid_path.to_string().contains("Invalid path"));
	}

	#[test]
	fn test_expected_errors() {
		let vanished = MoverError::io(
			"stat",
			Path::new("/src/gone.csv"),
			io::Error::new(io::ErrorKind::NotFound, "no such file"),
		);
		assert!(vanished.is_expected());
		assert_eq!(vanished.category(), "io");

		let denied = MoverError::io(
			"rename",
			Path::new("/src/a.csv"),
			io::Error::new(io::ErrorKind::PermissionDenied, "access denied"),
		);
		assert!(!denied.is_expected());

		let conflict = MoverError::StructuralConflict { path: PathBuf::from("/dst/a") };
		assert!(!conflict.is_expected());
		assert_eq!(conflict.category(), "conflict");
	}

	#[test]
	fn test_error_categorization() {
		let op_error = MoverError::InvalidOperation { value: "DELETE".to_string() };
		assert!(op_error.is_configuration_error());
		assert_eq!(op_error.category(), "configuration");

		let ownership = MoverError::InvalidOwnership { field: "uid", value: -7 };
		assert!(ownership.is_configuration_error());
		assert!(ownership.to_string().contains("uid = -7"));

		assert!(!MoverError::StopSignal.is_configuration_error());
		assert_eq!(MoverError::StopSignal.category(), "shutdown");
	}
}
