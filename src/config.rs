use crate::error::{MoverError, Result};
use crate::events::FileOperation;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/mover/mover.toml";

/// Id value that disables ownership normalization
pub const OWNERSHIP_DISABLED: i64 = -1;

/// Target owner applied to relocated files and freshly created directories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
	pub uid: u32,
	pub gid: u32,
}

/// Immutable configuration shared by every component of the mover
#[derive(Debug, Clone)]
pub struct MoverConfig {
	/// Root of the tree being watched
	pub source: PathBuf,
	/// Root of the mirrored tree files are moved into
	pub destination: PathBuf,
	/// Watch and sweep subdirectories as well as the root
	pub recursive: bool,
	/// The single operation kind that triggers a relocation
	pub operation: FileOperation,
	/// Files whose path does not match are left in place; `None` matches everything
	pub pattern: Option<Regex>,
	/// Replace files already present at the destination
	pub overwrite: bool,
	/// Pause between detecting an event and acting on it
	pub delay: Duration,
	/// `None` leaves ownership untouched
	pub ownership: Option<Ownership>,
	/// Relocate matching files already present before watching starts
	pub move_existing: bool,
	pub log_tag: String,
	pub syslog: bool,
}

/// On-disk shape of the config file
///
/// The short capitalised keys of older config files are accepted as aliases.
#[derive(Debug, Deserialize)]
struct ConfigFile {
	#[serde(alias = "Source")]
	source: PathBuf,
	#[serde(alias = "destin", alias = "Destin", alias = "Destination")]
	destination: PathBuf,
	#[serde(default, alias = "recurs", alias = "Recurs", alias = "Recursive")]
	recursive: bool,
	#[serde(default = "default_operation", alias = "fileop", alias = "Fileop", alias = "Operation")]
	operation: String,
	#[serde(default, alias = "regexp", alias = "Regexp", alias = "Pattern")]
	pattern: String,
	#[serde(default, alias = "owrite", alias = "Owrite", alias = "Overwrite")]
	overwrite: bool,
	#[serde(default, alias = "Delay")]
	delay: u64,
	#[serde(default = "default_id", alias = "Uid")]
	uid: i64,
	#[serde(default = "default_id", alias = "Gid")]
	gid: i64,
	#[serde(default, alias = "movall", alias = "Movall")]
	move_existing: bool,
	#[serde(default = "default_log_tag", alias = "logtag", alias = "Logtag")]
	log_tag: String,
	#[serde(default, alias = "Syslog")]
	syslog: bool,
}

fn default_operation() -> String {
	FileOperation::Create.to_string()
}

fn default_id() -> i64 {
	OWNERSHIP_DISABLED
}

fn default_log_tag() -> String {
	"mover".to_string()
}

impl MoverConfig {
	/// Create a configuration with defaults for everything but the two roots
	pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
		Self {
			source: source.into(),
			destination: destination.into(),
			recursive: false,
			operation: FileOperation::Create,
			pattern: None,
			overwrite: false,
			delay: Duration::ZERO,
			ownership: None,
			move_existing: false,
			log_tag: default_log_tag(),
			syslog: false,
		}
	}

	/// Load and validate a TOML config file
	pub fn load(path: &Path) -> Result<Self> {
		let text =
			std::fs::read_to_string(path).map_err(|e| MoverError::io("read config", path, e))?;
		Self::from_toml_str(&text)
	}

	pub fn from_toml_str(text: &str) -> Result<Self> {
		let file: ConfigFile = toml::from_str(text)?;

		Ok(Self {
			source: file.source,
			destination: file.destination,
			recursive: file.recursive,
			operation: file.operation.parse()?,
			pattern: compile_pattern(&file.pattern)?,
			overwrite: file.overwrite,
			delay: Duration::from_secs(file.delay),
			ownership: resolve_ownership(file.uid, file.gid)?,
			move_existing: file.move_existing,
			log_tag: file.log_tag,
			syslog: file.syslog,
		})
	}

	pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
		self.pattern = compile_pattern(pattern)?;
		Ok(self)
	}

	/// Unanchored search of the pattern in `path`
	pub fn pattern_matches(&self, path: &str) -> bool {
		self.pattern.as_ref().map_or(true, |re| re.is_match(path))
	}

	/// Check whether the destination root lies inside the source root
	///
	/// Relocated files would land back in the watched tree and raise fresh
	/// events. Both roots are made absolute and compared after resolving
	/// whatever part of them exists on disk.
	pub fn destination_within_source(&self) -> bool {
		resolve_existing_prefix(&self.destination).starts_with(resolve_existing_prefix(&self.source))
	}
}

/// Absolute form of `path` with its longest existing prefix canonicalized
///
/// The components below that prefix are appended unchanged, so a root that
/// has not been created yet still resolves through symlinks above it.
fn resolve_existing_prefix(path: &Path) -> PathBuf {
	let absolute = match std::env::current_dir() {
		Ok(cwd) if path.is_relative() => cwd.join(path),
		_ => path.to_path_buf(),
	};

	let mut missing = Vec::new();
	let mut current = absolute.as_path();
	loop {
		if let Ok(resolved) = std::fs::canonicalize(current) {
			return missing.iter().rev().fold(resolved, |acc, name| acc.join(name));
		}
		match (current.parent(), current.file_name()) {
			(Some(parent), Some(name)) => {
				missing.push(name.to_os_string());
				current = parent;
			}
			// `..` or the filesystem root
			_ => return absolute,
		}
	}
}

fn compile_pattern(pattern: &str) -> Result<Option<Regex>> {
	if pattern.is_empty() {
		return Ok(None);
	}
	Regex::new(pattern)
		.map(Some)
		.map_err(|source| MoverError::InvalidPattern { pattern: pattern.to_string(), source })
}

fn resolve_ownership(uid: i64, gid: i64) -> Result<Option<Ownership>> {
	let uid = validate_id("uid", uid)?;
	let gid = validate_id("gid", gid)?;

	Ok(match (uid, gid) {
		(Some(uid), Some(gid)) => Some(Ownership { uid, gid }),
		_ => None,
	})
}

fn validate_id(field: &'static str, value: i64) -> Result<Option<u32>> {
	if value == OWNERSHIP_DISABLED {
		return Ok(None);
	}
	u32::try_from(value)
		.map(Some)
		.map_err(|_| MoverError::InvalidOwnership { field, value })
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_full_config() {
		let config = MoverConfig::from_toml_str(
			r#"
			source = "/srv/incoming"
			destination = "/srv/archive"
			recursive = true
			operation = "WRITE"
			pattern = '\.csv$'
			overwrite = true
			delay = 5
			uid = 1000
			gid = 100
			move_existing = true
			log_tag = "csv-mover"
			syslog = true
			"#,
		)
		.unwrap();

		assert_eq!(config.source, PathBuf::from("/srv/incoming"));
		assert_eq!(config.destination, PathBuf::from("/srv/archive"));
		assert!(config.recursive);
		assert_eq!(config.operation, FileOperation::Write);
		assert!(config.pattern_matches("/srv/incoming/a/data.csv"));
		assert!(!config.pattern_matches("/srv/incoming/a/notes.txt"));
		assert!(config.overwrite);
		assert_eq!(config.delay, Duration::from_secs(5));
		assert_eq!(config.ownership, Some(Ownership { uid: 1000, gid: 100 }));
		assert!(config.move_existing);
		assert_eq!(config.log_tag, "csv-mover");
		assert!(config.syslog);
	}

	#[test]
	fn test_legacy_keys() {
		let config = MoverConfig::from_toml_str(
			r#"
			Movall = true
			Source = "/tmp/src"
			Destin = "/tmp/dst"
			Recurs = true
			Fileop = "CHMOD"
			Regexp = "^/tmp/src/.*\\.log$"
			Logtag = "mover"
			Syslog = false
			Owrite = false
			Delay = 2
			Uid = -1
			Gid = -1
			"#,
		)
		.unwrap();

		assert_eq!(config.destination, PathBuf::from("/tmp/dst"));
		assert_eq!(config.operation, FileOperation::Chmod);
		assert!(config.move_existing);
		assert_eq!(config.delay, Duration::from_secs(2));
		assert!(config.ownership.is_none());
	}

	#[test]
	fn test_defaults() {
		let config = MoverConfig::from_toml_str(
			r#"
			source = "src"
			destination = "dst"
			"#,
		)
		.unwrap();

		assert!(!config.recursive);
		assert_eq!(config.operation, FileOperation::Create);
		assert!(config.pattern.is_none());
		assert!(config.pattern_matches("anything at all"));
		assert!(!config.overwrite);
		assert_eq!(config.delay, Duration::ZERO);
		assert!(config.ownership.is_none());
		assert!(!config.move_existing);
		assert_eq!(config.log_tag, "mover");
	}

	#[test]
	fn test_partial_ownership_is_disabled() {
		let config = MoverConfig::from_toml_str(
			r#"
			source = "src"
			destination = "dst"
			uid = 1000
			"#,
		)
		.unwrap();
		assert!(config.ownership.is_none());
	}

	#[test]
	fn test_invalid_values() {
		let bad_op = MoverConfig::from_toml_str(
			"source = \"a\"\ndestination = \"b\"\noperation = \"DELETE\"\n",
		);
		assert!(matches!(bad_op, Err(MoverError::InvalidOperation { .. })));

		let bad_pattern =
			MoverConfig::from_toml_str("source = \"a\"\ndestination = \"b\"\npattern = \"(\"\n");
		assert!(matches!(bad_pattern, Err(MoverError::InvalidPattern { .. })));

		let bad_uid =
			MoverConfig::from_toml_str("source = \"a\"\ndestination = \"b\"\nuid = -5\ngid = 0\n");
		assert!(matches!(bad_uid, Err(MoverError::InvalidOwnership { field: "uid", value: -5 })));

		let missing_destination = MoverConfig::from_toml_str("source = \"a\"\n");
		match missing_destination {
			Err(err) => assert!(err.is_configuration_error()),
			Ok(_) => panic!("destination is required"),
		}
	}

	#[test]
	fn test_load_missing_file() {
		let err = MoverConfig::load(Path::new("/nonexistent/mover.toml")).unwrap_err();
		assert!(matches!(err, MoverError::Io { operation: "read config", .. }));
	}

	#[test]
	fn test_destination_within_source() {
		let nested = MoverConfig::new("/srv/data", "/srv/data/archive");
		assert!(nested.destination_within_source());

		let sibling = MoverConfig::new("/srv/data", "/srv/archive");
		assert!(!sibling.destination_within_source());

		// Component-wise, not a string prefix
		let prefix_only = MoverConfig::new("/srv/data", "/srv/data-archive");
		assert!(!prefix_only.destination_within_source());
	}

	#[test]
	fn test_relative_destination_within_source() {
		let nested = MoverConfig::new(".", "not-yet-created/archive");
		assert!(nested.destination_within_source());

		let cwd = std::env::current_dir().unwrap();
		let absolute_source = MoverConfig::new(&cwd, "not-yet-created/archive");
		assert!(absolute_source.destination_within_source());

		let outside = MoverConfig::new(cwd.join("not-yet-created"), "elsewhere/archive");
		assert!(!outside.destination_within_source());
	}

	#[cfg(unix)]
	#[test]
	fn test_missing_destination_behind_symlink() {
		let temp_dir = tempfile::TempDir::new().unwrap();
		let source = temp_dir.path().join("src");
		std::fs::create_dir(&source).unwrap();
		std::os::unix::fs::symlink(&source, temp_dir.path().join("link")).unwrap();

		let config = MoverConfig::new(&source, temp_dir.path().join("link/archive/2024"));
		assert!(config.destination_within_source());
	}
}
