use crate::error::MoverError;
use chrono::{DateTime, Utc};
use notify::event::{ModifyKind, RenameMode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use uuid::Uuid;

/// Filesystem operation kinds the mover can be configured to react to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileOperation {
	Create,
	Write,
	Remove,
	Rename,
	Chmod,
}

impl FileOperation {
	pub const ALL: [FileOperation; 5] = [
		FileOperation::Create,
		FileOperation::Write,
		FileOperation::Remove,
		FileOperation::Rename,
		FileOperation::Chmod,
	];

	/// Classify a notify event kind
	///
	/// Returns `None` for kinds with no counterpart (access, catch-all) and for
	/// `Name(Both)`, whose `From` and `To` halves arrive as separate events.
	pub fn from_event_kind(kind: &notify::EventKind) -> Option<Self> {
		match kind {
			notify::EventKind::Create(_) => Some(FileOperation::Create),
			notify::EventKind::Modify(modify_kind) => match modify_kind {
				ModifyKind::Name(RenameMode::To) => Some(FileOperation::Create),
				ModifyKind::Name(RenameMode::Both) => None,
				ModifyKind::Name(_) => Some(FileOperation::Rename),
				ModifyKind::Metadata(_) => Some(FileOperation::Chmod),
				_ => Some(FileOperation::Write),
			},
			notify::EventKind::Remove(_) => Some(FileOperation::Remove),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			FileOperation::Create => "CREATE",
			FileOperation::Write => "WRITE",
			FileOperation::Remove => "REMOVE",
			FileOperation::Rename => "RENAME",
			FileOperation::Chmod => "CHMOD",
		}
	}
}

impl fmt::Display for FileOperation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for FileOperation {
	type Err = MoverError;

	fn from_str(value: &str) -> Result<Self, Self::Err> {
		FileOperation::ALL
			.into_iter()
			.find(|op| op.as_str().eq_ignore_ascii_case(value.trim()))
			.ok_or_else(|| MoverError::InvalidOperation { value: value.to_string() })
	}
}

/// A single (path, operation) pair delivered by the observer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelocationEvent {
	pub id: Uuid,
	pub operation: FileOperation,
	pub path: PathBuf,
	pub timestamp: DateTime<Utc>,
}

impl RelocationEvent {
	pub fn new(operation: FileOperation, path: PathBuf) -> Self {
		Self { id: Uuid::new_v4(), operation, path, timestamp: Utc::now() }
	}

	/// Split a notify event into one relocation event per path
	pub fn from_notify(event: notify::Event) -> Vec<Self> {
		let Some(operation) = FileOperation::from_event_kind(&event.kind) else {
			return Vec::new();
		};

		event.paths.into_iter().map(|path| Self::new(operation, path)).collect()
	}

	pub fn is_removal(&self) -> bool {
		self.operation == FileOperation::Remove
	}

	/// Whether the path stopped existing under its old name
	///
	/// Removals and renames-away both leave any watch on the path stale.
	pub fn vacates_path(&self) -> bool {
		matches!(self.operation, FileOperation::Remove | FileOperation::Rename)
	}

	pub fn to_json(&self) -> serde_json::Result<String> {
		serde_json::to_string(self)
	}
}
