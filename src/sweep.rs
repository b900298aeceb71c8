use crate::filter::EventFilter;
use crate::relocation::{log_outcome, RelocationOutcome, Relocator};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Counts from a completed sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
	/// Regular files enumerated under the source root
	pub found: usize,
	pub moved: usize,
	/// Not matching the pattern, or destination already present
	pub skipped: usize,
	/// Gone between enumeration and relocation
	pub disappeared: usize,
	pub failed: usize,
}

/// One-time relocation of files already present at startup
///
/// Runs synchronously, one file at a time, before any watch is set up.
pub struct InitialSweep {
	relocator: Relocator,
	filter: EventFilter,
}

impl InitialSweep {
	pub fn new(relocator: Relocator, filter: EventFilter) -> Self {
		Self { relocator, filter }
	}

	pub fn run(&self) -> SweepReport {
		let config = self.relocator.config();
		info!("Searching existing files in {}", config.source.display());

		let files = list_regular_files(&config.source, config.recursive);
		let mut report = SweepReport { found: files.len(), ..Default::default() };

		for file in files {
			if !self.filter.matches_pattern(&file) {
				debug!("{} does not match pattern, skipping", file.display());
				report.skipped += 1;
				continue;
			}

			if !file.exists() {
				info!("{} disappeared", file.display());
				report.disappeared += 1;
				continue;
			}

			let result = self.relocator.relocate(&file);
			log_outcome(&file, &result);
			match result {
				Ok(RelocationOutcome::Moved { .. } | RelocationOutcome::Replaced { .. }) => {
					report.moved += 1
				}
				Ok(RelocationOutcome::SkippedExisting { .. }) => report.skipped += 1,
				Err(e) if e.is_expected() => report.disappeared += 1,
				Err(_) => report.failed += 1,
			}
		}

		info!(
			"Initial sweep done: {} found, {} moved, {} skipped, {} disappeared, {} failed",
			report.found, report.moved, report.skipped, report.disappeared, report.failed
		);
		report
	}
}

/// Enumerate regular files under `root`, collecting the full list first
///
/// Symlinks are neither listed nor followed.
fn list_regular_files(root: &Path, recursive: bool) -> Vec<PathBuf> {
	let mut walker = WalkDir::new(root).min_depth(1);
	if !recursive {
		walker = walker.max_depth(1);
	}

	walker
		.into_iter()
		.filter_map(|entry| match entry {
			Ok(entry) => Some(entry),
			Err(e) => {
				warn!("Error listing {}: {}", root.display(), e);
				None
			}
		})
		.filter(|entry| entry.file_type().is_file())
		.map(|entry| {
			debug!("Found file: {}", entry.path().display());
			entry.into_path()
		})
		.collect()
}
