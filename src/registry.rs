use crate::error::{MoverError, Result};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// The set of directories currently subscribed with the observer
///
/// Each directory gets its own non-recursive subscription so the set can
/// follow the tree as directories come and go. Owned and mutated by the
/// dispatcher alone.
pub struct WatchRegistry {
	watcher: RecommendedWatcher,
	watched: HashSet<PathBuf>,
}

/// Receiving ends of the observer's event and error streams
pub struct ObserverStreams {
	pub events: mpsc::UnboundedReceiver<Event>,
	pub errors: mpsc::UnboundedReceiver<notify::Error>,
}

impl WatchRegistry {
	/// Create an empty registry and the streams its observer feeds
	pub fn new() -> Result<(Self, ObserverStreams)> {
		let (event_tx, events) = mpsc::unbounded_channel();
		let (error_tx, errors) = mpsc::unbounded_channel();

		let watcher = RecommendedWatcher::new(
			// Receivers only go away once the dispatcher has stopped
			move |result: notify::Result<Event>| match result {
				Ok(event) => {
					let _ = event_tx.send(event);
				}
				Err(e) => {
					let _ = error_tx.send(e);
				}
			},
			Config::default(),
		)?;

		let registry = Self { watcher, watched: HashSet::new() };
		Ok((registry, ObserverStreams { events, errors }))
	}

	/// Start observing `path`; returns false if it was already watched
	pub fn subscribe(&mut self, path: &Path) -> Result<bool> {
		if self.watched.contains(path) {
			return Ok(false);
		}
		self.watcher.watch(path, RecursiveMode::NonRecursive)?;
		self.watched.insert(path.to_path_buf());
		debug!("Watching {}", path.display());
		Ok(true)
	}

	/// Stop observing `path`; returns false if it was not watched
	///
	/// The observer usually drops the subscription by itself when a watched
	/// directory is deleted, so a failing unwatch is only worth a debug line.
	pub fn release(&mut self, path: &Path) -> bool {
		if !self.watched.remove(path) {
			return false;
		}
		if let Err(e) = self.watcher.unwatch(path) {
			debug!("Unwatch of {} reported: {}", path.display(), e);
		}
		debug!("Stopped watching {}", path.display());
		true
	}

	/// Release `path` and every watched directory below it
	///
	/// A directory moved or deleted takes its whole subtree with it; the
	/// entries left behind would block fresh directories at the same paths
	/// from ever being watched. Returns the number released.
	pub fn release_tree(&mut self, path: &Path) -> usize {
		let stale: Vec<PathBuf> =
			self.watched.iter().filter(|p| p.starts_with(path)).cloned().collect();
		stale.iter().filter(|p| self.release(p)).count()
	}

	/// Subscribe `root` and, when recursive, every directory below it
	///
	/// Symlinks are not followed. Entries that cannot be read are logged and
	/// skipped; failing to subscribe `root` itself is an error. Returns the
	/// number of new subscriptions.
	pub fn populate(&mut self, root: &Path, recursive: bool) -> Result<usize> {
		if !recursive {
			return Ok(usize::from(self.subscribe(root)?));
		}

		let mut added = 0;
		for entry in WalkDir::new(root) {
			let entry = match entry {
				Ok(entry) => entry,
				Err(e) if e.depth() == 0 => return Err(MoverError::walk(root, e)),
				Err(e) => {
					warn!("Skipping unreadable entry under {}: {}", root.display(), e);
					continue;
				}
			};
			if !entry.file_type().is_dir() {
				continue;
			}
			match self.subscribe(entry.path()) {
				Ok(true) => added += 1,
				Ok(false) => {}
				Err(e) if entry.depth() == 0 => return Err(e),
				Err(e) => warn!("Cannot watch {}: {}", entry.path().display(), e),
			}
		}

		info!("Watching {} directories under {}", added, root.display());
		Ok(added)
	}

	pub fn contains(&self, path: &Path) -> bool {
		self.watched.contains(path)
	}

	pub fn len(&self) -> usize {
		self.watched.len()
	}

	pub fn is_empty(&self) -> bool {
		self.watched.is_empty()
	}
}
