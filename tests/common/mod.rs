//! Common test utilities for the fs-mover integration tests

#![allow(dead_code)]

use fs_mover::{FileOperation, MoverConfig, Ownership};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// Separate source and destination roots that are cleaned up on drop
pub struct Roots {
	_src_dir: TempDir,
	_dst_dir: TempDir,
	pub src: PathBuf,
	pub dst: PathBuf,
}

pub fn setup_roots() -> Roots {
	let src_dir = TempDir::new().expect("Failed to create source temp directory");
	let dst_dir = TempDir::new().expect("Failed to create destination temp directory");
	// Canonical so paths match what the watcher reports
	let src = src_dir.path().canonicalize().unwrap();
	let dst = dst_dir.path().canonicalize().unwrap();
	Roots { _src_dir: src_dir, _dst_dir: dst_dir, src, dst }
}

/// CSV-only, recursive, CREATE-triggered config with no delay
pub fn csv_config(roots: &Roots) -> MoverConfig {
	let mut config = MoverConfig::new(&roots.src, &roots.dst)
		.with_pattern(r"\.csv$")
		.expect("valid pattern");
	config.recursive = true;
	config.operation = FileOperation::Create;
	config
}

/// Create a file and any missing parent directories
pub fn create_test_file(path: &Path, content: &str) {
	std::fs::create_dir_all(path.parent().unwrap()).unwrap();
	std::fs::write(path, content).unwrap();
}

/// Ownership the test process may apply: its own, or 1000:1000 when root
#[cfg(unix)]
pub fn grantable_ownership(path: &Path) -> Ownership {
	use std::os::unix::fs::MetadataExt;

	let meta = std::fs::metadata(path).unwrap();
	if meta.uid() == 0 {
		Ownership { uid: 1000, gid: 1000 }
	} else {
		Ownership { uid: meta.uid(), gid: meta.gid() }
	}
}

/// Give the observer time to register subscriptions
pub async fn wait_for_watch() {
	tokio::time::sleep(Duration::from_millis(250)).await;
}

/// Time to let events settle before asserting that nothing happened
pub async fn wait_for_quiet() {
	tokio::time::sleep(Duration::from_millis(750)).await;
}

/// Poll `check` until it holds or the timeout expires
pub async fn wait_until(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
	let start = Instant::now();
	while start.elapsed() < timeout {
		if check() {
			return true;
		}
		tokio::time::sleep(Duration::from_millis(25)).await;
	}
	check()
}

pub fn file_has(path: &Path, content: &str) -> bool {
	std::fs::read_to_string(path).map(|c| c == content).unwrap_or(false)
}
