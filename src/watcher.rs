use crate::config::MoverConfig;
use crate::error::{MoverError, Result};
use crate::events::RelocationEvent;
use crate::filter::{EntryKind, EventFilter};
use crate::registry::{ObserverStreams, WatchRegistry};
use crate::relocation::{log_outcome, Relocator};
use crate::sweep::InitialSweep;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn, Instrument, Span};

/// Handle to a running mover
pub struct MoverHandle {
	stop_tx: Option<oneshot::Sender<()>>,
	task: JoinHandle<()>,
}

impl MoverHandle {
	/// Stop the dispatcher and wait for it to leave its loop
	///
	/// Move tasks already spawned keep running to completion. Dropping the
	/// handle without calling this stops the dispatcher as well.
	pub async fn stop(mut self) -> Result<()> {
		if let Some(stop_tx) = self.stop_tx.take() {
			stop_tx.send(()).map_err(|_| MoverError::StopSignal)?;
		}
		self.task.await.map_err(|_| MoverError::StopSignal)
	}

	pub fn is_running(&self) -> bool {
		!self.task.is_finished()
	}
}

/// Start relocating files according to `config`
///
/// Runs the initial sweep when configured, subscribes the source tree and
/// spawns the dispatcher. Must be called from within a tokio runtime.
pub async fn start(config: MoverConfig) -> Result<MoverHandle> {
	let source = std::fs::canonicalize(&config.source).map_err(|_| MoverError::InvalidPath {
		path: config.source.to_string_lossy().to_string(),
	})?;
	if !source.is_dir() {
		return Err(MoverError::InvalidPath { path: source.to_string_lossy().to_string() });
	}
	let config = Arc::new(MoverConfig { source, ..config });

	info!("Started!");
	if config.destination_within_source() {
		warn!(
			"Destination {} is inside source {}, relocated files will raise new events",
			config.destination.display(),
			config.source.display()
		);
	}

	let relocator = Relocator::new(config.clone());
	let filter = EventFilter::new(config.clone());

	if config.move_existing {
		let sweep = InitialSweep::new(relocator.clone(), filter.clone());
		let span = Span::current();
		tokio::task::spawn_blocking(move || span.in_scope(|| sweep.run()))
			.await
			.map_err(|e| MoverError::io("initial sweep", &config.source, e.into()))?;
	}

	info!("Start watching {}", config.source.display());
	let (mut registry, streams) = WatchRegistry::new()?;
	registry.populate(&config.source, config.recursive)?;

	let (stop_tx, stop_rx) = oneshot::channel();
	let event_loop = EventLoop { config, registry, filter, relocator };
	let task = tokio::spawn(event_loop.run(streams, stop_rx).in_current_span());

	Ok(MoverHandle { stop_tx: Some(stop_tx), task })
}

/// The single dispatcher consuming observer events
///
/// Owns the watch registry; relocations run as independent tasks.
struct EventLoop {
	config: Arc<MoverConfig>,
	registry: WatchRegistry,
	filter: EventFilter,
	relocator: Relocator,
}

impl EventLoop {
	async fn run(mut self, mut streams: ObserverStreams, mut stop_rx: oneshot::Receiver<()>) {
		info!("Event processing loop started");

		loop {
			tokio::select! {
				Some(event) = streams.events.recv() => {
					for event in RelocationEvent::from_notify(event) {
						self.dispatch(event).await;
					}
				}
				Some(err) = streams.errors.recv() => {
					error!("Observer error: {}", err);
				}
				_ = &mut stop_rx => break,
				else => break,
			}
		}

		info!("That's all, folks!");
	}

	async fn dispatch(&mut self, event: RelocationEvent) {
		if let Ok(json) = event.to_json() {
			debug!("Event JSON: {}", json);
		}

		if self.filter.matches_operation(event.operation) {
			self.handle_matching(&event).await;
		}

		if event.vacates_path() {
			let released = self.registry.release_tree(&event.path);
			if released > 0 {
				info!("Stopped watching {} ({} directories)", event.path.display(), released);
			}
		}
	}

	async fn handle_matching(&mut self, event: &RelocationEvent) {
		debug!("New event {} {}", event.operation, event.path.display());

		let kind = match tokio::fs::symlink_metadata(&event.path).await {
			Ok(meta) => EntryKind::from(&meta),
			Err(e) if e.kind() == ErrorKind::NotFound => {
				debug!("{} disappeared", event.path.display());
				return;
			}
			Err(e) => {
				warn!("Cannot stat {}: {}", event.path.display(), e);
				return;
			}
		};

		match kind {
			EntryKind::Symlink => debug!("{} is a symlink, skipping", event.path.display()),
			EntryKind::Directory => {
				if self.config.recursive {
					match self.registry.subscribe(&event.path) {
						Ok(true) => info!("Starting to watch {}", event.path.display()),
						Ok(false) => {}
						Err(e) => warn!("Cannot watch {}: {}", event.path.display(), e),
					}
				}
			}
			EntryKind::File if self.filter.qualifies(&event.path, kind) => {
				self.spawn_relocation(event.path.clone());
			}
			EntryKind::File => {
				debug!("{} does not match pattern, skipping", event.path.display())
			}
			EntryKind::Other => debug!("{} is not a regular file, skipping", event.path.display()),
		}
	}

	/// Wait out the delay, re-check the file and relocate it off the dispatcher
	fn spawn_relocation(&self, path: PathBuf) {
		let relocator = self.relocator.clone();
		let delay = self.config.delay;

		tokio::spawn(
			async move {
				if !delay.is_zero() {
					debug!("Waiting {:?} before relocating {}", delay, path.display());
					tokio::time::sleep(delay).await;
				}

				if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
					info!("{} disappeared", path.display());
					return;
				}

				let span = Span::current();
				let result = tokio::task::spawn_blocking(move || {
					let _enter = span.enter();
					let result = relocator.relocate(&path);
					log_outcome(&path, &result);
				})
				.await;

				if let Err(e) = result {
					error!("Relocation task panicked: {}", e);
				}
			}
			.in_current_span(),
		);
	}
}
