pub mod config;
mod error;
mod events;
mod filter;
mod logging;
mod registry;
pub mod relocation;
mod sweep;
mod watcher;

pub use config::{MoverConfig, Ownership};
pub use error::{MoverError, Result};
pub use events::{FileOperation, RelocationEvent};
pub use filter::{EntryKind, EventFilter};
pub use logging::init_logging;
pub use registry::{ObserverStreams, WatchRegistry};
pub use relocation::{DestinationPath, RelocationOutcome, Relocator};
pub use sweep::{InitialSweep, SweepReport};
pub use watcher::{start, MoverHandle};
