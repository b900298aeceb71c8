//! Moving a single file into the mirrored destination tree
//!
//! Split into destination path derivation, directory materialization,
//! ownership propagation and the relocator that drives them in order.

pub mod materialize;
pub mod ownership;
pub mod paths;
pub mod relocator;

pub use materialize::{first_missing_ancestor, materialize_directory};
pub use ownership::{apply_ownership, apply_ownership_recursive};
pub use paths::DestinationPath;
pub use relocator::{log_outcome, RelocationOutcome, Relocator};
