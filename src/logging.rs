use crate::config::MoverConfig;
use tracing::Level;

/// Install the global tracing subscriber
///
/// With `syslog` set, lines are written to stderr without timestamps or
/// colours so a system log collector can stamp and store them itself.
pub fn init_logging(config: &MoverConfig, verbose: bool) {
	let level = if verbose { Level::DEBUG } else { Level::INFO };

	if config.syslog {
		tracing_subscriber::fmt()
			.with_max_level(level)
			.without_time()
			.with_ansi(false)
			.with_target(false)
			.with_writer(std::io::stderr)
			.init();
	} else {
		tracing_subscriber::fmt().with_max_level(level).init();
	}
}
