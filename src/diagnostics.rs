use std::io::IsTerminal;

use tracing_subscriber::EnvFilter;

/// Every launcher category at debug level except template rendering,
/// which logs once per placeholder.
pub const DEBUG_FILTER: &str = "lintel=debug,lintel::template=off";

/// Exported to spawned collaborators so they see the same activation state.
pub const DEBUG_ENV: &str = "LINTEL_DEBUG";

/// Turns on diagnostic output for the rest of the process.
///
/// Must run before any collaborator is constructed: they log while loading
/// and a subscriber installed afterwards would miss it. Without `--debug`
/// nothing is installed and every event is dropped.
pub fn activate(debug: bool) -> bool {
    if !debug {
        return false;
    }
    let installed = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(DEBUG_FILTER))
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(true)
        .try_init()
        .is_ok();
    tracing::debug!(target: "lintel::diagnostics", filter = DEBUG_FILTER, "diagnostics enabled");
    installed
}

/// The filter a child process should inherit, if diagnostics are on.
pub fn child_filter() -> Option<&'static str> {
    tracing::enabled!(target: "lintel::diagnostics", tracing::Level::DEBUG).then_some(DEBUG_FILTER)
}
